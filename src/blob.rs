use crate::digest::Oid;
use crate::storable::{object_id, ObjectKind, PersistFlag, Storable};

#[derive(Debug)]
pub struct Blob {
    oid: Oid,
    data: Vec<u8>,
    pub(crate) persisted: PersistFlag,
}

impl Blob {
    /// Build a blob in memory. It is not persisted until the repository writes it.
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self {
            oid: object_id(ObjectKind::Blob, &data),
            data,
            persisted: PersistFlag::new(false),
        }
    }

    pub(crate) fn loaded(oid: Oid, data: Vec<u8>) -> Self {
        Self {
            oid,
            data,
            persisted: PersistFlag::new(true),
        }
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Storable for Blob {
    const KIND: ObjectKind = ObjectKind::Blob;

    fn oid(&self) -> &Oid {
        &self.oid
    }

    fn body(&self) -> &[u8] {
        &self.data
    }

    fn dependencies(&self) -> Vec<Oid> {
        Vec::new()
    }

    fn is_persisted(&self) -> bool {
        self.persisted.get()
    }
}
