use std::collections::HashMap;

use crate::digest::Oid;
use crate::storable::GitObject;

/// Memoizes objects by id for the lifetime of one [`super::ObjectRepository`].
///
/// There is no eviction: the cache lives exactly as long as the operation that owns it.
#[derive(Debug, Default)]
pub struct ObjectCache {
    objects: HashMap<Oid, GitObject>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, oid: &Oid) -> Option<&GitObject> {
        self.objects.get(oid)
    }

    pub fn contains(&self, oid: &Oid) -> bool {
        self.objects.contains_key(oid)
    }

    /// Cache `object` unless its id is already present, and return whichever instance is now
    /// cached.
    pub(crate) fn insert_if_absent(&mut self, object: GitObject) -> GitObject {
        self.objects.entry(*object.oid()).or_insert(object).clone()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn clear(&mut self) {
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::blob::Blob;

    #[test]
    fn test_insert_if_absent_keeps_first() {
        let mut cache = ObjectCache::new();
        let first = Rc::new(Blob::new(b"same".to_vec()));
        let second = Rc::new(Blob::new(b"same".to_vec()));

        cache.insert_if_absent(first.clone().into());
        let cached = cache.insert_if_absent(second.clone().into());

        let cached = cached.as_blob().unwrap();
        assert!(Rc::ptr_eq(cached, &first));
        assert!(!Rc::ptr_eq(cached, &second));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
