//! An in-memory, content-addressed object repository over a git object store.
//!
//! Objects are built in memory, cached by id, and written to the store only when
//! [`repo::ObjectRepository::persist_object`] is asked to, dependencies first.
//! [`chain::ChainBuilder`] uses the repository to replay a linear run of commits onto a new base.

#[cfg(test)]
mod test;

pub mod blob;
pub mod chain;
pub mod commit;
pub mod config;
pub mod digest;
pub mod error;
pub mod filemode;
pub mod message;
pub mod progress;
pub mod repo;
pub mod storable;
pub mod store;
pub mod timestamp;
pub mod tree;

pub use error::{ParseError, RepoError, RepoResult};
