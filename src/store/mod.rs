//! Document store access
//!
//! The sampler never talks to a database directly. It consumes the
//! `DocumentStore` trait, which hands out lazy cursors over a collection's
//! documents and a document's subcollections.
//!
//! - `MemoryStore`: in-memory hierarchy, also the target of export loading
//! - `snapshot`: loads a JSON export into a `MemoryStore`

mod memory;
mod path;
pub mod snapshot;

pub use memory::MemoryStore;
pub use path::StorePath;
pub use snapshot::{SnapshotError, load_snapshot, parse_snapshot};

use crate::error::StoreError;
use crate::value::Fields;

/// Lazy cursor over a collection's documents.
pub type DocumentStream<'a> = Box<dyn Iterator<Item = Result<DocumentSnapshot, StoreError>> + 'a>;

/// Lazy cursor over a document's subcollections.
pub type CollectionStream<'a> = Box<dyn Iterator<Item = Result<CollectionRef, StoreError>> + 'a>;

/// Reference to a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    path: StorePath,
}

impl CollectionRef {
    /// Top-level collection with the given name.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            path: StorePath::root(name),
        }
    }

    /// Wrap a path, which must name a collection.
    pub fn from_path(path: StorePath) -> Option<Self> {
        path.is_collection().then_some(Self { path })
    }

    pub fn parse(path: &str) -> Option<Self> {
        StorePath::parse(path).and_then(Self::from_path)
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Reference to a document inside this collection.
    pub fn document(&self, id: impl Into<String>) -> DocumentRef {
        DocumentRef {
            path: self.path.child(id),
        }
    }

    /// Document that owns this collection, if it is a subcollection.
    pub fn parent(&self) -> Option<DocumentRef> {
        self.path.parent().map(|path| DocumentRef { path })
    }
}

/// Reference to a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    path: StorePath,
}

impl DocumentRef {
    /// Wrap a path, which must name a document.
    pub fn from_path(path: StorePath) -> Option<Self> {
        path.is_document().then_some(Self { path })
    }

    pub fn parse(path: &str) -> Option<Self> {
        StorePath::parse(path).and_then(Self::from_path)
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Reference to a subcollection of this document.
    pub fn collection(&self, name: impl Into<String>) -> CollectionRef {
        CollectionRef {
            path: self.path.child(name),
        }
    }

    pub fn parent(&self) -> CollectionRef {
        CollectionRef {
            path: self
                .path
                .parent()
                .unwrap_or_else(|| StorePath::root(self.path.id())),
        }
    }
}

/// A document read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub reference: DocumentRef,
    pub fields: Fields,
}

impl DocumentSnapshot {
    pub fn id(&self) -> &str {
        self.reference.id()
    }
}

/// Read access to a hierarchical document store.
pub trait DocumentStore {
    /// List the top-level collections.
    fn root_collections(&self) -> Result<Vec<CollectionRef>, StoreError>;

    /// Open a cursor over the documents of `collection`, yielding at most
    /// `limit` documents when a limit is given.
    fn documents(
        &self,
        collection: &CollectionRef,
        limit: Option<usize>,
    ) -> Result<DocumentStream<'_>, StoreError>;

    /// Open a cursor over the subcollections of `document`.
    fn subcollections(&self, document: &DocumentRef) -> Result<CollectionStream<'_>, StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn root_collections(&self) -> Result<Vec<CollectionRef>, StoreError> {
        (**self).root_collections()
    }

    fn documents(
        &self,
        collection: &CollectionRef,
        limit: Option<usize>,
    ) -> Result<DocumentStream<'_>, StoreError> {
        (**self).documents(collection, limit)
    }

    fn subcollections(&self, document: &DocumentRef) -> Result<CollectionStream<'_>, StoreError> {
        (**self).subcollections(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refs_alternate() {
        let users = CollectionRef::root("users");
        let user = users.document("u1");
        let orders = user.collection("orders");
        assert_eq!(orders.path().to_string(), "users/u1/orders");
        assert_eq!(orders.parent(), Some(user.clone()));
        assert_eq!(user.parent(), users);
        assert!(users.parent().is_none());
    }

    #[test]
    fn test_parse_checks_kind() {
        assert!(CollectionRef::parse("users").is_some());
        assert!(CollectionRef::parse("users/u1").is_none());
        assert!(DocumentRef::parse("users/u1").is_some());
        assert!(DocumentRef::parse("users").is_none());
    }
}
