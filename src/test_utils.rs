//! Test utilities: fixture stores and store wrappers for fault injection.
//!
//! This module is only compiled for tests and benchmarks.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::store::{
    CollectionRef, CollectionStream, DocumentRef, DocumentStore, DocumentStream, MemoryStore,
    StorePath,
};
use crate::value::{FieldValue, Fields, Timestamp};

/// Build a field map from name/value pairs.
pub fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Parse an RFC 3339 string into a timestamp.
pub fn timestamp(rfc3339: &str) -> Timestamp {
    let parsed = DateTime::parse_from_rfc3339(rfc3339).expect("Invalid RFC 3339 timestamp");
    Timestamp::from_datetime(parsed.with_timezone(&Utc))
}

/// A single `users/user123` document with a name, email and creation time.
pub fn users_store() -> MemoryStore {
    let mut store = MemoryStore::new().with_project_id("demo-project");
    store
        .insert_path(
            "users/user123",
            fields(&[
                ("name", "John Doe".into()),
                ("email", "john@example.com".into()),
                ("createdAt", timestamp("2024-01-01T00:00:00Z").into()),
            ]),
        )
        .expect("Failed to insert user");
    store
}

/// One collection holding `count` documents named `doc-000`, `doc-001`, ...
pub fn wide_store(collection: &str, count: usize) -> MemoryStore {
    let mut store = MemoryStore::new();
    for i in 0..count {
        store
            .insert_path(
                &format!("{}/doc-{:03}", collection, i),
                fields(&[("index", FieldValue::Integer(i as i64))]),
            )
            .expect("Failed to insert document");
    }
    store
}

/// A single chain `level0/doc0/level1/doc1/...` with `levels` documents.
pub fn deep_store(levels: usize) -> MemoryStore {
    let mut store = MemoryStore::new();
    let mut path = String::new();
    for level in 0..levels {
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(&format!("level{}/doc{}", level, level));
        store
            .insert_path(&path, fields(&[("level", FieldValue::Integer(level as i64))]))
            .expect("Failed to insert document");
    }
    store
}

/// Wraps a store and makes selected reads fail.
pub struct FaultyStore<S> {
    inner: S,
    fail_roots: bool,
    fail_open: Vec<StorePath>,
    fail_after: HashMap<StorePath, usize>,
    fail_subcollections: Vec<StorePath>,
    subcollection_calls: RefCell<Vec<StorePath>>,
}

impl<S: DocumentStore> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_roots: false,
            fail_open: Vec::new(),
            fail_after: HashMap::new(),
            fail_subcollections: Vec::new(),
            subcollection_calls: RefCell::new(Vec::new()),
        }
    }

    /// Listing root collections fails.
    pub fn failing_roots(mut self) -> Self {
        self.fail_roots = true;
        self
    }

    /// Opening the document cursor of this collection fails.
    pub fn failing_documents(mut self, collection: &str) -> Self {
        self.fail_open.push(parse(collection));
        self
    }

    /// The document cursor of this collection fails after `count` documents.
    pub fn failing_after(mut self, collection: &str, count: usize) -> Self {
        self.fail_after.insert(parse(collection), count);
        self
    }

    /// Listing this document's subcollections fails.
    pub fn failing_subcollections(mut self, document: &str) -> Self {
        self.fail_subcollections.push(parse(document));
        self
    }

    /// Documents whose subcollections were requested, in call order.
    pub fn subcollection_calls(&self) -> Vec<StorePath> {
        self.subcollection_calls.borrow().clone()
    }
}

fn parse(path: &str) -> StorePath {
    StorePath::parse(path).expect("Invalid store path")
}

impl<S: DocumentStore> DocumentStore for FaultyStore<S> {
    fn root_collections(&self) -> Result<Vec<CollectionRef>, StoreError> {
        if self.fail_roots {
            return Err(StoreError::Unavailable("injected root failure".to_string()));
        }
        self.inner.root_collections()
    }

    fn documents(
        &self,
        collection: &CollectionRef,
        limit: Option<usize>,
    ) -> Result<DocumentStream<'_>, StoreError> {
        let path = collection.path();
        if self.fail_open.contains(path) {
            return Err(StoreError::PermissionDenied(path.clone()));
        }
        let docs = self.inner.documents(collection, limit)?;
        match self.fail_after.get(path) {
            Some(&count) => {
                let err_path = path.clone();
                Ok(Box::new(docs.take(count).chain(std::iter::once_with(move || {
                    Err(StoreError::Corrupt {
                        path: err_path,
                        reason: "injected cursor failure".to_string(),
                    })
                }))))
            }
            None => Ok(docs),
        }
    }

    fn subcollections(&self, document: &DocumentRef) -> Result<CollectionStream<'_>, StoreError> {
        let path = document.path();
        self.subcollection_calls.borrow_mut().push(path.clone());
        if self.fail_subcollections.contains(path) {
            return Err(StoreError::Unavailable(format!("cannot list {}", path)));
        }
        self.inner.subcollections(document)
    }
}

/// Wraps a store and counts cursors that have been opened but not dropped.
pub struct CursorTracker<S> {
    inner: S,
    open: Rc<Cell<usize>>,
    opened_total: Cell<usize>,
}

struct CursorGuard(Rc<Cell<usize>>);

impl CursorGuard {
    fn new(open: &Rc<Cell<usize>>) -> Self {
        open.set(open.get() + 1);
        Self(Rc::clone(open))
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

struct Tracked<I> {
    inner: I,
    _guard: CursorGuard,
}

impl<I: Iterator> Iterator for Tracked<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.inner.next()
    }
}

impl<S: DocumentStore> CursorTracker<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            open: Rc::new(Cell::new(0)),
            opened_total: Cell::new(0),
        }
    }

    /// Cursors currently alive.
    pub fn open_cursors(&self) -> usize {
        self.open.get()
    }

    /// Cursors opened since creation.
    pub fn opened_total(&self) -> usize {
        self.opened_total.get()
    }

    fn track<'a, T: 'a>(
        &self,
        inner: Box<dyn Iterator<Item = T> + 'a>,
    ) -> Box<dyn Iterator<Item = T> + 'a> {
        self.opened_total.set(self.opened_total.get() + 1);
        Box::new(Tracked {
            inner,
            _guard: CursorGuard::new(&self.open),
        })
    }
}

impl<S: DocumentStore> DocumentStore for CursorTracker<S> {
    fn root_collections(&self) -> Result<Vec<CollectionRef>, StoreError> {
        self.inner.root_collections()
    }

    fn documents(
        &self,
        collection: &CollectionRef,
        limit: Option<usize>,
    ) -> Result<DocumentStream<'_>, StoreError> {
        Ok(self.track(self.inner.documents(collection, limit)?))
    }

    fn subcollections(&self, document: &DocumentRef) -> Result<CollectionStream<'_>, StoreError> {
        Ok(self.track(self.inner.subcollections(document)?))
    }
}
