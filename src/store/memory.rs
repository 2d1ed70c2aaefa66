//! In-memory document store

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::value::Fields;

use super::path::StorePath;
use super::{CollectionRef, CollectionStream, DocumentRef, DocumentSnapshot, DocumentStore, DocumentStream};

#[derive(Debug, Clone, Default)]
struct Collection {
    documents: BTreeMap<String, Document>,
}

#[derive(Debug, Clone, Default)]
struct Document {
    fields: Fields,
    collections: BTreeMap<String, Collection>,
}

/// Document hierarchy held in memory.
///
/// Documents and collections are served in ascending id order. Inserting a
/// nested document creates any missing ancestors, with empty field maps for
/// ancestor documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    project_id: Option<String>,
    roots: BTreeMap<String, Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn set_project_id(&mut self, project_id: impl Into<String>) {
        self.project_id = Some(project_id.into());
    }

    /// Insert or replace a document's fields.
    pub fn insert(&mut self, document: &DocumentRef, fields: Fields) {
        self.document_entry(document.path()).fields = fields;
    }

    /// Insert a document given as a slash-separated path.
    pub fn insert_path(&mut self, path: &str, fields: Fields) -> Result<(), StoreError> {
        let document =
            DocumentRef::parse(path).ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
        self.insert(&document, fields);
        Ok(())
    }

    /// Make sure a collection exists, even without documents.
    pub fn ensure_collection(&mut self, collection: &CollectionRef) {
        self.collection_entry(collection.path());
    }

    /// Number of documents at every level.
    pub fn document_count(&self) -> usize {
        fn count(collection: &Collection) -> usize {
            collection
                .documents
                .values()
                .map(|doc| 1 + doc.collections.values().map(count).sum::<usize>())
                .sum()
        }
        self.roots.values().map(count).sum()
    }

    fn collection_entry(&mut self, path: &StorePath) -> &mut Collection {
        let segments = path.segments();
        let mut collection = self.roots.entry(segments[0].clone()).or_default();
        for pair in segments[1..].chunks(2) {
            let document = collection.documents.entry(pair[0].clone()).or_default();
            collection = document.collections.entry(pair[1].clone()).or_default();
        }
        collection
    }

    fn document_entry(&mut self, path: &StorePath) -> &mut Document {
        let collection = match path.parent() {
            Some(parent) => self.collection_entry(&parent),
            None => self.roots.entry(path.id().to_string()).or_default(),
        };
        collection.documents.entry(path.id().to_string()).or_default()
    }

    fn find_collection(&self, path: &StorePath) -> Option<&Collection> {
        let segments = path.segments();
        let mut collection = self.roots.get(&segments[0])?;
        for pair in segments[1..].chunks(2) {
            collection = collection.documents.get(&pair[0])?.collections.get(&pair[1])?;
        }
        Some(collection)
    }

    fn find_document(&self, path: &StorePath) -> Option<&Document> {
        self.find_collection(&path.parent()?)?.documents.get(path.id())
    }
}

impl DocumentStore for MemoryStore {
    fn root_collections(&self) -> Result<Vec<CollectionRef>, StoreError> {
        Ok(self.roots.keys().map(CollectionRef::root).collect())
    }

    fn documents(
        &self,
        collection: &CollectionRef,
        limit: Option<usize>,
    ) -> Result<DocumentStream<'_>, StoreError> {
        let found = self
            .find_collection(collection.path())
            .ok_or_else(|| StoreError::NotFound(collection.path().clone()))?;
        let collection = collection.clone();
        let docs = found
            .documents
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(move |(id, doc)| {
                Ok::<_, StoreError>(DocumentSnapshot {
                    reference: collection.document(id.as_str()),
                    fields: doc.fields.clone(),
                })
            });
        Ok(Box::new(docs))
    }

    fn subcollections(&self, document: &DocumentRef) -> Result<CollectionStream<'_>, StoreError> {
        let found = self
            .find_document(document.path())
            .ok_or_else(|| StoreError::NotFound(document.path().clone()))?;
        let document = document.clone();
        Ok(Box::new(
            found
                .collections
                .keys()
                .map(move |name| Ok::<_, StoreError>(document.collection(name.as_str()))),
        ))
    }
}
