//! Sampler - lazy depth-first traversal over a document store

use std::collections::VecDeque;
use std::iter::FusedIterator;

use tracing::{debug, warn};

use crate::error::{SampleError, StoreError};
use crate::store::{
    CollectionRef, CollectionStream, DocumentRef, DocumentSnapshot, DocumentStore, DocumentStream,
    StorePath,
};

use super::config::SamplerConfig;
use super::node::RenderedNode;
use super::traversal::Traversal;

/// Entry point for sampling runs.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    config: SamplerConfig,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample the given root collections.
    ///
    /// Nothing is read from the store until the returned iterator is pulled.
    pub fn sample<'s, S: DocumentStore + ?Sized>(
        &self,
        store: &'s S,
        roots: Vec<CollectionRef>,
    ) -> SampleIter<'s, S> {
        SampleIter {
            store,
            traversal: Traversal::new(self.config.clone()),
            roots: roots.into_iter(),
            stack: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// List the store's root collections and sample all of them.
    ///
    /// Failing to list the roots is the only fatal store error.
    pub fn sample_store<'s, S: DocumentStore + ?Sized>(
        &self,
        store: &'s S,
    ) -> Result<SampleIter<'s, S>, SampleError> {
        let roots = store.root_collections().map_err(SampleError::RootEnumeration)?;
        debug!(roots = roots.len(), "root collections listed");
        Ok(self.sample(store, roots))
    }
}

/// An open cursor together with where it sits in the hierarchy.
enum Frame<'s> {
    Documents {
        collection: CollectionRef,
        cursor: DocumentStream<'s>,
    },
    Subcollections {
        document: DocumentRef,
        cursor: CollectionStream<'s>,
    },
}

/// Lazy, depth-first sequence of report nodes.
///
/// Holds one open store cursor per level of the current branch. Dropping the
/// iterator early drops those cursors.
pub struct SampleIter<'s, S: ?Sized> {
    store: &'s S,
    traversal: Traversal,
    roots: std::vec::IntoIter<CollectionRef>,
    stack: Vec<Frame<'s>>,
    pending: VecDeque<RenderedNode>,
}

impl<'s, S: DocumentStore + ?Sized> SampleIter<'s, S> {
    /// Number of cursors currently held open.
    pub fn open_cursors(&self) -> usize {
        self.stack.len()
    }

    fn fail(&mut self, path: &StorePath, err: StoreError) {
        warn!(path = %path, error = %err, "store read failed, continuing");
        self.pending.push_back(RenderedNode::error(path.clone(), &err));
    }

    /// Queue a collection header and open its document cursor.
    fn enter_collection(&mut self, collection: CollectionRef) {
        if !self.traversal.visit(collection.path()) {
            return;
        }
        debug!(path = %collection.path(), "entering collection");
        let sampled = self.traversal.config().is_sampled();
        self.pending
            .push_back(RenderedNode::collection(collection.path().clone(), sampled));

        let limit = self.traversal.document_limit();
        match self.store.documents(&collection, limit) {
            Ok(cursor) => {
                // Enforce the cap even if the store returns more than asked.
                let cursor: DocumentStream<'s> = match limit {
                    Some(n) => Box::new(cursor.take(n)),
                    None => cursor,
                };
                self.stack.push(Frame::Documents { collection, cursor });
            }
            Err(err) => self.fail(collection.path(), err),
        }
    }

    /// Render a document and, below the depth limit, open its subcollection cursor.
    fn visit_document(&mut self, snapshot: DocumentSnapshot) -> Option<RenderedNode> {
        let path = snapshot.reference.path();
        if !self.traversal.visit(path) {
            return None;
        }
        let node = RenderedNode::document(&snapshot);
        if !self.traversal.at_max_depth(path.depth()) {
            match self.store.subcollections(&snapshot.reference) {
                Ok(cursor) => self.stack.push(Frame::Subcollections {
                    document: snapshot.reference,
                    cursor,
                }),
                Err(err) => self.fail(snapshot.reference.path(), err),
            }
        }
        Some(node)
    }
}

impl<'s, S: DocumentStore + ?Sized> Iterator for SampleIter<'s, S> {
    type Item = RenderedNode;

    fn next(&mut self) -> Option<RenderedNode> {
        loop {
            if let Some(node) = self.pending.pop_front() {
                return Some(node);
            }

            let Some(frame) = self.stack.last_mut() else {
                let root = self.roots.next()?;
                self.enter_collection(root);
                continue;
            };

            match frame {
                Frame::Documents { collection, cursor } => match cursor.next() {
                    None => {
                        self.stack.pop();
                    }
                    Some(Err(err)) => {
                        // The collection's cursor is unusable; move on to its siblings.
                        let path = collection.path().clone();
                        self.stack.pop();
                        self.fail(&path, err);
                    }
                    Some(Ok(snapshot)) => {
                        if let Some(node) = self.visit_document(snapshot) {
                            return Some(node);
                        }
                    }
                },
                Frame::Subcollections { document, cursor } => match cursor.next() {
                    None => {
                        self.stack.pop();
                    }
                    Some(Err(err)) => {
                        let path = document.path().clone();
                        self.stack.pop();
                        self.fail(&path, err);
                    }
                    Some(Ok(collection)) => self.enter_collection(collection),
                },
            }
        }
    }
}

impl<'s, S: DocumentStore + ?Sized> FusedIterator for SampleIter<'s, S> {}
