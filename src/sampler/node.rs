//! Nodes produced by a sampling run

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::store::{DocumentSnapshot, StorePath};
use crate::value::render_fields;

/// One element of the depth-first report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderedNode {
    /// Header opening a collection's section.
    Collection {
        path: StorePath,
        depth: usize,
        /// Whether a per-collection sample size was in effect.
        sampled: bool,
    },
    /// A document and its rendered fields.
    Document {
        id: String,
        path: StorePath,
        depth: usize,
        fields: Map<String, Value>,
    },
    /// A store failure confined to one collection or document.
    ///
    /// For a collection path the documents could not be read; for a document
    /// path its subcollections could not be listed.
    Error {
        path: StorePath,
        depth: usize,
        message: String,
    },
}

impl RenderedNode {
    pub fn collection(path: StorePath, sampled: bool) -> Self {
        let depth = path.depth();
        RenderedNode::Collection {
            path,
            depth,
            sampled,
        }
    }

    pub fn document(snapshot: &DocumentSnapshot) -> Self {
        let path = snapshot.reference.path().clone();
        RenderedNode::Document {
            id: snapshot.id().to_string(),
            depth: path.depth(),
            path,
            fields: render_fields(&snapshot.fields),
        }
    }

    pub fn error(path: StorePath, err: &StoreError) -> Self {
        RenderedNode::Error {
            depth: path.depth(),
            path,
            message: err.to_string(),
        }
    }

    pub fn path(&self) -> &StorePath {
        match self {
            RenderedNode::Collection { path, .. } => path,
            RenderedNode::Document { path, .. } => path,
            RenderedNode::Error { path, .. } => path,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            RenderedNode::Collection { depth, .. } => *depth,
            RenderedNode::Document { depth, .. } => *depth,
            RenderedNode::Error { depth, .. } => *depth,
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, RenderedNode::Document { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RenderedNode::Error { .. })
    }
}
