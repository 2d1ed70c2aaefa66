//! Slash-separated paths into the document hierarchy

use std::fmt;

use serde::{Serialize, Serializer};

/// Absolute path of a collection or document.
///
/// Segments alternate between collection names and document ids, starting
/// with a collection: `users`, `users/user123`, `users/user123/orders`.
/// An odd number of segments names a collection, an even number a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Path of a top-level collection.
    pub fn root(collection: impl Into<String>) -> Self {
        Self {
            segments: vec![collection.into()],
        }
    }

    /// Parse a slash-separated path. Empty segments are rejected.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        let segments: Vec<String> = trimmed.split('/').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    /// Extend this path by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Path one segment up, or `None` for a root collection.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment: a collection name or a document id.
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_collection(&self) -> bool {
        self.segments.len() % 2 == 1
    }

    pub fn is_document(&self) -> bool {
        !self.is_collection()
    }

    /// Number of document levels between a root collection and this path.
    ///
    /// Root collections and their documents are at depth 0, their
    /// subcollections and those documents at depth 1, and so on.
    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1) / 2
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl Serialize for StorePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let path = StorePath::parse("users/user123/orders").unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.to_string(), "users/user123/orders");
        assert_eq!(path.id(), "orders");
    }

    #[test]
    fn test_parse_trims_outer_slashes() {
        let path = StorePath::parse("/users/u1/").unwrap();
        assert_eq!(path.to_string(), "users/u1");
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(StorePath::parse("").is_none());
        assert!(StorePath::parse("/").is_none());
        assert!(StorePath::parse("users//orders").is_none());
    }

    #[test]
    fn test_kind_follows_segment_parity() {
        let collection = StorePath::root("users");
        let document = collection.child("u1");
        assert!(collection.is_collection());
        assert!(document.is_document());
        assert!(document.child("orders").is_collection());
    }

    #[test]
    fn test_depth_counts_document_levels() {
        assert_eq!(StorePath::parse("users").unwrap().depth(), 0);
        assert_eq!(StorePath::parse("users/u1").unwrap().depth(), 0);
        assert_eq!(StorePath::parse("users/u1/orders").unwrap().depth(), 1);
        assert_eq!(StorePath::parse("users/u1/orders/o1").unwrap().depth(), 1);
        assert_eq!(StorePath::parse("a/b/c/d/e").unwrap().depth(), 2);
    }

    #[test]
    fn test_parent() {
        let path = StorePath::parse("users/u1/orders").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "users/u1");
        assert!(StorePath::root("users").parent().is_none());
    }

    #[test]
    fn test_serializes_as_string() {
        let path = StorePath::parse("users/u1").unwrap();
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"users/u1\"");
    }
}
