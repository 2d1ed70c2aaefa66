//! Shared utility functions for output formatting

use std::io;

use serde_json::{Map, Value};

use crate::sampler::RenderedNode;
use crate::store::StorePath;

/// Indentation level of a node in the text report.
///
/// A collection at depth d sits at level 2d, its documents one level deeper,
/// and that document's subcollections one level deeper again. Errors sit
/// where the content they replace would have been.
pub fn node_level(node: &RenderedNode) -> usize {
    match node {
        RenderedNode::Collection { depth, .. } => depth * 2,
        RenderedNode::Document { depth, .. } => depth * 2 + 1,
        RenderedNode::Error { path, depth, .. } => {
            if path.is_collection() {
                depth * 2 + 1
            } else {
                depth * 2 + 2
            }
        }
    }
}

pub fn indent(level: usize, width: usize) -> String {
    " ".repeat(level * width)
}

pub fn collection_header(path: &StorePath, sampled: bool) -> String {
    if sampled {
        format!("--- Collection: {} (Sample) ---", path)
    } else {
        format!("--- Collection: {} ---", path)
    }
}

pub fn document_header(id: &str) -> String {
    format!("--- Document: {} ---", id)
}

pub fn error_line(path: &StorePath, message: &str) -> String {
    format!("!!! Error reading {}: {} !!!", path, message)
}

/// Pretty-print a rendered field map.
pub fn pretty_fields(fields: &Map<String, Value>) -> io::Result<String> {
    serde_json::to_string_pretty(fields).map_err(io::Error::other)
}

/// Prefix every line of `text` with `prefix`.
pub fn indent_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}
