//! Counts collected while a report is written

use serde::Serialize;

use crate::sampler::RenderedNode;

/// Totals for one sampling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SampleSummary {
    pub collections: usize,
    pub documents: usize,
    pub errors: usize,
    /// Depth of the deepest document emitted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth_reached: Option<usize>,
}

impl SampleSummary {
    pub fn record(&mut self, node: &RenderedNode) {
        match node {
            RenderedNode::Collection { .. } => self.collections += 1,
            RenderedNode::Document { depth, .. } => {
                self.documents += 1;
                self.max_depth_reached = Some(self.max_depth_reached.map_or(*depth, |d| d.max(*depth)));
            }
            RenderedNode::Error { .. } => self.errors += 1,
        }
    }

    /// One-line description, e.g. `2 collections, 5 documents, 1 error`.
    pub fn describe(&self) -> String {
        let mut text = format!(
            "{}, {}",
            plural(self.collections, "collection", "collections"),
            plural(self.documents, "document", "documents")
        );
        if self.errors > 0 {
            text.push_str(", ");
            text.push_str(&plural(self.errors, "error", "errors"));
        }
        text
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}
