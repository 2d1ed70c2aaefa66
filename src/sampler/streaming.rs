//! Driving a sampling run into an output sink

use std::io;

use tracing::info;

use crate::error::SampleError;
use crate::stats::SampleSummary;
use crate::store::DocumentStore;

use super::node::RenderedNode;
use super::walker::Sampler;

/// Callback for streaming output - receives each node as it is produced.
pub trait ReportOutput {
    fn output_node(&mut self, node: &RenderedNode) -> io::Result<()>;

    fn finish(&mut self, summary: &SampleSummary) -> io::Result<()>;
}

impl Sampler {
    /// Sample every root collection of `store` into `output`.
    ///
    /// Nodes are written as they are produced, so memory use stays bounded by
    /// the depth of the hierarchy rather than its size.
    pub fn sample_into<S, O>(&self, store: &S, output: &mut O) -> Result<SampleSummary, SampleError>
    where
        S: DocumentStore + ?Sized,
        O: ReportOutput + ?Sized,
    {
        let mut summary = SampleSummary::default();
        for node in self.sample_store(store)? {
            summary.record(&node);
            output.output_node(&node)?;
        }
        output.finish(&summary)?;
        info!(
            collections = summary.collections,
            documents = summary.documents,
            errors = summary.errors,
            "sampling finished"
        );
        Ok(summary)
    }
}
