//! Depth-first sampling of a document store
//!
//! `Sampler` turns a `DocumentStore` into a lazy sequence of `RenderedNode`s:
//! a header per collection, a block per document, and an error node wherever
//! a single collection or document could not be read.
//!
//! - `Sampler::sample` / `sample_store`: pull-based iterator (`SampleIter`)
//! - `Sampler::sample_into`: push nodes into a `ReportOutput` sink

mod config;
mod node;
mod streaming;
mod traversal;
mod walker;

pub use config::{DEFAULT_MAX_DEPTH, SamplerConfig};
pub use node::RenderedNode;
pub use streaming::ReportOutput;
pub use walker::{SampleIter, Sampler};
