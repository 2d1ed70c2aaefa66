//! Firesample - recursive sampling of a document store into an LLM-readable report

pub mod error;
pub mod output;
pub mod sampler;
pub mod stats;
pub mod store;
pub mod value;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::{SampleError, StoreError};
pub use output::{JsonLinesFormatter, MarkdownFormatter, OutputConfig, StreamingFormatter, print_markdown};
pub use sampler::{RenderedNode, ReportOutput, SampleIter, Sampler, SamplerConfig};
pub use stats::SampleSummary;
pub use store::{
    CollectionRef, DocumentRef, DocumentSnapshot, DocumentStore, MemoryStore, StorePath, load_snapshot,
};
pub use value::{FieldValue, Fields, GeoPoint, Timestamp};
