//! Report formatting
//!
//! Sinks implementing `ReportOutput` for the three output formats:
//!
//! - `streaming` - plain or colored text report, written as nodes arrive
//! - `markdown` - headings and fenced JSON blocks
//! - `json` - JSON Lines, one object per node
//!
//! `utils` holds the header phrasing and indentation rules shared by them.

mod config;
mod json;
mod markdown;
mod streaming;
mod utils;

pub use config::OutputConfig;
pub use json::JsonLinesFormatter;
pub use markdown::{MarkdownFormatter, print_markdown};
pub use streaming::{StreamingFormatter, render_report};
pub use utils::{collection_header, document_header, error_line, node_level};
