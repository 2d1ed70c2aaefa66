//! Output configuration types

const DEFAULT_INDENT_WIDTH: usize = 2;

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Spaces per indentation level in the text report
    pub indent_width: usize,
    /// Project the sample was taken from, shown in titles and summaries
    pub project_id: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            indent_width: DEFAULT_INDENT_WIDTH,
            project_id: None,
        }
    }
}
