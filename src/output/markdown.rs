//! Markdown output formatting
//!
//! This module provides `MarkdownFormatter` which outputs the sample as
//! nested headings with fenced JSON blocks, suitable for LLM context.

use std::io::{self, Write};

use crate::sampler::{RenderedNode, ReportOutput};
use crate::stats::SampleSummary;

use super::config::OutputConfig;
use super::utils::pretty_fields;

const MAX_HEADING_LEVEL: usize = 6;

/// Markdown output formatter - accumulates the report as a string.
pub struct MarkdownFormatter {
    output: String,
}

impl MarkdownFormatter {
    pub fn new(config: OutputConfig) -> Self {
        let mut output = String::new();
        if let Some(project) = &config.project_id {
            output.push_str(&format!("# Sample of {}\n\n", project));
        }
        Self { output }
    }

    /// Get the formatted output string.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Take ownership of the output string.
    pub fn into_output(self) -> String {
        self.output
    }

    fn heading(&mut self, level: usize, text: &str) {
        self.output.push_str(&"#".repeat(level.min(MAX_HEADING_LEVEL)));
        self.output.push(' ');
        self.output.push_str(text);
        self.output.push_str("\n\n");
    }
}

impl ReportOutput for MarkdownFormatter {
    fn output_node(&mut self, node: &RenderedNode) -> io::Result<()> {
        match node {
            RenderedNode::Collection {
                path,
                depth,
                sampled,
            } => {
                let suffix = if *sampled { " (Sample)" } else { "" };
                self.heading(2 + depth * 2, &format!("Collection: `{}`{}", path, suffix));
            }
            RenderedNode::Document {
                id, depth, fields, ..
            } => {
                self.heading(3 + depth * 2, &format!("Document: `{}`", id));
                self.output.push_str("```json\n");
                self.output.push_str(&pretty_fields(fields)?);
                self.output.push_str("\n```\n\n");
            }
            RenderedNode::Error { path, message, .. } => {
                self.output
                    .push_str(&format!("> **Error** reading `{}`: {}\n\n", path, message));
            }
        }
        Ok(())
    }

    fn finish(&mut self, summary: &SampleSummary) -> io::Result<()> {
        self.output.push_str(&format!("*{}*\n", summary.describe()));
        Ok(())
    }
}

/// Print markdown output to stdout.
pub fn print_markdown(formatter: &MarkdownFormatter) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(formatter.output().as_bytes())?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorePath;

    #[test]
    fn test_heading_levels_follow_depth() {
        let mut formatter = MarkdownFormatter::new(OutputConfig {
            project_id: Some("demo".to_string()),
            ..Default::default()
        });
        formatter
            .output_node(&RenderedNode::collection(StorePath::root("users"), false))
            .unwrap();
        formatter
            .output_node(&RenderedNode::collection(
                StorePath::parse("users/u1/a/b/c/d/e").unwrap(),
                true,
            ))
            .unwrap();
        formatter.finish(&SampleSummary::default()).unwrap();

        let out = formatter.into_output();
        assert!(out.starts_with("# Sample of demo\n\n## Collection: `users`\n\n"));
        assert!(out.contains("\n###### Collection: `users/u1/a/b/c/d/e` (Sample)\n"));
        assert!(out.ends_with("*0 collections, 0 documents*\n"));
    }
}
