//! Streaming text report formatter
//!
//! This module provides `StreamingFormatter` which writes the text report
//! as nodes arrive, for use with `Sampler::sample_into`.

use std::io::{self, Write};

use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::sampler::{RenderedNode, ReportOutput};
use crate::stats::SampleSummary;

use super::config::OutputConfig;
use super::utils::{
    collection_header, document_header, error_line, indent, indent_lines, node_level, pretty_fields,
};

/// Text report formatter - writes each node as soon as it is produced.
pub struct StreamingFormatter<W: WriteColor = StandardStream> {
    config: OutputConfig,
    out: W,
    started: bool,
}

impl StreamingFormatter<StandardStream> {
    pub fn stdout(config: OutputConfig) -> Self {
        let choice = if config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::new(config, StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> StreamingFormatter<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self {
            config,
            out,
            started: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_colored(&mut self, prefix: &str, text: &str, spec: &ColorSpec) -> io::Result<()> {
        write!(self.out, "{}", prefix)?;
        self.out.set_color(spec)?;
        write!(self.out, "{}", text)?;
        self.out.reset()?;
        writeln!(self.out)
    }

    /// Blank line between sections, but not before the first one.
    fn separate(&mut self) -> io::Result<()> {
        if self.started {
            writeln!(self.out)?;
        }
        self.started = true;
        Ok(())
    }
}

impl<W: WriteColor> ReportOutput for StreamingFormatter<W> {
    fn output_node(&mut self, node: &RenderedNode) -> io::Result<()> {
        let prefix = indent(node_level(node), self.config.indent_width);
        match node {
            RenderedNode::Collection { path, sampled, .. } => {
                self.separate()?;
                self.write_colored(
                    &prefix,
                    &collection_header(path, *sampled),
                    ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true),
                )?;
            }
            RenderedNode::Document { id, fields, .. } => {
                self.separate()?;
                self.write_colored(
                    &prefix,
                    &document_header(id),
                    ColorSpec::new().set_fg(Some(Color::Green)),
                )?;
                let json = pretty_fields(fields)?;
                writeln!(self.out, "{}", indent_lines(&json, &prefix))?;
            }
            RenderedNode::Error { path, message, .. } => {
                self.write_colored(
                    &prefix,
                    &error_line(path, message),
                    ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true),
                )?;
            }
        }
        Ok(())
    }

    fn finish(&mut self, summary: &SampleSummary) -> io::Result<()> {
        writeln!(self.out)?;
        match &self.config.project_id {
            Some(project) => writeln!(self.out, "{} sampled from {}", summary.describe(), project)?,
            None => writeln!(self.out, "{}", summary.describe())?,
        }
        self.out.flush()
    }
}

/// Render a complete report to a string, without colors.
pub fn render_report(
    nodes: &[RenderedNode],
    summary: &SampleSummary,
    config: OutputConfig,
) -> io::Result<String> {
    let mut formatter = StreamingFormatter::new(config, Buffer::no_color());
    for node in nodes {
        formatter.output_node(node)?;
    }
    formatter.finish(summary)?;
    String::from_utf8(formatter.into_inner().into_inner()).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{CollectionRef, DocumentSnapshot, StorePath};
    use crate::value::{FieldValue, Fields};

    fn doc(path: &str, fields: &[(&str, FieldValue)]) -> RenderedNode {
        let (collection, id) = path.rsplit_once('/').unwrap();
        RenderedNode::document(&DocumentSnapshot {
            reference: CollectionRef::parse(collection).unwrap().document(id),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<Fields>(),
        })
    }

    #[test]
    fn test_report_layout() {
        let nodes = vec![
            RenderedNode::collection(StorePath::root("users"), true),
            doc("users/u1", &[("name", FieldValue::from("Ann"))]),
            RenderedNode::collection(StorePath::parse("users/u1/pets").unwrap(), true),
            doc("users/u1/pets/p1", &[]),
        ];
        let mut summary = SampleSummary::default();
        nodes.iter().for_each(|n| summary.record(n));

        let report = render_report(&nodes, &summary, OutputConfig::default()).unwrap();
        let expected = "\
--- Collection: users (Sample) ---

  --- Document: u1 ---
  {
    \"name\": \"Ann\"
  }

    --- Collection: users/u1/pets (Sample) ---

      --- Document: p1 ---
      {}

2 collections, 2 documents
";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_error_line_and_project_summary() {
        let nodes = vec![
            RenderedNode::collection(StorePath::root("logs"), false),
            RenderedNode::error(
                StorePath::root("logs"),
                &StoreError::PermissionDenied(StorePath::root("logs")),
            ),
        ];
        let mut summary = SampleSummary::default();
        nodes.iter().for_each(|n| summary.record(n));
        let config = OutputConfig {
            project_id: Some("demo".to_string()),
            ..Default::default()
        };

        let report = render_report(&nodes, &summary, config).unwrap();
        assert!(report.contains("--- Collection: logs ---\n  !!! Error reading logs: permission denied: logs !!!"));
        assert!(report.ends_with("1 collection, 0 documents, 1 error sampled from demo\n"));
    }
}
