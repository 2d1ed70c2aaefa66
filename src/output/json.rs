//! JSON Lines output formatting

use std::io::{self, Write};

use serde::Serialize;

use crate::sampler::{RenderedNode, ReportOutput};
use crate::stats::SampleSummary;

/// Final line of the stream.
#[derive(Serialize)]
struct Trailer<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    #[serde(flatten)]
    summary: &'a SampleSummary,
}

/// Writes one JSON object per node, followed by a summary object.
pub struct JsonLinesFormatter<W: Write> {
    writer: W,
    project_id: Option<String>,
}

impl<W: Write> JsonLinesFormatter<W> {
    pub fn new(writer: W, project_id: Option<String>) -> Self {
        Self { writer, project_id }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesFormatter<io::Stdout> {
    pub fn stdout(project_id: Option<String>) -> Self {
        Self::new(io::stdout(), project_id)
    }
}

impl<W: Write> ReportOutput for JsonLinesFormatter<W> {
    fn output_node(&mut self, node: &RenderedNode) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, node).map_err(io::Error::other)?;
        writeln!(self.writer)
    }

    fn finish(&mut self, summary: &SampleSummary) -> io::Result<()> {
        let trailer = Trailer {
            kind: "summary",
            project: self.project_id.as_deref(),
            summary,
        };
        serde_json::to_writer(&mut self.writer, &trailer).map_err(io::Error::other)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }
}
