//! CLI entry point for firesample

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use firesample::{
    JsonLinesFormatter, MarkdownFormatter, OutputConfig, Sampler, SamplerConfig, StreamingFormatter,
    load_snapshot, print_markdown,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `firesample=debug`.
const LOG_ENV: &str = "FIRESAMPLE_LOG";

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "firesample")]
#[command(about = "Sample a document store recursively into an LLM-readable report")]
#[command(version)]
struct Args {
    /// Database export to sample (JSON, Firestore REST value encoding)
    source: PathBuf,

    /// Project ID to report (defaults to the one recorded in the export)
    #[arg(long = "project-id")]
    project_id: Option<String>,

    /// Maximum subcollection depth to descend into
    #[arg(long = "max-depth", default_value_t = firesample::sampler::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Read at most N documents per collection (default: all)
    #[arg(long = "sample-size", value_name = "N",
          value_parser = clap::value_parser!(u64).range(1..))]
    sample_size: Option<u64>,

    /// Output one JSON object per line
    #[arg(long = "json", conflicts_with = "markdown")]
    json: bool,

    /// Output in Markdown format (suitable for LLM context)
    #[arg(long = "markdown", short = 'm', conflicts_with = "json")]
    markdown: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

/// Install the stderr log subscriber.
///
/// `FIRESAMPLE_LOG` or `RUST_LOG` take precedence over `-v`.
fn initialize_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: Args) -> Result<()> {
    let store = load_snapshot(&args.source)
        .with_context(|| format!("cannot load export '{}'", args.source.display()))?;

    let project_id = args
        .project_id
        .clone()
        .or_else(|| store.project_id().map(str::to_string));
    info!(
        project = project_id.as_deref().unwrap_or("<unknown>"),
        documents = store.document_count(),
        "export loaded"
    );

    let sampler = Sampler::new(SamplerConfig {
        max_depth: args.max_depth,
        sample_size: args.sample_size.map(|n| n as usize),
    });

    let output_config = OutputConfig {
        use_color: !args.markdown && !args.json && should_use_color(args.color),
        project_id: project_id.clone(),
        ..Default::default()
    };

    if args.json {
        let mut formatter = JsonLinesFormatter::stdout(project_id);
        sampler.sample_into(&store, &mut formatter)?;
    } else if args.markdown {
        let mut formatter = MarkdownFormatter::new(output_config);
        sampler.sample_into(&store, &mut formatter)?;
        print_markdown(&formatter).context("error writing output")?;
    } else {
        let mut formatter = StreamingFormatter::stdout(output_config);
        sampler.sample_into(&store, &mut formatter)?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    initialize_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("firesample: {:#}", e);
        process::exit(1);
    }
}
