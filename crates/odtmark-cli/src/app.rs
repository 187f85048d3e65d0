//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use odtmark_core::{convert_archive, ConversionOutput, ConvertOptions};
use odtmark_odf::OdfArchive;

use crate::worker::run_worker;

/// Options file picked up next to the input
pub const CONFIG_FILE: &str = "odtmark.toml";

/// Output format of the convert command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Markdown text
    #[default]
    Text,
    /// Full conversion result (markdown, links, headings, diagnostics) as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "odtmark")]
#[command(author, version, about = "OpenDocument to Markdown converter", long_about = None)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an .odt file to Markdown
    Convert {
        /// Input .odt file
        input: PathBuf,

        /// Output Markdown file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Options file (defaults to odtmark.toml next to the input)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Image directory, relative to the output file
        #[arg(long)]
        assets_dir: Option<String>,

        /// Name extracted images after a hash of their content
        #[arg(long)]
        content_addressable: bool,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Serve conversions as JSON lines on stdin/stdout
    Worker,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            assets_dir,
            content_addressable,
            format,
        } => {
            let mut options = load_options(&input, config.as_deref())?;
            if let Some(dir) = assets_dir {
                options.assets_dir = dir;
            }
            options.content_addressable_assets |= content_addressable;
            convert_command(&input, output.as_deref(), &options, format)?;
        }
        Commands::Worker => {
            let stdin = io::stdin();
            run_worker(stdin.lock(), io::stdout().lock())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    // A second initialization (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .try_init();
}

/// Conversion options for `input`
///
/// An explicit `config` must exist. Otherwise `odtmark.toml` next to the
/// input is used when present, and defaults when not.
pub fn load_options(input: &Path, config: Option<&Path>) -> Result<ConvertOptions> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let sibling = input.with_file_name(CONFIG_FILE);
            if !sibling.is_file() {
                return Ok(ConvertOptions::default());
            }
            sibling
        }
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let options = ConvertOptions::from_toml_str(&text)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    info!("loaded options from {}", path.display());
    Ok(options)
}

/// Convert `input`, writing the Markdown to `output` when given
///
/// Images are extracted next to `output`. A source whose container is
/// corrupted is deleted, since retrying it cannot succeed.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<ConversionOutput> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let converted = OdfArchive::open(input)
        .map_err(odtmark_core::ConvertError::from)
        .and_then(|archive| convert_archive(&archive, options, output.and_then(Path::parent)));
    let converted = match converted {
        Ok(converted) => converted,
        Err(err) => {
            if err.is_corrupted() {
                warn!("removing corrupted source {}", input.display());
                fs::remove_file(input)
                    .with_context(|| format!("Failed to remove {}", input.display()))?;
            }
            return Err(err).with_context(|| format!("Failed to convert {}", input.display()));
        }
    };

    if let Some(output) = output {
        fs::write(output, &converted.markdown)
            .with_context(|| format!("Failed to write output file: {}", output.display()))?;
        info!("wrote {}", output.display());
    }
    Ok(converted)
}

/// Execute the convert command
pub fn convert_command(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
    format: OutputFormat,
) -> Result<()> {
    let converted = convert_file(input, output, options)?;

    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&converted)
                .context("Failed to serialize conversion result to JSON")?;
            writeln!(stdout, "{json}")?;
        }
        OutputFormat::Text => {
            if output.is_none() {
                stdout.write_all(converted.markdown.as_bytes())?;
            }
            for diagnostic in &converted.diagnostics {
                eprintln!("{diagnostic}");
            }
        }
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_options_default_without_config() {
        let dir = TempDir::new().unwrap();
        let options = load_options(&dir.path().join("doc.odt"), None).unwrap();
        assert_eq!(options, ConvertOptions::default());
    }

    #[test]
    fn test_options_from_sibling_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "assets_dir = \"img\"\n").unwrap();
        let options = load_options(&dir.path().join("doc.odt"), None).unwrap();
        assert_eq!(options.assets_dir, "img");
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_options(&dir.path().join("doc.odt"), Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "odtmark",
            "convert",
            "doc.odt",
            "-o",
            "out.md",
            "--content-addressable",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert {
                input,
                output,
                content_addressable,
                format,
                ..
            } => {
                assert_eq!(input, PathBuf::from("doc.odt"));
                assert_eq!(output, Some(PathBuf::from("out.md")));
                assert!(content_addressable);
                assert_eq!(format, OutputFormat::Json);
            }
            Commands::Worker => panic!("expected convert"),
        }
    }
}
