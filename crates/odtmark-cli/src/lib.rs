//! odtmark CLI - Command-line interface library
//!
//! This library provides the CLI functionality for odtmark:
//! - Convert: turn one `.odt` file into Markdown
//! - Worker: serve conversions over a JSON-lines protocol
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert to stdout
//! odtmark convert notes.odt
//!
//! # Convert to a file, extracting images to notes/assets/
//! odtmark convert notes.odt --output notes/index.md --content-addressable
//!
//! # Long-running worker
//! echo '{"type":"convert","payload":{"input":"notes.odt"}}' | odtmark worker
//! ```

pub mod app;
pub mod worker;

pub use app::{convert_command, convert_file, load_options, run_cli, OutputFormat};
pub use worker::{handle_request, run_worker, Request, Response};
