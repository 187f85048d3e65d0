//! JSON-lines worker protocol
//!
//! Each request is one line `{"type": "convert", "payload": {...}}`; each
//! reply is one line `{"result": {...}}` or `{"err": "..."}`. Requests are
//! handled in order, one at a time, so a pool of workers is just several
//! processes.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use odtmark_core::{ConversionOutput, ConvertOptions};

use crate::app::{convert_file, load_options};

/// A worker request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Request {
    /// Convert one file
    Convert(ConvertRequest),
}

/// Payload of a `convert` request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConvertRequest {
    /// Source `.odt` path
    pub input: PathBuf,
    /// Markdown destination; the result carries the text either way
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Inline options; `odtmark.toml` next to the input when absent
    #[serde(default)]
    pub options: Option<ConvertOptions>,
}

/// A worker reply
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Result(ConversionOutput),
    Err(String),
}

/// Execute one request
pub fn handle_request(request: &Request) -> Response {
    let outcome = match request {
        Request::Convert(convert) => run_convert(convert),
    };
    match outcome {
        Ok(output) => Response::Result(output),
        Err(err) => Response::Err(format!("{err:#}")),
    }
}

fn run_convert(request: &ConvertRequest) -> Result<ConversionOutput> {
    let options = match &request.options {
        Some(options) => options.clone(),
        None => load_options(&request.input, None)?,
    };
    debug!("worker converting {}", request.input.display());
    convert_file(&request.input, request.output.as_deref(), &options)
}

/// Serve requests from `input` until it is exhausted
///
/// A malformed line gets an `err` reply; only I/O failures end the loop.
pub fn run_worker<R: BufRead, W: Write>(input: R, mut output: W) -> Result<()> {
    for line in input.lines() {
        let line = line.context("Failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(&request),
            Err(err) => Response::Err(format!("invalid request: {err}")),
        };
        serde_json::to_writer(&mut output, &response).context("Failed to write response")?;
        output.write_all(b"\n")?;
        output.flush()?;
    }
    Ok(())
}
