//! Reading and writing the pipeline's JSON files, plus the plain-text
//! progress lines each stage prints.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::accidents::FilteredAccident;

/// Decodes a whole JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&content).with_context(|| format!("decoding {}", path.display()))
}

/// Writes `value` as compact JSON, replacing any existing file.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_vec(value)?;
    debug!(path = %path.display(), bytes = body.len(), "Writing JSON file");
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

/// Writes `value` as indented JSON with a trailing newline.
pub fn write_json_pretty(path: &Path, value: &impl Serialize) -> Result<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    debug!(path = %path.display(), bytes = body.len(), "Writing JSON file");
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

/// Loads the filtered `[lat, lon, severity]` triples.
pub fn read_accidents(path: &Path) -> Result<Vec<FilteredAccident>> {
    read_json(path)
}

pub fn write_accidents(path: &Path, accidents: &[FilteredAccident]) -> Result<()> {
    write_json(path, &accidents)
}

/// Prints one `lat lon` line per accident.
pub fn print_coordinates<W: Write>(out: &mut W, accidents: &[FilteredAccident]) -> Result<()> {
    for accident in accidents {
        writeln!(out, "{} {}", accident.latitude, accident.longitude)?;
    }
    out.flush()?;
    Ok(())
}
