use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::Write;
use tracing::{debug, info};

use super::client::HttpClient;
use super::retry::{RetryPolicy, fetch_with_retry};
use crate::config::PipelineConfig;
use crate::output::write_json;

pub const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

/// Network settings for the fetch stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub base_url: String,
    pub retry: RetryPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

pub fn year_url(base_url: &str, year: i32) -> String {
    format!("{}/AccidentStats/{}", base_url.trim_end_matches('/'), year)
}

/// Downloads every configured year, one request at a time, into
/// `accidents_dir/{year}.json`. The year is printed to `out` before its
/// request goes out.
///
/// Stops at the first year that cannot be fetched, decoded or written;
/// files for earlier years stay on disk.
#[tracing::instrument(skip_all, fields(base_url = %options.base_url, dir = %config.accidents_dir.display()))]
pub async fn fetch_years<C: HttpClient, W: Write>(
    client: C,
    config: &PipelineConfig,
    options: &FetchOptions,
    out: &mut W,
) -> Result<usize> {
    config.validate()?;
    fs::create_dir_all(&config.accidents_dir)
        .with_context(|| format!("creating {}", config.accidents_dir.display()))?;

    let mut written = 0;
    for year in config.years() {
        writeln!(out, "{year}")?;
        out.flush()?;

        let url = year_url(&options.base_url, year);
        let bytes = fetch_with_retry(&client, &url, options.retry).await?;
        debug!(year, bytes = bytes.len(), "Response received");

        let body: Value = serde_json::from_slice(&bytes)
            .with_context(|| format!("decoding response from {url}"))?;
        write_json(&config.year_file(year), &body)?;
        written += 1;
    }

    info!(years = written, "Fetch complete");
    Ok(written)
}
