//! HTTP fetching of the yearly accident statistics.

mod basic;
mod client;
mod retry;
#[cfg(test)]
mod stub;
mod years;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use retry::{RetryPolicy, fetch_with_retry};
pub use years::{DEFAULT_BASE_URL, FetchOptions, fetch_years, year_url};

use anyhow::Result;

/// Issues a GET through `client` and returns the body of a 2xx response.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
