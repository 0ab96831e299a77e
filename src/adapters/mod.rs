// Adapters layer: concrete clients for the external systems the digest talks to.

pub mod arxiv;
pub mod gmail;
pub mod semantic_scholar;

use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = "KernelDigest/1.0";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Keeps at most `max` characters, cutting on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
