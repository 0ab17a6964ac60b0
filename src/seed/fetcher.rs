use futures::StreamExt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

use super::SeedError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub(crate) const MAX_SEED_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Append a `t=<unix millis>` query parameter so caches never serve a stale seed.
pub fn cache_busted(url: &Url) -> Url {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair("t", &millis.to_string());
    busted
}

/// GET the seed text from `url` (cache-busted), bounded in time and size.
pub async fn fetch_seed_text(client: &reqwest::Client, url: &Url) -> Result<String, SeedError> {
    let target = cache_busted(url);
    tracing::debug!(url = %target, "Fetching remote seed");

    let response = tokio::time::timeout(FETCH_TIMEOUT, client.get(target).send())
        .await
        .map_err(|_| SeedError::Timeout)??;

    let status = response.status();
    if !status.is_success() {
        return Err(SeedError::HttpStatus(status.as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_SEED_SIZE).await?;
    String::from_utf8(bytes).map_err(|_| SeedError::NotUtf8)
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, SeedError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(SeedError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(SeedError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
