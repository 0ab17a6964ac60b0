//! First-run seed data.
//!
//! Sources are tried in order: the configured remote URL, the seed file,
//! then the list compiled into the binary. A source that fails or yields
//! an empty list falls through to the next one.

mod fetcher;
mod parser;

pub use fetcher::{cache_busted, fetch_seed_text};
pub use parser::parse_seed;

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

use crate::storage::Link;

/// Seed list shipped with the binary.
pub const EMBEDDED_SEED: &str = include_str!("../../assets/seed_links.json");

/// Errors from loading a seed source.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Seed exceeds the size limit")]
    TooLarge,

    #[error("Seed is not valid UTF-8")]
    NotUtf8,

    #[error("Failed to read seed file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Seed is not a JSON array")]
    NotArray,

    /// Every source was tried and none produced links.
    #[error("No links found in any seed source")]
    Empty,
}

/// Where migrated links came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOrigin {
    Remote,
    File,
    Embedded,
}

impl SeedOrigin {
    pub fn name(self) -> &'static str {
        match self {
            Self::Remote => "remote seed",
            Self::File => "seed file",
            Self::Embedded => "built-in seed",
        }
    }
}

/// Links produced by a seed source.
#[derive(Debug, Clone)]
pub struct Seed {
    pub links: Vec<Link>,
    pub origin: SeedOrigin,
}

/// Resolves the seed from the configured sources.
#[derive(Debug, Clone)]
pub struct SeedLoader {
    client: Option<reqwest::Client>,
    remote: Option<Url>,
    path: Option<PathBuf>,
    embedded: &'static str,
}

impl SeedLoader {
    /// Loader that can fetch remote seeds with `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client: Some(client),
            ..Self::offline()
        }
    }

    /// Loader without HTTP access; a configured remote URL is skipped.
    pub fn offline() -> Self {
        Self {
            client: None,
            remote: None,
            path: None,
            embedded: EMBEDDED_SEED,
        }
    }

    pub fn with_remote(mut self, url: Option<Url>) -> Self {
        self.remote = url;
        self
    }

    pub fn with_file(mut self, path: Option<PathBuf>) -> Self {
        self.path = path;
        self
    }

    pub fn with_embedded(mut self, text: &'static str) -> Self {
        self.embedded = text;
        self
    }

    /// Produce the first non-empty seed.
    ///
    /// # Errors
    ///
    /// Returns the embedded seed's parse error if it is malformed, otherwise
    /// [`SeedError::Empty`] when no source yields links.
    pub async fn load(&self) -> Result<Seed, SeedError> {
        if let Some(links) = self.try_remote().await {
            return Ok(Seed {
                links,
                origin: SeedOrigin::Remote,
            });
        }

        if let Some(links) = self.try_file().await {
            return Ok(Seed {
                links,
                origin: SeedOrigin::File,
            });
        }

        let links = parse_seed(self.embedded).inspect_err(|e| {
            tracing::error!(error = %e, "Built-in seed is invalid");
        })?;
        if links.is_empty() {
            return Err(SeedError::Empty);
        }
        Ok(Seed {
            links,
            origin: SeedOrigin::Embedded,
        })
    }

    async fn try_remote(&self) -> Option<Vec<Link>> {
        let url = self.remote.as_ref()?;
        let Some(client) = self.client.as_ref() else {
            tracing::debug!(url = %url, "Remote seed configured but loader is offline");
            return None;
        };

        let result = match fetch_seed_text(client, url).await {
            Ok(text) => parse_seed(&text),
            Err(e) => Err(e),
        };
        non_empty(result, "remote seed")
    }

    async fn try_file(&self) -> Option<Vec<Link>> {
        let path = self.path.as_ref()?;
        let result = match tokio::fs::read_to_string(path).await {
            Ok(text) => parse_seed(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No seed file");
                return None;
            }
            Err(source) => Err(SeedError::Io {
                path: path.clone(),
                source,
            }),
        };
        non_empty(result, "seed file")
    }
}

fn non_empty(result: Result<Vec<Link>, SeedError>, source: &str) -> Option<Vec<Link>> {
    match result {
        Ok(links) if !links.is_empty() => Some(links),
        Ok(_) => {
            tracing::warn!(source, "Seed source is empty, trying next");
            None
        }
        Err(e) => {
            tracing::warn!(source, error = %e, "Seed source failed, trying next");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_seed_is_valid() {
        let links = parse_seed(EMBEDDED_SEED).unwrap();
        assert!(!links.is_empty());
        assert!(links.iter().all(|l| !l.urls.is_empty()));
    }

    #[tokio::test]
    async fn test_file_seed_preferred_over_embedded() {
        let path = std::env::temp_dir().join("linkhub_seed_file_test.json");
        std::fs::write(&path, r#"[{"title":"From file","url":"https://file.example"}]"#)
            .unwrap();

        let seed = SeedLoader::offline()
            .with_file(Some(path.clone()))
            .load()
            .await
            .unwrap();
        assert_eq!(seed.origin, SeedOrigin::File);
        assert_eq!(seed.links[0].title, "From file");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_empty_file_falls_back_to_embedded() {
        let path = std::env::temp_dir().join("linkhub_seed_empty_test.json");
        std::fs::write(&path, "[]").unwrap();

        let seed = SeedLoader::offline()
            .with_file(Some(path.clone()))
            .with_embedded(r#"[{"title":"Built in","url":"https://b.example"}]"#)
            .load()
            .await
            .unwrap();
        assert_eq!(seed.origin, SeedOrigin::Embedded);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_missing_file_and_bad_embedded() {
        let result = SeedLoader::offline()
            .with_file(Some(std::env::temp_dir().join("linkhub_seed_absent.json")))
            .with_embedded("{broken")
            .load()
            .await;
        assert!(matches!(result, Err(SeedError::Parse(_))));
    }

    #[tokio::test]
    async fn test_all_empty_is_reported() {
        let result = SeedLoader::offline().with_embedded("[]").load().await;
        assert!(matches!(result, Err(SeedError::Empty)));
    }
}
