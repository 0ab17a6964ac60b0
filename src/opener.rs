//! Opening links in the system browser, with fallback to alternate URLs.

use std::time::Duration;
use thiserror::Error;

use crate::util::{validate_url_for_open, UrlValidationError};

/// Why a single launch attempt failed.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Refused to open: {0}")]
    Rejected(#[from] UrlValidationError),

    #[error("Failed to launch browser: {0}")]
    Launch(#[from] std::io::Error),
}

/// Hands a URL to something that displays it.
///
/// Only synchronous failure is observable; success means the request was
/// handed off, not that the page loaded.
pub trait Launcher: Send + Sync {
    fn launch(&self, url: &str) -> Result<(), LaunchError>;
}

/// Opens URLs with the platform's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, url: &str) -> Result<(), LaunchError> {
        open::that_detached(url)?;
        Ok(())
    }
}

/// Delays between fallback attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Wait before the second URL.
    pub initial_delay: Duration,
    /// Wait before each URL after the second.
    pub retry_delay: Duration,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(300),
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Result of a fallback sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// `url` opened on the given attempt (1-based).
    Opened { url: String, attempt: usize },
    /// Every URL failed.
    Exhausted { attempts: usize, last_error: String },
    /// There was nothing to open.
    NoUrls,
}

/// Validate `url` and pass it to `launcher`.
pub fn open_direct(launcher: &dyn Launcher, url: &str) -> Result<(), LaunchError> {
    let valid = validate_url_for_open(url)?;
    launcher.launch(valid.as_str())
}

/// Try `urls` in order until one launches.
///
/// The first URL is tried at once. After a failure the next URL is tried
/// after `initial_delay`, and each later one after `retry_delay`.
pub async fn open_with_fallback(
    launcher: &dyn Launcher,
    urls: &[String],
    label: &str,
    policy: FallbackPolicy,
) -> OpenOutcome {
    let mut last_error = None;

    for (index, url) in urls.iter().enumerate() {
        match index {
            0 => {}
            1 => tokio::time::sleep(policy.initial_delay).await,
            _ => tokio::time::sleep(policy.retry_delay).await,
        }

        match open_direct(launcher, url) {
            Ok(()) => {
                tracing::debug!(label, url = %url, attempt = index + 1, "Link opened");
                return OpenOutcome::Opened {
                    url: url.clone(),
                    attempt: index + 1,
                };
            }
            Err(e) => {
                tracing::warn!(label, url = %url, error = %e, "Open attempt failed");
                last_error = Some(e.to_string());
            }
        }
    }

    match last_error {
        Some(last_error) => OpenOutcome::Exhausted {
            attempts: urls.len(),
            last_error,
        },
        None => OpenOutcome::NoUrls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every launch; fails for URLs containing "down".
    #[derive(Default)]
    struct FlakyLauncher {
        seen: Mutex<Vec<String>>,
    }

    impl Launcher for FlakyLauncher {
        fn launch(&self, url: &str) -> Result<(), LaunchError> {
            self.seen.lock().unwrap().push(url.to_string());
            if url.contains("down") {
                Err(std::io::Error::other("no handler").into())
            } else {
                Ok(())
            }
        }
    }

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_stops() {
        let launcher = FlakyLauncher::default();
        let outcome = open_with_fallback(
            &launcher,
            &urls(&["https://up.example/", "https://other.example/"]),
            "Up",
            FallbackPolicy::default(),
        )
        .await;
        assert_eq!(
            outcome,
            OpenOutcome::Opened {
                url: "https://up.example/".to_string(),
                attempt: 1
            }
        );
        assert_eq!(launcher.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_url_counts_as_failure() {
        let launcher = FlakyLauncher::default();
        let outcome = open_with_fallback(
            &launcher,
            &urls(&["javascript:alert(1)", "https://ok.example/"]),
            "Mixed",
            FallbackPolicy::default(),
        )
        .await;
        assert_eq!(
            outcome,
            OpenOutcome::Opened {
                url: "https://ok.example/".to_string(),
                attempt: 2
            }
        );
        // The rejected URL never reached the launcher
        assert_eq!(*launcher.seen.lock().unwrap(), urls(&["https://ok.example/"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_fail_is_exhausted() {
        let launcher = FlakyLauncher::default();
        let outcome = open_with_fallback(
            &launcher,
            &urls(&["https://down1.example/", "https://down2.example/"]),
            "Down",
            FallbackPolicy::default(),
        )
        .await;
        match outcome {
            OpenOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("no handler"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_is_no_urls() {
        let launcher = FlakyLauncher::default();
        let outcome =
            open_with_fallback(&launcher, &[], "Nothing", FallbackPolicy::default()).await;
        assert_eq!(outcome, OpenOutcome::NoUrls);
    }

    #[test]
    fn test_open_direct_validates() {
        let launcher = FlakyLauncher::default();
        assert!(matches!(
            open_direct(&launcher, "file:///etc/passwd"),
            Err(LaunchError::Rejected(_))
        ));
        assert!(open_direct(&launcher, "https://fine.example").is_ok());
    }
}
