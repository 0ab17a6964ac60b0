//! Helper functions for UI operations.
//!
//! This module contains utility functions shared across the UI layer:
//! panic capture for background tasks, spawning fallback-open sequences,
//! and path expansion for the import prompt.

use crate::app::{App, AppEvent};
use crate::opener::open_with_fallback;
use crate::storage::Link;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Error message for actions that need a link under the cursor
pub(super) const ERR_NO_LINK_SELECTED: &str = "No link selected";

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing (caught by Tokio's runtime but
/// not handled), panics are converted to `Err(String)` containing the panic
/// message.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Start the fallback-open sequence for `link` in the background.
///
/// The result arrives as `AppEvent::LinkOpened`. Sequences are independent;
/// activating a link again while one is running starts a second one.
pub(super) fn spawn_open(app: &mut App, link: &Link, event_tx: &mpsc::Sender<AppEvent>) {
    let launcher = Arc::clone(&app.launcher);
    let urls = link.candidates().to_vec();
    let label = link.title.clone();
    let policy = app.fallback;
    let tx = event_tx.clone();

    tracing::debug!(label = %label, urls = urls.len(), "Spawning open sequence");

    let handle = tokio::spawn(async move {
        let sequence = open_with_fallback(launcher.as_ref(), &urls, &label, policy);
        let result = catch_task_panic(sequence).await;
        let event = match result {
            Ok(outcome) => AppEvent::LinkOpened { label, outcome },
            Err(error) => {
                tracing::error!(error = %error, "Open task panicked");
                AppEvent::TaskPanicked {
                    task: "open_link",
                    error,
                }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "Failed to send open result (receiver dropped)");
        }
    });

    app.reap_open_tasks();
    app.open_tasks.push(handle);
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_path(input: &str) -> PathBuf {
    let input = input.trim();
    match (input.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(input),
    }
}
