//! Application event handling.
//!
//! This module processes background task completion events: results of
//! fallback-open sequences and panics captured in spawned tasks.

use crate::app::{App, AppEvent};
use crate::opener::OpenOutcome;
use crate::util::{display_host, strip_control_chars};

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::LinkOpened { label, outcome } => {
            let label = strip_control_chars(&label).into_owned();
            match outcome {
                OpenOutcome::Opened { attempt: 1, .. } => {
                    app.set_status(format!("Opened {}", label));
                }
                OpenOutcome::Opened { url, attempt } => {
                    app.set_status(format!(
                        "Opened {} via fallback #{} ({})",
                        label,
                        attempt - 1,
                        display_host(&url)
                    ));
                }
                OpenOutcome::Exhausted {
                    attempts,
                    last_error,
                } => {
                    app.set_error(format!(
                        "Could not open {} ({} tried): {}",
                        label, attempts, last_error
                    ));
                }
                OpenOutcome::NoUrls => {
                    app.set_error(format!("{} has no URL", label));
                }
            }
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_error(format!("Internal error in {}: {}", task, error));
        }
    }
}
