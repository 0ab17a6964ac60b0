//! Small helpers shared by the UI and the opener.
//!
//! - **URL checks**: what may be handed to the system browser, and how a
//!   link's host is displayed
//! - **Text**: Unicode-aware width, truncation and control-character stripping

mod text;
mod url_validator;

pub use text::{display_width, pad_to_width, strip_control_chars, truncate_to_width};
pub use url_validator::{display_host, validate_url_for_open, UrlValidationError};

/// Longest search query accepted from the search bar.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
