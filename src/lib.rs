//! linkhub: a terminal bookmark dashboard.
//!
//! Links are grouped by category, filtered by search text, and opened in the
//! system browser with fallback to alternate URLs. The collection lives in a
//! small key-value store under `~/.config/linkhub/` and is seeded on first run.

pub mod app;
pub mod config;
pub mod keybindings;
pub mod opener;
pub mod preferences;
pub mod seed;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
pub mod view;
