//! Terminal User Interface module.
//!
//! This module provides the TUI for the link dashboard, including:
//! - Main event loop (`run`)
//! - Input handling for the link list, category panel, search and overlays
//! - Rendering for the grouped link list and its overlays
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch
//! - `helpers` - Shared utility functions
//! - `links` - Grouped link list widget
//! - `categories` - Category panel widget
//! - `form` - Add/edit form, URL picker and import prompt overlays
//! - `help` - Keybinding overlay
//! - `status` - Status bar widget

// Submodules for UI components
mod categories;
mod events;
mod form;
mod help;
mod helpers;
mod input;
mod links;
mod loop_runner;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
