//! Theme system for the TUI.
//!
//! Semantic color roles map to ratatui `Style` values. `ThemeVariant`
//! selects the Dark or Light palette and `StyleMap` resolves role names.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Name stored in preferences.
    pub fn key(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Link list --
    pub link_title: Style,
    pub link_selected: Style,
    pub link_host: Style,
    pub link_badge: Style,
    pub group_header: Style,
    pub group_count: Style,
    pub placeholder: Style,

    // -- Category panel --
    pub category_normal: Style,
    pub category_active: Style,
    pub category_selected: Style,
    pub category_count: Style,

    // -- Forms and overlays --
    pub overlay_border: Style,
    pub form_label: Style,
    pub form_input: Style,
    pub form_input_focused: Style,
    pub form_error: Style,
    pub help_key: Style,

    // -- Chrome --
    pub search_bar: Style,
    pub status_bar: Style,
    pub status_error: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        let selected = Style::default().bg(Color::DarkGray).fg(Color::White);
        Self {
            link_title: Style::default(),
            link_selected: selected.add_modifier(Modifier::BOLD),
            link_host: Style::default().fg(Color::DarkGray),
            link_badge: Style::default().fg(Color::Yellow),
            group_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            group_count: Style::default().fg(Color::DarkGray),
            placeholder: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            category_normal: Style::default(),
            category_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            category_selected: selected,
            category_count: Style::default().fg(Color::DarkGray),

            overlay_border: Style::default().fg(Color::Yellow),
            form_label: Style::default().fg(Color::Gray),
            form_input: Style::default(),
            form_input_focused: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::UNDERLINED),
            form_error: Style::default().fg(Color::Red),
            help_key: Style::default().fg(Color::Yellow),

            search_bar: Style::default().fg(Color::Yellow),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_error: Style::default().bg(Color::DarkGray).fg(Color::LightRed),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
        }
    }

    fn light() -> Self {
        let selected = Style::default().bg(Color::Blue).fg(Color::White);
        Self {
            link_title: Style::default().fg(Color::Black),
            link_selected: selected.add_modifier(Modifier::BOLD),
            link_host: Style::default().fg(Color::DarkGray),
            link_badge: Style::default().fg(Color::Magenta),
            group_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            group_count: Style::default().fg(Color::DarkGray),
            placeholder: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            category_normal: Style::default().fg(Color::Black),
            category_active: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            category_selected: selected,
            category_count: Style::default().fg(Color::DarkGray),

            overlay_border: Style::default().fg(Color::Magenta),
            form_label: Style::default().fg(Color::DarkGray),
            form_input: Style::default().fg(Color::Black),
            form_input_focused: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::UNDERLINED),
            form_error: Style::default().fg(Color::Red),
            help_key: Style::default().fg(Color::Magenta),

            search_bar: Style::default().fg(Color::Magenta),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_error: Style::default().bg(Color::White).fg(Color::Red),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup, built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

const ROLE_COUNT: usize = 22;

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; ROLE_COUNT] = [
    "link_title",
    "link_selected",
    "link_host",
    "link_badge",
    "group_header",
    "group_count",
    "placeholder",
    "category_normal",
    "category_active",
    "category_selected",
    "category_count",
    "overlay_border",
    "form_label",
    "form_input",
    "form_input_focused",
    "form_error",
    "help_key",
    "search_bar",
    "status_bar",
    "status_error",
    "panel_border",
    "panel_border_focused",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; ROLE_COUNT] = [
            p.link_title,
            p.link_selected,
            p.link_host,
            p.link_badge,
            p.group_header,
            p.group_count,
            p.placeholder,
            p.category_normal,
            p.category_active,
            p.category_selected,
            p.category_count,
            p.overlay_border,
            p.form_label,
            p.form_input,
            p.form_input_focused,
            p.form_error,
            p.help_key,
            p.search_bar,
            p.status_bar,
            p.status_error,
            p.panel_border,
            p.panel_border_focused,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name; unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}
