//! Keybinding registry: maps key events to actions, with config overrides.
//!
//! Lookup is per context with a fallback to global bindings, so the same key
//! can mean different things in the link list, category panel, and search bar.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavTop,
    NavBottom,
    CycleFocus,
    Back,
    Select,
    OpenUrlPicker,
    AddLink,
    EditLink,
    DeleteLink,
    ToggleGroup,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    ToggleCategories,
    ExportLinks,
    ImportLinks,
    ResetLinks,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::NavTop => "Jump to top",
            Self::NavBottom => "Jump to bottom",
            Self::CycleFocus => "Switch panel focus",
            Self::Back => "Go back / dismiss",
            Self::Select => "Open link / choose category",
            Self::OpenUrlPicker => "Choose which URL to open",
            Self::AddLink => "Add link",
            Self::EditLink => "Edit link",
            Self::DeleteLink => "Delete link",
            Self::ToggleGroup => "Collapse / expand group",
            Self::EnterSearch => "Search links",
            Self::ExitSearch => "Clear search",
            Self::CommitSearch => "Keep search and return to list",
            Self::ToggleCategories => "Toggle category panel",
            Self::ExportLinks => "Export backup",
            Self::ImportLinks => "Import links from file",
            Self::ResetLinks => "Reset to seed list",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context that determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Links,
    Categories,
    Search,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Accepts a single character ("q", "/"), a named key ("Enter", "Esc",
/// "Space", "Home"), "Ctrl+<char>", or a function key "F1".."F12".
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

/// Format a KeySpec for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ctrl('c'), Action::Quit),
    (Context::Global, KeySpec::ch('j'), Action::NavDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Global, KeySpec::ch('k'), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Global, KeySpec::ch('g'), Action::NavTop),
    (Context::Global, KeySpec::plain(KeyCode::Home), Action::NavTop),
    (Context::Global, KeySpec::ch('G'), Action::NavBottom),
    (Context::Global, KeySpec::plain(KeyCode::End), Action::NavBottom),
    (Context::Global, KeySpec::plain(KeyCode::Tab), Action::CycleFocus),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::plain(KeyCode::Enter), Action::Select),
    (Context::Global, KeySpec::ch('a'), Action::AddLink),
    (Context::Global, KeySpec::ch('/'), Action::EnterSearch),
    (Context::Global, KeySpec::ch('c'), Action::ToggleCategories),
    (Context::Global, KeySpec::ch('x'), Action::ExportLinks),
    (Context::Global, KeySpec::ch('i'), Action::ImportLinks),
    (Context::Global, KeySpec::ch('R'), Action::ResetLinks),
    (Context::Global, KeySpec::ch('t'), Action::CycleTheme),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    (Context::Links, KeySpec::ch('o'), Action::Select),
    (Context::Links, KeySpec::ch('u'), Action::OpenUrlPicker),
    (Context::Links, KeySpec::ch('e'), Action::EditLink),
    (Context::Links, KeySpec::ch('d'), Action::DeleteLink),
    (Context::Links, KeySpec::plain(KeyCode::Delete), Action::DeleteLink),
    (Context::Links, KeySpec::ch(' '), Action::ToggleGroup),
    (Context::Categories, KeySpec::ch('l'), Action::Select),
    (Context::Categories, KeySpec::plain(KeyCode::Right), Action::Select),
    (Context::Search, KeySpec::plain(KeyCode::Esc), Action::ExitSearch),
    (Context::Search, KeySpec::plain(KeyCode::Enter), Action::CommitSearch),
];

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    /// (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::with_capacity(DEFAULT_BINDINGS.len()),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides (action name → key string).
    ///
    /// The new key replaces every existing key for the action, in each
    /// context the action was bound in. Returns warnings for unknown action
    /// names and unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Action for a key in `context`, falling back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);
        self.lookup
            .get(&(context, key))
            .or_else(|| self.lookup.get(&(Context::Global, key)))
            .copied()
    }

    /// First key bound to `action`, formatted for hints.
    pub fn key_for(&self, action: Action) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, _, a)| *a == action)
            .map(|(_, key, _)| format_key(key))
    }

    /// All bindings as (context, key display, action, description).
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a config action name such as "add_link" or "help".
fn parse_action_name(name: &str) -> Option<Action> {
    let action = match name.to_lowercase().replace('-', "_").as_str() {
        "quit" => Action::Quit,
        "nav_down" | "down" => Action::NavDown,
        "nav_up" | "up" => Action::NavUp,
        "nav_top" | "top" => Action::NavTop,
        "nav_bottom" | "bottom" => Action::NavBottom,
        "cycle_focus" | "focus" => Action::CycleFocus,
        "back" => Action::Back,
        "select" | "open" => Action::Select,
        "open_url_picker" | "pick_url" | "urls" => Action::OpenUrlPicker,
        "add_link" | "add" => Action::AddLink,
        "edit_link" | "edit" => Action::EditLink,
        "delete_link" | "delete" => Action::DeleteLink,
        "toggle_group" | "collapse" => Action::ToggleGroup,
        "enter_search" | "search" => Action::EnterSearch,
        "exit_search" => Action::ExitSearch,
        "commit_search" => Action::CommitSearch,
        "toggle_categories" | "categories" => Action::ToggleCategories,
        "export_links" | "export" => Action::ExportLinks,
        "import_links" | "import" => Action::ImportLinks,
        "reset_links" | "reset" => Action::ResetLinks,
        "cycle_theme" | "theme" => Action::CycleTheme,
        "show_help" | "help" => Action::ShowHelp,
        _ => return None,
    };
    Some(action)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(reg: &KeybindingRegistry, key: KeySpec, ctx: Context) -> Option<Action> {
        reg.action_for_key(key.code, key.modifiers, ctx)
    }

    #[test]
    fn test_default_global_keys() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, KeySpec::ch('q'), Context::Global), Some(Action::Quit));
        assert_eq!(lookup(&reg, KeySpec::ch('j'), Context::Global), Some(Action::NavDown));
        assert_eq!(
            lookup(&reg, KeySpec::plain(KeyCode::Up), Context::Global),
            Some(Action::NavUp)
        );
        assert_eq!(lookup(&reg, KeySpec::ch('a'), Context::Global), Some(Action::AddLink));
    }

    #[test]
    fn test_link_keys_only_in_links_context() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, KeySpec::ch('d'), Context::Links), Some(Action::DeleteLink));
        assert_eq!(lookup(&reg, KeySpec::ch('d'), Context::Categories), None);
        assert_eq!(
            lookup(&reg, KeySpec::ch(' '), Context::Links),
            Some(Action::ToggleGroup)
        );
    }

    #[test]
    fn test_context_falls_back_to_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, KeySpec::ch('q'), Context::Links), Some(Action::Quit));
        assert_eq!(
            lookup(&reg, KeySpec::plain(KeyCode::Enter), Context::Categories),
            Some(Action::Select)
        );
    }

    #[test]
    fn test_search_context_overrides_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            lookup(&reg, KeySpec::plain(KeyCode::Esc), Context::Search),
            Some(Action::ExitSearch)
        );
        assert_eq!(
            lookup(&reg, KeySpec::plain(KeyCode::Esc), Context::Global),
            Some(Action::Back)
        );
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("add_link".to_string(), "n".to_string())]);
        assert!(reg.apply_overrides(&overrides).is_empty());
        assert_eq!(lookup(&reg, KeySpec::ch('a'), Context::Global), None);
        assert_eq!(lookup(&reg, KeySpec::ch('n'), Context::Global), Some(Action::AddLink));
    }

    #[test]
    fn test_override_replaces_all_keys_in_same_contexts() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("delete".to_string(), "X".to_string())]);
        assert!(reg.apply_overrides(&overrides).is_empty());
        assert_eq!(lookup(&reg, KeySpec::ch('X'), Context::Links), Some(Action::DeleteLink));
        assert_eq!(lookup(&reg, KeySpec::ch('X'), Context::Global), None);
        assert_eq!(lookup(&reg, KeySpec::plain(KeyCode::Delete), Context::Links), None);
        let count = reg
            .all_bindings()
            .iter()
            .filter(|(_, _, a, _)| *a == Action::DeleteLink)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_apply_overrides_warnings() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([
            ("no_such_action".to_string(), "q".to_string()),
            ("quit".to_string(), "Ctrl+Alt+Q".to_string()),
        ]);
        let mut warnings = reg.apply_overrides(&overrides);
        warnings.sort();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Cannot parse key"));
        assert!(warnings[1].contains("Unknown action"));
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::ch(' ')));
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(parse_key_string("F5"), Some(KeySpec::plain(KeyCode::F(5))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("f"), Some(KeySpec::ch('f')));
        assert_eq!(parse_key_string("é"), Some(KeySpec::ch('é')));
        assert_eq!(parse_key_string("word"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::ch('q')), "q");
        assert_eq!(format_key(&KeySpec::ch(' ')), "Space");
        assert_eq!(format_key(&KeySpec::ctrl('c')), "Ctrl+c");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_key_for_and_descriptions() {
        let reg = KeybindingRegistry::new();
        assert_eq!(reg.key_for(Action::ShowHelp).as_deref(), Some("?"));
        assert_eq!(Action::AddLink.describe(), "Add link");
        assert!(reg.all_bindings().len() >= 25);
    }
}
