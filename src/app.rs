use crate::keybindings::KeybindingRegistry;
use crate::opener::{FallbackPolicy, Launcher, OpenOutcome};
use crate::preferences::PreferenceManager;
use crate::seed::SeedLoader;
use crate::storage::{Link, LinkDraft, LinkPatch, LinkStore, LoadOutcome, DEFAULT_CATEGORY};
use crate::theme::{StyleMap, ThemeVariant};
use crate::util::validate_url_for_open;
use crate::view::{self, CategoryEntry, CategoryFilter, Filter, ViewRow};
use anyhow::{Context, Result};
use ratatui::style::Style;
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Longest value accepted in a single form field.
pub const MAX_FIELD_LENGTH: usize = 2048;

/// Which panel has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Links,
}

// ============================================================================
// Confirmation Dialog
// ============================================================================

/// Pending confirmation action for destructive operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Remove a single link.
    DeleteLink { id: String, title: String },
    /// Replace the whole collection with the contents of an import file.
    ImportLinks { links: Vec<Link>, source: PathBuf },
    /// Drop the stored collection and migrate from the seed again.
    ResetLinks,
}

impl ConfirmAction {
    /// Question shown in the confirmation overlay.
    pub fn prompt(&self) -> String {
        match self {
            Self::DeleteLink { title, .. } => format!("Delete \"{}\"?", title),
            Self::ImportLinks { links, .. } => {
                format!("Replace current list with {} items?", links.len())
            }
            Self::ResetLinks => "This will reset your dashboard to the default list. \
                                 Any local changes will be lost. Continue?"
                .to_string(),
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A state change requested by the input layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddLink(LinkDraft),
    UpdateLink { id: String, patch: LinkPatch },
    DeleteLink { id: String },
    SetSearch(String),
    SetCategory(CategoryFilter),
    ImportLinks(Vec<Link>),
    ResetLinks,
}

/// What a dispatched command did. The view is already rebuilt when this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    LinkAdded { id: String },
    LinkUpdated { id: String },
    LinkDeleted { title: String },
    /// The command referred to a link that no longer exists.
    Unchanged,
    FilterChanged { visible: usize },
    Imported { count: usize },
    Reset(LoadOutcome),
}

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A fallback-open sequence finished.
    LinkOpened { label: String, outcome: OpenOutcome },
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Link Form
// ============================================================================

/// Input fields of the add/edit form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Url,
    Alternates,
    Icon,
    Category,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        Self::Title,
        Self::Url,
        Self::Alternates,
        Self::Icon,
        Self::Category,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Url => "URL",
            Self::Alternates => "Alt URLs",
            Self::Icon => "Icon",
            Self::Category => "Category",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Title => Self::Url,
            Self::Url => Self::Alternates,
            Self::Alternates => Self::Icon,
            Self::Icon => Self::Category,
            Self::Category => Self::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Title => Self::Category,
            Self::Url => Self::Title,
            Self::Alternates => Self::Url,
            Self::Icon => Self::Alternates,
            Self::Category => Self::Icon,
        }
    }
}

/// State of the add/edit overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkForm {
    /// Id of the link being edited; `None` when adding.
    pub editing: Option<String>,
    pub title: String,
    pub url: String,
    /// Extra URLs separated by commas or whitespace.
    pub alternates: String,
    pub icon: String,
    pub category: String,
    pub focused: Option<FormField>,
    /// Category names offered for completion.
    pub suggestions: Vec<String>,
    /// Validation message from the last submit attempt.
    pub error: Option<String>,
    category_prefix: String,
    suggestion_cursor: Option<usize>,
}

impl LinkForm {
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            focused: Some(FormField::Title),
            suggestions,
            ..Self::default()
        }
    }

    /// Form pre-filled from `link`.
    pub fn edit(link: &Link, suggestions: Vec<String>) -> Self {
        let alternates = link.candidates().iter().skip(1).cloned().collect::<Vec<_>>();
        Self {
            editing: Some(link.id.clone()),
            title: link.title.clone(),
            url: link.url.clone(),
            alternates: alternates.join(", "),
            icon: link.icon.clone().unwrap_or_default(),
            category: link.category.clone(),
            category_prefix: link.category.clone(),
            ..Self::new(suggestions)
        }
    }

    pub fn field(&self) -> FormField {
        self.focused.unwrap_or(FormField::Title)
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Url => &self.url,
            FormField::Alternates => &self.alternates,
            FormField::Icon => &self.icon,
            FormField::Category => &self.category,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Url => &mut self.url,
            FormField::Alternates => &mut self.alternates,
            FormField::Icon => &mut self.icon,
            FormField::Category => &mut self.category,
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = Some(self.field().next());
    }

    pub fn focus_prev(&mut self) {
        self.focused = Some(self.field().prev());
    }

    pub fn push_char(&mut self, c: char) {
        let field = self.field();
        let value = self.value_mut(field);
        if value.len() < MAX_FIELD_LENGTH {
            value.push(c);
        }
        self.after_edit(field);
    }

    pub fn backspace(&mut self) {
        let field = self.field();
        self.value_mut(field).pop();
        self.after_edit(field);
    }

    fn after_edit(&mut self, field: FormField) {
        self.error = None;
        if field == FormField::Category {
            self.category_prefix = self.category.clone();
            self.suggestion_cursor = None;
        }
    }

    /// Suggestions that start with what the user typed, case-insensitively.
    pub fn matching_suggestions(&self) -> Vec<&str> {
        let prefix = self.category_prefix.to_lowercase();
        self.suggestions
            .iter()
            .filter(|s| s.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }

    /// Replace the category with the next (or previous) matching suggestion.
    pub fn cycle_suggestion(&mut self, forward: bool) {
        let matches = self.matching_suggestions();
        if matches.is_empty() {
            return;
        }
        let len = matches.len();
        let next = match (self.suggestion_cursor, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.category = matches[next].to_string();
        self.suggestion_cursor = Some(next);
    }

    /// Validate the fields and build a draft.
    ///
    /// Title and URL are required and every URL must be openable. Alternate
    /// URLs repeating an earlier one are dropped, and a blank category
    /// becomes "Others".
    pub fn to_draft(&self) -> Result<LinkDraft, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        let url = self.url.trim();
        if url.is_empty() {
            return Err("URL is required".to_string());
        }

        let mut urls = vec![url.to_string()];
        for alt in self
            .alternates
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
        {
            if !urls.iter().any(|u| u == alt) {
                urls.push(alt.to_string());
            }
        }
        for candidate in &urls {
            validate_url_for_open(candidate).map_err(|e| e.to_string())?;
        }

        let icon = Some(self.icon.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string);
        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };

        Ok(LinkDraft {
            title: title.to_string(),
            url: url.to_string(),
            urls,
            icon,
            category,
        })
    }
}

/// List of a link's URLs; the chosen one opens without fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPicker {
    pub title: String,
    pub urls: Vec<String>,
    pub selected: usize,
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub links: LinkStore,
    pub prefs: PreferenceManager,
    pub seed: SeedLoader,
    pub launcher: Arc<dyn Launcher>,
    pub fallback: FallbackPolicy,
    /// Directory backups are written to.
    pub export_dir: PathBuf,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    // Projection
    pub filter: Filter,
    pub rows: Vec<ViewRow>,
    pub menu: Vec<CategoryEntry>,
    pub collapsed: HashSet<String>,
    /// Links passing the filter, including those in collapsed groups.
    pub visible_links: usize,

    // UI State
    pub focus: Focus,
    pub selected_row: usize,
    pub selected_category: usize,
    pub show_categories: bool,

    // Search
    pub search_mode: bool,
    pub search_input: String,

    // Status message with expiry; Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub status_is_error: bool,

    /// Set whenever state changes in a way the next frame must show.
    pub needs_redraw: bool,

    // Overlays
    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub pending_confirm: Option<ConfirmAction>,
    pub form: Option<LinkForm>,
    pub url_picker: Option<UrlPicker>,
    /// Path typed into the import prompt, when it is open.
    pub import_prompt: Option<String>,

    /// Fallback-open sequences still running.
    pub open_tasks: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(
        links: LinkStore,
        prefs: PreferenceManager,
        seed: SeedLoader,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        let theme_variant = ThemeVariant::from_str_name(prefs.theme_variant()).unwrap_or_else(|| {
            tracing::warn!(theme = prefs.theme_variant(), "Unknown theme, using dark");
            ThemeVariant::Dark
        });

        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&prefs.keybinding_overrides()) {
            tracing::warn!("{}", warning);
        }

        let mut app = Self {
            links,
            prefs,
            seed,
            launcher,
            fallback: FallbackPolicy::default(),
            export_dir: PathBuf::from("."),
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            keybindings,
            filter: Filter::default(),
            rows: Vec::new(),
            menu: Vec::new(),
            collapsed: HashSet::new(),
            visible_links: 0,
            focus: Focus::Links,
            selected_row: 0,
            selected_category: 0,
            show_categories: false,
            search_mode: false,
            search_input: String::new(),
            status_message: None,
            status_is_error: false,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
            pending_confirm: None,
            form: None,
            url_picker: None,
            import_prompt: None,
            open_tasks: Vec::new(),
        };
        app.refresh_view();
        app.selected_row = app.first_link_row().unwrap_or(0);
        app
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Switch to a different theme variant at runtime.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme and remember it.
    ///
    /// The theme changes even if it cannot be persisted.
    pub fn cycle_theme(&mut self) -> Result<&'static str> {
        let next = self.theme_variant.next();
        self.set_theme(next);
        self.prefs
            .set("theme", next.key())
            .context("Failed to save theme")?;
        Ok(next.name())
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Apply `command`, then rebuild the projection.
    ///
    /// The projection is rebuilt on failure too: a store write error leaves
    /// the in-memory change in place.
    pub async fn dispatch(&mut self, command: Command) -> Result<StateChange> {
        let result = self.apply(command).await;
        self.refresh_view();
        if let Ok(StateChange::LinkAdded { id } | StateChange::LinkUpdated { id }) = &result {
            let id = id.clone();
            self.select_link(&id);
        }
        result
    }

    async fn apply(&mut self, command: Command) -> Result<StateChange> {
        match command {
            Command::AddLink(draft) => {
                let id = self.links.add(draft).context("Failed to add link")?;
                tracing::debug!(id = %id, "Link added");
                Ok(StateChange::LinkAdded { id })
            }
            Command::UpdateLink { id, patch } => {
                let found = self
                    .links
                    .update(&id, patch)
                    .context("Failed to update link")?;
                Ok(if found {
                    StateChange::LinkUpdated { id }
                } else {
                    tracing::debug!(id = %id, "Update for unknown link ignored");
                    StateChange::Unchanged
                })
            }
            Command::DeleteLink { id } => {
                Ok(match self.links.delete(&id).context("Failed to delete link")? {
                    Some(link) => StateChange::LinkDeleted { title: link.title },
                    None => StateChange::Unchanged,
                })
            }
            Command::SetSearch(query) => {
                self.filter.query = query;
                Ok(StateChange::FilterChanged {
                    visible: self.count_visible(),
                })
            }
            Command::SetCategory(category) => {
                self.filter.category = category;
                self.selected_category = self
                    .menu
                    .iter()
                    .position(|e| e.name == self.filter.category.name())
                    .unwrap_or(0);
                Ok(StateChange::FilterChanged {
                    visible: self.count_visible(),
                })
            }
            Command::ImportLinks(links) => {
                let count = self
                    .links
                    .replace_all(links)
                    .context("Failed to save imported links")?;
                tracing::info!(count, "Links imported");
                Ok(StateChange::Imported { count })
            }
            Command::ResetLinks => {
                let outcome = self
                    .links
                    .reset(&self.seed)
                    .await
                    .context("Failed to reset links")?;
                self.collapsed.clear();
                Ok(StateChange::Reset(outcome))
            }
        }
    }

    fn count_visible(&self) -> usize {
        self.links
            .links()
            .iter()
            .filter(|l| self.filter.matches(l))
            .count()
    }

    /// Recompute the category menu and the visible rows from the collection.
    pub fn refresh_view(&mut self) {
        let stats = self.links.stats();
        self.menu = view::category_menu(&stats, self.links.len());

        let groups = view::project(self.links.links(), &self.filter);
        self.visible_links = groups.iter().map(|g| g.len()).sum();
        self.rows = view::rows(&groups, &self.collapsed);

        self.clamp_selections();
        self.needs_redraw = true;
    }

    /// Ensure selection indices are within bounds.
    pub fn clamp_selections(&mut self) {
        self.selected_row = self.selected_row.min(self.rows.len().saturating_sub(1));
        self.selected_category = self
            .selected_category
            .min(self.menu.len().saturating_sub(1));
    }

    /// Report a load or reset result in the status bar.
    pub fn report_load(&mut self, outcome: &LoadOutcome) {
        match outcome {
            LoadOutcome::Restored { count, backfilled } if *backfilled > 0 => self.set_status(
                format!("Loaded {} links ({} given new ids)", count, backfilled),
            ),
            LoadOutcome::Restored { count, .. } => {
                self.set_status(format!("Loaded {} links", count))
            }
            LoadOutcome::Migrated { count, origin } => {
                self.set_status(format!("Imported {} links from {}", count, origin.name()))
            }
            LoadOutcome::NoSeedData { reason } => {
                self.set_error(format!("No links found: {}", reason))
            }
            LoadOutcome::Corrupt { error } => {
                self.set_error(format!("Saved links are unreadable, starting empty: {}", error))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    pub fn selected_view_row(&self) -> Option<&ViewRow> {
        self.rows.get(self.selected_row)
    }

    /// The link under the cursor, if the cursor is on a link row.
    pub fn selected_link(&self) -> Option<&Link> {
        match self.selected_view_row()? {
            ViewRow::Link { index } => self.links.links().get(*index),
            ViewRow::Header { .. } => None,
        }
    }

    /// Category of the group under the cursor (header or link row).
    pub fn selected_group(&self) -> Option<String> {
        match self.selected_view_row()? {
            ViewRow::Header { category, .. } => Some(category.clone()),
            ViewRow::Link { index } => self.links.links().get(*index).map(|l| l.category.clone()),
        }
    }

    pub fn selected_menu_entry(&self) -> Option<&CategoryEntry> {
        self.menu.get(self.selected_category)
    }

    fn first_link_row(&self) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| matches!(r, ViewRow::Link { .. }))
    }

    /// Move the cursor onto the link with `id`, if it is visible.
    pub fn select_link(&mut self, id: &str) -> bool {
        let position = self.rows.iter().position(|row| match row {
            ViewRow::Link { index } => self.links.links().get(*index).is_some_and(|l| l.id == id),
            ViewRow::Header { .. } => false,
        });
        match position {
            Some(row) => {
                self.selected_row = row;
                true
            }
            None => false,
        }
    }

    /// Collapse or expand the group under the cursor, keeping the cursor on
    /// its header.
    pub fn toggle_group(&mut self) {
        let Some(category) = self.selected_group() else {
            return;
        };
        if !self.collapsed.remove(&category) {
            self.collapsed.insert(category.clone());
        }
        self.refresh_view();
        if let Some(row) = self.rows.iter().position(
            |r| matches!(r, ViewRow::Header { category: c, .. } if *c == category),
        ) {
            self.selected_row = row;
        }
    }

    /// Navigate up in current list
    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Categories => {
                self.selected_category = self.selected_category.saturating_sub(1);
            }
            Focus::Links => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
        }
    }

    /// Navigate down in current list
    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Categories => {
                if !self.menu.is_empty() {
                    let max_index = self.menu.len().saturating_sub(1);
                    self.selected_category =
                        self.selected_category.saturating_add(1).min(max_index);
                }
            }
            Focus::Links => {
                if !self.rows.is_empty() {
                    let max_index = self.rows.len().saturating_sub(1);
                    self.selected_row = self.selected_row.saturating_add(1).min(max_index);
                }
            }
        }
    }

    pub fn nav_top(&mut self) {
        match self.focus {
            Focus::Categories => self.selected_category = 0,
            Focus::Links => self.selected_row = 0,
        }
    }

    pub fn nav_bottom(&mut self) {
        match self.focus {
            Focus::Categories => self.selected_category = self.menu.len().saturating_sub(1),
            Focus::Links => self.selected_row = self.rows.len().saturating_sub(1),
        }
    }

    // ------------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------------

    pub fn open_add_form(&mut self) {
        self.form = Some(LinkForm::new(view::category_suggestions(&self.links.stats())));
    }

    /// Open the form for the selected link. Returns false if no link is selected.
    pub fn open_edit_form(&mut self) -> bool {
        let suggestions = view::category_suggestions(&self.links.stats());
        match self.selected_link() {
            Some(link) => {
                self.form = Some(LinkForm::edit(link, suggestions));
                true
            }
            None => false,
        }
    }

    /// Open the URL picker for the selected link. Returns false if no link is selected.
    pub fn open_url_picker(&mut self) -> bool {
        match self.selected_link() {
            Some(link) => {
                self.url_picker = Some(UrlPicker {
                    title: link.title.clone(),
                    urls: link.candidates().to_vec(),
                    selected: 0,
                });
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.status_is_error = false;
        self.needs_redraw = true;
    }

    /// Like [`App::set_status`], drawn with the error style.
    pub fn set_error(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.set_status(msg);
        self.status_is_error = true;
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                self.status_is_error = false;
                return true;
            }
        }
        false
    }

    /// Forget handles of open sequences that have finished.
    pub fn reap_open_tasks(&mut self) {
        self.open_tasks.retain(|h| !h.is_finished());
    }
}

/// Abort in-flight open sequences so none outlive the event loop.
impl Drop for App {
    fn drop(&mut self) {
        for handle in self.open_tasks.drain(..) {
            handle.abort();
        }
    }
}
