//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on the open overlay, search mode, and panel focus.

use crate::app::{App, AppEvent, Command, ConfirmAction, Focus, FormField, StateChange};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::opener::open_direct;
use crate::storage::{export_to_dir, read_import, sanitize};
use crate::util::{display_host, MAX_SEARCH_QUERY_LENGTH};
use crate::view::CategoryFilter;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{expand_path, spawn_open, ERR_NO_LINK_SELECTED};
use super::Action;

/// Longest path accepted by the import prompt.
const MAX_PATH_LENGTH: usize = 4096;

/// Map the current focus panel to a keybinding context for context-specific lookups.
fn focus_to_context(focus: Focus) -> KbContext {
    match focus {
        Focus::Categories => KbContext::Categories,
        Focus::Links => KbContext::Links,
    }
}

/// Drop SHIFT from character keys; the character already carries the case.
fn normalize_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyModifiers {
    let mut modifiers = modifiers;
    if let KeyCode::Char(_) = code {
        modifiers.remove(KeyModifiers::SHIFT);
    }
    modifiers
}

/// Main input dispatch function.
///
/// Overlays capture all keys while visible, in the order they are drawn
/// (topmost first).
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let modifiers = normalize_modifiers(code, modifiers);

    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    if app.pending_confirm.is_some() {
        return handle_confirm_input(app, code).await;
    }

    if app.form.is_some() {
        return handle_form_input(app, code, modifiers).await;
    }

    if app.url_picker.is_some() {
        return Ok(handle_picker_input(app, code));
    }

    if app.import_prompt.is_some() {
        return Ok(handle_import_prompt_input(app, code, modifiers));
    }

    if app.search_mode {
        return handle_search_input(app, code, modifiers).await;
    }

    handle_browse_input(app, code, modifiers, event_tx).await
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input in the main view (category panel + link list).
async fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let context = focus_to_context(app.focus);
    let action = app.keybindings.action_for_key(code, modifiers, context);

    match action {
        Some(KbAction::Quit) => return Ok(Action::Quit),
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::NavTop) => app.nav_top(),
        Some(KbAction::NavBottom) => app.nav_bottom(),
        Some(KbAction::CycleFocus) => {
            if app.show_categories {
                app.focus = match app.focus {
                    Focus::Categories => Focus::Links,
                    Focus::Links => Focus::Categories,
                };
            }
        }
        Some(KbAction::Back) => handle_back(app).await?,
        Some(KbAction::Select) => match app.focus {
            Focus::Categories => handle_choose_category(app).await?,
            Focus::Links => handle_activate_row(app, event_tx),
        },
        Some(KbAction::OpenUrlPicker) => {
            if !app.open_url_picker() {
                app.set_status(ERR_NO_LINK_SELECTED);
            }
        }
        Some(KbAction::AddLink) => {
            app.open_add_form();
            if let (Some(form), CategoryFilter::Only(category)) =
                (app.form.as_mut(), &app.filter.category)
            {
                form.category = category.clone();
            }
        }
        Some(KbAction::EditLink) => {
            if !app.open_edit_form() {
                app.set_status(ERR_NO_LINK_SELECTED);
            }
        }
        Some(KbAction::DeleteLink) => match app.selected_link() {
            Some(link) => {
                app.pending_confirm = Some(ConfirmAction::DeleteLink {
                    id: link.id.clone(),
                    title: link.title.clone(),
                });
            }
            None => app.set_status(ERR_NO_LINK_SELECTED),
        },
        Some(KbAction::ToggleGroup) => app.toggle_group(),
        Some(KbAction::EnterSearch) => {
            app.search_mode = true;
            app.search_input = app.filter.query.clone();
            app.focus = Focus::Links;
        }
        Some(KbAction::ToggleCategories) => {
            app.show_categories = !app.show_categories;
            app.focus = if app.show_categories {
                Focus::Categories
            } else {
                Focus::Links
            };
        }
        Some(KbAction::ExportLinks) => handle_export(app),
        Some(KbAction::ImportLinks) => {
            app.import_prompt = Some(String::new());
        }
        Some(KbAction::ResetLinks) => {
            app.pending_confirm = Some(ConfirmAction::ResetLinks);
        }
        Some(KbAction::CycleTheme) => match app.cycle_theme() {
            Ok(name) => app.set_status(format!("Theme: {}", name)),
            Err(e) => app.set_error(format!("{:#}", e)),
        },
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        _ => {}
    }
    Ok(Action::Continue)
}

/// Esc in the main view: clear the search, then the category, then leave
/// the category panel.
async fn handle_back(app: &mut App) -> Result<()> {
    if !app.filter.query.is_empty() {
        app.search_input.clear();
        app.dispatch(Command::SetSearch(String::new())).await?;
    } else if app.filter.category != CategoryFilter::All {
        app.dispatch(Command::SetCategory(CategoryFilter::All))
            .await?;
    } else if app.focus == Focus::Categories {
        app.focus = Focus::Links;
    }
    Ok(())
}

/// Apply the category under the cursor in the category panel.
async fn handle_choose_category(app: &mut App) -> Result<()> {
    let Some(entry) = app.selected_menu_entry() else {
        return Ok(());
    };
    let filter = CategoryFilter::from_name(&entry.name);
    let (name, count) = (entry.name.clone(), entry.count);

    app.dispatch(Command::SetCategory(filter)).await?;
    app.selected_row = 0;
    app.focus = Focus::Links;
    app.set_status(format!("{}: {} links", name, count));
    Ok(())
}

/// Enter on a link row opens it; on a group header it toggles the group.
fn handle_activate_row(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(link) = app.selected_link().cloned() {
        app.set_status(format!("Opening {}...", link.title));
        spawn_open(app, &link, event_tx);
    } else if app.selected_view_row().is_some() {
        app.toggle_group();
    }
}

fn handle_export(app: &mut App) {
    match export_to_dir(app.links.links(), &app.export_dir) {
        Ok(path) => {
            tracing::info!(path = %path.display(), count = app.links.len(), "Links exported");
            app.set_status(format!(
                "Exported {} links to {}",
                app.links.len(),
                path.display()
            ));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Export failed");
            app.set_error(format!("Export failed: {:#}", e));
        }
    }
}

/// Handle input while the search bar is active.
///
/// The filter follows every keystroke. Esc clears the query, Enter keeps it.
async fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<Action> {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Search)
    {
        Some(KbAction::ExitSearch) => {
            app.search_mode = false;
            app.search_input.clear();
            app.dispatch(Command::SetSearch(String::new())).await?;
            return Ok(Action::Continue);
        }
        Some(KbAction::CommitSearch) => {
            app.search_mode = false;
            if app.visible_links == 0 {
                app.set_status("No links found");
            }
            return Ok(Action::Continue);
        }
        Some(KbAction::Quit) if modifiers.contains(KeyModifiers::CONTROL) => {
            return Ok(Action::Quit);
        }
        _ => {}
    }

    match code {
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if app.search_input.len() >= MAX_SEARCH_QUERY_LENGTH {
                app.set_status(format!(
                    "Search query too long (max {} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
                return Ok(Action::Continue);
            }
            app.search_input.push(c);
            app.dispatch(Command::SetSearch(app.search_input.clone()))
                .await?;
        }
        KeyCode::Backspace => {
            if app.search_input.pop().is_some() {
                app.dispatch(Command::SetSearch(app.search_input.clone()))
                    .await?;
            }
        }
        KeyCode::Down => app.nav_down(),
        KeyCode::Up => app.nav_up(),
        _ => {}
    }
    Ok(Action::Continue)
}

/// Handle input while a confirmation dialog is visible.
///
/// y/Enter runs the action, n/Esc cancels. Other keys are ignored.
async fn handle_confirm_input(app: &mut App, code: KeyCode) -> Result<Action> {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            if let Some(confirm) = app.pending_confirm.take() {
                run_confirmed(app, confirm).await?;
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Ok(Action::Continue)
}

async fn run_confirmed(app: &mut App, confirm: ConfirmAction) -> Result<()> {
    match confirm {
        ConfirmAction::DeleteLink { id, .. } => {
            match app.dispatch(Command::DeleteLink { id }).await? {
                StateChange::LinkDeleted { title } => app.set_status(format!("Deleted {}", title)),
                _ => app.set_status("Link no longer exists"),
            }
        }
        ConfirmAction::ImportLinks { links, source } => {
            if let StateChange::Imported { count } =
                app.dispatch(Command::ImportLinks(links)).await?
            {
                app.set_status(format!("Imported {} links from {}", count, source.display()));
            }
        }
        ConfirmAction::ResetLinks => {
            if let StateChange::Reset(outcome) = app.dispatch(Command::ResetLinks).await? {
                app.selected_row = 0;
                app.report_load(&outcome);
            }
        }
    }
    Ok(())
}

/// Handle input while the add/edit form is visible.
async fn handle_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<Action> {
    let Some(form) = app.form.as_mut() else {
        return Ok(Action::Continue);
    };

    match code {
        KeyCode::Esc => {
            app.form = None;
            app.set_status("Cancelled");
        }
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Char('n') if modifiers.contains(KeyModifiers::CONTROL) => {
            if form.field() == FormField::Category {
                form.cycle_suggestion(true);
            }
        }
        KeyCode::Char('p') if modifiers.contains(KeyModifiers::CONTROL) => {
            if form.field() == FormField::Category {
                form.cycle_suggestion(false);
            }
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => form.push_char(c),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Enter => match form.to_draft() {
            Err(message) => form.error = Some(message),
            Ok(draft) => {
                let title = draft.title.clone();
                let command = match form.editing.clone() {
                    Some(id) => Command::UpdateLink {
                        id,
                        patch: draft.into(),
                    },
                    None => Command::AddLink(draft),
                };
                // Applied in memory even when the store write fails
                app.form = None;
                match app.dispatch(command).await {
                    Ok(StateChange::LinkAdded { .. }) => app.set_status(format!("Added {}", title)),
                    Ok(StateChange::LinkUpdated { .. }) => {
                        app.set_status(format!("Saved {}", title))
                    }
                    Ok(_) => app.set_status("Link no longer exists"),
                    Err(e) => {
                        tracing::error!(title = %title, error = %e, "Link change not persisted");
                        app.set_error(format!(
                            "{} NOT saved to disk (kept until next change): {:#}",
                            title, e
                        ));
                    }
                }
            }
        },
        _ => {}
    }
    Ok(Action::Continue)
}

/// Handle input while the URL picker is visible.
///
/// The chosen URL opens directly, without the fallback sequence.
fn handle_picker_input(app: &mut App, code: KeyCode) -> Action {
    let Some(picker) = app.url_picker.as_mut() else {
        return Action::Continue;
    };

    let chosen = match code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.url_picker = None;
            return Action::Continue;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            picker.selected = (picker.selected + 1).min(picker.urls.len().saturating_sub(1));
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            picker.selected = picker.selected.saturating_sub(1);
            None
        }
        KeyCode::Enter | KeyCode::Char('o') => picker.urls.get(picker.selected).cloned(),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            picker.urls.get(index).cloned()
        }
        _ => None,
    };

    if let Some(url) = chosen {
        app.url_picker = None;
        match open_direct(app.launcher.as_ref(), &url) {
            Ok(()) => app.set_status(format!("Opening {}...", display_host(&url))),
            Err(e) => app.set_error(e.to_string()),
        }
    }
    Action::Continue
}

/// Handle input while the import path prompt is visible.
///
/// A readable file raises the replace confirmation; errors keep the prompt
/// open so the path can be corrected.
fn handle_import_prompt_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let Some(input) = app.import_prompt.as_mut() else {
        return Action::Continue;
    };

    match code {
        KeyCode::Esc => {
            app.import_prompt = None;
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if input.len() < MAX_PATH_LENGTH {
                input.push(c);
            }
        }
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Enter => {
            if input.trim().is_empty() {
                return Action::Continue;
            }
            let path = expand_path(input);
            match read_import(&path) {
                Ok(links) => {
                    // Count only what the import will keep
                    let (links, _) = sanitize(links);
                    app.import_prompt = None;
                    app.pending_confirm = Some(ConfirmAction::ImportLinks {
                        links,
                        source: path,
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Import rejected");
                    app.set_error(e.to_string());
                }
            }
        }
        _ => {}
    }
    Action::Continue
}
