//! Render functions for the TUI.
//!
//! This module handles all rendering logic: the main layout first, then any
//! overlay on top of it.

use crate::app::{App, ConfirmAction};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::form::{centered, render_form, render_import_prompt, render_url_picker};
use super::{categories, help, links, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
///
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    render_main(f, app);

    if let Some(form) = &app.form {
        render_form(f, app, form);
    }

    if let Some(picker) = &app.url_picker {
        render_url_picker(f, app, picker);
    }

    if let Some(input) = &app.import_prompt {
        render_import_prompt(f, app, input);
    }

    if let Some(confirm) = &app.pending_confirm {
        render_confirm_overlay(f, app, confirm);
    }

    if app.show_help {
        help::render(f, app);
    }
}

/// Search bar (when searching or a query is kept), panels, status bar.
fn render_main(f: &mut Frame, app: &App) {
    let show_search = app.search_mode || !app.filter.query.is_empty();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if show_search { 1 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    if show_search {
        render_search_bar(f, app, chunks[0]);
    }
    render_panels(f, app, chunks[1]);
    status::render(f, app, chunks[2]);
}

fn render_search_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = if app.search_mode {
        format!("/{}_", app.search_input)
    } else {
        format!("/{}  (Esc to clear)", app.filter.query)
    };
    let bar = Paragraph::new(Line::from(Span::styled(text, app.style("search_bar"))));
    f.render_widget(bar, area);
}

/// Category panel (when shown) beside the link list.
fn render_panels(f: &mut Frame, app: &App, area: Rect) {
    if app.show_categories {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
            .split(area);

        categories::render(f, app, chunks[0]);
        links::render(f, app, chunks[1]);
    } else {
        links::render(f, app, area);
    }
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App, confirm: &ConfirmAction) {
    let overlay = centered(f.area(), 56, 8);
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let text = format!("{}\n\n(y) Confirm  (n/Esc) Cancel", confirm.prompt());
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("overlay_border"))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::opener::SystemLauncher;
    use crate::preferences::PreferenceManager;
    use crate::seed::SeedLoader;
    use crate::storage::{KeyValueStore, LinkStore, MemoryStore};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    async fn app_with(seed: &'static str) -> App {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let seed = SeedLoader::offline().with_embedded(seed);
        let mut links = LinkStore::new(store.clone());
        links.load(&seed).await.unwrap();
        let prefs = PreferenceManager::from_config(&Config::default(), store);
        App::new(links, prefs, seed, Arc::new(SystemLauncher))
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_renders_groups_hosts_and_badges() {
        let mut app = app_with(
            r#"[
                {"title": "Docs", "urls": ["https://docs.example/a", "https://mirror.example"], "category": "Tools"},
                {"title": "Mail", "url": "https://mail.example", "category": "Email"}
            ]"#,
        )
        .await;
        let text = screen(&mut app);
        assert!(text.contains("Tools (1)"));
        assert!(text.contains("Email (1)"));
        assert!(text.contains("docs.example"));
        assert!(text.contains("2 URLs"));
    }

    #[tokio::test]
    async fn test_renders_placeholder_when_empty() {
        let mut app = app_with(r#"[{"title": "Docs", "url": "https://docs.example"}]"#).await;
        app.filter.query = "nothing matches".to_string();
        app.refresh_view();
        let text = screen(&mut app);
        assert!(text.contains("No links found"));
    }

    #[tokio::test]
    async fn test_confirm_overlay_shows_prompt() {
        let mut app = app_with(r#"[{"title": "Docs", "url": "https://docs.example"}]"#).await;
        app.pending_confirm = Some(ConfirmAction::ResetLinks);
        let text = screen(&mut app);
        assert!(text.contains("Confirm"));
        assert!(text.contains("(y) Confirm"));
    }

    #[tokio::test]
    async fn test_help_overlay_lists_bindings_by_section() {
        let mut app = app_with(r#"[{"title": "Docs", "url": "https://docs.example"}]"#).await;
        app.show_help = true;
        let text = screen(&mut app);
        assert!(text.contains("Keys"));
        assert!(text.contains("Anywhere"));
        assert!(text.contains("Esc close"));
    }
}
