use crate::app::{App, Focus};
use crate::keybindings::Action as KbAction;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Status bar needs at least 1 char width to be meaningful
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Cow avoids allocations for borrowed status messages
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if app.search_mode {
        Cow::Borrowed("Type to search | ESC clear | ENTER keep")
    } else {
        Cow::Owned(hints(app))
    };

    let style = if app.status_is_error && app.status_message.is_some() {
        app.style("status_error")
    } else {
        app.style("status_bar")
    };

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}

/// Key hints built from the live bindings, so overrides show up.
fn hints(app: &App) -> String {
    let actions: &[(KbAction, &str)] = match app.focus {
        Focus::Links => &[
            (KbAction::Select, "open"),
            (KbAction::OpenUrlPicker, "urls"),
            (KbAction::AddLink, "add"),
            (KbAction::EditLink, "edit"),
            (KbAction::DeleteLink, "delete"),
            (KbAction::EnterSearch, "search"),
            (KbAction::ToggleCategories, "categories"),
            (KbAction::ShowHelp, "help"),
            (KbAction::Quit, "quit"),
        ],
        Focus::Categories => &[
            (KbAction::Select, "choose"),
            (KbAction::CycleFocus, "links"),
            (KbAction::Back, "all"),
            (KbAction::ToggleCategories, "hide"),
            (KbAction::ShowHelp, "help"),
            (KbAction::Quit, "quit"),
        ],
    };

    actions
        .iter()
        .filter_map(|(action, label)| {
            app.keybindings
                .key_for(*action)
                .map(|key| format!("[{}]{}", key, label))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
