//! Help overlay listing the live keybindings, including config overrides.

use crate::app::App;
use crate::keybindings::{Action, Context};
use crate::util::pad_to_width;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const SECTIONS: [(Context, &str); 4] = [
    (Context::Global, "Anywhere"),
    (Context::Links, "Link list"),
    (Context::Categories, "Category panel"),
    (Context::Search, "While searching"),
];

const KEY_COLUMN: usize = 18;

/// One help line per action: every key bound to it in `ctx`, in binding order.
fn section_entries(app: &App, ctx: Context) -> Vec<(String, &'static str)> {
    let mut entries: Vec<(Action, Vec<String>, &'static str)> = Vec::new();
    for (c, key, action, description) in app.keybindings.all_bindings() {
        if c != ctx {
            continue;
        }
        match entries.iter_mut().find(|(a, _, _)| *a == action) {
            Some((_, keys, _)) => keys.push(key),
            None => entries.push((action, vec![key], description)),
        }
    }
    entries
        .into_iter()
        .map(|(_, keys, description)| (keys.join(" / "), description))
        .collect()
}

fn help_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (ctx, heading) in SECTIONS {
        let entries = section_entries(app, ctx);
        if entries.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            heading,
            app.style("group_header").add_modifier(Modifier::BOLD),
        )));
        for (keys, description) in entries {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {}", pad_to_width(&keys, KEY_COLUMN)),
                    app.style("help_key"),
                ),
                Span::raw(description),
            ]));
        }
    }
    lines
}

/// Render the help overlay on top of the current view.
///
/// `help_scroll_offset` is clamped here, so input handling can increment it
/// freely.
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    let overlay = super::form::centered(area, 64, area.height.saturating_sub(4));
    if overlay.width < 24 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let lines = help_lines(app);
    let visible = overlay.height.saturating_sub(3) as usize;
    let max_scroll = lines.len().saturating_sub(visible);
    let scroll = app.help_scroll_offset.min(max_scroll);

    let title = if max_scroll > 0 {
        format!(" Keys ({}/{}) ", scroll + 1, max_scroll + 1)
    } else {
        " Keys ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("overlay_border"))
        .title(title);
    let inner = block.inner(overlay);
    f.render_widget(block, overlay);

    let body = Rect {
        height: inner.height.saturating_sub(1),
        ..inner
    };
    let shown: Vec<Line> = lines.into_iter().skip(scroll).take(visible).collect();
    f.render_widget(Paragraph::new(shown), body);

    let footer = if max_scroll > 0 {
        " j/k scroll · ? or Esc close"
    } else {
        " ? or Esc close"
    };
    let footer_area = Rect {
        y: inner.y + inner.height.saturating_sub(1),
        height: 1,
        ..inner
    };
    f.render_widget(
        Paragraph::new(Span::styled(footer, app.style("placeholder"))),
        footer_area,
    );
}
