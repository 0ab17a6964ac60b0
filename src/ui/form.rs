//! Input overlays: the add/edit form, the URL picker, and the import prompt.

use crate::app::{App, FormField, LinkForm, UrlPicker};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Width of the field label column, including the trailing colon and space.
const LABEL_WIDTH: usize = 11;

/// Suggestions listed under the form.
const MAX_SUGGESTIONS_SHOWN: usize = 6;

/// Centered rectangle of at most `width` x `height`, leaving a 2-cell margin.
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the add/edit form overlay.
pub fn render_form(f: &mut Frame, app: &App, form: &LinkForm) {
    let overlay = centered(f.area(), 72, 14);
    if overlay.width < 30 || overlay.height < 9 {
        return;
    }
    f.render_widget(Clear, overlay);

    let value_width = (overlay.width as usize).saturating_sub(LABEL_WIDTH + 4);
    let mut lines = Vec::with_capacity(FormField::ALL.len() + 5);

    for field in FormField::ALL {
        let focused = form.field() == field;
        let value = form.value(field);
        let shown = if focused {
            // Keep the end of long input visible while typing
            let chars: Vec<char> = value.chars().collect();
            let start = chars.len().saturating_sub(value_width.saturating_sub(1));
            format!("{}_", chars[start..].iter().collect::<String>())
        } else {
            truncate_to_width(value, value_width).into_owned()
        };
        let input_style = if focused {
            app.style("form_input_focused")
        } else {
            app.style("form_input")
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:>width$}: ", field.label(), width = LABEL_WIDTH - 2),
                app.style("form_label"),
            ),
            Span::styled(shown, input_style),
        ]));
    }

    lines.push(Line::default());
    if form.field() == FormField::Category {
        let matches = form.matching_suggestions();
        if !matches.is_empty() {
            let shown: Vec<&str> = matches.into_iter().take(MAX_SUGGESTIONS_SHOWN).collect();
            lines.push(Line::from(Span::styled(
                format!("Ctrl+n/p: {}", shown.join(", ")),
                app.style("form_label"),
            )));
        }
    } else if form.field() == FormField::Alternates {
        lines.push(Line::from(Span::styled(
            "Separate extra URLs with commas or spaces",
            app.style("form_label"),
        )));
    }

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.as_str(), app.style("form_error"))));
    }
    lines.push(Line::from(Span::styled(
        "(Tab) Next field  (Enter) Save  (Esc) Cancel",
        app.style("form_label"),
    )));

    let title = if form.editing.is_some() {
        " Edit Link "
    } else {
        " Add Link "
    };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("overlay_border"))
            .title(title),
    );
    f.render_widget(paragraph, overlay);
}

/// Render the URL picker overlay.
pub fn render_url_picker(f: &mut Frame, app: &App, picker: &UrlPicker) {
    let height = picker.urls.len().min(12) as u16 + 4;
    let overlay = centered(f.area(), 72, height);
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }
    f.render_widget(Clear, overlay);

    let url_width = (overlay.width as usize).saturating_sub(8);
    let mut lines: Vec<Line> = picker
        .urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            let style = if i == picker.selected {
                app.style("link_selected")
            } else {
                app.style("link_title")
            };
            let url = strip_control_chars(url);
            Line::from(Span::styled(
                format!("{}. {}", i + 1, truncate_to_width(&url, url_width)),
                style,
            ))
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(1-9/Enter) Open  (Esc) Cancel",
        app.style("form_label"),
    )));

    let title = format!(" {} ", strip_control_chars(&picker.title));
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("overlay_border"))
            .title(title),
    );
    f.render_widget(paragraph, overlay);
}

/// Render the import path prompt overlay.
pub fn render_import_prompt(f: &mut Frame, app: &App, input: &str) {
    let overlay = centered(f.area(), 64, 7);
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }
    f.render_widget(Clear, overlay);

    let text = vec![
        Line::from(Span::styled("Path to a JSON backup:", app.style("form_label"))),
        Line::from(Span::styled(
            format!("> {}_", input),
            app.style("form_input_focused"),
        )),
        Line::default(),
        Line::from(Span::styled(
            "(Enter) Load  (Esc) Cancel",
            app.style("form_label"),
        )),
    ];

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("overlay_border"))
            .title(" Import Links "),
    );
    f.render_widget(paragraph, overlay);
}
