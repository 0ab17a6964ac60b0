use crate::app::{App, Focus};
use crate::storage::Link;
use crate::util::{
    display_host, display_width, pad_to_width, strip_control_chars, truncate_to_width,
};
use crate::view::{self, ViewRow, HEADER_FALLBACK_ICON};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Columns reserved for the icon and the indent in front of a link title.
const LINK_PREFIX_WIDTH: usize = 5;

/// Render the grouped link list
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Links;
    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let title = format!(
        " {} {} ({}) ",
        app.filter.category.header_icon(),
        app.filter.category.name(),
        app.visible_links
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    if app.rows.is_empty() {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "No links found",
            app.style("placeholder"),
        )))
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = i == app.selected_row && is_focused;
            match row {
                ViewRow::Header {
                    category,
                    count,
                    collapsed,
                } => header_line(app, category, *count, *collapsed, selected),
                ViewRow::Link { index } => match app.links.links().get(*index) {
                    Some(link) => link_line(app, link, inner_width, selected),
                    None => Line::default(),
                },
            }
        })
        .map(ListItem::new)
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(Some(app.selected_row));
    f.render_stateful_widget(list, area, &mut state);
}

fn header_line<'a>(
    app: &App,
    category: &'a str,
    count: usize,
    collapsed: bool,
    selected: bool,
) -> Line<'a> {
    let marker = if collapsed { "▸" } else { "▾" };
    let icon = view::category_icon(category).unwrap_or(HEADER_FALLBACK_ICON);
    let (style, count_style) = if selected {
        (app.style("link_selected"), app.style("link_selected"))
    } else {
        (app.style("group_header"), app.style("group_count"))
    };

    Line::from(vec![
        Span::styled(format!("{} {} ", marker, icon), style),
        Span::styled(strip_control_chars(category), style),
        Span::styled(format!(" ({})", count), count_style),
    ])
}

fn link_line<'a>(app: &App, link: &'a Link, width: usize, selected: bool) -> Line<'a> {
    let host = display_host(&link.url);
    let badge = if link.has_alternates() {
        format!(" {} URLs", link.candidates().len())
    } else {
        String::new()
    };

    // Title gets whatever the host and badge leave over
    let reserved = LINK_PREFIX_WIDTH + display_width(&host) + badge.len() + 2;
    let title_width = width.saturating_sub(reserved).max(8);
    let title = strip_control_chars(&link.title);
    let title = truncate_to_width(&title, title_width).into_owned();
    let title = pad_to_width(&title, title_width).into_owned();

    let (title_style, host_style, badge_style) = if selected {
        let s = app.style("link_selected");
        (s, s, s)
    } else {
        (
            app.style("link_title"),
            app.style("link_host"),
            app.style("link_badge"),
        )
    };

    let icon = view::link_icon(link);
    let icon_pad = 2usize.saturating_sub(display_width(icon));
    let mut spans = vec![
        Span::styled(format!("  {}{} ", icon, " ".repeat(icon_pad)), title_style),
        Span::styled(title, title_style),
        Span::styled(format!("  {}", host), host_style),
    ];
    if !badge.is_empty() {
        spans.push(Span::styled(badge, badge_style));
    }
    Line::from(spans)
}
