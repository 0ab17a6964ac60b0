use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the category panel.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Categories;
    let active = app.filter.category.name();

    let style_selected = app.style("category_selected");
    let style_active = app.style("category_active");
    let style_normal = app.style("category_normal");
    let style_count = app.style("category_count");

    let items: Vec<ListItem> = app
        .menu
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if i == app.selected_category && is_focused {
                style_selected
            } else if entry.name == active {
                style_active
            } else {
                style_normal
            };
            let count = if i == app.selected_category && is_focused {
                style_selected
            } else {
                style_count
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", entry.icon), style),
                Span::styled(entry.name.as_str(), style),
                Span::styled(format!(" {}", entry.count), count),
            ]))
        })
        .collect();

    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Categories"),
        )
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(Some(app.selected_category));
    f.render_stateful_widget(list, area, &mut state);
}
