//! Sources view rendering.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render the Sources view: every URL feeding the report generator.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!(" Sources ({}) ", app.sources.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if app.sources.is_empty() {
        let empty = Paragraph::new("No sources configured. Press a to add one.")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["URL", "Name", "Active", "Added"]).style(app.theme.header);

    let rows: Vec<Row> = app
        .sources
        .iter()
        .map(|source| {
            let added = source.created_at.with_timezone(&Local);
            let active = if source.is_active { "yes" } else { "no" };
            Row::new(vec![
                Cell::from(source.url.clone()),
                Cell::from(source.name.clone().unwrap_or_default()),
                Cell::from(active),
                Cell::from(added.format("%Y-%m-%d").to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(32),
            Constraint::Length(20),
            Constraint::Length(7),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(app.theme.selected)
    .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(Some(app.selected_source));
    frame.render_stateful_widget(table, area, &mut state);
}
