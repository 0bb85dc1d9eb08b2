//! Settings view rendering.
//!
//! Shows the backend configuration as an editable key/value table. When the
//! initial configuration fetch failed outright, renders a blocking
//! setup-required screen instead.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Keys whose values are masked in the table.
const SECRET_KEYS: &[&str] = &["llm_api_key", "smtp_pass"];

/// Render the Settings view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.setup_required() {
        render_setup_required(frame, app, area);
        return;
    }

    if app.local_models.is_empty() {
        render_table(frame, app, area);
        return;
    }

    let chunks = Layout::horizontal([Constraint::Min(40), Constraint::Length(30)]).split(area);
    render_table(frame, app, chunks[0]);
    render_models(frame, app, chunks[1]);
}

fn render_setup_required(frame: &mut Frame, app: &App, area: Rect) {
    let detail = app.settings_error.as_deref().unwrap_or("unknown error");
    let lines = vec![
        Line::from(""),
        Line::from("  Backend configuration could not be loaded."),
        Line::from(""),
        Line::from(format!("  {detail}")),
        Line::from(""),
        Line::from("  Check that the LuxPrima backend is running and reachable,"),
        Line::from("  then press Enter to retry."),
    ];

    let block = Block::default()
        .title(" Setup Required ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.critical));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(" Configuration ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let header = Row::new(vec!["Key", "Value"]).style(app.theme.header);

    let rows: Vec<Row> = app
        .setting_keys
        .iter()
        .map(|key| {
            let value = app
                .settings
                .as_ref()
                .and_then(|s| s.get(key))
                .unwrap_or("");
            let display = if SECRET_KEYS.contains(&key.as_str()) && !value.is_empty() {
                "••••••••".to_string()
            } else {
                value.to_string()
            };
            Row::new(vec![Cell::from(key.clone()), Cell::from(display)])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(20)])
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(Some(app.selected_setting));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_models(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Local Models ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let items: Vec<ListItem> = app
        .local_models
        .iter()
        .map(|m| ListItem::new(format!("  {m}")))
        .collect();

    if items.is_empty() {
        let empty = Paragraph::new("press m to sync")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }
    frame.render_widget(List::new(items).block(block), area);
}
