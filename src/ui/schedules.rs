//! Schedules view rendering.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the Schedules view: recurring trigger times plus the computed
/// next run.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Next run
        Constraint::Min(3),    // Schedule list
    ])
    .split(area);

    render_next_run(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
}

fn render_next_run(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.next_run {
        Some(at) => {
            let local = at.with_timezone(&Local);
            Line::from(vec![
                Span::raw("Next run: "),
                Span::styled(
                    local.format("%A %Y-%m-%d %H:%M").to_string(),
                    Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
                ),
            ])
        }
        None => Line::from(vec![
            Span::raw("Next run: "),
            Span::styled("not scheduled", Style::default().add_modifier(Modifier::DIM)),
        ]),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!(" Daily Triggers ({}) ", app.schedules.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if app.schedules.is_empty() {
        let empty = Paragraph::new("No schedules. Press a to add a daily trigger time.")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .schedules
        .iter()
        .map(|schedule| {
            let suffix = if schedule.is_active { "" } else { "  (paused)" };
            ListItem::new(format!("  {} daily{}", schedule.time, suffix))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.selected)
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_schedule));
    frame.render_stateful_widget(list, area, &mut state);
}
