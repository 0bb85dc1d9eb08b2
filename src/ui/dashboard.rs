//! Dashboard view rendering.
//!
//! The landing view: generation status banner, next scheduled run, and the
//! most recent briefings with their derived run metadata.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_elapsed;
use crate::data::ModelDetail;

/// How many briefings the dashboard previews.
const RECENT_LIMIT: usize = 4;

/// Render the dashboard view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(5), // Status banner
        Constraint::Min(4),    // Recent briefings
    ])
    .split(area);

    render_banner(frame, app, chunks[0]);
    render_recent(frame, app, chunks[1]);
}

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    let status_line = if app.run_active() {
        Line::from(vec![
            Span::raw("Generation: "),
            Span::styled(
                app.job_status.clone(),
                Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::raw("Generation: "),
            Span::styled("Idle", Style::default().add_modifier(Modifier::DIM)),
            Span::raw("  (g to start a run)"),
        ])
    };

    let next_run_line = match app.next_run {
        Some(at) => {
            let local = at.with_timezone(&Local);
            Line::from(format!("Next scheduled run: {}", local.format("%a %H:%M")))
        }
        None => Line::from(vec![
            Span::raw("Next scheduled run: "),
            Span::styled("not scheduled", Style::default().add_modifier(Modifier::DIM)),
        ]),
    };

    let counts_line = Line::from(format!(
        "{} briefings | {} sources | {} schedules",
        app.reports.len(),
        app.sources.len(),
        app.schedules.len()
    ));

    let block = Block::default()
        .title(" Overview ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let paragraph = Paragraph::new(vec![status_line, next_run_line, counts_line]).block(block);
    frame.render_widget(paragraph, area);
}

fn render_recent(frame: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .reports
        .iter()
        .take(RECENT_LIMIT)
        .map(|report| {
            let meta = app.report_meta(report, ModelDetail::ShortToken);
            let when = report.generated_at.with_timezone(&Local);
            let line = Line::from(vec![
                Span::styled(
                    report.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    "  {} | {} sources | {} | {}",
                    when.format("%Y-%m-%d %H:%M"),
                    meta.source_count,
                    meta.model_used,
                    format_elapsed(meta.generation_secs),
                )),
            ]);
            ListItem::new(line)
        })
        .collect();

    let block = Block::default()
        .title(" Latest Briefings ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if items.is_empty() {
        let empty = Paragraph::new("No briefings yet. Press g to generate one.")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.selected)
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if app.selected_report < RECENT_LIMIT.min(app.reports.len()) {
        state.select(Some(app.selected_report));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
