//! Report archive view rendering.
//!
//! A table of all generated briefings with the metadata derived from each
//! report's execution log.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_elapsed;
use crate::data::ModelDetail;

/// Render the Reports view showing the full archive.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!(" Briefing Archive ({}) ", app.reports.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if app.reports.is_empty() {
        let empty = Paragraph::new("No briefings yet. Press g to generate one.")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["Title", "Generated", "Sources", "Model", "Duration"])
        .style(app.theme.header);

    let rows: Vec<Row> = app
        .reports
        .iter()
        .map(|report| {
            let meta = app.report_meta(report, ModelDetail::ShortToken);
            let when = report.generated_at.with_timezone(&Local);
            Row::new(vec![
                Cell::from(report.title.clone()),
                Cell::from(when.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(meta.source_count.to_string()),
                Cell::from(meta.model_used),
                Cell::from(format_elapsed(meta.generation_secs)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(24),
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(app.theme.selected)
    .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(Some(app.selected_report));
    frame.render_stateful_widget(table, area, &mut state);
}
