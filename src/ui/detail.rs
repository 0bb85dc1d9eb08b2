//! Report detail overlay.
//!
//! A centered modal showing the selected briefing: the run metadata card,
//! the distinct sources consulted, and the scrollable execution log.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_elapsed;
use crate::data::ModelDetail;

/// Render the detail overlay for the selected report.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let Some(report) = app.selected_report() else {
        return;
    };

    // The detail view reports the full model identifier, not the short
    // token used in table rows.
    let meta = app.report_meta(report, ModelDetail::FullText);

    // Centered modal taking most of the screen
    let width = area.width.saturating_sub(8).min(100);
    let height = area.height.saturating_sub(4);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let modal = Rect::new(x, y, width, height);

    frame.render_widget(Clear, modal);

    let block = Block::default()
        .title(format!(" {} ", report.title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let source_height = (meta.source_list.len() as u16 + 2).min(8);
    let chunks = Layout::vertical([
        Constraint::Length(4),             // Metadata card
        Constraint::Length(source_height), // Sources
        Constraint::Min(4),                // Execution log
    ])
    .split(inner);

    render_meta_card(frame, app, &meta, report, chunks[0]);
    render_sources(frame, app, &meta.source_list, chunks[1]);
    render_log(frame, app, &report.logs, chunks[2]);
}

fn render_meta_card(
    frame: &mut Frame,
    app: &App,
    meta: &crate::data::RunMetadata,
    report: &crate::data::Report,
    area: Rect,
) {
    let when = report.generated_at.with_timezone(&Local);
    let started = meta
        .start_date
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let lines = vec![
        Line::from(vec![
            Span::styled("Generated: ", app.theme.header),
            Span::raw(when.format("%Y-%m-%d %H:%M").to_string()),
            Span::raw("   "),
            Span::styled("Started: ", app.theme.header),
            Span::raw(started),
        ]),
        Line::from(vec![
            Span::styled("Model: ", app.theme.header),
            Span::raw(meta.model_used.clone()),
            Span::raw("   "),
            Span::styled("Sources: ", app.theme.header),
            Span::raw(meta.source_count.to_string()),
            Span::raw("   "),
            Span::styled("Duration: ", app.theme.header),
            Span::raw(format_elapsed(meta.generation_secs)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_sources(frame: &mut Frame, app: &App, sources: &[String], area: Rect) {
    let block = Block::default()
        .title(" Sources Consulted ")
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border));

    if sources.is_empty() {
        let empty = Paragraph::new("none recorded")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = sources
        .iter()
        .map(|url| ListItem::new(format!("  {url}")))
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

fn render_log(frame: &mut Frame, app: &App, logs: &[String], area: Rect) {
    let block = Block::default()
        .title(format!(" Execution Log ({} lines, j/k to scroll) ", logs.len()))
        .borders(Borders::NONE);

    if logs.is_empty() {
        let empty = Paragraph::new("no log recorded for this run")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let text: Vec<Line> = logs.iter().map(|l| Line::from(l.as_str())).collect();
    let max_scroll = (logs.len() as u16).saturating_sub(area.height.saturating_sub(1));
    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll.min(max_scroll), 0));
    frame.render_widget(paragraph, area);
}
