//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, input prompt,
//! and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::poll::{HealthSignal, IntelligenceSignal};

/// Render the header bar with backend health overview.
///
/// Displays: system status indicator, intelligence endpoint status, and the
/// current generation job status.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let service = app.system_service.as_deref().unwrap_or("LUXPRIMA");

    let system_label = match app.system_health {
        HealthSignal::Up => "online",
        HealthSignal::Down => "OFFLINE",
        HealthSignal::Unknown => "probing...",
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.health_style(app.system_health)),
        Span::styled(
            format!("{service} "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ system "),
        Span::styled(system_label, app.theme.health_style(app.system_health)),
        Span::raw(" │ intelligence "),
    ];

    let intel_label = match app.intelligence {
        IntelligenceSignal::Up => "online",
        IntelligenceSignal::Down => "OFFLINE",
        IntelligenceSignal::NotApplicable => "n/a",
    };
    spans.push(Span::styled(
        intel_label,
        app.theme.intelligence_style(app.intelligence),
    ));

    spans.push(Span::raw(" │ "));
    if app.run_active() {
        spans.push(Span::styled(
            app.job_status.clone(),
            Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled(
            "Idle",
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let selected = View::ALL
        .iter()
        .position(|v| *v == app.current_view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the active text prompt when one is open, otherwise temporary
/// status messages, otherwise context-sensitive controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // An open prompt takes over the whole bar
    if let Some(mode) = &app.input_mode {
        let line = Line::from(vec![
            Span::styled(
                format!(" {}: ", mode.prompt()),
                Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
            ),
            Span::raw(app.input_buffer.clone()),
            Span::styled("█", Style::default().fg(app.theme.highlight)),
            Span::styled(
                "  (Enter:apply Esc:cancel)",
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    // Check for temporary status message next
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    // Context-sensitive controls
    let controls = match app.current_view {
        View::Dashboard => "Enter:open g:generate w:pdf s:share r:refresh ?:help q:quit",
        View::Reports => "Enter:open d:delete w:pdf s:share g:generate ?:help q:quit",
        View::Sources => "a:add d:delete g:generate ?:help q:quit",
        View::Schedules => "a:add d:delete g:generate ?:help q:quit",
        View::Settings => {
            if app.setup_required() {
                "Enter:retry ?:help q:quit"
            } else {
                "Enter:edit m:sync-models ?:help q:quit"
            }
        }
    };

    let paragraph = Paragraph::new(format!(" {} | {}", app.current_view.label(), controls))
        .style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1-5         Jump to view"),
        Line::from("  ↑/↓ j/k     Navigate list / scroll log"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Enter       Open report / edit setting"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Briefings",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  g         Generate now"),
        Line::from("  w         Download PDF"),
        Line::from("  s         Share via email"),
        Line::from("  d         Delete selected"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Sources & Schedules",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  a         Add new"),
        Line::from("  d         Delete selected"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Refresh everything"),
        Line::from("  m         Sync local model list (settings)"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 48u16.min(area.width.saturating_sub(4));
    let help_height = 30u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
