// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::sync::mpsc;

mod app;
mod client;
mod data;
mod events;
mod poll;
mod ui;

use app::{App, View};
use client::ApiClient;
use poll::{HealthMonitor, ProbePeriods, StatusWatcher};

#[derive(Parser, Debug)]
#[command(name = "luxprima-ops")]
#[command(about = "Operations TUI for the LuxPrima autonomous briefing service")]
struct Args {
    /// Base URL of the backend API
    #[arg(short, long, default_value = "http://localhost:8000/api")]
    api_base: String,

    /// System health probe interval in seconds
    #[arg(long, default_value = "10")]
    refresh: u64,

    /// Intelligence endpoint probe interval in seconds
    #[arg(long, default_value = "60")]
    ai_refresh: u64,

    /// Job status poll interval in seconds
    #[arg(long, default_value = "2")]
    status_refresh: u64,

    /// Write tracing output to this file (the terminal is occupied by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_tracing(path)?;
    }

    // Build the runtime that all polling and requests run on; the draw
    // loop stays on the main thread.
    let rt = tokio::runtime::Runtime::new()?;

    let client = ApiClient::new(&args.api_base);
    let (tx, rx) = mpsc::unbounded_channel();

    let periods = ProbePeriods {
        system: Duration::from_secs(args.refresh.max(1)),
        intelligence: Duration::from_secs(args.ai_refresh.max(1)),
    };
    let monitor = HealthMonitor::new(client.clone(), periods, tx.clone());

    let watcher = {
        let _guard = rt.enter();
        StatusWatcher::spawn(
            client.clone(),
            Duration::from_secs(args.status_refresh.max(1)),
            tx.clone(),
        )
    };

    let mut app = App::new(rt.handle().clone(), client, monitor, watcher, tx, rx);
    app.load_initial();

    run_tui(&mut app)
}

fn init_tracing(path: &std::path::Path) -> Result<()> {
    use std::sync::Arc;
    use tracing_subscriber::EnvFilter;

    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the TUI main loop with terminal setup/teardown around it
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Run the main loop
    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 14;

    while app.running {
        // Fold pending poll results into display state before drawing
        app.drain_updates();

        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, area.height.saturating_sub(4) / 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            // Render header with backend health
            ui::common::render_header(frame, app, chunks[0]);

            // Render tabs
            ui::common::render_tabs(frame, app, chunks[1]);

            // Render current view
            match app.current_view {
                View::Dashboard => ui::dashboard::render(frame, app, chunks[2]),
                View::Reports => ui::reports::render(frame, app, chunks[2]),
                View::Sources => ui::sources::render(frame, app, chunks[2]),
                View::Schedules => ui::schedules::render(frame, app, chunks[2]),
                View::Settings => ui::settings::render(frame, app, chunks[2]),
            }

            // Render status bar
            ui::common::render_status_bar(frame, app, chunks[3]);

            // Render detail overlay if active
            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
