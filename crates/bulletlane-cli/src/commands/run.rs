use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tracing::info;

use bulletlane_core::AppConfig;
use bulletlane_tui::{
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event},
    widgets::{BulletFieldWidget, StatusBarWidget},
    App,
};

use crate::source;

pub async fn run(config: AppConfig, file: Option<PathBuf>) -> Result<()> {
    let lines = match file {
        Some(path) => source::read_file(&path).await?,
        None => source::sample_lines(),
    };
    info!("Starting terminal UI with {} lines", lines.len());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("bulletlane"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, config, lines);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, config: AppConfig, lines: Vec<String>) -> Result<()> {
    let size = terminal.size()?;
    let (field, _) = split(Rect::new(0, 0, size.width, size.height));

    let event_handler = EventHandler::new(config.ui.tick_rate_ms);
    let mut app = App::new(config, lines, field)?;
    let started = Instant::now();

    // Main loop
    loop {
        app.on_frame(started.elapsed());

        terminal.draw(|frame| {
            let (field, status) = split(frame.area());
            BulletFieldWidget::render(frame, field, &app);
            StatusBarWidget::render(frame, status, &app);
        })?;

        if let Some(event) = event_handler.next()? {
            match event {
                AppEvent::Key(key) => app.handle_action(handle_key_event(key))?,
                AppEvent::Mouse(mouse) => app.handle_action(handle_mouse_event(mouse))?,
                AppEvent::Resize(width, height) => {
                    let (field, _) = split(Rect::new(0, 0, width, height));
                    app.resize(field);
                }
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("Terminal UI finished, {} bullets completed", app.finished());
    Ok(())
}

/// Bullet field on top, one-line status bar below
fn split(area: Rect) -> (Rect, Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    (layout[0], layout[1])
}
