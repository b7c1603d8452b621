pub mod app;
pub mod event;
pub mod ui;
pub mod widgets;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use tokio::sync::mpsc;

use crate::client::EvoClient;
use crate::config::CliConfig;
use app::App;
use event::EventOutcome;

/// Launch the TUI dashboard (spec §4.12's "thin" dashboard surface, given a
/// terminal frontend rather than the teacher's web one).
pub async fn run() -> Result<()> {
    let config = CliConfig::load()?;
    let client = EvoClient::new(&config);
    let endpoint = client.base_url().to_string();

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (tx, mut rx) = mpsc::channel(64);
    event::spawn_poller(EvoClient::new(&config), tx);

    let mut app = App::new(endpoint);

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        while let Ok(action) = rx.try_recv() {
            app.apply(action);
        }

        match event::handle_events(&mut app)? {
            EventOutcome::Continue => {}
            EventOutcome::Quit => break,
            EventOutcome::Pause => {
                let _ = client.pause().await;
            }
            EventOutcome::Resume => {
                let _ = client.resume().await;
            }
            EventOutcome::RunOnce => {
                let _ = client.run_once().await;
            }
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}
