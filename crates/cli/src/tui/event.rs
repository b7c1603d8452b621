use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;

use super::app::{App, AppAction};

/// What the main loop should do after a keyboard poll.
pub enum EventOutcome {
    Continue,
    Quit,
    Pause,
    Resume,
    RunOnce,
}

/// Poll for keyboard events with a timeout.
pub fn handle_events(app: &mut App) -> anyhow::Result<EventOutcome> {
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                app.should_quit = true;
                return Ok(EventOutcome::Quit);
            }

            if app.show_help {
                app.show_help = false;
                return Ok(EventOutcome::Continue);
            }

            return Ok(match key.code {
                KeyCode::Char('q') => {
                    app.should_quit = true;
                    EventOutcome::Quit
                }
                KeyCode::Char('?') => {
                    app.show_help = !app.show_help;
                    EventOutcome::Continue
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    app.scroll_up();
                    EventOutcome::Continue
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    app.scroll_down();
                    EventOutcome::Continue
                }
                KeyCode::Char('p') => EventOutcome::Pause,
                KeyCode::Char('r') => EventOutcome::Resume,
                KeyCode::Char('o') => EventOutcome::RunOnce,
                _ => EventOutcome::Continue,
            });
        }
    }
    Ok(EventOutcome::Continue)
}

/// Spawn the background poller that refreshes status/budget/router/generations.
pub fn spawn_poller(client: crate::client::EvoClient, tx: mpsc::Sender<AppAction>) {
    tokio::spawn(async move {
        loop {
            match client.get_status().await {
                Ok(status) => {
                    let _ = tx.send(AppAction::StatusUpdated(status)).await;
                }
                Err(e) => {
                    let _ = tx.send(AppAction::ControlError(e.to_string())).await;
                }
            }
            if let Ok(budget) = client.get_budget().await {
                let _ = tx.send(AppAction::BudgetUpdated(budget)).await;
            }
            if let Ok(router) = client.get_router().await {
                let _ = tx.send(AppAction::RouterUpdated(router)).await;
            }
            if let Ok(generations) = client.recent_generations(50).await {
                if let Some(list) = generations.as_array() {
                    let _ = tx.send(AppAction::GenerationsUpdated(list.clone())).await;
                }
            }
            tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        }
    });
}
