use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::App;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Evolver ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let content = if let Some(ref status) = app.status {
        let generation = status.get("generation").and_then(|v| v.as_u64()).unwrap_or(0);
        let running = status.get("running").and_then(|v| v.as_bool()).unwrap_or(false);
        let spent = app
            .budget
            .as_ref()
            .and_then(|b| b.get("tokens_used_today"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let budget = app
            .budget
            .as_ref()
            .and_then(|b| b.get("daily_cap"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let tier = app
            .router
            .as_ref()
            .and_then(|r| r.get("current_model_tag"))
            .and_then(|v| v.as_str())
            .unwrap_or("-");

        Line::from(vec![
            Span::styled("  Generation: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{generation}"),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  │  Running: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                if running { "yes" } else { "no" },
                Style::default()
                    .fg(if running { Color::Green } else { Color::Yellow })
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  │  Budget: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{spent}/{budget}"),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  │  Tier: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                tier.to_string(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if let Some(ref err) = app.last_error {
        Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from(Span::styled(
            "  Connecting...",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let paragraph = Paragraph::new(content).block(block);
    f.render_widget(paragraph, area);
}
