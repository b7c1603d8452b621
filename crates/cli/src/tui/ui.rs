use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::app::App;
use super::widgets;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Generations
            Constraint::Length(3), // Evolver stats
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(f, main_chunks[0], app);
    widgets::generations::render(f, main_chunks[1], app);
    widgets::stats::render(f, main_chunks[2], app);
    render_footer(f, main_chunks[3], app);

    if app.show_help {
        widgets::help::render(f);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let status_dot = if app.connected { "●" } else { "○" };
    let status_color = if app.connected { Color::Green } else { Color::Red };

    let header = Line::from(vec![
        Span::styled(
            "  Evo Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("    "),
        Span::styled(status_dot, Style::default().fg(status_color)),
        Span::styled(format!("  {}", app.endpoint), Style::default().fg(Color::DarkGray)),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(header).block(block);
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect, _app: &App) {
    let footer = Line::from(vec![
        Span::styled("  [↑↓]", Style::default().fg(Color::Cyan)),
        Span::styled(" Navigate  ", Style::default().fg(Color::DarkGray)),
        Span::styled("[p]", Style::default().fg(Color::Cyan)),
        Span::styled(" Pause  ", Style::default().fg(Color::DarkGray)),
        Span::styled("[r]", Style::default().fg(Color::Cyan)),
        Span::styled(" Resume  ", Style::default().fg(Color::DarkGray)),
        Span::styled("[o]", Style::default().fg(Color::Cyan)),
        Span::styled(" Run once  ", Style::default().fg(Color::DarkGray)),
        Span::styled("[q]", Style::default().fg(Color::Cyan)),
        Span::styled(" Quit  ", Style::default().fg(Color::DarkGray)),
        Span::styled("[?]", Style::default().fg(Color::Cyan)),
        Span::styled(" Help", Style::default().fg(Color::DarkGray)),
    ]);

    let paragraph = Paragraph::new(footer);
    f.render_widget(paragraph, area);
}
