use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Row, Table};

use crate::output::status_dot;
use crate::tui::app::App;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Generations ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let rows: Vec<Row> = app
        .generations
        .iter()
        .map(|r| {
            let n = r.get("generation_number").and_then(|v| v.as_u64()).unwrap_or(0);
            let target = r.get("target_name").and_then(|v| v.as_str()).unwrap_or("-");
            let status = r.get("status").and_then(|v| v.as_str()).unwrap_or("-");
            let score = r.get("fitness_score").and_then(|v| v.as_f64()).unwrap_or(0.0);

            Row::new(vec![
                Cell::from(status_dot(status)),
                Cell::from(n.to_string()),
                Cell::from(target.to_string()),
                Cell::from(status.to_string()),
                Cell::from(format!("{score:.3}")),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Length(20),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths).block(block).column_spacing(1);
    f.render_widget(table, area);
}
