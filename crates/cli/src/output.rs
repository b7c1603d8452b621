use colored::Colorize;
use comfy_table::{presets::NOTHING, ContentArrangement, Table};

/// Print a decorated section header.
pub fn print_header(title: &str) {
    let line = "─".repeat(36);
    println!();
    println!("  {}", title.bold());
    println!("  {}", line.dimmed());
}

/// Status dot for a generation status string: ● green for accepted
/// flavors, ○ dim for rejections, ✗ red for errors.
pub fn status_dot(status: &str) -> String {
    match status {
        "accepted" | "accepted_neutral" => "●".green().to_string(),
        "rejected_regression" | "rejected_validation" => "○".yellow().to_string(),
        "error" => "✗".red().to_string(),
        _ => "○".dimmed().to_string(),
    }
}

/// Print a list of generation records (as returned by the control
/// surface's `/api/generations*` routes) as a table.
pub fn print_generations_table(records: &[serde_json::Value]) {
    if records.is_empty() {
        println!("  {}", "No generations recorded yet.".dimmed());
        return;
    }

    let mut table = Table::new();
    table.load_preset(NOTHING).set_content_arrangement(ContentArrangement::Dynamic);

    for r in records {
        let n = r.get("generation_number").and_then(|v| v.as_u64()).unwrap_or(0);
        let target = r.get("target_name").and_then(|v| v.as_str()).unwrap_or("-");
        let status = r.get("status").and_then(|v| v.as_str()).unwrap_or("-");
        let score = r.get("fitness_score").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let model = r.get("model_tag").and_then(|v| v.as_str()).unwrap_or("-");

        table.add_row(vec![
            format!("  {}", status_dot(status)),
            n.to_string().bold().to_string(),
            target.to_string(),
            status.to_string(),
            format!("{score:.3}"),
            model.dimmed().to_string(),
        ]);
    }

    println!("{table}");
}

/// Create a styled spinner with a message.
pub fn spinner(msg: &str) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("  {spinner} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
