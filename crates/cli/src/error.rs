use colored::Colorize;

/// Format an error for CLI display with contextual help messages.
pub fn display_error(err: &anyhow::Error) {
    let msg = format!("{err}");

    if msg.contains("Connection refused")
        || msg.contains("error sending request")
        || msg.contains("tcp connect error")
    {
        eprintln!("  {} Cannot connect to the evo control surface", "ERROR".red().bold());
        eprintln!(
            "        Is the process running? Current endpoint: {}",
            "evoctl config show".dimmed()
        );
    } else if msg.contains("403") || msg.contains("Unauthorized") {
        eprintln!("  {} Authentication failed", "ERROR".red().bold());
        eprintln!(
            "        Set your admin key: {}",
            "evoctl config set api_key <key>".dimmed()
        );
    } else {
        eprintln!("  {} {}", "ERROR".red().bold(), msg);
        for cause in err.chain().skip(1) {
            eprintln!("        {} {cause}", "caused by:".dimmed());
        }
    }
}
