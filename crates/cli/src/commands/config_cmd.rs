use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommand;
use crate::config::CliConfig;
use crate::output;

pub fn run(cmd: ConfigCommand, config: &CliConfig) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            output::print_header("evoctl configuration");
            println!("  {:<10} {}", "url:".dimmed(), config.url.bold());
            let key_display = match &config.api_key {
                Some(k) if k.len() > 4 => format!("{}...", &k[..4]),
                Some(_) => "***".to_string(),
                None => "(not set)".to_string(),
            };
            println!("  {:<10} {}", "api_key:".dimmed(), key_display);
            println!("  {}", format!("config file: {}", CliConfig::path()?.display()).dimmed());
        }
        ConfigCommand::Set { key, value } => {
            CliConfig::set(&key, &value)?;
            println!("  {} {key} updated", "✓".green());
        }
    }
    Ok(())
}
