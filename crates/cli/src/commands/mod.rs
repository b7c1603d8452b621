pub mod config_cmd;
pub mod control;
pub mod history;
pub mod status;

use crate::cli::*;
use crate::client::EvoClient;
use crate::config::CliConfig;
use crate::tui;
use anyhow::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
    // The dashboard manages its own CliConfig/EvoClient (it needs several
    // independently-configured clients for polling vs. control actions).
    if matches!(cli.command, Commands::Dashboard) {
        return tui::run().await;
    }

    let config = CliConfig::load()?;
    let client = EvoClient::new(&config);

    match cli.command {
        Commands::Status => status::status(&client, cli.json).await,
        Commands::Budget => status::budget(&client, cli.json).await,
        Commands::Router => status::router(&client, cli.json).await,
        Commands::History(cmd) => history::run(&client, cmd, cli.json).await,
        Commands::Pause => control::pause(&client, cli.json).await,
        Commands::Resume => control::resume(&client, cli.json).await,
        Commands::RunOnce => control::run_once(&client, cli.json).await,
        Commands::Dashboard => unreachable!(),
        Commands::Config(cmd) => config_cmd::run(cmd, &config),
    }
}
