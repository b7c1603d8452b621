use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "evoctl",
    about = "evoctl — control surface client for the Evo self-modification engine",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Output raw JSON (for scripting/piping)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show Evolver/Budget/Router status in one view
    Status,

    /// Token Budget snapshot
    Budget,

    /// Model Router snapshot
    Router,

    /// Inspect generation history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Pause the Evolver's periodic tick (does not interrupt an in-flight cycle)
    Pause,

    /// Resume the Evolver's periodic tick
    Resume,

    /// Force one generation cycle synchronously, regardless of running state
    RunOnce,

    /// Live terminal dashboard: status, budget, router, and generation
    /// history, polled on a fixed cadence (spec §4.12)
    Dashboard,

    /// Manage CLI configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// Most recent generations first
    Recent {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// A single generation by number
    Get {
        generation: u64,
    },
    /// Generations filtered by status
    ByStatus {
        /// accepted | accepted_neutral | rejected_regression | rejected_validation | error
        status: String,
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Key name (url, api_key)
        key: String,
        /// Value to set
        value: String,
    },
}
