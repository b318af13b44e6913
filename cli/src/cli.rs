use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "price-alerts", version, about = "Crypto price threshold alerts")]
pub struct Cli {
    /// SQLite database holding the active alerts (overrides DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Heartbeat step in minutes (overrides HEARTBEAT_MINUTES)
    #[arg(long, global = true)]
    pub heartbeat_minutes: Option<u64>,

    /// Emit JSON logs regardless of APP_ENV
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Cmd>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Cmd {
    /// Stream prices and fire alerts; reads commands from stdin (default)
    Run,
    /// Persist an alert; it is armed on the next `run`
    Add {
        /// BASE/QUOTE or BASEQUOTE
        pair: String,
        price: String,
    },
    /// Delete a persisted alert
    Remove { id: String },
    /// Print persisted alerts
    List,
}
