use std::time::Duration;

use engine::EngineConfig;
use market::binance::BINANCE_STREAM_URL;

use crate::cli::Cli;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// SQLite connection string for alert records.
    pub database_url: String,

    // =========================
    // Outbound webhooks
    // =========================
    /// Crossings and fatal errors. Unset: logged only.
    pub alerts_webhook_url: Option<String>,

    /// Heartbeats. Unset: heartbeats are only logged.
    pub logs_webhook_url: Option<String>,

    /// Chat user pinged on crossings and fatal errors.
    pub mention_user_id: Option<String>,

    // =========================
    // Market stream
    // =========================
    pub binance_ws_url: String,

    /// Heartbeat step; reports land on multiples of it past local midnight.
    pub heartbeat_minutes: u64,

    /// JSON logs in production, pretty logs otherwise.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://price_alerts.db?mode=rwc".to_string()),

            alerts_webhook_url: get("ALERTS_WEBHOOK_URL"),
            logs_webhook_url: get("LOGS_WEBHOOK_URL"),
            mention_user_id: get("ALERTS_MENTION_USER_ID"),

            binance_ws_url: get("BINANCE_WS_URL").unwrap_or_else(|| BINANCE_STREAM_URL.to_string()),

            heartbeat_minutes: get("HEARTBEAT_MINUTES")
                .and_then(|v| v.trim().parse().ok())
                .filter(|m| *m > 0)
                .unwrap_or(20),

            json_logs: get("APP_ENV").is_some_and(|v| v == "production"),
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.database_url {
            self.database_url = url.clone();
        }
        if let Some(minutes) = cli.heartbeat_minutes.filter(|m| *m > 0) {
            self.heartbeat_minutes = minutes;
        }
        self.json_logs |= cli.json_logs;
        self
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            heartbeat_step: Duration::from_secs(self.heartbeat_minutes * 60),
            ..EngineConfig::default()
        }
    }
}
