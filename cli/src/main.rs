mod cli;
mod config;
mod console;

use std::str::FromStr;
use std::sync::Arc;

use adapters::format::alert_line;
use adapters::{AlertDesk, WebhookClient, WebhookFrontEnd};
use clap::Parser;
use common::logger::init_logger;
use corelib::{Alert, AlertId, AlertRequest, OriginRef};
use engine::AlertEngine;
use market::binance::{BinanceBookTickerFeed, BinanceConfig};
use records::{AlertRecordStore, SqliteAlertRecordStore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use cli::{Cli, Cmd};
use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env().with_overrides(&cli);

    init_logger("price-alerts", cfg.json_logs);

    let records: Arc<dyn AlertRecordStore> =
        Arc::new(SqliteAlertRecordStore::connect(&cfg.database_url).await?);

    match cli.command.clone().unwrap_or(Cmd::Run) {
        Cmd::Run => run(cfg, records).await,
        Cmd::Add { pair, price } => {
            let request = AlertRequest::parse(&pair, &price)?;
            let mut alert = Alert::new(request.pair, request.threshold, None);
            alert.origin = Some(OriginRef::new(alert.id.to_string()));
            records.save(&alert).await?;
            println!("{}", alert_line(&alert));
            Ok(())
        }
        Cmd::Remove { id } => {
            let id = AlertId::from_str(&id)?;
            if records.delete(id).await? {
                println!("removed {id}");
            } else {
                println!("no alert with id {id}");
            }
            Ok(())
        }
        Cmd::List => {
            for alert in records.load_all().await? {
                println!("{}", alert_line(&alert));
            }
            Ok(())
        }
    }
}

fn webhook(url: &Option<String>) -> anyhow::Result<Option<WebhookClient>> {
    url.clone()
        .map(WebhookClient::new)
        .transpose()
        .map_err(Into::into)
}

/// Restore persisted alerts, start the engine and the console, and wait
/// until Ctrl-C, `quit`, or a fatal engine error.
async fn run(cfg: AppConfig, records: Arc<dyn AlertRecordStore>) -> anyhow::Result<()> {
    let feed = Arc::new(BinanceBookTickerFeed::new(BinanceConfig {
        base_url: cfg.binance_ws_url.clone(),
        ..BinanceConfig::default()
    }));

    let front = Arc::new(WebhookFrontEnd::new(
        webhook(&cfg.alerts_webhook_url)?,
        webhook(&cfg.logs_webhook_url)?,
        records.clone(),
        cfg.mention_user_id.clone(),
    ));

    let engine = AlertEngine::new(feed, front, cfg.engine());
    let desk = Arc::new(AlertDesk::new(engine.clone(), records));

    let restored = desk.restore().await?;
    info!(
        restored,
        heartbeat_minutes = cfg.heartbeat_minutes,
        alerts_webhook = cfg.alerts_webhook_url.is_some(),
        "Price alerts starting"
    );

    let shutdown = CancellationToken::new();
    let engine_task = tokio::spawn(engine.run(shutdown.clone()));
    tokio::spawn(console::run(desk, shutdown.clone()));

    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received; shutting down");
            on_signal.cancel();
        }
    });

    match engine_task.await? {
        Ok(()) => {
            info!("Shut down cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Engine stopped on fatal error");
            Err(e.into())
        }
    }
}
