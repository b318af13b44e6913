use std::sync::Arc;
use std::time::Duration;

use adapters::{AlertDesk, WebhookFrontEnd};
use async_trait::async_trait;
use chrono::Utc;
use corelib::{Alert, AlertId, AlertRequest, OriginRef, Pair};
use engine::{AlertEngine, EngineConfig};
use market::{FeedError, FeedEvent, MarketFeed, Tick};
use records::{AlertRecordStore, InMemoryAlertRecordStore};
use tokio::sync::mpsc::Sender;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Replays the same asks for the first subscribed pair on every connection.
struct ReplayFeed {
    asks: Vec<f64>,
}

#[async_trait]
impl MarketFeed for ReplayFeed {
    async fn stream(
        &self,
        pairs: &[Pair],
        sender: Sender<FeedEvent>,
        cancel: CancellationToken,
    ) -> Result<(), FeedError> {
        if sender.send(FeedEvent::Connected).await.is_err() {
            return Ok(());
        }
        if let Some(pair) = pairs.first() {
            for &ask in &self.asks {
                let tick = Tick {
                    pair: pair.clone(),
                    ask,
                    ts: Utc::now(),
                };
                if sender.send(FeedEvent::Tick(tick)).await.is_err() {
                    return Ok(());
                }
            }
        }
        cancel.cancelled().await;
        Ok(())
    }
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        idle_poll: Duration::from_millis(10),
        restart_grace: Duration::from_millis(100),
        reconnect_delay: Duration::from_millis(10),
        heartbeat_step: Duration::from_secs(60 * 60),
        ..EngineConfig::default()
    }
}

fn desk_with(asks: Vec<f64>) -> (AlertDesk, Arc<AlertEngine>, Arc<InMemoryAlertRecordStore>) {
    let records = Arc::new(InMemoryAlertRecordStore::new());
    let front = Arc::new(WebhookFrontEnd::new(None, None, records.clone(), None));
    let engine = AlertEngine::new(Arc::new(ReplayFeed { asks }), front, fast_config());
    let desk = AlertDesk::new(engine.clone(), records.clone());
    (desk, engine, records)
}

#[tokio::test]
async fn add_persists_then_arms() {
    let (desk, engine, records) = desk_with(vec![]);

    let alert = desk
        .add(AlertRequest::parse("BTC/USDT", "100000").unwrap())
        .await
        .unwrap();

    let stored = records.load_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, alert.id);
    assert_eq!(stored[0].origin, Some(OriginRef::new(alert.id.to_string())));

    assert_eq!(engine.list_alerts().await, vec![alert]);
    assert!(engine.watched_pairs().await.contains(&Pair::new("BTC", "USDT")));
}

#[tokio::test]
async fn text_commands_round_trip_through_the_desk() {
    let (desk, engine, records) = desk_with(vec![]);

    let reply = desk.handle("/add btc/usdt 100000").await;
    assert!(reply.starts_with("✅ BTC : 100000 USDT (BTC/USDT)"), "{reply}");

    let listed = desk.handle("list").await;
    assert!(listed.contains("BTC : 100000 USDT (BTC/USDT)"));

    let id = engine.list_alerts().await[0].id;
    assert!(desk.handle(&format!("remove {id}")).await.contains("removed"));
    assert!(records.load_all().await.unwrap().is_empty());
    assert!(engine.list_alerts().await.is_empty());

    assert!(desk.handle(&format!("remove {id}")).await.starts_with("no alert"));
    assert_eq!(desk.handle("list").await, "no active alerts");
}

#[tokio::test]
async fn invalid_commands_change_nothing() {
    let (desk, engine, records) = desk_with(vec![]);

    for line in ["/add BTC/ 5", "/add BTC/USDT -1", "/add BTC/USDT abc", "sell everything"] {
        let reply = desk.handle(line).await;
        assert!(reply.starts_with("❌"), "{line} -> {reply}");
        assert!(reply.contains("Usage:"), "{line} -> {reply}");
    }

    assert!(engine.list_alerts().await.is_empty());
    assert!(records.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn restore_rearms_persisted_alerts() {
    let (desk, engine, records) = desk_with(vec![]);

    let alert = Alert::new(Pair::new("ETH", "USDT"), 4_000.0, None);
    records.save(&alert).await.unwrap();

    assert_eq!(desk.restore().await.unwrap(), 1);
    assert_eq!(engine.list_alerts().await[0].id, alert.id);
    assert!(!desk.remove(AlertId::new()).await.unwrap());
}

#[tokio::test]
async fn fired_alert_deletes_its_record() {
    let (desk, engine, records) = desk_with(vec![99_950.0, 100_010.0]);
    desk.add(AlertRequest::parse("BTCUSDT", "100000").unwrap())
        .await
        .unwrap();

    let shutdown = CancellationToken::new();
    let running = tokio::spawn(engine.clone().run(shutdown.clone()));

    let deadline = Instant::now() + Duration::from_secs(10);
    while !records.load_all().await.unwrap().is_empty() {
        assert!(Instant::now() < deadline, "record was never deleted");
        sleep(Duration::from_millis(5)).await;
    }

    assert!(engine.list_alerts().await.is_empty());
    shutdown.cancel();
    running.await.unwrap().unwrap();
}
