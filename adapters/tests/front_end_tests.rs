use std::sync::Arc;
use std::time::Duration;

use adapters::{WebhookClient, WebhookFrontEnd};
use chrono::Utc;
use corelib::{Alert, Direction, OriginRef, Pair};
use engine::{AlertCollaborator, DeleteOutcome, Firing, HeartbeatReport, StreamState};
use records::{AlertRecordStore, InMemoryAlertRecordStore};

mod mock_webhook;
use mock_webhook::MockWebhook;

fn firing() -> Firing {
    Firing {
        alert: Alert::new(Pair::new("BTC", "USDT"), 100_000.0, None),
        direction: Direction::Up,
        previous: 99_950.0,
        price: 100_010.0,
        at: Utc::now(),
    }
}

fn report() -> HeartbeatReport {
    HeartbeatReport {
        at: Utc::now(),
        last_tick_age: Some(Duration::from_secs(3)),
        watched_pairs: 2,
        stream_state: StreamState::Streaming,
    }
}

fn hook(mock: &MockWebhook) -> Option<WebhookClient> {
    Some(WebhookClient::new(mock.url.clone()).unwrap())
}

#[tokio::test]
async fn crossings_go_to_the_alerts_webhook() {
    let alerts = MockWebhook::spawn(204).await;
    let logs = MockWebhook::spawn(204).await;
    let front = WebhookFrontEnd::new(
        hook(&alerts),
        hook(&logs),
        Arc::new(InMemoryAlertRecordStore::new()),
        Some("42".into()),
    );

    front.notify_crossed(&firing()).await.unwrap();
    front.report_heartbeat(&report()).await.unwrap();

    assert_eq!(
        alerts.contents(),
        vec!["<@42> ! BTCUSDT pair has crossed the price of 100000 ! 📈".to_string()]
    );
    let logs = logs.contents();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].contains("last_websocket_message_age = 3s"));
    assert!(logs[0].contains("pairs_number = 2"));
}

#[tokio::test]
async fn webhook_errors_surface_to_the_engine() {
    let broken = MockWebhook::spawn(500).await;
    let front = WebhookFrontEnd::new(
        hook(&broken),
        hook(&broken),
        Arc::new(InMemoryAlertRecordStore::new()),
        None,
    );

    assert!(front.notify_crossed(&firing()).await.is_err());
    assert!(front.report_heartbeat(&report()).await.is_err());
}

#[tokio::test]
async fn fatal_reports_are_best_effort() {
    let alerts = MockWebhook::spawn(204).await;
    let front = WebhookFrontEnd::new(
        hook(&alerts),
        None,
        Arc::new(InMemoryAlertRecordStore::new()),
        None,
    );

    front.report_fatal("market feed failed: boom").await;

    let sent = alerts.contents();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("market feed failed: boom"));
}

#[tokio::test]
async fn without_webhooks_everything_is_logged_only() {
    let front = WebhookFrontEnd::new(None, None, Arc::new(InMemoryAlertRecordStore::new()), None);

    assert!(front.notify_crossed(&firing()).await.is_ok());
    assert!(front.report_heartbeat(&report()).await.is_ok());
    front.report_fatal("ignored").await;
}

#[tokio::test]
async fn origin_deletion_removes_the_record_once() {
    let records = Arc::new(InMemoryAlertRecordStore::new());
    let front = WebhookFrontEnd::new(None, None, records.clone(), None);

    let alert = Alert::new(Pair::new("BTC", "USDT"), 1.0, None);
    records.save(&alert).await.unwrap();
    let origin = OriginRef::new(alert.id.to_string());

    assert_eq!(
        front.delete_origin_record(&origin).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        front.delete_origin_record(&origin).await.unwrap(),
        DeleteOutcome::NotFound
    );
    assert_eq!(
        front
            .delete_origin_record(&OriginRef::new("discord-msg-1"))
            .await
            .unwrap(),
        DeleteOutcome::NotFound
    );
}
