use corelib::{Alert, AlertId, OriginRef, Pair};
use records::{AlertRecordStore, RecordError, SqliteAlertRecordStore};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Fresh in-memory database; one connection so every query sees the same db.
async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

async fn store() -> (SqliteAlertRecordStore, SqlitePool) {
    let pool = memory_pool().await;
    let store = SqliteAlertRecordStore::from_pool(pool.clone()).await.unwrap();
    (store, pool)
}

fn sample(base: &str, threshold: f64) -> Alert {
    Alert::new(Pair::new(base, "USDT"), threshold, None)
}

#[tokio::test]
async fn saved_alerts_come_back_with_their_ids() -> anyhow::Result<()> {
    let (store, _pool) = store().await;

    let btc = sample("BTC", 100_000.0);
    let pepe = sample("PEPE", 0.000_012_34);
    store.save(&btc).await?;
    store.save(&pepe).await?;

    let loaded = store.load_all().await?;
    assert_eq!(loaded.len(), 2);

    let restored = loaded.iter().find(|a| a.id == btc.id).unwrap();
    assert_eq!(restored.pair, btc.pair);
    assert_eq!(restored.threshold, 100_000.0);
    assert_eq!(restored.created_at, btc.created_at);
    // The record itself is the origin to delete once the alert fires.
    assert_eq!(restored.origin, Some(OriginRef::new(btc.id.to_string())));

    let tiny = loaded.iter().find(|a| a.id == pepe.id).unwrap();
    assert_eq!(tiny.threshold, 0.000_012_34);

    Ok(())
}

#[tokio::test]
async fn load_is_oldest_first() -> anyhow::Result<()> {
    let (store, _pool) = store().await;

    let mut older = sample("ETH", 4_000.0);
    older.created_at = older.created_at - chrono::Duration::minutes(5);
    let newer = sample("BTC", 100_000.0);

    store.save(&newer).await?;
    store.save(&older).await?;

    let ids: Vec<_> = store.load_all().await?.into_iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![older.id, newer.id]);
    Ok(())
}

#[tokio::test]
async fn save_is_an_upsert() -> anyhow::Result<()> {
    let (store, _pool) = store().await;

    let mut alert = sample("BTC", 100_000.0);
    store.save(&alert).await?;
    alert.threshold = 95_000.0;
    store.save(&alert).await?;

    let loaded = store.load_all().await?;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].threshold, 95_000.0);
    Ok(())
}

#[tokio::test]
async fn delete_reports_whether_a_row_existed() -> anyhow::Result<()> {
    let (store, _pool) = store().await;

    let alert = sample("BTC", 100_000.0);
    store.save(&alert).await?;

    assert!(store.delete(alert.id).await?);
    assert!(!store.delete(alert.id).await?);
    assert!(!store.delete(AlertId::new()).await?);
    assert!(store.load_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn schema_creation_is_idempotent() -> anyhow::Result<()> {
    let pool = memory_pool().await;

    let first = SqliteAlertRecordStore::from_pool(pool.clone()).await?;
    first.save(&sample("BTC", 1.0)).await?;

    let second = SqliteAlertRecordStore::from_pool(pool).await?;
    assert_eq!(second.load_all().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn corrupt_rows_are_reported() -> anyhow::Result<()> {
    let (store, pool) = store().await;

    sqlx::query(
        "INSERT INTO alerts (alert_id, base, quote, alert_price, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind("not-a-uuid")
    .bind("BTC")
    .bind("USDT")
    .bind(1.0_f64)
    .bind("2025-01-01T00:00:00Z")
    .execute(&pool)
    .await?;

    let err = store.load_all().await.unwrap_err();
    assert!(matches!(err, RecordError::CorruptRow { ref id, .. } if id == "not-a-uuid"));
    Ok(())
}
