//! Shared fixtures: an in-memory SQLite queue plus a recording transport

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use walkin_core::application::{NotificationPolicyEngine, NotifyService, PolicyConfig};
use walkin_core::domain::SnapshotScope;
use walkin_core::port::id_provider::SequentialIdProvider;
use walkin_core::port::message_transport::mocks::RecordingTransport;
use walkin_infra_sqlite::{create_pool, run_migrations, SqliteQueueStore};

pub struct Harness {
    pub store: Arc<SqliteQueueStore>,
    pub transport: Arc<RecordingTransport>,
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

impl Harness {
    pub async fn new() -> Self {
        let pool = create_pool(":memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        Self {
            store: Arc::new(SqliteQueueStore::new(pool)),
            transport: Arc::new(RecordingTransport::new()),
        }
    }

    pub fn service(&self, scope: SnapshotScope) -> NotifyService {
        self.service_with(PolicyConfig::default(), scope)
    }

    pub fn service_with(&self, config: PolicyConfig, scope: SnapshotScope) -> NotifyService {
        NotifyService::new(
            self.store.clone(),
            self.transport.clone(),
            Arc::new(SequentialIdProvider::default()),
            NotificationPolicyEngine::new(config),
            scope,
        )
    }

    pub async fn shop(&self, id: &str, name: &str, threshold: Option<i64>) {
        sqlx::query("INSERT INTO barbershops (id, name, notify_threshold) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(threshold)
            .execute(self.store.pool())
            .await
            .unwrap();
    }

    pub async fn barbers(&self, shop: &str, ids: &[&str]) {
        for id in ids {
            sqlx::query(
                "INSERT INTO barbers (id, shop_id, name, status) VALUES (?, ?, ?, 'active')",
            )
            .bind(id)
            .bind(shop)
            .bind(format!("Barber {}", id))
            .execute(self.store.pool())
            .await
            .unwrap();
        }
    }

    /// Waiting entry; phone is derived from the id so sends are easy to assert
    pub async fn walk_in(&self, id: &str, shop: &str, minute: i64, barber: Option<&str>) {
        sqlx::query(
            r#"
            INSERT INTO queue_entries
                (id, shop_id, customer_name, phone_number, status, joined_at, requested_barber_id, notified)
            VALUES (?, ?, ?, ?, 'waiting', ?, ?, 0)
            "#,
        )
        .bind(id)
        .bind(shop)
        .bind(format!("Customer {}", id))
        .bind(phone(id))
        .bind(base_time() + Duration::minutes(minute))
        .bind(barber)
        .execute(self.store.pool())
        .await
        .unwrap();
    }

    pub async fn set_status(&self, id: &str, status: &str) {
        sqlx::query("UPDATE queue_entries SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(self.store.pool())
            .await
            .unwrap();
    }

    pub async fn is_notified(&self, id: &str) -> bool {
        let (notified,): (bool,) =
            sqlx::query_as("SELECT notified FROM queue_entries WHERE id = ?")
                .bind(id)
                .fetch_one(self.store.pool())
                .await
                .unwrap();
        notified
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.transport.sent_to()
    }
}

pub fn phone(id: &str) -> String {
    format!("+1555{}", id)
}
