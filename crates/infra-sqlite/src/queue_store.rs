// SQLite QueueStore Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use walkin_core::domain::location::parse_threshold;
use walkin_core::domain::{
    EntryId, EntryStatus, Location, Provider, ProviderStatus, QueueEntry, RequestedProvider,
};
use walkin_core::error::Result;
use walkin_core::port::{EntryFilter, MarkOutcome, QueueStore};

pub struct SqliteQueueStore {
    pool: SqlitePool,
}

impl SqliteQueueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn fetch_waiting_entries(&self, filter: EntryFilter) -> Result<Vec<QueueEntry>> {
        let sql = if filter.only_unnotified {
            r#"
            SELECT id, shop_id, customer_name, phone_number, status,
                   joined_at, requested_barber_id, notified
            FROM queue_entries
            WHERE status = 'waiting' AND notified = 0
            ORDER BY joined_at ASC, id ASC
            "#
        } else {
            r#"
            SELECT id, shop_id, customer_name, phone_number, status,
                   joined_at, requested_barber_id, notified
            FROM queue_entries
            WHERE status = 'waiting'
            ORDER BY joined_at ASC, id ASC
            "#
        };

        let rows: Vec<EntryRow> = sqlx::query_as(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!(rows = rows.len(), "Fetched waiting queue entries");
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn fetch_active_providers(&self) -> Result<Vec<Provider>> {
        let rows: Vec<ProviderRow> = sqlx::query_as(
            r#"
            SELECT id, shop_id, status
            FROM barbers
            WHERE status = 'active'
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProviderRow::into_provider).collect())
    }

    async fn fetch_locations(&self) -> Result<Vec<Location>> {
        let rows: Vec<LocationRow> =
            sqlx::query_as("SELECT id, name, notify_threshold FROM barbershops")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(LocationRow::into_location).collect())
    }

    async fn mark_notified(&self, id: &EntryId) -> Result<MarkOutcome> {
        // Conditional update: only the false -> true transition counts
        let result = sqlx::query(
            r#"
            UPDATE queue_entries
            SET notified = 1
            WHERE id = ? AND notified = 0
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            Ok(MarkOutcome::NotMarked)
        } else {
            Ok(MarkOutcome::Marked)
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: String,
    shop_id: String,
    customer_name: String,
    phone_number: String,
    status: String,
    joined_at: DateTime<Utc>,
    requested_barber_id: Option<String>,
    notified: bool,
}

impl EntryRow {
    fn into_entry(self) -> QueueEntry {
        QueueEntry {
            id: self.id,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            status: EntryStatus::parse(&self.status),
            joined_at: self.joined_at,
            requested_provider: RequestedProvider::from_column(self.requested_barber_id),
            location_id: self.shop_id,
            notified: self.notified,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProviderRow {
    id: String,
    shop_id: String,
    status: String,
}

impl ProviderRow {
    fn into_provider(self) -> Provider {
        Provider {
            id: self.id,
            location_id: self.shop_id,
            status: ProviderStatus::parse(&self.status),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    id: String,
    name: Option<String>,
    notify_threshold: Option<i64>,
}

impl LocationRow {
    fn into_location(self) -> Location {
        let notify_threshold = match parse_threshold(&self.id, self.notify_threshold) {
            Ok(threshold) => threshold,
            Err(e) => {
                warn!(location_id = %self.id, error = %e, "Ignoring invalid notify threshold");
                None
            }
        };
        Location {
            id: self.id,
            name: self.name,
            notify_threshold,
        }
    }
}
