// PostgREST (Supabase REST) QueueStore Implementation

use crate::error::{map_http_error, rows_error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::{debug, warn};
use walkin_core::domain::location::parse_threshold;
use walkin_core::domain::{
    EntryId, EntryStatus, Location, Provider, ProviderStatus, QueueEntry, RequestedProvider,
};
use walkin_core::error::{AppError, Result};
use walkin_core::port::{EntryFilter, MarkOutcome, QueueStore};

const ENTRIES_TABLE: &str = "queue_entries";
const PROVIDERS_TABLE: &str = "barbers";
const LOCATIONS_TABLE: &str = "barbershops";

#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl PostgrestConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }
}

pub struct PostgrestQueueStore {
    client: reqwest::Client,
    config: PostgrestConfig,
}

impl PostgrestQueueStore {
    pub fn new(config: PostgrestConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(AppError::Config("PostgREST url is not set".to_string()));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| AppError::Config("PostgREST api key is not a valid header".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| AppError::Config("PostgREST api key is not a valid header".to_string()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .client
            .get(self.config.table_url(table))
            .query(query)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rows_error(table, status.as_u16(), &body));
        }

        let rows: Vec<T> = response.json().await.map_err(map_http_error)?;
        debug!(table = table, rows = rows.len(), "PostgREST select");
        Ok(rows)
    }
}

fn entry_query(filter: EntryFilter) -> Vec<(&'static str, String)> {
    let mut query = vec![
        (
            "select",
            "id,shop_id,customer_name,phone_number,status,joined_at,requested_barber_id,notified"
                .to_string(),
        ),
        ("status", "eq.waiting".to_string()),
    ];
    if filter.only_unnotified {
        query.push(("notified", "eq.false".to_string()));
    }
    query.push(("order", "joined_at.asc,id.asc".to_string()));
    query
}

fn mark_query(id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("id", format!("eq.{}", id)),
        ("notified", "eq.false".to_string()),
    ]
}

#[async_trait]
impl QueueStore for PostgrestQueueStore {
    async fn fetch_waiting_entries(&self, filter: EntryFilter) -> Result<Vec<QueueEntry>> {
        let rows: Vec<EntryRow> = self.select(ENTRIES_TABLE, &entry_query(filter)).await?;
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn fetch_active_providers(&self) -> Result<Vec<Provider>> {
        let query = [
            ("select", "id,shop_id,status".to_string()),
            ("status", "eq.active".to_string()),
        ];
        let rows: Vec<ProviderRow> = self.select(PROVIDERS_TABLE, &query).await?;
        Ok(rows.into_iter().map(ProviderRow::into_provider).collect())
    }

    async fn fetch_locations(&self) -> Result<Vec<Location>> {
        let query = [("select", "id,name,notify_threshold".to_string())];
        let rows: Vec<LocationRow> = self.select(LOCATIONS_TABLE, &query).await?;
        Ok(rows.into_iter().map(LocationRow::into_location).collect())
    }

    async fn mark_notified(&self, id: &EntryId) -> Result<MarkOutcome> {
        let response = self
            .client
            .patch(self.config.table_url(ENTRIES_TABLE))
            .query(&mark_query(id))
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "notified": true }))
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rows_error(ENTRIES_TABLE, status.as_u16(), &body));
        }

        let updated: Vec<serde_json::Value> = response.json().await.map_err(map_http_error)?;
        match updated.len() {
            0 => Ok(MarkOutcome::NotMarked),
            1 => Ok(MarkOutcome::Marked),
            n => {
                warn!(entry_id = %id, rows = n, "Mark-notified touched more than one row");
                Ok(MarkOutcome::Marked)
            }
        }
    }
}

/// PostgREST ids may be uuid strings or bigint columns
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn optional_id_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }
    Ok(
        Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }),
    )
}

#[derive(Debug, Deserialize)]
struct EntryRow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(deserialize_with = "id_string")]
    shop_id: String,
    #[serde(default)]
    customer_name: String,
    #[serde(default)]
    phone_number: String,
    status: String,
    joined_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_id_string")]
    requested_barber_id: Option<String>,
    #[serde(default)]
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

#[derive(Debug, Deserialize)]
struct ProviderRow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(deserialize_with = "id_string")]
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

#[derive(Debug, Deserialize)]
struct LocationRow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
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
