//! Composition root: settings -> adapters -> NotifyService

use crate::settings::{Settings, StoreBackend, TransportBackend};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use walkin_core::application::{NotificationPolicyEngine, NotifyService};
use walkin_core::port::id_provider::UuidProvider;
use walkin_core::port::{LogOnlyTransport, MessageTransport, QueueStore};
use walkin_infra_http::{PostgrestConfig, PostgrestQueueStore, TwilioConfig, TwilioTransport};
use walkin_infra_sqlite::{create_pool, run_migrations, SqliteQueueStore};

pub async fn build_store(settings: &Settings) -> Result<Arc<dyn QueueStore>> {
    match settings.store {
        StoreBackend::Sqlite => {
            let path = settings.expanded_database_path();
            info!(db_path = %path, "Opening SQLite queue store");

            ensure_parent_dir(&path)?;
            let pool = create_pool(&path).await.context("DB pool creation failed")?;
            if settings.run_migrations {
                run_migrations(&pool).await.context("Migration failed")?;
            }
            Ok(Arc::new(SqliteQueueStore::new(pool)))
        }
        StoreBackend::Postgrest => {
            let config = PostgrestConfig::new(
                settings.postgrest_url.clone().unwrap_or_default(),
                settings.postgrest_key.clone().unwrap_or_default(),
            );
            info!(base_url = %config.base_url, "Using PostgREST queue store");
            Ok(Arc::new(
                PostgrestQueueStore::new(config).context("PostgREST client setup failed")?,
            ))
        }
    }
}

/// `create_if_missing` only creates the file, not its directory
fn ensure_parent_dir(path: &str) -> Result<()> {
    if path.contains(":memory:") {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create database directory {}", dir.display())),
        _ => Ok(()),
    }
}

pub fn build_transport(settings: &Settings) -> Result<Arc<dyn MessageTransport>> {
    match settings.transport {
        TransportBackend::Twilio => {
            let config = TwilioConfig::new(
                settings.twilio_account_sid.clone().unwrap_or_default(),
                settings.twilio_auth_token.clone().unwrap_or_default(),
                settings.twilio_from_number.clone().unwrap_or_default(),
            );
            Ok(Arc::new(
                TwilioTransport::new(config).context("Twilio client setup failed")?,
            ))
        }
        TransportBackend::Log => {
            info!("Log-only transport: no SMS will be sent");
            Ok(Arc::new(LogOnlyTransport))
        }
    }
}

pub async fn build_service(settings: &Settings) -> Result<NotifyService> {
    let store = build_store(settings).await?;
    let transport = build_transport(settings)?;
    let engine = NotificationPolicyEngine::new(settings.policy_config());

    Ok(NotifyService::new(
        store,
        transport,
        Arc::new(UuidProvider),
        engine,
        settings.scope(),
    ))
}
