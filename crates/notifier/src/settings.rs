//! Runtime settings: defaults < legacy env vars < `WALKIN_*` env vars

use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;
use walkin_core::application::constants::{
    DEFAULT_BUSINESS_NAME, DEFAULT_MINUTES_PER_CUSTOMER, DEFAULT_NOTIFY_WITHIN_MINUTES,
    DEFAULT_WATCH_INTERVAL, MIN_WATCH_INTERVAL,
};
use walkin_core::application::{AnyProviderRule, PolicyConfig};
use walkin_core::domain::{MessageTemplates, SnapshotScope};
use walkin_core::error::{AppError, Result};

const ENV_PREFIX: &str = "WALKIN";
const DEFAULT_DATABASE_PATH: &str = "~/.walkin/queue.db";

/// Variables the hosted deployment already exports
const LEGACY_VARS: &[(&str, &str)] = &[
    ("postgrest_url", "SUPABASE_URL"),
    ("postgrest_key", "SUPABASE_KEY"),
    ("twilio_account_sid", "TWILIO_ACCOUNT_SID"),
    ("twilio_auth_token", "TWILIO_AUTH_TOKEN"),
    ("twilio_from_number", "TWILIO_PHONE_NUMBER"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Postgrest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportBackend {
    Twilio,
    /// Log messages instead of sending them
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    FixedIndex,
    EstimatedWait,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub store: StoreBackend,
    pub database_path: String,
    pub run_migrations: bool,
    pub postgrest_url: Option<String>,
    pub postgrest_key: Option<String>,

    pub transport: TransportBackend,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,

    pub business_name: String,
    pub include_notified: bool,
    pub any_provider_rule: RuleName,
    pub minutes_per_customer: u32,
    pub notify_within_minutes: u32,

    pub watch_interval_secs: u64,
}

impl Settings {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        let legacy: Vec<(&str, String)> = LEGACY_VARS
            .iter()
            .filter_map(|(key, var)| std::env::var(var).ok().map(|value| (*key, value)))
            .collect();
        Self::build(&legacy, Environment::with_prefix(ENV_PREFIX))
    }

    fn build(legacy: &[(&str, String)], env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("store", "sqlite")
            .and_then(|b| b.set_default("database_path", DEFAULT_DATABASE_PATH))
            .and_then(|b| b.set_default("run_migrations", true))
            .and_then(|b| b.set_default("transport", "log"))
            .and_then(|b| b.set_default("business_name", DEFAULT_BUSINESS_NAME))
            .and_then(|b| b.set_default("include_notified", false))
            .and_then(|b| b.set_default("any_provider_rule", "fixed_index"))
            .and_then(|b| {
                b.set_default("minutes_per_customer", DEFAULT_MINUTES_PER_CUSTOMER)
            })
            .and_then(|b| {
                b.set_default("notify_within_minutes", DEFAULT_NOTIFY_WITHIN_MINUTES)
            })
            .and_then(|b| {
                b.set_default("watch_interval_secs", DEFAULT_WATCH_INTERVAL.as_secs())
            })
            .map_err(config_error)?;

        for (key, value) in legacy {
            builder = builder
                .set_default(*key, value.as_str())
                .map_err(config_error)?;
        }

        let settings: Settings = builder
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        match self.store {
            StoreBackend::Sqlite if self.database_path.trim().is_empty() => {
                return Err(AppError::Config("database_path is empty".to_string()));
            }
            StoreBackend::Postgrest
                if is_blank(&self.postgrest_url) || is_blank(&self.postgrest_key) =>
            {
                return Err(AppError::Config(
                    "postgrest store needs WALKIN_POSTGREST_URL and WALKIN_POSTGREST_KEY \
                     (or SUPABASE_URL / SUPABASE_KEY)"
                        .to_string(),
                ));
            }
            _ => {}
        }

        if self.transport == TransportBackend::Twilio
            && (is_blank(&self.twilio_account_sid)
                || is_blank(&self.twilio_auth_token)
                || is_blank(&self.twilio_from_number))
        {
            return Err(AppError::Config(
                "twilio transport needs account sid, auth token and from number".to_string(),
            ));
        }

        if self.watch_interval() < MIN_WATCH_INTERVAL {
            return Err(AppError::Config(format!(
                "watch_interval_secs must be at least {}",
                MIN_WATCH_INTERVAL.as_secs()
            )));
        }

        self.policy_config().validate()
    }

    /// SQLite file path with `~` expanded. A `sqlite://` prefix is accepted.
    pub fn expanded_database_path(&self) -> String {
        let raw = self.database_path.trim();
        let path = raw.strip_prefix("sqlite://").unwrap_or(raw);
        shellexpand::tilde(path).into_owned()
    }

    pub fn scope(&self) -> SnapshotScope {
        if self.include_notified {
            SnapshotScope::WithNotified
        } else {
            SnapshotScope::PendingOnly
        }
    }

    pub fn policy_config(&self) -> PolicyConfig {
        let any_provider_rule = match self.any_provider_rule {
            RuleName::FixedIndex => AnyProviderRule::FixedIndex,
            RuleName::EstimatedWait => AnyProviderRule::EstimatedWait {
                minutes_per_customer: self.minutes_per_customer,
                notify_within_minutes: self.notify_within_minutes,
            },
        };
        PolicyConfig {
            any_provider_rule,
            templates: MessageTemplates::default(),
            business_name: self.business_name.clone(),
        }
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs)
    }
}

fn config_error(err: config::ConfigError) -> AppError {
    AppError::Config(err.to_string())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::build(&[], env(&[])).unwrap();
        assert_eq!(settings.store, StoreBackend::Sqlite);
        assert_eq!(settings.transport, TransportBackend::Log);
        assert_eq!(settings.scope(), SnapshotScope::PendingOnly);
        assert_eq!(settings.watch_interval(), DEFAULT_WATCH_INTERVAL);
        assert_eq!(
            settings.policy_config().any_provider_rule,
            AnyProviderRule::FixedIndex
        );
        assert!(!settings.expanded_database_path().contains('~'));
        assert!(settings.expanded_database_path().ends_with(".walkin/queue.db"));
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::build(
            &[],
            env(&[
                ("WALKIN_ANY_PROVIDER_RULE", "estimated_wait"),
                ("WALKIN_MINUTES_PER_CUSTOMER", "25"),
                ("WALKIN_INCLUDE_NOTIFIED", "true"),
                ("WALKIN_BUSINESS_NAME", "Fade Lab Midtown"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.scope(), SnapshotScope::WithNotified);
        assert_eq!(
            settings.policy_config().any_provider_rule,
            AnyProviderRule::EstimatedWait {
                minutes_per_customer: 25,
                notify_within_minutes: DEFAULT_NOTIFY_WITHIN_MINUTES,
            }
        );
        assert_eq!(settings.policy_config().business_name, "Fade Lab Midtown");
    }

    #[test]
    fn test_legacy_vars_and_prefixed_precedence() {
        let legacy = vec![
            ("postgrest_url", "https://old.supabase.co".to_string()),
            ("postgrest_key", "legacy-key".to_string()),
        ];
        let settings = Settings::build(
            &legacy,
            env(&[
                ("WALKIN_STORE", "postgrest"),
                ("WALKIN_POSTGREST_URL", "https://new.supabase.co"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.store, StoreBackend::Postgrest);
        assert_eq!(
            settings.postgrest_url.as_deref(),
            Some("https://new.supabase.co")
        );
        assert_eq!(settings.postgrest_key.as_deref(), Some("legacy-key"));
    }

    #[test]
    fn test_twilio_requires_credentials() {
        let err = Settings::build(&[], env(&[("WALKIN_TRANSPORT", "twilio")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_twilio_number_keeps_plus_sign() {
        let settings = Settings::build(
            &[],
            env(&[
                ("WALKIN_TRANSPORT", "twilio"),
                ("WALKIN_TWILIO_ACCOUNT_SID", "AC123"),
                ("WALKIN_TWILIO_AUTH_TOKEN", "secret"),
                ("WALKIN_TWILIO_FROM_NUMBER", "+15550000000"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.twilio_from_number.as_deref(), Some("+15550000000"));
    }

    #[test]
    fn test_database_path_expands_home() {
        let settings = Settings::build(
            &[],
            env(&[("WALKIN_DATABASE_PATH", "sqlite://~/shop/queue.db")]),
        )
        .unwrap();
        let path = settings.expanded_database_path();
        assert!(!path.starts_with("sqlite:"));
        assert!(!path.contains('~'));
        assert!(path.ends_with("shop/queue.db"));
    }

    #[test]
    fn test_interval_floor() {
        let err =
            Settings::build(&[], env(&[("WALKIN_WATCH_INTERVAL_SECS", "1")])).unwrap_err();
        assert!(err.to_string().contains("watch_interval_secs"));
    }
}
