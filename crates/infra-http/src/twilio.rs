// Twilio SMS transport (Programmable Messaging REST API)

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use walkin_core::error::{AppError, Result};
use walkin_core::port::{DeliveryReceipt, MessageTransport, TransportError};

pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Twilio error codes meaning the destination itself is unusable
const INVALID_DESTINATION_CODES: &[i64] = &[21211, 21214, 21610, 21614];

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 format
    pub from_number: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl TwilioConfig {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            api_base: TWILIO_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

pub struct TwilioTransport {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioTransport {
    pub fn new(config: TwilioConfig) -> Result<Self> {
        for (name, value) in [
            ("account sid", &config.account_sid),
            ("auth token", &config.auth_token),
            ("from number", &config.from_number),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("Twilio {} is not set", name)));
            }
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn form<'a>(&'a self, to: &'a str, body: &'a str) -> [(&'static str, &'a str); 3] {
        [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ]
    }
}

/// Turn a non-2xx Twilio response into a transport error
fn rejection(status: u16, body: &str) -> TransportError {
    let parsed: Option<TwilioErrorBody> = serde_json::from_str(body).ok();
    let reason = parsed
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_else(|| body.trim().to_string());

    match parsed.and_then(|b| b.code) {
        Some(code) if INVALID_DESTINATION_CODES.contains(&code) => {
            TransportError::InvalidDestination(format!("{} (Twilio {})", reason, code))
        }
        _ => TransportError::Rejected { status, reason },
    }
}

#[async_trait]
impl MessageTransport for TwilioTransport {
    async fn send(
        &self,
        to: &str,
        body: &str,
    ) -> std::result::Result<DeliveryReceipt, TransportError> {
        if to.trim().is_empty() {
            return Err(TransportError::InvalidDestination(
                "empty phone number".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&self.form(to, body))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &text));
        }

        let message_id = serde_json::from_str::<MessageResource>(&text)
            .ok()
            .and_then(|m| m.sid);
        debug!(to = %to, message_id = ?message_id, "Twilio accepted message");

        Ok(DeliveryReceipt { message_id })
    }
}
