// Message Transport Port (SMS delivery)

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Acceptance returned by the transport
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryReceipt {
    /// Provider-side message id, when the transport reports one
    pub message_id: Option<String>,
}

/// Transport errors carry a human-readable reason, no retry hint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Rejected by provider (HTTP {status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

/// Sends a text message to a phone number
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt, TransportError>;
}

/// Transport that only logs. Used when no SMS provider is configured.
pub struct LogOnlyTransport;

#[async_trait]
impl MessageTransport for LogOnlyTransport {
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt, TransportError> {
        if to.trim().is_empty() {
            return Err(TransportError::InvalidDestination(
                "empty phone number".to_string(),
            ));
        }
        info!(to = %to, body = %body, "SMS (log only)");
        Ok(DeliveryReceipt::default())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every message and fails for configured numbers
    #[derive(Default)]
    pub struct RecordingTransport {
        sent: Mutex<Vec<(String, String)>>,
        failing_numbers: Mutex<HashSet<String>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_for(&self, number: impl Into<String>) {
            self.failing_numbers.lock().unwrap().insert(number.into());
        }

        /// Messages accepted so far, in send order
        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn sent_to(&self) -> Vec<String> {
            self.sent().into_iter().map(|(to, _)| to).collect()
        }
    }

    #[async_trait]
    impl MessageTransport for RecordingTransport {
        async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt, TransportError> {
            if self.failing_numbers.lock().unwrap().contains(to) {
                return Err(TransportError::Rejected {
                    status: 400,
                    reason: format!("number {} is unreachable", to),
                });
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((to.to_string(), body.to_string()));
            Ok(DeliveryReceipt {
                message_id: Some(format!("SM{:04}", sent.len())),
            })
        }
    }
}
