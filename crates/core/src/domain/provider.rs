// Provider (Barber) Domain Model

use super::location::LocationId;
use serde::{Deserialize, Serialize};

/// Provider ID
pub type ProviderId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Active,
    Inactive,
}

impl ProviderStatus {
    /// Anything other than `active` counts as inactive
    pub fn parse(raw: &str) -> Self {
        if raw == "active" {
            ProviderStatus::Active
        } else {
            ProviderStatus::Inactive
        }
    }
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderStatus::Active => write!(f, "active"),
            ProviderStatus::Inactive => write!(f, "inactive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub location_id: LocationId,
    pub status: ProviderStatus,
}

impl Provider {
    pub fn active(id: impl Into<String>, location_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location_id: location_id.into(),
            status: ProviderStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProviderStatus::Active
    }
}
