// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid notify threshold {value} for location {location_id}")]
    InvalidThreshold { location_id: String, value: i64 },
}

pub type Result<T> = std::result::Result<T, DomainError>;
