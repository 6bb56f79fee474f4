// Location (Shop) Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Location identifier
pub type LocationId = String;

/// Location configuration relevant to notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    /// Display name used in message text
    pub name: Option<String>,
    /// Explicit notify position for the "any provider" bucket.
    /// `None` means derive it from the active-provider count.
    pub notify_threshold: Option<u32>,
}

impl Location {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            notify_threshold: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.notify_threshold = Some(threshold);
        self
    }

    /// Name to put in customer messages, falling back to the business name
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => fallback,
        }
    }
}

/// Validate a raw threshold column value
pub fn parse_threshold(location_id: &str, raw: Option<i64>) -> Result<Option<u32>> {
    match raw {
        None => Ok(None),
        Some(value) => u32::try_from(value)
            .map(Some)
            .map_err(|_| DomainError::InvalidThreshold {
                location_id: location_id.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let unnamed = Location::new("shop-1");
        assert_eq!(unnamed.display_name("Fade Lab"), "Fade Lab");

        let blank = Location::new("shop-1").with_name(" ");
        assert_eq!(blank.display_name("Fade Lab"), "Fade Lab");

        let named = Location::new("shop-1").with_name("Fade Lab Downtown");
        assert_eq!(named.display_name("Fade Lab"), "Fade Lab Downtown");
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("s", None).unwrap(), None);
        assert_eq!(parse_threshold("s", Some(2)).unwrap(), Some(2));

        let err = parse_threshold("s", Some(-1)).unwrap_err();
        assert!(err.to_string().contains("-1"));
    }
}
