//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for an engagement session.
///
/// Session ids are assigned by the message-routing platform and are treated
/// as opaque non-empty strings. When the platform omits one, a fresh UUID
/// is generated instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a SessionId from a platform-supplied string.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the string is empty or whitespace-only
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::empty_field("sessionId"));
        }
        Ok(Self(raw))
    }

    /// Generates a fresh random SessionId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_accepts_opaque_strings() {
        let id = SessionId::new("wa-session-0042").unwrap();
        assert_eq!(id.as_str(), "wa-session-0042");
        assert_eq!(id.to_string(), "wa-session-0042");
    }

    #[test]
    fn session_id_rejects_empty_strings() {
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new("   ").is_err());
    }

    #[test]
    fn generated_session_ids_are_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn session_id_serializes_transparently() {
        let id = SessionId::new("abc-123").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-123\"");
    }
}
