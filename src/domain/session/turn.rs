//! Conversation turn value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Who produced a turn within an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The inbound counterparty being engaged.
    Scammer,
    /// The victim persona generated by this system.
    Honeypot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sender::Scammer => "scammer",
            Sender::Honeypot => "honeypot",
        };
        write!(f, "{}", s)
    }
}

/// One message exchanged within a session. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
    pub timestamp: Timestamp,
}

impl Turn {
    /// Creates a turn with the current timestamp.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Creates an inbound scammer turn.
    pub fn scammer(text: impl Into<String>) -> Self {
        Self::new(Sender::Scammer, text)
    }

    /// Creates an outbound honeypot turn.
    pub fn honeypot(text: impl Into<String>) -> Self {
        Self::new(Sender::Honeypot, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_sender() {
        assert_eq!(Turn::scammer("hi").sender, Sender::Scammer);
        assert_eq!(Turn::honeypot("hello").sender, Sender::Honeypot);
    }

    #[test]
    fn sender_serializes_to_snake_case() {
        assert_eq!(serde_json::to_string(&Sender::Scammer).unwrap(), "\"scammer\"");
        assert_eq!(serde_json::to_string(&Sender::Honeypot).unwrap(), "\"honeypot\"");
    }
}
