//! Hybrid intelligence extractor.
//!
//! Three stages per inbound message: the deterministic pattern pass, a
//! contextual model pass that validates candidates and recovers near-misses,
//! and a co-occurrence boost. The contextual pass degrades to the pattern
//! results on any provider failure - already-extracted data is never lost to
//! an outage.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::session::{IntelCategory, Intelligence, Turn};
use crate::ports::{ChatRequest, ChatRole, LlmCaller, LlmError};

use super::patterns;

/// Most recent turns included as context for the model pass.
const CONTEXT_TURNS: usize = 6;

/// Two-stage hybrid extractor with rule boost.
pub struct ExtractionEngine {
    caller: Arc<dyn LlmCaller>,
}

impl ExtractionEngine {
    pub fn new(caller: Arc<dyn LlmCaller>) -> Self {
        Self { caller }
    }

    /// Extracts intelligence from one inbound message.
    ///
    /// The result is a per-message delta; callers union it into the session
    /// sets, which keeps repeated extraction of the same message idempotent.
    pub async fn extract(&self, text: &str, history: &[Turn]) -> Intelligence {
        let mut first_pass = patterns::pattern_pass(text);
        patterns::apply_boosts(text, &mut first_pass);

        // Keywords alone never need contextual validation.
        if !patterns::has_actionable(&first_pass) {
            debug!(items = first_pass.total_items(), "pattern pass found no actionable data");
            return first_pass;
        }

        match self.contextual_pass(text, &first_pass, history).await {
            Ok(validated) => {
                debug!(items = validated.total_items(), "contextual extraction complete");
                validated
            }
            Err(err) => {
                warn!(error = %err, "contextual pass failed, degrading to pattern results");
                first_pass
            }
        }
    }

    /// Sends first-pass candidates plus the raw message through the model
    /// for validation and near-miss recovery.
    async fn contextual_pass(
        &self,
        text: &str,
        candidates: &Intelligence,
        history: &[Turn],
    ) -> Result<Intelligence, LlmError> {
        let prompt = build_prompt(text, candidates, history);
        let request = ChatRequest::new()
            .with_message(ChatRole::User, prompt)
            .with_max_tokens(200)
            .with_temperature(0.0);

        let response = self.caller.call(request).await?;
        let parsed = parse_model_json(&response.content)?;

        let mut validated = Intelligence::new();
        for (category, key) in [
            (IntelCategory::BankAccounts, "bankAccounts"),
            (IntelCategory::UpiIds, "upiIds"),
            (IntelCategory::PhoneNumbers, "phoneNumbers"),
            (IntelCategory::PhishingLinks, "phishingLinks"),
            (IntelCategory::EmailAddresses, "emailAddresses"),
        ] {
            match parsed.get(key).and_then(Value::as_array) {
                Some(values) => {
                    for v in values.iter().filter_map(Value::as_str) {
                        validated.insert(category, v);
                    }
                }
                // Category missing from the reply: keep the regex candidates.
                None => {
                    for v in candidates.category(category) {
                        validated.insert(category, v);
                    }
                }
            }
        }
        // Suspicious keywords always come from the deterministic pass.
        for v in candidates.category(IntelCategory::SuspiciousKeywords) {
            validated.insert(IntelCategory::SuspiciousKeywords, v);
        }
        Ok(validated)
    }
}

fn build_prompt(text: &str, candidates: &Intelligence, history: &[Turn]) -> String {
    let context = if history.is_empty() {
        "No prior conversation.".to_string()
    } else {
        history
            .iter()
            .rev()
            .take(CONTEXT_TURNS)
            .rev()
            .map(|t| {
                format!("{}: {}", t.sender, t.text)
                    .chars()
                    .take(120)
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let candidate_json = serde_json::json!({
        "bankAccounts": candidates.category(IntelCategory::BankAccounts),
        "upiIds": candidates.category(IntelCategory::UpiIds),
        "phoneNumbers": candidates.category(IntelCategory::PhoneNumbers),
        "phishingLinks": candidates.category(IntelCategory::PhishingLinks),
        "emailAddresses": candidates.category(IntelCategory::EmailAddresses),
    });

    format!(
        "You are analyzing a scam conversation to extract the SCAMMER'S payment and contact details.\n\n\
         MESSAGE: \"{text}\"\n\n\
         CONVERSATION CONTEXT:\n{context}\n\n\
         PATTERN MATCHING FOUND THESE CANDIDATES:\n{candidate_json}\n\n\
         Determine which belong to the scammer: accounts, UPI IDs, phone numbers, links, or emails \
         they want money or contact routed to. Include any number used with \"transfer to\", \
         \"send to\", or \"pay to\". Ignore values only mentioned as the victim's own with no \
         transfer request. Also recover obvious details the patterns missed. When unsure, include.\n\n\
         Return ONLY valid JSON with exactly these keys:\n\
         {{\"bankAccounts\": [], \"upiIds\": [], \"phoneNumbers\": [], \"phishingLinks\": [], \"emailAddresses\": []}}"
    )
}

/// Parses the model reply, tolerating markdown code fences.
fn parse_model_json(raw: &str) -> Result<Value, LlmError> {
    let mut body = raw.trim();
    if let Some(stripped) = body.strip_prefix("```") {
        let stripped = stripped.strip_prefix("json").unwrap_or(stripped);
        body = stripped.split("```").next().unwrap_or(stripped).trim();
    }
    serde_json::from_str(body).map_err(|e| LlmError::parse(format!("model JSON: {e}")))
}
