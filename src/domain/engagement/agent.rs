//! Victim-persona reply generation.
//!
//! Builds a phase- and tone-aware persona prompt, asks the resilient client
//! for a reply, and degrades to a per-phase template table when every
//! provider attempt fails. Replies never fail outright for provider
//! reasons: the engagement must keep moving.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::session::{Sender, Session};
use crate::ports::{ChatRequest, ChatRole, LlmCaller};

use super::phase::{EngagementPhase, Tone};

/// Most recent turns included in the persona prompt.
const HISTORY_WINDOW: usize = 6;

/// Canned questions per phase, used when the model is unreachable.
/// Ids are stable so a session never repeats one.
const TRUST_TEMPLATES: &[(&str, &str)] = &[
    ("trust-1", "Oh wow, really? How do I claim this?"),
    ("trust-2", "That sounds great! What do I need to do next?"),
    ("trust-3", "This is amazing news! Can you tell me more about it?"),
];

const PROBING_TEMPLATES: &[(&str, &str)] = &[
    ("probe-1", "I tried but the link doesn't open on my phone. Can you help me directly?"),
    ("probe-2", "Maybe it's easier if I just call you? What's your number?"),
    ("probe-3", "Can I pay the fee directly instead? What's your payment ID?"),
];

const EXTRACTION_TEMPLATES: &[(&str, &str)] = &[
    ("extract-1", "Just give me your account details and I'll transfer right away."),
    ("extract-2", "Send me your UPI ID, I'm ready to pay now."),
    ("extract-3", "I have the money ready. Where exactly do I send it?"),
];

/// A generated reply, with the fallback template id when one was used.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    /// Set when the reply came from the template table rather than the model.
    pub template_id: Option<String>,
}

/// Generates the honeypot side of the conversation.
pub struct ConversationalAgent {
    caller: Arc<dyn LlmCaller>,
    /// Scammer turns spent in the trust-building phase.
    trust_turns: usize,
}

impl ConversationalAgent {
    pub fn new(caller: Arc<dyn LlmCaller>, trust_turns: usize) -> Self {
        Self { caller, trust_turns }
    }

    /// Produces the next persona reply for an inbound message.
    ///
    /// Infallible by contract: provider exhaustion falls back to an unused
    /// phase template (or the last template when all are spent).
    pub async fn reply(&self, session: &Session, inbound: &str) -> AgentReply {
        let phase = EngagementPhase::derive(
            session.scammer_turns(),
            session.intelligence().distinct_actionable_categories(),
            self.trust_turns,
        );
        let tone = Tone::for_threat(session.threat());

        let request = ChatRequest::new()
            .with_system_prompt(persona_prompt(session, phase, tone))
            .with_message(ChatRole::User, inbound.to_string())
            .with_max_tokens(60)
            .with_temperature(0.8);

        match self.caller.call(request).await {
            Ok(response) => {
                let text = trim_reply(&response.content);
                if text.is_empty() {
                    warn!(phase = %phase, "model returned an empty reply, using fallback");
                    self.fallback(session, phase)
                } else {
                    debug!(phase = %phase, provider = %response.provider, "generated persona reply");
                    AgentReply {
                        text,
                        template_id: None,
                    }
                }
            }
            Err(err) => {
                warn!(phase = %phase, error = %err, "provider exhausted, using fallback reply");
                self.fallback(session, phase)
            }
        }
    }

    /// Picks the first template of the phase the session has not used yet.
    fn fallback(&self, session: &Session, phase: EngagementPhase) -> AgentReply {
        let table = match phase {
            EngagementPhase::TrustBuilding => TRUST_TEMPLATES,
            EngagementPhase::Probing => PROBING_TEMPLATES,
            EngagementPhase::Extraction => EXTRACTION_TEMPLATES,
        };
        let (id, text) = table
            .iter()
            .find(|(id, _)| !session.has_used_template(id))
            .unwrap_or(&table[table.len() - 1]);
        AgentReply {
            text: (*text).to_string(),
            template_id: Some((*id).to_string()),
        }
    }
}

fn persona_prompt(session: &Session, phase: EngagementPhase, tone: Tone) -> String {
    let history = session
        .conversation_history()
        .iter()
        .rev()
        .take(HISTORY_WINDOW)
        .rev()
        .map(|t| {
            let speaker = match t.sender {
                Sender::Scammer => "them",
                Sender::Honeypot => "you",
            };
            format!("{}: {}", speaker, t.text)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are playing a NAIVE PERSON who received a scam message over {channel} and believes it is real. \
         Your goal is to keep the conversation going so the other party reveals their bank account, \
         UPI ID, or phone number.\n\n\
         {tone_guidance}\n\
         CURRENT APPROACH: {phase_guidance}\n\n\
         CONVERSATION SO FAR:\n{history}\n\n\
         RULES:\n\
         - {language} only, sound like a real person\n\
         - Never repeat a question you already asked\n\
         - Never be suspicious or cautious\n\
         - Reply in 1-2 short sentences, nothing else",
        channel = session.metadata().channel,
        language = session.metadata().language,
        tone_guidance = tone.guidance(),
        phase_guidance = phase.guidance(),
        history = if history.is_empty() {
            "(first message)".to_string()
        } else {
            history
        },
    )
}

/// Strips whitespace and wrapping quotes from model output.
fn trim_reply(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}
