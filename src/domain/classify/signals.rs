//! Curated signal tables and per-signal analyses for first-contact triage.
//!
//! Four independent signals are evaluated in fixed order: brand recognition,
//! requested-action risk, urgency classification, and link analysis. Each is
//! a pure function over the message text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Known legitimate brands whose routine messages should not trip detection.
pub const KNOWN_BRANDS: &[&str] = &[
    "pantaloons", "sbi", "hdfc", "icici", "axis bank", "airtel", "jio", "amazon", "flipkart",
    "swiggy", "zomato", "paytm", "phonepe", "makemytrip", "tvs", "yono",
];

/// Official domains and brand shorteners that do not indicate phishing.
pub const SAFE_DOMAINS: &[&str] = &[
    "sbi.co.in", "hdfcbank.com", "icicibank.com", "amazon.in", "airtel.in", "flipkart.com",
    "amzn.to", "tltx.in", "nmc.sg",
];

/// Generic URL shorteners; suspicious when paired with financial asks.
pub const SHORTENER_DOMAINS: &[&str] =
    &["bit.ly", "tinyurl.com", "goo.gl", "t.co", "cutt.ly", "rb.gy", "is.gd"];

/// Credential, payment, and verification demands.
const DANGEROUS_ACTIONS: &[&str] = &[
    "otp", "pin", "cvv", "password", "verify your account", "verify kyc", "update kyc",
    "send money", "transfer", "processing fee", "claim fee", "share your", "enter bank",
    "send rs", "pay rs",
];

/// Requests a legitimate sender routinely makes.
const BENIGN_ACTIONS: &[&str] = &[
    "sale", "off on", "offer", "track your order", "download", "play store", "cast your",
    "vote", "bill is", "pay by", "visit store", "shop at",
];

/// Coercive urgency, distinct from marketing deadlines.
const COERCIVE_PHRASES: &[&str] = &[
    "will be blocked", "account blocked", "suspended", "locked", "legal action", "police",
    "arrest", "court", "immediately", "right now", "or lose access", "last warning",
    "urgent", "within 24 hours",
];

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bhttps?://[^\s<>\x22']+").expect("url pattern"));

/// What kind of action the message demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRisk {
    /// No recognizable request.
    None,
    /// Routine info or marketing request.
    Benign,
    /// Credential, OTP, or payment demand.
    Dangerous,
}

/// Urgency classification of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    #[default]
    Routine,
    Coercive,
}

/// Risk attributed to links in the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRisk {
    /// No link present.
    None,
    /// Allowlisted domain or brand shortener.
    Safe,
    /// Generic shortener or unknown domain.
    Suspicious,
}

/// Signal 1: does the sender/content match a known legitimate brand?
pub fn brand_recognized(text: &str) -> bool {
    let lower = text.to_lowercase();
    KNOWN_BRANDS.iter().any(|brand| lower.contains(brand))
}

/// Signal 2: categorize the requested action by risk.
pub fn action_risk(text: &str) -> ActionRisk {
    let lower = text.to_lowercase();
    if DANGEROUS_ACTIONS.iter().any(|p| lower.contains(p)) {
        ActionRisk::Dangerous
    } else if BENIGN_ACTIONS.iter().any(|p| lower.contains(p)) {
        ActionRisk::Benign
    } else {
        ActionRisk::None
    }
}

/// Signal 3: routine vs coercive urgency.
pub fn threat_level(text: &str) -> ThreatLevel {
    let lower = text.to_lowercase();
    if COERCIVE_PHRASES.iter().any(|p| lower.contains(p)) {
        ThreatLevel::Coercive
    } else {
        ThreatLevel::Routine
    }
}

/// Signal 4: check any URL against the allowlist and shortener list.
pub fn link_risk(text: &str) -> LinkRisk {
    let lower = text.to_lowercase();
    let mut found = false;
    for m in URL_RE.find_iter(&lower) {
        found = true;
        let url = m.as_str();
        if SAFE_DOMAINS.iter().any(|d| url.contains(d)) || url.contains(".gov.in") {
            continue;
        }
        return LinkRisk::Suspicious;
    }
    // Bare shortener links often arrive without a scheme.
    if SHORTENER_DOMAINS.iter().any(|d| lower.contains(d)) {
        return LinkRisk::Suspicious;
    }
    if found {
        LinkRisk::Safe
    } else {
        LinkRisk::None
    }
}
