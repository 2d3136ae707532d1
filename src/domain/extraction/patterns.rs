//! Deterministic pattern pass over inbound messages.
//!
//! Fast first stage of the hybrid extractor: fixed per-category rules
//! compiled once. The pass over-matches by design; the contextual stage may
//! narrow actionable categories, and the rule boost may re-tag, but nothing
//! here is ever removed from a session once merged.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::classify::SHORTENER_DOMAINS;
use crate::domain::session::{IntelCategory, Intelligence};

/// 16-digit card form with optional group separators.
static CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").expect("card pattern"));

/// 11-18 digit account-number runs (excludes 10-digit phones by length).
static ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{11,18}\b").expect("account pattern"));

/// Country-code-prefixed phone numbers.
static INTL_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+\d{1,3}[-\s]?\d{10}\b").expect("intl phone pattern"));

/// Bare national-format mobile numbers.
static NATIONAL_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[6-9]\d{9}\b").expect("national phone pattern"));

/// Scheme-qualified URLs.
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bhttps?://[^\s<>\x22']+").expect("url pattern"));

/// RFC-light email tokens.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}\b")
        .expect("email pattern")
});

/// UPI-style `localpart@handle` tokens. Overlaps with emails; resolved by
/// extracting emails first and skipping their spans.
static UPI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._-]+@[A-Za-z][A-Za-z0-9]*\b").expect("upi pattern"));

/// Curated urgency, threat, and prize language.
static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(urgent|immediately|now|hurry|asap|verify|blocked|suspended|locked|prize|lottery|won|winner|claim|legal action|police|arrest|court|otp|pin|password|cvv)\b",
    )
    .expect("keyword pattern")
});

/// Wording that marks an adjacent digit run as an account number.
static ACCOUNT_CONTEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(account\s*(number|no\.?)|a/c|acc\s*no\.?)\b").expect("context pattern")
});

/// Short digit runs the boost may re-tag when account wording is adjacent.
static SHORT_DIGIT_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{9,10}\b").expect("digit run pattern"));

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Runs the deterministic first pass over one message.
pub fn pattern_pass(text: &str) -> Intelligence {
    let mut intel = Intelligence::new();

    // Phones first: their digit strings filter the bank-account rules.
    let mut phone_digits: Vec<String> = Vec::new();
    let mut phone_spans: Vec<(usize, usize)> = Vec::new();
    for m in INTL_PHONE_RE.find_iter(text) {
        phone_spans.push((m.start(), m.end()));
        phone_digits.push(digits_only(m.as_str()));
        intel.insert(IntelCategory::PhoneNumbers, m.as_str());
    }
    for m in NATIONAL_PHONE_RE.find_iter(text) {
        // Skip the national tail of an already-matched +CC number.
        let inside_intl = phone_spans
            .iter()
            .any(|(start, end)| m.start() >= *start && m.end() <= *end);
        if !inside_intl {
            phone_digits.push(digits_only(m.as_str()));
            intel.insert(IntelCategory::PhoneNumbers, m.as_str());
        }
    }

    for m in CARD_RE.find_iter(text).chain(ACCOUNT_RE.find_iter(text)) {
        let digits = digits_only(m.as_str());
        // A bare 10-digit run is a phone, not an account.
        if digits.len() == 10 || phone_digits.contains(&digits) {
            continue;
        }
        intel.insert(IntelCategory::BankAccounts, m.as_str());
    }

    // Emails before UPI so `user@example.com` is not double-counted.
    let mut email_spans: Vec<(usize, usize)> = Vec::new();
    for m in EMAIL_RE.find_iter(text) {
        email_spans.push((m.start(), m.end()));
        intel.insert(IntelCategory::EmailAddresses, m.as_str());
    }
    for m in UPI_RE.find_iter(text) {
        let overlaps_email = email_spans
            .iter()
            .any(|(start, end)| m.start() < *end && m.end() > *start);
        if !overlaps_email {
            intel.insert(IntelCategory::UpiIds, m.as_str());
        }
    }

    for m in URL_RE.find_iter(text) {
        intel.insert(IntelCategory::PhishingLinks, m.as_str());
    }
    // Known shorteners often arrive without a scheme.
    let lower = text.to_lowercase();
    for token in lower.split_whitespace() {
        let token = token.trim_matches(|c: char| c == ',' || c == '.' || c == ')' || c == '(');
        if !token.starts_with("http")
            && SHORTENER_DOMAINS
                .iter()
                .any(|d| token.starts_with(d) && token.len() > d.len())
        {
            intel.insert(IntelCategory::PhishingLinks, token);
        }
    }

    for m in KEYWORD_RE.find_iter(text) {
        intel.insert(IntelCategory::SuspiciousKeywords, m.as_str());
    }

    intel
}

/// Co-occurrence boost: account wording next to a short digit run re-tags
/// it into bank accounts. Only adds, never removes confirmed hits.
pub fn apply_boosts(text: &str, intel: &mut Intelligence) {
    if !ACCOUNT_CONTEXT_RE.is_match(text) {
        return;
    }
    for m in SHORT_DIGIT_RUN_RE.find_iter(text) {
        intel.insert(IntelCategory::BankAccounts, m.as_str());
    }
}

/// True if any actionable category (beyond keywords) matched.
pub fn has_actionable(intel: &Intelligence) -> bool {
    intel.distinct_actionable_categories() > 0
}
