//! Extracted intelligence aggregate.
//!
//! Each category is a set of strings: insertion order is irrelevant and
//! duplicates collapse case-insensitively where the category allows it.
//! Values are only ever added, never removed: merging is a monotonic union,
//! which makes re-running extraction on an already-processed message a no-op.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Fixed enumerated set of extractable artifact classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntelCategory {
    BankAccounts,
    UpiIds,
    PhoneNumbers,
    PhishingLinks,
    EmailAddresses,
    SuspiciousKeywords,
}

impl IntelCategory {
    /// All categories, in reporting order.
    pub const ALL: [IntelCategory; 6] = [
        IntelCategory::BankAccounts,
        IntelCategory::UpiIds,
        IntelCategory::PhoneNumbers,
        IntelCategory::PhishingLinks,
        IntelCategory::EmailAddresses,
        IntelCategory::SuspiciousKeywords,
    ];

    /// Categories that count toward the end-condition threshold.
    ///
    /// Suspicious keywords signal tone, not actionable artifacts, so they
    /// never count a session toward finalization.
    pub const ACTIONABLE: [IntelCategory; 5] = [
        IntelCategory::BankAccounts,
        IntelCategory::UpiIds,
        IntelCategory::PhoneNumbers,
        IntelCategory::PhishingLinks,
        IntelCategory::EmailAddresses,
    ];

    /// Reporting key for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntelCategory::BankAccounts => "bankAccounts",
            IntelCategory::UpiIds => "upiIds",
            IntelCategory::PhoneNumbers => "phoneNumbers",
            IntelCategory::PhishingLinks => "phishingLinks",
            IntelCategory::EmailAddresses => "emailAddresses",
            IntelCategory::SuspiciousKeywords => "suspiciousKeywords",
        }
    }
}

impl fmt::Display for IntelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accumulated intelligence for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intelligence {
    bank_accounts: BTreeSet<String>,
    upi_ids: BTreeSet<String>,
    phone_numbers: BTreeSet<String>,
    phishing_links: BTreeSet<String>,
    email_addresses: BTreeSet<String>,
    suspicious_keywords: BTreeSet<String>,
}

impl Intelligence {
    /// Creates an empty intelligence aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value into a category, normalizing first.
    ///
    /// Returns true if the value was new. Empty values (after
    /// normalization) are ignored.
    pub fn insert(&mut self, category: IntelCategory, raw: &str) -> bool {
        let value = Self::normalize(category, raw);
        if value.is_empty() {
            return false;
        }
        self.set_mut(category).insert(value)
    }

    /// Unions another aggregate into this one. Idempotent.
    pub fn merge(&mut self, other: &Intelligence) {
        for category in IntelCategory::ALL {
            // Other's values are already normalized; union directly.
            let values: Vec<String> = other.category(category).iter().cloned().collect();
            self.set_mut(category).extend(values);
        }
    }

    /// Returns the value set for a category.
    pub fn category(&self, category: IntelCategory) -> &BTreeSet<String> {
        match category {
            IntelCategory::BankAccounts => &self.bank_accounts,
            IntelCategory::UpiIds => &self.upi_ids,
            IntelCategory::PhoneNumbers => &self.phone_numbers,
            IntelCategory::PhishingLinks => &self.phishing_links,
            IntelCategory::EmailAddresses => &self.email_addresses,
            IntelCategory::SuspiciousKeywords => &self.suspicious_keywords,
        }
    }

    /// Number of actionable categories with at least one value.
    pub fn distinct_actionable_categories(&self) -> usize {
        IntelCategory::ACTIONABLE
            .iter()
            .filter(|c| !self.category(**c).is_empty())
            .count()
    }

    /// Returns true if no category holds any value.
    pub fn is_empty(&self) -> bool {
        IntelCategory::ALL.iter().all(|c| self.category(*c).is_empty())
    }

    /// Total values across all categories.
    pub fn total_items(&self) -> usize {
        IntelCategory::ALL.iter().map(|c| self.category(*c).len()).sum()
    }

    fn set_mut(&mut self, category: IntelCategory) -> &mut BTreeSet<String> {
        match category {
            IntelCategory::BankAccounts => &mut self.bank_accounts,
            IntelCategory::UpiIds => &mut self.upi_ids,
            IntelCategory::PhoneNumbers => &mut self.phone_numbers,
            IntelCategory::PhishingLinks => &mut self.phishing_links,
            IntelCategory::EmailAddresses => &mut self.email_addresses,
            IntelCategory::SuspiciousKeywords => &mut self.suspicious_keywords,
        }
    }

    /// Canonical form used for case-insensitive dedup.
    ///
    /// Digit-bearing categories strip separators; textual categories
    /// lowercase.
    fn normalize(category: IntelCategory, raw: &str) -> String {
        let trimmed = raw.trim();
        match category {
            IntelCategory::BankAccounts | IntelCategory::PhoneNumbers => trimmed
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '-')
                .collect(),
            IntelCategory::UpiIds
            | IntelCategory::EmailAddresses
            | IntelCategory::SuspiciousKeywords => trimmed.to_lowercase(),
            IntelCategory::PhishingLinks => trimmed.trim_end_matches(['.', ',']).to_string(),
        }
    }
}
