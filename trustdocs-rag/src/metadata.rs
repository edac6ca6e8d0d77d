//! Lexical risk signals found in document text.
//!
//! Each flag is a case-insensitive, word-bounded presence test over a fixed
//! term list. The patterns live in one declarative table, so adding a flag
//! means adding a [`RiskFlag`] variant and a table row.
//!
//! Patterns are compiled by the `regex` crate, which guarantees linear-time
//! matching regardless of input.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A risk signal that can be detected in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskFlag {
    /// Deadlines, due dates, expirations.
    DateMentions,
    /// Penalties, fines, fees, charges.
    Penalties,
    /// Cancellation, termination, refunds.
    Cancellation,
    /// Automatic renewal clauses.
    AutoRenewal,
    /// Consent, waivers, liability, arbitration.
    LegalTerms,
}

/// How prominently a detected flag should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
}

impl RiskFlag {
    /// Every flag, in presentation order.
    pub const ALL: [RiskFlag; 5] = [
        RiskFlag::DateMentions,
        RiskFlag::Penalties,
        RiskFlag::Cancellation,
        RiskFlag::AutoRenewal,
        RiskFlag::LegalTerms,
    ];

    /// JSON field name of the flag in [`RiskMetadata`].
    pub fn field_name(self) -> &'static str {
        match self {
            RiskFlag::DateMentions => "hasDateMentions",
            RiskFlag::Penalties => "hasPenalties",
            RiskFlag::Cancellation => "hasCancellation",
            RiskFlag::AutoRenewal => "hasAutoRenewal",
            RiskFlag::LegalTerms => "hasLegalTerms",
        }
    }

    /// Human-readable description shown next to a detected flag.
    pub fn description(self) -> &'static str {
        match self {
            RiskFlag::DateMentions => "Contains important dates or deadlines",
            RiskFlag::Penalties => "Contains fees or penalties",
            RiskFlag::Cancellation => "Contains cancellation terms",
            RiskFlag::AutoRenewal => "Contains auto-renewal clause",
            RiskFlag::LegalTerms => "Contains legal terms",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            RiskFlag::DateMentions | RiskFlag::Penalties | RiskFlag::AutoRenewal => {
                Severity::Warning
            }
            RiskFlag::Cancellation | RiskFlag::LegalTerms => Severity::Info,
        }
    }

    fn pattern(self) -> &'static Regex {
        // RISK_PATTERNS is built from RiskFlag::ALL, so every flag has a row.
        &RISK_PATTERNS[self as usize].1
    }
}

static RISK_PATTERNS: LazyLock<Vec<(RiskFlag, Regex)>> = LazyLock::new(|| {
    let table: [(RiskFlag, &str); 5] = [
        (RiskFlag::DateMentions, r"(?i)\b(deadline|due date|expires|expiration|effective date)\b"),
        (RiskFlag::Penalties, r"(?i)\b(penalty|penalties|fine|fines|fee|fees|charge)\b"),
        (RiskFlag::Cancellation, r"(?i)\b(cancel|cancellation|terminate|termination|refund)\b"),
        (
            RiskFlag::AutoRenewal,
            r"(?i)\b(auto.?renew|automatic.?renewal|automatically.?renew)\b",
        ),
        (
            RiskFlag::LegalTerms,
            r"(?i)\b(agree|consent|waive|liability|indemnify|arbitration)\b",
        ),
    ];
    table
        .into_iter()
        .map(|(flag, pattern)| {
            (flag, Regex::new(pattern).expect("unreachable error: invalid risk pattern"))
        })
        .collect()
});

/// Risk flags derived from a document's text. Any subset may be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetadata {
    pub has_date_mentions: bool,
    pub has_penalties: bool,
    pub has_cancellation: bool,
    pub has_auto_renewal: bool,
    pub has_legal_terms: bool,
}

/// A detected flag with its description, as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDescription {
    pub flag: RiskFlag,
    pub field: String,
    pub description: String,
    pub severity: Severity,
}

impl RiskMetadata {
    /// Scan `text` for every risk flag. Pure, total and deterministic.
    pub fn extract(text: &str) -> Self {
        let mut metadata = Self::default();
        for (flag, pattern) in RISK_PATTERNS.iter() {
            metadata.set(*flag, pattern.is_match(text));
        }
        metadata
    }

    /// Whether `flag` is set.
    pub fn get(&self, flag: RiskFlag) -> bool {
        match flag {
            RiskFlag::DateMentions => self.has_date_mentions,
            RiskFlag::Penalties => self.has_penalties,
            RiskFlag::Cancellation => self.has_cancellation,
            RiskFlag::AutoRenewal => self.has_auto_renewal,
            RiskFlag::LegalTerms => self.has_legal_terms,
        }
    }

    fn set(&mut self, flag: RiskFlag, value: bool) {
        let slot = match flag {
            RiskFlag::DateMentions => &mut self.has_date_mentions,
            RiskFlag::Penalties => &mut self.has_penalties,
            RiskFlag::Cancellation => &mut self.has_cancellation,
            RiskFlag::AutoRenewal => &mut self.has_auto_renewal,
            RiskFlag::LegalTerms => &mut self.has_legal_terms,
        };
        *slot = value;
    }

    /// Descriptions of the flags that are set, in [`RiskFlag::ALL`] order.
    pub fn flags(&self) -> Vec<FlagDescription> {
        RiskFlag::ALL
            .into_iter()
            .filter(|flag| self.get(*flag))
            .map(|flag| FlagDescription {
                flag,
                field: flag.field_name().to_string(),
                description: flag.description().to_string(),
                severity: flag.severity(),
            })
            .collect()
    }
}

/// Test a single flag against `text`.
pub fn detect(flag: RiskFlag, text: &str) -> bool {
    flag.pattern().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_follow_flag_order() {
        assert_eq!(RISK_PATTERNS.len(), RiskFlag::ALL.len());
        for (idx, flag) in RiskFlag::ALL.into_iter().enumerate() {
            assert_eq!(RISK_PATTERNS[idx].0, flag);
        }
    }

    #[test]
    fn fee_and_expiration_sentence() {
        let metadata = RiskMetadata::extract("This fee must be paid by the expiration date.");
        assert_eq!(metadata, RiskMetadata {
            has_date_mentions: true,
            has_penalties: true,
            has_cancellation: false,
            has_auto_renewal: false,
            has_legal_terms: false,
        });
    }

    #[test]
    fn matching_is_case_insensitive() {
        let metadata = RiskMetadata::extract("AUTOMATIC RENEWAL applies. You may CANCEL anytime.");
        assert!(metadata.has_auto_renewal);
        assert!(metadata.has_cancellation);
    }

    #[test]
    fn terms_must_be_whole_words() {
        // "refined" contains "fine", "agreeable" contains "agree".
        let metadata = RiskMetadata::extract("A refined and agreeable text.");
        assert_eq!(metadata, RiskMetadata::default());
    }

    #[test]
    fn auto_renew_variants() {
        for text in ["auto-renew", "autorenew", "Auto renew", "automatically renew"] {
            assert!(detect(RiskFlag::AutoRenewal, text), "{text}");
        }
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "You agree to arbitration. Termination fees apply after the deadline.";
        assert_eq!(RiskMetadata::extract(text), RiskMetadata::extract(text));
        let all = RiskMetadata::extract(text);
        assert!(all.has_legal_terms && all.has_cancellation && all.has_penalties);
        assert!(all.has_date_mentions);
    }

    #[test]
    fn flags_describe_only_set_flags() {
        let metadata =
            RiskMetadata { has_penalties: true, has_legal_terms: true, ..Default::default() };
        let flags = metadata.flags();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].field, "hasPenalties");
        assert_eq!(flags[0].severity, Severity::Warning);
        assert_eq!(flags[1].flag, RiskFlag::LegalTerms);
        assert_eq!(flags[1].severity, Severity::Info);
    }
}
