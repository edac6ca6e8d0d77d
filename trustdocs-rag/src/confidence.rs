//! Answer-level confidence from per-evidence similarity scores.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::document::Evidence;

/// Mean evidence similarity, rounded to three decimal places.
///
/// Serialized as a fixed three-decimal string (`"0.750"`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Confidence(f64);

impl Confidence {
    /// The rounded value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Arithmetic mean of the evidence scores, `0.000` for no evidence.
pub fn aggregate(evidence: &[Evidence]) -> Confidence {
    if evidence.is_empty() {
        return Confidence(0.0);
    }
    let sum: f64 = evidence.iter().map(|e| f64::from(e.score)).sum();
    let mean = sum / evidence.len() as f64;
    Confidence((mean * 1000.0).round() / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkId;

    fn evidence(score: f32) -> Evidence {
        Evidence { text: String::new(), score, chunk_id: ChunkId(0), rank: 1 }
    }

    #[test]
    fn empty_evidence_is_zero() {
        let confidence = aggregate(&[]);
        assert_eq!(confidence.value(), 0.0);
        assert_eq!(confidence.to_string(), "0.000");
    }

    #[test]
    fn mean_of_scores() {
        let confidence = aggregate(&[evidence(0.6), evidence(0.9)]);
        assert_eq!(confidence.to_string(), "0.750");
        assert!((confidence.value() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn rounds_to_three_decimals() {
        let confidence = aggregate(&[evidence(0.1), evidence(0.2), evidence(0.4)]);
        assert_eq!(confidence.to_string(), "0.233");
    }

    #[test]
    fn serializes_as_formatted_string() {
        let json = serde_json::to_string(&aggregate(&[evidence(0.5)])).unwrap();
        assert_eq!(json, "\"0.500\"");
    }
}
