//! Probabilistic truth values.
//!
//! Every atom carries a [`TruthValue`]: a (strength, confidence) pair in
//! `[0,1] × [0,1]`. Strength expresses how true the assertion is; confidence
//! expresses how much evidence backs that strength. The inference strategies
//! combine truth values with the operators defined here — the store itself
//! never touches them.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// An immutable (strength, confidence) pair expressing probabilistic belief.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthValue {
    /// How true the assertion is, in `[0.0, 1.0]`.
    pub strength: f32,
    /// How much evidence backs the strength, in `[0.0, 1.0]`.
    pub confidence: f32,
}

impl TruthValue {
    /// Full-strength, full-confidence truth. Used as the default for atoms
    /// asserted without an explicit truth value.
    pub const CERTAIN: TruthValue = TruthValue {
        strength: 1.0,
        confidence: 1.0,
    };

    /// Create a validated truth value.
    ///
    /// Fails with [`StoreError::InvalidTruthValue`] if either component falls
    /// outside `[0.0, 1.0]` or is not finite.
    pub fn new(strength: f32, confidence: f32) -> Result<Self, StoreError> {
        let in_range = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_range(strength) || !in_range(confidence) {
            return Err(StoreError::InvalidTruthValue {
                strength,
                confidence,
            });
        }
        Ok(Self {
            strength,
            confidence,
        })
    }

    /// Conjunction: the truth of "both assertions hold".
    ///
    /// Minimum on both components — the weakest conjunct limits the whole.
    pub fn conjunction(&self, other: &TruthValue) -> TruthValue {
        TruthValue {
            strength: self.strength.min(other.strength),
            confidence: self.confidence.min(other.confidence),
        }
    }

    /// Scale confidence by a factor (e.g. a rule's reliability), clamped to `[0,1]`.
    pub fn scale(&self, factor: f32) -> TruthValue {
        TruthValue {
            strength: self.strength,
            confidence: (self.confidence * factor).clamp(0.0, 1.0),
        }
    }

    /// Revision: merge two independent estimates of the same assertion.
    ///
    /// Strength is averaged weighted by confidence; confidence takes the
    /// maximum (the better-evidenced estimate dominates, never degrades).
    pub fn revision(&self, other: &TruthValue) -> TruthValue {
        let total = self.confidence + other.confidence;
        let strength = if total > 0.0 {
            (self.strength * self.confidence + other.strength * other.confidence) / total
        } else {
            (self.strength + other.strength) / 2.0
        };
        TruthValue {
            strength,
            confidence: self.confidence.max(other.confidence),
        }
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::CERTAIN
    }
}

impl std::fmt::Display for TruthValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{:.2}, {:.2}>", self.strength, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_values_accepted() {
        assert!(TruthValue::new(0.0, 0.0).is_ok());
        assert!(TruthValue::new(1.0, 1.0).is_ok());
        assert!(TruthValue::new(0.5, 0.7).is_ok());
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(TruthValue::new(1.1, 0.5).is_err());
        assert!(TruthValue::new(0.5, -0.1).is_err());
        assert!(TruthValue::new(f32::NAN, 0.5).is_err());
        assert!(TruthValue::new(0.5, f32::INFINITY).is_err());
    }

    #[test]
    fn conjunction_takes_minimum() {
        let a = TruthValue::new(0.9, 0.8).unwrap();
        let b = TruthValue::new(0.6, 0.95).unwrap();
        let c = a.conjunction(&b);
        assert!((c.strength - 0.6).abs() < f32::EPSILON);
        assert!((c.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn scale_multiplies_confidence_only() {
        let t = TruthValue::new(0.9, 0.8).unwrap();
        let s = t.scale(0.5);
        assert!((s.strength - 0.9).abs() < f32::EPSILON);
        assert!((s.confidence - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn scale_clamps() {
        let t = TruthValue::new(0.9, 0.8).unwrap();
        assert!((t.scale(10.0).confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn revision_weights_by_confidence() {
        let strong = TruthValue::new(1.0, 0.9).unwrap();
        let weak = TruthValue::new(0.0, 0.1).unwrap();
        let merged = strong.revision(&weak);
        assert!(merged.strength > 0.85, "strength = {}", merged.strength);
        assert!((merged.confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn revision_of_zero_confidence_pair_averages() {
        let a = TruthValue::new(0.2, 0.0).unwrap();
        let b = TruthValue::new(0.8, 0.0).unwrap();
        let merged = a.revision(&b);
        assert!((merged.strength - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn display_format() {
        let t = TruthValue::new(0.95, 0.9).unwrap();
        assert_eq!(t.to_string(), "<0.95, 0.90>");
    }
}
