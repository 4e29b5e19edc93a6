//! Preference scaling by slot-label pattern.
//!
//! A scale rule pairs a regex with a multiplicative factor; every slot whose
//! label matches the pattern has all agent preferences for it multiplied by
//! the factor. Typical use: boosting chronically under-picked slots (late
//! evenings, Fridays) before matching, so the optimizer spreads demand.
//!
//! Scaling affects matching only — scoring always runs against the unscaled
//! matrix.

use regex::Regex;

use crate::models::PrefMatrix;
use crate::RosterError;

/// A slot-label pattern with its multiplicative factor.
#[derive(Debug, Clone)]
pub struct ScaleRule {
    pattern: Regex,
    factor: f64,
}

impl ScaleRule {
    /// Compiles a rule from pattern text.
    ///
    /// The pattern is matched unanchored against each slot label.
    pub fn new(pattern: &str, factor: f64) -> Result<Self, RosterError> {
        let pattern = Regex::new(pattern).map_err(|source| RosterError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern, factor })
    }

    /// Whether this rule applies to a slot label.
    pub fn matches(&self, label: &str) -> bool {
        self.pattern.is_match(label)
    }

    /// The multiplicative factor.
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

/// Per-slot combined factor for a rule set.
///
/// Factors of all matching rules compose multiplicatively; a slot matching
/// no rule keeps factor 1.0.
pub fn slot_factors(slot_labels: &[String], rules: &[ScaleRule]) -> Vec<f64> {
    let mut factors = vec![1.0; slot_labels.len()];
    for rule in rules {
        for (slot, label) in slot_labels.iter().enumerate() {
            if rule.matches(label) {
                factors[slot] *= rule.factor();
            }
        }
    }
    factors
}

/// Applies a rule set to a matrix, returning the scaled copy.
///
/// Unavailable entries stay unavailable; the input matrix is untouched.
pub fn apply_scale(prefs: &PrefMatrix, rules: &[ScaleRule]) -> PrefMatrix {
    let factors = slot_factors(prefs.slot_labels(), rules);
    let num_slots = prefs.num_slots();

    let mut scaled = prefs.clone();
    for (idx, entry) in scaled.entries.iter_mut().enumerate() {
        if let Some(score) = entry {
            *score *= factors[idx % num_slots];
        }
    }
    scaled
}
