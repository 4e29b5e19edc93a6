//! Preference matrix model.
//!
//! A dense agent × slot table of desirability scores. A missing entry means
//! the agent is unavailable for that slot; a defined entry is a finite,
//! non-negative score where higher means more desirable. Parallel label
//! lists identify agents and slots for reporting — the engine itself works
//! on stable indices.

use serde::{Deserialize, Serialize};

/// Agent × slot preference scores, with `None` meaning "unavailable".
///
/// Immutable once constructed; transforms (scaling) return a new matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefMatrix {
    pub(crate) agent_labels: Vec<String>,
    pub(crate) slot_labels: Vec<String>,
    /// Row-major entries, `agent_labels.len() * slot_labels.len()` long.
    pub(crate) entries: Vec<Option<f64>>,
}

impl PrefMatrix {
    /// Builds a matrix from per-agent preference rows.
    ///
    /// Fails if row count or row lengths disagree with the label lists, or
    /// if any defined entry is negative or non-finite.
    pub fn from_rows(
        agent_labels: Vec<String>,
        slot_labels: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, crate::RosterError> {
        if rows.len() != agent_labels.len() {
            return Err(crate::RosterError::Shape(format!(
                "{} preference rows for {} agents",
                rows.len(),
                agent_labels.len()
            )));
        }

        let mut entries = Vec::with_capacity(agent_labels.len() * slot_labels.len());
        for (agent_idx, row) in rows.into_iter().enumerate() {
            if row.len() != slot_labels.len() {
                return Err(crate::RosterError::Shape(format!(
                    "agent `{}` has {} preference entries for {} slots",
                    agent_labels[agent_idx],
                    row.len(),
                    slot_labels.len()
                )));
            }
            for (slot_idx, entry) in row.iter().enumerate() {
                if let Some(score) = entry {
                    if !score.is_finite() || *score < 0.0 {
                        return Err(crate::RosterError::Shape(format!(
                            "preference for agent `{}`, slot `{}` must be finite and non-negative, got {score}",
                            agent_labels[agent_idx], slot_labels[slot_idx]
                        )));
                    }
                }
            }
            entries.extend(row);
        }

        Ok(Self {
            agent_labels,
            slot_labels,
            entries,
        })
    }

    /// Number of agents (rows).
    #[inline]
    pub fn num_agents(&self) -> usize {
        self.agent_labels.len()
    }

    /// Number of slots (columns).
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.slot_labels.len()
    }

    /// The preference score for an (agent, slot) pair, `None` if unavailable.
    #[inline]
    pub fn get(&self, agent: usize, slot: usize) -> Option<f64> {
        self.entries[agent * self.num_slots() + slot]
    }

    /// Whether the agent is available for the slot.
    #[inline]
    pub fn is_available(&self, agent: usize, slot: usize) -> bool {
        self.get(agent, slot).is_some()
    }

    /// How many slots an agent is available for.
    pub fn available_count(&self, agent: usize) -> usize {
        (0..self.num_slots())
            .filter(|&slot| self.is_available(agent, slot))
            .count()
    }

    /// All defined preferences of one agent, highest first.
    pub fn sorted_prefs(&self, agent: usize) -> Vec<f64> {
        let mut prefs: Vec<f64> = (0..self.num_slots())
            .filter_map(|slot| self.get(agent, slot))
            .collect();
        prefs.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        prefs
    }

    /// Population standard deviation over all defined entries.
    ///
    /// Returns 0.0 for an empty or constant matrix. Used to size the
    /// engine's tie-breaking noise relative to the score scale.
    pub fn defined_std_dev(&self) -> f64 {
        let defined: Vec<f64> = self.entries.iter().filter_map(|e| *e).collect();
        if defined.is_empty() {
            return 0.0;
        }
        let mean = defined.iter().sum::<f64>() / defined.len() as f64;
        let var = defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / defined.len() as f64;
        var.sqrt()
    }

    /// Agent label by index.
    pub fn agent_label(&self, agent: usize) -> &str {
        &self.agent_labels[agent]
    }

    /// Slot label by index.
    pub fn slot_label(&self, slot: usize) -> &str {
        &self.slot_labels[slot]
    }

    /// All agent labels, in index order.
    pub fn agent_labels(&self) -> &[String] {
        &self.agent_labels
    }

    /// All slot labels, in index order.
    pub fn slot_labels(&self) -> &[String] {
        &self.slot_labels
    }
}
