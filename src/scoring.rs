//! Roster quality metrics.
//!
//! Measures how close each agent came to its personally best achievable
//! outcome, always against the **original, unscaled** preference matrix:
//! scaling shapes the optimizer, never the report.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Achieved | Sum of original preferences over assigned slots |
//! | Max achievable | Sum of the agent's top-k available preferences |
//! | Ratio | achieved / max achievable (≤ 1; < 1 is normal) |
//!
//! A global optimum rarely equals every individual optimum, so ratios below
//! 1 are expected. What is never acceptable is an assigned pair missing from
//! the matrix: that is an engine defect and surfaces as an error instead of
//! a `NaN` ratio.

use serde::{Deserialize, Serialize};

use crate::models::{PrefMatrix, Roster};
use crate::RosterError;

/// Per-agent quality metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentScore {
    /// Agent label.
    pub agent: String,
    /// Sum of original preferences over assigned slots.
    pub achieved: f64,
    /// Best total this agent could have achieved for the same slot count.
    pub max_achievable: f64,
    /// `achieved / max_achievable`, 1.0 when nothing was assignable.
    pub ratio: f64,
    /// Realized occupancy count.
    pub assigned: usize,
}

/// Quality metrics for a finalized roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterScore {
    /// One entry per agent, in agent-index order.
    pub agents: Vec<AgentScore>,
    /// Occupant count per slot, in slot-index order.
    pub slot_occupancy: Vec<usize>,
}

impl RosterScore {
    /// Computes metrics from a roster and the pristine preference matrix.
    ///
    /// Mutates neither input. Fails with
    /// [`RosterError::AvailabilityViolation`] if the roster pairs an agent
    /// with a slot missing from the matrix.
    pub fn calculate(roster: &Roster, prefs: &PrefMatrix) -> Result<Self, RosterError> {
        if roster.num_agents() != prefs.num_agents() || roster.num_slots() != prefs.num_slots() {
            return Err(RosterError::Shape(format!(
                "roster is {}x{} but matrix is {}x{}",
                roster.num_agents(),
                roster.num_slots(),
                prefs.num_agents(),
                prefs.num_slots()
            )));
        }

        let mut achieved = vec![0.0f64; prefs.num_agents()];
        for (slot, agents) in roster.iter() {
            for &agent in agents {
                match prefs.get(agent, slot) {
                    Some(score) => achieved[agent] += score,
                    None => {
                        return Err(RosterError::AvailabilityViolation {
                            agent: prefs.agent_label(agent).to_string(),
                            slot: prefs.slot_label(slot).to_string(),
                        })
                    }
                }
            }
        }

        let occupancy = roster.occupancy_per_agent();
        let agents = (0..prefs.num_agents())
            .map(|agent| {
                let assigned = occupancy[agent];
                let max_achievable: f64 =
                    prefs.sorted_prefs(agent).iter().take(assigned).sum();
                // An all-zero top-k (or zero slots) leaves nothing to lose.
                let ratio = if max_achievable > 0.0 {
                    achieved[agent] / max_achievable
                } else {
                    1.0
                };
                AgentScore {
                    agent: prefs.agent_label(agent).to_string(),
                    achieved: achieved[agent],
                    max_achievable,
                    ratio,
                    assigned,
                }
            })
            .collect();

        Ok(Self {
            agents,
            slot_occupancy: roster.occupancy_per_slot(),
        })
    }

    /// Mean achieved/max ratio across agents (1.0 for an empty roster).
    pub fn mean_ratio(&self) -> f64 {
        if self.agents.is_empty() {
            return 1.0;
        }
        self.agents.iter().map(|a| a.ratio).sum::<f64>() / self.agents.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{assign, MatchConfig};

    fn matrix(rows: Vec<Vec<Option<f64>>>) -> PrefMatrix {
        let agents = (0..rows.len()).map(|i| format!("a{i}")).collect();
        let slots = (0..rows[0].len()).map(|i| format!("s{i}")).collect();
        PrefMatrix::from_rows(agents, slots, rows).unwrap()
    }

    #[test]
    fn test_perfect_assignment_scores_one() {
        let prefs = matrix(vec![
            vec![Some(4.0), Some(1.0)],
            vec![Some(1.0), Some(4.0)],
        ]);
        let roster = assign(&prefs, &MatchConfig::new(1, 1)).unwrap();
        let score = RosterScore::calculate(&roster, &prefs).unwrap();

        for agent in &score.agents {
            assert!((agent.ratio - 1.0).abs() < 1e-10);
            assert_eq!(agent.assigned, 1);
        }
        assert_eq!(score.slot_occupancy, vec![1, 1]);
        assert!((score.mean_ratio() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_ratio_below_one_when_contended() {
        // Both agents want s0; one is displaced to s1 and scores 1/4.
        let prefs = matrix(vec![
            vec![Some(4.0), Some(1.0)],
            vec![Some(4.0), Some(1.0)],
        ]);
        let roster = assign(&prefs, &MatchConfig::new(1, 1)).unwrap();
        let score = RosterScore::calculate(&roster, &prefs).unwrap();

        let mut ratios: Vec<f64> = score.agents.iter().map(|a| a.ratio).collect();
        ratios.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((ratios[0] - 0.25).abs() < 1e-10);
        assert!((ratios[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_scoring_ignores_scaling() {
        // Metrics use the matrix they are handed; callers pass the unscaled
        // one, and achieved sums original scores, not scaled ones.
        let prefs = matrix(vec![vec![Some(2.0), Some(1.0)]]);
        let roster = assign(&prefs, &MatchConfig::new(1, 1)).unwrap();
        let score = RosterScore::calculate(&roster, &prefs).unwrap();

        assert!((score.agents[0].achieved - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_ratio_never_exceeds_one() {
        let prefs = matrix(vec![
            vec![Some(4.0), Some(3.0), Some(2.0), Some(1.0)],
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            vec![Some(3.0), Some(1.0), Some(4.0), Some(2.0)],
        ]);
        let roster = assign(&prefs, &MatchConfig::new(2, 2).with_noise()).unwrap();
        let score = RosterScore::calculate(&roster, &prefs).unwrap();

        for agent in &score.agents {
            assert!(agent.ratio <= 1.0 + 1e-9);
            assert!(!agent.ratio.is_nan());
            assert!(agent.achieved <= agent.max_achievable + 1e-9);
        }
    }

    #[test]
    fn test_availability_defect_surfaces() {
        let prefs = matrix(vec![vec![Some(1.0), None]]);
        // Corrupt roster claiming a0 holds the unavailable s1.
        let corrupt: Roster = serde_json::from_str(
            r#"{"agent_labels":["a0"],"slot_labels":["s0","s1"],"slot_agents":[[],[0]]}"#,
        )
        .unwrap();

        let err = RosterScore::calculate(&corrupt, &prefs).unwrap_err();
        assert!(matches!(err, RosterError::AvailabilityViolation { .. }));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let prefs = matrix(vec![vec![Some(1.0)]]);
        let other = matrix(vec![vec![Some(1.0), Some(2.0)]]);
        let roster = assign(&other, &MatchConfig::new(1, 1)).unwrap();

        let err = RosterScore::calculate(&roster, &prefs).unwrap_err();
        assert!(matches!(err, RosterError::Shape(_)));
    }

    #[test]
    fn test_serde_round_trip() {
        let prefs = matrix(vec![vec![Some(3.0)]]);
        let roster = assign(&prefs, &MatchConfig::new(1, 1)).unwrap();
        let score = RosterScore::calculate(&roster, &prefs).unwrap();

        let json = serde_json::to_string(&score).unwrap();
        let back: RosterScore = serde_json::from_str(&json).unwrap();
        assert_eq!(back.agents.len(), 1);
        assert!((back.agents[0].ratio - 1.0).abs() < 1e-10);
    }
}
