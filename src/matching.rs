//! Capacitated assignment engine.
//!
//! Matches agents to recurring slots so that total stated preference is
//! maximized while every agent reaches its target occupancy and no slot
//! exceeds its capacity ceiling.
//!
//! # Algorithm
//!
//! Round-based capacity expansion. With target occupancy `R`, the engine
//! runs exactly `R` rounds; each round:
//!
//! 1. Replicates every slot column once per unit of remaining capacity,
//!    turning the capacitated problem into one-to-one bipartite matching.
//! 2. Optionally perturbs non-forbidden entries with seeded noise sized
//!    relative to the matrix's score spread, to break ties impartially.
//! 3. Solves a maximum-weight perfect matching (Kuhn-Munkres).
//! 4. Records each match, then forbids that (agent, slot) cell for all
//!    later rounds. A match landing on a forbidden cell means the agent
//!    ran out of availability: the run fails, naming the agent.
//! 5. Optionally decays every matched slot's column, spreading later
//!    rounds across less popular slots.
//!
//! Rounds are strictly sequential; the engine is single-threaded and, for a
//! fixed seed, deterministic.
//!
//! # Reference
//! Kuhn (1955), "The Hungarian Method for the Assignment Problem"

use ordered_float::OrderedFloat;
use pathfinding::prelude::{kuhn_munkres, Matrix};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::models::{PrefMatrix, Roster};
use crate::RosterError;

/// Internal "forbidden" score: unavailable cells and already-consumed
/// pairings. Unreachably low so an optimal matching only ever selects it
/// when no valid completion exists.
const FORBIDDEN: f64 = -1.0e12;

/// Seed used by [`MatchConfig::with_noise`] when none is given.
pub const DEFAULT_NOISE_SEED: u64 = 42;

/// Noise amplitude as a fraction of the preference standard deviation.
const NOISE_FRACTION: f64 = 1e-3;

/// Engine configuration.
///
/// # Example
/// ```
/// use slot_roster::MatchConfig;
///
/// let config = MatchConfig::new(3, 4).with_decay(0.99).with_noise_seed(7);
/// assert_eq!(config.slots_per_agent(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MatchConfig {
    slots_per_agent: usize,
    capacity_per_slot: usize,
    decay: f64,
    noise_seed: Option<u64>,
}

impl MatchConfig {
    /// Creates a configuration with decay and noise disabled.
    pub fn new(slots_per_agent: usize, capacity_per_slot: usize) -> Self {
        Self {
            slots_per_agent,
            capacity_per_slot,
            decay: 1.0,
            noise_seed: None,
        }
    }

    /// Sets the per-round column decay factor (1.0 = no decay).
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Enables tie-breaking noise with the default seed.
    pub fn with_noise(self) -> Self {
        self.with_noise_seed(DEFAULT_NOISE_SEED)
    }

    /// Enables tie-breaking noise with an explicit seed.
    pub fn with_noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    /// Target occupancy per agent.
    pub fn slots_per_agent(&self) -> usize {
        self.slots_per_agent
    }

    /// Capacity ceiling per slot.
    pub fn capacity_per_slot(&self) -> usize {
        self.capacity_per_slot
    }

    /// The configured decay factor.
    pub fn decay(&self) -> f64 {
        self.decay
    }
}

/// Assigns every agent to exactly `slots_per_agent` slots.
///
/// Fails with [`RosterError::InfeasibleDemand`] when an agent has fewer
/// available slots than its target, and with
/// [`RosterError::InfeasibleCapacity`] when aggregate capacity cannot cover
/// aggregate demand. Never returns a partial roster.
pub fn assign(prefs: &PrefMatrix, config: &MatchConfig) -> Result<Roster, RosterError> {
    let num_agents = prefs.num_agents();
    let num_slots = prefs.num_slots();

    for agent in 0..num_agents {
        let available = prefs.available_count(agent);
        if available < config.slots_per_agent {
            return Err(RosterError::InfeasibleDemand {
                agent: prefs.agent_label(agent).to_string(),
                available,
                required: config.slots_per_agent,
            });
        }
    }

    let capacity = num_slots * config.capacity_per_slot;
    let demand = num_agents * config.slots_per_agent;
    if capacity < demand {
        return Err(RosterError::InfeasibleCapacity { capacity, demand });
    }

    let mut roster = Roster::empty(prefs.agent_labels().to_vec(), prefs.slot_labels().to_vec());
    if num_agents == 0 || config.slots_per_agent == 0 {
        return Ok(roster);
    }

    // Private working copy: missing entries become FORBIDDEN, matched cells
    // join them round by round.
    let mut work: Vec<f64> = (0..num_agents)
        .flat_map(|agent| (0..num_slots).map(move |slot| (agent, slot)))
        .map(|(agent, slot)| prefs.get(agent, slot).unwrap_or(FORBIDDEN))
        .collect();
    let mut remaining = vec![config.capacity_per_slot; num_slots];

    let noise_amp = prefs.defined_std_dev() * NOISE_FRACTION;
    let mut rng = config.noise_seed.map(SmallRng::seed_from_u64);

    for round in 0..config.slots_per_agent {
        // Capacity expansion: one unit per open seat, tagged back to its slot.
        let unit_slot: Vec<usize> = (0..num_slots)
            .flat_map(|slot| std::iter::repeat(slot).take(remaining[slot]))
            .collect();

        let mut values = Vec::with_capacity(num_agents * unit_slot.len());
        for agent in 0..num_agents {
            for &slot in &unit_slot {
                let mut score = work[agent * num_slots + slot];
                if score != FORBIDDEN {
                    if let Some(rng) = rng.as_mut() {
                        score += rng.random_range(-1.0..=1.0) * noise_amp;
                    }
                }
                values.push(OrderedFloat(score));
            }
        }
        let weights = Matrix::from_vec(num_agents, unit_slot.len(), values)
            .map_err(|e| RosterError::Shape(format!("expanded matrix: {e}")))?;

        let (_, matched_units) = kuhn_munkres(&weights);
        debug!(round, units = unit_slot.len(), "solved matching round");

        let mut matched_slots = Vec::with_capacity(num_agents);
        let mut forced_agent = None;
        for (agent, &unit) in matched_units.iter().enumerate() {
            let slot = unit_slot[unit];
            if work[agent * num_slots + slot] == FORBIDDEN {
                // Expansion produced more seats than this agent has valid
                // slots left: the optimum had to force it somewhere.
                forced_agent.get_or_insert(agent);
                continue;
            }
            roster.push(slot, agent);
            work[agent * num_slots + slot] = FORBIDDEN;
            remaining[slot] -= 1;
            matched_slots.push(slot);
        }

        if let Some(agent) = forced_agent {
            // Report availability against seats still open after this
            // round's valid placements, so a slot lost to a competitor
            // within the round does not count as available.
            let available = (0..num_slots)
                .filter(|&s| work[agent * num_slots + s] != FORBIDDEN && remaining[s] > 0)
                .count();
            return Err(RosterError::InfeasibleDemand {
                agent: prefs.agent_label(agent).to_string(),
                available,
                required: config.slots_per_agent - round,
            });
        }

        if config.decay != 1.0 {
            // Once per match received, the whole column: biases overall slot
            // popularity for remaining rounds, not individual pairings.
            for &slot in &matched_slots {
                for agent in 0..num_agents {
                    let cell = &mut work[agent * num_slots + slot];
                    if *cell != FORBIDDEN {
                        *cell *= config.decay;
                    }
                }
            }
        }
    }

    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<Option<f64>>>) -> PrefMatrix {
        let agents = (0..rows.len()).map(|i| format!("a{i}")).collect();
        let slots = (0..rows[0].len()).map(|i| format!("s{i}")).collect();
        PrefMatrix::from_rows(agents, slots, rows).unwrap()
    }

    fn sorted_slots(roster: &Roster, agent: usize) -> Vec<usize> {
        let mut slots = roster.slots_for_agent(agent);
        slots.sort_unstable();
        slots
    }

    #[test]
    fn test_two_agents_opposite_preferences() {
        // Scenario: each agent gets its clearly preferred slot.
        let prefs = matrix(vec![
            vec![Some(4.0), Some(1.0)],
            vec![Some(1.0), Some(4.0)],
        ]);
        let roster = assign(&prefs, &MatchConfig::new(1, 1)).unwrap();

        assert_eq!(roster.agents_in_slot(0), &[0]);
        assert_eq!(roster.agents_in_slot(1), &[1]);
    }

    #[test]
    fn test_shared_slot_fills_to_capacity() {
        // Three agents, one slot with room for all three.
        let prefs = matrix(vec![
            vec![Some(2.0)],
            vec![Some(2.0)],
            vec![Some(2.0)],
        ]);
        let roster = assign(&prefs, &MatchConfig::new(1, 3)).unwrap();

        assert_eq!(roster.occupancy_per_slot(), vec![3]);
        assert_eq!(roster.occupancy_per_agent(), vec![1, 1, 1]);
    }

    #[test]
    fn test_infeasible_demand_names_agent() {
        // One available slot, target two: must fail upfront, no roster.
        let prefs = matrix(vec![vec![Some(3.0), None]]);
        let err = assign(&prefs, &MatchConfig::new(2, 2)).unwrap_err();

        match err {
            RosterError::InfeasibleDemand {
                agent,
                available,
                required,
            } => {
                assert_eq!(agent, "a0");
                assert_eq!(available, 1);
                assert_eq!(required, 2);
            }
            other => panic!("expected InfeasibleDemand, got {other:?}"),
        }
    }

    #[test]
    fn test_infeasible_capacity() {
        // 2 agents x 2 slots each, but only 2 seats in total.
        let prefs = matrix(vec![
            vec![Some(1.0), Some(1.0)],
            vec![Some(1.0), Some(1.0)],
        ]);
        let err = assign(&prefs, &MatchConfig::new(2, 1)).unwrap_err();

        match err {
            RosterError::InfeasibleCapacity { capacity, demand } => {
                assert_eq!(capacity, 2);
                assert_eq!(demand, 4);
            }
            other => panic!("expected InfeasibleCapacity, got {other:?}"),
        }
    }

    #[test]
    fn test_contended_single_seat_fails_in_round() {
        // a0 and a1 both only know s0 (capacity 1); upfront checks pass,
        // the solver has to force one of them onto a forbidden cell.
        let prefs = matrix(vec![
            vec![Some(9.0), None, None],
            vec![Some(8.0), None, None],
            vec![Some(1.0), Some(2.0), Some(3.0)],
        ]);
        let err = assign(&prefs, &MatchConfig::new(1, 1)).unwrap_err();

        match err {
            RosterError::InfeasibleDemand { agent, .. } => assert_eq!(agent, "a1"),
            other => panic!("expected InfeasibleDemand, got {other:?}"),
        }
    }

    #[test]
    fn test_round_optimality_diagonal() {
        let prefs = matrix(vec![
            vec![Some(9.0), Some(2.0), Some(1.0)],
            vec![Some(2.0), Some(9.0), Some(1.0)],
            vec![Some(1.0), Some(2.0), Some(9.0)],
        ]);
        let roster = assign(&prefs, &MatchConfig::new(1, 1)).unwrap();

        for agent in 0..3 {
            assert_eq!(roster.slots_for_agent(agent), vec![agent]);
        }
    }

    #[test]
    fn test_never_assigns_unavailable() {
        let prefs = matrix(vec![
            vec![Some(1.0), None, Some(5.0)],
            vec![None, Some(2.0), Some(1.0)],
        ]);
        let roster = assign(&prefs, &MatchConfig::new(2, 2)).unwrap();

        for (slot, agents) in roster.iter() {
            for &agent in agents {
                assert!(prefs.is_available(agent, slot));
            }
        }
        assert_eq!(roster.occupancy_per_agent(), vec![2, 2]);
    }

    #[test]
    fn test_feasibility_invariants_hold() {
        let prefs = matrix(vec![
            vec![Some(4.0), Some(3.0), Some(2.0), Some(1.0)],
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            vec![Some(2.0), Some(4.0), Some(1.0), Some(3.0)],
        ]);
        let config = MatchConfig::new(2, 2);
        let roster = assign(&prefs, &config).unwrap();

        assert!(roster
            .occupancy_per_agent()
            .iter()
            .all(|&c| c == config.slots_per_agent()));
        assert!(roster
            .occupancy_per_slot()
            .iter()
            .all(|&c| c <= config.capacity_per_slot()));
    }

    #[test]
    fn test_decay_redirects_second_round() {
        // Round 1 gives a0 -> s0 and a1 -> s1 under both settings. Without
        // decay a0's second pick is s1 (7 beats 6); with decay 0.5 the
        // round-1 winners' columns are halved and s2 wins instead.
        let rows = vec![
            vec![Some(10.0), Some(7.0), Some(6.0)],
            vec![Some(3.0), Some(10.0), Some(0.0)],
        ];
        let prefs = matrix(rows);

        let plain = assign(&prefs, &MatchConfig::new(2, 2)).unwrap();
        assert_eq!(sorted_slots(&plain, 0), vec![0, 1]);

        let decayed = assign(&prefs, &MatchConfig::new(2, 2).with_decay(0.5)).unwrap();
        assert_eq!(sorted_slots(&decayed, 0), vec![0, 2]);
        assert_eq!(sorted_slots(&decayed, 1), vec![0, 1]);
    }

    #[test]
    fn test_same_seed_same_roster() {
        let prefs = matrix(vec![
            vec![Some(2.0), Some(2.0), Some(2.0)],
            vec![Some(2.0), Some(2.0), Some(2.0)],
            vec![Some(2.0), Some(2.0), Some(2.0)],
        ]);
        let config = MatchConfig::new(2, 2).with_noise_seed(7);

        let first = assign(&prefs, &config).unwrap();
        let second = assign(&prefs, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_noiseless_runs_are_deterministic() {
        let prefs = matrix(vec![
            vec![Some(3.0), Some(3.0)],
            vec![Some(3.0), Some(3.0)],
        ]);
        let config = MatchConfig::new(1, 1);

        let first = assign(&prefs, &config).unwrap();
        let second = assign(&prefs, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_noise_keeps_roster_feasible() {
        // Round 1 takes the three 4.0 cells; the leftover seats still admit
        // a full second round (a0 -> s1, a1 -> s0, a2 -> s2).
        let prefs = matrix(vec![
            vec![Some(4.0), Some(1.0), None],
            vec![Some(1.0), Some(2.0), Some(4.0)],
            vec![None, Some(4.0), Some(2.0)],
        ]);
        let roster = assign(&prefs, &MatchConfig::new(2, 2).with_noise()).unwrap();

        assert_eq!(roster.occupancy_per_agent(), vec![2, 2, 2]);
        for (slot, agents) in roster.iter() {
            assert!(agents.len() <= 2);
            for &agent in agents {
                assert!(prefs.is_available(agent, slot));
            }
        }
    }

    #[test]
    fn test_round_contention_reports_no_open_seats() {
        // Round 1 is the diagonal; round 2 leaves a0 and a2 fighting over
        // the single remaining s1 seat. The loser's error must show zero
        // open seats, not count the seat a competitor took this round.
        let prefs = matrix(vec![
            vec![Some(4.0), Some(1.0), None],
            vec![Some(1.0), Some(4.0), Some(2.0)],
            vec![None, Some(2.0), Some(4.0)],
        ]);
        let err = assign(&prefs, &MatchConfig::new(2, 2)).unwrap_err();

        match err {
            RosterError::InfeasibleDemand {
                agent,
                available,
                required,
            } => {
                assert_eq!(agent, "a0");
                assert_eq!(available, 0);
                assert_eq!(required, 1);
            }
            other => panic!("expected InfeasibleDemand, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_target_yields_empty_roster() {
        let prefs = matrix(vec![vec![Some(1.0)]]);
        let roster = assign(&prefs, &MatchConfig::new(0, 1)).unwrap();
        assert_eq!(roster.assignment_count(), 0);
    }
}
