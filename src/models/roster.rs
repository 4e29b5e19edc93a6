//! Roster (solution) model.
//!
//! A roster is the finished assignment: for every slot, the set of agents
//! holding it. Order within a slot carries no meaning. The mapping is
//! invertible to agent → slots; both directions are exposed as queries.

use serde::{Deserialize, Serialize};

/// A complete slot → agents assignment.
///
/// Built incrementally by the matching engine, one unit of capacity at a
/// time; immutable to everything downstream (scoring, validation, export).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    agent_labels: Vec<String>,
    slot_labels: Vec<String>,
    /// `slot_agents[slot]` holds the indices of agents assigned to `slot`.
    slot_agents: Vec<Vec<usize>>,
}

impl Roster {
    /// Creates an empty roster over the given agent and slot labels.
    pub(crate) fn empty(agent_labels: Vec<String>, slot_labels: Vec<String>) -> Self {
        let slot_agents = vec![Vec::new(); slot_labels.len()];
        Self {
            agent_labels,
            slot_labels,
            slot_agents,
        }
    }

    /// Records one agent into one slot.
    pub(crate) fn push(&mut self, slot: usize, agent: usize) {
        self.slot_agents[slot].push(agent);
    }

    /// Number of agents known to this roster.
    #[inline]
    pub fn num_agents(&self) -> usize {
        self.agent_labels.len()
    }

    /// Number of slots known to this roster.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.slot_labels.len()
    }

    /// Agents assigned to a slot.
    pub fn agents_in_slot(&self, slot: usize) -> &[usize] {
        &self.slot_agents[slot]
    }

    /// Slots held by an agent, in slot-index order.
    pub fn slots_for_agent(&self, agent: usize) -> Vec<usize> {
        self.slot_agents
            .iter()
            .enumerate()
            .filter(|(_, agents)| agents.contains(&agent))
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Realized occupancy count per agent, indexed by agent.
    pub fn occupancy_per_agent(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_agents()];
        for agents in &self.slot_agents {
            for &agent in agents {
                counts[agent] += 1;
            }
        }
        counts
    }

    /// Occupant count per slot, indexed by slot.
    pub fn occupancy_per_slot(&self) -> Vec<usize> {
        self.slot_agents.iter().map(Vec::len).collect()
    }

    /// Total number of (agent, slot) assignments.
    pub fn assignment_count(&self) -> usize {
        self.slot_agents.iter().map(Vec::len).sum()
    }

    /// Iterates over `(slot_index, assigned_agents)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.slot_agents
            .iter()
            .enumerate()
            .map(|(slot, agents)| (slot, agents.as_slice()))
    }

    /// Agent label by index.
    pub fn agent_label(&self, agent: usize) -> &str {
        &self.agent_labels[agent]
    }

    /// Slot label by index.
    pub fn slot_label(&self, slot: usize) -> &str {
        &self.slot_labels[slot]
    }
}
