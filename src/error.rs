//! Crate error taxonomy.
//!
//! Infeasibility is a property of the input configuration, not a transient
//! condition: no error here is retried or recovered internally. Every failure
//! carries the offending agent or slot so the caller can adjust demand,
//! capacity, or availability and re-run.

use thiserror::Error;

/// Errors produced while building, solving, or exporting a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// An agent cannot reach its target occupancy: too few available slots.
    #[error("agent `{agent}` has {available} available slot(s) but needs {required}")]
    InfeasibleDemand {
        /// Label of the agent that cannot be satisfied.
        agent: String,
        /// Number of slots the agent is actually available for.
        available: usize,
        /// Slots the agent is required to hold.
        required: usize,
    },

    /// Aggregate slot capacity cannot satisfy aggregate agent demand.
    #[error("total slot capacity {capacity} cannot cover total demand {demand}")]
    InfeasibleCapacity {
        /// Sum of capacity over all slots.
        capacity: usize,
        /// Sum of target occupancy over all agents.
        demand: usize,
    },

    /// A roster pairs an agent with a slot outside its availability.
    ///
    /// Signals an engine defect: a correct solve never produces this, but
    /// scoring and validation must detect it rather than emit `NaN`.
    #[error("agent `{agent}` is assigned slot `{slot}` outside its availability")]
    AvailabilityViolation {
        /// Label of the misplaced agent.
        agent: String,
        /// Label of the slot the agent is not available for.
        slot: String,
    },

    /// A scale rule pattern failed to compile.
    #[error("invalid scale pattern `{pattern}`")]
    Pattern {
        /// The offending pattern text.
        pattern: String,
        /// Compile error from the regex engine.
        #[source]
        source: regex::Error,
    },

    /// Malformed survey content (bad cell, missing columns, bad header).
    #[error("malformed survey: {0}")]
    Survey(String),

    /// CSV transport or parse failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A slot label could not be parsed for calendar export.
    #[error("slot label `{label}`: {reason}")]
    SlotLabel {
        /// The label as it appeared in the survey header.
        label: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Matrix rows or labels have inconsistent dimensions.
    #[error("shape mismatch: {0}")]
    Shape(String),
}
