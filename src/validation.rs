//! Post-hoc roster validation.
//!
//! Independently re-checks a finalized roster against the original
//! preference matrix and the engine configuration. A correct engine never
//! produces a violation here; the validator exists to catch engine defects
//! loudly rather than let a bad roster flow into export. Detects:
//! - Assignments outside an agent's availability
//! - Slots filled beyond the capacity ceiling
//! - Agents above or below their target occupancy
//! - Agent indices out of range
//! - The same agent listed twice in one slot

use crate::matching::MatchConfig;
use crate::models::{PrefMatrix, Roster};

/// Validation result: all violations found, or nothing.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An agent holds a slot it was not available for.
    AvailabilityViolation,
    /// A slot holds more agents than its capacity ceiling.
    CapacityExceeded,
    /// An agent's occupancy differs from its target.
    TargetMismatch,
    /// An agent index is outside the matrix.
    IndexOutOfRange,
    /// An agent appears more than once in the same slot.
    DuplicateAssignment,
    /// Roster and matrix dimensions disagree.
    DimensionMismatch,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a roster against the matrix and configuration.
///
/// Checks:
/// 1. Roster dimensions match the matrix
/// 2. Every assignment respects availability in the original matrix
/// 3. No slot exceeds the capacity ceiling
/// 4. Every agent holds exactly its target occupancy
/// 5. No out-of-range indices, no duplicates within a slot
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_roster(
    roster: &Roster,
    prefs: &PrefMatrix,
    config: &MatchConfig,
) -> ValidationResult {
    let mut errors = Vec::new();

    if roster.num_agents() != prefs.num_agents() || roster.num_slots() != prefs.num_slots() {
        errors.push(ValidationError::new(
            ValidationErrorKind::DimensionMismatch,
            format!(
                "roster is {}x{} but matrix is {}x{}",
                roster.num_agents(),
                roster.num_slots(),
                prefs.num_agents(),
                prefs.num_slots()
            ),
        ));
        // Nothing below is meaningful on mismatched dimensions.
        return Err(errors);
    }

    let mut occupancy = vec![0usize; prefs.num_agents()];

    for (slot, agents) in roster.iter() {
        if agents.len() > config.capacity_per_slot() {
            errors.push(ValidationError::new(
                ValidationErrorKind::CapacityExceeded,
                format!(
                    "slot `{}` holds {} agents, capacity is {}",
                    roster.slot_label(slot),
                    agents.len(),
                    config.capacity_per_slot()
                ),
            ));
        }

        for (pos, &agent) in agents.iter().enumerate() {
            if agent >= prefs.num_agents() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::IndexOutOfRange,
                    format!(
                        "slot `{}` references agent index {agent}, only {} agents exist",
                        roster.slot_label(slot),
                        prefs.num_agents()
                    ),
                ));
                continue;
            }
            occupancy[agent] += 1;
            if agents[..pos].contains(&agent) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateAssignment,
                    format!(
                        "agent `{}` appears twice in slot `{}`",
                        prefs.agent_label(agent),
                        roster.slot_label(slot)
                    ),
                ));
            }
            if !prefs.is_available(agent, slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::AvailabilityViolation,
                    format!(
                        "agent `{}` assigned slot `{}` outside its availability",
                        prefs.agent_label(agent),
                        roster.slot_label(slot)
                    ),
                ));
            }
        }
    }

    for (agent, &count) in occupancy.iter().enumerate() {
        if count != config.slots_per_agent() {
            errors.push(ValidationError::new(
                ValidationErrorKind::TargetMismatch,
                format!(
                    "agent `{}` holds {count} slots, target is {}",
                    prefs.agent_label(agent),
                    config.slots_per_agent()
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
