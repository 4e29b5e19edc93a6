//! Roster domain models.
//!
//! Core data types exchanged between the ingestion boundary, the matching
//! engine, and the scoring/export side:
//!
//! - [`PrefMatrix`]: agent × slot preference scores, missing = unavailable
//! - [`Roster`]: the finished slot → agents assignment

mod prefs;
mod roster;

pub use prefs::PrefMatrix;
pub use roster::Roster;
