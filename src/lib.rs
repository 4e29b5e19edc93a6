//! Capacitated roster assignment for recurring time slots.
//!
//! Assigns a pool of agents (e.g. teaching assistants) to recurring slots
//! (e.g. office hours) so that total stated preference is maximized while
//! every agent holds exactly its target number of slots and no slot exceeds
//! its capacity. The optimizer is round-based optimal bipartite matching
//! over a capacity-expanded preference matrix, with optional slot decay to
//! spread assignments and optional seeded noise for impartial tie-breaking.
//!
//! # Modules
//!
//! - **`models`**: Domain types — [`PrefMatrix`], [`Roster`]
//! - **`scaling`**: Pattern-based preference boosting before matching
//! - **`matching`**: The assignment engine ([`MatchConfig`], [`assign`])
//! - **`scoring`**: Per-agent achieved-vs-best metrics ([`RosterScore`])
//! - **`validation`**: Post-hoc feasibility checks ([`validate_roster`])
//! - **`ingest`**: Survey CSV parsing ([`Survey`])
//! - **`export`**: iCalendar generation ([`build_calendar`])
//!
//! # Pipeline
//!
//! Raw survey → scaling → matching → roster → scoring/validation → export.
//! Scaling feeds the optimizer only; scoring always runs against the
//! pristine unscaled matrix.
//!
//! # Example
//!
//! ```
//! use slot_roster::{assign, MatchConfig, PrefMatrix, RosterScore};
//!
//! let prefs = PrefMatrix::from_rows(
//!     vec!["ada".into(), "grace".into()],
//!     vec!["Mon @ 2 PM - 3 PM".into(), "Fri @ 6 PM - 7 PM".into()],
//!     vec![
//!         vec![Some(4.0), Some(1.0)],
//!         vec![Some(1.0), Some(4.0)],
//!     ],
//! )
//! .unwrap();
//!
//! let roster = assign(&prefs, &MatchConfig::new(1, 1)).unwrap();
//! let score = RosterScore::calculate(&roster, &prefs).unwrap();
//! assert!((score.mean_ratio() - 1.0).abs() < 1e-10);
//! ```
//!
//! # Reference
//!
//! - Kuhn (1955), "The Hungarian Method for the Assignment Problem"
//! - Burkard, Dell'Amico, Martello (2009), "Assignment Problems"

pub mod error;
pub mod export;
pub mod ingest;
pub mod matching;
pub mod models;
pub mod scaling;
pub mod scoring;
pub mod validation;

pub use error::RosterError;
pub use export::{build_calendar, parse_slot_label, SlotTime};
pub use ingest::Survey;
pub use matching::{assign, MatchConfig, DEFAULT_NOISE_SEED};
pub use models::{PrefMatrix, Roster};
pub use scaling::{apply_scale, ScaleRule};
pub use scoring::{AgentScore, RosterScore};
pub use validation::{validate_roster, ValidationError, ValidationErrorKind, ValidationResult};
