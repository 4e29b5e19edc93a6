//! Survey ingestion.
//!
//! Parses the preference survey CSV into a [`PrefMatrix`]. Expected layout
//! (one row per response):
//!
//! ```text
//! Timestamp, Email, Name, <slot label>, <slot label>, ...
//! ```
//!
//! Respondents may submit more than once; only the latest row per email is
//! kept. Preference cells are either empty (unavailable) or carry a leading
//! integer score, optionally followed by explanatory text the form appended,
//! e.g. `4 (available and most preferred)`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::models::PrefMatrix;
use crate::RosterError;

/// Number of fixed leading columns (timestamp, email, name).
const META_COLUMNS: usize = 3;

/// A parsed survey: the preference matrix plus respondent emails.
///
/// Agent labels on the matrix are the respondents' display names; the email
/// list runs parallel to them.
#[derive(Debug, Clone)]
pub struct Survey {
    /// Preferences, one row per unique respondent.
    pub prefs: PrefMatrix,
    /// Respondent emails, parallel to the matrix's agent labels.
    pub emails: Vec<String>,
}

impl Survey {
    /// Reads a survey CSV from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let file = File::open(path.as_ref()).map_err(|e| {
            RosterError::Survey(format!("cannot open {}: {e}", path.as_ref().display()))
        })?;
        Self::from_reader(file)
    }

    /// Reads a survey CSV from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterError> {
        let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.len() <= META_COLUMNS {
            return Err(RosterError::Survey(format!(
                "expected timestamp, email, name and at least one slot column, got {} column(s)",
                headers.len()
            )));
        }
        let slot_labels: Vec<String> = headers
            .iter()
            .skip(META_COLUMNS)
            .map(str::to_string)
            .collect();

        struct Row {
            timestamp: String,
            email: String,
            name: String,
            prefs: Vec<Option<f64>>,
        }

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record?;
            let mut prefs = Vec::with_capacity(slot_labels.len());
            for (col, cell) in record.iter().enumerate().skip(META_COLUMNS) {
                let value = parse_pref_cell(cell).map_err(|reason| {
                    RosterError::Survey(format!(
                        "row {}, column `{}`: {reason}",
                        line + 1,
                        headers.get(col).unwrap_or("?")
                    ))
                })?;
                prefs.push(value);
            }

            rows.push(Row {
                timestamp: record.get(0).unwrap_or("").to_string(),
                email: record.get(1).unwrap_or("").trim().to_string(),
                name: record.get(2).unwrap_or("").trim().to_string(),
                prefs,
            });
        }

        // Latest response wins per email: stable-sort by timestamp, then
        // keep each email's last row in that order.
        let total = rows.len();
        rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let mut keep = vec![true; rows.len()];
        for (idx, row) in rows.iter().enumerate() {
            keep[idx] = !rows[idx + 1..].iter().any(|r| r.email == row.email);
        }

        let mut agent_labels = Vec::new();
        let mut emails = Vec::new();
        let mut pref_rows = Vec::new();
        for (row, kept) in rows.into_iter().zip(keep) {
            if kept {
                agent_labels.push(row.name);
                emails.push(row.email);
                pref_rows.push(row.prefs);
            }
        }

        debug!(
            agents = agent_labels.len(),
            slots = slot_labels.len(),
            dropped = total - agent_labels.len(),
            "parsed survey"
        );

        let prefs = PrefMatrix::from_rows(agent_labels, slot_labels, pref_rows)?;
        Ok(Self { prefs, emails })
    }
}

/// Coerces one preference cell.
///
/// Empty or whitespace-only means unavailable. Otherwise the cell must
/// start with an integer score; any trailing text must be separated by
/// whitespace or an opening parenthesis.
fn parse_pref_cell(cell: &str) -> Result<Option<f64>, String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(format!("cannot parse preference from `{trimmed}`"));
    }
    let rest = &trimmed[digits.len()..];
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('(')) {
        return Err(format!("cannot parse preference from `{trimmed}`"));
    }

    let score: u32 = digits
        .parse()
        .map_err(|_| format!("preference `{trimmed}` is out of range"))?;
    Ok(Some(f64::from(score)))
}
