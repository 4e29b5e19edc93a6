//! Calendar export.
//!
//! Turns a finalized roster into an iCalendar feed. Slot labels carry their
//! own schedule in the survey header, e.g. `Monday @ 6 PM - 7:30 PM`: a
//! day-of-week token before the `@`, then dash-separated start and end
//! clock times. Each slot becomes one weekly event series across the term's
//! date range, titled with the assigned agents.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use icalendar::{Calendar, Component, Event, EventLike};

use crate::models::Roster;
use crate::RosterError;

/// Day tokens recognized in slot labels, index-aligned with [`WEEKDAYS`].
const DAY_TOKENS: [&str; 7] = ["mon", "tues", "wed", "thurs", "fri", "sat", "sun"];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A slot's recurring weekly schedule, parsed from its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTime {
    /// Day of week the slot recurs on.
    pub weekday: Weekday,
    /// Start clock time.
    pub start: NaiveTime,
    /// End clock time.
    pub end: NaiveTime,
}

fn slot_err(label: &str, reason: impl Into<String>) -> RosterError {
    RosterError::SlotLabel {
        label: label.to_string(),
        reason: reason.into(),
    }
}

/// Parses a slot label of the form `<day> @ <start> - <end>`.
pub fn parse_slot_label(label: &str) -> Result<SlotTime, RosterError> {
    let (day_part, time_part) = label
        .split_once('@')
        .ok_or_else(|| slot_err(label, "expected `<day> @ <start> - <end>`"))?;

    let weekday = parse_weekday(day_part).map_err(|reason| slot_err(label, reason))?;

    let (start_text, end_text) = time_part
        .split_once('-')
        .ok_or_else(|| slot_err(label, "expected `<start> - <end>` after `@`"))?;
    let start = parse_clock(start_text).map_err(|reason| slot_err(label, reason))?;
    let end = parse_clock(end_text).map_err(|reason| slot_err(label, reason))?;

    Ok(SlotTime {
        weekday,
        start,
        end,
    })
}

/// Finds the unique day-of-week token in `text`.
fn parse_weekday(text: &str) -> Result<Weekday, String> {
    let lower = text.to_lowercase();
    let matches: Vec<usize> = DAY_TOKENS
        .iter()
        .enumerate()
        .filter(|(_, token)| lower.contains(*token))
        .map(|(idx, _)| idx)
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no day of week found in `{}`", text.trim())),
        [idx] => Ok(WEEKDAYS[*idx]),
        _ => Err(format!("ambiguous day of week in `{}`", text.trim())),
    }
}

/// Parses `6 PM` or `6:30 PM` style clock times.
fn parse_clock(text: &str) -> Result<NaiveTime, String> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    // Hour-only forms get explicit minutes so one format covers both.
    let normalized = if compact.contains(':') {
        compact
    } else if let Some(hour) = compact.strip_suffix("AM") {
        format!("{hour}:00AM")
    } else if let Some(hour) = compact.strip_suffix("PM") {
        format!("{hour}:00PM")
    } else {
        compact
    };

    NaiveTime::parse_from_str(&normalized, "%I:%M%p")
        .map_err(|_| format!("cannot parse clock time `{}`", text.trim()))
}

/// Weekly `(start, end)` occurrences of a slot between two dates, inclusive.
///
/// The first occurrence is the slot's weekday on or after `from`.
pub fn weekly_occurrences(
    slot: &SlotTime,
    from: NaiveDate,
    until: NaiveDate,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut date = from;
    while date.weekday() != slot.weekday {
        date = date + Duration::days(1);
    }

    let mut occurrences = Vec::new();
    while date <= until {
        occurrences.push((date.and_time(slot.start), date.and_time(slot.end)));
        date = date + Duration::days(7);
    }
    occurrences
}

/// Builds an iCalendar feed for every occupied slot in the roster.
///
/// Event titles list the slot's agents sorted and capitalized, e.g.
/// `Office hours - Ada, Grace`.
pub fn build_calendar(
    roster: &Roster,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Calendar, RosterError> {
    let mut calendar = Calendar::new();

    for (slot, agents) in roster.iter() {
        if agents.is_empty() {
            continue;
        }
        let slot_time = parse_slot_label(roster.slot_label(slot))?;

        let mut names: Vec<String> = agents
            .iter()
            .map(|&agent| capitalize(roster.agent_label(agent)))
            .collect();
        names.sort();
        let title = format!("Office hours - {}", names.join(", "));

        for (start, end) in weekly_occurrences(&slot_time, from, until) {
            calendar.push(Event::new().summary(&title).starts(start).ends(end).done());
        }
    }

    Ok(calendar)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
