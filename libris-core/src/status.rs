//! Display status and urgency of a borrowed item.
//!
//! The classification is a pure function of the record's status, its due
//! date and a caller-supplied "now". Nothing is cached; callers re-classify
//! whenever they render.
//!
//! An `ACTIVE` record whose due date has already passed is reported as
//! overdue even though the backend has not flipped its status yet. Such
//! results carry [`Classification::status_mismatch`] so callers can tell the
//! correction apart from a backend-confirmed `OVERDUE`.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::borrowing::BorrowStatus;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Loans with this many days left or fewer are flagged critical.
pub const CRITICAL_DAYS: i64 = 3;

/// How strongly a borrowed item should draw attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// The loan is closed.
    Neutral,
    /// More than three days left, or due today.
    Normal,
    /// One to three days left, or overdue.
    Critical,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Neutral => f.write_str("neutral"),
            Urgency::Normal => f.write_str("normal"),
            Urgency::Critical => f.write_str("critical"),
        }
    }
}

/// The short label rendered for a borrowed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLabel {
    Returned,
    Overdue,
    DueToday,
    /// Whole days left, rounded up. Always positive.
    DaysLeft(i64),
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLabel::Returned => f.write_str("Returned"),
            StatusLabel::Overdue => f.write_str("Overdue"),
            StatusLabel::DueToday => f.write_str("Due Today"),
            StatusLabel::DaysLeft(days) => write!(f, "{days} days left"),
        }
    }
}

impl Serialize for StatusLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of classifying one borrowed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub label: StatusLabel,
    pub urgency: Urgency,
    /// Set when the record still reads `ACTIVE` but was classified overdue,
    /// either because its due date passed or because it could not be read.
    pub status_mismatch: bool,
}

impl Classification {
    const fn new(label: StatusLabel, urgency: Urgency) -> Self {
        Self { label, urgency, status_mismatch: false }
    }

    const fn corrected_overdue() -> Self {
        Self { label: StatusLabel::Overdue, urgency: Urgency::Critical, status_mismatch: true }
    }
}

/// Classifies a record given its already-parsed due date.
///
/// `due` is `None` when the stored due date could not be interpreted; an
/// active loan is then treated as overdue.
#[must_use]
pub fn classify(status: BorrowStatus, due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Classification {
    match status {
        BorrowStatus::Returned => Classification::new(StatusLabel::Returned, Urgency::Neutral),
        BorrowStatus::Overdue => Classification::new(StatusLabel::Overdue, Urgency::Critical),
        BorrowStatus::Active => {
            let Some(due) = due else {
                return Classification::corrected_overdue();
            };
            let days = days_remaining(due, now);
            match days {
                d if d < 0 => Classification::corrected_overdue(),
                0 => Classification::new(StatusLabel::DueToday, Urgency::Normal),
                d if d <= CRITICAL_DAYS => Classification::new(StatusLabel::DaysLeft(d), Urgency::Critical),
                d => Classification::new(StatusLabel::DaysLeft(d), Urgency::Normal),
            }
        }
    }
}

/// Classifies a record straight from its wire-format due date.
#[must_use]
pub fn classify_raw(status: BorrowStatus, due_date: &str, now: DateTime<Utc>) -> Classification {
    classify(status, parse_due_date(due_date), now)
}

/// Days until `due`, rounded up at millisecond resolution.
///
/// A due date one millisecond away counts as one day; one exactly in the
/// past by less than a day counts as zero.
#[must_use]
pub fn days_remaining(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = due.signed_duration_since(now).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

/// Reads a due date in any of the encodings the backend emits.
///
/// Accepts RFC 3339, a naive `T`- or space-separated date-time (taken as
/// UTC) and a bare `YYYY-MM-DD` (UTC midnight). Anything else is `None`.
#[must_use]
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
