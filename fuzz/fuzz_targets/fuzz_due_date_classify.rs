//! Fuzz target: due-date parsing and classification.
//!
//! Any text may arrive as a due date. Returned loans must stay neutral and
//! an unparseable date must never produce a day count.
#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use libris_core::{
    status::{classify_raw, parse_due_date},
    BorrowStatus, StatusLabel, Urgency,
};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Some(now) = Utc.with_ymd_and_hms(2024, 3, 26, 12, 0, 0).single() else {
        return;
    };

    let returned = classify_raw(BorrowStatus::Returned, raw, now);
    assert_eq!(returned.label, StatusLabel::Returned);
    assert_eq!(returned.urgency, Urgency::Neutral);

    let active = classify_raw(BorrowStatus::Active, raw, now);
    if parse_due_date(raw).is_none() {
        assert!(!matches!(active.label, StatusLabel::DaysLeft(_)));
    }
});
