// src/dates.rs
//
// Poll window validation and date conversion. Everything here is pure and
// stateless, so it is safe to re-run on every keystroke of the poll form.
//
// Canonical window policy: start must not be after end, the voting period
// must span at least 3 days and at most 14 days. This matches the asserts in
// the deployed VoteChain contract, which is the authoritative policy source.

use chrono::{Local, NaiveDate, NaiveTime, TimeZone};
use thiserror::Error;

use crate::models::{PollDraft, VoteWindow};

pub const MIN_VOTE_PERIOD_SECS: i64 = 3 * 24 * 60 * 60;
pub const MAX_VOTE_PERIOD_SECS: i64 = 14 * 24 * 60 * 60;

/// Textual conventions a calendar date arrives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`, as produced by the date-picker control.
    Iso,
    /// `DD/MM/YYYY`, the on-chain/display form. Exact inverse of
    /// [`format_for_chain`].
    Slash,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("date \"{0}\" must have exactly three numeric components")]
    Malformed(String),
    #[error("\"{0}\" is not a real calendar date")]
    NotACalendarDate(String),
    #[error("no local midnight exists on \"{0}\"")]
    NoLocalMidnight(String),
}

/// Converts a date string to whole seconds since the Unix epoch at local
/// midnight. No timezone normalization happens here; the contract stores
/// these as opaque integers, so all callers must share one local time zone.
pub fn to_epoch_seconds(date_str: &str, format: DateFormat) -> Result<i64, ParseError> {
    let sep = match format {
        DateFormat::Iso => '-',
        DateFormat::Slash => '/',
    };
    let parts: Vec<&str> = date_str.split(sep).collect();
    if parts.len() != 3 {
        return Err(ParseError::Malformed(date_str.to_string()));
    }
    let mut nums = [0i64; 3];
    for (slot, part) in nums.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<i64>()
            .map_err(|_| ParseError::Malformed(date_str.to_string()))?;
    }
    let (year, month, day) = match format {
        DateFormat::Iso => (nums[0], nums[1], nums[2]),
        DateFormat::Slash => (nums[2], nums[1], nums[0]),
    };

    let not_a_date = || ParseError::NotACalendarDate(date_str.to_string());
    let year = i32::try_from(year).map_err(|_| not_a_date())?;
    let month = u32::try_from(month).map_err(|_| not_a_date())?;
    let day = u32::try_from(day).map_err(|_| not_a_date())?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(not_a_date)?;

    let midnight = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(instant) => Ok(instant.timestamp()),
        // DST gap swallowed this midnight in the local zone.
        None => Err(ParseError::NoLocalMidnight(date_str.to_string())),
    }
}

/// Reformats `YYYY-MM-DD` to the `DD/MM/YYYY` form the contract stores.
///
/// Formatting only: no calendar validation happens here, and anything that
/// does not split into three `-`-separated fields comes back unchanged.
/// Validate through [`check_draft`] before relying on the result.
pub fn format_for_chain(date_str: &str) -> String {
    let parts: Vec<&str> = date_str.split('-').collect();
    match parts.as_slice() {
        [year, month, day] => format!("{day}/{month}/{year}"),
        _ => date_str.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("start date must be earlier than end date")]
    StartAfterEnd,
    #[error("voting period must be at least 3 days")]
    ShorterThanMinimum,
    #[error("voting period must not exceed 14 days")]
    LongerThanMaximum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(PolicyViolation),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// Judges a candidate voting window. First violated rule wins.
pub fn validate_window(start_epoch: i64, end_epoch: i64) -> Verdict {
    if start_epoch > end_epoch {
        return Verdict::Invalid(PolicyViolation::StartAfterEnd);
    }
    let period = end_epoch - start_epoch;
    if period < MIN_VOTE_PERIOD_SECS {
        Verdict::Invalid(PolicyViolation::ShorterThanMinimum)
    } else if period > MAX_VOTE_PERIOD_SECS {
        Verdict::Invalid(PolicyViolation::LongerThanMaximum)
    } else {
        Verdict::Valid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct WindowStatus {
    pub is_open: bool,
    pub label: &'static str,
}

/// Display-only open/closed check over the inclusive `[start, end]` interval.
/// The contract makes the authoritative (and stricter) call when a vote is
/// actually submitted.
pub fn is_window_currently_open(start_epoch: i64, end_epoch: i64, now_epoch: i64) -> WindowStatus {
    if now_epoch >= start_epoch && now_epoch <= end_epoch {
        WindowStatus {
            is_open: true,
            label: "Yes",
        }
    } else {
        WindowStatus {
            is_open: false,
            label: "No",
        }
    }
}

/// How a form field should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldDisplay {
    Ok,
    Missing,
    Invalid,
}

/// Display-only classification used for input highlighting. Date fields are
/// `Missing` until both are populated, then `Ok`/`Invalid` per the window
/// policy. Not authoritative; submission gating goes through [`check_draft`].
pub fn classify_field_for_display(field: &str, draft: &PollDraft) -> FieldDisplay {
    if field != draft.start_date && field != draft.end_date {
        return FieldDisplay::Ok;
    }
    if draft.start_date.is_empty() || draft.end_date.is_empty() {
        return FieldDisplay::Missing;
    }
    let start = to_epoch_seconds(&draft.start_date, DateFormat::Iso);
    let end = to_epoch_seconds(&draft.end_date, DateFormat::Iso);
    match (start, end) {
        (Ok(s), Ok(e)) if validate_window(s, e).is_valid() => FieldDisplay::Ok,
        _ => FieldDisplay::Invalid,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("poll title required")]
    MissingTitle,
    #[error("choice #{0} is required")]
    MissingChoice(usize),
    #[error("start and end date required")]
    MissingDates,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Window(PolicyViolation),
}

/// Authoritative draft check: title present, every choice non-empty after
/// trimming, both dates present and parseable, window within policy. Returns
/// the derived window so callers never convert the dates twice.
pub fn check_draft(draft: &PollDraft) -> Result<VoteWindow, DraftError> {
    if draft.title.is_empty() {
        return Err(DraftError::MissingTitle);
    }
    for (i, choice) in draft.choices.iter().enumerate() {
        if choice.trim().is_empty() {
            return Err(DraftError::MissingChoice(i + 1));
        }
    }
    if draft.start_date.is_empty() || draft.end_date.is_empty() {
        return Err(DraftError::MissingDates);
    }
    let start = to_epoch_seconds(&draft.start_date, DateFormat::Iso)?;
    let end = to_epoch_seconds(&draft.end_date, DateFormat::Iso)?;
    match validate_window(start, end) {
        Verdict::Valid => Ok(VoteWindow { start, end }),
        Verdict::Invalid(violation) => Err(DraftError::Window(violation)),
    }
}

pub fn is_draft_submittable(draft: &PollDraft) -> bool {
    check_draft(draft).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 24 * 60 * 60;

    fn local_midnight(year: i32, month: u32, day: u32) -> i64 {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        Local
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .earliest()
            .unwrap()
            .timestamp()
    }

    fn lunch_draft() -> PollDraft {
        PollDraft {
            title: "Lunch?".into(),
            choices: ["Pizza".into(), "Sushi".into(), "Tacos".into()],
            start_date: "2025-01-01".into(),
            end_date: "2025-01-10".into(),
        }
    }

    #[test]
    fn iso_parse_hits_local_midnight() {
        assert_eq!(
            to_epoch_seconds("2025-01-01", DateFormat::Iso).unwrap(),
            local_midnight(2025, 1, 1)
        );
    }

    #[test]
    fn slash_parse_is_day_month_year() {
        assert_eq!(
            to_epoch_seconds("10/01/2025", DateFormat::Slash).unwrap(),
            local_midnight(2025, 1, 10)
        );
    }

    #[test]
    fn chain_format_round_trips_to_same_instant() {
        for iso in ["2025-01-01", "2024-02-29", "2025-12-31"] {
            let on_chain = format_for_chain(iso);
            assert_eq!(
                to_epoch_seconds(&on_chain, DateFormat::Slash).unwrap(),
                to_epoch_seconds(iso, DateFormat::Iso).unwrap(),
                "round trip diverged for {iso}"
            );
        }
    }

    #[test]
    fn chain_format_is_pure_reshuffle() {
        assert_eq!(format_for_chain("2025-01-01"), "01/01/2025");
        // Garbage in, garbage out: no calendar validation on this path.
        assert_eq!(format_for_chain("2025-13-99"), "99/13/2025");
        assert_eq!(format_for_chain("not a date"), "not a date");
    }

    #[test]
    fn rejects_non_numeric_components() {
        assert_eq!(
            to_epoch_seconds("2025-ab-01", DateFormat::Iso),
            Err(ParseError::Malformed("2025-ab-01".into()))
        );
    }

    #[test]
    fn rejects_wrong_arity() {
        assert_eq!(
            to_epoch_seconds("2025-01", DateFormat::Iso),
            Err(ParseError::Malformed("2025-01".into()))
        );
        assert_eq!(
            to_epoch_seconds("2025-01-02-03", DateFormat::Iso),
            Err(ParseError::Malformed("2025-01-02-03".into()))
        );
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        for bad in ["2025-13-01", "2025-02-30", "2023-02-29", "2025-00-10"] {
            assert_eq!(
                to_epoch_seconds(bad, DateFormat::Iso),
                Err(ParseError::NotACalendarDate(bad.into()))
            );
        }
    }

    #[test]
    fn equal_dates_fail_the_minimum_period() {
        // Policy decision pinned here: the 3-day minimum is active, so a
        // zero-length window is rejected for its duration, not its ordering.
        let s = 1_700_000_000;
        assert_eq!(
            validate_window(s, s),
            Verdict::Invalid(PolicyViolation::ShorterThanMinimum)
        );
    }

    #[test]
    fn reversed_dates_fail_the_ordering_rule() {
        let s = 1_700_000_000;
        assert_eq!(
            validate_window(s, s - 1),
            Verdict::Invalid(PolicyViolation::StartAfterEnd)
        );
        assert!(PolicyViolation::StartAfterEnd
            .to_string()
            .contains("earlier than end"));
    }

    #[test]
    fn fourteen_day_boundary_is_inclusive() {
        let s = 1_700_000_000;
        assert_eq!(validate_window(s, s + 14 * DAY), Verdict::Valid);
        assert_eq!(
            validate_window(s, s + 14 * DAY + 1),
            Verdict::Invalid(PolicyViolation::LongerThanMaximum)
        );
        assert!(PolicyViolation::LongerThanMaximum
            .to_string()
            .contains("14 days"));
    }

    #[test]
    fn three_day_boundary_is_inclusive() {
        let s = 1_700_000_000;
        assert_eq!(
            validate_window(s, s + 3 * DAY - 1),
            Verdict::Invalid(PolicyViolation::ShorterThanMinimum)
        );
        assert_eq!(validate_window(s, s + 3 * DAY), Verdict::Valid);
    }

    #[test]
    fn open_window_boundaries_are_inclusive() {
        let s = 1_700_000_000;
        let e = s + 5 * DAY;
        assert!(is_window_currently_open(s, e, s).is_open);
        assert!(is_window_currently_open(s, e, e).is_open);
        assert!(!is_window_currently_open(s, e, s - 1).is_open);
        assert!(!is_window_currently_open(s, e, e + 1).is_open);
        assert_eq!(is_window_currently_open(s, e, s).label, "Yes");
        assert_eq!(is_window_currently_open(s, e, e + 1).label, "No");
    }

    #[test]
    fn lunch_draft_is_submittable() {
        let draft = lunch_draft();
        assert!(is_draft_submittable(&draft));

        let window = check_draft(&draft).unwrap();
        assert_eq!(window.start, local_midnight(2025, 1, 1));
        assert_eq!(window.end, local_midnight(2025, 1, 10));
    }

    #[test]
    fn nineteen_day_span_reports_the_maximum() {
        let mut draft = lunch_draft();
        draft.end_date = "2025-01-20".into();
        assert!(!is_draft_submittable(&draft));
        let err = check_draft(&draft).unwrap_err();
        assert!(err.to_string().contains("14 days"), "got: {err}");
    }

    #[test]
    fn empty_choice_blocks_submission_despite_valid_dates() {
        let mut draft = lunch_draft();
        draft.choices[1] = "   ".into();
        assert_eq!(check_draft(&draft), Err(DraftError::MissingChoice(2)));
        assert!(!is_draft_submittable(&draft));
    }

    #[test]
    fn missing_title_and_dates_are_reported_in_order() {
        let mut draft = lunch_draft();
        draft.title.clear();
        assert_eq!(check_draft(&draft), Err(DraftError::MissingTitle));

        let mut draft = lunch_draft();
        draft.end_date.clear();
        assert_eq!(check_draft(&draft), Err(DraftError::MissingDates));
    }

    #[test]
    fn field_classification_tracks_the_window() {
        let draft = lunch_draft();
        assert_eq!(
            classify_field_for_display("2025-01-01", &draft),
            FieldDisplay::Ok
        );

        let mut missing = lunch_draft();
        missing.end_date.clear();
        assert_eq!(
            classify_field_for_display("2025-01-01", &missing),
            FieldDisplay::Missing
        );

        let mut too_long = lunch_draft();
        too_long.end_date = "2025-01-20".into();
        assert_eq!(
            classify_field_for_display("2025-01-20", &too_long),
            FieldDisplay::Invalid
        );

        // Non-date fields keep the neutral styling.
        assert_eq!(
            classify_field_for_display("Lunch?", &draft),
            FieldDisplay::Ok
        );
    }
}
