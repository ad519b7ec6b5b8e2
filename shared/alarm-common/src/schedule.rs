//! Per-user collection schedules and the rule deciding what is due on a date
//!
//! A [`TrashSchedule`] lists collection categories, each with one or more
//! recurrence entries and optional excluded dates. [`ScheduleEvaluator`] turns
//! a dispatch instant into a local calendar date and evaluates the entries
//! against it.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

const MONTH_DAYS: RangeInclusive<u32> = 1..=31;
const NTH_OCCURRENCES: RangeInclusive<u32> = 1..=5;
const EVWEEK_INTERVALS: RangeInclusive<u32> = 2..=5;

/// Collection categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrashKind {
    Burn,
    Unburn,
    Plastic,
    Bottle,
    Can,
    Petbottle,
    Paper,
    Resource,
    Coarse,
    /// User-named category; the display name comes from [`TrashData::name`].
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleEntryError {
    #[error("month day out of range: {0}")]
    MonthDay(u32),

    #[error("weekday occurrence out of range: {0}")]
    Occurrence(u32),

    #[error("week interval out of range: {0}")]
    Interval(u32),
}

/// One recurrence rule of a category
///
/// Deserialization applies the range checks of [`ScheduleEntry::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "value",
    rename_all = "lowercase",
    try_from = "TaggedEntry"
)]
pub enum ScheduleEntry {
    /// Every week on this day
    Weekday(Weekday),
    /// This day of every month
    Month(u32),
    /// The nth occurrence of `weekday` in every month (1-based)
    Biweek { weekday: Weekday, nth: u32 },
    /// Every `interval` weeks on `weekday`, counted from the week containing
    /// `start`. Weeks begin on Sunday.
    Evweek {
        weekday: Weekday,
        start: NaiveDate,
        interval: u32,
    },
    #[serde(rename = "none")]
    Unscheduled,
}

impl ScheduleEntry {
    pub fn validate(&self) -> Result<(), ScheduleEntryError> {
        match self {
            ScheduleEntry::Month(day) if !MONTH_DAYS.contains(day) => {
                Err(ScheduleEntryError::MonthDay(*day))
            }
            ScheduleEntry::Biweek { nth, .. } if !NTH_OCCURRENCES.contains(nth) => {
                Err(ScheduleEntryError::Occurrence(*nth))
            }
            ScheduleEntry::Evweek { interval, .. } if !EVWEEK_INTERVALS.contains(interval) => {
                Err(ScheduleEntryError::Interval(*interval))
            }
            _ => Ok(()),
        }
    }
}

/// Wire shape of [`ScheduleEntry`] before range checks
#[derive(Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
enum TaggedEntry {
    Weekday(Weekday),
    Month(u32),
    Biweek {
        weekday: Weekday,
        nth: u32,
    },
    Evweek {
        weekday: Weekday,
        start: NaiveDate,
        interval: u32,
    },
    #[serde(rename = "none")]
    Unscheduled,
}

impl TryFrom<TaggedEntry> for ScheduleEntry {
    type Error = ScheduleEntryError;

    fn try_from(raw: TaggedEntry) -> Result<Self, Self::Error> {
        let entry = match raw {
            TaggedEntry::Weekday(weekday) => ScheduleEntry::Weekday(weekday),
            TaggedEntry::Month(day) => ScheduleEntry::Month(day),
            TaggedEntry::Biweek { weekday, nth } => ScheduleEntry::Biweek { weekday, nth },
            TaggedEntry::Evweek {
                weekday,
                start,
                interval,
            } => ScheduleEntry::Evweek {
                weekday,
                start,
                interval,
            },
            TaggedEntry::Unscheduled => ScheduleEntry::Unscheduled,
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// Month/day pair on which a category is skipped regardless of its entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeDate {
    pub month: u32,
    pub day: u32,
}

impl ExcludeDate {
    pub fn matches(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashData {
    pub kind: TrashKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
    #[serde(default)]
    pub excludes: Vec<ExcludeDate>,
}

impl TrashData {
    pub fn new(kind: TrashKind, schedules: Vec<ScheduleEntry>) -> Self {
        Self {
            kind,
            name: None,
            schedules,
            excludes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_excludes(mut self, excludes: Vec<ExcludeDate>) -> Self {
        self.excludes = excludes;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashSchedule {
    pub user_id: String,
    #[serde(default)]
    pub trash: Vec<TrashData>,
}

/// Evaluates schedule entries in a fixed timezone.
///
/// Constructed once at startup from configuration and shared by reference;
/// holds no mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEvaluator {
    offset: FixedOffset,
}

impl ScheduleEvaluator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar date of `now` in the evaluator's timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    pub fn is_scheduled(&self, entry: &ScheduleEntry, date: NaiveDate) -> bool {
        match entry {
            ScheduleEntry::Weekday(weekday) => date.weekday() == *weekday,
            ScheduleEntry::Month(day) => date.day() == *day,
            ScheduleEntry::Biweek { weekday, nth } => {
                date.weekday() == *weekday && (date.day() - 1) / 7 + 1 == *nth
            }
            ScheduleEntry::Evweek {
                weekday,
                start,
                interval,
            } => {
                if *interval == 0 || date.weekday() != *weekday {
                    return false;
                }
                // Start dates at the edge of the calendar have no week start.
                match (week_start(date), week_start(*start)) {
                    (Some(current), Some(first)) => {
                        let weeks = (current - first).num_days() / 7;
                        weeks.rem_euclid(i64::from(*interval)) == 0
                    }
                    _ => false,
                }
            }
            ScheduleEntry::Unscheduled => false,
        }
    }

    /// True when any entry matches `date` and no exclude covers it.
    pub fn is_enabled(&self, trash: &TrashData, date: NaiveDate) -> bool {
        if trash.excludes.iter().any(|exclude| exclude.matches(date)) {
            return false;
        }
        trash
            .schedules
            .iter()
            .any(|entry| self.is_scheduled(entry, date))
    }

    /// Categories of `schedule` due on `date`, in schedule order.
    pub fn enabled_trash<'a>(
        &self,
        schedule: &'a TrashSchedule,
        date: NaiveDate,
    ) -> Vec<&'a TrashData> {
        schedule
            .trash
            .iter()
            .filter(|trash| self.is_enabled(trash, date))
            .collect()
    }
}

impl Default for ScheduleEvaluator {
    fn default() -> Self {
        Self::utc()
    }
}

fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_and_month_entries() {
        let evaluator = ScheduleEvaluator::utc();
        // 2024-01-03 is a Wednesday
        let wednesday = date(2024, 1, 3);

        assert!(evaluator.is_scheduled(&ScheduleEntry::Weekday(Weekday::Wed), wednesday));
        assert!(!evaluator.is_scheduled(&ScheduleEntry::Weekday(Weekday::Thu), wednesday));
        assert!(evaluator.is_scheduled(&ScheduleEntry::Month(3), wednesday));
        assert!(!evaluator.is_scheduled(&ScheduleEntry::Month(4), wednesday));
        assert!(!evaluator.is_scheduled(&ScheduleEntry::Unscheduled, wednesday));
    }

    #[test]
    fn biweek_matches_nth_occurrence_in_month() {
        let evaluator = ScheduleEvaluator::utc();
        let second_monday = ScheduleEntry::Biweek {
            weekday: Weekday::Mon,
            nth: 2,
        };

        // Mondays in January 2024: 1, 8, 15, 22, 29
        assert!(!evaluator.is_scheduled(&second_monday, date(2024, 1, 1)));
        assert!(evaluator.is_scheduled(&second_monday, date(2024, 1, 8)));
        assert!(!evaluator.is_scheduled(&second_monday, date(2024, 1, 15)));
        assert!(!evaluator.is_scheduled(&second_monday, date(2024, 1, 9)));
    }

    #[test]
    fn evweek_counts_weeks_from_start() {
        let evaluator = ScheduleEvaluator::utc();
        let every_other_friday = ScheduleEntry::Evweek {
            weekday: Weekday::Fri,
            // Tuesday; its Sunday-based week begins 2023-12-31
            start: date(2024, 1, 2),
            interval: 2,
        };

        assert!(evaluator.is_scheduled(&every_other_friday, date(2024, 1, 5)));
        assert!(!evaluator.is_scheduled(&every_other_friday, date(2024, 1, 12)));
        assert!(evaluator.is_scheduled(&every_other_friday, date(2024, 1, 19)));
        assert!(!evaluator.is_scheduled(&every_other_friday, date(2024, 1, 18)));

        let zero_interval = ScheduleEntry::Evweek {
            weekday: Weekday::Fri,
            start: date(2024, 1, 2),
            interval: 0,
        };
        assert!(!evaluator.is_scheduled(&zero_interval, date(2024, 1, 5)));
    }

    #[test]
    fn evweek_with_start_at_calendar_edge_never_matches() {
        let evaluator = ScheduleEvaluator::utc();
        // The first representable date is a Thursday, so its week has no Sunday.
        assert_eq!(NaiveDate::MIN.weekday(), Weekday::Thu);
        assert_eq!(week_start(NaiveDate::MIN), None);

        let entry = ScheduleEntry::Evweek {
            weekday: Weekday::Mon,
            start: NaiveDate::MIN,
            interval: 2,
        };
        assert!(!evaluator.is_scheduled(&entry, date(2024, 1, 1)));
        assert!(!evaluator.is_scheduled(&entry, date(2024, 1, 8)));
    }

    #[test]
    fn out_of_range_entries_are_rejected_on_deserialize() {
        let parse = |raw: serde_json::Value| serde_json::from_value::<ScheduleEntry>(raw);

        assert!(parse(serde_json::json!({ "type": "month", "value": 0 })).is_err());
        assert!(parse(serde_json::json!({ "type": "month", "value": 32 })).is_err());
        assert!(parse(serde_json::json!({
            "type": "biweek", "value": { "weekday": "Mon", "nth": 6 }
        }))
        .is_err());
        assert!(parse(serde_json::json!({
            "type": "evweek",
            "value": { "weekday": "Fri", "start": "2024-01-02", "interval": 1 }
        }))
        .is_err());
        assert_eq!(
            parse(serde_json::json!({
                "type": "evweek",
                "value": { "weekday": "Fri", "start": "2024-01-02", "interval": 5 }
            }))
            .unwrap(),
            ScheduleEntry::Evweek {
                weekday: Weekday::Fri,
                start: date(2024, 1, 2),
                interval: 5,
            }
        );
        assert_eq!(ScheduleEntry::Month(31).validate(), Ok(()));
        assert_eq!(
            ScheduleEntry::Biweek {
                weekday: Weekday::Tue,
                nth: 0
            }
            .validate(),
            Err(ScheduleEntryError::Occurrence(0))
        );
    }

    #[test]
    fn excludes_override_matching_entries() {
        let evaluator = ScheduleEvaluator::utc();
        let trash = TrashData::new(TrashKind::Burn, vec![ScheduleEntry::Weekday(Weekday::Mon)])
            .with_excludes(vec![ExcludeDate { month: 1, day: 1 }]);

        assert!(!evaluator.is_enabled(&trash, date(2024, 1, 1)));
        assert!(evaluator.is_enabled(&trash, date(2024, 1, 8)));
    }

    #[test]
    fn enabled_trash_keeps_schedule_order() {
        let evaluator = ScheduleEvaluator::utc();
        let schedule = TrashSchedule {
            user_id: "u1".to_string(),
            trash: vec![
                TrashData::new(TrashKind::Paper, vec![ScheduleEntry::Weekday(Weekday::Mon)]),
                TrashData::new(TrashKind::Can, vec![ScheduleEntry::Weekday(Weekday::Tue)]),
                TrashData::new(TrashKind::Burn, vec![ScheduleEntry::Month(1)]),
            ],
        };

        let kinds: Vec<TrashKind> = evaluator
            .enabled_trash(&schedule, date(2024, 1, 1))
            .into_iter()
            .map(|trash| trash.kind)
            .collect();
        assert_eq!(kinds, vec![TrashKind::Paper, TrashKind::Burn]);
    }

    #[test]
    fn today_uses_configured_offset() {
        let tokyo = ScheduleEvaluator::new(FixedOffset::east_opt(9 * 3600).unwrap());
        let now = DateTime::parse_from_rfc3339("2024-01-01T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(tokyo.today(now), date(2024, 1, 2));
        assert_eq!(ScheduleEvaluator::utc().today(now), date(2024, 1, 1));
    }

    #[test]
    fn schedule_deserializes_from_tagged_json() {
        let raw = serde_json::json!({
            "user_id": "u1",
            "trash": [{
                "kind": "other",
                "name": "batteries",
                "schedules": [
                    { "type": "weekday", "value": "Mon" },
                    { "type": "biweek", "value": { "weekday": "Tue", "nth": 3 } },
                    { "type": "none" }
                ],
                "excludes": [{ "month": 12, "day": 31 }]
            }]
        });

        let schedule: TrashSchedule = serde_json::from_value(raw).unwrap();
        let trash = &schedule.trash[0];
        assert_eq!(trash.kind, TrashKind::Other);
        assert_eq!(trash.name.as_deref(), Some("batteries"));
        assert_eq!(
            trash.schedules,
            vec![
                ScheduleEntry::Weekday(Weekday::Mon),
                ScheduleEntry::Biweek {
                    weekday: Weekday::Tue,
                    nth: 3
                },
                ScheduleEntry::Unscheduled,
            ]
        );
        assert_eq!(trash.excludes, vec![ExcludeDate { month: 12, day: 31 }]);
    }
}
