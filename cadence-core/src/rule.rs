//! Recurrence rules authored by users before they are scheduled.
//!
//! A [`RepeatableEvent`] is a transient value: it is built and validated
//! through its mutators and then handed to the scheduler, which turns it
//! into a persisted series.

use std::fmt;
use std::ops::BitOr;

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::author::Author;
use crate::error::{CadenceError, CadenceResult};
use crate::model::Reminder;
use crate::window::days_in_month;

/// How often a series repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        write!(f, "{}", name)
    }
}

/// Set of weekdays, Monday = bit 0 through Sunday = bit 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayMask(u8);

impl DayMask {
    pub const MONDAY: DayMask = DayMask(1);
    pub const TUESDAY: DayMask = DayMask(2);
    pub const WEDNESDAY: DayMask = DayMask(4);
    pub const THURSDAY: DayMask = DayMask(8);
    pub const FRIDAY: DayMask = DayMask(16);
    pub const SATURDAY: DayMask = DayMask(32);
    pub const SUNDAY: DayMask = DayMask(64);
    pub const WEEKEND: DayMask = DayMask(32 | 64);
    pub const BUSINESS_DAYS: DayMask = DayMask(1 | 2 | 4 | 8 | 16);

    const ALL_BITS: u8 = 0b111_1111;

    pub const fn empty() -> Self {
        DayMask(0)
    }

    /// Decode a persisted mask. Empty masks and unknown bits are rejected.
    pub fn from_bits(bits: u8) -> CadenceResult<Self> {
        if bits == 0 {
            return Err(CadenceError::EmptyDayMask);
        }
        if bits & !Self::ALL_BITS != 0 {
            return Err(CadenceError::InvalidDayMask(bits));
        }
        Ok(DayMask(bits))
    }

    pub fn of(day: Weekday) -> Self {
        DayMask(1 << day.num_days_from_monday())
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::of(day).0 != 0
    }

    /// Selected days, Monday first.
    pub fn days(self) -> impl Iterator<Item = Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(move |d| self.contains(*d))
    }
}

impl BitOr for DayMask {
    type Output = DayMask;

    fn bitor(self, rhs: DayMask) -> DayMask {
        DayMask(self.0 | rhs.0)
    }
}

impl TryFrom<u8> for DayMask {
    type Error = CadenceError;

    fn try_from(bits: u8) -> CadenceResult<Self> {
        Self::from_bits(bits)
    }
}

impl From<DayMask> for u8 {
    fn from(mask: DayMask) -> u8 {
        mask.0
    }
}

/// Which day a monthly series lands on in each month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MonthlyAnchor {
    /// Same day number as the first occurrence, e.g. the 15th.
    DayOfTheMonth = 1,
    /// Same nth weekday as the first occurrence, e.g. the 2nd Tuesday.
    DayOfTheWeek = 2,
}

impl TryFrom<u8> for MonthlyAnchor {
    type Error = CadenceError;

    fn try_from(code: u8) -> CadenceResult<Self> {
        match code {
            1 => Ok(MonthlyAnchor::DayOfTheMonth),
            2 => Ok(MonthlyAnchor::DayOfTheWeek),
            other => Err(CadenceError::InvalidMonthlyAnchor(other)),
        }
    }
}

impl From<MonthlyAnchor> for u8 {
    fn from(anchor: MonthlyAnchor) -> u8 {
        anchor as u8
    }
}

/// Day groups selectable by a business-days rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessDays {
    All,
    /// Tuesday and Thursday.
    Even,
    /// Monday, Wednesday and Friday.
    Odd,
}

impl BusinessDays {
    pub fn from_selector(selector: i64) -> CadenceResult<Self> {
        match selector {
            1 => Ok(BusinessDays::All),
            2 => Ok(BusinessDays::Even),
            3 => Ok(BusinessDays::Odd),
            other => Err(CadenceError::InvalidBusinessDays(other)),
        }
    }

    pub fn mask(self) -> DayMask {
        match self {
            BusinessDays::All => DayMask::BUSINESS_DAYS,
            BusinessDays::Even => DayMask::TUESDAY | DayMask::THURSDAY,
            BusinessDays::Odd => DayMask::MONDAY | DayMask::WEDNESDAY | DayMask::FRIDAY,
        }
    }
}

/// When a series stops producing occurrences. Exactly one policy is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    #[default]
    Never,
    AfterTimes(u32),
    ParticularDate(DateTime<Utc>),
}

impl Termination {
    pub fn is_forever(&self) -> bool {
        matches!(self, Termination::Never)
    }

    pub fn after_times(&self) -> Option<u32> {
        match self {
            Termination::AfterTimes(n) => Some(*n),
            _ => None,
        }
    }

    pub fn particular_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Termination::ParticularDate(d) => Some(*d),
            _ => None,
        }
    }
}

/// Frequency-specific recurrence parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    Daily {
        interval: u32,
    },
    Weekly {
        interval: u32,
        occurs_on: Option<DayMask>,
    },
    /// Weekly dialect whose `repeat_every` argument picks a day group.
    BusinessDays {
        selection: Option<BusinessDays>,
    },
    Monthly {
        interval: u32,
        anchor: Option<MonthlyAnchor>,
    },
    Yearly {
        interval: u32,
    },
}

impl RecurrenceRule {
    pub fn frequency(&self) -> Frequency {
        match self {
            RecurrenceRule::Daily { .. } => Frequency::Daily,
            RecurrenceRule::Weekly { .. } | RecurrenceRule::BusinessDays { .. } => {
                Frequency::Weekly
            }
            RecurrenceRule::Monthly { .. } => Frequency::Monthly,
            RecurrenceRule::Yearly { .. } => Frequency::Yearly,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            RecurrenceRule::Daily { .. } => "daily",
            RecurrenceRule::Weekly { .. } => "weekly",
            RecurrenceRule::BusinessDays { .. } => "business days",
            RecurrenceRule::Monthly { .. } => "monthly",
            RecurrenceRule::Yearly { .. } => "yearly",
        }
    }
}

/// A one-off calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeEvent {
    pub created_by: Author,
    pub name: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub is_full_day: bool,
    pub reminders: Vec<Reminder>,
}

impl OneTimeEvent {
    pub fn new(
        created_by: Author,
        name: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        OneTimeEvent {
            created_by,
            name: name.into(),
            from,
            to,
            is_full_day: false,
            reminders: Vec::new(),
        }
    }

    pub fn validate(&self) -> CadenceResult<()> {
        check_range(self.from, self.to)
    }
}

/// A user-authored recurring event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatableEvent {
    pub created_by: Author,
    pub name: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub is_full_day: bool,
    pub reminders: Vec<Reminder>,
    rule: RecurrenceRule,
    termination: Termination,
}

impl RepeatableEvent {
    fn with_rule(
        rule: RecurrenceRule,
        created_by: Author,
        name: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        RepeatableEvent {
            created_by,
            name: name.into(),
            from,
            to,
            is_full_day: false,
            reminders: Vec::new(),
            rule,
            termination: Termination::Never,
        }
    }

    pub fn daily(
        created_by: Author,
        name: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        Self::with_rule(RecurrenceRule::Daily { interval: 1 }, created_by, name, from, to)
    }

    pub fn weekly(
        created_by: Author,
        name: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        let rule = RecurrenceRule::Weekly {
            interval: 1,
            occurs_on: None,
        };
        Self::with_rule(rule, created_by, name, from, to)
    }

    pub fn business_days(
        created_by: Author,
        name: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        let rule = RecurrenceRule::BusinessDays { selection: None };
        Self::with_rule(rule, created_by, name, from, to)
    }

    pub fn monthly(
        created_by: Author,
        name: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        let rule = RecurrenceRule::Monthly {
            interval: 1,
            anchor: None,
        };
        Self::with_rule(rule, created_by, name, from, to)
    }

    pub fn yearly(
        created_by: Author,
        name: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        Self::with_rule(RecurrenceRule::Yearly { interval: 1 }, created_by, name, from, to)
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    pub fn frequency(&self) -> Frequency {
        self.rule.frequency()
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Cycle length in units of the frequency. Business-days rules repeat every week.
    pub fn interval(&self) -> u32 {
        match self.rule {
            RecurrenceRule::Daily { interval }
            | RecurrenceRule::Weekly { interval, .. }
            | RecurrenceRule::Monthly { interval, .. }
            | RecurrenceRule::Yearly { interval } => interval,
            RecurrenceRule::BusinessDays { .. } => 1,
        }
    }

    /// Set the interval, validated against the bounds of the rule's frequency.
    ///
    /// For business-days rules the argument selects a day group instead:
    /// 1 = all business days, 2 = Tue/Thu, 3 = Mon/Wed/Fri.
    pub fn repeat_every(&mut self, interval: i64) -> CadenceResult<()> {
        let frequency = self.rule.frequency();
        let (min, max) = interval_bounds(frequency, self.from);

        match &mut self.rule {
            RecurrenceRule::BusinessDays { selection } => {
                *selection = Some(BusinessDays::from_selector(interval)?);
            }
            RecurrenceRule::Daily { interval: current }
            | RecurrenceRule::Weekly {
                interval: current, ..
            }
            | RecurrenceRule::Monthly {
                interval: current, ..
            }
            | RecurrenceRule::Yearly { interval: current } => {
                *current = checked_interval(interval, min, max, frequency)?;
            }
        }
        Ok(())
    }

    /// Days a weekly rule fires on. Rejects the empty mask.
    pub fn occurs_at(&mut self, days: DayMask) -> CadenceResult<()> {
        match &mut self.rule {
            RecurrenceRule::Weekly { occurs_on, .. } => {
                if days.is_empty() {
                    return Err(CadenceError::EmptyDayMask);
                }
                *occurs_on = Some(days);
                Ok(())
            }
            other => Err(CadenceError::UnsupportedRuleOperation {
                rule: other.name(),
                operation: "occurs_at",
            }),
        }
    }

    /// Explicitly chosen weekdays, if any.
    pub fn occurs_on(&self) -> Option<DayMask> {
        match self.rule {
            RecurrenceRule::Weekly { occurs_on, .. } => occurs_on,
            _ => None,
        }
    }

    /// Weekdays the rule actually fires on. An unset weekly mask falls back to
    /// the weekday of `from`; business-days rules default to all business days.
    pub fn effective_occurs_on(&self) -> Option<DayMask> {
        match self.rule {
            RecurrenceRule::Weekly { occurs_on, .. } => {
                Some(occurs_on.unwrap_or_else(|| DayMask::of(self.from.weekday())))
            }
            RecurrenceRule::BusinessDays { selection } => {
                Some(selection.unwrap_or(BusinessDays::All).mask())
            }
            _ => None,
        }
    }

    /// Anchor mode of a monthly rule.
    pub fn occurs_by(&mut self, mode: MonthlyAnchor) -> CadenceResult<()> {
        match &mut self.rule {
            RecurrenceRule::Monthly { anchor, .. } => {
                *anchor = Some(mode);
                Ok(())
            }
            other => Err(CadenceError::UnsupportedRuleOperation {
                rule: other.name(),
                operation: "occurs_by",
            }),
        }
    }

    /// Anchor a monthly rule uses; unset anchors mean the day of the month.
    pub fn effective_anchor(&self) -> Option<MonthlyAnchor> {
        match self.rule {
            RecurrenceRule::Monthly { anchor, .. } => {
                Some(anchor.unwrap_or(MonthlyAnchor::DayOfTheMonth))
            }
            _ => None,
        }
    }

    pub fn never_ends(&mut self) {
        self.termination = Termination::Never;
    }

    pub fn ends_after(&mut self, times: u32) {
        self.termination = Termination::AfterTimes(times);
    }

    pub fn ends_at(&mut self, date: DateTime<Utc>) {
        self.termination = Termination::ParticularDate(date);
    }

    /// Re-check everything that depends on fields callers may have changed
    /// after the mutators ran (the daily bound follows `from`'s month).
    pub fn validate(&self) -> CadenceResult<()> {
        check_range(self.from, self.to)?;

        if !matches!(self.rule, RecurrenceRule::BusinessDays { .. }) {
            let frequency = self.frequency();
            let (min, max) = interval_bounds(frequency, self.from);
            checked_interval(i64::from(self.interval()), min, max, frequency)?;
        }

        if let RecurrenceRule::Weekly {
            occurs_on: Some(days),
            ..
        } = self.rule
        {
            if days.is_empty() {
                return Err(CadenceError::EmptyDayMask);
            }
        }

        Ok(())
    }
}

/// Either kind of calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarEvent {
    OneTime(OneTimeEvent),
    Repeatable(RepeatableEvent),
}

impl CalendarEvent {
    pub fn is_repeatable(&self) -> bool {
        matches!(self, CalendarEvent::Repeatable(_))
    }

    pub fn created_by(&self) -> &Author {
        match self {
            CalendarEvent::OneTime(e) => &e.created_by,
            CalendarEvent::Repeatable(e) => &e.created_by,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CalendarEvent::OneTime(e) => &e.name,
            CalendarEvent::Repeatable(e) => &e.name,
        }
    }
}

/// Largest INTERVAL the recurrence engine accepts.
const MAX_ENGINE_INTERVAL: u16 = u16::MAX;

fn interval_bounds(frequency: Frequency, from: DateTime<Utc>) -> (i64, i64) {
    match frequency {
        Frequency::Daily => (1, i64::from(days_in_month(from.year(), from.month()))),
        Frequency::Weekly => (0, 52),
        Frequency::Monthly => (1, 12),
        Frequency::Yearly => (1, i64::from(MAX_ENGINE_INTERVAL)),
    }
}

fn checked_interval(interval: i64, min: i64, max: i64, frequency: Frequency) -> CadenceResult<u32> {
    if interval < min || interval > max {
        return Err(CadenceError::InvalidInterval(format!(
            "{} recurrence accepts {}..={}, got {}",
            frequency, min, max, interval
        )));
    }
    u32::try_from(interval).map_err(|_| {
        CadenceError::InvalidInterval(format!("{} does not fit an interval", interval))
    })
}

fn check_range(from: DateTime<Utc>, to: DateTime<Utc>) -> CadenceResult<()> {
    if to < from {
        return Err(CadenceError::InvalidRange(format!(
            "event ends at {} before it starts at {}",
            to, from
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author::CatalogValidator;
    use chrono::{Duration, TimeZone};

    fn author() -> Author {
        Author::new("alice", "en-US", "UTC", &CatalogValidator::new(["en-US"])).unwrap()
    }

    fn starting(from: DateTime<Utc>) -> RepeatableEvent {
        RepeatableEvent::weekly(author(), "Standup", from, from + Duration::minutes(15))
    }

    fn jan_6() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 1, 6, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_weekly_interval_bounds() {
        let mut event = starting(jan_6());
        for interval in 0..=52 {
            assert!(event.repeat_every(interval).is_ok(), "{} should be accepted", interval);
            assert_eq!(event.interval(), interval as u32);
        }
        for interval in [-1, 53, 100, i64::MIN, i64::MAX] {
            assert!(matches!(
                event.repeat_every(interval),
                Err(CadenceError::InvalidInterval(_))
            ));
        }
        // Rejections never clobber the accepted value.
        assert_eq!(event.interval(), 52);
    }

    #[test]
    fn test_daily_interval_follows_days_in_month() {
        let feb = Utc.with_ymd_and_hms(2014, 2, 3, 9, 0, 0).unwrap();
        let mut event = RepeatableEvent::daily(author(), "Pills", feb, feb);
        assert!(event.repeat_every(28).is_ok());
        assert!(event.repeat_every(29).is_err());
        assert!(event.repeat_every(0).is_err());

        event.from = Utc.with_ymd_and_hms(2014, 3, 3, 9, 0, 0).unwrap();
        event.to = event.from;
        assert!(event.repeat_every(31).is_ok());

        // Moving `from` back into February invalidates the stored interval.
        event.from = feb;
        event.to = feb;
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_monthly_and_yearly_bounds() {
        let mut monthly = RepeatableEvent::monthly(author(), "Rent", jan_6(), jan_6());
        assert!(monthly.repeat_every(12).is_ok());
        assert!(monthly.repeat_every(13).is_err());
        assert!(monthly.repeat_every(0).is_err());

        let mut yearly = RepeatableEvent::yearly(author(), "Birthday", jan_6(), jan_6());
        assert!(yearly.repeat_every(0).is_err());
        yearly.repeat_every(4).unwrap();
        assert_eq!(yearly.interval(), 4);
        assert_eq!(yearly.frequency(), Frequency::Yearly);
    }

    #[test]
    fn test_yearly_interval_capped_at_engine_limit() {
        let mut yearly = RepeatableEvent::yearly(author(), "Census", jan_6(), jan_6());
        assert!(yearly.repeat_every(65_535).is_ok());
        assert!(matches!(
            yearly.repeat_every(100_000),
            Err(CadenceError::InvalidInterval(_))
        ));
        assert_eq!(yearly.interval(), 65_535);
        assert!(yearly.validate().is_ok());
    }

    #[test]
    fn test_termination_policies_are_exclusive() {
        let mut event = starting(jan_6());
        let date = Utc.with_ymd_and_hms(2014, 6, 1, 0, 0, 0).unwrap();

        event.ends_after(5);
        assert_eq!(event.termination().after_times(), Some(5));
        assert!(!event.termination().is_forever());
        assert_eq!(event.termination().particular_date(), None);

        event.ends_at(date);
        assert_eq!(event.termination().particular_date(), Some(date));
        assert_eq!(event.termination().after_times(), None);
        assert!(!event.termination().is_forever());

        event.never_ends();
        assert!(event.termination().is_forever());
        assert_eq!(event.termination().after_times(), None);
        assert_eq!(event.termination().particular_date(), None);

        event.ends_at(date);
        event.ends_after(2);
        assert_eq!(event.termination(), Termination::AfterTimes(2));
    }

    #[test]
    fn test_occurs_on_defaults_to_weekday_of_from() {
        let event = starting(jan_6());
        assert_eq!(event.occurs_on(), None);
        assert_eq!(event.effective_occurs_on(), Some(DayMask::MONDAY));
        assert_eq!(event.effective_occurs_on(), Some(DayMask::MONDAY));

        let sunday = Utc.with_ymd_and_hms(2014, 1, 12, 9, 0, 0).unwrap();
        assert_eq!(starting(sunday).effective_occurs_on(), Some(DayMask::SUNDAY));
    }

    #[test]
    fn test_occurs_at_rejects_empty_mask() {
        let mut event = starting(jan_6());
        assert!(matches!(
            event.occurs_at(DayMask::empty()),
            Err(CadenceError::EmptyDayMask)
        ));
        assert_eq!(event.occurs_on(), None);

        event.occurs_at(DayMask::WEEKEND).unwrap();
        assert_eq!(event.effective_occurs_on(), Some(DayMask::WEEKEND));
    }

    #[test]
    fn test_occurs_at_only_applies_to_weekly_rules() {
        let mut daily = RepeatableEvent::daily(author(), "Pills", jan_6(), jan_6());
        assert!(matches!(
            daily.occurs_at(DayMask::MONDAY),
            Err(CadenceError::UnsupportedRuleOperation { .. })
        ));
        assert!(daily.occurs_by(MonthlyAnchor::DayOfTheWeek).is_err());
    }

    #[test]
    fn test_business_days_selector_picks_day_groups() {
        let mut event = RepeatableEvent::business_days(author(), "Gym", jan_6(), jan_6());
        assert_eq!(event.frequency(), Frequency::Weekly);
        assert_eq!(event.effective_occurs_on(), Some(DayMask::BUSINESS_DAYS));

        event.repeat_every(2).unwrap();
        assert_eq!(
            event.effective_occurs_on(),
            Some(DayMask::TUESDAY | DayMask::THURSDAY)
        );

        event.repeat_every(3).unwrap();
        assert_eq!(
            event.effective_occurs_on(),
            Some(DayMask::MONDAY | DayMask::WEDNESDAY | DayMask::FRIDAY)
        );
        assert_eq!(event.interval(), 1);

        assert!(matches!(
            event.repeat_every(0),
            Err(CadenceError::InvalidBusinessDays(0))
        ));
        assert!(event.repeat_every(4).is_err());
    }

    #[test]
    fn test_monthly_anchor_defaults_and_decoding() {
        let mut event = RepeatableEvent::monthly(author(), "Review", jan_6(), jan_6());
        assert_eq!(event.effective_anchor(), Some(MonthlyAnchor::DayOfTheMonth));

        event.occurs_by(MonthlyAnchor::DayOfTheWeek).unwrap();
        assert_eq!(event.effective_anchor(), Some(MonthlyAnchor::DayOfTheWeek));

        assert!(matches!(
            MonthlyAnchor::try_from(0),
            Err(CadenceError::InvalidMonthlyAnchor(0))
        ));
        assert_eq!(MonthlyAnchor::try_from(2).unwrap(), MonthlyAnchor::DayOfTheWeek);
    }

    #[test]
    fn test_day_mask_decoding() {
        assert!(matches!(DayMask::from_bits(0), Err(CadenceError::EmptyDayMask)));
        assert!(DayMask::from_bits(128).is_err());
        let mask = DayMask::from_bits(1 | 4).unwrap();
        let days: Vec<Weekday> = mask.days().collect();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn test_event_ending_before_start_is_invalid() {
        let mut event = starting(jan_6());
        event.to = jan_6() - Duration::hours(1);
        assert!(matches!(event.validate(), Err(CadenceError::InvalidRange(_))));
    }

    #[test]
    fn test_calendar_event_repeatable_flag() {
        let one_time = OneTimeEvent::new(author(), "Dentist", jan_6(), jan_6());
        assert!(!CalendarEvent::OneTime(one_time).is_repeatable());
        assert!(CalendarEvent::Repeatable(starting(jan_6())).is_repeatable());
    }
}
