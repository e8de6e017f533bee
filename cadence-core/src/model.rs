//! Persisted documents: series headers and materialized events.
//!
//! A scheduled [`RepeatableEvent`] becomes one [`EventSerie`] plus one anchor
//! [`Event`]. Edits to single occurrences are stored as override events
//! inside the series' [`Changes`]; forked futures as sub-series.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::author::Author;
use crate::error::{CadenceError, CadenceResult};
use crate::rule::{
    DayMask, Frequency, MonthlyAnchor, OneTimeEvent, RepeatableEvent, Termination,
};

/// How a reminder is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMethod {
    Email,
    PopUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderUnit {
    Minutes,
    Hours,
    Weeks,
}

/// A reminder fired some time before an event starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub unit: ReminderUnit,
    pub value: u32,
}

impl Reminder {
    pub fn new(method: ReminderMethod, unit: ReminderUnit, value: i64) -> CadenceResult<Self> {
        if value < 1 {
            return Err(CadenceError::InvalidReminder(format!(
                "value has to be greater than or equal to 1, got {}",
                value
            )));
        }
        let value = u32::try_from(value)
            .map_err(|_| CadenceError::InvalidReminder(format!("{} is too large", value)))?;
        Ok(Reminder {
            method,
            unit,
            value,
        })
    }

    /// How long before the event the reminder fires.
    pub fn lead_time(&self) -> Duration {
        let value = i64::from(self.value);
        match self.unit {
            ReminderUnit::Minutes => Duration::minutes(value),
            ReminderUnit::Hours => Duration::hours(value),
            ReminderUnit::Weeks => Duration::weeks(value),
        }
    }
}

/// Time span of a single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub number_of_days: i64,
    pub number_of_hours: i64,
    pub timezone: String,
    pub culture: String,
}

impl EventRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>, author: &Author) -> Self {
        let span = to - from;
        EventRange {
            from,
            to,
            number_of_days: span.num_days(),
            number_of_hours: span.num_hours(),
            timezone: author.timezone().to_string(),
            culture: author.culture().to_string(),
        }
    }
}

/// The generated occurrence an override replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceSlot {
    /// Event the update was addressed to.
    pub event_id: String,
    /// Start of the generated occurrence.
    pub starts_at: DateTime<Utc>,
}

/// A single materialized occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub author_id: String,
    pub name: String,
    pub is_full_day: bool,
    pub repeatable: bool,
    /// None for standalone one-time events.
    pub event_serie_id: Option<String>,
    /// Set on overrides only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<OccurrenceSlot>,
    pub range: EventRange,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

impl Event {
    /// Anchor event of a freshly scheduled series.
    pub fn anchor_for(event: &RepeatableEvent, serie_id: &str) -> Self {
        Event {
            id: new_id(),
            author_id: event.created_by.id().to_string(),
            name: event.name.clone(),
            is_full_day: event.is_full_day,
            repeatable: true,
            event_serie_id: Some(serie_id.to_string()),
            overrides: None,
            range: EventRange::new(event.from, event.to, &event.created_by),
            reminders: event.reminders.clone(),
        }
    }

    /// Override replacing one generated occurrence of a series.
    pub fn override_for(changes: &RepeatableEvent, serie_id: &str, slot: OccurrenceSlot) -> Self {
        Event {
            overrides: Some(slot),
            ..Self::anchor_for(changes, serie_id)
        }
    }

    pub fn standalone(event: &OneTimeEvent) -> Self {
        Event {
            id: new_id(),
            author_id: event.created_by.id().to_string(),
            name: event.name.clone(),
            is_full_day: event.is_full_day,
            repeatable: false,
            event_serie_id: None,
            overrides: None,
            range: EventRange::new(event.from, event.to, &event.created_by),
            reminders: event.reminders.clone(),
        }
    }

    pub fn is_standalone(&self) -> bool {
        self.event_serie_id.is_none()
    }
}

/// Fields shared by every generated occurrence of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerieBase {
    pub author_id: String,
    pub name: String,
    pub is_full_day: bool,
    pub duration_minutes: i64,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerieRange {
    pub starts_at: DateTime<Utc>,
    pub ends_at: Termination,
    pub timezone: String,
    pub culture: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyParams {
    pub interval: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyParams {
    pub interval: u32,
    pub occurrences: DayMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyParams {
    pub interval: u32,
    pub repeated_by: MonthlyAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyParams {
    pub interval: u32,
}

/// Frequency-specific parameters. Only the bucket matching the frequency exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", content = "params", rename_all = "snake_case")]
pub enum SerieParams {
    Daily(DailyParams),
    Weekly(WeeklyParams),
    Monthly(MonthlyParams),
    Yearly(YearlyParams),
}

impl SerieParams {
    pub fn from_rule(event: &RepeatableEvent) -> Self {
        let interval = event.interval();
        match event.frequency() {
            Frequency::Daily => SerieParams::Daily(DailyParams { interval }),
            Frequency::Weekly => SerieParams::Weekly(WeeklyParams {
                interval,
                occurrences: event
                    .effective_occurs_on()
                    .unwrap_or(DayMask::BUSINESS_DAYS),
            }),
            Frequency::Monthly => SerieParams::Monthly(MonthlyParams {
                interval,
                repeated_by: event
                    .effective_anchor()
                    .unwrap_or(MonthlyAnchor::DayOfTheMonth),
            }),
            Frequency::Yearly => SerieParams::Yearly(YearlyParams { interval }),
        }
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            SerieParams::Daily(_) => Frequency::Daily,
            SerieParams::Weekly(_) => Frequency::Weekly,
            SerieParams::Monthly(_) => Frequency::Monthly,
            SerieParams::Yearly(_) => Frequency::Yearly,
        }
    }

    pub fn interval(&self) -> u32 {
        match self {
            SerieParams::Daily(p) => p.interval,
            SerieParams::Weekly(p) => p.interval,
            SerieParams::Monthly(p) => p.interval,
            SerieParams::Yearly(p) => p.interval,
        }
    }
}

/// Exceptions recorded against a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    pub particular_events: Vec<Event>,
    pub sub_series: Vec<EventSerie>,
}

/// Persisted recurrence definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSerie {
    pub id: String,
    pub base: SerieBase,
    pub range: SerieRange,
    #[serde(flatten)]
    pub params: SerieParams,
    #[serde(default)]
    pub changes: Changes,
    /// Parent slot a forked sub-series took over from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forked_at: Option<DateTime<Utc>>,
}

impl EventSerie {
    pub fn from_rule(event: &RepeatableEvent) -> Self {
        EventSerie {
            id: new_id(),
            base: SerieBase {
                author_id: event.created_by.id().to_string(),
                name: event.name.clone(),
                is_full_day: event.is_full_day,
                duration_minutes: (event.to - event.from).num_minutes(),
                reminders: event.reminders.clone(),
            },
            range: SerieRange {
                starts_at: event.from,
                ends_at: event.termination(),
                timezone: event.created_by.timezone().to_string(),
                culture: event.created_by.culture().to_string(),
            },
            params: SerieParams::from_rule(event),
            changes: Changes::default(),
            forked_at: None,
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.params.frequency()
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.base.duration_minutes)
    }

    pub fn daily_params(&self) -> Option<&DailyParams> {
        match &self.params {
            SerieParams::Daily(p) => Some(p),
            _ => None,
        }
    }

    pub fn weekly_params(&self) -> Option<&WeeklyParams> {
        match &self.params {
            SerieParams::Weekly(p) => Some(p),
            _ => None,
        }
    }

    pub fn monthly_params(&self) -> Option<&MonthlyParams> {
        match &self.params {
            SerieParams::Monthly(p) => Some(p),
            _ => None,
        }
    }

    pub fn yearly_params(&self) -> Option<&YearlyParams> {
        match &self.params {
            SerieParams::Yearly(p) => Some(p),
            _ => None,
        }
    }

    /// Override recorded for the generated occurrence starting at `slot`.
    pub fn override_at(&self, slot: DateTime<Utc>) -> Option<&Event> {
        self.changes
            .particular_events
            .iter()
            .find(|e| e.overrides.as_ref().is_some_and(|o| o.starts_at == slot))
    }

    /// Record an override, replacing any earlier one addressed to the same
    /// event and slot. Returns true when an existing override was replaced.
    pub fn upsert_override(&mut self, mut event: Event) -> bool {
        let existing = self
            .changes
            .particular_events
            .iter_mut()
            .find(|e| e.overrides.is_some() && e.overrides == event.overrides);

        match existing {
            Some(current) => {
                event.id = current.id.clone();
                *current = event;
                true
            }
            None => {
                self.changes.particular_events.push(event);
                false
            }
        }
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author::CatalogValidator;
    use chrono::TimeZone;

    fn author() -> Author {
        Author::new(
            "alice",
            "pl-PL",
            "Europe/Warsaw",
            &CatalogValidator::new(["pl-PL"]),
        )
        .unwrap()
    }

    fn weekly() -> RepeatableEvent {
        let from = Utc.with_ymd_and_hms(2014, 1, 6, 9, 0, 0).unwrap();
        let mut event =
            RepeatableEvent::weekly(author(), "Standup", from, from + Duration::minutes(90));
        event.occurs_at(DayMask::MONDAY | DayMask::WEDNESDAY).unwrap();
        event.ends_after(4);
        event
    }

    #[test]
    fn test_serie_from_rule_populates_only_matching_params() {
        let serie = EventSerie::from_rule(&weekly());

        assert_eq!(serie.frequency(), Frequency::Weekly);
        assert_eq!(
            serie.weekly_params(),
            Some(&WeeklyParams {
                interval: 1,
                occurrences: DayMask::MONDAY | DayMask::WEDNESDAY,
            })
        );
        assert!(serie.daily_params().is_none());
        assert!(serie.monthly_params().is_none());
        assert!(serie.yearly_params().is_none());
        assert_eq!(serie.range.ends_at, Termination::AfterTimes(4));
        assert_eq!(serie.range.timezone, "Europe/Warsaw");
        assert_eq!(serie.range.culture, "pl-PL");
        assert_eq!(serie.base.duration_minutes, 90);
    }

    #[test]
    fn test_serialized_serie_has_single_params_bucket() {
        let serie = EventSerie::from_rule(&weekly());
        let json = serde_json::to_value(&serie).unwrap();

        assert_eq!(json["frequency"], "weekly");
        assert_eq!(json["params"]["occurrences"], 5);
        assert!(json.get("daily_params").is_none());

        let back: EventSerie = serde_json::from_value(json).unwrap();
        assert_eq!(back, serie);
    }

    #[test]
    fn test_persisted_empty_mask_is_rejected() {
        let mut json = serde_json::to_value(EventSerie::from_rule(&weekly())).unwrap();
        json["params"]["occurrences"] = serde_json::json!(0);
        assert!(serde_json::from_value::<EventSerie>(json).is_err());
    }

    #[test]
    fn test_event_range_metrics() {
        let from = Utc.with_ymd_and_hms(2014, 1, 6, 9, 0, 0).unwrap();
        let range = EventRange::new(from, from + Duration::hours(50), &author());
        assert_eq!(range.number_of_days, 2);
        assert_eq!(range.number_of_hours, 50);
    }

    #[test]
    fn test_upsert_override_dedupes_by_slot() {
        let rule = weekly();
        let mut serie = EventSerie::from_rule(&rule);
        let serie_id = serie.id.clone();
        let slot = OccurrenceSlot {
            event_id: "anchor".to_string(),
            starts_at: rule.from,
        };

        assert!(!serie.upsert_override(Event::override_for(&rule, &serie_id, slot.clone())));
        let first_id = serie.changes.particular_events[0].id.clone();

        let mut renamed = rule.clone();
        renamed.name = "Renamed".to_string();
        assert!(serie.upsert_override(Event::override_for(&renamed, &serie_id, slot)));

        assert_eq!(serie.changes.particular_events.len(), 1);
        assert_eq!(serie.changes.particular_events[0].id, first_id);
        assert_eq!(serie.override_at(rule.from).unwrap().name, "Renamed");
    }

    #[test]
    fn test_reminder_requires_positive_value() {
        assert!(Reminder::new(ReminderMethod::Email, ReminderUnit::Hours, 0).is_err());
        let reminder = Reminder::new(ReminderMethod::PopUp, ReminderUnit::Hours, 2).unwrap();
        assert_eq!(reminder.lead_time(), Duration::hours(2));
    }
}
