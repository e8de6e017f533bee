//! Series expansion.
//!
//! Expands a persisted series into the concrete occurrences that overlap a
//! query window, substituting overrides and recursing into sub-series.
//! Expansion is always bounded by the window, so series that never end are
//! never generated in full.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use rrule::RRuleSet;
use tracing::warn;

use crate::error::{CadenceError, CadenceResult};
use crate::model::{Event, EventSerie, SerieParams};
use crate::rule::{MonthlyAnchor, Termination};
use crate::window::Window;

/// Default cap on occurrences generated for one series in one window.
pub const DEFAULT_OCCURRENCE_LIMIT: u16 = 2048;

/// Page size used when walking a series from its start.
const PAGE: u16 = u16::MAX;

/// One concrete occurrence, generated or overridden, or a standalone event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub serie_id: Option<String>,
    /// Generated start this occurrence fills; equals `from` unless overridden.
    pub slot: DateTime<Utc>,
    pub name: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub is_full_day: bool,
}

impl Occurrence {
    fn generated(serie: &EventSerie, slot: DateTime<Utc>) -> Self {
        Occurrence {
            serie_id: Some(serie.id.clone()),
            slot,
            name: serie.base.name.clone(),
            from: slot,
            to: slot + serie.duration(),
            is_full_day: serie.base.is_full_day,
        }
    }

    fn overridden(serie: &EventSerie, slot: DateTime<Utc>, event: &Event) -> Self {
        Occurrence {
            serie_id: Some(serie.id.clone()),
            slot,
            name: event.name.clone(),
            from: event.range.from,
            to: event.range.to,
            is_full_day: event.is_full_day,
        }
    }

    pub fn standalone(event: &Event) -> Self {
        Occurrence {
            serie_id: None,
            slot: event.range.from,
            name: event.name.clone(),
            from: event.range.from,
            to: event.range.to,
            is_full_day: event.is_full_day,
        }
    }
}

/// Expands series within windows, capping the output per series.
#[derive(Debug, Clone, Copy)]
pub struct Expander {
    limit: u16,
}

impl Default for Expander {
    fn default() -> Self {
        Expander {
            limit: DEFAULT_OCCURRENCE_LIMIT,
        }
    }
}

impl Expander {
    pub fn new(limit: u16) -> Self {
        Expander { limit }
    }

    /// Occurrences of `serie` (and its sub-series) overlapping `window`, by start.
    pub fn expand(&self, serie: &EventSerie, window: &Window) -> CadenceResult<Vec<Occurrence>> {
        // Look back far enough to catch occurrences that started earlier but still run.
        let lookback = serie.duration().max(Duration::zero());
        let slots = generated_slots(serie, window.start - lookback, Some(window.end), self.limit)?;
        if slots.len() >= usize::from(self.limit) {
            warn!(
                serie_id = %serie.id,
                limit = self.limit,
                "Occurrence limit reached, expansion truncated"
            );
        }

        let mut occurrences: Vec<Occurrence> = slots
            .into_iter()
            .filter(|slot| serie.override_at(*slot).is_none())
            .map(|slot| Occurrence::generated(serie, slot))
            .filter(|o| window.intersects(o.from, o.to))
            .collect();

        for event in &serie.changes.particular_events {
            let Some(slot) = event.overrides.as_ref().map(|o| o.starts_at) else {
                continue;
            };
            // Only the first override recorded for a slot counts.
            let winner = serie.override_at(slot).is_some_and(|e| std::ptr::eq(e, event));
            if !winner || !window.intersects(event.range.from, event.range.to) {
                continue;
            }
            // Overrides of slots the series no longer produces (e.g. after a split) are dropped.
            if self.produces(serie, slot)? {
                occurrences.push(Occurrence::overridden(serie, slot, event));
            }
        }

        for sub in &serie.changes.sub_series {
            occurrences.extend(self.expand(sub, window)?);
        }

        occurrences.sort_by_key(|o| o.from);
        Ok(occurrences)
    }

    /// Whether the series generates an occurrence starting exactly at `slot`.
    pub fn produces(&self, serie: &EventSerie, slot: DateTime<Utc>) -> CadenceResult<bool> {
        let slots = generated_slots(serie, slot, Some(slot + Duration::seconds(1)), 1)?;
        Ok(slots.contains(&slot))
    }

    /// Earliest occurrence generated anywhere in the series tree.
    pub fn first_slot(&self, serie: &EventSerie) -> CadenceResult<Option<DateTime<Utc>>> {
        let mut first = generated_slots(serie, serie.range.starts_at, None, 1)?
            .into_iter()
            .next();
        for sub in &serie.changes.sub_series {
            if let Some(candidate) = self.first_slot(sub)? {
                first = Some(first.map_or(candidate, |f| f.min(candidate)));
            }
        }
        Ok(first)
    }

    /// Number of occurrences the series generates before `slot`. Not capped.
    pub fn count_before(&self, serie: &EventSerie, slot: DateTime<Utc>) -> CadenceResult<u32> {
        let mut count = 0u32;
        let mut cursor = serie.range.starts_at;
        while cursor < slot {
            let page = generated_slots(serie, cursor, Some(slot), PAGE)?;
            count += page.len() as u32;
            match page.last() {
                Some(last) => cursor = *last + Duration::seconds(1),
                None => break,
            }
        }
        Ok(count)
    }
}

/// Generated starts in `[start, end)`, ignoring overrides and sub-series.
/// Without an `end` the walk stops at `limit` occurrences.
fn generated_slots(
    serie: &EventSerie,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    limit: u16,
) -> CadenceResult<Vec<DateTime<Utc>>> {
    let Some(rrule_str) = build_rrule_string(serie) else {
        return Ok(Vec::new());
    };

    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        CadenceError::Recurrence(format!(
            "Failed to build recurrence for series '{}': {}",
            serie.id, e
        ))
    })?;

    // Widen the lower bound by a second; the bounds are re-applied exactly below.
    let tz: rrule::Tz = Utc.into();
    let mut rrule_set = rrule_set.after((start - Duration::seconds(1)).with_timezone(&tz));
    if let Some(end) = end {
        rrule_set = rrule_set.before(end.with_timezone(&tz));
    }

    let result = rrule_set.all(limit);

    Ok(result
        .dates
        .iter()
        .map(|dt| dt.with_timezone(&Utc))
        .filter(|dt| *dt >= start && end.is_none_or(|end| *dt < end))
        .collect())
}

/// Build an iCalendar-format recurrence for the rrule crate parser.
/// Returns None when the termination policy leaves nothing to generate.
fn build_rrule_string(serie: &EventSerie) -> Option<String> {
    let start = serie.range.starts_at;

    let termination = match serie.range.ends_at {
        Termination::Never => String::new(),
        Termination::AfterTimes(0) => return None,
        Termination::AfterTimes(n) => format!(";COUNT={}", n),
        Termination::ParticularDate(d) if d < start => return None,
        Termination::ParticularDate(d) => format!(";UNTIL={}", ics_timestamp(&d)),
    };

    // An interval of 0 is accepted for weekly rules and means every week.
    let interval = serie.params.interval().max(1);

    let rule = match serie.params {
        SerieParams::Daily(_) => format!("FREQ=DAILY;INTERVAL={}", interval),
        SerieParams::Weekly(params) => {
            let days: Vec<&str> = params.occurrences.days().map(weekday_code).collect();
            format!("FREQ=WEEKLY;INTERVAL={};BYDAY={}", interval, days.join(","))
        }
        SerieParams::Monthly(params) => match params.repeated_by {
            MonthlyAnchor::DayOfTheMonth => {
                format!("FREQ=MONTHLY;INTERVAL={};BYMONTHDAY={}", interval, start.day())
            }
            MonthlyAnchor::DayOfTheWeek => {
                let nth = (start.day() - 1) / 7 + 1;
                format!(
                    "FREQ=MONTHLY;INTERVAL={};BYDAY={}{}",
                    interval,
                    nth,
                    weekday_code(start.weekday())
                )
            }
        },
        SerieParams::Yearly(_) => format!("FREQ=YEARLY;INTERVAL={}", interval),
    };

    Some(format!(
        "DTSTART:{}\nRRULE:{}{}",
        ics_timestamp(&start),
        rule,
        termination
    ))
}

fn ics_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
