//! Calendar read models.
//!
//! Each query names a calendar owner and a window selector. The projector
//! expands the owner's series and collects their standalone events within the
//! window, then shapes the occurrences for the requested granularity.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::config::CadenceConfig;
use crate::error::CadenceResult;
use crate::expand::{Expander, Occurrence};
use crate::storage::Storage;
use crate::window::Window;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventProjection {
    pub name: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub is_full_day: bool,
}

impl From<&Occurrence> for EventProjection {
    fn from(occurrence: &Occurrence) -> Self {
        EventProjection {
            name: occurrence.name.clone(),
            from: occurrence.from,
            to: occurrence.to,
            is_full_day: occurrence.is_full_day,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyProjection {
    pub daily_results: Vec<EventProjection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekDayEvents {
    /// 0 = Monday
    pub day_in_week: u32,
    pub events: Vec<EventProjection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyProjection {
    pub weekly_results: Vec<WeekDayEvents>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthDayEvents {
    pub day_in_month: u32,
    pub events: Vec<EventProjection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyProjection {
    pub monthly_results: Vec<MonthDayEvents>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub month: u32,
    pub number_of_events: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyProjection {
    pub all_events: usize,
    pub passed_events: usize,
    pub upcoming_events: usize,
    pub monthly_results: Vec<MonthlySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearlyQuery {
    pub owner_id: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyQuery {
    pub owner_id: String,
    pub year: i32,
    pub month: u32,
}

/// ISO 8601 week of `year`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyQuery {
    pub owner_id: String,
    pub year: i32,
    pub week: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyQuery {
    pub owner_id: String,
    pub day: NaiveDate,
}

/// Answers one query shape.
pub trait EventsProjector<Q> {
    type Projection;

    fn project(&self, query: &Q) -> CadenceResult<Self::Projection>;
}

pub struct Projector<'a, S, C = SystemClock> {
    storage: &'a S,
    clock: C,
    expander: Expander,
}

impl<'a, S: Storage> Projector<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Projector {
            storage,
            clock: SystemClock,
            expander: Expander::default(),
        }
    }
}

impl<'a, S: Storage, C: Clock> Projector<'a, S, C> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Projector<'a, S, C2> {
        Projector {
            storage: self.storage,
            clock,
            expander: self.expander,
        }
    }

    pub fn with_config(mut self, config: &CadenceConfig) -> Self {
        self.expander = Expander::new(config.max_occurrences_per_window);
        self
    }

    /// Every occurrence of `owner_id`'s calendar overlapping `window`, by start.
    pub fn occurrences(&self, owner_id: &str, window: &Window) -> CadenceResult<Vec<Occurrence>> {
        let mut occurrences: Vec<Occurrence> = self
            .storage
            .events()
            .iter()
            .filter(|e| e.author_id == owner_id && e.is_standalone())
            .filter(|e| window.intersects(e.range.from, e.range.to))
            .map(Occurrence::standalone)
            .collect();

        for serie in self
            .storage
            .event_series()
            .iter()
            .filter(|s| s.base.author_id == owner_id)
        {
            occurrences.extend(self.expander.expand(serie, window)?);
        }

        occurrences.sort_by_key(|o| o.from);
        Ok(occurrences)
    }

    /// Non-empty per-day groups; an occurrence lands in every day it touches.
    fn by_day(
        &self,
        owner_id: &str,
        window: &Window,
    ) -> CadenceResult<Vec<(NaiveDate, Vec<EventProjection>)>> {
        let occurrences = self.occurrences(owner_id, window)?;

        let mut groups = Vec::new();
        for day in window.days() {
            let day_window = Window::day(day)?;
            let events: Vec<EventProjection> = occurrences
                .iter()
                .filter(|o| day_window.intersects(o.from, o.to))
                .map(EventProjection::from)
                .collect();
            if !events.is_empty() {
                groups.push((day, events));
            }
        }
        Ok(groups)
    }
}

impl<S: Storage, C: Clock> EventsProjector<DailyQuery> for Projector<'_, S, C> {
    type Projection = DailyProjection;

    fn project(&self, query: &DailyQuery) -> CadenceResult<DailyProjection> {
        let window = Window::day(query.day)?;
        let occurrences = self.occurrences(&query.owner_id, &window)?;
        Ok(DailyProjection {
            daily_results: occurrences.iter().map(EventProjection::from).collect(),
        })
    }
}

impl<S: Storage, C: Clock> EventsProjector<WeeklyQuery> for Projector<'_, S, C> {
    type Projection = WeeklyProjection;

    fn project(&self, query: &WeeklyQuery) -> CadenceResult<WeeklyProjection> {
        let window = Window::iso_week(query.year, query.week)?;
        let weekly_results = self
            .by_day(&query.owner_id, &window)?
            .into_iter()
            .map(|(day, events)| WeekDayEvents {
                day_in_week: day.weekday().num_days_from_monday(),
                events,
            })
            .collect();
        Ok(WeeklyProjection { weekly_results })
    }
}

impl<S: Storage, C: Clock> EventsProjector<MonthlyQuery> for Projector<'_, S, C> {
    type Projection = MonthlyProjection;

    fn project(&self, query: &MonthlyQuery) -> CadenceResult<MonthlyProjection> {
        let window = Window::month(query.year, query.month)?;
        let monthly_results = self
            .by_day(&query.owner_id, &window)?
            .into_iter()
            .map(|(day, events)| MonthDayEvents {
                day_in_month: day.day(),
                events,
            })
            .collect();
        Ok(MonthlyProjection { monthly_results })
    }
}

impl<S: Storage, C: Clock> EventsProjector<YearlyQuery> for Projector<'_, S, C> {
    type Projection = YearlyProjection;

    fn project(&self, query: &YearlyQuery) -> CadenceResult<YearlyProjection> {
        let window = Window::year(query.year)?;
        let occurrences = self.occurrences(&query.owner_id, &window)?;
        let now = self.clock.now();

        let passed_events = occurrences.iter().filter(|o| o.to <= now).count();

        let mut per_month: BTreeMap<u32, usize> = BTreeMap::new();
        for occurrence in &occurrences {
            let month = occurrence.from.max(window.start).month();
            *per_month.entry(month).or_default() += 1;
        }

        Ok(YearlyProjection {
            all_events: occurrences.len(),
            passed_events,
            upcoming_events: occurrences.len() - passed_events,
            monthly_results: per_month
                .into_iter()
                .map(|(month, number_of_events)| MonthlySummary {
                    month,
                    number_of_events,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author::{Author, CatalogValidator};
    use crate::clock::FixedClock;
    use crate::model::Event;
    use crate::rule::OneTimeEvent;
    use crate::storage::MemoryStorage;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn author(id: &str) -> Author {
        Author::new(id, "en-US", "UTC", &CatalogValidator::new(["en-US"])).unwrap()
    }

    fn storage_with(events: &[(&str, DateTime<Utc>, DateTime<Utc>)]) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        for (owner, from, to) in events {
            let rule = OneTimeEvent::new(author(owner), "Event", *from, *to);
            storage.add_event(Event::standalone(&rule));
        }
        storage.store().unwrap();
        storage
    }

    #[test]
    fn test_yearly_splits_passed_and_upcoming_by_clock() {
        let storage = storage_with(&[
            ("alice", at(2014, 3, 1, 10), at(2014, 3, 1, 11)),
            ("alice", at(2014, 9, 1, 10), at(2014, 9, 1, 11)),
            ("bob", at(2014, 4, 1, 10), at(2014, 4, 1, 11)),
        ]);
        let projector = Projector::new(&storage).with_clock(FixedClock(at(2014, 6, 1, 0)));

        let yearly = projector
            .project(&YearlyQuery {
                owner_id: "alice".into(),
                year: 2014,
            })
            .unwrap();

        assert_eq!(yearly.all_events, 2);
        assert_eq!(yearly.passed_events, 1);
        assert_eq!(yearly.upcoming_events, 1);
        assert_eq!(
            yearly.monthly_results,
            vec![
                MonthlySummary {
                    month: 3,
                    number_of_events: 1
                },
                MonthlySummary {
                    month: 9,
                    number_of_events: 1
                }
            ]
        );
    }

    #[test]
    fn test_multi_day_event_lands_in_each_day() {
        let from = at(2014, 4, 11, 20);
        let storage = storage_with(&[("alice", from, from + Duration::hours(30))]);
        let projector = Projector::new(&storage);

        let monthly = projector
            .project(&MonthlyQuery {
                owner_id: "alice".into(),
                year: 2014,
                month: 4,
            })
            .unwrap();
        let days: Vec<u32> = monthly.monthly_results.iter().map(|d| d.day_in_month).collect();
        assert_eq!(days, vec![11, 12, 13]);

        let weekly = projector
            .project(&WeeklyQuery {
                owner_id: "alice".into(),
                year: 2014,
                week: 15,
            })
            .unwrap();
        let days: Vec<u32> = weekly.weekly_results.iter().map(|d| d.day_in_week).collect();
        assert_eq!(days, vec![4, 5, 6]);
    }

    #[test]
    fn test_daily_excludes_events_ending_at_midnight() {
        let storage = storage_with(&[("alice", at(2014, 4, 11, 22), at(2014, 4, 12, 0))]);
        let daily = Projector::new(&storage)
            .project(&DailyQuery {
                owner_id: "alice".into(),
                day: NaiveDate::from_ymd_opt(2014, 4, 12).unwrap(),
            })
            .unwrap();
        assert!(daily.daily_results.is_empty());
    }

    #[test]
    fn test_year_boundary_event_counts_in_january() {
        let storage = storage_with(&[("alice", at(2013, 12, 31, 22), at(2014, 1, 1, 2))]);
        let yearly = Projector::new(&storage)
            .with_clock(FixedClock(at(2015, 1, 1, 0)))
            .project(&YearlyQuery {
                owner_id: "alice".into(),
                year: 2014,
            })
            .unwrap();

        assert_eq!(yearly.all_events, 1);
        assert_eq!(yearly.passed_events, 1);
        assert_eq!(yearly.monthly_results[0].month, 1);
    }
}
