//! Turns recurrence rules into persisted series and applies updates to them.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::author::Author;
use crate::bus::{Handler, Message, MessageBus, SeriePrepared, StorageBus};
use crate::config::{CadenceConfig, Delivery};
use crate::error::{CadenceError, CadenceResult};
use crate::expand::Expander;
use crate::model::{Event, EventSerie, OccurrenceSlot};
use crate::rule::{CalendarEvent, OneTimeEvent, RepeatableEvent, Termination};
use crate::storage::Storage;

/// Scope of an edit to a scheduled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStrategy {
    /// One occurrence.
    ParticularEvent,
    /// The addressed occurrence and everything after it.
    FutureEvents,
    /// The whole series.
    AllEvents,
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateStrategy::ParticularEvent => "particular_event",
            UpdateStrategy::FutureEvents => "future_events",
            UpdateStrategy::AllEvents => "all_events",
        };
        write!(f, "{}", name)
    }
}

/// Request to edit the series owning `event_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateScheduledEvent {
    pub strategy: UpdateStrategy,
    pub event_id: String,
    /// Generated occurrence the edit addresses. Defaults to the first one the series generates.
    pub occurrence: Option<DateTime<Utc>>,
    pub changes: RepeatableEvent,
}

impl UpdateScheduledEvent {
    pub fn new(
        strategy: UpdateStrategy,
        event_id: impl Into<String>,
        changes: RepeatableEvent,
    ) -> Self {
        UpdateScheduledEvent {
            strategy,
            event_id: event_id.into(),
            occurrence: None,
            changes,
        }
    }

    pub fn at_occurrence(mut self, slot: DateTime<Utc>) -> Self {
        self.occurrence = Some(slot);
        self
    }
}

/// Identifiers of what `schedule` persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled {
    /// None for one-time events.
    pub serie_id: Option<String>,
    pub event_id: String,
}

pub struct Scheduler<S, B = StorageBus> {
    storage: S,
    bus: B,
    delivery: Delivery,
    strategies: Vec<UpdateStrategy>,
    expander: Expander,
}

impl<S> Scheduler<S>
where
    S: Storage + Handler<SeriePrepared>,
{
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, &CadenceConfig::default())
    }

    pub fn with_config(storage: S, config: &CadenceConfig) -> Self {
        Scheduler::with_bus(storage, StorageBus, config)
    }
}

impl<S, B> Scheduler<S, B>
where
    S: Storage + Handler<SeriePrepared>,
    B: MessageBus<S>,
{
    pub fn with_bus(storage: S, bus: B, config: &CadenceConfig) -> Self {
        Scheduler {
            storage,
            bus,
            delivery: config.delivery,
            strategies: config.update_strategies.clone(),
            expander: Expander::new(config.max_occurrences_per_window),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Persist an author unless one with the same id is already stored.
    pub fn register_author(&mut self, author: &Author) -> CadenceResult<()> {
        if self.storage.authors().iter().any(|a| a.id() == author.id()) {
            return Ok(());
        }
        self.storage.add_author(author.clone());
        self.storage.store()
    }

    /// Derive a series and its anchor event from `rule` and persist them together.
    pub fn schedule(&mut self, rule: &RepeatableEvent) -> CadenceResult<Scheduled> {
        rule.validate()?;

        let serie = EventSerie::from_rule(rule);
        let event = Event::anchor_for(rule, &serie.id);
        let scheduled = Scheduled {
            serie_id: Some(serie.id.clone()),
            event_id: event.id.clone(),
        };

        info!(
            serie_id = %serie.id,
            event_id = %event.id,
            frequency = %serie.frequency(),
            "Scheduling series"
        );

        let prepared = SeriePrepared { serie, event };
        match self.delivery {
            Delivery::Publish => self
                .bus
                .publish(Message::SeriePrepared(prepared), &mut self.storage)?,
            Delivery::Direct => self.storage.handle(prepared)?,
        }

        Ok(scheduled)
    }

    /// Persist a standalone event.
    pub fn schedule_one_time(&mut self, rule: &OneTimeEvent) -> CadenceResult<Scheduled> {
        rule.validate()?;

        let event = Event::standalone(rule);
        let event_id = event.id.clone();
        info!(event_id = %event_id, "Scheduling one-time event");

        self.storage.add_event(event);
        self.storage.store()?;

        Ok(Scheduled {
            serie_id: None,
            event_id,
        })
    }

    pub fn schedule_event(&mut self, event: &CalendarEvent) -> CadenceResult<Scheduled> {
        match event {
            CalendarEvent::OneTime(rule) => self.schedule_one_time(rule),
            CalendarEvent::Repeatable(rule) => self.schedule(rule),
        }
    }

    /// Apply `update` to the series owning its target event, then flush the series.
    pub fn update_scheduled(&mut self, update: &UpdateScheduledEvent) -> CadenceResult<()> {
        if !self.strategies.contains(&update.strategy) {
            return Err(CadenceError::NotImplemented(update.strategy.to_string()));
        }
        update.changes.validate()?;

        let target = self
            .storage
            .find_event(&update.event_id)
            .ok_or_else(|| CadenceError::EventNotFound(update.event_id.clone()))?;
        let serie_id = target
            .event_serie_id
            .clone()
            .ok_or_else(|| CadenceError::InvalidTarget(update.event_id.clone()))?;
        let target_id = target.id.clone();
        let target_from = target.range.from;

        let mut serie = self
            .storage
            .find_serie(&serie_id)
            .cloned()
            .ok_or_else(|| CadenceError::SerieNotFound(serie_id.clone()))?;

        // The anchor's own start is not always generated (e.g. outside the day mask).
        let starts_at = match update.occurrence {
            Some(slot) => slot,
            None => self.expander.first_slot(&serie)?.unwrap_or(target_from),
        };
        let slot = OccurrenceSlot {
            event_id: target_id,
            starts_at,
        };

        match update.strategy {
            UpdateStrategy::ParticularEvent => {
                let owner = self.owner_of(&mut serie, slot.starts_at)?;
                let owner_id = owner.id.clone();
                let replaced = owner.upsert_override(Event::override_for(
                    &update.changes,
                    &owner_id,
                    slot.clone(),
                ));
                debug!(serie_id = %owner_id, replaced, "Recorded override");
            }
            UpdateStrategy::FutureEvents => {
                let owner = self.owner_of(&mut serie, slot.starts_at)?;
                let before = self.expander.count_before(owner, slot.starts_at)?;
                split_at(owner, slot.starts_at, before, &update.changes);
            }
            UpdateStrategy::AllEvents => {
                let mut fresh = EventSerie::from_rule(&update.changes);
                let fork_point = serie
                    .changes
                    .sub_series
                    .iter()
                    .map(|s| s.forked_at.unwrap_or(s.range.starts_at))
                    .min();
                if let Some(cutoff) = fork_point {
                    fresh.range.ends_at = self.ending_before(&fresh, cutoff)?;
                }
                serie.base = fresh.base;
                serie.params = fresh.params;
                serie.range = fresh.range;
            }
        }

        info!(
            serie_id = %serie.id,
            event_id = %update.event_id,
            strategy = %update.strategy,
            slot = %slot.starts_at,
            "Updating scheduled series"
        );

        self.storage.put_serie(serie);
        self.storage.store()
    }

    /// Termination that keeps `serie` from generating anything at or after `cutoff`.
    fn ending_before(
        &self,
        serie: &EventSerie,
        cutoff: DateTime<Utc>,
    ) -> CadenceResult<Termination> {
        let last_second = cutoff - Duration::seconds(1);
        Ok(match serie.range.ends_at {
            Termination::AfterTimes(_) => {
                Termination::AfterTimes(self.expander.count_before(serie, cutoff)?)
            }
            Termination::ParticularDate(d) => Termination::ParticularDate(d.min(last_second)),
            Termination::Never => Termination::ParticularDate(last_second),
        })
    }

    /// The series in `serie`'s tree that generates an occurrence at `slot`.
    fn owner_of<'a>(
        &self,
        serie: &'a mut EventSerie,
        slot: DateTime<Utc>,
    ) -> CadenceResult<&'a mut EventSerie> {
        match self.slot_path(serie, slot)? {
            Some(path) => Ok(path
                .into_iter()
                .fold(serie, |s, i| &mut s.changes.sub_series[i])),
            None => Err(CadenceError::SlotNotInSerie {
                serie_id: serie.id.clone(),
                slot: slot.to_rfc3339(),
            }),
        }
    }

    fn slot_path(&self, serie: &EventSerie, slot: DateTime<Utc>) -> CadenceResult<Option<Vec<usize>>> {
        if self.expander.produces(serie, slot)? {
            return Ok(Some(Vec::new()));
        }
        for (i, sub) in serie.changes.sub_series.iter().enumerate() {
            if let Some(mut path) = self.slot_path(sub, slot)? {
                path.insert(0, i);
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

/// Truncate `serie` just before `slot` and fork the rest into a sub-series
/// built from `changes`. `before` is the number of occurrences preceding `slot`.
fn split_at(serie: &mut EventSerie, slot: DateTime<Utc>, before: u32, changes: &RepeatableEvent) {
    let remaining = match serie.range.ends_at {
        Termination::AfterTimes(n) => Termination::AfterTimes(n.saturating_sub(before)),
        other => other,
    };
    serie.range.ends_at = match serie.range.ends_at {
        Termination::AfterTimes(_) => Termination::AfterTimes(before),
        _ => Termination::ParticularDate(slot - Duration::seconds(1)),
    };

    serie
        .changes
        .particular_events
        .retain(|e| e.overrides.as_ref().is_none_or(|o| o.starts_at < slot));
    serie
        .changes
        .sub_series
        .retain(|s| s.forked_at.unwrap_or(s.range.starts_at) < slot);

    let mut fork = changes.clone();
    if fork.from < slot {
        // Keep the edited time of day but never fork into the past.
        let length = fork.to - fork.from;
        fork.from = slot.date_naive().and_time(fork.from.time()).and_utc();
        fork.to = fork.from + length;
    }
    match remaining {
        Termination::Never => fork.never_ends(),
        Termination::AfterTimes(n) => fork.ends_after(n),
        Termination::ParticularDate(d) => fork.ends_at(d),
    }

    let mut sub = EventSerie::from_rule(&fork);
    sub.forked_at = Some(slot);
    debug!(
        serie_id = %serie.id,
        sub_serie_id = %sub.id,
        kept = before,
        "Split series"
    );
    serie.changes.sub_series.push(sub);
}
