//! Storage port and an in-memory implementation of it.

use tracing::{debug, warn};

use crate::author::Author;
use crate::bus::{Handler, SeriePrepared};
use crate::error::{CadenceError, CadenceResult};
use crate::model::{Event, EventSerie};

/// Document collections the scheduler and projector work against.
///
/// Additions are staged until `store` commits them. Implementations must make
/// a failed commit leave the committed collections untouched.
pub trait Storage {
    fn authors(&self) -> &[Author];

    fn events(&self) -> &[Event];

    fn event_series(&self) -> &[EventSerie];

    fn add_author(&mut self, author: Author);

    fn add_event(&mut self, event: Event);

    /// Stage a series; on commit it replaces any series with the same id.
    fn put_serie(&mut self, serie: EventSerie);

    fn store(&mut self) -> CadenceResult<()>;

    fn find_event(&self, id: &str) -> Option<&Event> {
        self.events().iter().find(|e| e.id == id)
    }

    fn find_serie(&self, id: &str) -> Option<&EventSerie> {
        self.event_series().iter().find(|s| s.id == id)
    }
}

/// Caller-owned in-process storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    authors: Vec<Author>,
    events: Vec<Event>,
    event_series: Vec<EventSerie>,
    pending_authors: Vec<Author>,
    pending_events: Vec<Event>,
    pending_series: Vec<EventSerie>,
    commits: usize,
    reject_next_commit: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful commits so far.
    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn has_pending(&self) -> bool {
        !(self.pending_authors.is_empty()
            && self.pending_events.is_empty()
            && self.pending_series.is_empty())
    }

    /// Make the next `store` fail and drop what it would have committed.
    pub fn reject_next_commit(&mut self) {
        self.reject_next_commit = true;
    }

    fn discard_pending(&mut self) {
        self.pending_authors.clear();
        self.pending_events.clear();
        self.pending_series.clear();
    }
}

impl Storage for MemoryStorage {
    fn authors(&self) -> &[Author] {
        &self.authors
    }

    fn events(&self) -> &[Event] {
        &self.events
    }

    fn event_series(&self) -> &[EventSerie] {
        &self.event_series
    }

    fn add_author(&mut self, author: Author) {
        self.pending_authors.push(author);
    }

    fn add_event(&mut self, event: Event) {
        self.pending_events.push(event);
    }

    fn put_serie(&mut self, serie: EventSerie) {
        self.pending_series.push(serie);
    }

    fn store(&mut self) -> CadenceResult<()> {
        if self.reject_next_commit {
            self.reject_next_commit = false;
            warn!("Commit rejected, discarding staged documents");
            self.discard_pending();
            return Err(CadenceError::Storage("commit rejected".into()));
        }

        self.authors.append(&mut self.pending_authors);
        self.events.append(&mut self.pending_events);

        for serie in self.pending_series.drain(..) {
            match self.event_series.iter_mut().find(|s| s.id == serie.id) {
                Some(existing) => *existing = serie,
                None => self.event_series.push(serie),
            }
        }

        self.commits += 1;
        Ok(())
    }
}

impl Handler<SeriePrepared> for MemoryStorage {
    fn handle(&mut self, message: SeriePrepared) -> CadenceResult<()> {
        debug!(
            serie_id = %message.serie.id,
            event_id = %message.event.id,
            "Persisting prepared series"
        );
        self.add_event(message.event);
        self.put_serie(message.serie);
        self.store()
    }
}
