//! Recurring event scheduling and calendar projections.
//!
//! A [`RepeatableEvent`] is turned into a persisted [`EventSerie`] by the
//! [`Scheduler`], edited through [`UpdateScheduledEvent`]s, and read back as
//! yearly, monthly, weekly or daily views by the [`Projector`].

pub mod author;
pub mod bus;
pub mod clock;
pub mod config;
pub mod error;
pub mod expand;
pub mod model;
pub mod projector;
pub mod rule;
pub mod scheduler;
pub mod storage;
pub mod window;

pub use author::{Author, CatalogValidator, LocaleValidator};
pub use bus::{Handler, Message, MessageBus, SeriePrepared, StorageBus};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CadenceConfig, Delivery};
pub use error::{CadenceError, CadenceResult};
pub use expand::{Expander, Occurrence};
pub use model::{Event, EventSerie, OccurrenceSlot, Reminder, ReminderMethod, ReminderUnit};
pub use projector::{
    DailyQuery, EventsProjector, MonthlyQuery, Projector, WeeklyQuery, YearlyQuery,
};
pub use rule::{
    BusinessDays, CalendarEvent, DayMask, Frequency, MonthlyAnchor, OneTimeEvent,
    RepeatableEvent, Termination,
};
pub use scheduler::{Scheduled, Scheduler, UpdateScheduledEvent, UpdateStrategy};
pub use storage::{MemoryStorage, Storage};
pub use window::Window;
