//! chorewheel-core: chore reminder policy and the dispatcher seam it feeds.

pub mod chore;
pub mod dispatch;
pub mod error;
pub mod prefs;
pub mod reminders;
pub mod time;

pub use chore::{
    Chore, ChoreId, ChoreNotificationPrefs, Performer, PerformerId, PerformerRoster, UserProfile,
};
pub use dispatch::{schedule_reminders, NotificationDispatcher, ScheduleOutcome, SkipReason};
pub use error::{ClockError, DispatchError, PrefsError};
pub use prefs::{can_plan, DevicePreferences, Platform};
pub use reminders::{
    plan_chore, plan_reminders, PlanningSnapshot, ReminderDescriptor, ReminderExtra, ReminderKind,
    ReminderSchedule, PRE_DUE_LEAD,
};
pub use time::{DueClock, DEFAULT_CLOCK_FORMAT};
