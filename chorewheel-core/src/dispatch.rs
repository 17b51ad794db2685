//! Hand planned reminders to the platform notification dispatcher.
//!
//! The dispatcher is a black box: it gets the whole batch in one call and either
//! takes it or fails. Delivery guarantees are whatever the platform gives.

use chrono::{DateTime, Utc};

use crate::error::DispatchError;
use crate::prefs::{can_plan, DevicePreferences, Platform};
use crate::reminders::{plan_reminders, PlanningSnapshot, ReminderDescriptor};
use crate::time::DueClock;

/// Platform side of local notifications.
pub trait NotificationDispatcher {
    /// What kind of runtime this dispatcher delivers on.
    fn platform(&self) -> Platform;

    /// Schedule one batch. Called at most once per planning run.
    ///
    /// The batch is the full plan for the chore list it was built from, possibly
    /// empty. Reminders pending from an earlier batch are superseded by it.
    fn schedule(&mut self, batch: &[ReminderDescriptor]) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    PlatformUnsupported,
    PermissionNotGranted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Number of reminders handed to the dispatcher.
    Scheduled(usize),
    Skipped(SkipReason),
}

/// Check eligibility, plan, then dispatch everything in a single call.
///
/// An empty plan is still dispatched so stale pending reminders get dropped.
/// Dispatch errors are returned as-is.
pub fn schedule_reminders<D: NotificationDispatcher + ?Sized>(
    dispatcher: &mut D,
    snapshot: &PlanningSnapshot,
    device: &DevicePreferences,
    now: DateTime<Utc>,
    clock: &DueClock,
) -> Result<ScheduleOutcome, DispatchError> {
    let platform = dispatcher.platform();
    if !can_plan(platform, device) {
        let reason = if platform.supports_local_notifications() {
            SkipReason::PermissionNotGranted
        } else {
            SkipReason::PlatformUnsupported
        };
        tracing::info!(?reason, "skipping reminder planning");
        return Ok(ScheduleOutcome::Skipped(reason));
    }

    let batch = plan_reminders(
        &snapshot.chores,
        &snapshot.user,
        &snapshot.roster,
        device,
        now,
        clock,
    );
    tracing::debug!(
        chores = snapshot.chores.len(),
        reminders = batch.len(),
        "planned reminders"
    );

    dispatcher.schedule(&batch)?;
    tracing::info!("scheduled {} reminders", batch.len());
    Ok(ScheduleOutcome::Scheduled(batch.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chore::{Chore, ChoreNotificationPrefs, PerformerRoster, UserProfile};
    use chrono::{Duration, TimeZone};

    #[derive(Debug)]
    struct Recording {
        platform: Platform,
        batches: Vec<Vec<ReminderDescriptor>>,
        fail: bool,
    }

    impl Recording {
        fn on(platform: Platform) -> Self {
            Self { platform, batches: vec![], fail: false }
        }
    }

    impl NotificationDispatcher for Recording {
        fn platform(&self) -> Platform {
            self.platform
        }

        fn schedule(&mut self, batch: &[ReminderDescriptor]) -> Result<(), DispatchError> {
            self.batches.push(batch.to_vec());
            if self.fail {
                return Err(DispatchError::Rejected("quota exceeded".to_string()));
            }
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 15, 0, 0).unwrap()
    }

    fn snapshot(chores: Vec<Chore>) -> PlanningSnapshot {
        PlanningSnapshot {
            chores,
            user: UserProfile { id: 1 },
            roster: PerformerRoster::new(),
        }
    }

    fn two_chores() -> Vec<Chore> {
        vec![
            Chore::new(1, "Dishes", 1)
                .with_due(now() + Duration::hours(2))
                .with_notifications(ChoreNotificationPrefs::all()),
            Chore::new(2, "Trash", 1)
                .with_due(now() - Duration::hours(1))
                .with_notifications(ChoreNotificationPrefs::all()),
        ]
    }

    #[test]
    fn whole_plan_goes_out_in_one_batch() {
        let mut d = Recording::on(Platform::Native);
        let out = schedule_reminders(
            &mut d,
            &snapshot(two_chores()),
            &DevicePreferences::all_enabled(),
            now(),
            &DueClock::default(),
        )
        .unwrap();

        assert_eq!(out, ScheduleOutcome::Scheduled(3));
        assert_eq!(d.batches.len(), 1);
        assert_eq!(d.batches[0].len(), 3);
    }

    #[test]
    fn web_platform_skips_without_dispatch() {
        let mut d = Recording::on(Platform::Web);
        let out = schedule_reminders(
            &mut d,
            &snapshot(two_chores()),
            &DevicePreferences::all_enabled(),
            now(),
            &DueClock::default(),
        )
        .unwrap();

        assert_eq!(out, ScheduleOutcome::Skipped(SkipReason::PlatformUnsupported));
        assert!(d.batches.is_empty());
    }

    #[test]
    fn ungranted_permission_skips_without_dispatch() {
        let mut d = Recording::on(Platform::Native);
        let mut device = DevicePreferences::all_enabled();
        device.granted = false;
        let out = schedule_reminders(&mut d, &snapshot(two_chores()), &device, now(), &DueClock::default())
            .unwrap();

        assert_eq!(out, ScheduleOutcome::Skipped(SkipReason::PermissionNotGranted));
        assert!(d.batches.is_empty());
    }

    #[test]
    fn nothing_eligible_still_dispatches_an_empty_batch() {
        let mut d = Recording::on(Platform::Native);
        let out = schedule_reminders(
            &mut d,
            &snapshot(vec![]),
            &DevicePreferences::all_enabled(),
            now(),
            &DueClock::default(),
        )
        .unwrap();

        assert_eq!(out, ScheduleOutcome::Scheduled(0));
        assert_eq!(d.batches.len(), 1);
        assert!(d.batches[0].is_empty());
    }

    #[test]
    fn muted_chores_clear_the_previous_batch() {
        let mut d = Recording::on(Platform::Native);
        let device = DevicePreferences::all_enabled();
        schedule_reminders(&mut d, &snapshot(two_chores()), &device, now(), &DueClock::default())
            .unwrap();

        let muted: Vec<Chore> = two_chores()
            .into_iter()
            .map(|mut c| {
                c.notification = false;
                c
            })
            .collect();
        let out = schedule_reminders(&mut d, &snapshot(muted), &device, now(), &DueClock::default())
            .unwrap();

        assert_eq!(out, ScheduleOutcome::Scheduled(0));
        assert_eq!(d.batches.len(), 2);
        assert!(d.batches[1].is_empty());
    }

    #[test]
    fn dispatch_failure_surfaces_once() {
        let mut d = Recording::on(Platform::Native);
        d.fail = true;
        let err = schedule_reminders(
            &mut d,
            &snapshot(two_chores()),
            &DevicePreferences::all_enabled(),
            now(),
            &DueClock::default(),
        )
        .unwrap_err();

        assert!(matches!(err, DispatchError::Rejected(_)));
        assert_eq!(d.batches.len(), 1);
    }
}
