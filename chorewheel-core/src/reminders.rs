//! Reminder policy: project chores into due / pre-due / nagging reminders.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::chore::{Chore, ChoreId, ChoreNotificationPrefs, PerformerId, PerformerRoster, UserProfile};
use crate::prefs::DevicePreferences;
use crate::time::DueClock;

/// How far ahead of the due time the pre-due reminder fires.
pub const PRE_DUE_LEAD: Duration = Duration::hours(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderKind {
    Due,
    PreDue,
    Nagging,
}

impl ReminderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderKind::Due => "due",
            ReminderKind::PreDue => "preDue",
            ReminderKind::Nagging => "nagging",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSchedule {
    pub at: DateTime<Utc>,
}

/// Correlation data returned when the user taps the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderExtra {
    pub chore_id: ChoreId,
    pub kind: ReminderKind,
}

/// One notification request, in the shape the platform dispatcher takes.
///
/// `id` is the chore id, so two reminders for the same chore share it; `extra.kind`
/// tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDescriptor {
    pub id: ChoreId,
    pub title: String,
    pub body: String,
    pub allow_while_idle: bool,
    pub schedule: ReminderSchedule,
    pub extra: ReminderExtra,
}

impl ReminderDescriptor {
    pub fn kind(&self) -> ReminderKind {
        self.extra.kind
    }

    pub fn fire_at(&self) -> DateTime<Utc> {
        self.schedule.at
    }

    pub fn chore_id(&self) -> ChoreId {
        self.extra.chore_id
    }

    fn new(chore: &Chore, kind: ReminderKind, at: DateTime<Utc>, title: String, body: String) -> Self {
        Self {
            id: chore.id,
            title,
            body,
            allow_while_idle: true,
            schedule: ReminderSchedule { at },
            extra: ReminderExtra {
                chore_id: chore.id,
                kind,
            },
        }
    }
}

/// Everything a planning run reads, fetched by the caller.
#[derive(Debug, Clone)]
pub struct PlanningSnapshot {
    pub chores: Vec<Chore>,
    pub user: UserProfile,
    pub roster: PerformerRoster,
}

/// Plan reminders for every chore, in input order (due, pre-due, nagging within a chore).
///
/// Pure over its inputs: `now` is the only clock read.
pub fn plan_reminders(
    chores: &[Chore],
    user: &UserProfile,
    roster: &PerformerRoster,
    device: &DevicePreferences,
    now: DateTime<Utc>,
    clock: &DueClock,
) -> Vec<ReminderDescriptor> {
    chores
        .iter()
        .flat_map(|chore| plan_chore(chore, user, roster, device, now, clock))
        .collect()
}

/// Reminders for a single chore; at most one per category.
pub fn plan_chore(
    chore: &Chore,
    user: &UserProfile,
    roster: &PerformerRoster,
    device: &DevicePreferences,
    now: DateTime<Utc>,
    clock: &DueClock,
) -> Vec<ReminderDescriptor> {
    let Some(due) = chore.next_due_date.filter(|_| chore.notification) else {
        return vec![];
    };

    let wanted = chore.notification_prefs().unwrap_or_else(|e| {
        tracing::warn!(chore_id = chore.id, "treating chore notification settings as off: {}", e);
        ChoreNotificationPrefs::default()
    });

    let until_due = due - now;
    let is_assignee = user.id == chore.assigned_to;
    let mut out = Vec::new();

    if device.due_notification && wanted.due_date && until_due >= Duration::zero() {
        out.push(ReminderDescriptor::new(
            chore,
            ReminderKind::Due,
            due,
            format!("{} is due!", chore.name),
            turn_text(chore.assigned_to, is_assignee, roster),
        ));
    }

    let pre_due_at = due - PRE_DUE_LEAD;
    if device.pre_due_notification
        && wanted.pre_due
        && until_due >= Duration::zero()
        && pre_due_at >= now
        && is_assignee
    {
        out.push(ReminderDescriptor::new(
            chore,
            ReminderKind::PreDue,
            pre_due_at,
            format!("{} is due soon", chore.name),
            format!("{} is due at {}", chore.name, clock.render(due)),
        ));
    }

    if device.nagging_notification && wanted.nagging && until_due <= Duration::zero() && is_assignee {
        out.push(ReminderDescriptor::new(
            chore,
            ReminderKind::Nagging,
            due,
            format!("{} is overdue", chore.name),
            format!("{} was due at {}", chore.name, clock.render(due)),
        ));
    }

    out
}

fn turn_text(assignee: PerformerId, is_assignee: bool, roster: &PerformerRoster) -> String {
    if is_assignee {
        return "It's assigned to you!".to_string();
    }
    match roster.name_of(assignee) {
        Some(name) => format!("It is {}'s turn", name),
        None => format!("It is member #{}'s turn", assignee),
    }
}
