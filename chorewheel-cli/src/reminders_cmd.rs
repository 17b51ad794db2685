use anyhow::{Context, Result};
use chorewheel_core::{schedule_reminders, NotificationDispatcher, PlanningSnapshot, ScheduleOutcome, SkipReason};
use chrono::Utc;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::load_config;
use crate::notifier::{resolve_platform, DesktopNotifier};
use crate::queue::{PrintDispatcher, QueueDispatcher, ReminderQueue};
use crate::source::{load_snapshot, ApiClient};
use crate::state::PreferenceStore;

#[derive(Subcommand, Debug)]
pub enum RemindersCommand {
    /// Plan due / pre-due / nagging reminders and schedule them in one batch
    Plan {
        /// Chore snapshot JSON; if omitted, chores are fetched from the configured API
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Print the batch instead of scheduling it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// List scheduled reminders, most recently queued first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Fire scheduled reminders that have come due
    Deliver {
        /// Print what would fire without showing notifications
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Max notifications in one run (default from config.reminders.max_deliver_per_run)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Queue summary (due/future/delivered)
    Status,
}

pub async fn run(cmd: RemindersCommand) -> Result<()> {
    match cmd {
        RemindersCommand::Plan { snapshot, dry_run } => plan(snapshot, dry_run).await,
        RemindersCommand::List { limit } => list(limit),
        RemindersCommand::Deliver { dry_run, limit } => deliver(dry_run, limit),
        RemindersCommand::Status => status(),
    }
}

async fn fetch(snapshot: Option<PathBuf>) -> Result<PlanningSnapshot> {
    match snapshot {
        Some(path) => load_snapshot(&path),
        None => {
            let cfg = load_config()?;
            ApiClient::from_config(&cfg.api)?.fetch_snapshot().await
        }
    }
}

async fn plan(snapshot: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let cfg = load_config()?;
    let clock = cfg.clock()?;
    let platform = resolve_platform(cfg.platform_override()?);

    let snap = fetch(snapshot).await?;
    let device = PreferenceStore::open_default()?.device_prefs();
    let now = Utc::now();

    let mut dispatcher: Box<dyn NotificationDispatcher> = if dry_run {
        Box::new(PrintDispatcher::new(platform))
    } else {
        Box::new(QueueDispatcher::new(ReminderQueue::open_default()?, platform, now))
    };

    let outcome = schedule_reminders(dispatcher.as_mut(), &snap, &device, now, &clock)
        .context("scheduling reminders")?;

    match outcome {
        ScheduleOutcome::Scheduled(0) => {
            println!(
                "No reminders to schedule ({} chores checked); pending queue cleared.",
                snap.chores.len()
            )
        }
        ScheduleOutcome::Scheduled(n) if dry_run => println!("[DRY RUN] {n} reminders planned."),
        ScheduleOutcome::Scheduled(n) => println!("Scheduled {n} reminders."),
        ScheduleOutcome::Skipped(SkipReason::PlatformUnsupported) => {
            println!("Skipped: no local notification support here (set [reminders].platform to override).")
        }
        ScheduleOutcome::Skipped(SkipReason::PermissionNotGranted) => {
            println!("Skipped: notifications not granted. Run: chorewheel prefs grant")
        }
    }
    Ok(())
}

fn list(limit: usize) -> Result<()> {
    let q = ReminderQueue::open_default()?;
    let rows = q.entries()?;
    if rows.is_empty() {
        println!("No scheduled reminders in {}", q.scheduled_path().display());
        return Ok(());
    }

    for (i, r) in rows.iter().rev().take(limit).enumerate() {
        println!(
            "{}. [{}] {} | {} at {}",
            i + 1,
            r.reminder.kind().as_str(),
            r.reminder.title,
            r.reminder.body,
            r.reminder.fire_at().to_rfc3339()
        );
    }
    Ok(())
}

fn deliver(dry_run: bool, limit: Option<usize>) -> Result<()> {
    let cfg = load_config()?;
    let resolved_limit = limit.unwrap_or(cfg.reminders.max_deliver_per_run);

    let q = ReminderQueue::open_default()?;
    let due = q.due(Utc::now())?;
    if due.is_empty() {
        println!("No due reminders.");
        return Ok(());
    }

    let notifier = if dry_run {
        None
    } else {
        let found = DesktopNotifier::detect()
            .ok_or_else(|| anyhow::anyhow!("No desktop notifier found (need notify-send or osascript)"))?;
        Some(found)
    };

    let mut fired = 0usize;
    for item in due.into_iter().take(resolved_limit) {
        let Some(notifier) = notifier.as_ref() else {
            println!("[DRY RUN] would show {} | {}", item.reminder.title, item.reminder.body);
            continue;
        };

        match notifier.show(&item.reminder.title, &item.reminder.body) {
            Ok(()) => {
                q.mark_delivered(&item)?;
                fired += 1;
            }
            Err(e) => {
                tracing::error!(key = %item.delivery_key(), "delivery failed: {:#}", e);
                println!("Failed to show {}: {e:#}", item.reminder.title);
            }
        }
    }

    if !dry_run {
        println!("Delivered {fired} reminders.");
    }
    Ok(())
}

fn status() -> Result<()> {
    let q = ReminderQueue::open_default()?;
    let s = q.stats(Utc::now())?;
    println!(
        "Queue: {} total, {} due, {} future, {} delivered ({})",
        s.total,
        s.due,
        s.future,
        s.delivered,
        q.dir().display()
    );
    Ok(())
}
