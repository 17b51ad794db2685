//! File-backed reminder queue. Stands in for the OS notification scheduler:
//! `plan` writes batches here, `deliver` fires whatever has come due.

use anyhow::{Context, Result};
use chorewheel_core::{DispatchError, NotificationDispatcher, Platform, ReminderDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::state::ensure_chorewheel_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedReminder {
    pub queued_at_utc: DateTime<Utc>,
    pub reminder: ReminderDescriptor,
}

impl QueuedReminder {
    /// Unique per chore, category and fire time; a rescheduled reminder gets a new key.
    pub fn delivery_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.reminder.id,
            self.reminder.kind().as_str(),
            self.reminder.fire_at().timestamp()
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub total: usize,
    pub due: usize,
    pub future: usize,
    pub delivered: usize,
}

#[derive(Debug, Clone)]
pub struct ReminderQueue {
    dir: PathBuf,
}

impl ReminderQueue {
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(ensure_chorewheel_home()?.join("reminders")))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn scheduled_path(&self) -> PathBuf {
        self.dir.join("scheduled.jsonl")
    }

    pub fn delivered_path(&self) -> PathBuf {
        self.dir.join("delivered.txt")
    }

    /// Queue entries in file order. Lines that do not parse are skipped.
    pub fn entries(&self) -> Result<Vec<QueuedReminder>> {
        let q = self.scheduled_path();
        if !q.exists() {
            return Ok(vec![]);
        }
        let f = fs::File::open(&q).with_context(|| format!("open {}", q.display()))?;
        let mut rows = Vec::new();
        for line in BufReader::new(f).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<QueuedReminder>(&line) {
                Ok(v) => rows.push(v),
                Err(e) => tracing::warn!("skipping unreadable queue line: {}", e),
            }
        }
        Ok(rows)
    }

    pub fn delivered_keys(&self) -> Result<HashSet<String>> {
        let p = self.delivered_path();
        if !p.exists() {
            return Ok(HashSet::new());
        }
        let f = fs::File::open(&p).with_context(|| format!("open {}", p.display()))?;
        Ok(BufReader::new(f).lines().map_while(|l| l.ok()).collect())
    }

    pub fn mark_delivered(&self, entry: &QueuedReminder) -> Result<()> {
        let p = self.delivered_path();
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&p)
            .with_context(|| format!("open {}", p.display()))?;
        writeln!(f, "{}", entry.delivery_key())?;
        Ok(())
    }

    /// Replace everything pending with `batch`, the full plan for the current chore list.
    ///
    /// Delivered marks survive only for reminders the new batch still holds, so a
    /// nag that was already shown does not fire again after a re-plan.
    pub fn replace_pending(
        &self,
        batch: &[ReminderDescriptor],
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let rows: Vec<QueuedReminder> = batch
            .iter()
            .map(|r| QueuedReminder {
                queued_at_utc: now,
                reminder: r.clone(),
            })
            .collect();

        let live: HashSet<String> = rows.iter().map(QueuedReminder::delivery_key).collect();
        let mut kept: Vec<String> = self
            .delivered_keys()?
            .into_iter()
            .filter(|k| live.contains(k))
            .collect();
        kept.sort();

        let dropped = self.entries()?.len().saturating_sub(rows.len());
        if dropped > 0 {
            tracing::debug!(dropped, "re-plan dropped stale queue entries");
        }

        fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;
        let mut lines = Vec::with_capacity(rows.len());
        for r in &rows {
            lines.push(serde_json::to_string(r)?);
        }
        replace_lines(&self.scheduled_path(), &lines)?;
        replace_lines(&self.delivered_path(), &kept)?;
        Ok(rows.len())
    }

    /// Undelivered entries firing at or before `now`, oldest first.
    pub fn due(&self, now: DateTime<Utc>) -> Result<Vec<QueuedReminder>> {
        let delivered = self.delivered_keys()?;
        let mut due: Vec<QueuedReminder> = self
            .entries()?
            .into_iter()
            .filter(|e| e.reminder.fire_at() <= now && !delivered.contains(&e.delivery_key()))
            .collect();
        due.sort_by_key(|e| e.reminder.fire_at());
        Ok(due)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<QueueStats> {
        let delivered = self.delivered_keys()?;
        let mut stats = QueueStats::default();
        for e in self.entries()? {
            stats.total += 1;
            if delivered.contains(&e.delivery_key()) {
                stats.delivered += 1;
            } else if e.reminder.fire_at() <= now {
                stats.due += 1;
            } else {
                stats.future += 1;
            }
        }
        Ok(stats)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Rewrite `path` through a sibling temp file so readers never see half a file.
fn replace_lines(path: &Path, lines: &[String]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut f = fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        for line in lines {
            writeln!(f, "{line}")?;
        }
        f.sync_all()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// Dispatcher that schedules into a [`ReminderQueue`].
pub struct QueueDispatcher {
    queue: ReminderQueue,
    platform: Platform,
    now: DateTime<Utc>,
}

impl QueueDispatcher {
    pub fn new(queue: ReminderQueue, platform: Platform, now: DateTime<Utc>) -> Self {
        Self { queue, platform, now }
    }
}

impl NotificationDispatcher for QueueDispatcher {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn schedule(&mut self, batch: &[ReminderDescriptor]) -> Result<(), DispatchError> {
        self.queue
            .replace_pending(batch, self.now)
            .map(|_| ())
            .map_err(|e| DispatchError::Rejected(format!("{e:#}")))
    }
}

/// Dispatcher for `--dry-run`: prints the batch and keeps nothing.
pub struct PrintDispatcher {
    platform: Platform,
}

impl PrintDispatcher {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl NotificationDispatcher for PrintDispatcher {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn schedule(&mut self, batch: &[ReminderDescriptor]) -> Result<(), DispatchError> {
        if batch.is_empty() {
            println!("[DRY RUN] would clear all pending reminders");
        }
        for r in batch {
            println!(
                "[DRY RUN] would schedule [{}] {} | {} at {}",
                r.kind().as_str(),
                r.title,
                r.body,
                r.fire_at().to_rfc3339()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorewheel_core::{
        plan_reminders, Chore, ChoreNotificationPrefs, DevicePreferences, DueClock,
        PerformerRoster, ReminderKind, UserProfile,
    };
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 19, 12, 0, 0).unwrap()
    }

    fn batch(due: DateTime<Utc>) -> Vec<ReminderDescriptor> {
        plan(vec![Chore::new(1, "Dishes", 1)
            .with_due(due)
            .with_notifications(ChoreNotificationPrefs::all())])
    }

    fn plan(chores: Vec<Chore>) -> Vec<ReminderDescriptor> {
        plan_reminders(
            &chores,
            &UserProfile { id: 1 },
            &PerformerRoster::new(),
            &DevicePreferences::all_enabled(),
            now(),
            &DueClock::default(),
        )
    }

    #[test]
    fn replanning_replaces_same_chore_and_category() {
        let dir = TempDir::new().unwrap();
        let q = ReminderQueue::at(dir.path());

        q.replace_pending(&batch(now() + Duration::hours(2)), now()).unwrap();
        q.replace_pending(&batch(now() + Duration::hours(5)), now()).unwrap();

        let rows = q.entries().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.reminder.fire_at() > now() + Duration::hours(3)));
    }

    #[test]
    fn replanning_drops_chores_no_longer_planned() {
        let dir = TempDir::new().unwrap();
        let q = ReminderQueue::at(dir.path());
        let chore = |id, name: &str| {
            Chore::new(id, name, 1)
                .with_due(now() + Duration::hours(2))
                .with_notifications(ChoreNotificationPrefs::all())
        };

        q.replace_pending(&plan(vec![chore(1, "Dishes"), chore(2, "Trash")]), now())
            .unwrap();
        assert_eq!(q.entries().unwrap().len(), 4);

        q.replace_pending(&plan(vec![chore(2, "Trash")]), now()).unwrap();
        let rows = q.entries().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.reminder.id == 2));

        let later = now() + Duration::hours(3);
        assert!(q.due(later).unwrap().iter().all(|r| r.reminder.id == 2));
    }

    #[test]
    fn empty_batch_clears_the_queue() {
        let dir = TempDir::new().unwrap();
        let mut d = QueueDispatcher::new(ReminderQueue::at(dir.path()), Platform::Native, now());
        d.schedule(&batch(now() + Duration::hours(2))).unwrap();
        d.schedule(&[]).unwrap();

        let q = ReminderQueue::at(dir.path());
        assert!(q.entries().unwrap().is_empty());
        assert!(q.due(now() + Duration::days(1)).unwrap().is_empty());
    }

    #[test]
    fn replanning_prunes_delivered_marks() {
        let dir = TempDir::new().unwrap();
        let q = ReminderQueue::at(dir.path());
        let due = now() - Duration::hours(1);
        q.replace_pending(&batch(due), now()).unwrap();
        let nag = q.due(now()).unwrap();
        assert_eq!(nag.len(), 1);
        q.mark_delivered(&nag[0]).unwrap();

        // Same overdue chore planned again: the nag stays delivered.
        q.replace_pending(&batch(due), now()).unwrap();
        assert!(q.due(now()).unwrap().is_empty());
        assert_eq!(q.delivered_keys().unwrap().len(), 1);

        // Rescheduled chore: the old mark is gone.
        q.replace_pending(&batch(now() + Duration::hours(2)), now()).unwrap();
        assert!(q.delivered_keys().unwrap().is_empty());
    }

    #[test]
    fn due_entries_fire_once() {
        let dir = TempDir::new().unwrap();
        let q = ReminderQueue::at(dir.path());
        q.replace_pending(&batch(now() + Duration::hours(2)), now()).unwrap();

        let later = now() + Duration::minutes(90);
        let due = q.due(later).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].reminder.kind(), ReminderKind::PreDue);

        q.mark_delivered(&due[0]).unwrap();
        assert!(q.due(later).unwrap().is_empty());

        let stats = q.stats(later).unwrap();
        assert_eq!(stats, QueueStats { total: 2, due: 0, future: 1, delivered: 1 });
    }

    #[test]
    fn queue_dispatcher_writes_batch() {
        let dir = TempDir::new().unwrap();
        let mut d = QueueDispatcher::new(ReminderQueue::at(dir.path()), Platform::Native, now());
        d.schedule(&batch(now() + Duration::hours(2))).unwrap();
        assert_eq!(ReminderQueue::at(dir.path()).entries().unwrap().len(), 2);
    }

    #[test]
    fn unreadable_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let q = ReminderQueue::at(dir.path());
        q.replace_pending(&batch(now() + Duration::hours(2)), now()).unwrap();

        let mut f = OpenOptions::new().append(true).open(q.scheduled_path()).unwrap();
        writeln!(f, "not json").unwrap();

        assert_eq!(q.entries().unwrap().len(), 2);
    }
}
