//! Chore records and the people they are assigned to.
//!
//! These are snapshots handed to the planner by whoever fetched them; nothing in
//! this crate mutates them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PrefsError;

pub type ChoreId = i64;
pub type PerformerId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chore {
    pub id: ChoreId,
    pub name: String,

    /// `None` for chores that are not scheduled.
    #[serde(default)]
    pub next_due_date: Option<DateTime<Utc>>,

    /// Master switch for every reminder category on this chore.
    #[serde(default)]
    pub notification: bool,

    /// Serialized [`ChoreNotificationPrefs`], as stored by the host app.
    #[serde(default)]
    pub notification_metadata: Option<String>,

    pub assigned_to: PerformerId,
}

impl Chore {
    pub fn new(id: ChoreId, name: impl Into<String>, assigned_to: PerformerId) -> Self {
        Self {
            id,
            name: name.into(),
            next_due_date: None,
            notification: false,
            notification_metadata: None,
            assigned_to,
        }
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.next_due_date = Some(due);
        self
    }

    /// Turn the master switch on and store `prefs` as the chore's metadata.
    pub fn with_notifications(mut self, prefs: ChoreNotificationPrefs) -> Self {
        self.notification = true;
        self.notification_metadata = serde_json::to_string(&prefs).ok();
        self
    }

    pub fn with_raw_metadata(mut self, raw: impl Into<String>) -> Self {
        self.notification_metadata = Some(raw.into());
        self
    }

    /// Decode this chore's per-category preferences.
    pub fn notification_prefs(&self) -> Result<ChoreNotificationPrefs, PrefsError> {
        ChoreNotificationPrefs::parse(self.notification_metadata.as_deref())
    }
}

/// Which reminder categories the chore owner asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoreNotificationPrefs {
    pub due_date: bool,
    #[serde(alias = "predue")]
    pub pre_due: bool,
    pub nagging: bool,
}

impl ChoreNotificationPrefs {
    pub fn all() -> Self {
        Self {
            due_date: true,
            pre_due: true,
            nagging: true,
        }
    }

    /// Parse the stored metadata. Missing metadata (or JSON `null`) means nothing is enabled;
    /// anything else that does not decode is an error.
    pub fn parse(raw: Option<&str>) -> Result<Self, PrefsError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };
        let parsed: Option<Self> =
            serde_json::from_str(raw).map_err(|e| PrefsError::Malformed(e.to_string()))?;
        Ok(parsed.unwrap_or_default())
    }
}

/// The signed-in actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: PerformerId,
}

/// A circle member as the API lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performer {
    pub user_id: PerformerId,
    pub display_name: String,
}

/// Performer id to display name, used for "whose turn" text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformerRoster {
    names: HashMap<PerformerId, String>,
}

impl PerformerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: PerformerId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn name_of(&self, id: PerformerId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<Performer> for PerformerRoster {
    fn from_iter<I: IntoIterator<Item = Performer>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|p| (p.user_id, p.display_name))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metadata_enables_nothing() {
        assert_eq!(ChoreNotificationPrefs::parse(None).unwrap(), ChoreNotificationPrefs::default());
        assert_eq!(ChoreNotificationPrefs::parse(Some("  ")).unwrap(), ChoreNotificationPrefs::default());
        assert_eq!(ChoreNotificationPrefs::parse(Some("null")).unwrap(), ChoreNotificationPrefs::default());
    }

    #[test]
    fn accepts_legacy_predue_key_and_ignores_extras() {
        let p = ChoreNotificationPrefs::parse(Some(
            r#"{"dueDate":true,"predue":true,"circleGroup":false}"#,
        ))
        .unwrap();
        assert!(p.due_date);
        assert!(p.pre_due);
        assert!(!p.nagging);
    }

    #[test]
    fn garbage_metadata_is_an_error() {
        assert!(ChoreNotificationPrefs::parse(Some("{not json")).is_err());
        assert!(ChoreNotificationPrefs::parse(Some("true")).is_err());
    }

    #[test]
    fn chore_reads_api_shape() {
        let json = r#"{
            "id": 7,
            "name": "Take out trash",
            "nextDueDate": "2026-03-01T18:00:00Z",
            "notification": true,
            "notificationMetadata": "{\"dueDate\":true,\"nagging\":true}",
            "assignedTo": 2
        }"#;
        let c: Chore = serde_json::from_str(json).unwrap();
        assert_eq!(c.id, 7);
        assert_eq!(c.assigned_to, 2);
        assert!(c.next_due_date.is_some());
        let p = c.notification_prefs().unwrap();
        assert!(p.due_date && p.nagging && !p.pre_due);
    }

    #[test]
    fn roster_from_members() {
        let roster: PerformerRoster = vec![
            Performer { user_id: 1, display_name: "Ann".into() },
            Performer { user_id: 2, display_name: "Bo".into() },
        ]
        .into_iter()
        .collect();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.name_of(2), Some("Bo"));
        assert_eq!(roster.name_of(3), None);
    }
}
