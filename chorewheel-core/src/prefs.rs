//! Device-level notification preferences and the eligibility pre-check.

use serde::{Deserialize, Serialize};

/// Global toggles stored on the device. A chore-level flag only counts when the
/// matching device flag allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DevicePreferences {
    /// Whether the OS granted notification permission.
    pub granted: bool,
    pub due_notification: bool,
    pub pre_due_notification: bool,
    /// Opt-out rather than opt-in: a stored record without this field nags.
    pub nagging_notification: bool,
}

impl Default for DevicePreferences {
    fn default() -> Self {
        Self {
            granted: false,
            due_notification: false,
            pre_due_notification: false,
            nagging_notification: true,
        }
    }
}

impl DevicePreferences {
    /// Everything off, permission not granted.
    pub fn disabled() -> Self {
        Self {
            granted: false,
            due_notification: false,
            pre_due_notification: false,
            nagging_notification: false,
        }
    }

    pub fn all_enabled() -> Self {
        Self {
            granted: true,
            due_notification: true,
            pre_due_notification: true,
            nagging_notification: true,
        }
    }

    /// Resolve the stored blob. Absent or unreadable blobs resolve to
    /// [`DevicePreferences::disabled`]; this never fails.
    pub fn from_blob(blob: Option<&str>) -> Self {
        let Some(blob) = blob else {
            return Self::disabled();
        };
        match serde_json::from_str::<Option<Self>>(blob) {
            Ok(Some(prefs)) => prefs,
            Ok(None) => Self::disabled(),
            Err(e) => {
                tracing::warn!("ignoring unreadable device notification preferences: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn to_blob(&self) -> String {
        // A struct of four bools cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Whether the runtime can deliver local notifications at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Native,
    Web,
}

impl Platform {
    pub fn supports_local_notifications(self) -> bool {
        matches!(self, Platform::Native)
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(Platform::Native),
            "web" => Ok(Platform::Web),
            other => Err(format!("unknown platform '{other}' (expected native or web)")),
        }
    }
}

/// Cheap guard evaluated before planning. Never looks at chores.
pub fn can_plan(platform: Platform, prefs: &DevicePreferences) -> bool {
    platform.supports_local_notifications() && prefs.granted
}
