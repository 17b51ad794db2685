//! Time utilities: rendering due times the way the reader's clock shows them.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::ClockError;

pub const DEFAULT_CLOCK_FORMAT: &str = "%-I:%M %p";

/// Timezone plus strftime pattern used for reminder body text.
#[derive(Debug, Clone, PartialEq)]
pub struct DueClock {
    tz: Tz,
    format: String,
}

impl Default for DueClock {
    fn default() -> Self {
        Self {
            tz: Tz::UTC,
            format: DEFAULT_CLOCK_FORMAT.to_string(),
        }
    }
}

impl DueClock {
    /// Build a clock from an IANA zone name like "America/Chicago" and a strftime pattern.
    pub fn new(tz: &str, format: &str) -> Result<Self, ClockError> {
        let tz: Tz = tz
            .parse()
            .map_err(|_| ClockError::InvalidTimezone(tz.to_string()))?;

        // Reject patterns chrono would panic on at display time.
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(ClockError::InvalidFormat(format.to_string()));
        }

        Ok(Self {
            tz,
            format: format.to_string(),
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Render `at` as local clock time, e.g. "6:30 PM".
    pub fn render(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format(&self.format).to_string()
    }
}
