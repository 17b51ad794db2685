use anyhow::Result;
use chorewheel_core::DevicePreferences;
use clap::{Subcommand, ValueEnum};

use crate::state::PreferenceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(t: Toggle) -> bool {
        t == Toggle::On
    }
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// Show the device notification preferences as planning will see them
    Show,

    /// Change device-level reminder categories
    Set {
        #[arg(long, value_enum)]
        due: Option<Toggle>,

        #[arg(long, value_enum)]
        pre_due: Option<Toggle>,

        #[arg(long, value_enum)]
        nagging: Option<Toggle>,
    },

    /// Record that notification permission was granted
    Grant,

    /// Record that notification permission was withdrawn
    Revoke,
}

pub fn run(cmd: PrefsCommand) -> Result<()> {
    let store = PreferenceStore::open_default()?;
    let mut prefs = store.device_prefs();

    match cmd {
        PrefsCommand::Show => {
            print_prefs(&prefs);
            return Ok(());
        }
        PrefsCommand::Set { due, pre_due, nagging } => {
            apply(&mut prefs, due, pre_due, nagging);
        }
        PrefsCommand::Grant => prefs.granted = true,
        PrefsCommand::Revoke => prefs.granted = false,
    }

    store.save_device_prefs(&prefs)?;
    println!("Saved {}\n", store.path().display());
    print_prefs(&prefs);
    Ok(())
}

fn apply(
    prefs: &mut DevicePreferences,
    due: Option<Toggle>,
    pre_due: Option<Toggle>,
    nagging: Option<Toggle>,
) {
    if let Some(t) = due {
        prefs.due_notification = t.into();
    }
    if let Some(t) = pre_due {
        prefs.pre_due_notification = t.into();
    }
    if let Some(t) = nagging {
        prefs.nagging_notification = t.into();
    }
}

fn print_prefs(prefs: &DevicePreferences) {
    let flag = |b: bool| if b { "on" } else { "off" };
    println!("- permission granted: {}", if prefs.granted { "yes" } else { "no" });
    println!("- due reminders: {}", flag(prefs.due_notification));
    println!("- pre-due reminders: {}", flag(prefs.pre_due_notification));
    println!("- nagging reminders: {}", flag(prefs.nagging_notification));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_only_touches_named_flags() {
        let mut prefs = DevicePreferences::disabled();
        apply(&mut prefs, Some(Toggle::On), None, Some(Toggle::Off));
        assert!(prefs.due_notification);
        assert!(!prefs.pre_due_notification);
        assert!(!prefs.nagging_notification);
        assert!(!prefs.granted);
    }
}
