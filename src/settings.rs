use chrono::{NaiveTime, Timelike};
use log::info;

use crate::{
    error::{BeagleError, Result},
    planner::{ReconcilePass, ReminderMode, TimeSpec, TimeWindow},
    store::{self, KeyValueStore},
    weekdays::WeekdayToggles,
};

const RANDOM_ENABLED_KEY: &str = "randomToggle";
const FIXED_ENABLED_KEY: &str = "setTimeToggle";
const NOTIFICATION_TIME_KEY: &str = "notificationTime";
const WINDOW_START_KEY: &str = "randomStartTime";
const WINDOW_END_KEY: &str = "randomEndTime";
const RANDOM_DAYS_KEY: &str = "randomDayToggles";
const FIXED_DAYS_KEY: &str = "setDayToggles";

pub fn default_window_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

pub fn default_window_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default()
}

pub fn parse_time(input: &str) -> Result<NaiveTime> {
    let s = input.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H%M"))
        .map_err(|_| BeagleError::InvalidTime(s.to_string()))
}

pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Reminder configuration as edited on the settings screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ReminderSettings {
    pub random_enabled: bool,
    pub fixed_enabled: bool,
    pub notification_time: NaiveTime,
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub random_days: WeekdayToggles,
    pub fixed_days: WeekdayToggles,
}

impl ReminderSettings {
    /// `now` seeds the fixed notification time when none was ever saved.
    pub fn load(store: &dyn KeyValueStore, now: NaiveTime) -> Self {
        let minute = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now);

        Self {
            random_enabled: store::load_or_default(store, RANDOM_ENABLED_KEY),
            fixed_enabled: store::load_or_default(store, FIXED_ENABLED_KEY),
            notification_time: store::load(store, NOTIFICATION_TIME_KEY).ok().unwrap_or(minute),
            window_start: store::load(store, WINDOW_START_KEY)
                .ok()
                .unwrap_or_else(default_window_start),
            window_end: store::load(store, WINDOW_END_KEY)
                .ok()
                .unwrap_or_else(default_window_end),
            random_days: store::load_or_default(store, RANDOM_DAYS_KEY),
            fixed_days: store::load_or_default(store, FIXED_DAYS_KEY),
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store::save(store, RANDOM_ENABLED_KEY, &self.random_enabled)?;
        store::save(store, FIXED_ENABLED_KEY, &self.fixed_enabled)?;
        store::save(store, RANDOM_DAYS_KEY, &self.random_days)?;
        store::save(store, FIXED_DAYS_KEY, &self.fixed_days)?;
        store::save(store, NOTIFICATION_TIME_KEY, &self.notification_time)?;
        store::save(store, WINDOW_START_KEY, &self.window_start)?;
        store::save(store, WINDOW_END_KEY, &self.window_end)?;
        info!(
            "saved reminder settings (random: {}, fixed: {})",
            self.random_enabled, self.fixed_enabled
        );
        Ok(())
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.window_start, self.window_end)
    }

    pub fn validate(&self) -> Result<()> {
        if self.random_enabled {
            self.window().validate()?;
        }
        Ok(())
    }

    pub fn days(&self, mode: ReminderMode) -> &WeekdayToggles {
        match mode {
            ReminderMode::Random => &self.random_days,
            ReminderMode::Fixed => &self.fixed_days,
        }
    }

    pub fn days_mut(&mut self, mode: ReminderMode) -> &mut WeekdayToggles {
        match mode {
            ReminderMode::Random => &mut self.random_days,
            ReminderMode::Fixed => &mut self.fixed_days,
        }
    }

    pub fn enabled(&self, mode: ReminderMode) -> bool {
        match mode {
            ReminderMode::Random => self.random_enabled,
            ReminderMode::Fixed => self.fixed_enabled,
        }
    }

    /// One snapshot per mode. A mode that is switched off reconciles as if
    /// no day were selected, which removes its reminders.
    pub fn passes(&self) -> [ReconcilePass; 2] {
        [ReminderMode::Random, ReminderMode::Fixed].map(|mode| {
            let days = self.days(mode);
            ReconcilePass {
                mode,
                spec: match mode {
                    ReminderMode::Random => TimeSpec::Window(self.window()),
                    ReminderMode::Fixed => TimeSpec::Fixed(self.notification_time),
                },
                toggles: if self.enabled(mode) { days.clone() } else { days.cleared() },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn fresh_store_uses_documented_defaults() {
        let store = MemoryStore::default();
        let s = ReminderSettings::load(&store, NaiveTime::from_hms_opt(14, 23, 51).unwrap());

        assert!(!s.random_enabled);
        assert!(!s.fixed_enabled);
        assert_eq!(s.notification_time, at(14, 23));
        assert_eq!(s.window_start, at(9, 0));
        assert_eq!(s.window_end, at(17, 0));
        assert_eq!(s.random_days.selected_count(), 0);
    }

    #[test]
    fn saved_settings_load_back() {
        let store = MemoryStore::default();
        let mut s = ReminderSettings::load(&store, at(8, 0));
        s.fixed_enabled = true;
        s.notification_time = at(6, 45);
        s.fixed_days.toggle(0);
        s.window_end = at(12, 0);
        s.save(&store).unwrap();

        assert_eq!(ReminderSettings::load(&store, at(23, 59)), s);
    }

    #[test]
    fn damaged_toggle_snapshot_falls_back_to_defaults() {
        let store = MemoryStore::default();
        store.set(RANDOM_DAYS_KEY, br#"[{"id":"x","label":"M","weekday_number":9,"selected":true}]"#).unwrap();

        let s = ReminderSettings::load(&store, at(8, 0));
        assert_eq!(s.random_days.iter().count(), 7);
        assert_eq!(s.random_days.selected_count(), 0);
    }

    #[test]
    fn disabled_mode_reconciles_with_nothing_selected() {
        let store = MemoryStore::default();
        let mut s = ReminderSettings::load(&store, at(8, 0));
        s.random_days.toggle(1);
        s.fixed_days.toggle(2);
        s.fixed_enabled = true;

        let [random, fixed] = s.passes();
        assert_eq!(random.mode, ReminderMode::Random);
        assert_eq!(random.toggles.selected_count(), 0);
        assert_eq!(fixed.toggles.selected_count(), 1);
        assert_eq!(fixed.spec, TimeSpec::Fixed(at(8, 0)));
    }

    #[test]
    fn empty_window_only_matters_when_random_is_on() {
        let store = MemoryStore::default();
        let mut s = ReminderSettings::load(&store, at(8, 0));
        s.window_end = s.window_start;
        assert!(s.validate().is_ok());

        s.random_enabled = true;
        assert!(s.validate().is_err());
    }

    #[test]
    fn parses_clock_input() {
        assert_eq!(parse_time(" 07:05 ").unwrap(), at(7, 5));
        assert_eq!(parse_time("1830").unwrap(), at(18, 30));
        assert!(parse_time("25:00").is_err());
        assert_eq!(format_time(at(9, 3)), "09:03");
    }
}
