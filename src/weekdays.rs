use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display order, Monday first, as (label, weekday number with Sunday = 1).
const DISPLAY_ORDER: [(&str, u8); 7] = [
    ("M", 2),
    ("T", 3),
    ("W", 4),
    ("T", 5),
    ("F", 6),
    ("S", 7),
    ("S", 1),
];

/// Weekday number in the Sunday = 1 .. Saturday = 7 convention.
pub fn weekday_number(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8 + 1
}

pub fn weekday_name(number: u8) -> &'static str {
    match number {
        1 => "Sunday",
        2 => "Monday",
        3 => "Tuesday",
        4 => "Wednesday",
        5 => "Thursday",
        6 => "Friday",
        7 => "Saturday",
        _ => "?",
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WeekdayToggle {
    pub id: Uuid,
    pub label: String,
    pub weekday_number: u8,
    pub selected: bool,
}

/// Exactly seven toggles covering weekday numbers 1..=7.
///
/// The invariant is checked on decode, so a damaged snapshot is rejected
/// and the caller falls back to [`WeekdayToggles::default`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "Vec<WeekdayToggle>", into = "Vec<WeekdayToggle>")]
pub struct WeekdayToggles([WeekdayToggle; 7]);

impl Default for WeekdayToggles {
    fn default() -> Self {
        Self(DISPLAY_ORDER.map(|(label, weekday_number)| WeekdayToggle {
            id: Uuid::new_v4(),
            label: label.into(),
            weekday_number,
            selected: false,
        }))
    }
}

impl TryFrom<Vec<WeekdayToggle>> for WeekdayToggles {
    type Error = String;

    fn try_from(toggles: Vec<WeekdayToggle>) -> Result<Self, Self::Error> {
        let mut seen = [false; 7];
        for toggle in &toggles {
            let slot = usize::from(toggle.weekday_number)
                .checked_sub(1)
                .filter(|&i| i < 7)
                .ok_or_else(|| format!("weekday number {} out of range", toggle.weekday_number))?;
            if seen[slot] {
                return Err(format!("weekday number {} appears twice", toggle.weekday_number));
            }
            seen[slot] = true;
        }

        if toggles.len() != 7 {
            return Err(format!("expected 7 weekday toggles, found {}", toggles.len()));
        }

        // Labels and order always come from the display table; only the
        // id and the flag are taken from the snapshot.
        let mut slots: [Option<WeekdayToggle>; 7] = Default::default();
        for toggle in toggles {
            let slot = usize::from(toggle.weekday_number) - 1;
            slots[slot] = Some(toggle);
        }
        Ok(Self(DISPLAY_ORDER.map(|(label, weekday_number)| {
            let stored = slots[usize::from(weekday_number) - 1].take();
            WeekdayToggle {
                id: stored.as_ref().map_or_else(Uuid::new_v4, |t| t.id),
                label: label.into(),
                weekday_number,
                selected: stored.is_some_and(|t| t.selected),
            }
        })))
    }
}

impl From<WeekdayToggles> for Vec<WeekdayToggle> {
    fn from(toggles: WeekdayToggles) -> Self {
        toggles.0.into()
    }
}

impl WeekdayToggles {
    pub fn iter(&self) -> impl Iterator<Item = &WeekdayToggle> {
        self.0.iter()
    }

    /// Flips the toggle at a display position. Only the flag changes, so
    /// the weekday set is untouched.
    pub fn toggle(&mut self, index: usize) {
        if let Some(toggle) = self.0.get_mut(index) {
            toggle.selected = !toggle.selected;
        }
    }

    #[cfg(test)]
    pub fn set_selected(&mut self, weekday_number: u8, selected: bool) {
        if let Some(toggle) = self.0.iter_mut().find(|t| t.weekday_number == weekday_number) {
            toggle.selected = selected;
        }
    }

    #[cfg(test)]
    pub fn is_selected(&self, weekday_number: u8) -> bool {
        self.0
            .iter()
            .any(|t| t.weekday_number == weekday_number && t.selected)
    }

    #[cfg(test)]
    pub fn selected_count(&self) -> usize {
        self.0.iter().filter(|t| t.selected).count()
    }

    /// Copy with every toggle off, keeping ids and order.
    pub fn cleared(&self) -> Self {
        let mut copy = self.clone();
        for toggle in &mut copy.0 {
            toggle.selected = false;
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(toggles: &WeekdayToggles) -> Vec<u8> {
        let mut n: Vec<u8> = toggles.iter().map(|t| t.weekday_number).collect();
        n.sort_unstable();
        n
    }

    #[test]
    fn default_covers_every_weekday_monday_first() {
        let toggles = WeekdayToggles::default();
        assert_eq!(numbers(&toggles), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(toggles.iter().next().unwrap().weekday_number, 2);
        assert_eq!(toggles.iter().last().unwrap().weekday_number, 1);
        assert_eq!(toggles.selected_count(), 0);
    }

    #[test]
    fn mutations_keep_the_weekday_set() {
        let mut toggles = WeekdayToggles::default();
        for i in [0, 3, 3, 6, 9, 2] {
            toggles.toggle(i);
            assert_eq!(numbers(&toggles), vec![1, 2, 3, 4, 5, 6, 7]);
        }
        toggles.set_selected(1, true);
        toggles.set_selected(42, true);
        assert_eq!(numbers(&toggles), vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(toggles.is_selected(1));
        assert!(toggles.is_selected(2));
        assert!(!toggles.is_selected(5));
        assert_eq!(numbers(&toggles.cleared()), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut toggles = WeekdayToggles::default();
        toggles.toggle(4);
        let json = serde_json::to_string(&toggles).unwrap();
        let back: WeekdayToggles = serde_json::from_str(&json).unwrap();
        assert_eq!(back, toggles);
    }

    #[test]
    fn snapshot_with_duplicate_or_missing_days_is_rejected() {
        let mut list: Vec<WeekdayToggle> = WeekdayToggles::default().into();
        list[6].weekday_number = 2;
        let json = serde_json::to_string(&list).unwrap();
        assert!(serde_json::from_str::<WeekdayToggles>(&json).is_err());

        list.truncate(6);
        let json = serde_json::to_string(&list).unwrap();
        assert!(serde_json::from_str::<WeekdayToggles>(&json).is_err());
    }

    #[test]
    fn chrono_weekdays_map_sunday_first() {
        assert_eq!(weekday_number(Weekday::Sun), 1);
        assert_eq!(weekday_number(Weekday::Mon), 2);
        assert_eq!(weekday_number(Weekday::Sat), 7);
        assert_eq!(weekday_name(4), "Wednesday");
    }

    #[test]
    fn permuted_snapshot_decodes_in_display_order() {
        let mut list: Vec<WeekdayToggle> = WeekdayToggles::default().into();
        list[0].selected = true;
        let monday_id = list[0].id;
        list.reverse();
        list[6].label = "X".into();
        let json = serde_json::to_string(&list).unwrap();

        let back: WeekdayToggles = serde_json::from_str(&json).unwrap();

        let first = back.iter().next().unwrap();
        assert_eq!((first.label.as_str(), first.weekday_number, first.id), ("M", 2, monday_id));
        assert!(first.selected);
        let labels: String = back.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, "MTWTFSS");
    }
}
