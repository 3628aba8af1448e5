use std::{sync::Arc, time::Instant};

use chrono::NaiveTime;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};

use crate::{
    planner::{ReconcilePass, ReminderMode},
    quotes::QuoteBook,
    settings::{format_time, parse_time, ReminderSettings},
    shake::ShakeDetector,
    store::KeyValueStore,
    ui::{get_theme, Theme},
};

// ============================================================================
// Views & Modes
// ============================================================================

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum View {
    Home,
    Quotes,
    Settings,
    Help,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum QuoteMode {
    Viewing,
    Editing,
    ConfirmingDelete,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum SettingsField {
    RandomEnabled,
    RandomDays,
    WindowStart,
    WindowEnd,
    FixedEnabled,
    FixedDays,
    FixedTime,
}

impl SettingsField {
    pub fn next(self) -> Self {
        match self {
            Self::RandomEnabled => Self::RandomDays,
            Self::RandomDays => Self::WindowStart,
            Self::WindowStart => Self::WindowEnd,
            Self::WindowEnd => Self::FixedEnabled,
            Self::FixedEnabled => Self::FixedDays,
            Self::FixedDays => Self::FixedTime,
            Self::FixedTime => Self::RandomEnabled,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::RandomEnabled => Self::FixedTime,
            Self::RandomDays => Self::RandomEnabled,
            Self::WindowStart => Self::RandomDays,
            Self::WindowEnd => Self::WindowStart,
            Self::FixedEnabled => Self::WindowEnd,
            Self::FixedDays => Self::FixedEnabled,
            Self::FixedTime => Self::FixedDays,
        }
    }

    pub fn mode(self) -> ReminderMode {
        match self {
            Self::RandomEnabled | Self::RandomDays | Self::WindowStart | Self::WindowEnd => {
                ReminderMode::Random
            }
            Self::FixedEnabled | Self::FixedDays | Self::FixedTime => ReminderMode::Fixed,
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    store: Arc<dyn KeyValueStore>,
    pub current_view: View,
    pub theme: Theme,
    pub animation_frame: u8,
    pub quotes: QuoteBook,
    pub displayed_quote: String,
    pub showing_bone: bool,
    shake: ShakeDetector,
    pub quote_mode: QuoteMode,
    pub quote_input: String,
    pub selected_quote: Option<usize>,
    pub settings: ReminderSettings,
    pub settings_field: SettingsField,
    pub day_cursor: usize,
    pub settings_editing: bool,
    pub settings_input: String,
    pub status: Option<String>,
    pending_passes: Vec<ReconcilePass>,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, theme_name: &str) -> Self {
        let quotes = QuoteBook::load(store.as_ref());
        let settings = ReminderSettings::load(store.as_ref(), now_time());
        let selected_quote = quotes.len().checked_sub(1);

        Self {
            store,
            current_view: View::Home,
            theme: get_theme(theme_name),
            animation_frame: 0,
            quotes,
            displayed_quote: String::new(),
            showing_bone: false,
            shake: ShakeDetector::default(),
            quote_mode: QuoteMode::Viewing,
            quote_input: String::new(),
            selected_quote,
            settings,
            settings_field: SettingsField::RandomEnabled,
            day_cursor: 0,
            settings_editing: false,
            settings_input: String::new(),
            status: None,
            pending_passes: Vec::new(),
        }
    }

    pub fn update(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1) % 20;
    }

    /// Reconciliation passes queued by "Finished" on the settings screen.
    pub fn take_passes(&mut self) -> Vec<ReconcilePass> {
        std::mem::take(&mut self.pending_passes)
    }

    pub fn on_shake(&mut self) {
        if !self.showing_bone {
            self.displayed_quote = self.quotes.pick(&mut rand::rng());
        }
        self.showing_bone = true;
    }

    pub fn put_bone_away(&mut self) {
        self.showing_bone = false;
        self.displayed_quote.clear();
    }

    fn open_quotes(&mut self) {
        self.current_view = View::Quotes;
        self.quote_mode = QuoteMode::Viewing;
        if self.selected_quote.is_none_or(|i| i >= self.quotes.len()) {
            self.selected_quote = self.quotes.len().checked_sub(1);
        }
    }

    fn finish_quotes(&mut self) {
        if let Err(e) = self.quotes.save(self.store.as_ref()) {
            warn!("could not save quotes: {e}");
        }
        self.current_view = View::Home;
    }

    fn open_settings(&mut self) {
        self.settings = ReminderSettings::load(self.store.as_ref(), now_time());
        self.settings_field = SettingsField::RandomEnabled;
        self.day_cursor = 0;
        self.settings_editing = false;
        self.status = None;
        self.current_view = View::Settings;
    }

    fn finish_settings(&mut self) {
        if let Err(e) = self.settings.validate() {
            self.status = Some(format!("⚠️  {e}"));
            return;
        }
        if let Err(e) = self.settings.save(self.store.as_ref()) {
            warn!("could not save reminder settings: {e}");
        }
        self.pending_passes.extend(self.settings.passes());
        info!("reminder settings confirmed");
        self.status = None;
        self.current_view = View::Home;
    }

    fn section_enabled(&self) -> bool {
        self.settings.enabled(self.settings_field.mode())
    }
}

fn now_time() -> NaiveTime {
    chrono::Local::now().time()
}

// ============================================================================
// Event Handlers
// ============================================================================

pub fn handle_input(key: KeyEvent, app: &mut AppState) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.quote_mode == QuoteMode::Editing {
        handle_quote_editing(key, app);
        return false;
    }

    if app.settings_editing {
        match key.code {
            KeyCode::Char(c) => app.settings_input.push(c),
            KeyCode::Backspace => { app.settings_input.pop(); }
            KeyCode::Enter => apply_setting(app),
            KeyCode::Esc => {
                app.settings_editing = false;
                app.settings_input.clear();
            }
            _ => {}
        }
        return false;
    }

    if app.quote_mode == QuoteMode::ConfirmingDelete {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(idx) = app.selected_quote {
                    if app.quotes.delete(idx).is_some() {
                        app.selected_quote = if app.quotes.is_empty() {
                            None
                        } else {
                            Some(idx.min(app.quotes.len() - 1))
                        };
                    }
                }
                app.quote_mode = QuoteMode::Viewing;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.quote_mode = QuoteMode::Viewing;
            }
            _ => {}
        }
        return false;
    }

    match app.current_view {
        View::Quotes => handle_quotes_view(key, app),
        View::Settings => handle_settings_view(key, app),
        View::Help => {
            app.current_view = View::Home;
            false
        }
        View::Home => handle_home_view(key, app),
    }
}

fn handle_home_view(key: KeyEvent, app: &mut AppState) -> bool {
    if app.shake.feed(key, Instant::now()) {
        app.on_shake();
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('b') | KeyCode::Backspace => app.put_bone_away(),
        KeyCode::Char('a') | KeyCode::Char('+') => app.open_quotes(),
        KeyCode::Char('g') | KeyCode::Char(',') => app.open_settings(),
        KeyCode::Char('h') | KeyCode::Char('?') => app.current_view = View::Help,
        _ => {}
    }
    false
}

fn handle_quote_editing(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Char(c) => app.quote_input.push(c),
        KeyCode::Backspace => { app.quote_input.pop(); }
        KeyCode::Enter => {
            if let Some(idx) = app.selected_quote {
                app.quotes.edit(idx, app.quote_input.trim());
            }
            app.quote_mode = QuoteMode::Viewing;
            app.quote_input.clear();
        }
        KeyCode::Esc => {
            app.quote_mode = QuoteMode::Viewing;
            app.quote_input.clear();
        }
        _ => {}
    }
}

fn handle_quotes_view(key: KeyEvent, app: &mut AppState) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('f') | KeyCode::Char('q') => app.finish_quotes(),
        KeyCode::Char('a') | KeyCode::Char('n') => {
            app.selected_quote = Some(app.quotes.add());
            app.quote_input.clear();
            app.quote_mode = QuoteMode::Editing;
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(quote) = app.selected_quote.and_then(|i| app.quotes.get(i)) {
                app.quote_input = quote.text.clone();
                app.quote_mode = QuoteMode::Editing;
            }
        }
        KeyCode::Char('d') => {
            if app.selected_quote.is_some() {
                app.quote_mode = QuoteMode::ConfirmingDelete;
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if !app.quotes.is_empty() {
                app.selected_quote = Some(match app.selected_quote {
                    Some(idx) => (idx + 1).min(app.quotes.len() - 1),
                    None => 0,
                });
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if !app.quotes.is_empty() {
                app.selected_quote = Some(match app.selected_quote {
                    Some(idx) => idx.saturating_sub(1),
                    None => app.quotes.len() - 1,
                });
            }
        }
        _ => {}
    }
    false
}

fn handle_settings_view(key: KeyEvent, app: &mut AppState) -> bool {
    match key.code {
        KeyCode::Char('f') => app.finish_settings(),
        KeyCode::Esc | KeyCode::Char('q') => {
            app.status = None;
            app.current_view = View::Home;
        }
        KeyCode::Down | KeyCode::Char('j') => app.settings_field = app.settings_field.next(),
        KeyCode::Up | KeyCode::Char('k') => app.settings_field = app.settings_field.prev(),
        KeyCode::Left | KeyCode::Char('h') => app.day_cursor = app.day_cursor.saturating_sub(1),
        KeyCode::Right | KeyCode::Char('l') => app.day_cursor = (app.day_cursor + 1).min(6),
        KeyCode::Char(' ') => toggle_field(app),
        KeyCode::Enter | KeyCode::Char('e') => start_editing(app),
        _ => {}
    }
    false
}

fn toggle_field(app: &mut AppState) {
    match app.settings_field {
        SettingsField::RandomEnabled => app.settings.random_enabled = !app.settings.random_enabled,
        SettingsField::FixedEnabled => app.settings.fixed_enabled = !app.settings.fixed_enabled,
        SettingsField::RandomDays | SettingsField::FixedDays if app.section_enabled() => {
            let mode = app.settings_field.mode();
            app.settings.days_mut(mode).toggle(app.day_cursor);
        }
        _ => {}
    }
}

fn start_editing(app: &mut AppState) {
    let input = match app.settings_field {
        SettingsField::RandomEnabled
        | SettingsField::FixedEnabled
        | SettingsField::RandomDays
        | SettingsField::FixedDays => {
            toggle_field(app);
            return;
        }
        _ if !app.section_enabled() => return,
        SettingsField::WindowStart => format_time(app.settings.window_start),
        SettingsField::WindowEnd => format_time(app.settings.window_end),
        SettingsField::FixedTime => format_time(app.settings.notification_time),
    };

    app.settings_input = input;
    app.settings_editing = true;
}

fn apply_setting(app: &mut AppState) {
    match parse_time(&app.settings_input) {
        Ok(t) => {
            match app.settings_field {
                SettingsField::WindowStart => app.settings.window_start = t,
                SettingsField::WindowEnd => app.settings.window_end = t,
                SettingsField::FixedTime => app.settings.notification_time = t,
                _ => {}
            }
            app.status = None;
        }
        Err(e) => app.status = Some(format!("⚠️  {e}")),
    }

    app.settings_editing = false;
    app.settings_input.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{planner::TimeSpec, store::MemoryStore};

    fn press(app: &mut AppState, code: KeyCode) -> bool {
        handle_input(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app() -> (Arc<MemoryStore>, AppState) {
        let store = Arc::new(MemoryStore::default());
        let app = AppState::new(store.clone(), "meadow");
        (store, app)
    }

    #[test]
    fn shake_shows_a_quote_until_put_away() {
        let (_, mut app) = app();
        press(&mut app, KeyCode::Char('s'));
        assert!(app.showing_bone);
        let first = app.displayed_quote.clone();
        assert!(app.quotes.quotes().iter().any(|q| q.text == first));

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.displayed_quote, first);

        press(&mut app, KeyCode::Char('b'));
        assert!(!app.showing_bone);
        assert!(app.displayed_quote.is_empty());
    }

    #[test]
    fn shaking_with_no_quotes_shows_empty_text() {
        let (store, _) = app();
        QuoteBook::default().save(store.as_ref()).unwrap();
        let mut app = AppState::new(store, "meadow");

        press(&mut app, KeyCode::Char('s'));
        assert!(app.showing_bone);
        assert_eq!(app.displayed_quote, "");
    }

    #[test]
    fn quotes_are_saved_when_the_editor_closes() {
        let (store, mut app) = app();
        let before = app.quotes.len();

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.current_view, View::Quotes);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.quote_mode, QuoteMode::Editing);
        type_text(&mut app, "Stay pawsitive");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Char('f'));

        assert_eq!(app.current_view, View::Home);
        let saved = QuoteBook::load(store.as_ref());
        assert_eq!(saved.len(), before);
        assert_eq!(saved.quotes().last().unwrap().text, "Stay pawsitive");
    }

    #[test]
    fn finishing_settings_saves_and_queues_both_modes() {
        let (store, mut app) = app();
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.current_view, View::Settings);

        // Enable fixed mode, select Monday and Wednesday, set 07:30.
        for _ in 0..4 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        app.settings_input.clear();
        type_text(&mut app, "07:30");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('f'));

        assert_eq!(app.current_view, View::Home);
        let passes = app.take_passes();
        assert_eq!(passes.len(), 2);
        let fixed = passes.iter().find(|p| p.mode == ReminderMode::Fixed).unwrap();
        assert_eq!(fixed.spec, TimeSpec::Fixed(NaiveTime::from_hms_opt(7, 30, 0).unwrap()));
        assert!(fixed.toggles.is_selected(2));
        assert!(fixed.toggles.is_selected(4));
        assert_eq!(fixed.toggles.selected_count(), 2);
        assert!(app.take_passes().is_empty());

        let saved = ReminderSettings::load(store.as_ref(), now_time());
        assert!(saved.fixed_enabled);
        assert_eq!(saved.fixed_days.selected_count(), 2);
    }

    #[test]
    fn disabled_section_ignores_day_toggles() {
        let (_, mut app) = app();
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.settings.random_days.selected_count(), 0);
    }

    #[test]
    fn empty_window_keeps_settings_open() {
        let (store, mut app) = app();
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        app.settings_input.clear();
        type_text(&mut app, "09:00");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('f'));

        assert_eq!(app.current_view, View::Settings);
        assert!(app.status.is_some());
        assert!(app.take_passes().is_empty());
        assert!(!ReminderSettings::load(store.as_ref(), now_time()).random_enabled);
    }

    #[test]
    fn escaping_settings_discards_the_draft() {
        let (store, mut app) = app();
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.current_view, View::Home);
        assert!(app.take_passes().is_empty());
        assert!(!ReminderSettings::load(store.as_ref(), now_time()).random_enabled);
        press(&mut app, KeyCode::Char('g'));
        assert!(!app.settings.random_enabled);
    }

    #[test]
    fn q_quits_from_home_only() {
        let (_, mut app) = app();
        press(&mut app, KeyCode::Char('a'));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(press(&mut app, KeyCode::Char('q')));
    }
}
