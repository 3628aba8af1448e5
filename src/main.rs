mod app;
mod config;
mod dispatch;
mod error;
mod planner;
mod quotes;
mod scheduler;
mod service;
mod settings;
mod shake;
mod store;
mod ui;
mod weekdays;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::prelude::*;
use std::{
    fs::OpenOptions,
    io,
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    app::{handle_input, AppState},
    config::{Args, Command, Config},
    quotes::QuoteBook,
    scheduler::{LocalScheduler, NotificationScheduler},
    service::ReminderService,
    store::{JsonFileStore, KeyValueStore},
    ui::{render_ui, THEMES},
    weekdays::weekday_name,
};

// ============================================================================
// Type Aliases & Constants
// ============================================================================

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
const TICK_RATE: Duration = Duration::from_millis(50);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
const LOG_FILE: &str = "beagle.log";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let files = JsonFileStore::open(&args.data_dir)?;
    init_logging(args.command.is_none(), files.dir())?;

    let store: Arc<dyn KeyValueStore> = Arc::new(files);
    let mut config = Config::load(store.as_ref());
    if store.get("config").is_none() {
        // Leave an editable config.json behind on first run.
        config.save(store.as_ref())?;
    }
    config.apply(&args);
    if !THEMES.contains(&config.theme.as_str()) {
        warn!("unknown theme '{}', using the default", config.theme);
    }

    let scheduler: Arc<dyn NotificationScheduler> =
        Arc::new(LocalScheduler::new(Arc::clone(&store), config.notifications_enabled));

    match args.command {
        Some(Command::Quote) => {
            println!("{}", QuoteBook::load(store.as_ref()).pick(&mut rand::rng()));
            Ok(())
        }
        Some(Command::Reminders) => list_reminders(scheduler.as_ref()).await,
        Some(Command::Daemon) => run_daemon(store, scheduler, &config).await,
        None => run_tui(store, scheduler, &config).await,
    }
}

fn init_logging(to_file: bool, dir: &Path) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    // The terminal belongs to the UI, so the TUI logs to a file.
    if to_file {
        let file = OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

async fn list_reminders(scheduler: &dyn NotificationScheduler) -> Result<()> {
    let mut pending = scheduler.list_pending().await?;
    if pending.is_empty() {
        println!("No motivation reminders scheduled.");
        return Ok(());
    }

    // Monday first, like the settings screen.
    pending.sort_by_key(|r| (monday_first(r.weekday), r.hour, r.minute));
    for r in pending {
        println!(
            "{:<10} {:02}:{:02}  {}",
            weekday_name(r.weekday),
            r.hour,
            r.minute,
            r.identifier
        );
    }
    Ok(())
}

fn monday_first(weekday: u8) -> u32 {
    (u32::from(weekday) + 5) % 7
}

async fn run_daemon(
    store: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn NotificationScheduler>,
    config: &Config,
) -> Result<()> {
    let service = ReminderService::new(scheduler);
    service.request_authorization();
    service.start_dispatcher(store, config.sound_enabled);
    info!("beagle daemon delivering reminders, Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    service.shutdown(SHUTDOWN_GRACE).await;
    Ok(())
}

async fn run_tui(
    store: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn NotificationScheduler>,
    config: &Config,
) -> Result<()> {
    let mut service = ReminderService::new(scheduler);
    service.request_authorization();
    service.start_dispatcher(Arc::clone(&store), config.sound_enabled);

    let mut app = AppState::new(store, &config.theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = tokio::task::block_in_place(|| run(&mut terminal, &mut app, &mut service));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    service.shutdown(SHUTDOWN_GRACE).await;
    res
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    service: &mut ReminderService,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_input(key, app) {
                    return Ok(());
                }
            }
        }

        for pass in app.take_passes() {
            service.reconcile_in_background(pass);
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.update();
            last_tick = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_order_starts_on_monday() {
        let order: Vec<u8> = {
            let mut days: Vec<u8> = (1..=7).collect();
            days.sort_by_key(|&d| monday_first(d));
            days
        };
        assert_eq!(order, vec![2, 3, 4, 5, 6, 7, 1]);
        assert!(monday_first(u8::MAX) < 7);
    }
}
