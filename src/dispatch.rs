use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{NaiveDateTime, Timelike};
use log::{debug, info, warn};
use notify_rust::{Notification, Urgency};
use tokio_util::sync::CancellationToken;

use crate::{
    scheduler::{NotificationScheduler, ReminderRequest},
    store::{self, KeyValueStore},
};

const POLL_INTERVAL: Duration = Duration::from_secs(15);
const FIRED_KEY: &str = "lastFired";

/// Delivers pending reminders when the local clock reaches them.
///
/// The minute each request last fired is kept in the store, so a TUI and a
/// daemon sharing one data directory deliver a reminder only once.
pub struct Dispatcher {
    scheduler: Arc<dyn NotificationScheduler>,
    store: Arc<dyn KeyValueStore>,
    sound_enabled: bool,
}

impl Dispatcher {
    pub fn new(
        scheduler: Arc<dyn NotificationScheduler>,
        store: Arc<dyn KeyValueStore>,
        sound_enabled: bool,
    ) -> Self {
        Self { scheduler, store, sound_enabled }
    }

    /// Requests due at `now` that have not fired during this minute yet.
    pub fn due(&self, pending: &[ReminderRequest], now: NaiveDateTime) -> Vec<ReminderRequest> {
        let minute = now.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(now);
        let mut fired: HashMap<String, NaiveDateTime> =
            store::load_or_default(self.store.as_ref(), FIRED_KEY);
        fired.retain(|_, at| *at == minute);

        let due: Vec<ReminderRequest> = pending
            .iter()
            .filter(|r| r.fires_at(now))
            .filter(|r| fired.insert(r.identifier.clone(), minute).is_none())
            .cloned()
            .collect();

        if !due.is_empty() {
            if let Err(e) = store::save(self.store.as_ref(), FIRED_KEY, &fired) {
                warn!("could not record delivered reminders: {e}");
            }
        }
        due
    }

    pub async fn tick(&self, now: NaiveDateTime) {
        let pending = match self.scheduler.list_pending().await {
            Ok(pending) => pending,
            Err(e) => {
                warn!("could not read pending reminders: {e}");
                return;
            }
        };

        for request in self.due(&pending, now) {
            info!("delivering '{}'", request.identifier);
            show(&request, self.sound_enabled && request.sound);
        }
    }

    pub async fn run(self, token: CancellationToken) {
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        debug!("reminder dispatcher started");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => self.tick(chrono::Local::now().naive_local()).await,
            }
        }

        debug!("reminder dispatcher stopped");
    }
}

fn show(request: &ReminderRequest, sound: bool) {
    if let Err(e) = Notification::new()
        .summary(&request.title)
        .body(&request.body)
        .appname("beagle")
        .icon("face-smile")
        .urgency(Urgency::Normal)
        .show()
    {
        warn!("desktop notification failed: {e}");
    }

    if sound {
        chime();
    }
}

pub fn chime() {
    std::thread::spawn(|| {
        for (cmd, file) in [
            ("paplay", "/usr/share/sounds/freedesktop/stereo/message-new-instant.oga"),
            ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
            ("aplay", "/usr/share/sounds/generic.wav"),
        ] {
            if std::path::Path::new(file).exists() {
                let _ = std::process::Command::new(cmd)
                    .arg(file)
                    .stdout(std::process::Stdio::null())
                    .stderr(std::process::Stdio::null())
                    .spawn();
                break;
            }
        }
    });
}
