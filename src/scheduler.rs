//! Pending weekly reminders, shared through the store by the TUI and the daemon.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    error::Result,
    store::{self, KeyValueStore},
    weekdays::weekday_number,
};

const PENDING_KEY: &str = "pendingReminders";

pub const REMINDER_TITLE: &str = "🐶 Beagle";
pub const REMINDER_BODY: &str = "Time for some motivation! Shake me for a quote.";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReminderRequest {
    pub identifier: String,
    /// Sunday = 1 .. Saturday = 7.
    pub weekday: u8,
    pub hour: u32,
    pub minute: u32,
    pub repeats_weekly: bool,
    pub title: String,
    pub body: String,
    pub sound: bool,
}

impl ReminderRequest {
    pub fn weekly(identifier: impl Into<String>, weekday: u8, at: NaiveTime) -> Self {
        Self {
            identifier: identifier.into(),
            weekday,
            hour: at.hour(),
            minute: at.minute(),
            repeats_weekly: true,
            title: REMINDER_TITLE.into(),
            body: REMINDER_BODY.into(),
            sound: true,
        }
    }

    pub fn fires_at(&self, now: NaiveDateTime) -> bool {
        weekday_number(now.weekday()) == self.weekday
            && now.hour() == self.hour
            && now.minute() == self.minute
    }
}

#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn list_pending(&self) -> Result<Vec<ReminderRequest>>;

    /// Adds a request, replacing any pending one with the same identifier.
    /// Returns false when the request was dropped for lack of authorization.
    async fn submit(&self, request: ReminderRequest) -> Result<bool>;

    async fn cancel(&self, identifiers: &[String]) -> Result<()>;

    async fn request_authorization(&self) -> bool;
}

pub struct LocalScheduler {
    store: Arc<dyn KeyValueStore>,
    allowed: bool,
    authorized: AtomicBool,
    lock: Mutex<()>,
}

impl LocalScheduler {
    /// `allowed` is the answer the user gives when authorization is requested.
    pub fn new(store: Arc<dyn KeyValueStore>, allowed: bool) -> Self {
        Self {
            store,
            allowed,
            authorized: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Vec<ReminderRequest> {
        store::load_or_default(self.store.as_ref(), PENDING_KEY)
    }

    fn write(&self, requests: &[ReminderRequest]) -> Result<()> {
        store::save(self.store.as_ref(), PENDING_KEY, requests)
    }
}

#[async_trait]
impl NotificationScheduler for LocalScheduler {
    async fn list_pending(&self) -> Result<Vec<ReminderRequest>> {
        let _guard = self.lock.lock().await;
        Ok(self.read())
    }

    async fn submit(&self, request: ReminderRequest) -> Result<bool> {
        if !self.authorized.load(Ordering::SeqCst) {
            debug!("notifications not authorized, dropping '{}'", request.identifier);
            return Ok(false);
        }

        let _guard = self.lock.lock().await;
        let mut pending = self.read();
        pending.retain(|r| r.identifier != request.identifier);
        info!(
            "scheduled '{}' weekly at {:02}:{:02}",
            request.identifier, request.hour, request.minute
        );
        pending.push(request);
        self.write(&pending)?;
        Ok(true)
    }

    async fn cancel(&self, identifiers: &[String]) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut pending = self.read();
        let before = pending.len();
        pending.retain(|r| !identifiers.contains(&r.identifier));
        if pending.len() != before {
            info!("cancelled {} reminder(s): {}", before - pending.len(), identifiers.join(", "));
            self.write(&pending)?;
        }
        Ok(())
    }

    async fn request_authorization(&self) -> bool {
        self.authorized.store(self.allowed, Ordering::SeqCst);
        self.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn scheduler(allowed: bool) -> LocalScheduler {
        LocalScheduler::new(Arc::new(MemoryStore::default()), allowed)
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn submit_replaces_same_identifier() {
        let s = scheduler(true);
        assert!(s.request_authorization().await);

        s.submit(ReminderRequest::weekly("setTimeMotivation2", 2, at(8, 0))).await.unwrap();
        s.submit(ReminderRequest::weekly("setTimeMotivation2", 2, at(9, 30))).await.unwrap();
        s.submit(ReminderRequest::weekly("setTimeMotivation3", 3, at(9, 30))).await.unwrap();

        let pending = s.list_pending().await.unwrap();
        let find = |id: &str| pending.iter().find(|r| r.identifier == id).unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!((find("setTimeMotivation2").hour, find("setTimeMotivation2").minute), (9, 30));
        assert_eq!(find("setTimeMotivation3").weekday, 3);
    }

    #[tokio::test]
    async fn unauthorized_submissions_are_dropped_silently() {
        let s = scheduler(false);
        assert!(!s.request_authorization().await);

        let accepted = s.submit(ReminderRequest::weekly("setTimeMotivation2", 2, at(8, 0))).await.unwrap();
        assert!(!accepted);
        assert!(s.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_removes_only_named_requests() {
        let s = scheduler(true);
        s.request_authorization().await;
        for day in 1..=3 {
            let key = format!("randomTimeMotivation{day}");
            s.submit(ReminderRequest::weekly(key, day, at(10, 0))).await.unwrap();
        }

        s.cancel(&["randomTimeMotivation2".into(), "unknown".into()]).await.unwrap();

        let ids: Vec<String> = s.list_pending().await.unwrap().into_iter().map(|r| r.identifier).collect();
        assert_eq!(ids, vec!["randomTimeMotivation1", "randomTimeMotivation3"]);
    }

    #[test]
    fn fires_on_matching_weekday_and_minute() {
        // 2026-10-19 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let request = ReminderRequest::weekly("setTimeMotivation2", 2, at(7, 45));

        assert!(request.fires_at(monday.and_hms_opt(7, 45, 59).unwrap()));
        assert!(!request.fires_at(monday.and_hms_opt(7, 46, 0).unwrap()));
        assert!(!request.fires_at(monday.succ_opt().unwrap().and_hms_opt(7, 45, 0).unwrap()));
    }
}
