//! Reconciles one mode's weekday toggles against the pending requests.

use std::{collections::HashSet, fmt};

use chrono::{NaiveTime, Timelike};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::{BeagleError, Result},
    scheduler::{NotificationScheduler, ReminderRequest},
    weekdays::WeekdayToggles,
};

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReminderMode {
    Random,
    Fixed,
}

impl ReminderMode {
    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::Random => "randomTimeMotivation",
            Self::Fixed => "setTimeMotivation",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for ReminderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn request_key(mode: ReminderMode, weekday_number: u8) -> String {
    format!("{}{}", mode.key_prefix(), weekday_number)
}

/// A daily `[start, end)` window of times of day, at minute resolution.
/// An `end` before `start` runs past midnight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn len_minutes(&self) -> u32 {
        (minute_of_day(self.end) + MINUTES_PER_DAY - minute_of_day(self.start)) % MINUTES_PER_DAY
    }

    pub fn validate(&self) -> Result<()> {
        if self.len_minutes() == 0 {
            return Err(BeagleError::EmptyWindow {
                start: self.start.format("%H:%M").to_string(),
                end: self.end.format("%H:%M").to_string(),
            });
        }
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NaiveTime> {
        self.validate()?;
        let offset = rng.random_range(0..self.len_minutes());
        let minute = (minute_of_day(self.start) + offset) % MINUTES_PER_DAY;
        NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)
            .ok_or_else(|| BeagleError::InvalidTime(minute.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeSpec {
    Fixed(NaiveTime),
    Window(TimeWindow),
}

impl TimeSpec {
    /// Trigger time for one new request. Windows are sampled on every call.
    fn trigger_time<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NaiveTime> {
        match self {
            Self::Fixed(at) => Ok(*at),
            Self::Window(window) => window.sample(rng),
        }
    }
}

/// Everything one reconciliation needs, owned so it can outlive the screen
/// that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconcilePass {
    pub mode: ReminderMode,
    pub spec: TimeSpec,
    pub toggles: WeekdayToggles,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlanStep {
    Create(ReminderRequest),
    Cancel(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcileSummary {
    pub created: Vec<String>,
    pub cancelled: Vec<String>,
}

/// Decides the create and cancel steps for a pass given the identifiers
/// currently pending.
pub fn plan<R: Rng + ?Sized>(
    pass: &ReconcilePass,
    pending: &HashSet<String>,
    rng: &mut R,
) -> Result<Vec<PlanStep>> {
    let mut steps = Vec::new();

    for toggle in pass.toggles.iter() {
        let key = request_key(pass.mode, toggle.weekday_number);
        match (pending.contains(&key), toggle.selected) {
            (true, false) => steps.push(PlanStep::Cancel(key)),
            (false, true) => {
                let at = pass.spec.trigger_time(rng)?;
                steps.push(PlanStep::Create(ReminderRequest::weekly(key, toggle.weekday_number, at)));
            }
            _ => {}
        }
    }

    Ok(steps)
}

pub async fn reconcile(
    scheduler: &dyn NotificationScheduler,
    pass: &ReconcilePass,
) -> Result<ReconcileSummary> {
    let pending = pending_identifiers(scheduler).await?;
    // ThreadRng is !Send; it must be gone before the next await.
    let steps = {
        let mut rng = rand::rng();
        plan(pass, &pending, &mut rng)?
    };
    apply(scheduler, pass.mode, steps).await
}

async fn pending_identifiers(scheduler: &dyn NotificationScheduler) -> Result<HashSet<String>> {
    Ok(scheduler
        .list_pending()
        .await?
        .into_iter()
        .map(|r| r.identifier)
        .collect())
}

async fn apply(
    scheduler: &dyn NotificationScheduler,
    mode: ReminderMode,
    steps: Vec<PlanStep>,
) -> Result<ReconcileSummary> {
    let mut summary = ReconcileSummary::default();
    let mut creates = Vec::new();

    for step in steps {
        match step {
            PlanStep::Create(request) => creates.push(request),
            PlanStep::Cancel(key) => summary.cancelled.push(key),
        }
    }

    // Stale keys go first so a failing submit cannot leave them behind.
    if !summary.cancelled.is_empty() {
        scheduler.cancel(&summary.cancelled).await?;
    }

    for request in creates {
        let id = request.identifier.clone();
        debug!("{mode}: creating '{id}' at {:02}:{:02}", request.hour, request.minute);
        if scheduler.submit(request).await? {
            summary.created.push(id);
        }
    }

    info!(
        "{mode} reminders reconciled: {} created, {} cancelled",
        summary.created.len(),
        summary.cancelled.len()
    );
    Ok(summary)
}
