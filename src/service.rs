// Background work: reconcile passes, the dispatcher and authorization.

use std::{collections::HashMap, sync::Arc, time::Duration};

use log::{info, warn};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    dispatch::Dispatcher,
    planner::{self, ReconcilePass, ReminderMode},
    scheduler::NotificationScheduler,
    store::KeyValueStore,
};

pub struct ReminderService {
    scheduler: Arc<dyn NotificationScheduler>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    dispatcher: CancellationToken,
    in_flight: HashMap<ReminderMode, CancellationToken>,
}

impl ReminderService {
    pub fn new(scheduler: Arc<dyn NotificationScheduler>) -> Self {
        let shutdown = CancellationToken::new();
        Self {
            scheduler,
            tracker: TaskTracker::new(),
            dispatcher: shutdown.child_token(),
            shutdown,
            in_flight: HashMap::new(),
        }
    }

    pub fn scheduler(&self) -> Arc<dyn NotificationScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Asks once for permission to notify and only logs the answer.
    pub fn request_authorization(&self) {
        let scheduler = self.scheduler();
        self.tracker.spawn(async move {
            if scheduler.request_authorization().await {
                info!("notification authorization granted");
            } else {
                warn!("notification authorization denied, reminders will not be scheduled");
            }
        });
    }

    pub fn start_dispatcher(&self, store: Arc<dyn KeyValueStore>, sound_enabled: bool) {
        let dispatcher = Dispatcher::new(self.scheduler(), store, sound_enabled);
        self.tracker.spawn(dispatcher.run(self.dispatcher.clone()));
    }

    /// Spawns a pass. A newer pass for the same mode supersedes one still
    /// in flight.
    pub fn reconcile_in_background(&mut self, pass: ReconcilePass) {
        let token = self.shutdown.child_token();
        if let Some(previous) = self.in_flight.insert(pass.mode, token.clone()) {
            previous.cancel();
        }

        let scheduler = self.scheduler();
        self.tracker.spawn(async move {
            let mode = pass.mode;
            tokio::select! {
                biased;
                _ = token.cancelled() => info!("{mode} reconciliation cancelled"),
                result = planner::reconcile(scheduler.as_ref(), &pass) => {
                    if let Err(e) = result {
                        warn!("{mode} reconciliation failed: {e}");
                    }
                }
            }
        });
    }

    /// Stops the dispatcher, gives in-flight passes `grace` to finish, then
    /// cancels whatever is left.
    pub async fn shutdown(self, grace: Duration) {
        self.dispatcher.cancel();
        self.tracker.close();

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!("reminder tasks still running after {grace:?}, cancelling");
            self.shutdown.cancel();
            self.tracker.wait().await;
        }
    }
}
