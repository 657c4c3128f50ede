//! Background poller: refreshes the dashboard snapshot on a fixed interval.
//!
//! [`Poller`] runs one refresh per tick. Ticks missed while a refresh was
//! slow are skipped, not queued. Changing the thermostat selection wakes the
//! poller immediately and restarts the interval, so the new selection
//! supersedes the pending tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ports::{ComfortClassifier, HomeAssistant};
use crate::services::dashboard_service::DashboardService;

/// Periodic refresher of a [`DashboardService`].
pub struct Poller<H, C> {
    service: Arc<DashboardService<H, C>>,
    interval: Duration,
}

impl<H, C> Poller<H, C>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    /// Spawn the refresh loop. The first refresh runs immediately.
    pub fn start(service: Arc<DashboardService<H, C>>, interval: Duration) -> JoinHandle<()> {
        let poller = Self { service, interval };
        tokio::spawn(poller.run())
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = self.service.selection_changed() => {
                    tracing::debug!("thermostat selection changed, refreshing now");
                    ticker.reset();
                }
            }
            self.service.refresh().await;
        }
    }
}
