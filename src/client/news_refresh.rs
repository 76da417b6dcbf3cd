use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::client::api::DashboardApi;
use crate::client::dashboard::Dashboard;

/// Background news refresh. The first fetch happens immediately, then once
/// per `period`. Dropping the handle stops the timer.
pub struct NewsRefresh {
    task: JoinHandle<()>,
}

impl NewsRefresh {
    pub fn spawn<A>(dashboard: Dashboard<A>, period: Duration) -> Self
    where
        A: DashboardApi + ?Sized + 'static,
    {
        let task = tokio::spawn(async move {
            tracing::info!("News refresh started ({}s interval)", period.as_secs());

            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                dashboard.refresh_news().await;
            }
        });

        Self { task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn cancel(self) {
        tracing::info!("News refresh cancelled");
        self.task.abort();
    }
}

impl Drop for NewsRefresh {
    fn drop(&mut self) {
        self.task.abort();
    }
}
