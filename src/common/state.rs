use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::dashboard::{DashboardState, Event, ViewContext};
use crate::refresh::RefreshScheduler;
use crate::smaawa::SmaawaClient;
use crate::store::LocationStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<SmaawaClient>,
    pub dashboard: Arc<RwLock<DashboardState>>,
    pub scheduler: Arc<Mutex<RefreshScheduler>>,
    pub locations: Arc<Mutex<LocationStore>>,
}

impl AppState {
    pub fn new(config: Config, client: SmaawaClient, locations: LocationStore) -> Self {
        let dashboard = DashboardState::new(
            config.default_chart_range,
            config.default_device.clone(),
        );
        let scheduler =
            RefreshScheduler::new(config.refresh_interval_seconds, config.auto_refresh_enabled);

        Self {
            config: Arc::new(config),
            client: Arc::new(client),
            dashboard: Arc::new(RwLock::new(dashboard)),
            scheduler: Arc::new(Mutex::new(scheduler)),
            locations: Arc::new(Mutex::new(locations)),
        }
    }

    /// Apply `event` to the dashboard. The lock is held only for the pure
    /// state transition, and the stored state is replaced only once the
    /// transition has returned.
    pub async fn update(&self, event: Event) {
        let mut guard = self.dashboard.write().await;
        let next = guard.clone().apply(event);
        *guard = next;
    }

    /// Read a projection of the dashboard without cloning all of it.
    pub async fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&*self.dashboard.read().await)
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.dashboard.read().await.clone()
    }

    #[must_use]
    pub fn view_context(&self) -> ViewContext {
        ViewContext::from_config(&self.config)
    }
}
