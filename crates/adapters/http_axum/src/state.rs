//! Shared application state for axum handlers.

use std::sync::Arc;

use biothermal_app::ports::{ComfortClassifier, HomeAssistant};
use biothermal_app::services::dashboard_service::DashboardService;
use biothermal_app::services::thermal_control::ThermalControlService;

/// Application state shared across all axum handlers.
///
/// Generic over the HomeAssistant port and the classifier to avoid dynamic
/// dispatch. `Clone` is implemented manually so the services themselves do
/// not need to be `Clone`, only the `Arc` wrappers are cloned.
pub struct AppState<H, C> {
    pub dashboard: Arc<DashboardService<H, C>>,
    pub control: Arc<ThermalControlService<H, C>>,
    /// Interval of the page's `<meta http-equiv="refresh">`.
    pub refresh_seconds: u64,
}

impl<H, C> Clone for AppState<H, C> {
    fn clone(&self) -> Self {
        Self {
            dashboard: Arc::clone(&self.dashboard),
            control: Arc::clone(&self.control),
            refresh_seconds: self.refresh_seconds,
        }
    }
}

impl<H, C> AppState<H, C>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    /// Create the state from services already shared with background tasks
    /// (the poller holds its own clone of the dashboard service).
    pub fn new(
        dashboard: Arc<DashboardService<H, C>>,
        control: Arc<ThermalControlService<H, C>>,
        refresh_seconds: u64,
    ) -> Self {
        Self {
            dashboard,
            control,
            refresh_seconds,
        }
    }
}
