// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::session::SessionProvider;
use std::sync::Arc;

pub struct AppState {
    pub dashboard: Arc<DashboardService>,
    pub sessions: Arc<dyn SessionProvider>,
}
