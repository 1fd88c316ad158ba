// Application state for HTTP handlers
use crate::application::live_service::LiveDashboardService;
use crate::application::region_service::RegionService;

#[derive(Clone)]
pub struct AppState {
    pub region_service: RegionService,
    pub live_service: LiveDashboardService,
    pub default_crop: String,
}
