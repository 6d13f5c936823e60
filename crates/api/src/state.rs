use huddle_config::Settings;
use huddle_services::MeetingRegistry;
use std::sync::Arc;

use crate::ws::storage::WsStorage;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub meetings: Arc<MeetingRegistry>,
    pub ws_storage: Arc<WsStorage>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let meetings = Arc::new(MeetingRegistry::new(settings.meeting.clone()));
        let ws_storage = Arc::new(WsStorage::new());

        Self {
            settings,
            meetings,
            ws_storage,
        }
    }
}
