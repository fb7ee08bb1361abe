use std::sync::Arc;

use crate::{
    config::Config,
    repositories::EventRepository,
    services::{AuthService, PlacesClient, SmsGateway},
};

/// Shared handles every handler can reach through `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub events: Arc<dyn EventRepository>,
    pub places: Arc<dyn PlacesClient>,
    pub sms: Arc<dyn SmsGateway>,
}

impl AppState {
    pub fn new(
        config: Config,
        auth: AuthService,
        events: Arc<dyn EventRepository>,
        places: Arc<dyn PlacesClient>,
        sms: Arc<dyn SmsGateway>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            events,
            places,
            sms,
        }
    }
}
