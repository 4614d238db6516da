use std::sync::Arc;

use triage_core::batch::{BatchProgress, BatchState};
use triage_core::{
    BatchCoordinator, Classifier, Config, Recommender, SanitizedConfig, Session, TicketRecord,
};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    session: Arc<Session>,
    coordinator: Arc<BatchCoordinator>,
    recommender: Arc<dyn Recommender>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        coordinator: Arc<BatchCoordinator>,
        recommender: Arc<dyn Recommender>,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            session: Arc::clone(coordinator.session()),
            coordinator,
            recommender,
            ws_broadcaster,
        }
    }

    /// Build a fresh session and a coordinator whose progress, record and
    /// state hooks feed the WebSocket broadcaster.
    pub fn from_services(
        config: Config,
        classifier: Arc<dyn Classifier>,
        recommender: Arc<dyn Recommender>,
    ) -> Self {
        let ws_broadcaster = WsBroadcaster::default();
        let session = Arc::new(Session::new());

        let on_progress = ws_broadcaster.clone();
        let on_record = ws_broadcaster.clone();
        let on_state = ws_broadcaster.clone();
        let coordinator = BatchCoordinator::new(classifier, session)
            .with_progress_callback(Arc::new(move |batch_id: &str, progress: BatchProgress| {
                on_progress.batch_progress(batch_id, progress);
            }))
            .with_record_callback(Arc::new(move |batch_id: &str, record: &TicketRecord| {
                on_record.ticket_recorded(batch_id, record);
            }))
            .with_state_callback(Arc::new(move |batch_id: &str, state: BatchState| {
                on_state.batch_state(batch_id, state);
            }));

        Self::new(config, Arc::new(coordinator), recommender, ws_broadcaster)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn session(&self) -> &Session {
        self.session.as_ref()
    }

    pub fn coordinator(&self) -> &Arc<BatchCoordinator> {
        &self.coordinator
    }

    pub fn recommender(&self) -> &dyn Recommender {
        self.recommender.as_ref()
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
