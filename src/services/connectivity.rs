use crate::metrics::Metrics;
use crate::models::ConnectivityStatus;
use crate::services::api::{ProbeError, ScreeningApi};
use crate::state::StateManager;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the backend health probe and records the outcome in state.
///
/// A failed probe also raises the error banner. When a later probe
/// succeeds, the banner is cleared only if it still shows the probe's
/// own message.
#[derive(Clone)]
pub struct ConnectivityProber {
    api: Arc<dyn ScreeningApi>,
    state: Arc<StateManager>,
    metrics: Arc<Metrics>,
}

impl ConnectivityProber {
    pub fn new(api: Arc<dyn ScreeningApi>, state: Arc<StateManager>, metrics: Arc<Metrics>) -> Self {
        Self {
            api,
            state,
            metrics,
        }
    }

    pub async fn probe(&self) -> Result<(), ProbeError> {
        // Remember the last failure before the status moves to Checking
        let mut previous_failure = None;
        self.state.update(|state| {
            if let ConnectivityStatus::Unreachable { message } = &state.connectivity {
                previous_failure = Some(message.clone());
            }
            state.connectivity = ConnectivityStatus::Checking;
        });

        match self.api.check_health().await {
            Ok(body) => {
                info!("Backend at {} is reachable: {}", self.api.base_url(), body);
                self.metrics.record_probe(true);
                self.state.update(|state| {
                    if previous_failure.is_some() && state.error == previous_failure {
                        state.error = None;
                    }
                    state.connectivity = ConnectivityStatus::Reachable;
                });
                Ok(())
            }
            Err(e) => {
                warn!("Backend health probe failed ({:?}): {:?}", e.category(), e);
                self.metrics.record_probe(false);
                let message = e.to_string();
                self.state.update(|state| {
                    state.connectivity = ConnectivityStatus::Unreachable {
                        message: message.clone(),
                    };
                    state.error = Some(message);
                });
                Err(e)
            }
        }
    }
}
