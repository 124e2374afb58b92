pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::services::MasteryService;
use crate::state::AppState;

/// Full application router around an already constructed service
pub fn build_app(service: MasteryService, config: &Config) -> axum::Router {
    let state = AppState::new(service, config);

    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Router backed by the store and clock selected from `config`
pub fn create_app(config: &Config) -> Result<axum::Router, store::StoreError> {
    let store = store::from_config(config)?;
    tracing::info!(backend = store.backend_name(), "mastery store ready");
    Ok(build_app(MasteryService::with_system_clock(store), config))
}
