//! wowmon-api: HTTP surface of the exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Run one collection cycle, return Prometheus text |
//! | GET | any other path | Static landing page linking to `/metrics` |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use wowmon_collect::Exporter;

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub exporter: Arc<Exporter>,
}

/// Build the exporter router.
pub fn build_router(exporter: Arc<Exporter>) -> Router {
    let state = ApiState { exporter };
    Router::new()
        .route("/metrics", get(handlers::scrape))
        .fallback(handlers::landing)
        .with_state(state)
}
