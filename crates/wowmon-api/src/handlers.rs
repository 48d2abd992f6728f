//! Request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;
use wowmon_metrics::{CONTENT_TYPE, render_prometheus};

use crate::ApiState;

const LANDING_PAGE: &str = r#"<html>
<head><title>WoW Private Server Exporter</title></head>
<body>
<h1>WoW Private Server Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>
"#;

/// GET /metrics: collect, then render the published snapshot.
///
/// Group failures never reach the client; only a rendering failure does.
pub async fn scrape(State(state): State<ApiState>) -> Response {
    let snapshot = state.exporter.collect().await;
    match render_prometheus(&snapshot) {
        Ok(body) => (StatusCode::OK, [("content-type", CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics").into_response()
        }
    }
}

/// Every other path.
pub async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}
