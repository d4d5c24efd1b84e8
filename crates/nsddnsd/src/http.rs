//! HTTP adapter
//!
//! Maps GET requests onto the update pipeline and its outcomes back onto
//! plain-text responses. Every path is served, since dynamic DNS clients
//! differ in the URL they call (`/`, `/update`, `/nic/update`, ...).

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use nsddns_core::{Outcome, UpdatePipeline, UpdateRequest};
use tokio::net::TcpListener;

/// Forwarded client address, set by a trusted reverse proxy
const REAL_IP_HEADER: &str = "x-real-ip";

/// Query parameter carrying addresses (repeatable)
const IP_PARAM: &str = "ip";

/// Serve the pipeline on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    pipeline: Arc<UpdatePipeline>,
    listener: TcpListener,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "HTTP listener ready");

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Build the router (public for testing).
pub fn router(pipeline: Arc<UpdatePipeline>) -> Router {
    Router::new()
        .route("/", get(update_handler))
        .route("/{*path}", get(update_handler))
        .with_state(pipeline)
}

async fn update_handler(
    State(pipeline): State<Arc<UpdatePipeline>>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let request = UpdateRequest {
        authorization: header_str(&headers, header::AUTHORIZATION.as_str()),
        ip_params: params
            .into_iter()
            .filter(|(key, _)| key == IP_PARAM)
            .map(|(_, value)| value)
            .collect(),
        real_ip: header_str(&headers, REAL_IP_HEADER),
    };

    let outcome = pipeline.handle(request).await;
    tracing::info!(status = outcome.status(), "{}", outcome);

    outcome_response(&outcome, pipeline.realm())
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn outcome_response(outcome: &Outcome, realm: &str) -> Response {
    let status =
        StatusCode::from_u16(outcome.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, outcome.body()).into_response();

    if outcome.needs_challenge() {
        match HeaderValue::from_str(&format!("Basic realm=\"{realm}\"")) {
            Ok(value) => {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
            Err(e) => tracing::error!("Cannot build challenge for realm {:?}: {}", realm, e),
        }
    }

    response
}
