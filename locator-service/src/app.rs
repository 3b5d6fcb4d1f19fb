use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRef, State};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, put};
use axum::Router;
use common_auth::JwtVerifier;
use common_observability::LocatorMetrics;
use prometheus::{Encoder, TextEncoder};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, warn};

use crate::inventory_handlers::{
    add_inventory, inventory_summary, list_pharmacy_inventory, remove_inventory, search_availability,
    update_inventory,
};
use crate::medicine_handlers::{
    create_medicine, delete_medicine, get_medicine, list_medicines, search_medicines, update_medicine,
};
use crate::pharmacy_handlers::{
    create_pharmacy, delete_pharmacy, get_own_pharmacy, get_pharmacy, list_pharmacies, search_pharmacies,
    update_pharmacy,
};
use crate::store::LocatorStore;

pub const SERVICE_NAME: &str = "locator-service";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LocatorStore>,
    pub jwt_verifier: Arc<JwtVerifier>,
    pub metrics: Arc<LocatorMetrics>,
    pub default_radius_meters: f64,
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_verifier.clone()
    }
}

pub async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(state): State<AppState>) -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let families = state.metrics.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buf) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8_lossy(&buf).to_string())
}

async fn error_metrics_mw(
    State(metrics): State<Arc<LocatorMetrics>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let resp = next.run(req).await;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let code = resp
            .headers()
            .get("x-error-code")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        metrics
            .http_errors_total
            .with_label_values(&[SERVICE_NAME, code, status.as_str()])
            .inc();
        if status.is_server_error() {
            error!(%method, path, status = status.as_u16(), code, "request failed");
        } else {
            warn!(%method, path, status = status.as_u16(), code, "request rejected");
        }
    }
    resp
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION])
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let metrics = state.metrics.clone();
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/inventory/search/availability", get(search_availability))
        .route(
            "/api/inventory/:pharmacy_id/medicines",
            get(list_pharmacy_inventory).post(add_inventory),
        )
        .route(
            "/api/inventory/:pharmacy_id/medicines/:inventory_id",
            put(update_inventory).delete(remove_inventory),
        )
        .route("/api/inventory/:pharmacy_id/summary", get(inventory_summary))
        .route("/api/medicines", get(list_medicines).post(create_medicine))
        .route("/api/medicines/search", get(search_medicines))
        .route(
            "/api/medicines/:id",
            get(get_medicine).put(update_medicine).delete(delete_medicine),
        )
        .route("/api/pharmacies", get(list_pharmacies).post(create_pharmacy))
        .route("/api/pharmacies/search", get(search_pharmacies))
        .route("/api/pharmacies/mine", get(get_own_pharmacy))
        .route(
            "/api/pharmacies/:id",
            get(get_pharmacy).put(update_pharmacy).delete(delete_pharmacy),
        )
        .with_state(state)
        .layer(middleware::from_fn_with_state(metrics, error_metrics_mw))
        .layer(cors_layer(allowed_origins))
}
