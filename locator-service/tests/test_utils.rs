#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use common_auth::{JwtConfig, JwtVerifier, DEFAULT_KID};
use common_money::Price;
use common_observability::LocatorMetrics;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use locator_service::geo::GeoPoint;
use locator_service::model::{
    Address, Contact, InventoryRecord, Medicine, MedicineCategory, MedicineUnit, Pharmacy,
};
use locator_service::{build_router, AppState, LocatorStore, MemoryLocatorStore};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const ISSUER: &str = "itest-issuer";
pub const AUDIENCE: &str = "itest-aud";
const SECRET: &[u8] = b"itest-shared-secret";

pub fn verifier() -> Arc<JwtVerifier> {
    Arc::new(
        JwtVerifier::builder(JwtConfig::new(ISSUER, AUDIENCE))
            .with_hmac_secret(DEFAULT_KID, SECRET)
            .build(),
    )
}

/// Issue an HS256 token for `subject` carrying a single role.
pub fn issue_token(subject: Uuid, role: &str) -> String {
    #[derive(serde::Serialize)]
    struct Claims<'a> {
        sub: String,
        role: &'a str,
        iss: &'a str,
        aud: &'a str,
        exp: i64,
        iat: i64,
    }
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        role,
        iss: ISSUER,
        aud: AUDIENCE,
        exp: now + 600,
        iat: now,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(SECRET)).expect("jwt encode")
}

pub fn memory_state() -> (AppState, Arc<MemoryLocatorStore>) {
    let store = Arc::new(MemoryLocatorStore::new());
    let shared: Arc<dyn LocatorStore> = store.clone();
    let state = AppState {
        store: shared,
        jwt_verifier: verifier(),
        metrics: Arc::new(LocatorMetrics::new()),
        default_radius_meters: 5_000.0,
    };
    (state, store)
}

pub fn app(state: AppState) -> Router {
    build_router(state, &["http://localhost:5173".to_string()])
}

pub fn medicine(name: &str) -> Medicine {
    let now = Utc::now();
    Medicine {
        id: Uuid::new_v4(),
        name: name.to_string(),
        generic_name: None,
        category: MedicineCategory::Painkiller,
        description: None,
        manufacturer: None,
        strength: Some("500".into()),
        unit: MedicineUnit::Mg,
        requires_prescription: false,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn pharmacy(name: &str, owner_id: Uuid, longitude: f64, latitude: f64) -> Pharmacy {
    let now = Utc::now();
    Pharmacy {
        id: Uuid::new_v4(),
        name: name.to_string(),
        registration_number: format!("REG-{}", Uuid::new_v4().simple()),
        address: Address {
            street: "12 Broad Street".into(),
            city: "Lagos".into(),
            state: "Lagos".into(),
            postal_code: "101001".into(),
        },
        location: GeoPoint { longitude, latitude },
        contact: Contact { phone: Some("+2348000000000".into()), email: None },
        owner_id,
        rating: Some(4.5),
        operating_hours: serde_json::json!({}),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn stock(pharmacy_id: Uuid, medicine_id: Uuid, quantity: u32, threshold: u32) -> InventoryRecord {
    InventoryRecord::new(
        pharmacy_id,
        medicine_id,
        quantity,
        Price::new(BigDecimal::from(250)).expect("price"),
        Some("B-001".into()),
        NaiveDate::from_ymd_opt(2030, 6, 30).expect("date"),
        threshold,
        Utc::now(),
    )
}

/// Degrees of latitude spanning `meters` along a meridian.
pub fn lat_offset(meters: f64) -> f64 {
    meters / locator_service::geo::EARTH_RADIUS_METERS * (180.0 / std::f64::consts::PI)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, headers, json)
}
