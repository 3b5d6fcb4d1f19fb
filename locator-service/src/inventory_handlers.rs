use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use common_auth::{ensure_role, AuthContext, ROLE_PHARMACY_ADMIN, ROLE_SYSTEM_ADMIN};
use common_http_errors::ApiError;
use common_money::Price;
use serde::{Deserialize, Deserializer};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::availability_search::{self, AvailabilityPage, AvailabilityParams};
use crate::error::{LocatorError, LocatorResult};
use crate::inventory_status::{StockStatus, DEFAULT_LOW_STOCK_THRESHOLD};
use crate::model::{InventoryChange, InventoryLine, InventoryRecord, InventorySummary, Medicine, MedicineSummary};
use crate::pagination::{PageParams, Paginated};
use crate::pharmacy_handlers::{active_pharmacy, owned_pharmacy};

pub(crate) const INVENTORY_WRITE_ROLES: &[&str] = &[ROLE_PHARMACY_ADMIN, ROLE_SYSTEM_ADMIN];

/// `status` is accepted by the parser only so it can be refused with a precise code,
/// including an explicit `null`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddInventoryRequest {
    pub medicine_id: Option<Uuid>,
    pub medicine_name: Option<String>,
    pub quantity: i64,
    pub price: BigDecimal,
    pub batch_number: Option<String>,
    pub expiry_date: NaiveDate,
    pub low_stock_threshold: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateInventoryRequest {
    pub quantity: Option<i64>,
    pub price: Option<BigDecimal>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub low_stock_threshold: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryListParams {
    pub status: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

/// Records that a key was sent even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

fn reject_status(status: &Option<serde_json::Value>) -> LocatorResult<()> {
    if status.is_some() {
        return Err(LocatorError::invalid(
            "status_not_settable",
            "status is derived from quantity and low_stock_threshold",
        ));
    }
    Ok(())
}

fn stock_count(value: i64, code: &'static str, field: &str) -> LocatorResult<u32> {
    if !(0..=i64::from(i32::MAX)).contains(&value) {
        return Err(LocatorError::invalid(code, format!("{field} must be a non-negative integer")));
    }
    u32::try_from(value).map_err(|_| LocatorError::invalid(code, format!("{field} is out of range")))
}

fn parse_price(value: BigDecimal) -> LocatorResult<Price> {
    Price::new(value).map_err(|e| LocatorError::invalid("invalid_price", e.to_string()))
}

fn batch(raw: Option<String>) -> Option<String> {
    raw.map(|b| b.trim().to_string()).filter(|b| !b.is_empty())
}

/// Resolves by id first, then by exact case-insensitive name. Never creates catalog entries.
async fn resolve_medicine(state: &AppState, id: Option<Uuid>, name: Option<&str>) -> LocatorResult<Medicine> {
    if let Some(id) = id {
        return state
            .store
            .medicine_by_id(id)
            .await?
            .filter(|m| m.is_active)
            .ok_or_else(|| LocatorError::not_found("medicine_not_found"));
    }
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => state
            .store
            .active_medicine_by_name(name)
            .await?
            .ok_or_else(|| LocatorError::not_found("medicine_not_found")),
        None => Err(LocatorError::invalid(
            "missing_medicine",
            "medicine_id or medicine_name is required",
        )),
    }
}

fn write_guard(auth: &AuthContext) -> Result<(), ApiError> {
    ensure_role(auth, INVENTORY_WRITE_ROLES)
        .map_err(|_| ApiError::ForbiddenMissingRole { role: ROLE_PHARMACY_ADMIN, trace_id: None })
}

pub async fn search_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityPage>, ApiError> {
    let query = params.parse(state.default_radius_meters)?;
    let result = availability_search::search_availability(state.store.as_ref(), &query).await?;
    state
        .metrics
        .record_search(query.origin.is_some(), result.pagination.total);
    Ok(Json(result))
}

pub async fn add_inventory(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(pharmacy_id): Path<Uuid>,
    Json(body): Json<AddInventoryRequest>,
) -> Result<(StatusCode, Json<InventoryLine>), ApiError> {
    write_guard(&auth)?;
    reject_status(&body.status)?;
    let pharmacy = owned_pharmacy(&state, &auth, pharmacy_id).await?;

    let quantity = stock_count(body.quantity, "invalid_quantity", "quantity")?;
    let threshold = match body.low_stock_threshold {
        Some(value) => stock_count(value, "invalid_threshold", "low_stock_threshold")?,
        None => DEFAULT_LOW_STOCK_THRESHOLD,
    };
    let price = parse_price(body.price)?;
    let medicine = resolve_medicine(&state, body.medicine_id, body.medicine_name.as_deref()).await?;

    let record = InventoryRecord::new(
        pharmacy.id,
        medicine.id,
        quantity,
        price,
        batch(body.batch_number),
        body.expiry_date,
        threshold,
        Utc::now(),
    );
    state.store.insert_inventory(&record).await?;
    state.metrics.record_inventory_write("create", record.status.as_str());
    info!(
        inventory_id = %record.id,
        pharmacy_id = %pharmacy.id,
        medicine_id = %medicine.id,
        quantity,
        status = %record.status,
        "inventory added"
    );
    Ok((
        StatusCode::CREATED,
        Json(InventoryLine { record, medicine: MedicineSummary::from(&medicine) }),
    ))
}

pub async fn update_inventory(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((pharmacy_id, inventory_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateInventoryRequest>,
) -> Result<Json<InventoryRecord>, ApiError> {
    write_guard(&auth)?;
    reject_status(&body.status)?;
    owned_pharmacy(&state, &auth, pharmacy_id).await?;

    let change = InventoryChange {
        quantity: body
            .quantity
            .map(|q| stock_count(q, "invalid_quantity", "quantity"))
            .transpose()?,
        price: body.price.map(parse_price).transpose()?,
        batch_number: batch(body.batch_number),
        expiry_date: body.expiry_date,
        low_stock_threshold: body
            .low_stock_threshold
            .map(|t| stock_count(t, "invalid_threshold", "low_stock_threshold"))
            .transpose()?,
    };

    let mut record = state
        .store
        .inventory_by_id(pharmacy_id, inventory_id)
        .await?
        .ok_or_else(|| ApiError::not_found("inventory_not_found"))?;
    let previous = record.status;
    record.apply(change, Utc::now());

    if !state.store.update_inventory(&record).await? {
        return Err(ApiError::not_found("inventory_not_found"));
    }
    state.metrics.record_inventory_write("update", record.status.as_str());
    info!(
        %inventory_id,
        %pharmacy_id,
        quantity = record.quantity,
        from = %previous,
        to = %record.status,
        "inventory updated"
    );
    Ok(Json(record))
}

pub async fn remove_inventory(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((pharmacy_id, inventory_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    write_guard(&auth)?;
    owned_pharmacy(&state, &auth, pharmacy_id).await?;
    if !state.store.delete_inventory(pharmacy_id, inventory_id).await? {
        return Err(ApiError::not_found("inventory_not_found"));
    }
    state.metrics.record_inventory_write("delete", "removed");
    info!(%inventory_id, %pharmacy_id, "inventory removed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_pharmacy_inventory(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
    Query(params): Query<InventoryListParams>,
) -> Result<Json<Paginated<InventoryLine>>, ApiError> {
    let status = match params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(
            raw.parse::<StockStatus>()
                .map_err(|e| LocatorError::invalid("invalid_status", e.to_string()))?,
        ),
    };
    let page = params.page.to_request()?;
    active_pharmacy(state.store.as_ref(), pharmacy_id).await?;
    let (rows, total) = state.store.list_pharmacy_inventory(pharmacy_id, status, page).await?;
    Ok(Json(Paginated::new(rows, page, total)))
}

pub async fn inventory_summary(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
) -> Result<Json<InventorySummary>, ApiError> {
    active_pharmacy(state.store.as_ref(), pharmacy_id).await?;
    let counts = state.store.inventory_status_counts(pharmacy_id).await?;
    Ok(Json(InventorySummary::from_counts(pharmacy_id, &counts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn negative_and_oversized_counts_rejected() {
        assert_eq!(stock_count(0, "invalid_quantity", "quantity").unwrap(), 0);
        assert_eq!(stock_count(-1, "invalid_quantity", "quantity").unwrap_err().code(), "invalid_quantity");
        let too_big = i64::from(i32::MAX) + 1;
        assert_eq!(stock_count(too_big, "invalid_threshold", "t").unwrap_err().code(), "invalid_threshold");
    }

    #[test]
    fn negative_price_rejected() {
        let err = parse_price(BigDecimal::from_str("-1.00").unwrap()).unwrap_err();
        assert_eq!(err.code(), "invalid_price");
        assert_eq!(parse_price(BigDecimal::from_str("2.5").unwrap()).unwrap().inner().to_string(), "2.50");
        let err = parse_price(BigDecimal::from_str("2.999").unwrap()).unwrap_err();
        assert_eq!(err.code(), "invalid_price");
    }

    #[test]
    fn status_in_body_is_refused() {
        let body: UpdateInventoryRequest =
            serde_json::from_value(serde_json::json!({"quantity": 4, "status": "in_stock"})).unwrap();
        assert_eq!(reject_status(&body.status).unwrap_err().code(), "status_not_settable");
        let body: UpdateInventoryRequest =
            serde_json::from_value(serde_json::json!({"quantity": 4, "status": null})).unwrap();
        assert_eq!(reject_status(&body.status).unwrap_err().code(), "status_not_settable");
        let body: UpdateInventoryRequest = serde_json::from_value(serde_json::json!({"quantity": 4})).unwrap();
        assert!(reject_status(&body.status).is_ok());
    }

    #[test]
    fn unknown_fields_fail_to_parse() {
        let parsed = serde_json::from_value::<UpdateInventoryRequest>(serde_json::json!({"owner": "x"}));
        assert!(parsed.is_err());
    }
}
