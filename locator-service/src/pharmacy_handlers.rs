use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use common_auth::{ensure_owner_or_admin, AuthContext};
use common_http_errors::ApiError;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{LocatorError, LocatorResult};
use crate::geo::{self, GeoPoint, GeoRadius};
use crate::model::{Address, Contact, Pharmacy, PharmacyWithDistance};
use crate::pagination::{PageParams, Paginated};
use crate::store::LocatorStore;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePharmacyRequest {
    pub name: String,
    pub registration_number: String,
    pub address: Address,
    pub location: GeoPoint,
    #[serde(default)]
    pub contact: Contact,
    pub operating_hours: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePharmacyRequest {
    pub name: Option<String>,
    pub registration_number: Option<String>,
    pub address: Option<Address>,
    pub location: Option<GeoPoint>,
    pub contact: Option<Contact>,
    pub operating_hours: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PharmacySearchParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(alias = "maxDistance")]
    pub max_distance: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

fn required_text(field: &'static str, code: &'static str, raw: &str) -> LocatorResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(LocatorError::invalid(code, format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn validated_address(address: Address) -> LocatorResult<Address> {
    Ok(Address {
        street: required_text("address.street", "invalid_address", &address.street)?,
        city: required_text("address.city", "invalid_address", &address.city)?,
        state: required_text("address.state", "invalid_address", &address.state)?,
        postal_code: required_text("address.postal_code", "invalid_address", &address.postal_code)?,
    })
}

fn validated_hours(hours: serde_json::Value) -> LocatorResult<serde_json::Value> {
    if !hours.is_object() {
        return Err(LocatorError::invalid("invalid_operating_hours", "operating_hours must be an object"));
    }
    Ok(hours)
}

/// Loads an active pharmacy; deactivated ones are reported as missing.
pub(crate) async fn active_pharmacy(store: &dyn LocatorStore, id: Uuid) -> LocatorResult<Pharmacy> {
    store
        .pharmacy_by_id(id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| LocatorError::not_found("pharmacy_not_found"))
}

fn ensure_owner(auth: &AuthContext, pharmacy: &Pharmacy) -> Result<(), ApiError> {
    ensure_owner_or_admin(auth, pharmacy.owner_id).map_err(|err| {
        warn!(pharmacy_id = %pharmacy.id, caller = %auth.user_id(), ?err, "ownership check failed");
        ApiError::from(LocatorError::Forbidden)
    })
}

/// Loads an active pharmacy the caller may modify.
pub(crate) async fn owned_pharmacy(state: &AppState, auth: &AuthContext, id: Uuid) -> Result<Pharmacy, ApiError> {
    let pharmacy = active_pharmacy(state.store.as_ref(), id).await?;
    ensure_owner(auth, &pharmacy)?;
    Ok(pharmacy)
}

pub async fn create_pharmacy(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<CreatePharmacyRequest>,
) -> Result<(StatusCode, Json<Pharmacy>), ApiError> {
    let owner_id = auth.user_id();
    let name = required_text("name", "invalid_name", &body.name)?;
    let registration_number = required_text("registration_number", "invalid_registration_number", &body.registration_number)?;
    let address = validated_address(body.address)?;
    let location = GeoPoint::new(body.location.longitude, body.location.latitude)?;
    let operating_hours = validated_hours(body.operating_hours.unwrap_or_else(|| serde_json::json!({})))?;

    if state.store.pharmacy_by_registration(&registration_number).await?.is_some() {
        return Err(LocatorError::conflict(
            "pharmacy_exists",
            format!("registration number {registration_number} is already registered"),
        )
        .into());
    }
    if state.store.active_pharmacy_for_owner(owner_id).await?.is_some() {
        return Err(LocatorError::conflict("owner_has_pharmacy", "caller already owns an active pharmacy").into());
    }

    let now = Utc::now();
    let pharmacy = Pharmacy {
        id: Uuid::new_v4(),
        name,
        registration_number,
        address,
        location,
        contact: body.contact,
        owner_id,
        rating: None,
        operating_hours,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_pharmacy(&pharmacy).await?;
    info!(pharmacy_id = %pharmacy.id, %owner_id, "pharmacy registered");
    Ok((StatusCode::CREATED, Json(pharmacy)))
}

pub async fn search_pharmacies(
    State(state): State<AppState>,
    Query(params): Query<PharmacySearchParams>,
) -> Result<Json<Paginated<PharmacyWithDistance>>, ApiError> {
    let origin = geo::parse_origin(params.latitude.as_deref(), params.longitude.as_deref())?
        .ok_or_else(|| LocatorError::invalid("missing_coordinate", "latitude and longitude are required"))?;
    let radius_meters = match params.max_distance.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => state.default_radius_meters,
        Some(raw) => raw.parse::<f64>().map_err(|_| {
            LocatorError::invalid("invalid_radius", format!("maxDistance '{raw}' is not a number"))
        })?,
    };
    let near = GeoRadius { origin, radius_meters: geo::validate_radius(radius_meters)? };
    let page = params.page.to_request()?;
    let (rows, total) = state.store.list_pharmacies(Some(near), page).await?;
    Ok(Json(Paginated::new(rows, page, total)))
}

pub async fn list_pharmacies(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Pharmacy>>, ApiError> {
    let page = params.to_request()?;
    let (rows, total) = state.store.list_pharmacies(None, page).await?;
    Ok(Json(Paginated::new(rows, page, total).map(|row| row.pharmacy)))
}

pub async fn get_pharmacy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Pharmacy>, ApiError> {
    Ok(Json(active_pharmacy(state.store.as_ref(), id).await?))
}

pub async fn get_own_pharmacy(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Pharmacy>, ApiError> {
    state
        .store
        .active_pharmacy_for_owner(auth.user_id())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("pharmacy_not_found"))
}

pub async fn update_pharmacy(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePharmacyRequest>,
) -> Result<Json<Pharmacy>, ApiError> {
    // Deactivated pharmacies stay hidden unless the request reactivates them.
    let mut pharmacy = state
        .store
        .pharmacy_by_id(id)
        .await?
        .filter(|p| p.is_active || body.is_active == Some(true))
        .ok_or_else(|| LocatorError::not_found("pharmacy_not_found"))?;
    ensure_owner(&auth, &pharmacy)?;

    if !pharmacy.is_active
        && state.store.active_pharmacy_for_owner(pharmacy.owner_id).await?.is_some()
    {
        return Err(LocatorError::conflict("owner_has_pharmacy", "owner already has another active pharmacy").into());
    }
    if let Some(raw) = body.name.as_deref() {
        pharmacy.name = required_text("name", "invalid_name", raw)?;
    }
    if let Some(raw) = body.registration_number.as_deref() {
        let registration_number = required_text("registration_number", "invalid_registration_number", raw)?;
        if registration_number != pharmacy.registration_number {
            if state.store.pharmacy_by_registration(&registration_number).await?.is_some() {
                return Err(LocatorError::conflict(
                    "pharmacy_exists",
                    format!("registration number {registration_number} is already registered"),
                )
                .into());
            }
            pharmacy.registration_number = registration_number;
        }
    }
    if let Some(address) = body.address {
        pharmacy.address = validated_address(address)?;
    }
    if let Some(location) = body.location {
        pharmacy.location = GeoPoint::new(location.longitude, location.latitude)?;
    }
    if let Some(contact) = body.contact {
        pharmacy.contact = contact;
    }
    if let Some(hours) = body.operating_hours {
        pharmacy.operating_hours = validated_hours(hours)?;
    }
    if let Some(is_active) = body.is_active {
        pharmacy.is_active = is_active;
    }
    pharmacy.updated_at = Utc::now();

    if !state.store.update_pharmacy(&pharmacy).await? {
        return Err(ApiError::not_found("pharmacy_not_found"));
    }
    info!(pharmacy_id = %id, is_active = pharmacy.is_active, "pharmacy updated");
    Ok(Json(pharmacy))
}

pub async fn delete_pharmacy(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut pharmacy = owned_pharmacy(&state, &auth, id).await?;
    pharmacy.is_active = false;
    pharmacy.updated_at = Utc::now();
    if !state.store.update_pharmacy(&pharmacy).await? {
        return Err(ApiError::not_found("pharmacy_not_found"));
    }
    info!(pharmacy_id = %id, "pharmacy deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_address_parts_rejected() {
        let address = Address {
            street: "1 Marina".into(),
            city: " ".into(),
            state: "Lagos".into(),
            postal_code: "101001".into(),
        };
        assert_eq!(validated_address(address).unwrap_err().code(), "invalid_address");
    }

    #[test]
    fn operating_hours_must_be_an_object() {
        assert!(validated_hours(serde_json::json!({"mon": "08:00-20:00"})).is_ok());
        assert_eq!(
            validated_hours(serde_json::json!(["mon"])).unwrap_err().code(),
            "invalid_operating_hours"
        );
    }
}
