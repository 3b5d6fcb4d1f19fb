use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use common_auth::{ensure_role, AuthContext, ROLE_PHARMACY_ADMIN, ROLE_SYSTEM_ADMIN};
use common_http_errors::ApiError;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{LocatorError, LocatorResult};
use crate::model::{Medicine, MedicineCategory, MedicineUnit};
use crate::pagination::{PageParams, Paginated};
use crate::store::{MedicineFilter, MedicineOrder};

pub(crate) const MEDICINE_CREATE_ROLES: &[&str] = &[ROLE_PHARMACY_ADMIN, ROLE_SYSTEM_ADMIN];
pub(crate) const MEDICINE_ADMIN_ROLES: &[&str] = &[ROLE_SYSTEM_ADMIN];

const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMedicineRequest {
    pub name: String,
    pub generic_name: Option<String>,
    pub category: MedicineCategory,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub strength: Option<String>,
    pub unit: MedicineUnit,
    #[serde(default)]
    pub requires_prescription: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMedicineRequest {
    pub name: Option<String>,
    pub generic_name: Option<String>,
    pub category: Option<MedicineCategory>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub strength: Option<String>,
    pub unit: Option<MedicineUnit>,
    pub requires_prescription: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MedicineSearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    #[serde(flatten)]
    pub page: PageParams,
}

fn medicine_name(raw: &str) -> LocatorResult<String> {
    let name = raw.trim();
    if name.chars().count() < 2 {
        return Err(LocatorError::invalid("invalid_name", "name must be at least 2 characters"));
    }
    Ok(name.to_string())
}

fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn description(raw: Option<String>) -> LocatorResult<Option<String>> {
    let text = optional_text(raw);
    if text.as_ref().is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_CHARS) {
        return Err(LocatorError::invalid(
            "invalid_description",
            format!("description must be at most {MAX_DESCRIPTION_CHARS} characters"),
        ));
    }
    Ok(text)
}

fn category_filter(raw: Option<&str>) -> LocatorResult<Option<MedicineCategory>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<MedicineCategory>()
            .map(Some)
            .map_err(|e| LocatorError::invalid("invalid_category", e.to_string())),
    }
}

async fn load_medicine(state: &AppState, id: Uuid) -> LocatorResult<Medicine> {
    state
        .store
        .medicine_by_id(id)
        .await?
        .filter(|m| m.is_active)
        .ok_or_else(|| LocatorError::not_found("medicine_not_found"))
}

pub async fn create_medicine(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(body): Json<CreateMedicineRequest>,
) -> Result<(StatusCode, Json<Medicine>), ApiError> {
    ensure_role(&auth, MEDICINE_CREATE_ROLES)
        .map_err(|_| ApiError::ForbiddenMissingRole { role: ROLE_PHARMACY_ADMIN, trace_id: None })?;

    let name = medicine_name(&body.name)?;
    if state.store.medicine_name_taken(&name, None).await? {
        return Err(LocatorError::conflict("medicine_exists", format!("medicine '{name}' already exists")).into());
    }
    let now = Utc::now();
    let medicine = Medicine {
        id: Uuid::new_v4(),
        name,
        generic_name: optional_text(body.generic_name),
        category: body.category,
        description: description(body.description)?,
        manufacturer: optional_text(body.manufacturer),
        strength: optional_text(body.strength),
        unit: body.unit,
        requires_prescription: body.requires_prescription,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_medicine(&medicine).await?;
    info!(medicine_id = %medicine.id, name = %medicine.name, created_by = %auth.user_id(), "medicine created");
    Ok((StatusCode::CREATED, Json(medicine)))
}

pub async fn search_medicines(
    State(state): State<AppState>,
    Query(params): Query<MedicineSearchParams>,
) -> Result<Json<Paginated<Medicine>>, ApiError> {
    let text = params.query.as_deref().map(str::trim).unwrap_or_default();
    if text.chars().count() < 2 {
        return Err(LocatorError::invalid("invalid_query", "query must be at least 2 characters").into());
    }
    let filter = MedicineFilter {
        text: Some(text.to_lowercase()),
        category: category_filter(params.category.as_deref())?,
        order: MedicineOrder::NewestFirst,
    };
    let page = params.page.to_request()?;
    let (rows, total) = state.store.list_medicines(&filter, page).await?;
    Ok(Json(Paginated::new(rows, page, total)))
}

pub async fn list_medicines(
    State(state): State<AppState>,
    Query(params): Query<MedicineSearchParams>,
) -> Result<Json<Paginated<Medicine>>, ApiError> {
    let filter = MedicineFilter {
        text: None,
        category: category_filter(params.category.as_deref())?,
        order: MedicineOrder::Name,
    };
    let page = params.page.to_request()?;
    let (rows, total) = state.store.list_medicines(&filter, page).await?;
    Ok(Json(Paginated::new(rows, page, total)))
}

pub async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Medicine>, ApiError> {
    Ok(Json(load_medicine(&state, id).await?))
}

pub async fn update_medicine(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMedicineRequest>,
) -> Result<Json<Medicine>, ApiError> {
    ensure_role(&auth, MEDICINE_ADMIN_ROLES)
        .map_err(|_| ApiError::ForbiddenMissingRole { role: ROLE_SYSTEM_ADMIN, trace_id: None })?;

    // Deactivated entries stay hidden unless the request reactivates them.
    let mut medicine = state
        .store
        .medicine_by_id(id)
        .await?
        .filter(|m| m.is_active || body.is_active == Some(true))
        .ok_or_else(|| LocatorError::not_found("medicine_not_found"))?;
    if let Some(raw) = body.name.as_deref() {
        let name = medicine_name(raw)?;
        if state.store.medicine_name_taken(&name, Some(id)).await? {
            return Err(LocatorError::conflict("medicine_exists", format!("medicine '{name}' already exists")).into());
        }
        medicine.name = name;
    }
    if body.generic_name.is_some() {
        medicine.generic_name = optional_text(body.generic_name);
    }
    if let Some(category) = body.category {
        medicine.category = category;
    }
    if body.description.is_some() {
        medicine.description = description(body.description)?;
    }
    if body.manufacturer.is_some() {
        medicine.manufacturer = optional_text(body.manufacturer);
    }
    if body.strength.is_some() {
        medicine.strength = optional_text(body.strength);
    }
    if let Some(unit) = body.unit {
        medicine.unit = unit;
    }
    if let Some(requires_prescription) = body.requires_prescription {
        medicine.requires_prescription = requires_prescription;
    }
    if let Some(is_active) = body.is_active {
        medicine.is_active = is_active;
    }
    medicine.updated_at = Utc::now();

    if !state.store.update_medicine(&medicine).await? {
        return Err(ApiError::not_found("medicine_not_found"));
    }
    info!(medicine_id = %id, is_active = medicine.is_active, "medicine updated");
    Ok(Json(medicine))
}

pub async fn delete_medicine(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_role(&auth, MEDICINE_ADMIN_ROLES)
        .map_err(|_| ApiError::ForbiddenMissingRole { role: ROLE_SYSTEM_ADMIN, trace_id: None })?;

    let mut medicine = load_medicine(&state, id).await?;
    medicine.is_active = false;
    medicine.updated_at = Utc::now();
    if !state.store.update_medicine(&medicine).await? {
        return Err(ApiError::not_found("medicine_not_found"));
    }
    info!(medicine_id = %id, "medicine deactivated");
    Ok(StatusCode::NO_CONTENT)
}
