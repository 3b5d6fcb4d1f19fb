//! Medicine availability search.
//!
//! Resolves the candidate pharmacy set first (active, optionally within a
//! radius of the caller, nearest first), then pages the inventory rows for the
//! medicine held by those pharmacies, skipping anything out of stock. Each
//! returned row carries a pharmacy summary and a medicine summary.
//!
//! Pagination is not snapshot-isolated: inventory written between two page
//! requests can shift rows across page boundaries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LocatorError, LocatorResult};
use crate::geo::{self, GeoPoint, GeoRadius, DEFAULT_RADIUS_METERS};
use crate::model::{InventoryRecord, MedicineSummary, PharmacySummary};
use crate::pagination::{PageRequest, Paginated};
use crate::store::LocatorStore;

/// Validated search input. `medicine_id` stays optional so a missing id is reported
/// by the search itself rather than by whatever built the query.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityQuery {
    pub medicine_id: Option<Uuid>,
    pub origin: Option<GeoPoint>,
    pub radius_meters: f64,
    pub page: u32,
    pub page_size: u32,
}

impl AvailabilityQuery {
    pub fn new(medicine_id: Uuid) -> Self {
        let defaults = PageRequest::default();
        Self {
            medicine_id: Some(medicine_id),
            origin: None,
            radius_meters: DEFAULT_RADIUS_METERS,
            page: defaults.page,
            page_size: defaults.page_size,
        }
    }

    pub fn near(mut self, origin: GeoPoint, radius_meters: f64) -> Self {
        self.origin = Some(origin);
        self.radius_meters = radius_meters;
        self
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

/// Raw query-string form: `medicineId`, `latitude`, `longitude`, `maxDistance`, `page`, `limit`.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    #[serde(alias = "medicineId")]
    pub medicine_id: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(alias = "maxDistance")]
    pub max_distance: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl AvailabilityParams {
    pub fn parse(&self, default_radius_meters: f64) -> LocatorResult<AvailabilityQuery> {
        let medicine_id = match self.medicine_id.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => None,
            Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
                LocatorError::invalid("invalid_medicine_id", format!("'{raw}' is not a valid medicine id"))
            })?),
        };
        let origin = geo::parse_origin(self.latitude.as_deref(), self.longitude.as_deref())?;
        let radius_meters = match self.max_distance.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => default_radius_meters,
            Some(raw) => raw.parse::<f64>().map_err(|_| {
                LocatorError::invalid("invalid_radius", format!("maxDistance '{raw}' is not a number"))
            })?,
        };
        let page = PageRequest::from_params(self.page.as_deref(), self.limit.as_deref())?;
        Ok(AvailabilityQuery {
            medicine_id,
            origin,
            radius_meters,
            page: page.page,
            page_size: page.page_size,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityHit {
    #[serde(flatten)]
    pub inventory: InventoryRecord,
    pub pharmacy: PharmacySummary,
    pub medicine: MedicineSummary,
}

pub type AvailabilityPage = Paginated<AvailabilityHit>;

pub async fn search_availability(
    store: &dyn LocatorStore,
    query: &AvailabilityQuery,
) -> LocatorResult<AvailabilityPage> {
    let medicine_id = query
        .medicine_id
        .ok_or_else(|| LocatorError::invalid("missing_medicine_id", "medicineId is required"))?;
    let page = PageRequest::new(query.page, query.page_size)?;
    let near = match query.origin {
        Some(origin) => Some(GeoRadius {
            origin,
            radius_meters: geo::validate_radius(query.radius_meters)?,
        }),
        None => None,
    };

    let medicine = store
        .medicine_by_id(medicine_id)
        .await?
        .filter(|m| m.is_active)
        .ok_or_else(|| LocatorError::not_found("medicine_not_found"))?;

    let candidates = store.candidate_pharmacies(near).await?;
    if candidates.is_empty() {
        return Ok(Paginated::new(Vec::new(), page, 0));
    }
    let candidate_ids: Vec<Uuid> = candidates.iter().map(|c| c.pharmacy_id).collect();
    let distances: HashMap<Uuid, Option<f64>> =
        candidates.iter().map(|c| (c.pharmacy_id, c.distance_meters)).collect();

    let (records, total) = store.available_inventory(medicine_id, &candidate_ids, page).await?;

    let mut page_pharmacy_ids: Vec<Uuid> = records.iter().map(|r| r.pharmacy_id).collect();
    page_pharmacy_ids.sort_unstable();
    page_pharmacy_ids.dedup();
    let pharmacies: HashMap<Uuid, PharmacySummary> = store
        .pharmacies_by_ids(&page_pharmacy_ids)
        .await?
        .iter()
        .map(|p| (p.id, PharmacySummary::new(p, distances.get(&p.id).copied().flatten())))
        .collect();

    let medicine_summary = MedicineSummary::from(&medicine);
    let mut hits = Vec::with_capacity(records.len());
    for inventory in records {
        // A pharmacy deactivated between the two reads drops out of this page.
        let Some(pharmacy) = pharmacies.get(&inventory.pharmacy_id) else {
            continue;
        };
        hits.push(AvailabilityHit {
            pharmacy: pharmacy.clone(),
            medicine: medicine_summary.clone(),
            inventory,
        });
    }
    Ok(Paginated::new(hits, page, total))
}
