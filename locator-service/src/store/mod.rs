//! Persistence seam. Handlers and the availability search only ever see
//! `Arc<dyn LocatorStore>`; Postgres backs production, the in-memory store
//! backs tests and local demos.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::geo::GeoRadius;
use crate::inventory_status::StockStatus;
use crate::model::{
    InventoryLine, InventoryRecord, Medicine, MedicineCategory, Pharmacy, PharmacyWithDistance,
};
use crate::pagination::PageRequest;

pub mod memory;
pub mod postgres;

pub use memory::MemoryLocatorStore;
pub use postgres::PgLocatorStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint:?}")]
    Conflict { constraint: Option<String> },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("row could not be decoded: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &value {
            // 23505 = unique_violation
            if db.code().as_deref() == Some("23505") {
                return StoreError::Conflict {
                    constraint: db.constraint().map(str::to_string),
                };
            }
        }
        StoreError::Unavailable(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MedicineOrder {
    #[default]
    Name,
    NewestFirst,
}

/// Active medicines only. `text` matches name, generic name or description, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicineFilter {
    pub text: Option<String>,
    pub category: Option<MedicineCategory>,
    pub order: MedicineOrder,
}

/// An active pharmacy admitted to an availability search, in search order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub pharmacy_id: Uuid,
    pub distance_meters: Option<f64>,
}

#[async_trait]
pub trait LocatorStore: Send + Sync {
    async fn insert_medicine(&self, medicine: &Medicine) -> StoreResult<()>;
    async fn update_medicine(&self, medicine: &Medicine) -> StoreResult<bool>;
    async fn medicine_by_id(&self, id: Uuid) -> StoreResult<Option<Medicine>>;
    /// Exact, case-insensitive match among active medicines.
    async fn active_medicine_by_name(&self, name: &str) -> StoreResult<Option<Medicine>>;
    /// Case-insensitive name clash with any medicine (active or not) other than `exclude`.
    async fn medicine_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool>;
    async fn list_medicines(
        &self,
        filter: &MedicineFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Medicine>, u64)>;

    async fn insert_pharmacy(&self, pharmacy: &Pharmacy) -> StoreResult<()>;
    async fn update_pharmacy(&self, pharmacy: &Pharmacy) -> StoreResult<bool>;
    async fn pharmacy_by_id(&self, id: Uuid) -> StoreResult<Option<Pharmacy>>;
    async fn pharmacy_by_registration(&self, registration_number: &str) -> StoreResult<Option<Pharmacy>>;
    async fn active_pharmacy_for_owner(&self, owner_id: Uuid) -> StoreResult<Option<Pharmacy>>;
    async fn pharmacies_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Pharmacy>>;
    /// Active pharmacies. With `near`: within the radius, nearest first. Without: by name.
    async fn list_pharmacies(
        &self,
        near: Option<GeoRadius>,
        page: PageRequest,
    ) -> StoreResult<(Vec<PharmacyWithDistance>, u64)>;
    /// Same filter and order as `list_pharmacies`, unpaged and reduced to ids.
    async fn candidate_pharmacies(&self, near: Option<GeoRadius>) -> StoreResult<Vec<Candidate>>;

    async fn insert_inventory(&self, record: &InventoryRecord) -> StoreResult<()>;
    /// Writes every mutable column of the row, scoped to `record.pharmacy_id`.
    async fn update_inventory(&self, record: &InventoryRecord) -> StoreResult<bool>;
    async fn inventory_by_id(&self, pharmacy_id: Uuid, id: Uuid) -> StoreResult<Option<InventoryRecord>>;
    async fn delete_inventory(&self, pharmacy_id: Uuid, id: Uuid) -> StoreResult<bool>;
    async fn list_pharmacy_inventory(
        &self,
        pharmacy_id: Uuid,
        status: Option<StockStatus>,
        page: PageRequest,
    ) -> StoreResult<(Vec<InventoryLine>, u64)>;
    async fn inventory_status_counts(&self, pharmacy_id: Uuid) -> StoreResult<Vec<(StockStatus, u64)>>;
    /// Rows for `medicine_id` held by `candidates`, excluding out-of-stock, ordered by
    /// candidate position then inventory id. Returns the page plus the unpaged count.
    async fn available_inventory(
        &self,
        medicine_id: Uuid,
        candidates: &[Uuid],
        page: PageRequest,
    ) -> StoreResult<(Vec<InventoryRecord>, u64)>;
}
