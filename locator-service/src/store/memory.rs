use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{Candidate, LocatorStore, MedicineFilter, MedicineOrder, StoreError, StoreResult};
use crate::geo::GeoRadius;
use crate::inventory_status::StockStatus;
use crate::model::{
    InventoryLine, InventoryRecord, Medicine, MedicineSummary, Pharmacy, PharmacyWithDistance,
};
use crate::pagination::PageRequest;

#[derive(Default)]
struct Tables {
    medicines: HashMap<Uuid, Medicine>,
    pharmacies: HashMap<Uuid, Pharmacy>,
    inventory: HashMap<Uuid, InventoryRecord>,
}

/// Process-local store with the same unique keys as the Postgres schema.
#[derive(Default)]
pub struct MemoryLocatorStore {
    tables: RwLock<Tables>,
}

impl MemoryLocatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

fn conflict(constraint: &str) -> StoreError {
    StoreError::Conflict { constraint: Some(constraint.to_string()) }
}

fn page_of<T>(rows: Vec<T>, page: PageRequest) -> (Vec<T>, u64) {
    let total = rows.len() as u64;
    let data = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (data, total)
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

fn name_clash(tables: &Tables, name: &str, exclude: Option<Uuid>) -> bool {
    let lowered = name.to_lowercase();
    tables
        .medicines
        .values()
        .any(|m| Some(m.id) != exclude && m.name.to_lowercase() == lowered)
}

fn registration_clash(tables: &Tables, registration_number: &str, exclude: Uuid) -> bool {
    tables
        .pharmacies
        .values()
        .any(|p| p.id != exclude && p.registration_number == registration_number)
}

/// Active pharmacies in search order with their distance from the origin.
fn ordered_pharmacies(tables: &Tables, near: Option<GeoRadius>) -> Vec<(&Pharmacy, Option<f64>)> {
    let active = tables.pharmacies.values().filter(|p| p.is_active);
    match near {
        Some(radius) => {
            let mut rows: Vec<(&Pharmacy, f64)> = active
                .map(|p| (p, radius.origin.distance_meters(&p.location)))
                .filter(|(_, d)| *d <= radius.radius_meters)
                .collect();
            rows.sort_by(|(a, da), (b, db)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)));
            rows.into_iter().map(|(p, d)| (p, Some(d))).collect()
        }
        None => {
            let mut rows: Vec<(&Pharmacy, Option<f64>)> = active.map(|p| (p, None)).collect();
            rows.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
            rows
        }
    }
}

#[async_trait]
impl LocatorStore for MemoryLocatorStore {
    async fn insert_medicine(&self, medicine: &Medicine) -> StoreResult<()> {
        let mut tables = self.write()?;
        if name_clash(&tables, &medicine.name, None) {
            return Err(conflict("medicines_name_lower_key"));
        }
        tables.medicines.insert(medicine.id, medicine.clone());
        Ok(())
    }

    async fn update_medicine(&self, medicine: &Medicine) -> StoreResult<bool> {
        let mut tables = self.write()?;
        if !tables.medicines.contains_key(&medicine.id) {
            return Ok(false);
        }
        if name_clash(&tables, &medicine.name, Some(medicine.id)) {
            return Err(conflict("medicines_name_lower_key"));
        }
        tables.medicines.insert(medicine.id, medicine.clone());
        Ok(true)
    }

    async fn medicine_by_id(&self, id: Uuid) -> StoreResult<Option<Medicine>> {
        Ok(self.read()?.medicines.get(&id).cloned())
    }

    async fn active_medicine_by_name(&self, name: &str) -> StoreResult<Option<Medicine>> {
        let lowered = name.to_lowercase();
        Ok(self
            .read()?
            .medicines
            .values()
            .find(|m| m.is_active && m.name.to_lowercase() == lowered)
            .cloned())
    }

    async fn medicine_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let tables = self.read()?;
        Ok(name_clash(&tables, name, exclude))
    }

    async fn list_medicines(
        &self,
        filter: &MedicineFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Medicine>, u64)> {
        let tables = self.read()?;
        let text = filter.text.as_deref().map(str::to_lowercase);
        let mut rows: Vec<Medicine> = tables
            .medicines
            .values()
            .filter(|m| m.is_active)
            .filter(|m| filter.category.map_or(true, |c| m.category == c))
            .filter(|m| match &text {
                Some(t) => {
                    m.name.to_lowercase().contains(t.as_str())
                        || contains_ci(m.generic_name.as_deref(), t)
                        || contains_ci(m.description.as_deref(), t)
                }
                None => true,
            })
            .cloned()
            .collect();
        match filter.order {
            MedicineOrder::Name => rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))),
            MedicineOrder::NewestFirst => {
                rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)))
            }
        }
        Ok(page_of(rows, page))
    }

    async fn insert_pharmacy(&self, pharmacy: &Pharmacy) -> StoreResult<()> {
        let mut tables = self.write()?;
        if registration_clash(&tables, &pharmacy.registration_number, pharmacy.id) {
            return Err(conflict("pharmacies_registration_number_key"));
        }
        tables.pharmacies.insert(pharmacy.id, pharmacy.clone());
        Ok(())
    }

    async fn update_pharmacy(&self, pharmacy: &Pharmacy) -> StoreResult<bool> {
        let mut tables = self.write()?;
        if !tables.pharmacies.contains_key(&pharmacy.id) {
            return Ok(false);
        }
        if registration_clash(&tables, &pharmacy.registration_number, pharmacy.id) {
            return Err(conflict("pharmacies_registration_number_key"));
        }
        tables.pharmacies.insert(pharmacy.id, pharmacy.clone());
        Ok(true)
    }

    async fn pharmacy_by_id(&self, id: Uuid) -> StoreResult<Option<Pharmacy>> {
        Ok(self.read()?.pharmacies.get(&id).cloned())
    }

    async fn pharmacy_by_registration(&self, registration_number: &str) -> StoreResult<Option<Pharmacy>> {
        Ok(self
            .read()?
            .pharmacies
            .values()
            .find(|p| p.registration_number == registration_number)
            .cloned())
    }

    async fn active_pharmacy_for_owner(&self, owner_id: Uuid) -> StoreResult<Option<Pharmacy>> {
        Ok(self
            .read()?
            .pharmacies
            .values()
            .find(|p| p.is_active && p.owner_id == owner_id)
            .cloned())
    }

    async fn pharmacies_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Pharmacy>> {
        let tables = self.read()?;
        Ok(ids.iter().filter_map(|id| tables.pharmacies.get(id).cloned()).collect())
    }

    async fn list_pharmacies(
        &self,
        near: Option<GeoRadius>,
        page: PageRequest,
    ) -> StoreResult<(Vec<PharmacyWithDistance>, u64)> {
        let tables = self.read()?;
        let rows = ordered_pharmacies(&tables, near)
            .into_iter()
            .map(|(p, distance_meters)| PharmacyWithDistance { pharmacy: p.clone(), distance_meters })
            .collect();
        Ok(page_of(rows, page))
    }

    async fn candidate_pharmacies(&self, near: Option<GeoRadius>) -> StoreResult<Vec<Candidate>> {
        let tables = self.read()?;
        Ok(ordered_pharmacies(&tables, near)
            .into_iter()
            .map(|(p, distance_meters)| Candidate { pharmacy_id: p.id, distance_meters })
            .collect())
    }

    async fn insert_inventory(&self, record: &InventoryRecord) -> StoreResult<()> {
        let mut tables = self.write()?;
        let duplicate = tables
            .inventory
            .values()
            .any(|r| r.pharmacy_id == record.pharmacy_id && r.medicine_id == record.medicine_id);
        if duplicate {
            return Err(conflict("inventory_pharmacy_medicine_key"));
        }
        tables.inventory.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_inventory(&self, record: &InventoryRecord) -> StoreResult<bool> {
        let mut tables = self.write()?;
        match tables.inventory.get_mut(&record.id) {
            Some(existing) if existing.pharmacy_id == record.pharmacy_id => {
                existing.quantity = record.quantity;
                existing.price = record.price.clone();
                existing.batch_number = record.batch_number.clone();
                existing.expiry_date = record.expiry_date;
                existing.low_stock_threshold = record.low_stock_threshold;
                existing.status = record.status;
                existing.last_restocked = record.last_restocked;
                existing.updated_at = record.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn inventory_by_id(&self, pharmacy_id: Uuid, id: Uuid) -> StoreResult<Option<InventoryRecord>> {
        Ok(self
            .read()?
            .inventory
            .get(&id)
            .filter(|r| r.pharmacy_id == pharmacy_id)
            .cloned())
    }

    async fn delete_inventory(&self, pharmacy_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.write()?;
        let owned = tables.inventory.get(&id).is_some_and(|r| r.pharmacy_id == pharmacy_id);
        if owned {
            tables.inventory.remove(&id);
        }
        Ok(owned)
    }

    async fn list_pharmacy_inventory(
        &self,
        pharmacy_id: Uuid,
        status: Option<StockStatus>,
        page: PageRequest,
    ) -> StoreResult<(Vec<InventoryLine>, u64)> {
        let tables = self.read()?;
        let mut rows = Vec::new();
        for record in tables.inventory.values() {
            if record.pharmacy_id != pharmacy_id || status.is_some_and(|s| s != record.status) {
                continue;
            }
            let medicine = tables.medicines.get(&record.medicine_id).ok_or_else(|| {
                StoreError::Corrupt(format!("inventory {} references missing medicine", record.id))
            })?;
            rows.push(InventoryLine { record: record.clone(), medicine: MedicineSummary::from(medicine) });
        }
        rows.sort_by(|a, b| {
            a.medicine
                .name
                .cmp(&b.medicine.name)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });
        Ok(page_of(rows, page))
    }

    async fn inventory_status_counts(&self, pharmacy_id: Uuid) -> StoreResult<Vec<(StockStatus, u64)>> {
        let tables = self.read()?;
        let mut counts: HashMap<StockStatus, u64> = HashMap::new();
        for record in tables.inventory.values().filter(|r| r.pharmacy_id == pharmacy_id) {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn available_inventory(
        &self,
        medicine_id: Uuid,
        candidates: &[Uuid],
        page: PageRequest,
    ) -> StoreResult<(Vec<InventoryRecord>, u64)> {
        let tables = self.read()?;
        let position: HashMap<Uuid, usize> =
            candidates.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut rows: Vec<(usize, InventoryRecord)> = tables
            .inventory
            .values()
            .filter(|r| r.medicine_id == medicine_id && r.status != StockStatus::OutOfStock)
            .filter_map(|r| position.get(&r.pharmacy_id).map(|pos| (*pos, r.clone())))
            .collect();
        rows.sort_by(|(pa, a), (pb, b)| pa.cmp(pb).then_with(|| a.id.cmp(&b.id)));
        Ok(page_of(rows.into_iter().map(|(_, r)| r).collect(), page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MedicineCategory, MedicineUnit};
    use chrono::Utc;

    fn medicine(name: &str) -> Medicine {
        let now = Utc::now();
        Medicine {
            id: Uuid::new_v4(),
            name: name.to_string(),
            generic_name: None,
            category: MedicineCategory::Antibiotic,
            description: None,
            manufacturer: None,
            strength: Some("250".into()),
            unit: MedicineUnit::Mg,
            requires_prescription: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn medicine_names_are_unique_ignoring_case() {
        let store = MemoryLocatorStore::new();
        let amoxicillin = medicine("Amoxicillin");
        store.insert_medicine(&amoxicillin).await.unwrap();

        assert!(store.medicine_name_taken("AMOXICILLIN", None).await.unwrap());
        assert!(!store.medicine_name_taken("amoxicillin", Some(amoxicillin.id)).await.unwrap());
        assert!(!store.medicine_name_taken("Ampicillin", None).await.unwrap());

        let err = store.insert_medicine(&medicine("amoxicillin")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { constraint: Some(c) } if c == "medicines_name_lower_key"));
    }
}
