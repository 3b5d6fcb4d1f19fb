use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common_money::Price;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{Candidate, LocatorStore, MedicineFilter, MedicineOrder, StoreError, StoreResult};
use crate::geo::{GeoPoint, GeoRadius};
use crate::inventory_status::StockStatus;
use crate::model::{
    Address, Contact, InventoryLine, InventoryRecord, Medicine, MedicineSummary, Pharmacy,
    PharmacyWithDistance,
};
use crate::pagination::PageRequest;

/// Haversine distance in metres from ($1 = latitude, $2 = longitude) to the row's coordinates.
const DISTANCE_SQL: &str = "(2 * 6371008.8 * asin(LEAST(1.0, sqrt(\
    power(sin(radians(latitude - $1) / 2), 2) \
    + cos(radians($1)) * cos(radians(latitude)) * power(sin(radians(longitude - $2) / 2), 2)))))";

const PHARMACY_COLUMNS: &str = "id, name, registration_number, street, city, state, postal_code, \
    latitude, longitude, phone, email, owner_id, rating, operating_hours, is_active, created_at, updated_at";

const INVENTORY_COLUMNS: &str = "i.id, i.pharmacy_id, i.medicine_id, i.quantity, i.price, i.batch_number, \
    i.expiry_date, i.low_stock_threshold, i.status, i.last_restocked, i.created_at, i.updated_at";

#[derive(Clone)]
pub struct PgLocatorStore {
    pool: PgPool,
}

impl PgLocatorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[derive(sqlx::FromRow)]
struct MedicineRow {
    id: Uuid,
    name: String,
    generic_name: Option<String>,
    category: String,
    description: Option<String>,
    manufacturer: Option<String>,
    strength: Option<String>,
    unit: String,
    requires_prescription: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MedicineRow> for Medicine {
    type Error = StoreError;

    fn try_from(row: MedicineRow) -> StoreResult<Self> {
        Ok(Medicine {
            id: row.id,
            name: row.name,
            generic_name: row.generic_name,
            category: row.category.parse().map_err(corrupt)?,
            description: row.description,
            manufacturer: row.manufacturer,
            strength: row.strength,
            unit: row.unit.parse().map_err(corrupt)?,
            requires_prescription: row.requires_prescription,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PharmacyRow {
    id: Uuid,
    name: String,
    registration_number: String,
    street: String,
    city: String,
    state: String,
    postal_code: String,
    latitude: f64,
    longitude: f64,
    phone: Option<String>,
    email: Option<String>,
    owner_id: Uuid,
    rating: Option<f64>,
    operating_hours: serde_json::Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(default)]
    distance_meters: Option<f64>,
}

impl From<PharmacyRow> for PharmacyWithDistance {
    fn from(row: PharmacyRow) -> Self {
        PharmacyWithDistance {
            distance_meters: row.distance_meters,
            pharmacy: Pharmacy {
                id: row.id,
                name: row.name,
                registration_number: row.registration_number,
                address: Address {
                    street: row.street,
                    city: row.city,
                    state: row.state,
                    postal_code: row.postal_code,
                },
                location: GeoPoint { longitude: row.longitude, latitude: row.latitude },
                contact: Contact { phone: row.phone, email: row.email },
                owner_id: row.owner_id,
                rating: row.rating,
                operating_hours: row.operating_hours,
                is_active: row.is_active,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

impl From<PharmacyRow> for Pharmacy {
    fn from(row: PharmacyRow) -> Self {
        PharmacyWithDistance::from(row).pharmacy
    }
}

#[derive(sqlx::FromRow)]
struct InventoryRow {
    id: Uuid,
    pharmacy_id: Uuid,
    medicine_id: Uuid,
    quantity: i32,
    price: Price,
    batch_number: Option<String>,
    expiry_date: NaiveDate,
    low_stock_threshold: i32,
    status: String,
    last_restocked: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InventoryRow> for InventoryRecord {
    type Error = StoreError;

    fn try_from(row: InventoryRow) -> StoreResult<Self> {
        Ok(InventoryRecord {
            id: row.id,
            pharmacy_id: row.pharmacy_id,
            medicine_id: row.medicine_id,
            quantity: u32::try_from(row.quantity).map_err(corrupt)?,
            price: row.price,
            batch_number: row.batch_number,
            expiry_date: row.expiry_date,
            low_stock_threshold: u32::try_from(row.low_stock_threshold).map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            last_restocked: row.last_restocked,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InventoryLineRow {
    #[sqlx(flatten)]
    record: InventoryRow,
    medicine_name: String,
    medicine_category: String,
    medicine_strength: Option<String>,
    medicine_unit: String,
}

impl TryFrom<InventoryLineRow> for InventoryLine {
    type Error = StoreError;

    fn try_from(row: InventoryLineRow) -> StoreResult<Self> {
        let record = InventoryRecord::try_from(row.record)?;
        Ok(InventoryLine {
            medicine: MedicineSummary {
                id: record.medicine_id,
                name: row.medicine_name,
                category: row.medicine_category.parse().map_err(corrupt)?,
                strength: row.medicine_strength,
                unit: row.medicine_unit.parse().map_err(corrupt)?,
            },
            record,
        })
    }
}

fn corrupt<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Corrupt(err.to_string())
}

fn to_i32(value: u32, column: &str) -> StoreResult<i32> {
    i32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} {value} exceeds INTEGER range")))
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn page_binds(page: PageRequest) -> (i64, i64) {
    (page.limit() as i64, page.offset() as i64)
}

/// `%text%` for ILIKE with the pattern metacharacters escaped.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl LocatorStore for PgLocatorStore {
    async fn insert_medicine(&self, medicine: &Medicine) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO medicines (id, name, generic_name, category, description, manufacturer, strength, unit, \
             requires_prescription, is_active, created_at, updated_at) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)",
        )
        .bind(medicine.id)
        .bind(&medicine.name)
        .bind(&medicine.generic_name)
        .bind(medicine.category.as_str())
        .bind(&medicine.description)
        .bind(&medicine.manufacturer)
        .bind(&medicine.strength)
        .bind(medicine.unit.as_str())
        .bind(medicine.requires_prescription)
        .bind(medicine.is_active)
        .bind(medicine.created_at)
        .bind(medicine.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_medicine(&self, medicine: &Medicine) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE medicines SET name = $2, generic_name = $3, category = $4, description = $5, manufacturer = $6, \
             strength = $7, unit = $8, requires_prescription = $9, is_active = $10, updated_at = $11 WHERE id = $1",
        )
        .bind(medicine.id)
        .bind(&medicine.name)
        .bind(&medicine.generic_name)
        .bind(medicine.category.as_str())
        .bind(&medicine.description)
        .bind(&medicine.manufacturer)
        .bind(&medicine.strength)
        .bind(medicine.unit.as_str())
        .bind(medicine.requires_prescription)
        .bind(medicine.is_active)
        .bind(medicine.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn medicine_by_id(&self, id: Uuid) -> StoreResult<Option<Medicine>> {
        let row = sqlx::query_as::<_, MedicineRow>("SELECT * FROM medicines WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Medicine::try_from).transpose()
    }

    async fn active_medicine_by_name(&self, name: &str) -> StoreResult<Option<Medicine>> {
        let row = sqlx::query_as::<_, MedicineRow>(
            "SELECT * FROM medicines WHERE is_active AND lower(name) = lower($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Medicine::try_from).transpose()
    }

    async fn medicine_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM medicines WHERE lower(name) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn list_medicines(
        &self,
        filter: &MedicineFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Medicine>, u64)> {
        const WHERE: &str = "WHERE is_active AND ($1::text IS NULL OR category = $1) \
             AND ($2::text IS NULL OR name ILIKE $2 OR generic_name ILIKE $2 OR description ILIKE $2)";
        let order = match filter.order {
            MedicineOrder::Name => "name, id",
            MedicineOrder::NewestFirst => "created_at DESC, id",
        };
        let category = filter.category.map(|c| c.as_str());
        let pattern = filter.text.as_deref().map(like_pattern);
        let (limit, offset) = page_binds(page);

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM medicines {WHERE}"))
            .bind(category)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query_as::<_, MedicineRow>(&format!(
            "SELECT * FROM medicines {WHERE} ORDER BY {order} LIMIT $3 OFFSET $4"
        ))
        .bind(category)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let medicines = rows.into_iter().map(Medicine::try_from).collect::<StoreResult<Vec<_>>>()?;
        Ok((medicines, to_count(total)))
    }

    async fn insert_pharmacy(&self, pharmacy: &Pharmacy) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO pharmacies ({PHARMACY_COLUMNS}) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17)"
        ))
        .bind(pharmacy.id)
        .bind(&pharmacy.name)
        .bind(&pharmacy.registration_number)
        .bind(&pharmacy.address.street)
        .bind(&pharmacy.address.city)
        .bind(&pharmacy.address.state)
        .bind(&pharmacy.address.postal_code)
        .bind(pharmacy.location.latitude)
        .bind(pharmacy.location.longitude)
        .bind(&pharmacy.contact.phone)
        .bind(&pharmacy.contact.email)
        .bind(pharmacy.owner_id)
        .bind(pharmacy.rating)
        .bind(&pharmacy.operating_hours)
        .bind(pharmacy.is_active)
        .bind(pharmacy.created_at)
        .bind(pharmacy.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_pharmacy(&self, pharmacy: &Pharmacy) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE pharmacies SET name = $2, registration_number = $3, street = $4, city = $5, state = $6, \
             postal_code = $7, latitude = $8, longitude = $9, phone = $10, email = $11, rating = $12, \
             operating_hours = $13, is_active = $14, updated_at = $15 WHERE id = $1",
        )
        .bind(pharmacy.id)
        .bind(&pharmacy.name)
        .bind(&pharmacy.registration_number)
        .bind(&pharmacy.address.street)
        .bind(&pharmacy.address.city)
        .bind(&pharmacy.address.state)
        .bind(&pharmacy.address.postal_code)
        .bind(pharmacy.location.latitude)
        .bind(pharmacy.location.longitude)
        .bind(&pharmacy.contact.phone)
        .bind(&pharmacy.contact.email)
        .bind(pharmacy.rating)
        .bind(&pharmacy.operating_hours)
        .bind(pharmacy.is_active)
        .bind(pharmacy.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn pharmacy_by_id(&self, id: Uuid) -> StoreResult<Option<Pharmacy>> {
        let row = sqlx::query_as::<_, PharmacyRow>(&format!(
            "SELECT {PHARMACY_COLUMNS} FROM pharmacies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Pharmacy::from))
    }

    async fn pharmacy_by_registration(&self, registration_number: &str) -> StoreResult<Option<Pharmacy>> {
        let row = sqlx::query_as::<_, PharmacyRow>(&format!(
            "SELECT {PHARMACY_COLUMNS} FROM pharmacies WHERE registration_number = $1"
        ))
        .bind(registration_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Pharmacy::from))
    }

    async fn active_pharmacy_for_owner(&self, owner_id: Uuid) -> StoreResult<Option<Pharmacy>> {
        let row = sqlx::query_as::<_, PharmacyRow>(&format!(
            "SELECT {PHARMACY_COLUMNS} FROM pharmacies WHERE owner_id = $1 AND is_active \
             ORDER BY created_at LIMIT 1"
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Pharmacy::from))
    }

    async fn pharmacies_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Pharmacy>> {
        let rows = sqlx::query_as::<_, PharmacyRow>(&format!(
            "SELECT {PHARMACY_COLUMNS} FROM pharmacies WHERE id = ANY($1::uuid[])"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Pharmacy::from).collect())
    }

    async fn list_pharmacies(
        &self,
        near: Option<GeoRadius>,
        page: PageRequest,
    ) -> StoreResult<(Vec<PharmacyWithDistance>, u64)> {
        let (limit, offset) = page_binds(page);
        let (rows, total) = match near {
            Some(GeoRadius { origin, radius_meters }) => {
                let total = sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM pharmacies WHERE is_active AND {DISTANCE_SQL} <= $3"
                ))
                .bind(origin.latitude)
                .bind(origin.longitude)
                .bind(radius_meters)
                .fetch_one(&self.pool)
                .await?;
                let rows = sqlx::query_as::<_, PharmacyRow>(&format!(
                    "SELECT * FROM (SELECT {PHARMACY_COLUMNS}, {DISTANCE_SQL} AS distance_meters \
                     FROM pharmacies WHERE is_active) nearby \
                     WHERE distance_meters <= $3 ORDER BY distance_meters, id LIMIT $4 OFFSET $5"
                ))
                .bind(origin.latitude)
                .bind(origin.longitude)
                .bind(radius_meters)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (rows, total)
            }
            None => {
                let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pharmacies WHERE is_active")
                    .fetch_one(&self.pool)
                    .await?;
                let rows = sqlx::query_as::<_, PharmacyRow>(&format!(
                    "SELECT {PHARMACY_COLUMNS} FROM pharmacies WHERE is_active ORDER BY name, id LIMIT $1 OFFSET $2"
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (rows, total)
            }
        };
        Ok((rows.into_iter().map(PharmacyWithDistance::from).collect(), to_count(total)))
    }

    async fn candidate_pharmacies(&self, near: Option<GeoRadius>) -> StoreResult<Vec<Candidate>> {
        let rows = match near {
            Some(GeoRadius { origin, radius_meters }) => {
                sqlx::query(&format!(
                    "SELECT id, distance_meters FROM (SELECT id, {DISTANCE_SQL} AS distance_meters \
                     FROM pharmacies WHERE is_active) nearby \
                     WHERE distance_meters <= $3 ORDER BY distance_meters, id"
                ))
                .bind(origin.latitude)
                .bind(origin.longitude)
                .bind(radius_meters)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, NULL::float8 AS distance_meters FROM pharmacies WHERE is_active ORDER BY name, id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows
            .into_iter()
            .map(|r| Candidate {
                pharmacy_id: r.get("id"),
                distance_meters: r.get::<Option<f64>, _>("distance_meters"),
            })
            .collect())
    }

    async fn insert_inventory(&self, record: &InventoryRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO inventory (id, pharmacy_id, medicine_id, quantity, price, batch_number, expiry_date, \
             low_stock_threshold, status, last_restocked, created_at, updated_at) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)",
        )
        .bind(record.id)
        .bind(record.pharmacy_id)
        .bind(record.medicine_id)
        .bind(to_i32(record.quantity, "quantity")?)
        .bind(&record.price)
        .bind(&record.batch_number)
        .bind(record.expiry_date)
        .bind(to_i32(record.low_stock_threshold, "low_stock_threshold")?)
        .bind(record.status.as_str())
        .bind(record.last_restocked)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_inventory(&self, record: &InventoryRecord) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE inventory SET quantity = $3, price = $4, batch_number = $5, expiry_date = $6, \
             low_stock_threshold = $7, status = $8, last_restocked = $9, updated_at = $10 \
             WHERE id = $1 AND pharmacy_id = $2",
        )
        .bind(record.id)
        .bind(record.pharmacy_id)
        .bind(to_i32(record.quantity, "quantity")?)
        .bind(&record.price)
        .bind(&record.batch_number)
        .bind(record.expiry_date)
        .bind(to_i32(record.low_stock_threshold, "low_stock_threshold")?)
        .bind(record.status.as_str())
        .bind(record.last_restocked)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn inventory_by_id(&self, pharmacy_id: Uuid, id: Uuid) -> StoreResult<Option<InventoryRecord>> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory i WHERE i.id = $1 AND i.pharmacy_id = $2"
        ))
        .bind(id)
        .bind(pharmacy_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(InventoryRecord::try_from).transpose()
    }

    async fn delete_inventory(&self, pharmacy_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1 AND pharmacy_id = $2")
            .bind(id)
            .bind(pharmacy_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pharmacy_inventory(
        &self,
        pharmacy_id: Uuid,
        status: Option<StockStatus>,
        page: PageRequest,
    ) -> StoreResult<(Vec<InventoryLine>, u64)> {
        let status = status.map(|s| s.as_str());
        let (limit, offset) = page_binds(page);
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inventory WHERE pharmacy_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(pharmacy_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query_as::<_, InventoryLineRow>(&format!(
            "SELECT {INVENTORY_COLUMNS}, m.name AS medicine_name, m.category AS medicine_category, \
             m.strength AS medicine_strength, m.unit AS medicine_unit \
             FROM inventory i JOIN medicines m ON m.id = i.medicine_id \
             WHERE i.pharmacy_id = $1 AND ($2::text IS NULL OR i.status = $2) \
             ORDER BY m.name, i.id LIMIT $3 OFFSET $4"
        ))
        .bind(pharmacy_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let lines = rows.into_iter().map(InventoryLine::try_from).collect::<StoreResult<Vec<_>>>()?;
        Ok((lines, to_count(total)))
    }

    async fn inventory_status_counts(&self, pharmacy_id: Uuid) -> StoreResult<Vec<(StockStatus, u64)>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM inventory WHERE pharmacy_id = $1 GROUP BY status")
            .bind(pharmacy_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|r| -> StoreResult<(StockStatus, u64)> {
                let status = r.get::<String, _>("status").parse::<StockStatus>().map_err(corrupt)?;
                Ok((status, to_count(r.get::<i64, _>("n"))))
            })
            .collect()
    }

    async fn available_inventory(
        &self,
        medicine_id: Uuid,
        candidates: &[Uuid],
        page: PageRequest,
    ) -> StoreResult<(Vec<InventoryRecord>, u64)> {
        if candidates.is_empty() {
            return Ok((Vec::new(), 0));
        }
        let (limit, offset) = page_binds(page);
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inventory \
             WHERE medicine_id = $1 AND pharmacy_id = ANY($2::uuid[]) AND status <> 'out_of_stock'",
        )
        .bind(medicine_id)
        .bind(candidates)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory i \
             WHERE i.medicine_id = $1 AND i.pharmacy_id = ANY($2::uuid[]) AND i.status <> 'out_of_stock' \
             ORDER BY array_position($2::uuid[], i.pharmacy_id), i.id LIMIT $3 OFFSET $4"
        ))
        .bind(medicine_id)
        .bind(candidates)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let records = rows.into_iter().map(InventoryRecord::try_from).collect::<StoreResult<Vec<_>>>()?;
        Ok((records, to_count(total)))
    }
}
