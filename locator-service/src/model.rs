use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use common_money::Price;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::inventory_status::{derive_status, StockStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

text_enum!(MedicineCategory, "category", {
    Antibiotic => "Antibiotic",
    Painkiller => "Painkiller",
    Vitamin => "Vitamin",
    Supplement => "Supplement",
    Antacid => "Antacid",
    Antihistamine => "Antihistamine",
    Other => "Other",
});

text_enum!(MedicineUnit, "unit", {
    Mg => "mg",
    Ml => "ml",
    G => "g",
    Mcg => "mcg",
    Tablet => "tablet",
    Capsule => "capsule",
    Injection => "injection",
    Syrup => "syrup",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    pub category: MedicineCategory,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub strength: Option<String>,
    pub unit: MedicineUnit,
    pub requires_prescription: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineSummary {
    pub id: Uuid,
    pub name: String,
    pub category: MedicineCategory,
    pub strength: Option<String>,
    pub unit: MedicineUnit,
}

impl From<&Medicine> for MedicineSummary {
    fn from(value: &Medicine) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            category: value.category,
            strength: value.strength.clone(),
            unit: value.unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: Uuid,
    pub name: String,
    pub registration_number: String,
    pub address: Address,
    pub location: GeoPoint,
    pub contact: Contact,
    pub owner_id: Uuid,
    pub rating: Option<f64>,
    pub operating_hours: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacySummary {
    pub id: Uuid,
    pub name: String,
    pub address: Address,
    pub location: GeoPoint,
    pub contact: Contact,
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

impl PharmacySummary {
    pub fn new(pharmacy: &Pharmacy, distance_meters: Option<f64>) -> Self {
        Self {
            id: pharmacy.id,
            name: pharmacy.name.clone(),
            address: pharmacy.address.clone(),
            location: pharmacy.location,
            contact: pharmacy.contact.clone(),
            rating: pharmacy.rating,
            distance_meters,
        }
    }
}

/// A pharmacy plus its distance from the search origin, when one was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyWithDistance {
    #[serde(flatten)]
    pub pharmacy: Pharmacy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub medicine_id: Uuid,
    pub quantity: u32,
    pub price: Price,
    pub batch_number: Option<String>,
    pub expiry_date: NaiveDate,
    pub low_stock_threshold: u32,
    pub status: StockStatus,
    pub last_restocked: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a pharmacy may change on an existing inventory line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryChange {
    pub quantity: Option<u32>,
    pub price: Option<Price>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub low_stock_threshold: Option<u32>,
}

impl InventoryRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pharmacy_id: Uuid,
        medicine_id: Uuid,
        quantity: u32,
        price: Price,
        batch_number: Option<String>,
        expiry_date: NaiveDate,
        low_stock_threshold: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pharmacy_id,
            medicine_id,
            quantity,
            price,
            batch_number,
            expiry_date,
            low_stock_threshold,
            status: derive_status(quantity, low_stock_threshold),
            last_restocked: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the change and re-derives `status` from the merged quantity and threshold.
    pub fn apply(&mut self, change: InventoryChange, now: DateTime<Utc>) {
        if let Some(quantity) = change.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = change.price {
            self.price = price;
        }
        if let Some(batch) = change.batch_number {
            self.batch_number = Some(batch);
        }
        if let Some(expiry) = change.expiry_date {
            self.expiry_date = expiry;
        }
        if let Some(threshold) = change.low_stock_threshold {
            self.low_stock_threshold = threshold;
        }
        self.status = derive_status(self.quantity, self.low_stock_threshold);
        self.last_restocked = now;
        self.updated_at = now;
    }
}

/// An inventory row as listed for one pharmacy, with its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLine {
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub medicine: MedicineSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub pharmacy_id: Uuid,
    pub total: u64,
    pub in_stock: u64,
    pub low_stock: u64,
    pub out_of_stock: u64,
}

impl InventorySummary {
    pub fn from_counts(pharmacy_id: Uuid, counts: &[(StockStatus, u64)]) -> Self {
        let mut summary = InventorySummary { pharmacy_id, ..Default::default() };
        for (status, count) in counts {
            match status {
                StockStatus::InStock => summary.in_stock += count,
                StockStatus::LowStock => summary.low_stock += count,
                StockStatus::OutOfStock => summary.out_of_stock += count,
            }
            summary.total += count;
        }
        summary
    }
}
