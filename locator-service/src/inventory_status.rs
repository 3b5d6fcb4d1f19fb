//! Stock status derivation.
//!
//! Every inventory write computes the status from the final quantity and
//! low-stock threshold and persists it in the same statement, so a stored
//! row always satisfies `status == derive_status(quantity, threshold)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub const ALL: [StockStatus; 3] = [
        StockStatus::InStock,
        StockStatus::LowStock,
        StockStatus::OutOfStock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stock status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for StockStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "in_stock" => Ok(StockStatus::InStock),
            "low_stock" => Ok(StockStatus::LowStock),
            "out_of_stock" => Ok(StockStatus::OutOfStock),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Zero wins over the threshold check, so `(0, 0)` is out of stock rather than low.
pub fn derive_status(quantity: u32, threshold: u32) -> StockStatus {
    if quantity == 0 {
        StockStatus::OutOfStock
    } else if quantity <= threshold {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_is_out_of_stock_even_with_zero_threshold() {
        assert_eq!(derive_status(0, 0), StockStatus::OutOfStock);
        assert_eq!(derive_status(0, 5), StockStatus::OutOfStock);
    }

    #[test]
    fn quantity_equal_to_threshold_is_low() {
        assert_eq!(derive_status(5, 5), StockStatus::LowStock);
        assert_eq!(derive_status(1, 5), StockStatus::LowStock);
    }

    #[test]
    fn quantity_above_threshold_is_in_stock() {
        assert_eq!(derive_status(6, 5), StockStatus::InStock);
        assert_eq!(derive_status(1, 0), StockStatus::InStock);
    }

    #[test]
    fn status_text_round_trips() {
        for status in StockStatus::ALL {
            assert_eq!(status.as_str().parse::<StockStatus>(), Ok(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("sold_out".parse::<StockStatus>().is_err());
    }
}
