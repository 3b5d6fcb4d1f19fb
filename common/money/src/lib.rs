use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("price cannot be negative: {0}")]
    Negative(String),
    #[error("price has more than 2 decimal places: {0}")]
    TooPrecise(String),
}

/// Pad a monetary value to exactly 2 decimal places.
/// Callers must reject values that would lose digits; see [`Price::new`].
pub fn normalize_scale(value: &BigDecimal) -> BigDecimal {
    value.with_scale(2)
}

/// Shelf price of an inventory line. Always non-negative with exactly two decimal places.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
#[serde(try_from = "BigDecimal", into = "BigDecimal")]
pub struct Price(BigDecimal);

impl Price {
    pub fn new(raw: BigDecimal) -> Result<Self, MoneyError> {
        if raw < BigDecimal::from(0) {
            return Err(MoneyError::Negative(raw.to_string()));
        }
        let normalized = normalize_scale(&raw);
        if normalized != raw {
            return Err(MoneyError::TooPrecise(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn inner(&self) -> &BigDecimal { &self.0 }
}

impl TryFrom<BigDecimal> for Price {
    type Error = MoneyError;
    fn try_from(value: BigDecimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Price> for BigDecimal {
    fn from(value: Price) -> Self { value.0 }
}
