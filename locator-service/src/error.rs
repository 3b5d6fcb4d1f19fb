use common_http_errors::ApiError;
use thiserror::Error;

use crate::store::StoreError;

pub type LocatorResult<T> = Result<T, LocatorError>;

#[derive(Debug, Error, PartialEq)]
pub enum LocatorError {
    #[error("{message}")]
    InvalidArgument { code: &'static str, message: String },
    #[error("{code}")]
    NotFound { code: &'static str },
    #[error("{message}")]
    Conflict { code: &'static str, message: String },
    #[error("caller may not modify this resource")]
    Forbidden,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl LocatorError {
    pub fn invalid(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument { code, message: message.into() }
    }

    pub fn not_found(code: &'static str) -> Self {
        Self::NotFound { code }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict { code, message: message.into() }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LocatorError::InvalidArgument { code, .. }
            | LocatorError::NotFound { code }
            | LocatorError::Conflict { code, .. } => *code,
            LocatorError::Forbidden => "forbidden",
            LocatorError::Unavailable(_) => "store_unavailable",
        }
    }
}

impl From<StoreError> for LocatorError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict { constraint } => {
                let code = conflict_code(constraint.as_deref());
                LocatorError::Conflict {
                    code,
                    message: format!("unique constraint violated ({})", constraint.as_deref().unwrap_or("unknown")),
                }
            }
            StoreError::Unavailable(msg) | StoreError::Corrupt(msg) => LocatorError::Unavailable(msg),
        }
    }
}

/// Unique indexes are named in the migrations; both stores report the same names.
fn conflict_code(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("medicines_name_lower_key") => "medicine_exists",
        Some("pharmacies_registration_number_key") => "pharmacy_exists",
        Some("inventory_pharmacy_medicine_key") => "inventory_exists",
        _ => "conflict",
    }
}

impl From<LocatorError> for ApiError {
    fn from(value: LocatorError) -> Self {
        match value {
            LocatorError::InvalidArgument { code, message } => ApiError::BadRequest {
                code,
                trace_id: None,
                message: Some(message),
            },
            LocatorError::NotFound { code } => ApiError::NotFound { code, trace_id: None },
            LocatorError::Conflict { code, message } => ApiError::Conflict {
                code,
                trace_id: None,
                message: Some(message),
            },
            LocatorError::Forbidden => ApiError::Forbidden { trace_id: None },
            LocatorError::Unavailable(message) => ApiError::Unavailable {
                trace_id: None,
                message: Some(message),
            },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        LocatorError::from(value).into()
    }
}
