pub mod app;
pub mod availability_search;
pub mod config;
pub mod error;
pub mod geo;
pub mod inventory_handlers;
pub mod inventory_status;
pub mod medicine_handlers;
pub mod model;
pub mod pagination;
pub mod pharmacy_handlers;
pub mod store;

pub use app::{build_router, AppState};
pub use availability_search::{search_availability, AvailabilityHit, AvailabilityPage, AvailabilityQuery};
pub use config::LocatorConfig;
pub use error::{LocatorError, LocatorResult};
pub use inventory_status::{derive_status, StockStatus, DEFAULT_LOW_STOCK_THRESHOLD};
pub use store::{LocatorStore, MemoryLocatorStore, PgLocatorStore};
