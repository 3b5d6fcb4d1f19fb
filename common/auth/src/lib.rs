pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guards;
pub mod roles;
pub mod verifier;

pub use claims::Claims;
pub use config::{JwtConfig, DEFAULT_LEEWAY_SECONDS};
pub use error::{AuthError, AuthResult};
pub use extractors::AuthContext;
pub use guards::{ensure_owner_or_admin, ensure_role, GuardError};
pub use roles::{ROLE_HIERARCHY, ROLE_PHARMACY_ADMIN, ROLE_SYSTEM_ADMIN, ROLE_USER};
pub use verifier::{JwtVerifier, JwtVerifierBuilder, DEFAULT_KID};
