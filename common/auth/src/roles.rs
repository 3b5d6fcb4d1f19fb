pub const ROLE_SYSTEM_ADMIN: &str = "system_admin";
pub const ROLE_PHARMACY_ADMIN: &str = "pharmacy_admin";
pub const ROLE_USER: &str = "user";

pub const ROLE_HIERARCHY: &[&str] = &[ROLE_SYSTEM_ADMIN, ROLE_PHARMACY_ADMIN, ROLE_USER];
