pub const DEFAULT_LEEWAY_SECONDS: u32 = 30;

/// Expected `iss`/`aud` values and clock-skew allowance for token validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub leeway_seconds: u32,
}

impl JwtConfig {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            leeway_seconds: DEFAULT_LEEWAY_SECONDS,
        }
    }

    pub fn with_leeway(self, leeway_seconds: u32) -> Self {
        Self { leeway_seconds, ..self }
    }
}
