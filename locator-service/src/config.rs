use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use common_auth::{JwtConfig, JwtVerifier, DEFAULT_KID};
use tracing::{info, warn};

use crate::geo::{validate_radius, DEFAULT_RADIUS_METERS};

const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5173",
];

#[derive(Debug, Clone)]
pub struct LocatorConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_leeway_seconds: Option<u32>,
    pub jwt_hs256_secret: Option<String>,
    pub jwt_dev_public_key_pem: Option<String>,
    pub allowed_origins: Vec<String>,
    pub default_radius_meters: f64,
}

impl LocatorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_issuer = lookup("JWT_ISSUER").context("JWT_ISSUER must be set")?;
        let jwt_audience = lookup("JWT_AUDIENCE").context("JWT_AUDIENCE must be set")?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8090u16)?;
        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10u32)?;
        let jwt_leeway_seconds = match lookup("JWT_LEEWAY_SECONDS") {
            Some(raw) => Some(raw.parse::<u32>().with_context(|| format!("JWT_LEEWAY_SECONDS '{raw}'"))?),
            None => None,
        };
        let default_radius_meters = parse_or(&lookup, "DEFAULT_SEARCH_RADIUS_METERS", DEFAULT_RADIUS_METERS)?;
        validate_radius(default_radius_meters)
            .map_err(|e| anyhow!("DEFAULT_SEARCH_RADIUS_METERS: {e}"))?;

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            jwt_issuer,
            jwt_audience,
            jwt_leeway_seconds,
            jwt_hs256_secret: lookup("JWT_HS256_SECRET").filter(|s| !s.is_empty()),
            jwt_dev_public_key_pem: lookup("JWT_DEV_PUBLIC_KEY_PEM").filter(|s| !s.is_empty()),
            allowed_origins,
            default_radius_meters,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn build_jwt_verifier(&self) -> anyhow::Result<Arc<JwtVerifier>> {
        let mut config = JwtConfig::new(self.jwt_issuer.clone(), self.jwt_audience.clone());
        if let Some(leeway) = self.jwt_leeway_seconds {
            config = config.with_leeway(leeway);
        }
        let mut builder = JwtVerifier::builder(config);
        if let Some(secret) = &self.jwt_hs256_secret {
            info!("Configuring HS256 shared-secret verification");
            builder = builder.with_hmac_secret(DEFAULT_KID, secret.as_bytes());
        }
        if let Some(pem) = &self.jwt_dev_public_key_pem {
            warn!("Using JWT_DEV_PUBLIC_KEY_PEM for verification; do not enable in production");
            builder = builder.with_rsa_pem("local-dev", pem.as_bytes()).map_err(anyhow::Error::from)?;
        }
        let verifier = builder.build();
        if verifier.key_count() == 0 {
            return Err(anyhow!("set JWT_HS256_SECRET or JWT_DEV_PUBLIC_KEY_PEM to verify tokens"));
        }
        info!(keys = verifier.key_count(), "JWT verifier initialised");
        Ok(Arc::new(verifier))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().with_context(|| format!("{key} '{raw}' is not valid")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/locator"),
        ("JWT_ISSUER", "medilocate"),
        ("JWT_AUDIENCE", "locator"),
    ];

    #[test]
    fn defaults_fill_optional_values() {
        let cfg = LocatorConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(cfg.port, 8090);
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.default_radius_meters, 5000.0);
        assert_eq!(cfg.allowed_origins.len(), 3);
        assert_eq!(cfg.socket_addr().unwrap().port(), 8090);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = LocatorConfig::from_lookup(lookup(&REQUIRED[1..])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "9100"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("DEFAULT_SEARCH_RADIUS_METERS", "2500"),
            ("JWT_HS256_SECRET", "s3cret"),
        ]);
        let cfg = LocatorConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(cfg.default_radius_meters, 2500.0);
        assert!(cfg.build_jwt_verifier().is_ok());
    }

    #[test]
    fn verifier_requires_a_key() {
        let cfg = LocatorConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert!(cfg.build_jwt_verifier().is_err());
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DEFAULT_SEARCH_RADIUS_METERS", "-1"));
        assert!(LocatorConfig::from_lookup(lookup(&pairs)).is_err());
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        assert!(LocatorConfig::from_lookup(lookup(&pairs)).is_err());
    }
}
