use std::collections::HashMap;
use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};

/// Key id used for tokens whose header carries no `kid`.
pub const DEFAULT_KID: &str = "default";

#[derive(Clone)]
struct KeyEntry {
    key: DecodingKey,
    algorithm: Algorithm,
}

/// Verifies bearer tokens against keys registered at startup, selected by `kid`.
#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
    keys: Arc<HashMap<String, KeyEntry>>,
}

impl JwtVerifier {
    pub fn builder(config: JwtConfig) -> JwtVerifierBuilder {
        JwtVerifierBuilder { config, keys: HashMap::new() }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn has_key(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let header = decode_header(token).map_err(|err| AuthError::InvalidHeader(err.to_string()))?;
        let kid = header.kid.unwrap_or_else(|| DEFAULT_KID.to_string());
        let entry = self
            .keys
            .get(&kid)
            .ok_or_else(|| AuthError::UnknownKeyId(kid.clone()))?;
        if header.alg != entry.algorithm {
            return Err(AuthError::AlgorithmMismatch { token: header.alg, key: entry.algorithm });
        }

        let mut validation = Validation::new(entry.algorithm);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.leeway = self.config.leeway_seconds.into();

        let data = decode::<Value>(token, &entry.key, &validation)?;
        let claims = Claims::try_from(data.claims)?;
        debug!(kid, subject = %claims.subject, "token verified");
        Ok(claims)
    }
}

pub struct JwtVerifierBuilder {
    config: JwtConfig,
    keys: HashMap<String, KeyEntry>,
}

impl JwtVerifierBuilder {
    pub fn with_key(mut self, kid: impl Into<String>, key: DecodingKey, algorithm: Algorithm) -> Self {
        self.keys.insert(kid.into(), KeyEntry { key, algorithm });
        self
    }

    /// Registers an HS256 shared secret.
    pub fn with_hmac_secret(self, kid: impl Into<String>, secret: &[u8]) -> Self {
        self.with_key(kid, DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// Registers an RS256 public key in PEM form.
    pub fn with_rsa_pem(self, kid: impl Into<String>, pem: &[u8]) -> AuthResult<Self> {
        let kid = kid.into();
        let key = DecodingKey::from_rsa_pem(pem).map_err(|err| AuthError::KeyParse(kid.clone(), err.to_string()))?;
        Ok(self.with_key(kid, key, Algorithm::RS256))
    }

    pub fn build(self) -> JwtVerifier {
        JwtVerifier { config: self.config, keys: Arc::new(self.keys) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;
    use uuid::Uuid;

    const SECRET: &[u8] = b"test-shared-secret";

    #[derive(Serialize)]
    struct TokenClaims<'a> {
        sub: &'a str,
        role: &'a str,
        iss: &'a str,
        aud: &'a str,
        exp: i64,
        iat: i64,
    }

    fn issue_token(kid: Option<&str>, role: &str, issuer: &str, audience: &str, ttl: i64) -> (String, Uuid) {
        let subject = Uuid::new_v4();
        let issued_at = Utc::now().timestamp();
        let subject_str = subject.to_string();
        let claims = TokenClaims {
            sub: &subject_str,
            role,
            iss: issuer,
            aud: audience,
            exp: issued_at + ttl,
            iat: issued_at,
        };
        let mut header = Header::new(Algorithm::HS256);
        header.kid = kid.map(str::to_string);
        let token = encode(&header, &claims, &EncodingKey::from_secret(SECRET)).expect("sign token");
        (token, subject)
    }

    fn verifier() -> JwtVerifier {
        JwtVerifier::builder(JwtConfig::new("test-issuer", "test-audience"))
            .with_hmac_secret(DEFAULT_KID, SECRET)
            .build()
    }

    #[test]
    fn builder_registers_keys_by_kid() {
        let empty = JwtVerifier::builder(JwtConfig::new("i", "a")).build();
        assert_eq!(empty.key_count(), 0);
        let v = verifier();
        assert!(v.has_key(DEFAULT_KID));
        assert_eq!(v.key_count(), 1);
    }

    #[test]
    fn malformed_pem_is_a_key_parse_error() {
        let result = JwtVerifier::builder(JwtConfig::new("i", "a")).with_rsa_pem("local-dev", b"not a pem");
        assert!(matches!(result, Err(AuthError::KeyParse(kid, _)) if kid == "local-dev"));
    }

    #[test]
    fn verifier_accepts_valid_token_without_kid() {
        let (token, subject) = issue_token(None, "pharmacy_admin", "test-issuer", "test-audience", 600);
        let claims = verifier().verify(&token).expect("verification succeeds");
        assert_eq!(claims.subject, subject);
        assert_eq!(claims.roles, vec!["pharmacy_admin".to_string()]);
        assert_eq!(claims.issuer, "test-issuer");
        assert_eq!(claims.audience, vec!["test-audience".to_string()]);
    }

    #[test]
    fn verifier_rejects_unknown_kid() {
        let (token, _) = issue_token(Some("missing"), "user", "test-issuer", "test-audience", 600);
        let err = verifier().verify(&token).expect_err("verification should fail");
        match err {
            AuthError::UnknownKeyId(actual) => assert_eq!(actual, "missing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn verifier_rejects_wrong_issuer() {
        let (token, _) = issue_token(None, "user", "someone-else", "test-audience", 600);
        let err = verifier().verify(&token).expect_err("issuer mismatch");
        assert!(matches!(err, AuthError::Verification(_)), "{err:?}");
    }

    #[test]
    fn verifier_rejects_expired_token() {
        let (token, _) = issue_token(None, "user", "test-issuer", "test-audience", -3600);
        let err = verifier().verify(&token).expect_err("expired token");
        assert!(matches!(err, AuthError::Verification(_)), "{err:?}");
    }

    #[test]
    fn verifier_rejects_algorithm_mismatch() {
        let verifier = JwtVerifier::builder(JwtConfig::new("test-issuer", "test-audience"))
            .with_key(DEFAULT_KID, DecodingKey::from_secret(SECRET), Algorithm::HS512)
            .build();
        let (token, _) = issue_token(None, "user", "test-issuer", "test-audience", 600);
        let err = verifier.verify(&token).expect_err("alg mismatch");
        assert!(matches!(err, AuthError::AlgorithmMismatch { .. }), "{err:?}");
    }
}
