use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::roles::ROLE_USER;

/// Application-focused representation of verified JWT claims.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub subject: Uuid,
    pub roles: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    pub issuer: String,
    pub audience: Vec<String>,
    pub raw: serde_json::Value,
}

impl Claims {
    /// Convenience helper for role checks.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|value| value == role)
    }
}

#[derive(Debug, Deserialize)]
struct ClaimsRepr {
    sub: String,
    // Issuers emit either a single `role` or a `roles` array.
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    exp: i64,
    #[serde(default)]
    iat: Option<i64>,
    iss: String,
    #[serde(default)]
    aud: Option<AudienceRepr>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AudienceRepr {
    Single(String),
    Many(Vec<String>),
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        let subject = Uuid::parse_str(&value.sub)
            .map_err(|_| AuthError::InvalidClaim("sub", value.sub.clone()))?;

        let expires_at = Utc
            .timestamp_opt(value.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", value.exp.to_string()))?;

        let issued_at = match value.iat {
            Some(iat) => Some(
                Utc.timestamp_opt(iat, 0)
                    .single()
                    .ok_or_else(|| AuthError::InvalidClaim("iat", iat.to_string()))?,
            ),
            None => None,
        };

        let audience = match value.aud {
            Some(AudienceRepr::Single(item)) => vec![item],
            Some(AudienceRepr::Many(items)) => items,
            None => Vec::new(),
        };

        let mut roles = value.roles;
        if let Some(role) = value.role {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        if roles.is_empty() {
            roles.push(ROLE_USER.to_string());
        }

        Ok(Self {
            subject,
            roles,
            expires_at,
            issued_at,
            issuer: value.iss,
            audience,
            raw: serde_json::Value::Null,
        })
    }
}

impl TryFrom<serde_json::Value> for Claims {
    type Error = AuthError;

    fn try_from(value: serde_json::Value) -> AuthResult<Self> {
        let repr: ClaimsRepr = serde_json::from_value(value.clone())
            .map_err(|err| AuthError::InvalidJson(err.to_string()))?;
        let mut claims = Claims::try_from(repr)?;
        claims.raw = value;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_role_claim_is_accepted() {
        let sub = Uuid::new_v4();
        let claims = Claims::try_from(json!({
            "sub": sub.to_string(),
            "role": "pharmacy_admin",
            "exp": 4_102_444_800i64,
            "iss": "medilocate",
            "aud": "locator",
        }))
        .expect("claims parse");
        assert_eq!(claims.subject, sub);
        assert!(claims.has_role("pharmacy_admin"));
        assert_eq!(claims.audience, vec!["locator".to_string()]);
    }

    #[test]
    fn missing_role_defaults_to_user() {
        let claims = Claims::try_from(json!({
            "sub": Uuid::new_v4().to_string(),
            "exp": 4_102_444_800i64,
            "iss": "medilocate",
        }))
        .expect("claims parse");
        assert_eq!(claims.roles, vec![ROLE_USER.to_string()]);
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let err = Claims::try_from(json!({
            "sub": "not-a-uuid",
            "exp": 4_102_444_800i64,
            "iss": "medilocate",
        }))
        .expect_err("sub must be a uuid");
        assert!(matches!(err, AuthError::InvalidClaim("sub", _)));
    }
}
