use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use tracing::debug;
use uuid::Uuid;

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::roles::ROLE_HIERARCHY;
use crate::verifier::JwtVerifier;

/// Verified caller identity for handlers that require a bearer token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.claims.has_role(role)
    }

    pub fn user_id(&self) -> Uuid {
        self.claims.subject
    }

    /// Most privileged known role carried by the token, if any.
    pub fn highest_role(&self) -> Option<&'static str> {
        ROLE_HIERARCHY.iter().copied().find(|role| self.has_role(role))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<JwtVerifier>::from_ref(state);
        let token = bearer_token(&parts.headers)?;
        let ctx = Self { claims: verifier.verify(token)? };
        debug!(user_id = %ctx.user_id(), role = ?ctx.highest_role(), "caller authenticated");
        Ok(ctx)
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`; the scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?
        .trim();
    let (scheme, token) = raw.split_once(' ').ok_or(AuthError::InvalidAuthorization)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }
    Ok(token)
}
