use thiserror::Error;
use uuid::Uuid;

use crate::roles::ROLE_SYSTEM_ADMIN;
use crate::AuthContext;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("insufficient role, required one of: {}", required.join(", "))]
    Forbidden { required: Vec<String> },
    #[error("caller {caller} does not own resource owned by {owner}")]
    NotOwner { owner: Uuid, caller: Uuid },
}

pub fn ensure_role(auth: &AuthContext, allowed: &[&str]) -> Result<(), GuardError> {
    if allowed.is_empty() {
        return Ok(());
    }

    let has_role = auth
        .claims
        .roles
        .iter()
        .any(|role| allowed.iter().any(|required| role == required));

    if has_role {
        Ok(())
    } else {
        Err(GuardError::Forbidden {
            required: allowed.iter().map(|value| value.to_string()).collect(),
        })
    }
}

/// System admins may act on any resource; everyone else only on what they own.
pub fn ensure_owner_or_admin(auth: &AuthContext, owner: Uuid) -> Result<(), GuardError> {
    if auth.claims.subject == owner || auth.has_role(ROLE_SYSTEM_ADMIN) {
        return Ok(());
    }
    Err(GuardError::NotOwner {
        owner,
        caller: auth.claims.subject,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Claims;
    use chrono::Utc;

    fn ctx(subject: Uuid, roles: &[&str]) -> AuthContext {
        AuthContext {
            claims: Claims {
                subject,
                roles: roles.iter().map(|r| r.to_string()).collect(),
                expires_at: Utc::now() + chrono::Duration::hours(1),
                issued_at: Some(Utc::now()),
                issuer: "issuer".to_string(),
                audience: vec!["audience".to_string()],
                raw: serde_json::json!({}),
            },
        }
    }

    #[test]
    fn ensure_role_accepts_any_listed_role() {
        let auth = ctx(Uuid::new_v4(), &["pharmacy_admin"]);
        assert!(ensure_role(&auth, &["pharmacy_admin", "system_admin"]).is_ok());
    }

    #[test]
    fn ensure_role_rejects_plain_user() {
        let auth = ctx(Uuid::new_v4(), &["user"]);
        let err = ensure_role(&auth, &[ROLE_SYSTEM_ADMIN]).expect_err("user is not admin");
        assert!(err.to_string().contains("system_admin"));
    }

    #[test]
    fn owner_and_system_admin_pass_ownership_guard() {
        let owner = Uuid::new_v4();
        assert!(ensure_owner_or_admin(&ctx(owner, &["pharmacy_admin"]), owner).is_ok());
        assert!(ensure_owner_or_admin(&ctx(Uuid::new_v4(), &["system_admin"]), owner).is_ok());
    }

    #[test]
    fn other_pharmacy_admin_fails_ownership_guard() {
        let owner = Uuid::new_v4();
        let caller = Uuid::new_v4();
        let err = ensure_owner_or_admin(&ctx(caller, &["pharmacy_admin"]), owner).expect_err("not owner");
        assert_eq!(err, GuardError::NotOwner { owner, caller });
    }
}
