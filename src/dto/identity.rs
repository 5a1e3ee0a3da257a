use std::str::FromStr;

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the authenticated user id, set by the auth gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated role, set by the auth gateway.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role granted to the caller by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Regular group member: may submit scores and query rankings.
    Member,
    /// May resolve pending scores.
    Moderator,
    /// Full moderation rights.
    Admin,
}

impl Role {
    /// Whether the role may approve or reject scores.
    pub fn can_moderate(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// Authenticated caller, extracted from the gateway headers on every request.
///
/// Token verification happens upstream; this service only trusts the
/// propagated `(user id, role)` pair, mirroring the contract with the
/// identity collaborator.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    /// Authenticated user id.
    pub user_id: Uuid,
    /// Granted role.
    pub role: Role,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_ID_HEADER)?;
        let user_id = Uuid::parse_str(user_id).map_err(|_| {
            AppError::Unauthorized(format!("`{USER_ID_HEADER}` header is not a valid UUID"))
        })?;

        let role = header_value(parts, USER_ROLE_HEADER)?;
        let role = Role::from_str(role).map_err(|_| {
            AppError::Unauthorized(format!("unknown role in `{USER_ROLE_HEADER}` header"))
        })?;

        Ok(Identity { user_id, role })
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("missing `{name}` header")))
}
