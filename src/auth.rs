use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::{
    api::error::ApiError,
    app::AppState,
    domain::{Caller, Role},
};

/// The caller resolved from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthBearer(pub Caller);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthBearer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let user = state
            .repos
            .users
            .find_by_token(token)
            .await?
            .ok_or_else(|| {
                debug!("bearer token rejected");
                ApiError::Unauthorized
            })?;
        Ok(Self(user.into()))
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl Caller {
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.has_role(role) {
            Ok(())
        } else {
            debug!(caller_id = self.id, %role, "missing role");
            Err(ApiError::Forbidden)
        }
    }

    /// The user a request acts for. Only admins may name someone else.
    pub fn resolve_owner(&self, requested: Option<i64>) -> Result<i64, ApiError> {
        match requested {
            Some(id) if id != self.id => {
                self.require(Role::Admin)?;
                Ok(id)
            }
            _ => Ok(self.id),
        }
    }
}
