use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use crate::error::AppError;
use crate::models::{Role, User};
use crate::state::AppState;

/// The signed-in user, resolved from `Authorization: Bearer <token>`.
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl CurrentUser {
    pub fn require(&self, role: Role) -> Result<&User, AppError> {
        if self.user.role == role {
            Ok(&self.user)
        } else {
            warn!(
                "{} ({}) tried to reach a {} page",
                self.user.email, self.user.role, role
            );
            Err(AppError::Forbidden)
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let user = state.store.me(&token).await?;
        Ok(CurrentUser { user, token })
    }
}
