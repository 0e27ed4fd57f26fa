//! Authentication extractors for route handlers.
//!
//! [`RequireAuth`] resolves the cookie session to a live [`CurrentUser`],
//! checking the session row and the account on every request so revocation
//! and suspension take effect immediately. [`RequireAdmin`] additionally
//! checks the admin role.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;
use uuid::Uuid;

use cloudcrm_core::{UserId, UserRole, UserStatus};

use crate::db::{SessionRepository, UserRepository};
use crate::error::set_sentry_user;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in operator.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(current): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", current.user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in operator with the admin role.
pub struct RequireAdmin(pub CurrentUser);

/// Rejection for the auth extractors, rendered as the API error shape.
pub enum AuthRejection {
    Unauthorized,
    Forbidden,
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "authentication required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "admin access required"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn resolve_current_user<S>(parts: &mut Parts, state: &S) -> Result<CurrentUser, AuthRejection>
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    // Session is put into extensions by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(AuthRejection::Unauthorized)?;

    let user_id: UserId = session
        .get(session_keys::USER_ID)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::Unauthorized)?;
    let session_id: Uuid = session
        .get(session_keys::SESSION_ID)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::Unauthorized)?;

    let app_state = AppState::from_ref(state);

    // The session row is the revocation authority. A cookie whose row is
    // gone or revoked is dead even if the cookie itself has not expired.
    let live = SessionRepository::new(app_state.pool())
        .touch(session_id)
        .await
        .map_err(|_| AuthRejection::Internal)?;
    if !live {
        let _ = session.flush().await;
        return Err(AuthRejection::Unauthorized);
    }

    let user = UserRepository::new(app_state.pool())
        .get_by_id(user_id)
        .await
        .map_err(|_| AuthRejection::Internal)?;
    let Some(user) = user else {
        let _ = session.flush().await;
        return Err(AuthRejection::Unauthorized);
    };
    if user.status == UserStatus::Suspended {
        let _ = session.flush().await;
        return Err(AuthRejection::Unauthorized);
    }

    set_sentry_user(user.id, Some(user.email.as_str()));

    Ok(CurrentUser { user, session_id })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_current_user(parts, state).await?))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let current = resolve_current_user(parts, state).await?;
        if current.user.role != UserRole::Admin {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(current))
    }
}

/// Store the logged-in identity in the cookie session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn establish_session(
    session: &Session,
    user_id: UserId,
    session_id: Uuid,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::USER_ID, user_id).await?;
    session.insert(session_keys::SESSION_ID, session_id).await
}
