//! Identity route handlers.
//!
//! The original client kept its anonymous user in browser storage; here
//! the identity row is pinned to the server session instead, so it
//! survives across devices that share the cookie and never leaks through
//! client storage.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Request to create a visitor identity.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Optional display name shown next to messages and cart items.
    pub display_name: Option<String>,
    /// Optional avatar marker (an emoji in the current UI).
    pub avatar: Option<String>,
}

/// Request to rename the current identity.
#[derive(Debug, Deserialize)]
pub struct UpdateDisplayNameRequest {
    pub display_name: String,
}

/// Create an identity and pin it to the session.
///
/// POST /api/users
///
/// # Errors
///
/// Returns `AppError` if the insert or session write fails.
#[instrument(skip(state, session))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .create(body.display_name.as_deref(), body.avatar.as_deref())
        .await?;

    session
        .insert(
            session_keys::CURRENT_USER,
            CurrentUser {
                id: user.id,
                display_name: user.display_name.clone(),
            },
        )
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    tracing::info!(user_id = %user.id, "visitor identity created");
    Ok(Json(user))
}

/// The current identity.
///
/// GET /api/users/me
///
/// # Errors
///
/// Returns `AppError::NotFound` if the session points at a deleted row.
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", current.id)))?;

    Ok(Json(user))
}

/// Update the current identity's display name.
///
/// PATCH /api/users/me
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an empty name.
#[instrument(skip(state, session))]
pub async fn update_display_name(
    State(state): State<AppState>,
    session: Session,
    RequireUser(current): RequireUser,
    Json(body): Json<UpdateDisplayNameRequest>,
) -> Result<Json<User>> {
    let name = body.display_name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("display name cannot be empty".into()));
    }

    let user = UserRepository::new(state.pool())
        .update_display_name(current.id, name)
        .await?;

    // Refresh the session copy so later reads see the new name.
    session
        .insert(
            session_keys::CURRENT_USER,
            CurrentUser {
                id: user.id,
                display_name: user.display_name.clone(),
            },
        )
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(Json(user))
}
