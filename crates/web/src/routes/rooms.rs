//! Private-room route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use rand::Rng;
use serde::Deserialize;
use tracing::instrument;

use shopsync_core::{ROOM_CODE_LENGTH, RoomCode, RoomId};

use crate::db::RoomRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Room, RoomSummary};
use crate::state::AppState;

/// How many code collisions to tolerate before giving up. With 36^6
/// possible codes a second collision in a row already means something is
/// wrong with the table.
const CODE_RETRY_LIMIT: usize = 3;

/// Request to create a room.
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// Request to join a room by code.
#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub code: String,
}

/// Generate a random join code, e.g. `WKND12`.
fn generate_room_code() -> RoomCode {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let mut rng = rand::rng();
    let raw: String = (0..ROOM_CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            char::from(ALPHABET[idx])
        })
        .collect();

    // A code drawn from the alphabet above always parses.
    RoomCode::parse(&raw).unwrap_or_else(|_| unreachable!("generated code is always valid"))
}

/// The caller's rooms with list aggregates.
///
/// GET /api/rooms
///
/// # Errors
///
/// Returns `AppError` if the query fails.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Json<Vec<RoomSummary>>> {
    let rooms = RoomRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    Ok(Json(rooms))
}

/// Create a room; the caller becomes its first member.
///
/// POST /api/rooms
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an empty name.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Json(body): Json<CreateRoomRequest>,
) -> Result<Json<Room>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("room name cannot be empty".into()));
    }

    let repo = RoomRepository::new(state.pool());

    // Regenerate on the (rare) code collision.
    let mut last_err = None;
    for _ in 0..CODE_RETRY_LIMIT {
        let code = generate_room_code();
        match repo.create(name, &code, current.id).await {
            Ok(room) => {
                tracing::info!(room_id = %room.id, "room created");
                return Ok(Json(room));
            }
            Err(err @ crate::db::RepositoryError::Conflict(_)) => last_err = Some(err),
            Err(err) => return Err(err.into()),
        }
    }

    Err(last_err
        .map_or_else(|| AppError::Internal("room code generation failed".into()), Into::into))
}

/// Join a room by its code. Idempotent for existing members.
///
/// POST /api/rooms/join
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown code and
/// `AppError::BadRequest` for a malformed one.
#[instrument(skip(state, body))]
pub async fn join(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Json(body): Json<JoinRoomRequest>,
) -> Result<Json<Room>> {
    let code = RoomCode::parse(&body.code).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let repo = RoomRepository::new(state.pool());
    let room = repo
        .find_by_code(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("room with code {code}")))?;

    repo.add_member(room.id, current.id).await?;
    tracing::info!(room_id = %room.id, user_id = %current.id, "user joined room");
    Ok(Json(room))
}

/// Room detail, members only.
///
/// GET /api/rooms/{id}
///
/// # Errors
///
/// Returns `AppError::Forbidden` for non-members.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<Room>> {
    let room_id = RoomId::new(id);
    let repo = RoomRepository::new(state.pool());

    let room = repo
        .get_by_id(room_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("room {room_id}")))?;

    if !repo.is_member(room_id, current.id).await? {
        return Err(AppError::Forbidden("not a member of this room".into()));
    }

    Ok(Json(room))
}

/// Membership check shared with the chat and cart handlers.
pub(super) async fn require_membership(
    state: &AppState,
    room_id: RoomId,
    user_id: shopsync_core::UserId,
) -> Result<()> {
    let is_member = RoomRepository::new(state.pool())
        .is_member(room_id, user_id)
        .await?;
    if is_member {
        Ok(())
    } else {
        Err(AppError::Forbidden("not a member of this room".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_parse_and_have_fixed_length() {
        for _ in 0..64 {
            let code = generate_room_code();
            assert_eq!(code.as_str().len(), ROOM_CODE_LENGTH);
            assert!(RoomCode::parse(code.as_str()).is_ok());
        }
    }
}
