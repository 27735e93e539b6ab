//! Chat route handlers.
//!
//! Messages come in three kinds: plain text, product shares (a text line
//! with an attached catalog product), and system lines generated by the
//! application (e.g. when someone adds to the shared cart). Clients
//! re-fetch after posting; there is no push transport.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use shopsync_core::{MessageId, ProductId, RoomId};

use crate::db::messages::MessageReaction;
use crate::db::{MessageRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Message, MessageKind};
use crate::state::AppState;

use super::rooms::require_membership;

/// Request to post a message. Setting `product_id` makes it a product
/// share.
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub content: String,
    pub product_id: Option<ProductId>,
}

/// Request to react to a message.
#[derive(Debug, Deserialize)]
pub struct ReactToMessageRequest {
    pub kind: MessageReactionKind,
}

/// Reaction kinds available on chat messages.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageReactionKind {
    Like,
    Heart,
}

impl From<MessageReactionKind> for MessageReaction {
    fn from(kind: MessageReactionKind) -> Self {
        match kind {
            MessageReactionKind::Like => Self::Like,
            MessageReactionKind::Heart => Self::Heart,
        }
    }
}

/// Message history for a room, oldest first.
///
/// GET /api/rooms/{id}/messages
///
/// # Errors
///
/// Returns `AppError::Forbidden` for non-members.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Message>>> {
    let room_id = RoomId::new(id);
    require_membership(&state, room_id, current.id).await?;

    let messages = MessageRepository::new(state.pool())
        .list_for_room(room_id)
        .await?;
    Ok(Json(messages))
}

/// Post a text message or share a product into the room.
///
/// POST /api/rooms/{id}/messages
///
/// # Errors
///
/// Returns `AppError::BadRequest` for empty content or an unknown
/// product.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(id): Path<i32>,
    Json(body): Json<CreateMessageRequest>,
) -> Result<Json<Message>> {
    let room_id = RoomId::new(id);
    require_membership(&state, room_id, current.id).await?;

    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("message cannot be empty".into()));
    }

    let kind = match body.product_id {
        Some(product_id) => {
            // Validate the attachment so the feed never renders a dead card.
            ProductRepository::new(state.pool())
                .get_by_id(product_id)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("unknown product {product_id}")))?;
            MessageKind::Product
        }
        None => MessageKind::Text,
    };

    let message = MessageRepository::new(state.pool())
        .create(room_id, Some(current.id), kind, content, body.product_id)
        .await?;

    Ok(Json(message))
}

/// Bump a like/heart counter on a message.
///
/// POST /api/messages/{id}/reactions
///
/// Reactions are repeatable signals; no per-user dedup, matching the
/// cart engine's reaction rule.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when the caller is not in the message's
/// room.
#[instrument(skip(state))]
pub async fn react(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(id): Path<i32>,
    Json(body): Json<ReactToMessageRequest>,
) -> Result<Json<Message>> {
    let message_id = MessageId::new(id);
    let repo = MessageRepository::new(state.pool());

    let message = repo
        .get_by_id(message_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("message {message_id}")))?;
    require_membership(&state, message.room_id, current.id).await?;

    let message = repo.add_reaction(message_id, body.kind.into()).await?;
    Ok(Json(message))
}
