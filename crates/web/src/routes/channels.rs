//! Brand-channel route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shopsync_core::{ProductId, ReactionKind};

use crate::db::ChannelRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Channel, ChannelProduct, ChannelSummary};
use crate::state::AppState;

/// Channel detail plus its product feed.
#[derive(Debug, Serialize)]
pub struct ChannelDetail {
    #[serde(flatten)]
    pub channel: Channel,
    pub products: Vec<ChannelProduct>,
}

/// Request to react to a product in a channel.
#[derive(Debug, Deserialize)]
pub struct ReactToProductRequest {
    pub kind: ReactionKind,
}

/// The channel directory, trending first.
///
/// GET /api/channels
///
/// Served from a short-lived cache; member counts may lag by a few
/// minutes.
///
/// # Errors
///
/// Returns `AppError` if the query fails on a cache miss.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ChannelSummary>>> {
    let cached = state
        .channel_directory()
        .try_get_with((), async {
            ChannelRepository::new(state.pool())
                .list()
                .await
                .map(Arc::new)
        })
        .await
        .map_err(|e| AppError::Internal(format!("channel directory load failed: {e}")))?;

    Ok(Json(cached.as_ref().clone()))
}

/// Channel detail with its product feed and reaction tallies.
///
/// GET /api/channels/{slug}
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ChannelDetail>> {
    let repo = ChannelRepository::new(state.pool());

    let channel = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("channel {slug}")))?;
    let products = repo.products(channel.id).await?;

    Ok(Json(ChannelDetail { channel, products }))
}

/// Join a channel. Idempotent for existing members.
///
/// POST /api/channels/{slug}/join
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown slug.
#[instrument(skip(state))]
pub async fn join(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(slug): Path<String>,
) -> Result<Json<Channel>> {
    let repo = ChannelRepository::new(state.pool());

    let channel = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("channel {slug}")))?;

    repo.add_member(channel.id, current.id).await?;

    // Member counts changed; drop the cached directory early.
    state.channel_directory().invalidate(&()).await;

    tracing::info!(channel_id = %channel.id, user_id = %current.id, "user joined channel");
    Ok(Json(channel))
}

/// Bump a reaction counter on a product in a channel.
///
/// POST /api/channels/{slug}/products/{product_id}/reactions
///
/// Reactions are repeatable; no per-user dedup (the cart engine rule).
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown slug.
#[instrument(skip(state))]
pub async fn react_to_product(
    State(state): State<AppState>,
    RequireUser(_current): RequireUser,
    Path((slug, product_id)): Path<(String, i32)>,
    Json(body): Json<ReactToProductRequest>,
) -> Result<Json<Vec<ChannelProduct>>> {
    let repo = ChannelRepository::new(state.pool());

    let channel = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("channel {slug}")))?;

    repo.add_product_reaction(channel.id, ProductId::new(product_id), body.kind)
        .await?;

    // Respond with the refreshed feed so the client can re-render.
    let products = repo.products(channel.id).await?;
    Ok(Json(products))
}
