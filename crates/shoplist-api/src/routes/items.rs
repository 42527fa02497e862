//! Item list routes
//!
//! Every handler requires a bearer token and works only on the caller's own
//! items.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use shoplist_core::ItemFields;

use crate::error::ApiError;
use crate::extract::{ApiJson, RequireAuth};
use crate::state::AppState;

use super::types::{DeleteResponse, ItemRequest, ItemResponse};

/// GET /list
async fn list_items(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.inventory.list(&user).await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// POST /list
async fn add_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let item = state
        .inventory
        .add(
            &user,
            ItemFields {
                name: request.name,
                category: request.category,
                quantity: request.quantity,
                price: request.price,
            },
        )
        .await?;

    metrics::counter!("shoplist_items_created_total").increment(1);

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// DELETE /list/{name}
async fn delete_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.inventory.delete_by_name(&user, &name).await?;

    metrics::counter!("shoplist_items_deleted_total").increment(1);

    Ok(Json(DeleteResponse {
        msg: format!("The item with Name = {} is removed", name),
    }))
}

/// Create item routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(list_items).post(add_item))
        .route("/list/{name}", delete(delete_item))
}
