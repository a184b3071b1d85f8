//! Item and category endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use dispatch_core::{
    CategoryRepository, CategoryWithItems, CreateCategoryRequest, CreateItemRequest, Envelope,
    ItemRepository, ServerEvent, UpdateCategoryRequest, UpdateItemRequest,
};

use super::deleted;
use crate::error::ApiError;
use crate::state::AppState;

async fn check_category(state: &AppState, category_id: Option<i64>) -> Result<(), ApiError> {
    if let Some(id) = category_id {
        if state.store.categories.fetch(id).await.is_err() {
            return Err(ApiError::BadRequest(format!(
                "category {} does not exist",
                id
            )));
        }
    }
    Ok(())
}

// =============================================================================
// ITEMS
// =============================================================================

pub async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.store.items.list().await?;
    Ok(Json(Envelope::ok(items)))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("item name is required".to_string()));
    }
    check_category(&state, body.category_id).await?;
    let item = state.store.items.insert(body).await?;
    state.events.emit(ServerEvent::ItemChanged {
        item_id: item.id,
        deleted: false,
    });
    Ok((StatusCode::CREATED, Json(Envelope::ok(item))))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_category(&state, body.category_id).await?;
    let item = state.store.items.update(id, body).await?;
    state.events.emit(ServerEvent::ItemChanged {
        item_id: item.id,
        deleted: false,
    });
    Ok(Json(Envelope::ok(item)))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.items.delete(id).await?;
    state.events.emit(ServerEvent::ItemChanged {
        item_id: id,
        deleted: true,
    });
    Ok(deleted())
}

/// Every category with the items filed directly under it.
pub async fn categories_with_items(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.store.categories.list().await?;
    let items = state.store.items.list().await?;

    let tree: Vec<CategoryWithItems> = categories
        .into_iter()
        .map(|category| {
            let filed = items
                .iter()
                .filter(|i| i.category_id == Some(category.id))
                .cloned()
                .collect();
            CategoryWithItems::from_parts(category, filed)
        })
        .collect();
    Ok(Json(Envelope::ok(tree)))
}

// =============================================================================
// CATEGORIES
// =============================================================================

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.store.categories.list().await?;
    Ok(Json(Envelope::ok(categories)))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("category name is required".to_string()));
    }
    let category = state.store.categories.insert(body).await?;
    state.events.emit(ServerEvent::CategoryChanged {
        category_id: category.id,
        deleted: false,
    });
    Ok((StatusCode::CREATED, Json(Envelope::ok(category))))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.store.categories.update(id, body).await?;
    state.events.emit(ServerEvent::CategoryChanged {
        category_id: category.id,
        deleted: false,
    });
    Ok(Json(Envelope::ok(category)))
}

/// Delete a category with its whole sub-tree. Items filed anywhere in the
/// sub-tree are kept but lose their category.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state.store.categories.delete_subtree(id).await?;
    let uncategorized = state.store.items.uncategorize(&removed).await?;

    info!(
        category_id = id,
        removed = removed.len(),
        uncategorized,
        "Category sub-tree deleted"
    );
    for category_id in removed {
        state.events.emit(ServerEvent::CategoryChanged {
            category_id,
            deleted: true,
        });
    }
    Ok(deleted())
}
