//! Handlers for the `/categories` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hearth_core::category::{ensure_kind, validate_color, validate_kind, validate_name};
use hearth_core::error::CoreError;
use hearth_core::types::DbId;
use hearth_db::models::category::{Category, CreateCategory, UpdateCategory};
use hearth_db::repositories::CategoryRepo;
use serde::Deserialize;

use crate::error::{invalid, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// `?kind=income|expense`
#[derive(Debug, Deserialize)]
pub struct CategoryListParams {
    pub kind: Option<String>,
}

/// GET /api/v1/categories
pub async fn list_categories(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CategoryListParams>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    if let Some(kind) = &params.kind {
        validate_kind(kind).map_err(invalid)?;
    }
    let categories = CategoryRepo::list(&state.pool, auth.family_id, params.kind.as_deref()).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/categories
pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    validate_kind(&input.kind).map_err(invalid)?;
    validate_name(&input.name).map_err(invalid)?;
    if let Some(color) = &input.color {
        validate_color(color).map_err(invalid)?;
    }

    let category = CategoryRepo::create(&state.pool, auth.family_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Category>>> {
    let category = CategoryRepo::find_by_id(&state.pool, auth.family_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(Json(DataResponse { data: category }))
}

/// PUT /api/v1/categories/{id}
///
/// Only the name and color can change; the kind is fixed at creation.
pub async fn update_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<DataResponse<Category>>> {
    if let Some(name) = &input.name {
        validate_name(name).map_err(invalid)?;
    }
    if let Some(color) = &input.color {
        validate_color(color).map_err(invalid)?;
    }

    let category = CategoryRepo::update(&state.pool, auth.family_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{id}
///
/// Transactions keep their rows with the category cleared; budgets for the
/// category are removed.
pub async fn delete_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = CategoryRepo::delete(&state.pool, auth.family_id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
    }
}

/// Load a category referenced by a transaction or budget and check its kind.
///
/// Categories of other families are reported as a validation error rather
/// than a 404 so the referencing request reads as malformed.
pub(crate) async fn require_category(
    state: &AppState,
    family_id: DbId,
    category_id: DbId,
    expected_kind: &str,
) -> AppResult<Category> {
    let category = CategoryRepo::find_by_id(&state.pool, family_id, category_id)
        .await?
        .ok_or_else(|| invalid(format!("Category {category_id} does not exist")))?;
    ensure_kind(expected_kind, &category.kind).map_err(invalid)?;
    Ok(category)
}
