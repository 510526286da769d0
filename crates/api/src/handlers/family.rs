//! Handlers for the caller's family (`/family`).

use axum::extract::State;
use axum::Json;
use hearth_core::error::CoreError;
use hearth_core::money::validate_currency;
use hearth_db::models::family::{Family, UpdateFamily};
use hearth_db::repositories::FamilyRepo;

use crate::error::{invalid, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/family
pub async fn get_family(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Family>>> {
    let family = FamilyRepo::find_by_id(&state.pool, auth.family_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Family",
            id: auth.family_id,
        }))?;
    Ok(Json(DataResponse { data: family }))
}

/// PUT /api/v1/family
///
/// Rename the family or change its currency. Admin only.
pub async fn update_family(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<UpdateFamily>,
) -> AppResult<Json<DataResponse<Family>>> {
    if let Some(name) = &input.name {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(invalid("Family name must not be empty".into()));
        }
        input.name = Some(trimmed.to_string());
    }
    if let Some(currency) = &input.currency {
        validate_currency(currency).map_err(invalid)?;
    }

    let family = FamilyRepo::update(&state.pool, admin.family_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Family",
            id: admin.family_id,
        }))?;
    Ok(Json(DataResponse { data: family }))
}
