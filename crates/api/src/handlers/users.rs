//! Handlers for family members (`/users`) and the caller's own profile (`/me`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use hearth_core::error::CoreError;
use hearth_core::event_types::MEMBER_ADDED;
use hearth_core::roles::{validate_role, ROLE_ADMIN, ROLE_MEMBER};
use hearth_core::types::DbId;
use hearth_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use hearth_db::repositories::{SessionRepo, UserRepo};
use hearth_events::FinanceEvent;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{invalid, validate_request, AppError, AppResult};
use crate::handlers::auth::normalize_email;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 120, message = "must be 1 to 120 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
    /// Defaults to `member`.
    pub role: Option<String>,
}

/// Request body for `PUT /users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 120, message = "must be 1 to 120 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `PUT /me`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 120, message = "must be 1 to 120 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
}

/// Request body for `POST /me/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Family members
// ---------------------------------------------------------------------------

/// GET /api/v1/users
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_by_family(&state.pool, auth.family_id).await?;
    let data = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/users
///
/// Add a member to the caller's family. Admin only.
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateMemberRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    validate_request(&input)?;
    validate_password_strength(&input.password).map_err(invalid)?;
    let role = input.role.unwrap_or_else(|| ROLE_MEMBER.to_string());
    validate_role(&role).map_err(invalid)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            family_id: admin.family_id,
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            password_hash,
            role,
        },
    )
    .await?;

    tracing::info!(family_id = admin.family_id, user_id = user.id, "Member added");
    state.event_bus.publish(
        FinanceEvent::new(MEMBER_ADDED, admin.family_id)
            .with_source("user", user.id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({ "member_name": user.name })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_member(&state, auth.family_id, id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/users/{id}
///
/// Update a member. Admins cannot change their own role or deactivate
/// themselves, and the last active admin cannot be demoted.
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMemberRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    validate_request(&input)?;
    if let Some(role) = &input.role {
        validate_role(role).map_err(invalid)?;
    }

    let target = find_member(&state, admin.family_id, id).await?;

    if target.id == admin.user_id {
        if input.role.as_deref().is_some_and(|r| r != target.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "You cannot change your own role".into(),
            )));
        }
        if input.is_active == Some(false) {
            return Err(AppError::Core(CoreError::Forbidden(
                "You cannot deactivate yourself".into(),
            )));
        }
    }

    let demoting = target.role == ROLE_ADMIN
        && target.is_active
        && (input.role.as_deref().is_some_and(|r| r != ROLE_ADMIN)
            || input.is_active == Some(false));
    if demoting {
        ensure_not_last_admin(&state, admin.family_id).await?;
    }

    let update = UpdateUser {
        name: input.name.map(|n| n.trim().to_string()),
        email: input.email.as_deref().map(normalize_email),
        role: input.role,
        is_active: input.is_active,
    };
    let user = UserRepo::update(&state.pool, admin.family_id, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if update.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
    }

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// DELETE /api/v1/users/{id}
///
/// Deactivate a member and revoke their sessions. Returns 204.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot deactivate yourself".into(),
        )));
    }

    let target = find_member(&state, admin.family_id, id).await?;
    if target.role == ROLE_ADMIN && target.is_active {
        ensure_not_last_admin(&state, admin.family_id).await?;
    }

    UserRepo::deactivate(&state.pool, admin.family_id, id).await?;
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(family_id = admin.family_id, user_id = id, "Member deactivated");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Own profile
// ---------------------------------------------------------------------------

/// GET /api/v1/me
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_member(&state, auth.family_id, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/me
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    validate_request(&input)?;
    let update = UpdateUser {
        name: input.name.map(|n| n.trim().to_string()),
        email: input.email.as_deref().map(normalize_email),
        ..Default::default()
    };
    let user = UserRepo::update(&state.pool, auth.family_id, auth.user_id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/me/password
///
/// Change the caller's password. All sessions are revoked, so the client
/// must sign in again. Returns 204.
pub async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = find_member(&state, auth.family_id, auth.user_id).await?;

    let matches = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !matches {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Current password is incorrect".into(),
        )));
    }
    validate_password_strength(&input.new_password).map_err(invalid)?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_member(state: &AppState, family_id: DbId, id: DbId) -> AppResult<User> {
    UserRepo::find_in_family(&state.pool, family_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

async fn ensure_not_last_admin(state: &AppState, family_id: DbId) -> AppResult<()> {
    let admins = UserRepo::count_active_admins(&state.pool, family_id).await?;
    if admins <= 1 {
        return Err(AppError::Core(CoreError::Conflict(
            "A family must keep at least one active admin".into(),
        )));
    }
    Ok(())
}
