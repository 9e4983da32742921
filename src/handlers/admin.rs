// Admin API: collaborator management, session revocation, dashboard counts.
// The gate admits only ADMIN users this far.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{CurrentUser, Role};
use crate::services::user_service::{AdminStats, UserService, UserSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

async fn service(state: &AppState) -> Result<UserService, ApiError> {
    Ok(UserService::new(state.db.pool().await?))
}

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserSummary>> {
    let users = service(&state).await?.list().await?;
    Ok(ApiResponse::success(users))
}

/// POST /api/admin/users. The generated temporary password appears in this
/// response and nowhere else; it is stored only as a hash.
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<Value> {
    if body.name.trim().is_empty() || !body.email.contains('@') {
        return Err(ApiError::bad_request("name and a valid email are required"));
    }

    let (user, temp_password) = service(&state)
        .await?
        .create_collaborator(body.name.trim(), &body.email, body.role)
        .await?;

    Ok(ApiResponse::created(json!({
        "user": CurrentUser::from(&user),
        "temporaryPassword": temp_password,
    })))
}

/// PUT /api/admin/users/:id/role. Admins cannot change their own role, so
/// the portal always keeps at least the acting admin.
pub async fn update_role(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<RoleRequest>,
) -> ApiResult<Value> {
    if user_id == admin.id {
        return Err(ApiError::forbidden("You cannot change your own role"));
    }

    let user = service(&state).await?.set_role(user_id, body.role).await?;
    Ok(ApiResponse::success(json!({ "user": CurrentUser::from(&user) })))
}

/// POST /api/admin/users/:id/revoke-sessions. Bumps token_version; every
/// token minted before the bump fails the resolver's check on its next
/// request.
pub async fn revoke_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Value> {
    let version = service(&state).await?.revoke_sessions(user_id).await?;
    Ok(ApiResponse::success(json!({
        "revoked": true,
        "tokenVersion": version,
    })))
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<AdminStats> {
    let stats = service(&state).await?.stats().await?;
    Ok(ApiResponse::success(stats))
}
