// Kanban board endpoints. The route gate has already established identity;
// each mutation re-checks its board permission inside the service's
// transaction before touching state.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Board, BoardColumn, BoardRole, Card, CurrentUser};
use crate::services::board_service::{BoardDetail, BoardService};
use crate::state::AppState;

const ACTIVITY_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct BoardRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: BoardRole,
}

#[derive(Debug, Deserialize)]
pub struct MemberRoleRequest {
    pub role: BoardRole,
}

#[derive(Debug, Deserialize)]
pub struct ColumnRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub column_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CardRequest {
    pub column_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveCardRequest {
    pub column_id: Uuid,
    pub position: i32,
}

async fn service(state: &AppState) -> Result<BoardService, ApiError> {
    Ok(BoardService::new(state.db.pool().await?))
}

fn require_title(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{} is required", field)));
    }
    Ok(())
}

/// GET /api/boards
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Board>> {
    let boards = service(&state).await?.list_boards(user.id).await?;
    Ok(ApiResponse::success(boards))
}

/// POST /api/boards
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<BoardRequest>,
) -> ApiResult<Board> {
    require_title(&body.name, "name")?;
    let board = service(&state)
        .await?
        .create_board(user.id, body.name.trim(), body.description.as_deref())
        .await?;
    Ok(ApiResponse::created(board))
}

/// GET /api/boards/:id
pub async fn detail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(board_id): Path<Uuid>,
) -> ApiResult<BoardDetail> {
    let detail = service(&state).await?.board_detail(user.id, board_id).await?;
    Ok(ApiResponse::success(detail))
}

/// PUT /api/boards/:id
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(board_id): Path<Uuid>,
    Json(body): Json<BoardRequest>,
) -> ApiResult<Board> {
    require_title(&body.name, "name")?;
    let board = service(&state)
        .await?
        .update_board(user.id, board_id, body.name.trim(), body.description.as_deref())
        .await?;
    Ok(ApiResponse::success(board))
}

/// DELETE /api/boards/:id
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Value> {
    service(&state).await?.delete_board(user.id, board_id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// POST /api/boards/:id/members
pub async fn add_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(board_id): Path<Uuid>,
    Json(body): Json<AddMemberRequest>,
) -> ApiResult<Value> {
    service(&state)
        .await?
        .add_member(user.id, board_id, body.user_id, body.role)
        .await?;
    Ok(ApiResponse::created(json!({ "added": true })))
}

/// PUT /api/boards/:id/members/:user_id
pub async fn update_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((board_id, member_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<MemberRoleRequest>,
) -> ApiResult<Value> {
    service(&state)
        .await?
        .update_member(user.id, board_id, member_id, body.role)
        .await?;
    Ok(ApiResponse::success(json!({ "updated": true })))
}

/// DELETE /api/boards/:id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((board_id, member_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Value> {
    service(&state)
        .await?
        .remove_member(user.id, board_id, member_id)
        .await?;
    Ok(ApiResponse::success(json!({ "removed": true })))
}

/// POST /api/boards/:id/columns
pub async fn create_column(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(board_id): Path<Uuid>,
    Json(body): Json<ColumnRequest>,
) -> ApiResult<BoardColumn> {
    require_title(&body.title, "title")?;
    let column = service(&state)
        .await?
        .create_column(user.id, board_id, body.title.trim())
        .await?;
    Ok(ApiResponse::created(column))
}

/// PUT /api/boards/:id/columns/reorder
pub async fn reorder_columns(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(board_id): Path<Uuid>,
    Json(body): Json<ReorderRequest>,
) -> ApiResult<Value> {
    service(&state)
        .await?
        .reorder_columns(user.id, board_id, &body.column_ids)
        .await?;
    Ok(ApiResponse::success(json!({ "reordered": true })))
}

/// GET /api/boards/:id/activity
pub async fn activity(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Value> {
    let entries = service(&state)
        .await?
        .activity(user.id, board_id, ACTIVITY_LIMIT)
        .await?;
    Ok(ApiResponse::success(json!({ "activity": entries })))
}

/// POST /api/boards/:id/cards
pub async fn create_card(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(board_id): Path<Uuid>,
    Json(body): Json<CardRequest>,
) -> ApiResult<Card> {
    require_title(&body.title, "title")?;
    let card = service(&state)
        .await?
        .create_card(
            user.id,
            board_id,
            body.column_id,
            body.title.trim(),
            body.description.as_deref(),
        )
        .await?;
    Ok(ApiResponse::created(card))
}

/// PATCH /api/cards/:id/move
pub async fn move_card(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(card_id): Path<Uuid>,
    Json(body): Json<MoveCardRequest>,
) -> ApiResult<Card> {
    let card = service(&state)
        .await?
        .move_card(user.id, card_id, body.column_id, body.position)
        .await?;
    Ok(ApiResponse::success(card))
}

/// DELETE /api/cards/:id
pub async fn delete_card(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(card_id): Path<Uuid>,
) -> ApiResult<Value> {
    service(&state).await?.delete_card(user.id, card_id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
