use serde::Serialize;
use serde_json::{json, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::models::{Board, BoardActivity, BoardColumn, BoardMember, BoardPermission, BoardRole, Card};

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Board not found")]
    NotFound,

    #[error("Card not found")]
    CardNotFound,

    #[error("Column not found")]
    ColumnNotFound,

    #[error("Insufficient board permission")]
    PermissionDenied,

    #[error("User is already a board member")]
    MemberExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Board member not found")]
    MemberNotFound,

    #[error("Column list does not match the board's columns")]
    InvalidColumnSet,

    #[error("Stored board role is not a known value: {0}")]
    InvalidStoredRole(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Effective permission of one user on one board. Ownership overrides any
/// membership row, even a lower one; without ownership the membership role
/// decides; without either there is no access. Pure, so callers that
/// already hold the rows can check without touching the database.
pub fn effective_permission(
    created_by: Uuid,
    user_id: Uuid,
    membership: Option<BoardRole>,
) -> BoardPermission {
    if created_by == user_id {
        return BoardPermission::Admin;
    }
    match membership {
        Some(role) => role.into(),
        None => BoardPermission::None,
    }
}

/// Full board payload for the detail endpoint, including the caller's own
/// permission so the frontend can decide which controls to render.
#[derive(Debug, Serialize)]
pub struct BoardDetail {
    pub board: Board,
    pub permission: BoardPermission,
    pub columns: Vec<BoardColumn>,
    pub cards: Vec<Card>,
    pub members: Vec<BoardMember>,
}

fn board_from_row(row: PgRow) -> Board {
    Board {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn column_from_row(row: PgRow) -> BoardColumn {
    BoardColumn {
        id: row.get("id"),
        board_id: row.get("board_id"),
        title: row.get("title"),
        position: row.get("position"),
    }
}

fn card_from_row(row: PgRow) -> Card {
    Card {
        id: row.get("id"),
        column_id: row.get("column_id"),
        title: row.get("title"),
        description: row.get("description"),
        position: row.get("position"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn parse_board_role(raw: String) -> Result<BoardRole, BoardError> {
    BoardRole::parse(&raw).map_err(BoardError::InvalidStoredRole)
}

/// Classify constraint violations from the membership insert: a duplicate
/// pair means the user is already a member, a failing user foreign key means
/// the user does not exist.
fn member_insert_violation(constraint: Option<&str>) -> Option<BoardError> {
    match constraint {
        Some("board_members_pkey") => Some(BoardError::MemberExists),
        Some("board_members_user_id_fkey") => Some(BoardError::UserNotFound),
        _ => None,
    }
}

pub struct BoardService {
    pool: PgPool,
}

impl BoardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute the caller's permission outside any transaction. A missing
    /// board yields None, identical to "no access"; callers that owe the
    /// client a 404 fetch the board separately.
    pub async fn permission_for(
        &self,
        user_id: Uuid,
        board_id: Uuid,
    ) -> Result<BoardPermission, BoardError> {
        let board = sqlx::query("SELECT created_by FROM boards WHERE id = $1")
            .bind(board_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(board) = board else {
            return Ok(BoardPermission::None);
        };
        let created_by: Uuid = board.get("created_by");

        let membership = self.membership_role(user_id, board_id).await?;
        Ok(effective_permission(created_by, user_id, membership))
    }

    async fn membership_role(
        &self,
        user_id: Uuid,
        board_id: Uuid,
    ) -> Result<Option<BoardRole>, BoardError> {
        let row = sqlx::query("SELECT role FROM board_members WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| parse_board_role(r.get("role"))).transpose()
    }

    /// Permission check inside a mutation's transaction. The board row and
    /// any membership row are locked FOR SHARE, so a concurrent membership
    /// revocation cannot commit between this check and the mutation it
    /// guards.
    async fn board_and_permission_locked(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        board_id: Uuid,
    ) -> Result<(Board, BoardPermission), BoardError> {
        let row = sqlx::query(
            "SELECT id, name, description, created_by, created_at, updated_at \
             FROM boards WHERE id = $1 FOR SHARE",
        )
        .bind(board_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(BoardError::NotFound)?;
        let board = board_from_row(row);

        let membership = sqlx::query(
            "SELECT role FROM board_members WHERE board_id = $1 AND user_id = $2 FOR SHARE",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .map(|r| parse_board_role(r.get("role")))
        .transpose()?;

        let permission = effective_permission(board.created_by, user_id, membership);
        Ok((board, permission))
    }

    async fn log_activity(
        tx: &mut Transaction<'_, Postgres>,
        board_id: Uuid,
        user_id: Uuid,
        action: &str,
        detail: Value,
    ) -> Result<(), BoardError> {
        sqlx::query(
            "INSERT INTO board_activity (id, board_id, user_id, action, detail) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(board_id)
        .bind(user_id)
        .bind(action)
        .bind(detail)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Boards the user can see: created by them or carrying a membership row.
    pub async fn list_boards(&self, user_id: Uuid) -> Result<Vec<Board>, BoardError> {
        let rows = sqlx::query(
            "SELECT DISTINCT b.id, b.name, b.description, b.created_by, b.created_at, b.updated_at \
             FROM boards b \
             LEFT JOIN board_members m ON m.board_id = b.id AND m.user_id = $1 \
             WHERE b.created_by = $1 OR m.user_id IS NOT NULL \
             ORDER BY b.created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(board_from_row).collect())
    }

    pub async fn create_board(
        &self,
        user_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Board, BoardError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "INSERT INTO boards (id, name, description, created_by) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, description, created_by, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        let board = board_from_row(row);
        Self::log_activity(&mut tx, board.id, user_id, "board.created", json!({ "name": name }))
            .await?;
        tx.commit().await?;
        info!("Board {} created by {}", board.id, user_id);
        Ok(board)
    }

    /// Board detail. VIEWER tier; missing board is a 404 here because the
    /// caller asked for a specific board.
    pub async fn board_detail(&self, user_id: Uuid, board_id: Uuid) -> Result<BoardDetail, BoardError> {
        let row = sqlx::query(
            "SELECT id, name, description, created_by, created_at, updated_at \
             FROM boards WHERE id = $1",
        )
        .bind(board_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BoardError::NotFound)?;
        let board = board_from_row(row);

        let membership = self.membership_role(user_id, board_id).await?;
        let permission = effective_permission(board.created_by, user_id, membership);
        if !permission.can_access() {
            return Err(BoardError::PermissionDenied);
        }

        let columns = sqlx::query(
            "SELECT id, board_id, title, position FROM board_columns \
             WHERE board_id = $1 ORDER BY position",
        )
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(column_from_row)
        .collect();

        let cards = sqlx::query(
            "SELECT c.id, c.column_id, c.title, c.description, c.position, c.created_by, \
             c.created_at, c.updated_at \
             FROM cards c JOIN board_columns col ON col.id = c.column_id \
             WHERE col.board_id = $1 ORDER BY c.position",
        )
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(card_from_row)
        .collect();

        let members = sqlx::query(
            "SELECT m.board_id, m.user_id, u.name AS user_name, u.email AS user_email, m.role \
             FROM board_members m JOIN users u ON u.id = m.user_id \
             WHERE m.board_id = $1 ORDER BY u.name",
        )
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| {
            Ok(BoardMember {
                board_id: row.get("board_id"),
                user_id: row.get("user_id"),
                user_name: row.get("user_name"),
                user_email: row.get("user_email"),
                role: parse_board_role(row.get("role"))?,
            })
        })
        .collect::<Result<Vec<_>, BoardError>>()?;

        Ok(BoardDetail {
            board,
            permission,
            columns,
            cards,
            members,
        })
    }

    /// Rename or re-describe a board. ADMIN tier.
    pub async fn update_board(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Board, BoardError> {
        let mut tx = self.pool.begin().await?;
        let (_, permission) = Self::board_and_permission_locked(&mut tx, user_id, board_id).await?;
        if !permission.is_admin() {
            return Err(BoardError::PermissionDenied);
        }

        let row = sqlx::query(
            "UPDATE boards SET name = $1, description = $2, updated_at = now() WHERE id = $3 \
             RETURNING id, name, description, created_by, created_at, updated_at",
        )
        .bind(name)
        .bind(description)
        .bind(board_id)
        .fetch_one(&mut *tx)
        .await?;
        let board = board_from_row(row);
        Self::log_activity(&mut tx, board_id, user_id, "board.updated", json!({ "name": name }))
            .await?;
        tx.commit().await?;
        Ok(board)
    }

    /// Delete a board and everything on it. ADMIN tier. Child rows go via
    /// ON DELETE CASCADE, activity included, so no log entry survives.
    pub async fn delete_board(&self, user_id: Uuid, board_id: Uuid) -> Result<(), BoardError> {
        let mut tx = self.pool.begin().await?;
        let (_, permission) = Self::board_and_permission_locked(&mut tx, user_id, board_id).await?;
        if !permission.is_admin() {
            return Err(BoardError::PermissionDenied);
        }

        sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(board_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Board {} deleted by {}", board_id, user_id);
        Ok(())
    }

    /// Add a member. ADMIN tier. Adding the creator is rejected as an
    /// existing member; their access is implied by ownership.
    pub async fn add_member(
        &self,
        actor_id: Uuid,
        board_id: Uuid,
        user_id: Uuid,
        role: BoardRole,
    ) -> Result<(), BoardError> {
        let mut tx = self.pool.begin().await?;
        let (board, permission) = Self::board_and_permission_locked(&mut tx, actor_id, board_id).await?;
        if !permission.is_admin() {
            return Err(BoardError::PermissionDenied);
        }
        if board.created_by == user_id {
            return Err(BoardError::MemberExists);
        }

        sqlx::query("INSERT INTO board_members (board_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(board_id)
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                let constraint = match &e {
                    sqlx::Error::Database(db) => db.constraint().map(str::to_string),
                    _ => None,
                };
                member_insert_violation(constraint.as_deref()).unwrap_or(BoardError::Database(e))
            })?;
        Self::log_activity(
            &mut tx,
            board_id,
            actor_id,
            "member.added",
            json!({ "user_id": user_id, "role": role.as_str() }),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Change a member's role. ADMIN tier.
    pub async fn update_member(
        &self,
        actor_id: Uuid,
        board_id: Uuid,
        user_id: Uuid,
        role: BoardRole,
    ) -> Result<(), BoardError> {
        let mut tx = self.pool.begin().await?;
        let (_, permission) = Self::board_and_permission_locked(&mut tx, actor_id, board_id).await?;
        if !permission.is_admin() {
            return Err(BoardError::PermissionDenied);
        }

        let result = sqlx::query(
            "UPDATE board_members SET role = $1 WHERE board_id = $2 AND user_id = $3",
        )
        .bind(role.as_str())
        .bind(board_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(BoardError::MemberNotFound);
        }
        Self::log_activity(
            &mut tx,
            board_id,
            actor_id,
            "member.role_changed",
            json!({ "user_id": user_id, "role": role.as_str() }),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Remove a member. ADMIN tier, except that any member may remove
    /// themselves (leaving a board needs no one's approval).
    pub async fn remove_member(
        &self,
        actor_id: Uuid,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), BoardError> {
        let mut tx = self.pool.begin().await?;
        let (_, permission) = Self::board_and_permission_locked(&mut tx, actor_id, board_id).await?;
        let leaving_self = actor_id == user_id && permission.can_access();
        if !permission.is_admin() && !leaving_self {
            return Err(BoardError::PermissionDenied);
        }

        let result = sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BoardError::MemberNotFound);
        }
        Self::log_activity(
            &mut tx,
            board_id,
            actor_id,
            "member.removed",
            json!({ "user_id": user_id }),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Append a column at the end. ADMIN tier.
    pub async fn create_column(
        &self,
        actor_id: Uuid,
        board_id: Uuid,
        title: &str,
    ) -> Result<BoardColumn, BoardError> {
        let mut tx = self.pool.begin().await?;
        let (_, permission) = Self::board_and_permission_locked(&mut tx, actor_id, board_id).await?;
        if !permission.is_admin() {
            return Err(BoardError::PermissionDenied);
        }

        let row = sqlx::query(
            "INSERT INTO board_columns (id, board_id, title, position) \
             VALUES ($1, $2, $3, \
               (SELECT COALESCE(MAX(position), -1) + 1 FROM board_columns WHERE board_id = $2)) \
             RETURNING id, board_id, title, position",
        )
        .bind(Uuid::new_v4())
        .bind(board_id)
        .bind(title)
        .fetch_one(&mut *tx)
        .await?;
        let column = column_from_row(row);
        Self::log_activity(&mut tx, board_id, actor_id, "column.created", json!({ "title": title }))
            .await?;
        tx.commit().await?;
        Ok(column)
    }

    /// Reorder all columns at once. ADMIN tier. The submitted list must
    /// name every column of the board exactly once.
    pub async fn reorder_columns(
        &self,
        actor_id: Uuid,
        board_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<(), BoardError> {
        let mut tx = self.pool.begin().await?;
        let (_, permission) = Self::board_and_permission_locked(&mut tx, actor_id, board_id).await?;
        if !permission.is_admin() {
            return Err(BoardError::PermissionDenied);
        }

        let rows = sqlx::query("SELECT id FROM board_columns WHERE board_id = $1 FOR UPDATE")
            .bind(board_id)
            .fetch_all(&mut *tx)
            .await?;
        let mut existing: Vec<Uuid> = rows.into_iter().map(|r| r.get("id")).collect();
        let mut submitted = ordered_ids.to_vec();
        existing.sort();
        submitted.sort();
        if existing != submitted {
            return Err(BoardError::InvalidColumnSet);
        }

        for (position, column_id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE board_columns SET position = $1 WHERE id = $2")
                .bind(position as i32)
                .bind(column_id)
                .execute(&mut *tx)
                .await?;
        }
        Self::log_activity(
            &mut tx,
            board_id,
            actor_id,
            "columns.reordered",
            json!({ "order": ordered_ids }),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Create a card at the end of a column. EDITOR tier.
    pub async fn create_card(
        &self,
        actor_id: Uuid,
        board_id: Uuid,
        column_id: Uuid,
        title: &str,
        description: Option<&str>,
    ) -> Result<Card, BoardError> {
        let mut tx = self.pool.begin().await?;
        let (_, permission) = Self::board_and_permission_locked(&mut tx, actor_id, board_id).await?;
        if !permission.can_edit() {
            return Err(BoardError::PermissionDenied);
        }

        let column = sqlx::query("SELECT board_id FROM board_columns WHERE id = $1")
            .bind(column_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BoardError::ColumnNotFound)?;
        let column_board: Uuid = column.get("board_id");
        if column_board != board_id {
            return Err(BoardError::ColumnNotFound);
        }

        let row = sqlx::query(
            "INSERT INTO cards (id, column_id, title, description, position, created_by) \
             VALUES ($1, $2, $3, $4, \
               (SELECT COALESCE(MAX(position), -1) + 1 FROM cards WHERE column_id = $2), $5) \
             RETURNING id, column_id, title, description, position, created_by, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(column_id)
        .bind(title)
        .bind(description)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await?;
        let card = card_from_row(row);
        Self::log_activity(&mut tx, board_id, actor_id, "card.created", json!({ "title": title }))
            .await?;
        tx.commit().await?;
        Ok(card)
    }

    /// Move a card to another column/position. EDITOR tier on the card's
    /// board; the target column must belong to the same board.
    pub async fn move_card(
        &self,
        actor_id: Uuid,
        card_id: Uuid,
        to_column: Uuid,
        position: i32,
    ) -> Result<Card, BoardError> {
        let mut tx = self.pool.begin().await?;

        let card = sqlx::query(
            "SELECT c.id, col.board_id FROM cards c \
             JOIN board_columns col ON col.id = c.column_id WHERE c.id = $1",
        )
        .bind(card_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BoardError::CardNotFound)?;
        let board_id: Uuid = card.get("board_id");

        let (_, permission) = Self::board_and_permission_locked(&mut tx, actor_id, board_id).await?;
        if !permission.can_edit() {
            return Err(BoardError::PermissionDenied);
        }

        let target = sqlx::query("SELECT board_id FROM board_columns WHERE id = $1")
            .bind(to_column)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BoardError::ColumnNotFound)?;
        let target_board: Uuid = target.get("board_id");
        if target_board != board_id {
            return Err(BoardError::ColumnNotFound);
        }

        // The initial card read is unlocked, so a concurrent delete can land
        // before this update; zero rows here means the card is gone, not a
        // server fault
        let row = sqlx::query(
            "UPDATE cards SET column_id = $1, position = $2, updated_at = now() WHERE id = $3 \
             RETURNING id, column_id, title, description, position, created_by, created_at, updated_at",
        )
        .bind(to_column)
        .bind(position)
        .bind(card_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BoardError::CardNotFound)?;
        let card = card_from_row(row);
        Self::log_activity(
            &mut tx,
            board_id,
            actor_id,
            "card.moved",
            json!({ "card_id": card_id, "column_id": to_column, "position": position }),
        )
        .await?;
        tx.commit().await?;
        Ok(card)
    }

    /// Delete a card. EDITOR tier on the card's board.
    pub async fn delete_card(&self, actor_id: Uuid, card_id: Uuid) -> Result<(), BoardError> {
        let mut tx = self.pool.begin().await?;

        let card = sqlx::query(
            "SELECT c.id, c.title, col.board_id FROM cards c \
             JOIN board_columns col ON col.id = c.column_id WHERE c.id = $1",
        )
        .bind(card_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BoardError::CardNotFound)?;
        let board_id: Uuid = card.get("board_id");
        let title: String = card.get("title");

        let (_, permission) = Self::board_and_permission_locked(&mut tx, actor_id, board_id).await?;
        if !permission.can_edit() {
            return Err(BoardError::PermissionDenied);
        }

        sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(card_id)
            .execute(&mut *tx)
            .await?;
        Self::log_activity(
            &mut tx,
            board_id,
            actor_id,
            "card.deleted",
            json!({ "card_id": card_id, "title": title }),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Recent activity for a board, newest first. VIEWER tier.
    pub async fn activity(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        limit: i64,
    ) -> Result<Vec<BoardActivity>, BoardError> {
        let permission = self.permission_for(user_id, board_id).await?;
        if !permission.can_access() {
            return Err(BoardError::PermissionDenied);
        }

        let rows = sqlx::query(
            "SELECT id, board_id, user_id, action, detail, created_at \
             FROM board_activity WHERE board_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(board_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| BoardActivity {
                id: row.get("id"),
                board_id: row.get("board_id"),
                user_id: row.get("user_id"),
                action: row.get("action"),
                detail: row.get("detail"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creator_is_admin_regardless_of_membership() {
        let creator = Uuid::new_v4();
        assert_eq!(effective_permission(creator, creator, None), BoardPermission::Admin);
        // A conflicting lower membership row is ignored
        assert_eq!(
            effective_permission(creator, creator, Some(BoardRole::Viewer)),
            BoardPermission::Admin
        );
    }

    #[test]
    fn membership_role_decides_for_non_creators() {
        let creator = Uuid::new_v4();
        let member = Uuid::new_v4();
        assert_eq!(
            effective_permission(creator, member, Some(BoardRole::Viewer)),
            BoardPermission::Viewer
        );
        assert_eq!(
            effective_permission(creator, member, Some(BoardRole::Editor)),
            BoardPermission::Editor
        );
        assert_eq!(
            effective_permission(creator, member, Some(BoardRole::Admin)),
            BoardPermission::Admin
        );
    }

    #[test]
    fn strangers_get_nothing() {
        let creator = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let permission = effective_permission(creator, stranger, None);
        assert_eq!(permission, BoardPermission::None);
        assert!(!permission.can_access());
        assert!(!permission.can_edit());
        assert!(!permission.is_admin());
    }

    #[test]
    fn membership_insert_violations_name_the_real_problem() {
        // Duplicate (board_id, user_id) pair: already a member → 409
        assert!(matches!(
            member_insert_violation(Some("board_members_pkey")),
            Some(BoardError::MemberExists)
        ));
        // Failing user foreign key: no such user → 404, not a 500
        assert!(matches!(
            member_insert_violation(Some("board_members_user_id_fkey")),
            Some(BoardError::UserNotFound)
        ));
        // Anything else stays a database error
        assert!(member_insert_violation(Some("board_members_board_id_fkey")).is_none());
        assert!(member_insert_violation(None).is_none());
    }

    #[test]
    fn viewer_cannot_pass_an_admin_check() {
        // A VIEWER attempting an ADMIN-tier mutation (e.g. column reorder)
        let creator = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let permission = effective_permission(creator, viewer, Some(BoardRole::Viewer));
        assert!(!permission.is_admin());
        assert!(permission.can_access());
    }
}
