use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Role stored in a board_members row. The board creator has no row; their
/// permission is implied by ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoardRole {
    Viewer,
    Editor,
    Admin,
}

impl BoardRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardRole::Viewer => "VIEWER",
            BoardRole::Editor => "EDITOR",
            BoardRole::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "VIEWER" => Ok(BoardRole::Viewer),
            "EDITOR" => Ok(BoardRole::Editor),
            "ADMIN" => Ok(BoardRole::Admin),
            other => Err(other.to_string()),
        }
    }
}

/// Effective permission of one user on one board, computed and never stored.
/// The derive order gives the total order None < Viewer < Editor < Admin,
/// so "at least" checks are ordinal comparisons rather than string matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoardPermission {
    None,
    Viewer,
    Editor,
    Admin,
}

impl BoardPermission {
    pub fn can_access(&self) -> bool {
        *self != BoardPermission::None
    }

    pub fn can_edit(&self) -> bool {
        *self >= BoardPermission::Editor
    }

    pub fn is_admin(&self) -> bool {
        *self == BoardPermission::Admin
    }

    pub fn at_least(&self, required: BoardPermission) -> bool {
        *self >= required
    }
}

impl From<BoardRole> for BoardPermission {
    fn from(role: BoardRole) -> Self {
        match role {
            BoardRole::Viewer => BoardPermission::Viewer,
            BoardRole::Editor => BoardPermission::Editor,
            BoardRole::Admin => BoardPermission::Admin,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardMember {
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub role: BoardRole,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit record, written in the same transaction as the board
/// mutation it describes.
#[derive(Debug, Clone, Serialize)]
pub struct BoardActivity {
    pub id: Uuid,
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub detail: Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_order_is_total() {
        use BoardPermission::*;
        assert!(None < Viewer);
        assert!(Viewer < Editor);
        assert!(Editor < Admin);
        assert!(Admin.at_least(Editor));
        assert!(Editor.at_least(Editor));
        assert!(!Viewer.at_least(Editor));
    }

    #[test]
    fn predicates_follow_the_order() {
        assert!(!BoardPermission::None.can_access());
        assert!(BoardPermission::Viewer.can_access());
        assert!(!BoardPermission::Viewer.can_edit());
        assert!(BoardPermission::Editor.can_edit());
        assert!(!BoardPermission::Editor.is_admin());
        assert!(BoardPermission::Admin.is_admin());
    }

    #[test]
    fn membership_role_maps_to_permission() {
        assert_eq!(BoardPermission::from(BoardRole::Viewer), BoardPermission::Viewer);
        assert_eq!(BoardPermission::from(BoardRole::Admin), BoardPermission::Admin);
    }

    #[test]
    fn parses_stored_board_roles() {
        assert_eq!(BoardRole::parse("EDITOR"), Ok(BoardRole::Editor));
        assert_eq!(BoardRole::parse("owner"), Err("owner".to_string()));
    }
}
