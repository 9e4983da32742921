pub mod board;
pub mod user;

pub use board::{Board, BoardActivity, BoardColumn, BoardMember, BoardPermission, BoardRole, Card};
pub use user::{CurrentUser, Role, User};
