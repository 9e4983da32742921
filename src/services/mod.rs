pub mod board_service;
pub mod google;
pub mod user_service;

pub use board_service::{effective_permission, BoardError, BoardService};
pub use google::{GoogleClient, GoogleError, GoogleUser};
pub use user_service::{UserError, UserService};
