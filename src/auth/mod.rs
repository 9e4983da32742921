pub mod cookie;
pub mod gate;
pub mod session;
pub mod token;

pub use gate::{authorize, deny_response, Decision, DenyReason};
pub use session::{resolve_session, SESSION_COOKIE};
pub use token::{SessionClaims, TokenCodec, TokenError};
