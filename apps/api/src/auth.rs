mod password;
mod session;

pub use password::{login_handler, register_handler};
pub use session::{logout_handler, me_handler};

/// Session key holding the authenticated identity.
pub const SESSION_USER_KEY: &str = "user_identity";
