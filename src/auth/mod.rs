//! Authentication: password hashing, cache-backed sessions and the
//! session gate middleware.

pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::require_session;
pub use password::{hash_password, verify_password};
pub use session::{Session, SessionStore, SESSION_COOKIE};
