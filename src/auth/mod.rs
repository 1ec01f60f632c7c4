pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::AdminSession;
pub use password::AdminCredentials;
pub use session::{AdminSessions, SESSION_COOKIE};
