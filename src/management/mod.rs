mod auth;
mod session;

pub use auth::EXPIRY_BUFFER_SECS;
pub use auth::TokenManager;
pub use session::LoginCompletion;
pub use session::SESSION_COOKIE;
pub use session::SessionOrigin;
pub use session::SessionStatus;
pub use session::SessionStore;
