pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;

/// Name of the HttpOnly cookie carrying the session token.
pub const SESSION_COOKIE: &str = "antly_session";
