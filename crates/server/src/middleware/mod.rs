//! HTTP middleware stack for the CRM API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `SQLite` store)
//! 4. Security headers
//! 5. Rate limiting on the login route (governor)

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdmin, RequireAuth, establish_session};
pub use rate_limit::{client_ip, login_rate_limiter};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
