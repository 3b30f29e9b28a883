//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. CORS
//! 6. Body limit
//! 7. Bearer auth (product and profile routes only)

pub mod auth;
pub mod request_id;
pub mod security_headers;

pub use auth::{AuthUser, require_auth};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
