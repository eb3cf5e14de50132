//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (nosniff, referrer policy, default frame-ancestors)
//! 5. Session gate (assert a shop session on document routes)

pub mod extract;
pub mod gate;
pub mod request_id;
pub mod security_headers;

pub use extract::{CurrentSession, ShopifySession};
pub use gate::{EXCLUDED_PATHS, is_excluded, session_gate};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
