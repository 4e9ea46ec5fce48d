//! Middleware components for request processing.
//!
//! This module contains middleware for logging, request ID tracking,
//! error handling, and the login rate limit.

mod error_handler;
mod logging;
mod rate_limit;
mod request_id;

pub use error_handler::{duplicate_response, global_error_handler};
pub use logging::logging_middleware;
pub use rate_limit::limit_login_routes;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
