//! Middleware components for HTTP request processing.
//!
//! Cross-cutting concerns layered onto every API route: security headers and
//! cheap request validation.

pub mod security_headers;
pub mod validation;
