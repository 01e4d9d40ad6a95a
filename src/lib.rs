//! # Resource Hub Backend Library
//!
//! Administrators curate resource links (external URLs or uploaded files),
//! group them into ordered resource sets, and a read-only JSON API exposes
//! them to the client app, including previous/next navigation inside a set
//! and QR codes for a link's target.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server and routing
//! - **SQLx**: asynchronous SQLite access
//! - **Tokio**: async runtime
//! - **Serde**: JSON representations
//!
//! ## Core Components
//!
//! - [`config`]: layered configuration
//! - [`db`]: pool setup and schema
//! - [`error`]: error taxonomy and HTTP error responses
//! - [`models`]: persisted records
//! - [`types`]: client-facing representations
//! - [`catalog`]: read-only link/set queries and derived fields
//! - [`admin`]: administrative write path (not reachable over HTTP)
//! - [`storage`]: file storage abstraction
//! - [`qr`]: QR code rendering
//! - [`metrics`]: request counters
//! - [`middleware`]: security headers and request validation
//! - [`routes`]: HTTP handlers
//! - [`state`]: shared application state

pub mod admin;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod qr;
pub mod routes;
pub mod state;
pub mod storage;
pub mod types;

#[cfg(test)]
mod tests;
