//! Integration and unit tests for the Resource Hub backend.
//!
//! ## Test Modules
//!
//! - **fixtures**: in-memory database + temp media directory shared by the tests
//! - **catalog_tests**: link/set representations, derived fields, navigation
//! - **admin_tests**: administrative write path and its invariants
//! - **api_tests**: HTTP endpoints driven through the router
//! - **config_tests**: configuration loading and validation
//! - **db_tests**: schema and constraint behaviour
//! - **error_tests**: error conversion and HTTP error responses
//!
//! Individual test modules can be run with:
//! ```bash
//! cargo test catalog_tests
//! cargo test api_tests
//! ```


pub mod catalog_tests;
pub mod config_tests;
