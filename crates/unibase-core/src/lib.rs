//! # Unibase Core
//!
//! Core types, errors, and utilities for the Unibase API.
//!
//! This crate provides foundational types used throughout the Unibase
//! application:
//!
//! - [`errors`]: Application error types with HTTP response conversion
//! - [`ids`]: Primary-key validation
//! - [`pagination`]: Pagination and sorting utilities for list endpoints
//! - [`password`]: Password hashing and verification
//! - [`serde`]: Query-string deserialization helpers

pub mod errors;
pub mod ids;
pub mod pagination;
pub mod password;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use ids::validate_id;
pub use pagination::{PaginationParams, SortOrder, SortParams};
pub use password::{hash_password, verify_password};
