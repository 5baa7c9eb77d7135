//! Middleware modules for request processing.
//!
//! - [`auth`]: the `AuthAdmin` extractor validating Bearer tokens
//! - [`guard`]: route-layer guards enforcing the approved-and-active admin
//!   requirement, super-admin access, and ownership checks
//!
//! # Authentication Flow
//!
//! 1. Client sends a request with `Authorization: Bearer <token>`
//! 2. The guard layer validates the JWT, re-loads the admin row, and rejects
//!    unapproved, deactivated, or deleted accounts
//! 3. Handlers that need the caller's identity use the [`auth::AuthAdmin`]
//!    extractor

pub mod auth;
pub mod guard;
