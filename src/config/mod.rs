//! Configuration modules for the Unibase API.
//!
//! Each submodule handles a specific aspect of configuration, loaded from
//! environment variables:
//!
//! - [`cors`]: CORS allowed origins
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: JWT secrets and token expirations
//! - [`security`]: bcrypt cost, login lockout thresholds, refresh-cookie flags

pub mod cors;
pub mod database;
pub mod jwt;
pub mod security;
