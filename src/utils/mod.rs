//! Utility modules for the Unibase API.
//!
//! - [`jwt`]: JWT token creation and verification

pub mod jwt;
