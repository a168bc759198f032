//! # ECMO Common Library
//!
//! Shared code for the ECMO directory binaries:
//! - Database schema, models and queries
//! - Configuration loading and database path resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
