//! Database models and queries

pub mod centers;
pub mod init;
pub mod models;
pub mod pagination;
pub mod reset;
pub mod users;

pub use init::*;
pub use models::*;
pub use pagination::Pagination;
pub use reset::{reset_directory, ResetCounts};
