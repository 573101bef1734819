//! Database initialization, models and the result store

pub mod init;
pub mod models;
pub mod store;

pub use init::*;
pub use models::*;
pub use store::*;
