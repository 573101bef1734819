//! # markr Common Library
//!
//! Shared code for the markr results service:
//! - Database initialization, row models and the result store
//! - Bootstrap configuration loading
//! - Descriptive statistics over percentage scores

pub mod config;
pub mod db;
pub mod error;
pub mod stats;

pub use error::{Error, Result};
