pub mod collector;
pub mod config;
pub mod error;
pub mod exporter;
pub mod store;

pub use error::{AppError, Result};
