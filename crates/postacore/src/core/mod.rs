//! Core utilities, configuration, errors and domain types

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use logging::init_logger;
pub use types::TariffCode;
