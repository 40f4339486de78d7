//! Shared types, config, and error definitions for firemetrics.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::AppConfig;
pub use error::Error;
pub use provider::{RawSeries, SeriesProvider};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
