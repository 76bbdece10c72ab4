//! # campus-core
//!
//! Core types, errors, and utilities shared by the campus crates.
//!
//! This crate provides:
//! - [`CampusError`] - Application-level error type
//! - [`logging`] - Tracing setup and log file locations
//! - [`types`] - Shared types such as [`Severity`]
//!
//! ## Example
//!
//! ```no_run
//! use campus_core::{CampusError, logging};
//!
//! fn main() -> campus_core::Result<()> {
//!     let _guard = logging::init_logging(None, false, logging::LogOutput::FileAndConsole)?;
//!
//!     let config_path = std::path::Path::new("forms.yaml");
//!     if !config_path.exists() {
//!         return Err(CampusError::config_not_found(config_path));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

pub use error::{CampusError, Result};
pub use logging::{LogGuard, LogOutput, init_logging};
pub use types::Severity;
