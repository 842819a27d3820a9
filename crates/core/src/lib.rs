//! Core utilities for apk-recon
//!
//! This crate provides the pieces shared by every apk-recon component:
//!
//! - **Error handling**: Structured errors with codes, context, recovery suggestions and exit codes
//! - **Configuration**: TOML-based keyword configuration with defaults
//! - **Scanning**: A single keyword-matching utility behind every report scanner
//!
//! # Example
//!
//! ```rust
//! use apk_recon_core::scan::{scan_matching, Scanners};
//!
//! let scanners = Scanners::default();
//! let hits = scan_matching(["Lcom/app/AnimatorUtil;", "Lcom/app/Http;"], &scanners.classes);
//! assert_eq!(hits.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod scan;

pub use error::{Error, ErrorCode, Result, ResultExt};
