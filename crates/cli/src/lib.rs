//! Terminal helpers for apk-recon
//!
//! Provides shared CLI functionality:
//! - Report layout primitives (section headers, bullets, placeholders)
//! - Status messages
//! - Progress spinner

#![warn(missing_docs)]

pub mod output;
pub mod progress;
