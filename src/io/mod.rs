//! Input/output operations and error handling
//!
//! This module contains the run's outer surfaces including:
//! - Command-line parsing and run orchestration
//! - Volume decoding from TIFF stacks and slice directories
//! - CSV export of PSD and REV tables
//! - Progress display

/// Command-line interface and run orchestration
pub mod cli;
/// Analysis constants and runtime configuration
pub mod configuration;
/// Error types and context helpers
pub mod error;
/// CSV export of result tables
pub mod export;
/// Scale progress display
pub mod progress;
/// Volume decoding from disk
pub mod volume;
