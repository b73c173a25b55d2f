//! ttsdiag - text-to-speech diagnostics
//!
//! Checks whether speech synthesis works on a Linux host: finds the
//! synthesis tool, synthesizes and plays a phrase, tries the system speech
//! engines, inspects the audio server, and writes a troubleshooting guide
//! for the application under test.

pub mod config;
pub mod error;
pub mod guide;
pub mod platform;
pub mod probe;
pub mod process;
pub mod report;

pub use error::{DiagError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "ttsdiag";
