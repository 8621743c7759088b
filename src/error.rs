// SPDX-License-Identifier: GPL-3.0-only
//! Error types for xbr
//!
//! Every variant is fatal: `main` prints it on one line to stderr and exits
//! with status 1.

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Wrong positional argument count or unknown flag (rendered clap usage)
    #[error("{0}")]
    Usage(String),

    /// Could not open the X display or RandR is unavailable
    #[error("Cannot open display: {source:#}")]
    DisplayConnect {
        #[source]
        source: anyhow::Error,
    },

    /// No reported output carries this exact name
    #[error("Output {0} not found")]
    OutputNotFound(String),

    /// The output exists but no CRTC drives it
    #[error("Output {0} is not active (no CRTC)")]
    OutputInactive(String),

    /// The CRTC reports a gamma table too small to hold a ramp
    #[error("Cannot get gamma size for CRTC of output {output} (reported size {size})")]
    GammaUnsupported { output: String, size: usize },

    /// Display server failure in the middle of a run
    #[error("Display server error: {source:#}")]
    Display {
        #[source]
        source: anyhow::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn display(source: anyhow::Error) -> Self {
        AppError::Display { source }
    }
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;
