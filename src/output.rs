// SPDX-License-Identifier: GPL-3.0-only
//! Output descriptors and name resolution

use crate::error::{AppError, Result};

/// Opaque handle of the CRTC driving an output
pub type CrtcHandle = u32;

/// An output as reported by the display server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDescriptor {
    /// Connector name (e.g., "eDP-1", "HDMI-1")
    pub name: String,
    /// CRTC bound to the output, `None` when inactive or disconnected
    pub crtc: Option<CrtcHandle>,
}

/// Find the CRTC of the output named exactly `name`
///
/// Matching is byte-exact and case-sensitive: "edp-1" does not resolve to
/// "eDP-1".
pub fn resolve_crtc(outputs: &[OutputDescriptor], name: &str) -> Result<CrtcHandle> {
    let output = outputs
        .iter()
        .find(|output| output.name == name)
        .ok_or_else(|| AppError::OutputNotFound(name.to_string()))?;

    output
        .crtc
        .ok_or_else(|| AppError::OutputInactive(name.to_string()))
}
