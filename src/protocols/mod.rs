// SPDX-License-Identifier: GPL-3.0-only
//! Display server gamma control
//!
//! The run sequence only talks to the display server through
//! [`GammaControl`]. Connecting is the backend's constructor and
//! disconnecting is its `Drop`.

pub mod randr;

use anyhow::Result;

use crate::gamma::GammaRamp;
use crate::output::{CrtcHandle, OutputDescriptor};

/// Common trait for display servers that expose per-CRTC gamma tables
pub trait GammaControl: std::fmt::Debug {
    /// List every output the server reports, in server order
    fn outputs(&mut self) -> Result<Vec<OutputDescriptor>>;

    /// Number of entries in the CRTC's gamma table (0 if unsupported)
    fn ramp_capacity(&mut self, crtc: CrtcHandle) -> Result<usize>;

    /// Upload a full gamma table to the CRTC
    fn set_gamma_ramp(&mut self, crtc: CrtcHandle, ramp: &GammaRamp) -> Result<()>;
}
