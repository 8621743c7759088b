// SPDX-License-Identifier: GPL-3.0-only
//! Gamma ramp tables
//!
//! A ramp maps an input intensity index to the drive value the CRTC emits.
//! xbr only ever builds neutral ramps: the identity ramp scaled by the
//! brightness factor, identical on all three channels.

/// Largest value a gamma table entry can hold
pub const MAX_GAMMA_VALUE: u16 = u16::MAX;

/// Per-channel gamma table, laid out the way RandR expects it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaRamp {
    red: Vec<u16>,
    green: Vec<u16>,
    blue: Vec<u16>,
}

impl GammaRamp {
    /// Build the identity ramp of `size` entries scaled by `brightness`
    ///
    /// Entry `i` is `floor((i * 65535 / (size - 1)) * brightness)`, where the
    /// inner division is integral. Returns `None` when `size <= 1` since no
    /// ramp can span the full range with fewer than two entries.
    pub fn linear(size: usize, brightness: f64) -> Option<Self> {
        if size <= 1 {
            return None;
        }

        let last = (size - 1) as u64;
        let channel: Vec<u16> = (0..size as u64)
            .map(|i| {
                let identity = i * u64::from(MAX_GAMMA_VALUE) / last;
                let scaled = (identity as f64 * brightness).floor();
                scaled.clamp(0.0, f64::from(MAX_GAMMA_VALUE)) as u16
            })
            .collect();

        Some(Self {
            red: channel.clone(),
            green: channel.clone(),
            blue: channel,
        })
    }

    pub fn len(&self) -> usize {
        self.red.len()
    }

    pub fn red(&self) -> &[u16] {
        &self.red
    }

    pub fn green(&self) -> &[u16] {
        &self.green
    }

    pub fn blue(&self) -> &[u16] {
        &self.blue
    }

    /// Iterate over `(red, green, blue)` triples in index order
    pub fn entries(&self) -> impl Iterator<Item = (u16, u16, u16)> + '_ {
        self.red
            .iter()
            .zip(&self.green)
            .zip(&self.blue)
            .map(|((&r, &g), &b)| (r, g, b))
    }
}
