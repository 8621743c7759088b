// SPDX-License-Identifier: GPL-3.0-only
//! Optional configuration file
//!
//! Read from `$XDG_CONFIG_HOME/xbr/config.kdl`. The file is never written.
//!
//! ```kdl
//! fallback-brightness 0.5
//! output "eDP-1" {
//!     min-brightness 0.2
//! }
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use kdl::{KdlDocument, KdlNode, KdlValue};

use crate::brightness::{DEFAULT_FALLBACK_BRIGHTNESS, MAX_BRIGHTNESS};

pub const CONFIG_DIR: &str = "xbr";
pub const CONFIG_FILE: &str = "config.kdl";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Brightness used for zero, negative or unparseable requests, in (0, 1]
    pub fallback_brightness: f64,
    /// Per-output settings keyed by exact output name
    pub outputs: HashMap<String, OutputConfig>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OutputConfig {
    /// Floor applied after normalization, in [0, 1]
    pub min_brightness: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_brightness: DEFAULT_FALLBACK_BRIGHTNESS,
            outputs: HashMap::new(),
        }
    }
}

impl Config {
    pub fn min_brightness(&self, output: &str) -> f64 {
        self.outputs.get(output).map(|o| o.min_brightness).unwrap_or(0.0)
    }

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the configuration file, falling back to defaults
    ///
    /// A missing file is not an error. A file that cannot be read or parsed
    /// is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            debug!("no config directory, using defaults");
            return Self::default();
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config file at {}", path.display());
                return Self::default();
            }
            Err(err) => {
                error!("failed to read config {}: {}", path.display(), err);
                return Self::default();
            }
        };

        match Self::from_kdl(&text) {
            Ok(config) => {
                debug!(path = %path.display(), ?config, "loaded config");
                config
            }
            Err(err) => {
                error!("errors loading config {}: {:#}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Parse a KDL document; unknown nodes and out-of-range values are
    /// skipped with a warning
    pub fn from_kdl(text: &str) -> Result<Self> {
        let doc: KdlDocument = text.parse().context("invalid KDL")?;
        let mut config = Self::default();

        for node in doc.nodes() {
            match node.name().value() {
                "fallback-brightness" => match number_arg(node) {
                    Some(v) if v > 0.0 && v <= MAX_BRIGHTNESS => config.fallback_brightness = v,
                    other => warn!(
                        "ignoring fallback-brightness {:?}: expected a number in (0, 1]",
                        other
                    ),
                },
                "output" => {
                    let Some(name) = first_arg(node).and_then(KdlValue::as_string) else {
                        warn!("ignoring output node without a name");
                        continue;
                    };
                    let mut output = OutputConfig { min_brightness: 0.0 };
                    for child in node.children().map(|c| c.nodes()).unwrap_or_default() {
                        match child.name().value() {
                            "min-brightness" => match number_arg(child) {
                                Some(v) if (0.0..=MAX_BRIGHTNESS).contains(&v) => {
                                    output.min_brightness = v
                                }
                                other => warn!(
                                    "ignoring min-brightness {:?} for {}: expected a number in [0, 1]",
                                    other, name
                                ),
                            },
                            unknown => warn!("ignoring unknown setting {} for {}", unknown, name),
                        }
                    }
                    config.outputs.insert(name.to_string(), output);
                }
                unknown => warn!("ignoring unknown config node {}", unknown),
            }
        }

        Ok(config)
    }
}

fn first_arg(node: &KdlNode) -> Option<&KdlValue> {
    node.entries()
        .iter()
        .find(|entry| entry.name().is_none())
        .map(|entry| entry.value())
}

fn number_arg(node: &KdlNode) -> Option<f64> {
    let value = first_arg(node)?;
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}
