// SPDX-License-Identifier: GPL-3.0-only
//! Command line surface

use std::ffi::OsString;

use clap::Parser;
use clap::error::ErrorKind;

use crate::error::{AppError, Result};

const AFTER_HELP: &str = "\
Brightness outside (0, 1] is not an error: zero, negative or unparseable
values fall back to 0.5 (or the configured fallback-brightness) and values
of 1 or more are capped to 1. A notice is printed in both cases.

Output names are matched exactly; list them with `xrandr --query`.
Optional settings are read from $XDG_CONFIG_HOME/xbr/config.kdl.";

/// Set the brightness of an X11 output by scaling its gamma ramp
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "xbr", version, after_help = AFTER_HELP)]
pub struct Args {
    /// Output name, e.g. "eDP-1" or "HDMI-1"
    pub output: String,

    /// Brightness factor, greater than 0 and at most 1
    #[arg(allow_hyphen_values = true)]
    pub brightness: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Default log directive for the verbosity flag
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// What the command line asked for
#[derive(Debug)]
pub enum Invocation {
    Run(Args),
    /// `--help` or `--version`; print the text and exit successfully
    Info(String),
}

pub fn parse<I, T>(argv: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(argv) {
        Ok(args) => Ok(Invocation::Run(args)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                Ok(Invocation::Info(err.to_string()))
            }
            _ => Err(AppError::Usage(err.to_string().trim_end().to_string())),
        },
    }
}
