// SPDX-License-Identifier: GPL-3.0-only
//! xbr: set the brightness of an X11 output through its gamma ramp
//!
//! Usage: `xbr <OUTPUT> <BRIGHTNESS>`

use std::io;
use std::process::ExitCode;

use crate::cli::Invocation;
use crate::config::Config;
use crate::protocols::randr::RandrGammaControl;

#[macro_use]
extern crate tracing;

mod app;
mod brightness;
mod cli;
mod config;
mod error;
mod gamma;
mod output;
mod protocols;

/// Logs go to stderr; stdout carries the user-facing notices
fn setup_logs(default_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer().with_target(false).with_writer(io::stderr);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(format!(
        "warn,{}={}",
        env!("CARGO_CRATE_NAME"),
        default_level
    )));

    if let Ok(journal_layer) = tracing_journald::layer() {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .with(journal_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> ExitCode {
    let args = match cli::parse(std::env::args_os()) {
        Ok(Invocation::Run(args)) => args,
        Ok(Invocation::Info(text)) => {
            print!("{text}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    setup_logs(args.log_level());
    let config = Config::load();

    match app::run(&args, &config, RandrGammaControl::connect, &mut io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "run failed");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
