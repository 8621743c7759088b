// SPDX-License-Identifier: GPL-3.0-only
//! The brightness run sequence
//!
//! normalize → connect → list outputs → resolve CRTC → query gamma size →
//! build ramp → upload → disconnect → report. Any failure ends the run and
//! nothing is uploaded unless the whole ramp was built.

use std::io::Write;

use crate::brightness::{BrightnessCalculator, parse_lenient};
use crate::cli::Args;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::gamma::GammaRamp;
use crate::output::resolve_crtc;
use crate::protocols::GammaControl;

/// Run one invocation and return the brightness that was applied
///
/// Notices and the confirmation line go to `out`. `connect` is only called
/// once the request has been normalized.
pub fn run<C, F, W>(args: &Args, config: &Config, connect: F, out: &mut W) -> Result<f64>
where
    C: GammaControl,
    F: FnOnce() -> anyhow::Result<C>,
    W: Write,
{
    let requested = parse_lenient(&args.brightness);
    let normalized = BrightnessCalculator::new(config).normalize(requested, &args.output);
    for notice in &normalized.notices {
        writeln!(out, "{notice}")?;
    }
    info!(
        output = %args.output,
        requested,
        applied = normalized.value,
        "normalized brightness request"
    );

    {
        let mut control = connect().map_err(|source| AppError::DisplayConnect { source })?;
        debug!(?control, "connected");
        apply(&mut control, &args.output, normalized.value)?;
    }

    writeln!(
        out,
        "Brightness for {} set to {:.2}",
        args.output, normalized.value
    )?;
    Ok(normalized.value)
}

/// Resolve `output` and upload a linear ramp scaled by `brightness`
pub fn apply<C>(control: &mut C, output: &str, brightness: f64) -> Result<()>
where
    C: GammaControl + ?Sized,
{
    let outputs = control.outputs().map_err(AppError::display)?;
    debug!("display server reports {} output(s)", outputs.len());

    let crtc = resolve_crtc(&outputs, output)?;
    debug!(output = %output, crtc, "resolved output");

    let size = control.ramp_capacity(crtc).map_err(AppError::display)?;
    let ramp = GammaRamp::linear(size, brightness).ok_or_else(|| AppError::GammaUnsupported {
        output: output.to_string(),
        size,
    })?;
    debug!(crtc, entries = ramp.len(), top = ?ramp.entries().last(), "built gamma ramp");

    control
        .set_gamma_ramp(crtc, &ramp)
        .map_err(AppError::display)?;
    info!(output = %output, crtc, brightness, "gamma ramp uploaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::OutputConfig;
    use crate::output::{CrtcHandle, OutputDescriptor};

    #[derive(Debug, Default)]
    struct Calls {
        queried: Vec<CrtcHandle>,
        uploads: Vec<(CrtcHandle, GammaRamp)>,
    }

    #[derive(Debug, Default)]
    struct FakeGammaControl {
        outputs: Vec<OutputDescriptor>,
        capacity: usize,
        fail_upload: bool,
        calls: Rc<RefCell<Calls>>,
    }

    impl FakeGammaControl {
        fn new(capacity: usize) -> Self {
            Self {
                outputs: vec![
                    OutputDescriptor {
                        name: "eDP-1".to_string(),
                        crtc: Some(63),
                    },
                    OutputDescriptor {
                        name: "HDMI-1".to_string(),
                        crtc: None,
                    },
                ],
                capacity,
                ..Self::default()
            }
        }
    }

    impl GammaControl for FakeGammaControl {
        fn outputs(&mut self) -> anyhow::Result<Vec<OutputDescriptor>> {
            Ok(self.outputs.clone())
        }

        fn ramp_capacity(&mut self, crtc: CrtcHandle) -> anyhow::Result<usize> {
            self.calls.borrow_mut().queried.push(crtc);
            Ok(self.capacity)
        }

        fn set_gamma_ramp(&mut self, crtc: CrtcHandle, ramp: &GammaRamp) -> anyhow::Result<()> {
            if self.fail_upload {
                anyhow::bail!("BadMatch");
            }
            self.calls.borrow_mut().uploads.push((crtc, ramp.clone()));
            Ok(())
        }
    }

    fn args(output: &str, brightness: &str) -> Args {
        Args {
            output: output.to_string(),
            brightness: brightness.to_string(),
            verbose: 0,
        }
    }

    /// Run against a fake backend, returning the outcome, stdout text and
    /// the calls the backend received
    fn run_fake(
        args: &Args,
        config: &Config,
        fake: FakeGammaControl,
    ) -> (Result<f64>, String, Calls) {
        let calls = Rc::clone(&fake.calls);
        let mut out = Vec::new();
        let result = run(args, config, move || Ok(fake), &mut out);
        let calls = calls.take();
        (result, String::from_utf8(out).unwrap(), calls)
    }

    #[test]
    fn test_end_to_end_success() {
        let config = Config::default();
        let (result, stdout, calls) =
            run_fake(&args("eDP-1", "0.75"), &config, FakeGammaControl::new(256));

        assert_eq!(result.unwrap(), 0.75);
        assert_eq!(stdout, "Brightness for eDP-1 set to 0.75\n");
        assert_eq!(calls.queried, vec![63]);
        assert_eq!(calls.uploads.len(), 1);

        let (crtc, ramp) = &calls.uploads[0];
        assert_eq!(*crtc, 63);
        assert_eq!(ramp.len(), 256);
        assert_eq!(ramp.entries().last(), Some((49151, 49151, 49151)));
    }

    #[test]
    fn test_missing_output_uploads_nothing() {
        let config = Config::default();
        let (result, stdout, calls) =
            run_fake(&args("HDMI-9", "0.5"), &config, FakeGammaControl::new(256));

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::OutputNotFound(_)));
        assert!(err.to_string().contains("HDMI-9"));
        assert!(stdout.is_empty());
        assert!(calls.queried.is_empty());
        assert!(calls.uploads.is_empty());
    }

    #[test]
    fn test_case_mismatch_is_not_found() {
        let config = Config::default();
        let (result, _, calls) =
            run_fake(&args("edp-1", "0.5"), &config, FakeGammaControl::new(256));

        assert!(matches!(result, Err(AppError::OutputNotFound(_))));
        assert!(calls.uploads.is_empty());
    }

    #[test]
    fn test_inactive_output() {
        let config = Config::default();
        let (result, _, calls) =
            run_fake(&args("HDMI-1", "0.5"), &config, FakeGammaControl::new(256));

        assert!(matches!(result, Err(AppError::OutputInactive(_))));
        assert!(calls.queried.is_empty());
        assert!(calls.uploads.is_empty());
    }

    #[test]
    fn test_gamma_unsupported_sizes() {
        let config = Config::default();
        for capacity in [0, 1] {
            let (result, _, calls) =
                run_fake(&args("eDP-1", "0.5"), &config, FakeGammaControl::new(capacity));

            match result {
                Err(AppError::GammaUnsupported { output, size }) => {
                    assert_eq!(output, "eDP-1");
                    assert_eq!(size, capacity);
                }
                other => panic!("expected GammaUnsupported, got {other:?}"),
            }
            assert!(calls.uploads.is_empty());
        }
    }

    #[test]
    fn test_coerced_values_reported() {
        let config = Config::default();

        let (result, stdout, calls) =
            run_fake(&args("eDP-1", "0"), &config, FakeGammaControl::new(256));
        assert_eq!(result.unwrap(), 0.5);
        assert_eq!(
            stdout,
            "Brightness cannot be zero or negative, defaulting to 0.50\n\
             Brightness for eDP-1 set to 0.50\n"
        );
        assert_eq!(calls.uploads[0].1.red()[255], 32767);

        let (result, stdout, calls) =
            run_fake(&args("eDP-1", "2"), &config, FakeGammaControl::new(256));
        assert_eq!(result.unwrap(), 1.0);
        assert!(stdout.ends_with("Brightness for eDP-1 set to 1.00\n"));
        assert_eq!(calls.uploads[0].1.red()[255], 65535);

        let (result, _, _) = run_fake(&args("eDP-1", "-0.4"), &config, FakeGammaControl::new(256));
        assert_eq!(result.unwrap(), 0.5);

        let (result, _, _) = run_fake(&args("eDP-1", "dim"), &config, FakeGammaControl::new(256));
        assert_eq!(result.unwrap(), 0.5);
    }

    #[test]
    fn test_infinity_capped_to_full_brightness() {
        let config = Config::default();
        let (result, stdout, calls) =
            run_fake(&args("eDP-1", "inf"), &config, FakeGammaControl::new(256));

        assert_eq!(result.unwrap(), 1.0);
        assert_eq!(
            stdout,
            "Brightness cannot exceed 1, defaulting to 1\n\
             Brightness for eDP-1 set to 1.00\n"
        );
        assert_eq!(calls.uploads[0].1.red()[255], 65535);
    }

    #[test]
    fn test_hex_brightness_accepted() {
        let config = Config::default();
        let (result, stdout, _) =
            run_fake(&args("eDP-1", "0x.C"), &config, FakeGammaControl::new(256));

        assert_eq!(result.unwrap(), 0.75);
        assert_eq!(stdout, "Brightness for eDP-1 set to 0.75\n");
    }

    #[test]
    fn test_configured_minimum_applied() {
        let mut config = Config::default();
        config
            .outputs
            .insert("eDP-1".to_string(), OutputConfig { min_brightness: 0.25 });

        let (result, stdout, calls) =
            run_fake(&args("eDP-1", "0.1"), &config, FakeGammaControl::new(256));
        assert_eq!(result.unwrap(), 0.25);
        assert!(stdout.ends_with("Brightness for eDP-1 set to 0.25\n"));
        assert_eq!(calls.uploads[0].1.red()[255], 16383);
    }

    #[test]
    fn test_upload_failure_is_display_error() {
        let config = Config::default();
        let mut fake = FakeGammaControl::new(256);
        fake.fail_upload = true;

        let (result, stdout, _) = run_fake(&args("eDP-1", "0.5"), &config, fake);
        assert!(matches!(result, Err(AppError::Display { .. })));
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_connect_failure() {
        let config = Config::default();
        let mut out = Vec::new();
        let result = run(
            &args("eDP-1", "0.5"),
            &config,
            || -> anyhow::Result<FakeGammaControl> { anyhow::bail!("no DISPLAY") },
            &mut out,
        );

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::DisplayConnect { .. }));
        assert_eq!(err.to_string(), "Cannot open display: no DISPLAY");
    }
}
