// SPDX-License-Identifier: GPL-3.0-only
//! X11 RandR gamma control
//!
//! Talks to the X server named by `DISPLAY` through `x11rb`. Gamma requests
//! need RandR 1.2. Screen resources come from `GetScreenResourcesCurrent` on
//! 1.3 servers and from `GetScreenResources` on 1.2 servers.

use anyhow::{Context, Result, bail};
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as RandrConnectionExt;
use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

use super::GammaControl;
use crate::gamma::GammaRamp;
use crate::output::{CrtcHandle, OutputDescriptor};

const RANDR_MAJOR: u32 = 1;
/// Version we ask the server for
const RANDR_MINOR: u32 = 3;
/// Oldest version with CRTC gamma requests
const RANDR_MIN_MINOR: u32 = 2;

fn supports_gamma(major: u32, minor: u32) -> bool {
    (major, minor) >= (RANDR_MAJOR, RANDR_MIN_MINOR)
}

fn supports_current_resources(major: u32, minor: u32) -> bool {
    (major, minor) >= (RANDR_MAJOR, RANDR_MINOR)
}

/// RandR connection bound to the default screen's root window
pub struct RandrGammaControl {
    conn: RustConnection,
    root: Window,
    screen: usize,
    current_resources: bool,
}

impl RandrGammaControl {
    /// Open the display and check the RandR version
    pub fn connect() -> Result<Self> {
        let (conn, screen) =
            RustConnection::connect(None).context("failed to connect to the X server")?;
        let root = conn
            .setup()
            .roots
            .get(screen)
            .with_context(|| format!("X server has no screen {screen}"))?
            .root;

        let version = conn
            .randr_query_version(RANDR_MAJOR, RANDR_MINOR)
            .context("RandR extension is not available")?
            .reply()
            .context("failed to query RandR version")?;
        let (major, minor) = (version.major_version, version.minor_version);
        if !supports_gamma(major, minor) {
            bail!("RandR {major}.{minor} is too old, {RANDR_MAJOR}.{RANDR_MIN_MINOR} required");
        }
        let current_resources = supports_current_resources(major, minor);

        debug!(
            screen,
            root,
            current_resources,
            "connected to X server with RandR {major}.{minor}"
        );
        Ok(Self {
            conn,
            root,
            screen,
            current_resources,
        })
    }
}

impl GammaControl for RandrGammaControl {
    fn outputs(&mut self) -> Result<Vec<OutputDescriptor>> {
        let (outputs, config_timestamp) = if self.current_resources {
            let reply = self
                .conn
                .randr_get_screen_resources_current(self.root)?
                .reply()
                .context("failed to get screen resources")?;
            (reply.outputs, reply.config_timestamp)
        } else {
            let reply = self
                .conn
                .randr_get_screen_resources(self.root)?
                .reply()
                .context("failed to get screen resources")?;
            (reply.outputs, reply.config_timestamp)
        };

        let mut list = Vec::with_capacity(outputs.len());
        for output in outputs {
            let info = self
                .conn
                .randr_get_output_info(output, config_timestamp)?
                .reply()
                .with_context(|| format!("failed to get info for output {output}"))?;
            let name = String::from_utf8_lossy(&info.name).into_owned();
            let crtc = (info.crtc != x11rb::NONE).then_some(info.crtc);

            trace!(output, name = %name, ?crtc, "found output");
            list.push(OutputDescriptor { name, crtc });
        }

        Ok(list)
    }

    fn ramp_capacity(&mut self, crtc: CrtcHandle) -> Result<usize> {
        let reply = self
            .conn
            .randr_get_crtc_gamma_size(crtc)?
            .reply()
            .with_context(|| format!("failed to get gamma size of CRTC {crtc}"))?;
        Ok(usize::from(reply.size))
    }

    fn set_gamma_ramp(&mut self, crtc: CrtcHandle, ramp: &GammaRamp) -> Result<()> {
        self.conn
            .randr_set_crtc_gamma(crtc, ramp.red(), ramp.green(), ramp.blue())?
            .check()
            .with_context(|| format!("failed to set gamma of CRTC {crtc}"))?;
        Ok(())
    }
}

impl std::fmt::Debug for RandrGammaControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RandrGammaControl(screen: {}, root: {:#x})",
            self.screen, self.root
        )
    }
}
