//! A decoded log paired with its lap sidecar
//!
//! ```rust,no_run
//! use ldx::Session;
//!
//! fn lap_speeds() -> ldx::Result<()> {
//!     let session = Session::open("Spa-bmw_m4_gt3-5.ldx")?;
//!     for lap in session.sidecar().laps() {
//!         let speed = session.lap_channel(lap, "SPEED")?;
//!         let distance = session.lap_distance(lap, "SPEED")?;
//!         let lap_length = distance.last().copied().unwrap_or(0.0);
//!         println!("lap {}: {} samples, {:.0} m", lap, speed.len(), lap_length);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::DecoderConfig;
use crate::decoder::LogDecoder;
use crate::laps::{self, LapWindow};
use crate::log_file::LogFile;
use crate::sidecar::{Sidecar, parse_ldx};
use crate::types::Channel;
use crate::{LdError, Result};

/// Telemetry session: the binary log plus lap boundaries and totals.
#[derive(Debug, Clone)]
pub struct Session {
    log: LogFile,
    sidecar: Sidecar,
}

impl Session {
    pub fn from_parts(log: LogFile, sidecar: Sidecar) -> Self {
        Self { log, sidecar }
    }

    /// Decode an in-memory log and sidecar document.
    pub fn from_bytes(ld: Vec<u8>, ldx: &str, config: &DecoderConfig) -> Result<Self> {
        let sidecar = parse_ldx(ldx)?;
        let log = LogDecoder::new(config.clone()).decode_shared(ld.into())?;
        Ok(Self { log, sidecar })
    }

    /// Load an `.ldx` sidecar and the `.ld` log next to it.
    pub fn open<P: AsRef<Path>>(ldx_path: P) -> Result<Self> {
        Self::open_with(ldx_path, &DecoderConfig::default())
    }

    pub fn open_with<P: AsRef<Path>>(ldx_path: P, config: &DecoderConfig) -> Result<Self> {
        let ldx_path = ldx_path.as_ref();
        let ld_path = log_path_for(ldx_path)?;
        info!("Loading session {}", ldx_path.display());

        let ldx = std::fs::read_to_string(ldx_path)
            .map_err(|e| LdError::file_error(ldx_path.to_path_buf(), e))?;
        let ld = std::fs::read(&ld_path).map_err(|e| LdError::file_error(ld_path.clone(), e))?;
        debug!("Read {} sidecar bytes and {} log bytes", ldx.len(), ld.len());

        Self::from_bytes(ld, &ldx, config)
    }

    pub fn log(&self) -> &LogFile {
        &self.log
    }

    pub fn sidecar(&self) -> &Sidecar {
        &self.sidecar
    }

    pub fn lap_window(&self, lap: usize) -> Result<LapWindow> {
        laps::lap_window(lap, &self.sidecar)
    }

    fn channel(&self, name: &str) -> Result<&Channel> {
        self.log.channel(name).ok_or_else(|| LdError::ChannelNotFound { name: name.to_string() })
    }

    /// Physical samples of `name` during `lap`; empty for metadata-only channels.
    pub fn lap_channel(&self, lap: usize, name: &str) -> Result<&[f64]> {
        let channel = self.channel(name)?;
        let samples = self.log.samples(channel)?.unwrap_or(&[]);
        laps::slice_for_lap(samples, channel.rec_freq, lap, &self.sidecar)
    }

    /// Cumulative distance over `lap`, integrated from the velocity channel `speed_name`.
    pub fn lap_distance(&self, lap: usize, speed_name: &str) -> Result<Vec<f64>> {
        let channel = self.channel(speed_name)?;
        let samples = self.log.samples(channel)?.unwrap_or(&[]);
        laps::generate_distance(lap, &self.sidecar, samples, channel.rec_freq).map_err(|err| {
            match err {
                LdError::InvalidChannel { reason, .. } => {
                    LdError::InvalidChannel { channel: channel.name.clone(), reason }
                }
                other => other,
            }
        })
    }
}

/// Path of the binary log belonging to an `.ldx` sidecar: the sidecar's file
/// name without its trailing `x`, so `Foo.LDX` pairs with `Foo.LD`.
pub fn log_path_for(ldx_path: &Path) -> Result<PathBuf> {
    let log_name = ldx_path
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| name.len() > 4 && name.to_ascii_lowercase().ends_with(".ldx"))
        .map(|name| &name[..name.len() - 1]);
    match log_name {
        Some(name) => Ok(ldx_path.with_file_name(name)),
        None => Err(LdError::sidecar(
            "session loading",
            format!("{} is not an .ldx sidecar", ldx_path.display()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ChannelSpec, LdBuilder, SampleData};
    use anyhow::{Result, ensure};

    const LDX: &str = r#"<LDXFile><Layers><Layer><MarkerBlock><MarkerGroup>
        <Marker Time="0"/><Marker Time="1000000"/><Marker Time="2500000"/>
        </MarkerGroup></MarkerBlock></Layer>
        <Details><String Id="Total Laps" Value="2"/><String Id="Fastest Lap" Value="1"/></Details>
        </Layers></LDXFile>"#;

    fn session(config: &DecoderConfig) -> crate::Result<Session> {
        let ld = LdBuilder::new()
            .channel(ChannelSpec::new("SPEED", "m/s", 10, SampleData::Int16(vec![20; 30])))
            .channel(ChannelSpec::new("GEAR", "", 2, SampleData::Int32(vec![1, 2, 3, 4, 5, 6])))
            .channel(ChannelSpec::new("MARKER", "", 1, SampleData::None))
            .build();
        Session::from_bytes(ld, LDX, config)
    }

    #[test]
    fn lap_channels_use_their_own_frequency() -> Result<()> {
        let session = session(&DecoderConfig::default())?;
        assert_eq!(session.lap_channel(1, "SPEED")?.len(), 10);
        assert_eq!(session.lap_channel(2, "SPEED")?.len(), 15);
        assert_eq!(session.lap_channel(1, "GEAR")?, &[1.0, 2.0]);
        assert_eq!(session.lap_channel(2, "GEAR")?, &[3.0, 4.0, 5.0]);
        assert!(session.lap_channel(1, "MARKER")?.is_empty());
        Ok(())
    }

    #[test]
    fn lap_distance_integrates_the_speed_channel() -> Result<()> {
        let session = session(&DecoderConfig { eager_samples: false, ..Default::default() })?;
        let distance = session.lap_distance(2, "SPEED")?;
        assert_eq!(distance.len(), 15);
        assert_eq!(distance[0], 0.0);
        ensure!((distance[14] - 28.0).abs() < 1e-9, "distance was {}", distance[14]);
        Ok(())
    }

    #[test]
    fn lookup_errors_do_not_poison_the_session() -> Result<()> {
        let session = session(&DecoderConfig::default())?;
        assert!(matches!(session.lap_channel(1, "RPM"), Err(LdError::ChannelNotFound { .. })));
        assert!(matches!(session.lap_channel(3, "SPEED"), Err(LdError::LapOutOfRange { .. })));
        assert!(session.lap_distance(1, "MARKER")?.is_empty());
        assert_eq!(session.lap_channel(1, "SPEED")?.len(), 10);
        Ok(())
    }

    #[test]
    fn log_path_drops_trailing_x() {
        let log_path = |path: &str| log_path_for(Path::new(path)).ok();
        assert_eq!(log_path("data/Spa-5.ldx"), Some(PathBuf::from("data/Spa-5.ld")));
        assert_eq!(log_path("data/Spa-5.LDX"), Some(PathBuf::from("data/Spa-5.LD")));
        assert_eq!(log_path("Monza.Ldx"), Some(PathBuf::from("Monza.Ld")));
        assert_eq!(log_path("data/Spa-5.ld"), None);
        assert_eq!(log_path(".ldx"), None);
    }
}
