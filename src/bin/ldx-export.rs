//! LDX session exporter
//!
//! Decodes an LD log through its LDX sidecar and writes:
//! - `data.json`: header, event tree, beacons, summary and every channel
//! - `channels/<name>.txt`: full samples of every channel
//! - `lap-<n>-<channel>.txt`: per-lap samples of the configured channels

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use ldx::export::{self, SessionExport};
use ldx::{ExportConfig, Session};

const JSON_FILE: &str = "data.json";
const CHANNELS_DIR: &str = "channels";

/// Export an LD telemetry session to JSON and text files
#[derive(Parser, Debug)]
#[command(name = "ldx-export")]
#[command(about = "Export LD telemetry logs with their LDX lap sidecar", long_about = None)]
#[command(version)]
struct Args {
    /// LDX sidecar; the LD log is expected next to it
    #[arg(value_name = "FILE.ldx")]
    ldx: PathBuf,

    /// Output directory; files of a previous export in it are replaced
    #[arg(short, long, value_name = "DIR", default_value = "export")]
    output: PathBuf,

    /// YAML export configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Channel written per lap (can be repeated, replaces the configured list)
    #[arg(long = "channel", value_name = "NAME")]
    channels: Vec<String>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if !args.channels.is_empty() {
        config.channels = args.channels.clone();
    }

    let session = Session::open_with(&args.ldx, &config.decoder)
        .with_context(|| format!("Failed to load session {}", args.ldx.display()))?;
    info!(
        "Session: {} channels, {} laps, fastest lap {} ({})",
        session.log().channels().len(),
        session.sidecar().total_laps(),
        session.sidecar().summary().fastest_lap,
        session.sidecar().summary().fastest_time
    );

    prepare_output(&args.output)?;
    write_json(&session, &args.output)?;
    write_channels(&session, &args.output, &config)?;
    write_laps(&session, &args.output, &config)?;

    info!("Export written to {}", args.output.display());
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    let Some(path) = path else {
        return Ok(ExportConfig::default());
    };
    let yaml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = ExportConfig::from_yaml_str(&yaml)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    debug!("Loaded config from {}: {:?}", path.display(), config);
    Ok(config)
}

/// Creates `dir`, or clears the files a previous export left in it. Any other
/// non-empty directory is refused.
fn prepare_output(dir: &Path) -> Result<()> {
    if dir.exists() {
        let mut entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read output directory {}", dir.display()))?;
        if entries.next().is_some() && !dir.join(JSON_FILE).is_file() {
            bail!(
                "Refusing to write into {}: directory is not empty and holds no previous export",
                dir.display()
            );
        }
        clear_previous_export(dir)?;
    }
    fs::create_dir_all(dir.join(CHANNELS_DIR))
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    Ok(())
}

/// Removes only files named like the ones this tool writes.
fn clear_previous_export(dir: &Path) -> Result<()> {
    let channels = dir.join(CHANNELS_DIR);
    let mut stale = exported_files(dir, |name| {
        name == JSON_FILE || (name.starts_with("lap-") && name.ends_with(".txt"))
    })?;
    if channels.is_dir() {
        stale.extend(exported_files(&channels, |name| name.ends_with(".txt"))?);
    }
    for path in stale {
        debug!("Removing {}", path.display());
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

fn exported_files(dir: &Path, is_export: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        if path.is_file() && is_export(name) {
            files.push(path);
        }
    }
    Ok(files)
}

fn write_json(session: &Session, dir: &Path) -> Result<()> {
    let json = SessionExport::from_session(session)
        .to_json_pretty()
        .context("Failed to serialize session")?;
    write_file(&dir.join(JSON_FILE), &json)
}

fn write_channels(session: &Session, dir: &Path, config: &ExportConfig) -> Result<()> {
    let log = session.log();
    for channel in log.channels() {
        let samples = match log.samples(channel) {
            Ok(Some(samples)) => samples,
            Ok(None) => {
                debug!("Channel '{}' has no samples", channel.name);
                continue;
            }
            Err(err) => {
                warn!("Skipping channel '{}': {}", channel.name, err);
                continue;
            }
        };
        let text = export::render_samples(samples, 1.0, &config.line_separator);
        let path = dir.join(CHANNELS_DIR).join(format!("{}.txt", file_stem(&channel.name)));
        write_file(&path, &text)?;
    }
    Ok(())
}

fn write_laps(session: &Session, dir: &Path, config: &ExportConfig) -> Result<()> {
    for lap in session.sidecar().laps() {
        for name in &config.channels {
            match export::render_lap_channel(session, lap, name, config) {
                Ok(text) => {
                    let path = dir.join(format!("lap-{}-{}.txt", lap, file_stem(name)));
                    write_file(&path, &text)?
                }
                Err(err) => warn!("Skipping lap {} channel '{}': {}", lap, name, err),
            }
        }
        if config.include_distance {
            match export::render_lap_distance(session, lap, config) {
                Ok(text) => write_file(&dir.join(format!("lap-{}-DISTANCE.txt", lap)), &text)?,
                Err(err) => warn!("Skipping lap {} distance: {}", lap, err),
            }
        }
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Channel names may contain path separators.
fn file_stem(name: &str) -> String {
    name.chars().map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> Result<PathBuf> {
        let dir = std::env::temp_dir().join(format!("ldx-export-{}-{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    #[test]
    fn refuses_directories_without_previous_export() -> Result<()> {
        let dir = scratch_dir("foreign")?;
        fs::write(dir.join("Monza-5.ldx"), "<LDXFile/>")?;

        assert!(prepare_output(&dir).is_err());
        assert!(dir.join("Monza-5.ldx").is_file());

        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn previous_export_is_replaced_and_other_files_kept() -> Result<()> {
        let dir = scratch_dir("previous")?;
        fs::create_dir_all(dir.join(CHANNELS_DIR))?;
        fs::write(dir.join(JSON_FILE), "{}")?;
        fs::write(dir.join("lap-1-SPEED.txt"), "1")?;
        fs::write(dir.join(CHANNELS_DIR).join("SPEED.txt"), "1")?;
        fs::write(dir.join("notes.md"), "keep")?;

        prepare_output(&dir)?;

        assert!(!dir.join(JSON_FILE).exists());
        assert!(!dir.join("lap-1-SPEED.txt").exists());
        assert!(!dir.join(CHANNELS_DIR).join("SPEED.txt").exists());
        assert!(dir.join(CHANNELS_DIR).is_dir());
        assert!(dir.join("notes.md").is_file());

        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn missing_and_empty_directories_are_created() -> Result<()> {
        let dir = scratch_dir("empty")?;
        prepare_output(&dir)?;
        assert!(dir.join(CHANNELS_DIR).is_dir());

        let nested = dir.join("nested");
        prepare_output(&nested)?;
        assert!(nested.join(CHANNELS_DIR).is_dir());

        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
