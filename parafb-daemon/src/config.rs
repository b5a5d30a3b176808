//! Configuration loading
//!
//! Settings come from an optional TOML file, then command-line overrides
//! are applied on top. The result is normalized once and never changes
//! while the daemon runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parafb_core::config::MirrorConfig;
use thiserror::Error;
use tracing::{info, warn};

/// Where the daemon looks when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/parafb.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// File exists but could not be read
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File is not valid TOML or has a wrongly typed value
    #[error("malformed config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parse configuration text; unknown keys are ignored
pub fn parse_config(text: &str) -> Result<MirrorConfig, toml::de::Error> {
    toml::from_str::<MirrorConfig>(text).map(MirrorConfig::normalized)
}

/// Load a configuration file
///
/// A missing file is not an error: the defaults are used and a warning is
/// logged. A file that exists but does not parse is fatal.
pub fn load_config(path: &Path) -> Result<MirrorConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Config {} not found, using defaults", path.display());
            return Ok(MirrorConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_config(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Log the resolved configuration
pub fn log_config_summary(config: &MirrorConfig) {
    let (width, height) = config.panel_dimensions();
    info!("Configuration:");
    info!("  rotation    = {} ({}x{})", config.rotation.degrees(), width, height);
    info!("  fps         = {}", config.fps);
    info!("  fb_device   = {}", config.fb_device);
    info!("  mode        = {:?}", config.mode);
    info!(
        "  bus         = {}-bit, WR={} DC={} RST={} data={:?}",
        config.bus.width.lines(),
        config.bus.write,
        config.bus.data_command,
        config.bus.reset,
        config.bus.data.as_slice()
    );
    if config.touch.enabled {
        info!(
            "  touch       = {} @ {} Hz, poll {} ms",
            config.touch.spi_device, config.touch.spi_speed_hz, config.touch.poll_interval_ms
        );
        info!(
            "  calibration = raw {}..{}, swap_xy={}, invert_x={}, invert_y={}",
            config.touch.raw_min,
            config.touch.raw_max,
            config.touch.swap_xy,
            config.touch.invert_x,
            config.touch.invert_y
        );
    } else {
        info!("  touch       = disabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parafb_core::config::{Rotation, RunMode};
    use parafb_hal::BusWidth;

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
            rotation = 90
            fps = 25
            fb_device = "/dev/fb1"
            mode = "test-pattern"

            [touch]
            enabled = true
            spi_device = "/dev/spidev0.0"
            spi_speed_hz = 1000000
            swap_xy = true
            raw_min = 150
            raw_max = 3950

            [timing]
            reset_settle_ms = 150
            "#,
        )
        .unwrap();

        assert_eq!(config.rotation, Rotation::Deg90);
        assert_eq!(config.fps, 25);
        assert_eq!(config.fb_device.as_str(), "/dev/fb1");
        assert_eq!(config.mode, RunMode::TestPattern);
        assert!(config.touch.enabled);
        assert_eq!(config.touch.spi_device.as_str(), "/dev/spidev0.0");
        assert_eq!(config.touch.spi_speed_hz, 1_000_000);
        assert!(config.touch.swap_xy);
        assert!(!config.touch.invert_x);
        assert_eq!(config.touch.raw_min, 150);
        assert_eq!(config.touch.poll_interval_ms, 10);
        assert_eq!(config.timing.reset_settle_ms, 150);
        assert_eq!(config.timing.reset_assert_ms, 20);
    }

    #[test]
    fn test_bus_section() {
        let config = parse_config(
            r#"
            [bus]
            width = 16
            write = 26
            data = [0, 1, 2, 3, 4, 5, 6, 7, 12, 13, 14, 15, 16, 19, 20, 21]
            "#,
        )
        .unwrap();
        assert_eq!(config.bus.width, BusWidth::Bits16);
        assert_eq!(config.bus.write, 26);
        assert_eq!(config.bus.reset, 25);
        assert_eq!(config.bus.data.len(), 16);

        assert!(parse_config("[bus]\nwidth = 9\n").is_err());
        assert!(parse_config("[bus]\ndata = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]\n").is_err());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), MirrorConfig::default());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = parse_config("brightness = 80\nfps = 20\n[extra]\nfoo = 1\n").unwrap();
        assert_eq!(config.fps, 20);
    }

    #[test]
    fn test_out_of_range_values_normalized() {
        let config = parse_config("rotation = 45\nfps = 500\n").unwrap();
        assert_eq!(config.rotation, Rotation::Deg270);
        assert_eq!(config.fps, 60);

        let config = parse_config("fps = 0\n").unwrap();
        assert_eq!(config.fps, 1);
    }

    #[test]
    fn test_malformed_is_error() {
        assert!(parse_config("fps = \"fast\"\n").is_err());
        assert!(parse_config("rotation = [\n").is_err());
    }

    #[test]
    fn test_shipped_file_matches_defaults() {
        let config = parse_config(include_str!("../parafb.toml")).unwrap();
        assert_eq!(config, MirrorConfig::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config(Path::new("/nonexistent/parafb.toml")).unwrap();
        assert_eq!(config, MirrorConfig::default());
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let path = std::env::temp_dir().join(format!("parafb-bad-{}.toml", std::process::id()));
        fs::write(&path, "fps = {").unwrap();
        let result = load_config(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
