//! Command-line interface

use std::path::PathBuf;

use clap::Parser;
use parafb_core::config::{path, MirrorConfig, Rotation, RunMode};

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug, Clone)]
#[command(name = "parafb")]
#[command(about = "Mirror a Linux framebuffer onto an ILI9481 parallel-bus TFT", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Rotation: 0, 90, 180, 270 (anything else means 270)
    #[arg(long)]
    pub rotate: Option<u16>,

    /// Target FPS, clamped to 1..=60
    #[arg(long)]
    pub fps: Option<u32>,

    /// Source framebuffer to mirror
    #[arg(long)]
    pub fb: Option<String>,

    /// Enable touch support
    #[arg(long, conflicts_with = "no_touch")]
    pub touch: bool,

    /// Disable touch support
    #[arg(long)]
    pub no_touch: bool,

    /// Run FPS benchmark and exit
    #[arg(long, conflicts_with = "test_pattern")]
    pub benchmark: bool,

    /// Show solid colour fills and exit
    #[arg(long)]
    pub test_pattern: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long)]
    pub verbosity: Option<String>,
}

impl Cli {
    /// Apply command-line overrides on top of file settings
    pub fn apply(&self, mut config: MirrorConfig) -> MirrorConfig {
        if let Some(degrees) = self.rotate {
            config.rotation = Rotation::from_degrees(degrees);
        }
        if let Some(fps) = self.fps {
            config.fps = MirrorConfig::clamp_fps(fps);
        }
        if let Some(fb) = &self.fb {
            config.fb_device = path(fb);
        }
        if self.touch {
            config.touch.enabled = true;
        }
        if self.no_touch {
            config.touch.enabled = false;
        }
        if self.benchmark {
            config.mode = RunMode::Benchmark;
        } else if self.test_pattern {
            config.mode = RunMode::TestPattern;
        }
        config.normalized()
    }
}
