// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::{FullscreenMode, WindowConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "viewport")]
#[command(about = "Platform window demo", long_about = None)]
pub struct Cli {
    /// Path to a JSON window configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Requested effective width (0 with --height 0 for desktop resolution)
    #[arg(long)]
    pub width: Option<u32>,

    /// Requested effective height
    #[arg(long)]
    pub height: Option<u32>,

    /// Display index to open on
    #[arg(long)]
    pub display: Option<i32>,

    /// Start in native fullscreen
    #[arg(long, default_value = "false")]
    pub fullscreen: bool,

    /// Start in borderless desktop fullscreen
    #[arg(long, default_value = "false")]
    pub borderless: bool,

    /// Disable vertical sync
    #[arg(long = "no-vsync", default_value = "false")]
    pub no_vsync: bool,

    /// Probe the ES context profile first
    #[arg(long, default_value = "false")]
    pub gles: bool,
}

impl Cli {
    /// Layer command-line overrides onto a loaded configuration
    pub fn apply(&self, config: &mut WindowConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(display) = self.display {
            config.display_index = display;
        }
        if self.fullscreen {
            config.fullscreen = FullscreenMode::Exclusive;
        }
        if self.borderless {
            config.fullscreen = FullscreenMode::Borderless;
        }
        if self.no_vsync {
            config.vsync = false;
        }
        if self.gles {
            config.prefer_gles = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_layer_onto_config() {
        let cli = Cli::parse_from(["viewport", "--width", "640", "--height", "480", "--no-vsync"]);
        let mut config = WindowConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert!(!config.vsync);
        // Untouched flags keep their defaults
        assert_eq!(config.fullscreen, FullscreenMode::Windowed);
    }

    #[test]
    fn test_borderless_wins_over_fullscreen() {
        let cli = Cli::parse_from(["viewport", "--fullscreen", "--borderless"]);
        let mut config = WindowConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.fullscreen, FullscreenMode::Borderless);
    }
}
