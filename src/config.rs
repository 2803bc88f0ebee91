use serde::{Deserialize, Serialize};

use crate::core::geometry::Size;

/// How the window occupies the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenMode {
    #[default]
    Windowed,
    /// Native fullscreen at the configured resolution
    Exclusive,
    /// Desktop-resolution borderless fullscreen
    Borderless,
}

/// Bounded queue sizing for the threaded render context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderQueueConfig {
    /// Maximum queued submissions before senders block
    pub depth: usize,
    /// Maximum submissions the worker drains per wakeup
    pub batch_size: usize,
}

impl Default for RenderQueueConfig {
    fn default() -> Self {
        Self {
            depth: 128,
            batch_size: 16,
        }
    }
}

/// Settings consumed once at window construction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Requested effective width; (0, 0) means "use the desktop resolution"
    pub width: u32,
    pub height: u32,
    /// Display to create the window on; out-of-range values resolve to 0
    pub display_index: i32,
    pub fullscreen: FullscreenMode,
    pub vsync: bool,
    /// Probe the ES context profile before the core profile
    pub prefer_gles: bool,
    /// Grab OS mouse focus as soon as the window exists
    pub lock_mouse: bool,
    /// The render thread is opt-in on the platform where it is unsafe by
    /// default; this flag has no effect elsewhere
    pub disable_render_thread: bool,
    pub render_queue: RenderQueueConfig,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "viewport".to_string(),
            width: 1280,
            height: 720,
            display_index: 0,
            fullscreen: FullscreenMode::Windowed,
            vsync: true,
            prefer_gles: false,
            lock_mouse: false,
            disable_render_thread: true,
            render_queue: RenderQueueConfig::default(),
        }
    }
}

impl WindowConfig {
    /// Requested effective size as a value type
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
