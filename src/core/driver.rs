use crate::config::FullscreenMode;
use crate::core::cursor::CursorId;
use crate::core::error::DriverError;
use crate::core::geometry::{Point, Size};

/// Framebuffer attributes requested at subsystem init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferSpec {
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub alpha_bits: u8,
    pub double_buffer: bool,
}

impl Default for FramebufferSpec {
    /// Double-buffered RGB(8,8,8), no alpha
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 0,
            double_buffer: true,
        }
    }
}

/// Options applied when the windowing subsystem comes up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsystemOptions {
    /// Let our own crash handling see faults instead of the subsystem's
    pub catch_crashes: bool,
    pub framebuffer: FramebufferSpec,
}

impl Default for SubsystemOptions {
    fn default() -> Self {
        Self {
            catch_crashes: false,
            framebuffer: FramebufferSpec::default(),
        }
    }
}

/// Parameters for creating the OS window
#[derive(Debug, Clone)]
pub struct WindowRequest {
    pub title: String,
    /// Native size in pixels (points on the points-based platform)
    pub size: Size,
    /// Display the window is centered on
    pub display: usize,
    pub fullscreen: FullscreenMode,
    /// Request a high-DPI-aware surface
    pub high_dpi: bool,
    /// Legacy-fullscreen HiDPI-disable hint, set for exclusive fullscreen
    /// on the points-based platform
    pub legacy_fullscreen_hint: bool,
}

/// Window event classes preserved by the start-up drain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainedEvent {
    FocusGained,
    FocusLost,
    /// Anything else; discarded by the drain
    Other,
}

/// Seam to the OS windowing layer
///
/// One driver owns at most one window. All methods must be called from the
/// thread that created the driver; the window core enforces this at its
/// own boundary.
pub trait VideoDriver {
    fn init(&mut self, options: &SubsystemOptions) -> Result<(), DriverError>;

    /// Tear down the subsystem; must tolerate being called without a window
    fn shutdown(&mut self);

    fn display_count(&self) -> usize;

    /// Current mode of `display`, in physical pixels
    fn display_mode(&self, display: usize) -> Size;

    /// Best-effort DPI query; `None` when the platform cannot answer
    fn display_dpi(&self, display: usize) -> Option<f32>;

    /// Opt this process out of legacy OS-level DPI scaling. Idempotence is
    /// guaranteed by the caller, not the driver.
    fn disable_legacy_dpi_scaling(&self);

    fn create_window(&mut self, request: &WindowRequest) -> Result<(), DriverError>;

    fn destroy_window(&mut self);

    fn has_window(&self) -> bool;

    /// Rendering-surface size in pixels
    fn drawable_size(&self) -> Size;

    /// Window size in OS units (points on the points-based platform)
    fn window_size(&self) -> Size;

    fn set_fullscreen(&mut self, mode: FullscreenMode) -> Result<(), DriverError>;

    fn set_minimize_on_focus_loss(&mut self, minimize: bool);

    /// Drain queued window events, reporting only their drain class
    fn drain_events(&mut self) -> Vec<DrainedEvent>;

    /// Grab or release OS mouse focus
    fn grab_mouse(&mut self, grab: bool);

    fn set_relative_mouse(&mut self, enabled: bool);

    /// Last known pointer position relative to the window
    fn mouse_position(&self) -> Point;

    fn warp_mouse(&mut self, position: Point);

    fn show_cursor(&mut self, visible: bool);

    fn create_cursor(
        &mut self,
        pixels: &[u8],
        size: Size,
        hotspot: Point,
    ) -> Result<CursorId, DriverError>;

    fn set_cursor(&mut self, cursor: CursorId);
}
