use std::time::Duration;

use log::{debug, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::monitor::MonitorHandle;
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{
    CursorGrabMode, CustomCursor, Fullscreen, Window, WindowAttributes, WindowId,
};

use crate::config::FullscreenMode;
use crate::core::cursor::CursorId;
use crate::core::driver::{DrainedEvent, SubsystemOptions, VideoDriver, WindowRequest};
use crate::core::error::DriverError;
use crate::core::geometry::{Point, Size};

/// Fallback when no monitor has been observed yet
const FALLBACK_MODE: Size = Size {
    width: 1280,
    height: 720,
};

/// How many pump iterations window creation may take before we give up
const CREATE_PUMP_LIMIT: usize = 10;

/// [`VideoDriver`] over winit's pump-events API
///
/// winit only hands out an `ActiveEventLoop` inside a pump, so every
/// operation that needs one (window creation, custom cursors, monitor
/// snapshots) is queued on the handler state and serviced during the next
/// pump. Must be created and driven on the main thread.
pub struct WinitDriver {
    event_loop: EventLoop<()>,
    app: DriverApp,
    subsystem_up: bool,
}

#[derive(Default)]
struct DriverApp {
    window: Option<Window>,
    monitors: Vec<MonitorHandle>,
    pending_window: Option<WindowAttributes>,
    create_error: Option<String>,
    pending_cursor: Option<(Vec<u8>, Size, Point)>,
    cursors: Vec<CustomCursor>,
    cursor_error: Option<String>,
    drained: Vec<DrainedEvent>,
    last_mouse: Point,
}

impl DriverApp {
    fn service_requests(&mut self, event_loop: &ActiveEventLoop) {
        self.monitors = event_loop.available_monitors().collect();

        if let Some(attributes) = self.pending_window.take() {
            match event_loop.create_window(attributes) {
                Ok(window) => self.window = Some(window),
                Err(err) => self.create_error = Some(err.to_string()),
            }
        }

        if let Some((pixels, size, hotspot)) = self.pending_cursor.take() {
            match CustomCursor::from_rgba(
                pixels,
                size.width as u16,
                size.height as u16,
                hotspot.x as u16,
                hotspot.y as u16,
            ) {
                Ok(source) => self.cursors.push(event_loop.create_custom_cursor(source)),
                Err(err) => self.cursor_error = Some(err.to_string()),
            }
        }
    }
}

impl ApplicationHandler for DriverApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.service_requests(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Focused(focused) => self.drained.push(if focused {
                DrainedEvent::FocusGained
            } else {
                DrainedEvent::FocusLost
            }),
            WindowEvent::CursorMoved { position, .. } => {
                self.last_mouse = Point::new(position.x as i32, position.y as i32);
                self.drained.push(DrainedEvent::Other);
            }
            _ => self.drained.push(DrainedEvent::Other),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.service_requests(event_loop);
    }
}

impl WinitDriver {
    /// Create the driver; must run on the main thread
    pub fn new() -> Result<Self, DriverError> {
        let event_loop =
            EventLoop::new().map_err(|err| DriverError(format!("event loop: {err}")))?;
        Ok(Self {
            event_loop,
            app: DriverApp::default(),
            subsystem_up: false,
        })
    }

    fn pump(&mut self) {
        let _ = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app);
    }

    fn monitor(&self, display: usize) -> Option<&MonitorHandle> {
        self.app.monitors.get(display)
    }

    fn fullscreen_for(&self, mode: FullscreenMode) -> Option<Fullscreen> {
        match mode {
            FullscreenMode::Windowed => None,
            FullscreenMode::Borderless => Some(Fullscreen::Borderless(None)),
            FullscreenMode::Exclusive => {
                let window = self.app.window.as_ref()?;
                let monitor = window.current_monitor()?;
                // Prefer a mode matching the monitor's current size at the
                // highest refresh rate
                let target = monitor.size();
                let best = monitor
                    .video_modes()
                    .filter(|mode| mode.size() == target)
                    .max_by_key(|mode| mode.refresh_rate_millihertz())
                    .or_else(|| {
                        monitor.video_modes().max_by_key(|mode| {
                            let size = mode.size();
                            (size.width as u64 * size.height as u64, mode.refresh_rate_millihertz())
                        })
                    });
                match best {
                    Some(mode) => Some(Fullscreen::Exclusive(mode)),
                    // No mode list: degrade to borderless
                    None => Some(Fullscreen::Borderless(None)),
                }
            }
        }
    }
}

impl VideoDriver for WinitDriver {
    fn init(&mut self, options: &SubsystemOptions) -> Result<(), DriverError> {
        if self.subsystem_up {
            return Ok(());
        }
        // winit marks the process per-monitor DPI aware and picks the
        // framebuffer through the surface; the request is recorded for
        // diagnostics only
        debug!(
            "winit subsystem up (crash catching {}, {}-bit rgb framebuffer requested)",
            if options.catch_crashes { "on" } else { "off" },
            options.framebuffer.red_bits
        );
        self.pump();
        self.subsystem_up = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.app.window.take().is_some() {
            self.pump();
        }
        self.subsystem_up = false;
    }

    fn display_count(&self) -> usize {
        self.app.monitors.len().max(1)
    }

    fn display_mode(&self, display: usize) -> Size {
        let monitor = self.monitor(display).or_else(|| self.app.monitors.first());
        match monitor {
            Some(monitor) => {
                let size = monitor.size();
                Size::new(size.width, size.height)
            }
            None => {
                warn!("no monitor information available, assuming {FALLBACK_MODE:?}");
                FALLBACK_MODE
            }
        }
    }

    fn display_dpi(&self, display: usize) -> Option<f32> {
        self.monitor(display)
            .map(|monitor| (monitor.scale_factor() * 96.0) as f32)
    }

    fn disable_legacy_dpi_scaling(&self) {
        // winit opts the process into per-monitor DPI awareness on its own
        debug!("legacy DPI scaling opt-out delegated to winit");
    }

    fn create_window(&mut self, request: &WindowRequest) -> Result<(), DriverError> {
        let mut attributes = Window::default_attributes()
            .with_title(request.title.clone())
            .with_inner_size(PhysicalSize::new(request.size.width, request.size.height));

        if let Some(monitor) = self.monitor(request.display) {
            let origin = monitor.position();
            let mode = monitor.size();
            let x = origin.x + (mode.width.saturating_sub(request.size.width) / 2) as i32;
            let y = origin.y + (mode.height.saturating_sub(request.size.height) / 2) as i32;
            attributes = attributes.with_position(PhysicalPosition::new(x, y));
        }

        self.app.pending_window = Some(attributes);
        for _ in 0..CREATE_PUMP_LIMIT {
            if self.app.window.is_some() || self.app.create_error.is_some() {
                break;
            }
            self.pump();
        }

        if let Some(err) = self.app.create_error.take() {
            return Err(DriverError(err));
        }
        if self.app.window.is_none() {
            return Err(DriverError(
                "event loop never serviced the window request".to_string(),
            ));
        }
        Ok(())
    }

    fn destroy_window(&mut self) {
        if self.app.window.take().is_some() {
            self.pump();
        }
    }

    fn has_window(&self) -> bool {
        self.app.window.is_some()
    }

    fn drawable_size(&self) -> Size {
        match &self.app.window {
            Some(window) => {
                let size = window.inner_size();
                Size::new(size.width, size.height)
            }
            None => Size::ZERO,
        }
    }

    fn window_size(&self) -> Size {
        match &self.app.window {
            Some(window) => {
                let logical = window.inner_size().to_logical::<f64>(window.scale_factor());
                Size::new(logical.width as u32, logical.height as u32)
            }
            None => Size::ZERO,
        }
    }

    fn set_fullscreen(&mut self, mode: FullscreenMode) -> Result<(), DriverError> {
        let fullscreen = self.fullscreen_for(mode);
        let Some(window) = &self.app.window else {
            return Err(DriverError("no window to make fullscreen".to_string()));
        };
        window.set_fullscreen(fullscreen);
        self.pump();
        Ok(())
    }

    fn set_minimize_on_focus_loss(&mut self, minimize: bool) {
        // No winit surface for this; the borderless path only ever turns
        // it off, which matches winit's default behavior
        debug!("minimize-on-focus-loss request ({minimize}) ignored by winit driver");
    }

    fn drain_events(&mut self) -> Vec<DrainedEvent> {
        self.pump();
        std::mem::take(&mut self.app.drained)
    }

    fn grab_mouse(&mut self, grab: bool) {
        let Some(window) = &self.app.window else {
            return;
        };
        let mode = if grab {
            CursorGrabMode::Confined
        } else {
            CursorGrabMode::None
        };
        if let Err(err) = window.set_cursor_grab(mode) {
            debug!("cursor grab ({grab}) unavailable: {err}");
        }
    }

    fn set_relative_mouse(&mut self, enabled: bool) {
        let Some(window) = &self.app.window else {
            return;
        };
        if enabled {
            if window.set_cursor_grab(CursorGrabMode::Locked).is_err() {
                if let Err(err) = window.set_cursor_grab(CursorGrabMode::Confined) {
                    debug!("relative mouse unavailable: {err}");
                }
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                debug!("cursor release failed: {err}");
            }
            window.set_cursor_visible(true);
        }
    }

    fn mouse_position(&self) -> Point {
        // winit has no synchronous pointer query; track the last observed
        // CursorMoved instead
        self.app.last_mouse
    }

    fn warp_mouse(&mut self, position: Point) {
        if let Some(window) = &self.app.window {
            if let Err(err) = window.set_cursor_position(PhysicalPosition::new(position.x, position.y))
            {
                debug!("cursor warp failed: {err}");
            }
        }
    }

    fn show_cursor(&mut self, visible: bool) {
        if let Some(window) = &self.app.window {
            window.set_cursor_visible(visible);
        }
    }

    fn create_cursor(
        &mut self,
        pixels: &[u8],
        size: Size,
        hotspot: Point,
    ) -> Result<CursorId, DriverError> {
        if size.width > u16::MAX as u32 || size.height > u16::MAX as u32 {
            return Err(DriverError(format!(
                "cursor size {}x{} out of range",
                size.width, size.height
            )));
        }
        self.app.pending_cursor = Some((pixels.to_vec(), size, hotspot));
        self.pump();

        if let Some(err) = self.app.cursor_error.take() {
            return Err(DriverError(err));
        }
        if self.app.pending_cursor.is_some() {
            self.app.pending_cursor = None;
            return Err(DriverError(
                "event loop never serviced the cursor request".to_string(),
            ));
        }
        Ok(CursorId(self.app.cursors.len() as u64 - 1))
    }

    fn set_cursor(&mut self, cursor: CursorId) {
        let (Some(window), Some(custom)) = (
            &self.app.window,
            self.app.cursors.get(cursor.0 as usize),
        ) else {
            warn!("ignoring unknown cursor id {}", cursor.0);
            return;
        };
        window.set_cursor(custom.clone());
    }
}
