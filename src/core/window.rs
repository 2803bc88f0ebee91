use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use log::{debug, info, warn};

use crate::config::{FullscreenMode, WindowConfig};
use crate::core::cursor::{HardwareCursor, WindowToken};
use crate::core::driver::{DrainedEvent, SubsystemOptions, VideoDriver, WindowRequest};
use crate::core::error::WindowError;
use crate::core::geometry::{Point, Size, WindowGeometry};
use crate::core::graphics::{
    create_graphics_context, probe_profile, BackendFactory, ContextProfile, GraphicsContext,
};
use crate::core::input::{set_input_focus, InputHandler, InputPump};
use crate::core::pixel_double::double_pixel_data;
use crate::core::platform::Platform;
use crate::core::scale::{clamp_display_index, env_scale_override, resolve_initial_geometry};
use crate::core::window_state::WindowState;

/// Native scale above which cursors are pixel-doubled on platforms that do
/// not double automatically at the OS level
pub const CURSOR_DOUBLE_THRESHOLD: f32 = 1.5;

static NEXT_WINDOW_TOKEN: AtomicU64 = AtomicU64::new(1);

/// The platform window: owns the OS window handle, the graphics context,
/// and the shared geometry state
///
/// Construction runs a single forward pass (subsystem init, profile probe,
/// display select, scale resolve, window create, points-platform event
/// drain, scale converge, mouse mode, fullscreen, context create, input
/// attach). Any failure before context creation unwinds without leaving a
/// partial window running.
///
/// All mutating operations must happen on the thread that constructed the
/// window. Geometry reads go through the shared [`WindowState`] and are
/// safe from any thread, including the render thread.
pub struct PlatformWindow {
    platform: Platform,
    driver: Box<dyn VideoDriver>,
    state: Arc<WindowState>,
    context: Option<GraphicsContext>,
    input: Box<dyn InputPump>,
    profile: ContextProfile,
    token: WindowToken,
    owner: ThreadId,
    disposed: bool,
}

impl std::fmt::Debug for PlatformWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformWindow")
            .field("platform", &self.platform)
            .field("profile", &self.profile)
            .field("token", &self.token)
            .field("owner", &self.owner)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl PlatformWindow {
    /// Build the window and everything it owns
    pub fn create(
        platform: Platform,
        mut driver: Box<dyn VideoDriver>,
        backend_factory: &dyn BackendFactory,
        mut input: Box<dyn InputPump>,
        config: &WindowConfig,
    ) -> Result<Self, WindowError> {
        match Self::construct(platform, driver.as_mut(), backend_factory, config) {
            Ok((state, context, profile)) => {
                // InputAttach: latched modifiers from before our window
                // existed must not leak into the first frame
                input.reset_key_latches();
                let geometry = state.snapshot();
                info!(
                    "window ready: {}x{} native, {}x{} surface, scale {}",
                    geometry.native_size.width,
                    geometry.native_size.height,
                    geometry.surface_size.width,
                    geometry.surface_size.height,
                    geometry.native_scale
                );
                Ok(Self {
                    platform,
                    driver,
                    state,
                    context: Some(context),
                    input,
                    profile,
                    token: WindowToken(NEXT_WINDOW_TOKEN.fetch_add(1, Ordering::Relaxed)),
                    owner: thread::current().id(),
                    disposed: false,
                })
            }
            Err(err) => {
                if driver.has_window() {
                    driver.destroy_window();
                }
                driver.shutdown();
                Err(err)
            }
        }
    }

    fn construct(
        platform: Platform,
        driver: &mut dyn VideoDriver,
        backend_factory: &dyn BackendFactory,
        config: &WindowConfig,
    ) -> Result<(Arc<WindowState>, GraphicsContext, ContextProfile), WindowError> {
        // PlatformInit
        driver
            .init(&SubsystemOptions::default())
            .map_err(WindowError::SubsystemInit)?;

        // ProfileProbe
        let profile = probe_profile(backend_factory, config.prefer_gles)?;
        debug!("context profile: {profile}");

        // DisplaySelect
        let display = clamp_display_index(config.display_index, driver.display_count());

        // ScaleResolve
        let override_value = env_scale_override();
        let resolved = resolve_initial_geometry(
            platform,
            driver,
            config.size(),
            config.display_index,
            override_value.as_deref(),
        );
        debug!(
            "resolved scale {} for {}x{} on display {display}",
            resolved.native_scale, resolved.window_size.width, resolved.window_size.height
        );

        // WindowCreate
        let request = WindowRequest {
            title: config.title.clone(),
            size: resolved.window_size,
            display,
            fullscreen: config.fullscreen,
            high_dpi: true,
            legacy_fullscreen_hint: platform.uses_points()
                && config.fullscreen == FullscreenMode::Exclusive,
        };
        driver
            .create_window(&request)
            .map_err(WindowError::WindowCreate)?;

        // EventDrain: queued events must not reach the context on the
        // points platform; only focus transitions survive
        if platform.uses_points() {
            for event in driver.drain_events() {
                match event {
                    DrainedEvent::FocusGained => set_input_focus(true),
                    DrainedEvent::FocusLost => set_input_focus(false),
                    DrainedEvent::Other => {}
                }
            }
        }

        let state = Arc::new(WindowState::new(WindowGeometry::new(
            resolved.window_size,
            resolved.surface_size,
            resolved.native_scale,
        )));

        // ScaleConverge
        let drawable = driver.drawable_size();
        if platform.uses_points() {
            state.apply_drawable_size(drawable, driver.window_size());
        } else if !drawable.is_zero() && drawable != resolved.surface_size {
            // Off the points platform native and surface stay equal; trust
            // what the OS actually gave us
            state.set_geometry(WindowGeometry::new(drawable, drawable, resolved.native_scale));
        }

        // MouseModeApply
        driver.grab_mouse(config.lock_mouse);

        // FullscreenApply
        match config.fullscreen {
            FullscreenMode::Exclusive => {
                driver
                    .set_fullscreen(FullscreenMode::Exclusive)
                    .map_err(WindowError::WindowCreate)?;
                if platform.uses_points() {
                    // This platform ignores the configured resolution in
                    // fullscreen; adopt whatever the OS forced
                    let forced = driver.window_size();
                    state.set_geometry(WindowGeometry::new(forced, forced, 1.0));
                    debug!(
                        "fullscreen forced {}x{}, native scale reset to 1",
                        forced.width, forced.height
                    );
                }
            }
            FullscreenMode::Borderless => {
                driver
                    .set_fullscreen(FullscreenMode::Borderless)
                    .map_err(WindowError::WindowCreate)?;
                driver.set_minimize_on_focus_loss(false);
            }
            FullscreenMode::Windowed => {}
        }

        // ContextCreate
        let context = create_graphics_context(
            platform,
            config.disable_render_thread,
            config.vsync,
            config.render_queue,
            backend_factory,
            profile,
        )?;

        Ok((state, context, profile))
    }

    fn assert_owner(&self) {
        assert_eq!(
            thread::current().id(),
            self.owner,
            "PlatformWindow used off its owning thread"
        );
    }

    /// Shared geometry state; clone freely across threads
    pub fn state(&self) -> Arc<WindowState> {
        Arc::clone(&self.state)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn context_profile(&self) -> ContextProfile {
        self.profile
    }

    /// The render context, while the window is alive
    pub fn graphics(&mut self) -> Option<&mut GraphicsContext> {
        self.assert_owner();
        self.context.as_mut()
    }

    pub fn display_count(&self) -> usize {
        self.assert_owner();
        self.driver.display_count()
    }

    /// Change the user zoom; listeners on the state notifier fire
    /// synchronously before this returns
    pub fn set_scale_modifier(&self, modifier: f32) {
        self.assert_owner();
        self.state.set_scale_modifier(modifier);
    }

    /// React to a resize or DPI-change notification from the OS
    ///
    /// Re-queries the drawable size and reconverges the geometry record;
    /// a no-op when nothing actually changed.
    pub fn on_window_geometry_changed(&mut self) {
        self.assert_owner();
        let drawable = self.driver.drawable_size();
        let points = self.driver.window_size();
        self.state.apply_drawable_size(drawable, points);
    }

    /// Build a platform cursor from RGBA pixels
    ///
    /// Pixels and hotspot are doubled once when the native scale exceeds
    /// the 1.5 threshold (except on the points platform, which doubles at
    /// the OS level) and once more when `force_double` is set.
    pub fn create_hardware_cursor(
        &mut self,
        name: &str,
        size: Size,
        pixels: &[u8],
        hotspot: Point,
        force_double: bool,
    ) -> Result<HardwareCursor, WindowError> {
        self.assert_owner();
        let mut pixels = pixels.to_vec();
        let mut size = size;
        let mut hotspot = hotspot;

        if !self.platform.uses_points() && self.state.native_scale() > CURSOR_DOUBLE_THRESHOLD {
            let (doubled, doubled_size) = double_pixel_data(&pixels, size);
            pixels = doubled;
            size = doubled_size;
            hotspot = hotspot.doubled();
        }
        if force_double {
            let (doubled, doubled_size) = double_pixel_data(&pixels, size);
            pixels = doubled;
            size = doubled_size;
            hotspot = hotspot.doubled();
        }

        let id = self
            .driver
            .create_cursor(&pixels, size, hotspot)
            .map_err(|source| WindowError::CursorCreate {
                name: name.to_string(),
                source,
            })?;
        Ok(HardwareCursor::new(
            name.to_string(),
            id,
            self.token,
            size,
            hotspot,
        ))
    }

    /// Install a cursor, or hide the cursor for `None`
    ///
    /// A handle produced by another window hides the cursor instead of
    /// installing a foreign resource.
    pub fn set_hardware_cursor(&mut self, cursor: Option<&HardwareCursor>) {
        self.assert_owner();
        match cursor {
            Some(cursor) if cursor.is_from(self.token) => {
                self.driver.show_cursor(true);
                self.driver.set_cursor(cursor.id());
            }
            Some(cursor) => {
                warn!(
                    "cursor {:?} belongs to another window, hiding instead",
                    cursor.name
                );
                self.driver.show_cursor(false);
            }
            None => self.driver.show_cursor(false),
        }
    }

    /// Enter or leave relative (grabbed) mouse mode
    ///
    /// Entering snapshots the current pointer position as the locked
    /// position; leaving warps the OS cursor back there and clears it.
    pub fn set_relative_mouse_mode(&mut self, enabled: bool) {
        self.assert_owner();
        if enabled {
            let position = self.driver.mouse_position();
            self.state.set_locked_mouse(Some(position));
            self.driver.set_relative_mouse(true);
        } else {
            self.driver.set_relative_mouse(false);
            if let Some(position) = self.state.locked_mouse() {
                self.driver.warp_mouse(position);
            }
            self.state.set_locked_mouse(None);
        }
    }

    pub fn relative_mouse_mode(&self) -> bool {
        self.state.locked_mouse().is_some()
    }

    /// Pump pending input through the attached pump
    ///
    /// While relative mode is active the cursor is re-warped to the locked
    /// position on every call; the OS may otherwise let it drift.
    pub fn pump_input(&mut self, handler: &mut dyn InputHandler) {
        self.assert_owner();
        let locked = self.state.locked_mouse();
        self.input.pump(handler, locked);
        if let Some(position) = locked {
            self.driver.warp_mouse(position);
        }
    }

    pub fn clipboard_text(&mut self) -> String {
        self.assert_owner();
        self.input.clipboard_text()
    }

    pub fn set_clipboard_text(&mut self, text: &str) -> bool {
        self.assert_owner();
        self.input.set_clipboard_text(text)
    }

    /// Deterministic teardown: context, then window, then subsystem
    ///
    /// Idempotent and infallible; later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(mut context) = self.context.take() {
            context.dispose();
        }
        if self.driver.has_window() {
            self.driver.destroy_window();
        }
        self.driver.shutdown();
        info!("window disposed");
    }
}

impl Drop for PlatformWindow {
    fn drop(&mut self) {
        self.dispose();
    }
}
