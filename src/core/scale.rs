use std::sync::Once;

use log::{debug, warn};

use crate::core::driver::VideoDriver;
use crate::core::geometry::Size;
use crate::core::platform::Platform;

/// Environment variable consulted for a display-scale multiplier on
/// platforms without a native DPI query
pub const SCALE_ENV_VAR: &str = "VIEWPORT_SCALE";

/// OS DPI value corresponding to scale 1.0
const BASELINE_DPI: f32 = 96.0;

static DPI_SCALING_OPTOUT: Once = Once::new();

/// Initial geometry produced by scale resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedScale {
    pub native_scale: f32,
    pub window_size: Size,
    pub surface_size: Size,
}

/// Clamp a requested display index to `[0, display_count)`, defaulting to 0
pub fn clamp_display_index(requested: i32, display_count: usize) -> usize {
    if requested < 0 || requested as usize >= display_count {
        0
    } else {
        requested as usize
    }
}

/// One-time, process-global opt-out from legacy OS DPI scaling
///
/// Repeated window construction (tests included) must not repeat the
/// platform side effect, so the call is gated on a `Once`.
pub fn disable_legacy_dpi_scaling(driver: &dyn VideoDriver) {
    DPI_SCALING_OPTOUT.call_once(|| driver.disable_legacy_dpi_scaling());
}

/// Parse an environment-style scale override
///
/// Anything missing, malformed, or non-positive silently falls back to 1.0.
pub fn scale_from_override(raw: Option<&str>) -> f32 {
    let Some(raw) = raw else {
        return 1.0;
    };
    match raw.trim().parse::<f32>() {
        Ok(scale) if scale > 0.0 => scale,
        _ => {
            debug!("ignoring malformed {SCALE_ENV_VAR} value {raw:?}");
            1.0
        }
    }
}

/// Initial native scale for `platform`, using `env_override` where the
/// platform lacks a native DPI query
///
/// The points-based platform starts at 1.0; it is corrected from the
/// actual drawable size after window creation.
pub fn resolve_initial_scale(
    platform: Platform,
    driver: &dyn VideoDriver,
    display: usize,
    env_override: Option<&str>,
) -> f32 {
    match platform {
        Platform::Windows => {
            disable_legacy_dpi_scaling(driver);
            match driver.display_dpi(display) {
                Some(dpi) => dpi / BASELINE_DPI,
                None => {
                    warn!("display {display} DPI query failed, assuming scale 1.0");
                    1.0
                }
            }
        }
        Platform::MacOs => 1.0,
        Platform::Other => scale_from_override(env_override),
    }
}

/// Resolve the initial {scale, window size, surface size} triple
///
/// A requested effective size of (0, 0) selects the display's current
/// native resolution; otherwise the requested size is scaled up to native
/// pixels. The display index is clamped before any query.
pub fn resolve_initial_geometry(
    platform: Platform,
    driver: &dyn VideoDriver,
    requested_effective: Size,
    display_index: i32,
    env_override: Option<&str>,
) -> ResolvedScale {
    let display = clamp_display_index(display_index, driver.display_count());
    let native_scale = resolve_initial_scale(platform, driver, display, env_override);

    let window_size = if requested_effective.is_zero() {
        driver.display_mode(display)
    } else {
        requested_effective.scaled(native_scale)
    };

    ResolvedScale {
        native_scale,
        window_size,
        surface_size: window_size,
    }
}

/// Read the scale override from the process environment
pub fn env_scale_override() -> Option<String> {
    std::env::var(SCALE_ENV_VAR).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FullscreenMode;
    use crate::core::cursor::CursorId;
    use crate::core::driver::{DrainedEvent, SubsystemOptions, WindowRequest};
    use crate::core::error::DriverError;
    use crate::core::geometry::Point;

    /// Display-only fake; window operations are unreachable in these tests
    struct DisplayDriver {
        modes: Vec<Size>,
        dpi: Option<f32>,
    }

    impl VideoDriver for DisplayDriver {
        fn init(&mut self, _options: &SubsystemOptions) -> Result<(), DriverError> {
            Ok(())
        }
        fn shutdown(&mut self) {}
        fn display_count(&self) -> usize {
            self.modes.len()
        }
        fn display_mode(&self, display: usize) -> Size {
            self.modes[display]
        }
        fn display_dpi(&self, _display: usize) -> Option<f32> {
            self.dpi
        }
        fn disable_legacy_dpi_scaling(&self) {}
        fn create_window(&mut self, _request: &WindowRequest) -> Result<(), DriverError> {
            unreachable!()
        }
        fn destroy_window(&mut self) {}
        fn has_window(&self) -> bool {
            false
        }
        fn drawable_size(&self) -> Size {
            Size::ZERO
        }
        fn window_size(&self) -> Size {
            Size::ZERO
        }
        fn set_fullscreen(&mut self, _mode: FullscreenMode) -> Result<(), DriverError> {
            unreachable!()
        }
        fn set_minimize_on_focus_loss(&mut self, _minimize: bool) {}
        fn drain_events(&mut self) -> Vec<DrainedEvent> {
            Vec::new()
        }
        fn grab_mouse(&mut self, _grab: bool) {}
        fn set_relative_mouse(&mut self, _enabled: bool) {}
        fn mouse_position(&self) -> Point {
            Point::default()
        }
        fn warp_mouse(&mut self, _position: Point) {}
        fn show_cursor(&mut self, _visible: bool) {}
        fn create_cursor(
            &mut self,
            _pixels: &[u8],
            _size: Size,
            _hotspot: Point,
        ) -> Result<CursorId, DriverError> {
            unreachable!()
        }
        fn set_cursor(&mut self, _cursor: CursorId) {}
    }

    fn two_displays() -> DisplayDriver {
        DisplayDriver {
            modes: vec![Size::new(2560, 1440), Size::new(1920, 1080)],
            dpi: None,
        }
    }

    #[test]
    fn test_display_index_clamping() {
        assert_eq!(clamp_display_index(-1, 2), 0);
        assert_eq!(clamp_display_index(2, 2), 0);
        assert_eq!(clamp_display_index(99, 2), 0);
        assert_eq!(clamp_display_index(0, 2), 0);
        assert_eq!(clamp_display_index(1, 2), 1);
    }

    #[test]
    fn test_override_parsing() {
        assert_eq!(scale_from_override(None), 1.0);
        assert_eq!(scale_from_override(Some("2.0")), 2.0);
        assert_eq!(scale_from_override(Some(" 1.5 ")), 1.5);
        // Malformed or nonsense values are silently ignored
        assert_eq!(scale_from_override(Some("huge")), 1.0);
        assert_eq!(scale_from_override(Some("")), 1.0);
        assert_eq!(scale_from_override(Some("-2")), 1.0);
        assert_eq!(scale_from_override(Some("0")), 1.0);
    }

    #[test]
    fn test_windows_scale_from_dpi() {
        let driver = DisplayDriver {
            modes: vec![Size::new(1920, 1080)],
            dpi: Some(144.0),
        };
        let scale = resolve_initial_scale(Platform::Windows, &driver, 0, None);
        assert_eq!(scale, 1.5);
    }

    #[test]
    fn test_windows_dpi_failure_defaults_to_one() {
        let driver = DisplayDriver {
            modes: vec![Size::new(1920, 1080)],
            dpi: None,
        };
        let scale = resolve_initial_scale(Platform::Windows, &driver, 0, None);
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_points_platform_starts_at_one() {
        let driver = two_displays();
        // Even with an override set; the drawable size decides later
        let scale = resolve_initial_scale(Platform::MacOs, &driver, 0, Some("2.0"));
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_generic_platform_uses_override() {
        let driver = two_displays();
        assert_eq!(
            resolve_initial_scale(Platform::Other, &driver, 0, Some("1.25")),
            1.25
        );
        assert_eq!(resolve_initial_scale(Platform::Other, &driver, 0, None), 1.0);
    }

    #[test]
    fn test_generic_platform_no_override_scenario() {
        // platform = generic, requested (1024, 768), no override:
        // scale 1.0, window == surface == (1024, 768)
        let driver = two_displays();
        let resolved =
            resolve_initial_geometry(Platform::Other, &driver, Size::new(1024, 768), 0, None);
        assert_eq!(resolved.native_scale, 1.0);
        assert_eq!(resolved.window_size, Size::new(1024, 768));
        assert_eq!(resolved.surface_size, Size::new(1024, 768));
    }

    #[test]
    fn test_zero_sentinel_uses_display_mode() {
        let driver = two_displays();
        let resolved = resolve_initial_geometry(Platform::Other, &driver, Size::ZERO, 1, None);
        assert_eq!(resolved.window_size, Size::new(1920, 1080));
        assert_eq!(resolved.surface_size, Size::new(1920, 1080));
    }

    #[test]
    fn test_out_of_range_display_resolves_to_zero() {
        let driver = two_displays();
        for index in [-1, 2, 7] {
            let resolved = resolve_initial_geometry(Platform::Other, &driver, Size::ZERO, index, None);
            assert_eq!(resolved.window_size, Size::new(2560, 1440), "index {index}");
        }
    }

    #[test]
    fn test_requested_size_scales_by_native_scale() {
        let driver = DisplayDriver {
            modes: vec![Size::new(3840, 2160)],
            dpi: Some(192.0),
        };
        let resolved =
            resolve_initial_geometry(Platform::Windows, &driver, Size::new(1024, 768), 0, None);
        assert_eq!(resolved.native_scale, 2.0);
        assert_eq!(resolved.window_size, Size::new(2048, 1536));
        assert_eq!(resolved.surface_size, resolved.window_size);
    }

    #[test]
    fn test_dpi_optout_runs_at_most_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct CountingDriver {
            inner: DisplayDriver,
            calls: Arc<AtomicUsize>,
        }
        impl VideoDriver for CountingDriver {
            fn init(&mut self, o: &SubsystemOptions) -> Result<(), DriverError> {
                self.inner.init(o)
            }
            fn shutdown(&mut self) {}
            fn display_count(&self) -> usize {
                self.inner.display_count()
            }
            fn display_mode(&self, d: usize) -> Size {
                self.inner.display_mode(d)
            }
            fn display_dpi(&self, d: usize) -> Option<f32> {
                self.inner.display_dpi(d)
            }
            fn disable_legacy_dpi_scaling(&self) {
                self.calls.fetch_add(1, Ordering::SeqCst);
            }
            fn create_window(&mut self, _r: &WindowRequest) -> Result<(), DriverError> {
                unreachable!()
            }
            fn destroy_window(&mut self) {}
            fn has_window(&self) -> bool {
                false
            }
            fn drawable_size(&self) -> Size {
                Size::ZERO
            }
            fn window_size(&self) -> Size {
                Size::ZERO
            }
            fn set_fullscreen(&mut self, _m: FullscreenMode) -> Result<(), DriverError> {
                unreachable!()
            }
            fn set_minimize_on_focus_loss(&mut self, _m: bool) {}
            fn drain_events(&mut self) -> Vec<DrainedEvent> {
                Vec::new()
            }
            fn grab_mouse(&mut self, _g: bool) {}
            fn set_relative_mouse(&mut self, _e: bool) {}
            fn mouse_position(&self) -> Point {
                Point::default()
            }
            fn warp_mouse(&mut self, _p: Point) {}
            fn show_cursor(&mut self, _v: bool) {}
            fn create_cursor(
                &mut self,
                _p: &[u8],
                _s: Size,
                _h: Point,
            ) -> Result<CursorId, DriverError> {
                unreachable!()
            }
            fn set_cursor(&mut self, _c: CursorId) {}
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let driver = CountingDriver {
            inner: two_displays(),
            calls: Arc::clone(&calls),
        };
        disable_legacy_dpi_scaling(&driver);
        disable_legacy_dpi_scaling(&driver);
        disable_legacy_dpi_scaling(&driver);
        // Process-global guard: at most one call ever, and other tests may
        // have consumed it first
        assert!(calls.load(Ordering::SeqCst) <= 1);
    }
}
