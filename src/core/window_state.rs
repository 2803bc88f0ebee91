use std::sync::Mutex;

use log::debug;

use crate::core::geometry::{Point, Size, WindowGeometry};
use crate::core::notifier::{ScaleChange, ScaleChangeNotifier};

/// Lock-protected shared window state
///
/// The logic thread and the render thread both read geometry every frame
/// while resize/DPI callbacks may rewrite it; a single mutex over the whole
/// record keeps multi-field reads atomic. The lock is held only for the
/// read or write itself, never across a blocking call and never while
/// listeners run.
pub struct WindowState {
    geometry: Mutex<WindowGeometry>,
    locked_mouse: Mutex<Option<Point>>,
    notifier: ScaleChangeNotifier,
}

impl WindowState {
    pub fn new(geometry: WindowGeometry) -> Self {
        Self {
            geometry: Mutex::new(geometry),
            locked_mouse: Mutex::new(None),
            notifier: ScaleChangeNotifier::new(),
        }
    }

    /// Atomic read of the whole geometry record
    pub fn snapshot(&self) -> WindowGeometry {
        *self.geometry.lock().unwrap()
    }

    pub fn native_size(&self) -> Size {
        self.geometry.lock().unwrap().native_size
    }

    pub fn surface_size(&self) -> Size {
        self.geometry.lock().unwrap().surface_size
    }

    pub fn native_scale(&self) -> f32 {
        self.geometry.lock().unwrap().native_scale
    }

    pub fn scale_modifier(&self) -> f32 {
        self.geometry.lock().unwrap().scale_modifier
    }

    pub fn effective_scale(&self) -> f32 {
        self.geometry.lock().unwrap().effective_scale()
    }

    pub fn effective_size(&self) -> Size {
        self.geometry.lock().unwrap().effective_size()
    }

    /// Scale-change subscriptions live here
    pub fn notifier(&self) -> &ScaleChangeNotifier {
        &self.notifier
    }

    /// Swap the user scale modifier and notify listeners
    ///
    /// The native scale is untouched; the notification is fired after the
    /// lock is released so listeners may re-enter the accessors.
    pub fn set_scale_modifier(&self, modifier: f32) {
        let change = {
            let mut geometry = self.geometry.lock().unwrap();
            let old_effective = geometry.effective_scale();
            geometry.scale_modifier = modifier;
            ScaleChange {
                old_native_scale: geometry.native_scale,
                old_effective_scale: old_effective,
                new_native_scale: geometry.native_scale,
                new_effective_scale: geometry.effective_scale(),
            }
        };
        debug!(
            "scale modifier -> {modifier}, effective {} -> {}",
            change.old_effective_scale, change.new_effective_scale
        );
        self.notifier.emit(change);
    }

    /// Reconcile with a freshly queried drawable size
    ///
    /// No-op when the drawable matches the cached surface size. Otherwise
    /// the native scale is recomputed as drawable width over window width
    /// in points, the surface size is replaced under the lock, and
    /// listeners are notified with the before/after scales. Returns whether
    /// anything changed.
    pub fn apply_drawable_size(&self, drawable: Size, window_points: Size) -> bool {
        let change = {
            let mut geometry = self.geometry.lock().unwrap();
            if drawable == geometry.surface_size {
                return false;
            }
            let old_native = geometry.native_scale;
            let old_effective = geometry.effective_scale();
            if window_points.width > 0 {
                geometry.native_scale = drawable.width as f32 / window_points.width as f32;
            }
            geometry.surface_size = drawable;
            ScaleChange {
                old_native_scale: old_native,
                old_effective_scale: old_effective,
                new_native_scale: geometry.native_scale,
                new_effective_scale: geometry.effective_scale(),
            }
        };
        debug!(
            "drawable {}x{} -> native scale {}",
            drawable.width, drawable.height, change.new_native_scale
        );
        self.notifier.emit(change);
        true
    }

    /// Replace the whole record in one lock acquisition, without notifying
    ///
    /// Construction-time convergence only; runtime changes go through
    /// `set_scale_modifier` / `apply_drawable_size`.
    pub(crate) fn set_geometry(&self, geometry: WindowGeometry) {
        *self.geometry.lock().unwrap() = geometry;
    }

    pub fn locked_mouse(&self) -> Option<Point> {
        *self.locked_mouse.lock().unwrap()
    }

    pub(crate) fn set_locked_mouse(&self, position: Option<Point>) {
        *self.locked_mouse.lock().unwrap() = position;
    }
}
