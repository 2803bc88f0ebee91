use serde::{Deserialize, Serialize};

/// Dimensions in pixels (or points, depending on context)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// The (0, 0) sentinel meaning "use the desktop resolution"
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_zero(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// Multiply both dimensions by `factor`, truncating
    pub fn scaled(&self, factor: f32) -> Size {
        Size {
            width: (self.width as f32 * factor) as u32,
            height: (self.height as f32 * factor) as u32,
        }
    }

    /// Divide both dimensions by `divisor`, truncating
    pub fn divided(&self, divisor: f32) -> Size {
        Size {
            width: (self.width as f32 / divisor) as u32,
            height: (self.height as f32 / divisor) as u32,
        }
    }

    /// Double both dimensions
    pub fn doubled(&self) -> Size {
        Size {
            width: self.width * 2,
            height: self.height * 2,
        }
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Total size in bytes for an RGBA buffer of these dimensions
    pub fn buffer_size(&self) -> usize {
        self.pixel_count() * 4
    }
}

/// Position in pixels, relative to the window origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Double both coordinates; used when cursor pixel data is doubled
    pub fn doubled(&self) -> Point {
        Point {
            x: self.x * 2,
            y: self.y * 2,
        }
    }
}

/// The authoritative window geometry record
///
/// `native_size` is the window size in physical pixels (points on the
/// points-based platform), `surface_size` is the rendering target size.
/// The two are equal except where the OS defines window size in points
/// distinct from pixels. All four fields are updated together under the
/// state lock so readers never observe a mixed old/new record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    pub native_size: Size,
    pub surface_size: Size,
    /// Ratio of surface pixels to window points
    pub native_scale: f32,
    /// User-chosen additional zoom, independent of OS DPI
    pub scale_modifier: f32,
}

impl WindowGeometry {
    pub fn new(native_size: Size, surface_size: Size, native_scale: f32) -> Self {
        Self {
            native_size,
            surface_size,
            native_scale,
            scale_modifier: 1.0,
        }
    }

    /// What application logic should reason about: native scale with the
    /// user modifier applied
    pub fn effective_scale(&self) -> f32 {
        self.native_scale * self.scale_modifier
    }

    /// Native size divided by the scale modifier, truncating
    pub fn effective_size(&self) -> Size {
        self.native_size.divided(self.scale_modifier)
    }
}
