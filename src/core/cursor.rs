use crate::core::geometry::{Point, Size};

/// Opaque id of a cursor resource held by the video driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorId(pub u64);

/// Identity of a live platform window, used for cursor provenance checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowToken(pub(crate) u64);

/// Platform cursor resource plus the identity of the window that built it
///
/// Installing a cursor on a window other than its origin falls back to
/// hiding the cursor; the provenance check replaces a downcast.
#[derive(Debug, Clone)]
pub struct HardwareCursor {
    pub name: String,
    /// Final pixel size after any doubling passes
    pub size: Size,
    /// Final hotspot after any doubling passes
    pub hotspot: Point,
    id: CursorId,
    origin: WindowToken,
}

impl HardwareCursor {
    pub(crate) fn new(
        name: String,
        id: CursorId,
        origin: WindowToken,
        size: Size,
        hotspot: Point,
    ) -> Self {
        Self {
            name,
            size,
            hotspot,
            id,
            origin,
        }
    }

    pub fn id(&self) -> CursorId {
        self.id
    }

    /// True when this handle was produced by the window identified by `token`
    pub fn is_from(&self, token: WindowToken) -> bool {
        self.origin == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_check() {
        let cursor = HardwareCursor::new(
            "aim".to_string(),
            CursorId(3),
            WindowToken(7),
            Size::new(32, 32),
            Point::new(16, 16),
        );
        assert!(cursor.is_from(WindowToken(7)));
        assert!(!cursor.is_from(WindowToken(8)));
        assert_eq!(cursor.id(), CursorId(3));
    }
}
