/// Operating-system family the window runs on
///
/// Construction logic branches on this identity in a few well-defined
/// places (scale resolution, the profile probe, scale convergence) rather
/// than testing a global flag throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    /// Everything else (Linux, BSDs); no native DPI query
    Other,
}

impl Platform {
    /// The platform this process is actually running on
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Window size is specified in device-independent points distinct from
    /// the rendering surface's pixel count
    pub fn uses_points(self) -> bool {
        matches!(self, Platform::MacOs)
    }

    /// Graphics calls off the thread that created the context are unsafe
    /// here; the render thread is opt-in
    pub fn render_thread_incompatible(self) -> bool {
        matches!(self, Platform::MacOs)
    }

    /// The OS can answer a display DPI query directly
    pub fn has_native_dpi_query(self) -> bool {
        matches!(self, Platform::Windows)
    }
}
