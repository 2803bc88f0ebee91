use thiserror::Error;

/// Raw failure reported by a video driver, wrapped by the window layer
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

/// Errors surfaced while probing or driving the rendering backend
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// Both profile probes failed; the window cannot come up. Fatal, not
    /// retried.
    #[error("no usable graphics context: {0}")]
    ProbeFailed(String),

    #[error("graphics backend initialization failed: {0}")]
    InitFailed(String),

    /// The dedicated render thread exited; submissions can no longer be
    /// delivered.
    #[error("render thread is no longer running")]
    RenderThreadGone,
}

/// Errors from window construction and window-level operations
///
/// Anything that would leave the window half-constructed is fatal and
/// propagated; cursor creation degrades per-call without hurting the
/// window itself.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("windowing subsystem initialization failed")]
    SubsystemInit(#[source] DriverError),

    #[error("window creation failed")]
    WindowCreate(#[source] DriverError),

    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    #[error("failed to create hardware cursor {name:?}")]
    CursorCreate {
        name: String,
        #[source]
        source: DriverError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_cursor_error_carries_name_and_cause() {
        let err = WindowError::CursorCreate {
            name: "crosshair".to_string(),
            source: DriverError("out of cursor slots".to_string()),
        };
        assert!(err.to_string().contains("crosshair"));
        let source = err.source().expect("cursor error keeps its cause");
        assert_eq!(source.to_string(), "out of cursor slots");
    }

    #[test]
    fn test_graphics_error_converts_into_window_error() {
        let err: WindowError = GraphicsError::ProbeFailed("core: no adapter".to_string()).into();
        assert!(matches!(err, WindowError::Graphics(_)));
        assert!(err.to_string().contains("no usable graphics context"));
    }

    #[test]
    fn test_subsystem_error_exposes_driver_message() {
        let err = WindowError::SubsystemInit(DriverError("video init failed".to_string()));
        let source = err.source().expect("init error keeps its cause");
        assert_eq!(source.to_string(), "video init failed");
    }
}
