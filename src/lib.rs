pub mod backend;
pub mod cli;
pub mod config;
pub mod core;

// Re-export the surface most callers need
pub use crate::config::{FullscreenMode, RenderQueueConfig, WindowConfig};
pub use crate::core::cursor::HardwareCursor;
pub use crate::core::error::{DriverError, GraphicsError, WindowError};
pub use crate::core::geometry::{Point, Size, WindowGeometry};
pub use crate::core::graphics::{ContextProfile, GraphicsContext};
pub use crate::core::input::{has_input_focus, InputHandler, InputPump};
pub use crate::core::notifier::{ScaleChange, ScaleChangeNotifier};
pub use crate::core::platform::Platform;
pub use crate::core::window::PlatformWindow;
pub use crate::core::window_state::WindowState;
