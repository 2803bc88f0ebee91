pub mod cursor;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod graphics;
pub mod input;
pub mod notifier;
pub mod pixel_double;
pub mod platform;
pub mod scale;
pub mod window;
pub mod window_state;

pub use cursor::{CursorId, HardwareCursor, WindowToken};
pub use driver::{DrainedEvent, FramebufferSpec, SubsystemOptions, VideoDriver, WindowRequest};
pub use error::{DriverError, GraphicsError, WindowError};
pub use geometry::{Point, Size, WindowGeometry};
pub use graphics::{
    create_graphics_context, probe_profile, BackendFactory, ContextProfile, GraphicsContext,
    RenderBackend, RenderTask,
};
pub use input::{has_input_focus, InputHandler, InputPump, NullInputPump};
pub use notifier::{ScaleChange, ScaleChangeNotifier};
pub use pixel_double::double_pixel_data;
pub use platform::Platform;
pub use scale::{clamp_display_index, resolve_initial_geometry, ResolvedScale, SCALE_ENV_VAR};
pub use window::{PlatformWindow, CURSOR_DOUBLE_THRESHOLD};
pub use window_state::WindowState;
