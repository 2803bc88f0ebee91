pub mod wgpu_backend;
pub mod winit_driver;

pub use wgpu_backend::{present_mode, WgpuBackend, WgpuBackendFactory};
pub use winit_driver::WinitDriver;
