use std::sync::Arc;

use log::{debug, info};
use wgpu::{Adapter, Backends, Device, Instance, Queue};

use crate::core::error::GraphicsError;
use crate::core::graphics::{BackendFactory, ContextProfile, RenderBackend, RenderTask};

/// Present mode corresponding to a vsync setting
pub fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::Immediate
    }
}

/// Backend set implementing a context profile: the ES profile runs on the
/// GL backend, the core profile on the platform's primary backend
fn backends_for(profile: ContextProfile) -> Backends {
    match profile {
        ContextProfile::Es => Backends::GL,
        ContextProfile::Core => Backends::PRIMARY,
    }
}

async fn request_adapter_headless(instance: &Instance) -> Result<Adapter, GraphicsError> {
    instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .map_err(|err| GraphicsError::InitFailed(format!("no compatible adapter: {err:?}")))
}

async fn request_device(adapter: &Adapter) -> Result<(Device, Queue), GraphicsError> {
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("viewport render device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            experimental_features: Default::default(),
            trace: Default::default(),
        })
        .await
        .map_err(|err| GraphicsError::InitFailed(format!("device request failed: {err:?}")))
}

/// [`BackendFactory`] over wgpu
///
/// The capability probe is a hidden off-screen adapter request against the
/// profile's backend set; no surface or window is touched.
#[derive(Debug, Default)]
pub struct WgpuBackendFactory;

impl WgpuBackendFactory {
    pub fn new() -> Self {
        Self
    }
}

impl BackendFactory for WgpuBackendFactory {
    fn probe(&self, profile: ContextProfile) -> Result<(), GraphicsError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: backends_for(profile),
            ..Default::default()
        });
        let adapter = pollster::block_on(request_adapter_headless(&instance))?;
        debug!("profile {profile} probe ok on {}", adapter.get_info().name);
        Ok(())
    }

    fn create(&self, profile: ContextProfile) -> Result<Box<dyn RenderBackend>, GraphicsError> {
        Ok(Box::new(WgpuBackend::new(profile)))
    }
}

/// [`RenderBackend`] holding a wgpu device and queue
///
/// Initialization happens on whichever thread ends up owning the context
/// (the caller for a direct context, the render thread otherwise).
pub struct WgpuBackend {
    profile: ContextProfile,
    device: Option<Arc<Device>>,
    queue: Option<Arc<Queue>>,
    vsync: bool,
}

impl WgpuBackend {
    fn new(profile: ContextProfile) -> Self {
        Self {
            profile,
            device: None,
            queue: None,
            vsync: true,
        }
    }

    /// Shared device handle, once initialized
    pub fn device(&self) -> Option<Arc<Device>> {
        self.device.clone()
    }

    /// Shared queue handle, once initialized
    pub fn queue(&self) -> Option<Arc<Queue>> {
        self.queue.clone()
    }

    /// Present mode renderers should configure surfaces with
    pub fn current_present_mode(&self) -> wgpu::PresentMode {
        present_mode(self.vsync)
    }
}

impl RenderBackend for WgpuBackend {
    fn initialize(&mut self) -> Result<(), GraphicsError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: backends_for(self.profile),
            ..Default::default()
        });
        let adapter = pollster::block_on(request_adapter_headless(&instance))?;
        info!(
            "render backend up: {} ({})",
            adapter.get_info().name, self.profile
        );
        let (device, queue) = pollster::block_on(request_device(&adapter))?;
        self.device = Some(Arc::new(device));
        self.queue = Some(Arc::new(queue));
        Ok(())
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.vsync = enabled;
        debug!("present mode now {:?}", present_mode(enabled));
    }

    fn run(&mut self, task: RenderTask) {
        task();
    }

    fn dispose(&mut self) {
        self.queue.take();
        self.device.take();
    }
}
