use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use crate::config::RenderQueueConfig;
use crate::core::error::GraphicsError;
use crate::core::platform::Platform;

/// Context profile selected by the capability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextProfile {
    Core,
    Es,
}

impl ContextProfile {
    pub fn alternate(self) -> Self {
        match self {
            ContextProfile::Core => ContextProfile::Es,
            ContextProfile::Es => ContextProfile::Core,
        }
    }

    /// (major, minor) version requested for this profile
    pub fn version(self) -> (u8, u8) {
        match self {
            ContextProfile::Core => (3, 2),
            ContextProfile::Es => (3, 0),
        }
    }
}

impl fmt::Display for ContextProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor) = self.version();
        match self {
            ContextProfile::Core => write!(f, "core {major}.{minor}"),
            ContextProfile::Es => write!(f, "es {major}.{minor}"),
        }
    }
}

/// Work submitted to the rendering backend
pub type RenderTask = Box<dyn FnOnce() + Send>;

/// Rendering backend, executing on whichever thread owns the context
pub trait RenderBackend: Send {
    fn initialize(&mut self) -> Result<(), GraphicsError>;

    fn set_vsync(&mut self, enabled: bool);

    /// Execute one submitted task
    fn run(&mut self, task: RenderTask);

    fn dispose(&mut self);
}

/// Creates and probes rendering backends for a given profile
pub trait BackendFactory {
    /// Attempt a minimal hidden off-screen context for `profile`
    fn probe(&self, profile: ContextProfile) -> Result<(), GraphicsError>;

    fn create(&self, profile: ContextProfile) -> Result<Box<dyn RenderBackend>, GraphicsError>;
}

/// Pick a working context profile: preferred first, alternate on failure
///
/// Both failing is fatal; the error carries both causes and is not retried.
pub fn probe_profile(
    factory: &dyn BackendFactory,
    prefer_es: bool,
) -> Result<ContextProfile, GraphicsError> {
    let preferred = if prefer_es {
        ContextProfile::Es
    } else {
        ContextProfile::Core
    };
    match factory.probe(preferred) {
        Ok(()) => Ok(preferred),
        Err(first) => {
            let alternate = preferred.alternate();
            warn!("profile {preferred} unavailable ({first}), probing {alternate}");
            match factory.probe(alternate) {
                Ok(()) => Ok(alternate),
                Err(second) => Err(GraphicsError::ProbeFailed(format!(
                    "{preferred}: {first}; {alternate}: {second}"
                ))),
            }
        }
    }
}

enum RenderMessage {
    Task(RenderTask),
    SetVsync(bool),
    Shutdown,
}

/// Handle to the rendering context
///
/// Exactly one per window. `Direct` executes on the caller's thread;
/// `Threaded` proxies through a bounded queue to a dedicated worker.
/// Disposed exactly once, before the window handle.
pub enum GraphicsContext {
    Direct(DirectContext),
    Threaded(ThreadedContext),
}

impl GraphicsContext {
    /// Submit a task for execution on the context's thread
    pub fn submit(&mut self, task: RenderTask) -> Result<(), GraphicsError> {
        match self {
            GraphicsContext::Direct(context) => context.submit(task),
            GraphicsContext::Threaded(context) => context.submit(task),
        }
    }

    pub fn set_vsync_enabled(&mut self, enabled: bool) {
        match self {
            GraphicsContext::Direct(context) => context.set_vsync_enabled(enabled),
            GraphicsContext::Threaded(context) => context.set_vsync_enabled(enabled),
        }
    }

    /// Tear the context down; safe to call more than once
    pub fn dispose(&mut self) {
        match self {
            GraphicsContext::Direct(context) => context.dispose(),
            GraphicsContext::Threaded(context) => context.dispose(),
        }
    }

    pub fn is_threaded(&self) -> bool {
        matches!(self, GraphicsContext::Threaded(_))
    }
}

impl fmt::Debug for GraphicsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsContext::Direct(_) => f.write_str("GraphicsContext::Direct"),
            GraphicsContext::Threaded(_) => f.write_str("GraphicsContext::Threaded"),
        }
    }
}

/// Context executing graphics calls synchronously on the caller's thread
pub struct DirectContext {
    backend: Box<dyn RenderBackend>,
    disposed: bool,
}

impl DirectContext {
    fn new(mut backend: Box<dyn RenderBackend>) -> Result<Self, GraphicsError> {
        backend.initialize()?;
        Ok(Self {
            backend,
            disposed: false,
        })
    }

    fn submit(&mut self, task: RenderTask) -> Result<(), GraphicsError> {
        self.backend.run(task);
        Ok(())
    }

    fn set_vsync_enabled(&mut self, enabled: bool) {
        self.backend.set_vsync(enabled);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.backend.dispose();
    }
}

/// Context proxying calls to a dedicated render thread
///
/// The queue is bounded: a submitting logic thread blocks once the render
/// thread falls `depth` submissions behind. The worker drains messages in
/// batches of up to the configured batch size.
pub struct ThreadedContext {
    sender: SyncSender<RenderMessage>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedContext {
    fn spawn(
        backend: Box<dyn RenderBackend>,
        queue: RenderQueueConfig,
    ) -> Result<Self, GraphicsError> {
        let (sender, receiver) = mpsc::sync_channel(queue.depth);
        let (ready_sender, ready_receiver) = mpsc::channel();
        let batch_size = queue.batch_size.max(1);

        let worker = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || render_worker(backend, receiver, ready_sender, batch_size))
            .map_err(|err| {
                GraphicsError::InitFailed(format!("failed to spawn render thread: {err}"))
            })?;

        // Initialization happens on the worker; block until it reports so
        // construction stays synchronous and fallible
        match ready_receiver.recv() {
            Ok(Ok(())) => Ok(Self {
                sender,
                worker: Some(worker),
            }),
            Ok(Err(err)) => {
                let _ = worker.join();
                Err(err)
            }
            Err(_) => {
                let _ = worker.join();
                Err(GraphicsError::InitFailed(
                    "render thread exited before initializing".to_string(),
                ))
            }
        }
    }

    fn submit(&mut self, task: RenderTask) -> Result<(), GraphicsError> {
        self.sender
            .send(RenderMessage::Task(task))
            .map_err(|_| GraphicsError::RenderThreadGone)
    }

    fn set_vsync_enabled(&mut self, enabled: bool) {
        if self.sender.send(RenderMessage::SetVsync(enabled)).is_err() {
            warn!("vsync change dropped: render thread is gone");
        }
    }

    fn dispose(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.sender.send(RenderMessage::Shutdown);
        if worker.join().is_err() {
            warn!("render thread panicked during shutdown");
        }
    }
}

fn render_worker(
    mut backend: Box<dyn RenderBackend>,
    receiver: Receiver<RenderMessage>,
    ready: Sender<Result<(), GraphicsError>>,
    batch_size: usize,
) {
    let init = backend.initialize();
    let failed = init.is_err();
    let _ = ready.send(init);
    if failed {
        return;
    }

    'running: loop {
        let first = match receiver.recv() {
            Ok(message) => message,
            // All senders dropped without an explicit shutdown
            Err(_) => break,
        };
        let mut batch = vec![first];
        while batch.len() < batch_size {
            match receiver.try_recv() {
                Ok(message) => batch.push(message),
                Err(_) => break,
            }
        }
        for message in batch {
            match message {
                RenderMessage::Task(task) => backend.run(task),
                RenderMessage::SetVsync(enabled) => backend.set_vsync(enabled),
                RenderMessage::Shutdown => break 'running,
            }
        }
    }
    backend.dispose();
}

/// Decide context ownership and build the context
///
/// Platforms without the render-thread incompatibility always get the
/// threaded variant; the incompatible platform gets a direct context
/// unless configuration opts back in. Vsync is applied per configuration
/// once the context is up.
pub fn create_graphics_context(
    platform: Platform,
    disable_render_thread: bool,
    vsync: bool,
    queue: RenderQueueConfig,
    factory: &dyn BackendFactory,
    profile: ContextProfile,
) -> Result<GraphicsContext, GraphicsError> {
    let threaded = !platform.render_thread_incompatible() || !disable_render_thread;
    let backend = factory.create(profile)?;

    let mut context = if threaded {
        info!(
            "render context: threaded, queue depth {}, batches of {}",
            queue.depth, queue.batch_size
        );
        GraphicsContext::Threaded(ThreadedContext::spawn(backend, queue)?)
    } else {
        info!("render context: direct on the calling thread");
        GraphicsContext::Direct(DirectContext::new(backend)?)
    };

    debug!("vsync {}", if vsync { "on" } else { "off" });
    context.set_vsync_enabled(vsync);
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Backend that records calls; shared handles let tests inspect it
    /// after the box moves into the context
    #[derive(Clone, Default)]
    struct Probe {
        initialized: Arc<AtomicUsize>,
        disposed: Arc<AtomicUsize>,
        tasks: Arc<AtomicUsize>,
        vsync: Arc<AtomicBool>,
        fail_init: bool,
    }

    struct TestBackend {
        probe: Probe,
    }

    impl RenderBackend for TestBackend {
        fn initialize(&mut self) -> Result<(), GraphicsError> {
            if self.probe.fail_init {
                return Err(GraphicsError::InitFailed("test backend refused".to_string()));
            }
            self.probe.initialized.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn set_vsync(&mut self, enabled: bool) {
            self.probe.vsync.store(enabled, Ordering::SeqCst);
        }
        fn run(&mut self, task: RenderTask) {
            self.probe.tasks.fetch_add(1, Ordering::SeqCst);
            task();
        }
        fn dispose(&mut self) {
            self.probe.disposed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct TestFactory {
        probe: Probe,
        core_ok: bool,
        es_ok: bool,
    }

    impl TestFactory {
        fn new(probe: Probe) -> Self {
            Self {
                probe,
                core_ok: true,
                es_ok: true,
            }
        }
    }

    impl BackendFactory for TestFactory {
        fn probe(&self, profile: ContextProfile) -> Result<(), GraphicsError> {
            let ok = match profile {
                ContextProfile::Core => self.core_ok,
                ContextProfile::Es => self.es_ok,
            };
            if ok {
                Ok(())
            } else {
                Err(GraphicsError::InitFailed(format!("{profile} rejected")))
            }
        }
        fn create(&self, _profile: ContextProfile) -> Result<Box<dyn RenderBackend>, GraphicsError> {
            Ok(Box::new(TestBackend {
                probe: self.probe.clone(),
            }))
        }
    }

    fn queue() -> RenderQueueConfig {
        RenderQueueConfig {
            depth: 8,
            batch_size: 4,
        }
    }

    #[test]
    fn test_probe_prefers_requested_profile() {
        let factory = TestFactory::new(Probe::default());
        assert_eq!(probe_profile(&factory, false).unwrap(), ContextProfile::Core);
        assert_eq!(probe_profile(&factory, true).unwrap(), ContextProfile::Es);
    }

    #[test]
    fn test_probe_falls_back_to_alternate() {
        let mut factory = TestFactory::new(Probe::default());
        factory.core_ok = false;
        assert_eq!(probe_profile(&factory, false).unwrap(), ContextProfile::Es);

        let mut factory = TestFactory::new(Probe::default());
        factory.es_ok = false;
        assert_eq!(probe_profile(&factory, true).unwrap(), ContextProfile::Core);
    }

    #[test]
    fn test_probe_fails_when_both_profiles_fail() {
        let mut factory = TestFactory::new(Probe::default());
        factory.core_ok = false;
        factory.es_ok = false;
        let err = probe_profile(&factory, false).unwrap_err();
        assert!(matches!(err, GraphicsError::ProbeFailed(_)));
    }

    #[test]
    fn test_compatible_platform_gets_threaded_context() {
        for disable in [true, false] {
            let probe = Probe::default();
            let factory = TestFactory::new(probe.clone());
            let mut context = create_graphics_context(
                Platform::Other,
                disable,
                true,
                queue(),
                &factory,
                ContextProfile::Core,
            )
            .unwrap();
            assert!(context.is_threaded(), "disable_render_thread = {disable}");
            context.dispose();
        }
    }

    #[test]
    fn test_incompatible_platform_defaults_to_direct() {
        let probe = Probe::default();
        let factory = TestFactory::new(probe.clone());
        let mut context = create_graphics_context(
            Platform::MacOs,
            true,
            true,
            queue(),
            &factory,
            ContextProfile::Core,
        )
        .unwrap();
        assert!(!context.is_threaded());
        assert_eq!(probe.initialized.load(Ordering::SeqCst), 1);
        context.dispose();
    }

    #[test]
    fn test_incompatible_platform_config_overrides_to_threaded() {
        let probe = Probe::default();
        let factory = TestFactory::new(probe.clone());
        let mut context = create_graphics_context(
            Platform::MacOs,
            false,
            true,
            queue(),
            &factory,
            ContextProfile::Core,
        )
        .unwrap();
        assert!(context.is_threaded());
        context.dispose();
    }

    #[test]
    fn test_factory_applies_vsync_setting() {
        let probe = Probe::default();
        let factory = TestFactory::new(probe.clone());
        let mut context = create_graphics_context(
            Platform::MacOs,
            true,
            false,
            queue(),
            &factory,
            ContextProfile::Core,
        )
        .unwrap();
        assert!(!probe.vsync.load(Ordering::SeqCst));
        context.dispose();
    }

    #[test]
    fn test_threaded_context_runs_tasks_off_the_caller_thread() {
        let probe = Probe::default();
        let factory = TestFactory::new(probe.clone());
        let mut context = create_graphics_context(
            Platform::Other,
            true,
            true,
            queue(),
            &factory,
            ContextProfile::Core,
        )
        .unwrap();

        let caller = std::thread::current().id();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        context
            .submit(Box::new(move || {
                *sink.lock().unwrap() = Some(std::thread::current().id());
            }))
            .unwrap();

        // dispose joins the worker, so the task has run by then
        context.dispose();
        let worker = seen.lock().unwrap().expect("task ran");
        assert_ne!(worker, caller);
        assert_eq!(probe.tasks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_threaded_context_drains_pending_tasks_before_dispose() {
        let probe = Probe::default();
        let factory = TestFactory::new(probe.clone());
        let mut context = create_graphics_context(
            Platform::Other,
            true,
            true,
            queue(),
            &factory,
            ContextProfile::Core,
        )
        .unwrap();

        for _ in 0..20 {
            context.submit(Box::new(|| {})).unwrap();
        }
        context.dispose();
        assert_eq!(probe.tasks.load(Ordering::SeqCst), 20);
        assert_eq!(probe.disposed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        for platform in [Platform::Other, Platform::MacOs] {
            let probe = Probe::default();
            let factory = TestFactory::new(probe.clone());
            let mut context = create_graphics_context(
                platform,
                true,
                true,
                queue(),
                &factory,
                ContextProfile::Core,
            )
            .unwrap();
            context.dispose();
            context.dispose();
            assert_eq!(probe.disposed.load(Ordering::SeqCst), 1, "{platform:?}");
        }
    }

    #[test]
    fn test_worker_init_failure_is_fatal_and_joined() {
        let probe = Probe {
            fail_init: true,
            ..Probe::default()
        };
        let factory = TestFactory::new(probe.clone());
        let err = create_graphics_context(
            Platform::Other,
            true,
            true,
            queue(),
            &factory,
            ContextProfile::Core,
        )
        .unwrap_err();
        assert!(matches!(err, GraphicsError::InitFailed(_)));
        assert_eq!(probe.disposed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_direct_context_runs_inline() {
        let probe = Probe::default();
        let factory = TestFactory::new(probe.clone());
        let mut context = create_graphics_context(
            Platform::MacOs,
            true,
            true,
            queue(),
            &factory,
            ContextProfile::Core,
        )
        .unwrap();

        let caller = std::thread::current().id();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        context
            .submit(Box::new(move || {
                *sink.lock().unwrap() = Some(std::thread::current().id());
            }))
            .unwrap();
        assert_eq!(seen.lock().unwrap().unwrap(), caller);
        context.dispose();
    }
}
