use std::sync::{Arc, Mutex};

/// Before/after scales delivered to scale-change listeners
///
/// Modifier changes never alter the native scale, so for those events the
/// old and new native values are equal; drawable-size reconvergence can
/// change both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleChange {
    pub old_native_scale: f32,
    pub old_effective_scale: f32,
    pub new_native_scale: f32,
    pub new_effective_scale: f32,
}

type Listener = Arc<dyn Fn(ScaleChange) + Send + Sync>;

/// Observer list for scale changes
///
/// Listeners are invoked synchronously on whichever thread detects the
/// change. The emitting code must not hold the window state lock, since
/// listeners may re-enter state accessors.
#[derive(Default)]
pub struct ScaleChangeNotifier {
    listeners: Mutex<Vec<Listener>>,
}

impl ScaleChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(ScaleChange) + Send + Sync + 'static) {
        self.listeners.lock().unwrap().push(Arc::new(listener));
    }

    /// Invoke every listener with `change`
    ///
    /// The listener list is snapshotted first so callbacks run without the
    /// list lock held and may subscribe further listeners.
    pub fn emit(&self, change: ScaleChange) {
        let snapshot: Vec<Listener> = self.listeners.lock().unwrap().clone();
        for listener in snapshot {
            listener(change);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}
