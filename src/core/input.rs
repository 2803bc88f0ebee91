use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::geometry::Point;

// Process-wide flag, written only during the points-platform start-up
// event drain; game-loop logic reads it to pause/resume simulation.
static INPUT_FOCUS: AtomicBool = AtomicBool::new(true);

/// Whether the application window currently holds input focus
pub fn has_input_focus() -> bool {
    INPUT_FOCUS.load(Ordering::Acquire)
}

pub(crate) fn set_input_focus(focused: bool) {
    INPUT_FOCUS.store(focused, Ordering::Release);
}

/// Serializes tests that toggle the process-wide focus flag
#[cfg(test)]
pub(crate) static FOCUS_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Receiver for decoded input events
///
/// Decoding itself belongs to the pump; the window core never interprets
/// OS events beyond the start-up focus drain.
pub trait InputHandler {
    /// A key or button changed state
    fn on_button(&mut self, _code: u32, _pressed: bool) {}

    /// The pointer moved, in surface pixels
    fn on_mouse_motion(&mut self, _position: Point) {}

    /// The window gained or lost input focus
    fn on_focus(&mut self, _focused: bool) {}
}

/// Seam to the event-decoding collaborator
pub trait InputPump {
    /// Drain pending OS events into `handler`
    ///
    /// `locked_mouse` is the position the cursor is pinned to while
    /// relative mode is active, or `None` otherwise. May block briefly on
    /// the underlying event queue.
    fn pump(&mut self, handler: &mut dyn InputHandler, locked_mouse: Option<Point>);

    /// Clear any latched modifier-key state
    fn reset_key_latches(&mut self);

    fn clipboard_text(&mut self) -> String;

    /// Returns false when the platform clipboard rejected the text
    fn set_clipboard_text(&mut self, text: &str) -> bool;
}

/// Pump that decodes nothing; used before a real pump is attached and in
/// headless runs
#[derive(Debug, Default)]
pub struct NullInputPump;

impl InputPump for NullInputPump {
    fn pump(&mut self, _handler: &mut dyn InputHandler, _locked_mouse: Option<Point>) {}

    fn reset_key_latches(&mut self) {}

    fn clipboard_text(&mut self) -> String {
        String::new()
    }

    fn set_clipboard_text(&mut self, _text: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_flag_round_trip() {
        let _guard = FOCUS_TEST_LOCK.lock().unwrap();
        set_input_focus(false);
        assert!(!has_input_focus());
        set_input_focus(true);
        assert!(has_input_focus());
    }

    #[test]
    fn test_null_pump_is_inert() {
        struct Recorder {
            calls: usize,
        }
        impl InputHandler for Recorder {
            fn on_button(&mut self, _code: u32, _pressed: bool) {
                self.calls += 1;
            }
        }

        let mut pump = NullInputPump;
        let mut handler = Recorder { calls: 0 };
        pump.pump(&mut handler, Some(Point::new(5, 5)));
        pump.reset_key_latches();
        assert_eq!(handler.calls, 0);
        assert_eq!(pump.clipboard_text(), "");
        assert!(!pump.set_clipboard_text("ignored"));
    }
}
