//! Scoped pointer capture.
//!
//! While a gesture is active the host must deliver pointer-move and
//! pointer-up events even when the pointer leaves the element (global
//! listeners in a browser, mouse capture on desktop). The host exposes this
//! as a [`PointerCapture`]; the transform controller holds a
//! [`CaptureGuard`] for exactly the lifetime of the gesture, so the capture
//! is released on every exit path: pointer-up, pointer-leave, cancel, or the
//! session being dropped mid-gesture.

use std::fmt;
use std::rc::Rc;

/// Host hook for global pointer listeners.
pub trait PointerCapture {
    /// Start routing global move/up events to the session.
    fn attach(&self);

    /// Stop routing global move/up events.
    fn detach(&self);
}

/// Holds a pointer capture; detaches when dropped.
#[must_use = "dropping the guard releases the pointer capture immediately"]
pub struct CaptureGuard {
    capture: Rc<dyn PointerCapture>,
}

impl CaptureGuard {
    /// Attach the capture and return a guard that detaches it on drop.
    pub fn acquire(capture: Rc<dyn PointerCapture>) -> Self {
        capture.attach();
        tracing::trace!("Pointer capture attached");
        Self { capture }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.capture.detach();
        tracing::trace!("Pointer capture detached");
    }
}

impl fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureGuard").finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::CountingCapture;
    use super::*;

    #[test]
    fn test_guard_detaches_on_drop() {
        let capture = Rc::new(CountingCapture::default());
        {
            let _guard = CaptureGuard::acquire(capture.clone());
            assert!(capture.is_attached());
        }
        assert!(!capture.is_attached());
        assert_eq!(capture.attached.get(), 1);
        assert_eq!(capture.detached.get(), 1);
    }

    #[test]
    fn test_guard_detaches_during_unwind() {
        let capture = Rc::new(CountingCapture::default());
        let handle = capture.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = CaptureGuard::acquire(handle);
            panic!("gesture handler failed");
        }));
        assert!(result.is_err());
        assert_eq!(capture.detached.get(), 1);
    }
}
