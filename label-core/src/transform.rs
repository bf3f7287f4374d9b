//! # Transform Controller
//!
//! Turns a pointer-down / move / up sequence into geometry changes on one
//! element.
//!
//! ```text
//!            down(body)            move            up / leave
//!   Idle ─────────────────▶ Dragging ──▶ Dragging ───────────▶ Idle (+commit)
//!     │      down(handle)
//!     ├───────────────────▶ Resizing(h) ─ ... ─────────────────▶ Idle (+commit)
//!     │      down(rotation)
//!     └───────────────────▶ Rotating ─── ... ─────────────────▶ Idle (+commit)
//!                                 cancel (Escape): restore, no commit
//! ```
//!
//! Pointer coordinates are viewport pixels; deltas are divided by the zoom
//! factor to get design pixels. Every frame is computed from the snapshot
//! taken at pointer-down, never accumulated, so clamping never makes the
//! gesture stick.

use std::rc::Rc;

use crate::capture::{CaptureGuard, PointerCapture};
use crate::element::AspectPolicy;
use crate::event::{PointerEvent, PointerTarget, ResizeHandle};
use crate::{Bounds, CanvasSettings, ElementId, ElementKind, LayoutElement, TemplateLayout};

/// Rotation increment used while Shift is held.
pub const ROTATION_SNAP_DEGREES: f64 = 15.0;

/// Normalize an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let r = degrees.rem_euclid(360.0) + 0.0;
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Round to the nearest [`ROTATION_SNAP_DEGREES`] and normalize.
#[must_use]
pub fn snap_rotation(degrees: f64) -> f64 {
    normalize_rotation((degrees / ROTATION_SNAP_DEGREES).round() * ROTATION_SNAP_DEGREES)
}

/// Position after dragging `start` by `(dx, dy)` design pixels.
///
/// Clamps to the canvas origin first, then snaps to the grid when enabled.
#[must_use]
pub fn drag_bounds(start: Bounds, dx: f64, dy: f64, settings: &CanvasSettings) -> Bounds {
    let mut x = (start.x + dx).max(0.0);
    let mut y = (start.y + dy).max(0.0);
    if settings.snap_to_grid {
        x = settings.snap(x);
        y = settings.snap(y);
    }
    Bounds { x, y, ..start }
}

/// Bounds after dragging `handle` of an element of `kind` by `(dx, dy)`
/// design pixels.
///
/// Width and height are floored to the kind's minimum and the position is
/// clamped to the canvas origin. When the handle moves the left or top edge,
/// the opposite edge stays put while the floor applies. Square kinds take
/// the larger dimension for both.
#[must_use]
pub fn resize_bounds(kind: ElementKind, start: Bounds, handle: ResizeHandle, dx: f64, dy: f64) -> Bounds {
    let limits = kind.constraints();

    let mut width = if handle.moves_left() {
        start.right() - (start.x + dx).max(0.0)
    } else if handle.moves_right() {
        start.width + dx
    } else {
        start.width
    };
    let mut height = if handle.moves_top() {
        start.bottom() - (start.y + dy).max(0.0)
    } else if handle.moves_bottom() {
        start.height + dy
    } else {
        start.height
    };

    width = width.max(limits.min_width);
    height = height.max(limits.min_height);

    if limits.aspect == AspectPolicy::Square {
        let size = width.max(height);
        width = size;
        height = size;
    }

    let x = if handle.moves_left() {
        (start.right() - width).max(0.0)
    } else {
        start.x.max(0.0)
    };
    let y = if handle.moves_top() {
        (start.bottom() - height).max(0.0)
    } else {
        start.y.max(0.0)
    };

    Bounds::new(x, y, width, height)
}

/// Apply the kind's minimum size and aspect policy and clamp the position
/// to the canvas origin. Used for edits that bypass a gesture, such as
/// numeric input in a property panel.
#[must_use]
pub fn constrain_bounds(kind: ElementKind, bounds: Bounds) -> Bounds {
    let limits = kind.constraints();
    let mut width = bounds.width.max(limits.min_width);
    let mut height = bounds.height.max(limits.min_height);
    if limits.aspect == AspectPolicy::Square {
        let size = width.max(height);
        width = size;
        height = size;
    }
    Bounds::new(bounds.x.max(0.0), bounds.y.max(0.0), width, height)
}

/// Angle in radians from `center` to `point`.
#[must_use]
pub fn pointer_angle(center: (f64, f64), point: (f64, f64)) -> f64 {
    (point.1 - center.1).atan2(point.0 - center.0)
}

/// Rotation after turning the pointer from `initial_angle` to `current_angle`
/// (radians), starting from `start_rotation` degrees.
#[must_use]
pub fn rotated(start_rotation: f64, initial_angle: f64, current_angle: f64, snap: bool) -> f64 {
    let degrees = start_rotation + (current_angle - initial_angle).to_degrees();
    if snap {
        snap_rotation(degrees)
    } else {
        normalize_rotation(degrees)
    }
}

/// Externally visible controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformState {
    /// No gesture in progress.
    Idle,
    /// Moving an element body.
    Dragging,
    /// Dragging a resize handle.
    Resizing(ResizeHandle),
    /// Dragging the rotation handle.
    Rotating,
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Geometry changed and should become a history entry.
    Changed {
        /// The transformed element.
        element_id: ElementId,
    },
    /// The gesture was a pure click.
    Unchanged,
    /// The gesture was cancelled and the element restored.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Drag,
    Resize(ResizeHandle),
    Rotate {
        center: (f64, f64),
        initial_angle: f64,
    },
}

#[derive(Debug)]
struct ActiveGesture {
    mode: Mode,
    pointer_start: (f64, f64),
    /// Element as it was at pointer-down.
    original: LayoutElement,
    _capture: Option<CaptureGuard>,
}

/// Pointer-driven move/resize/rotate state machine.
#[derive(Debug, Default)]
pub struct TransformController {
    gesture: Option<ActiveGesture>,
}

impl TransformController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TransformState {
        match self.gesture.as_ref().map(|g| g.mode) {
            None => TransformState::Idle,
            Some(Mode::Drag) => TransformState::Dragging,
            Some(Mode::Resize(handle)) => TransformState::Resizing(handle),
            Some(Mode::Rotate { .. }) => TransformState::Rotating,
        }
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Element manipulated by the active gesture.
    #[must_use]
    pub fn active_element(&self) -> Option<&ElementId> {
        self.gesture.as_ref().map(|g| &g.original.id)
    }

    /// Start a gesture for `target`.
    ///
    /// Returns `false` (and stays as it was) when a gesture is already
    /// active, the target is the empty canvas, the element does not exist,
    /// or the handle is not offered at the element's current size. The
    /// capture, if given, is attached for the gesture's lifetime.
    pub fn begin(
        &mut self,
        layout: &TemplateLayout,
        settings: &CanvasSettings,
        target: &PointerTarget,
        event: &PointerEvent,
        capture: Option<Rc<dyn PointerCapture>>,
    ) -> bool {
        if self.gesture.is_some() {
            tracing::debug!("Ignoring pointer-down during active gesture");
            return false;
        }
        let Some(element) = target.element().and_then(|id| layout.get_element(id)) else {
            return false;
        };

        let mode = match target {
            PointerTarget::Canvas => return false,
            PointerTarget::Body(_) => Mode::Drag,
            PointerTarget::Handle(_, handle) => {
                if !handle.is_available(&element.bounds()) {
                    tracing::debug!("Handle {handle:?} not available on {}", element.id);
                    return false;
                }
                Mode::Resize(*handle)
            }
            PointerTarget::Rotation(_) => {
                let (cx, cy) = element.bounds().center();
                let zoom = settings.zoom();
                let center = (cx * zoom, cy * zoom);
                Mode::Rotate {
                    center,
                    initial_angle: pointer_angle(center, (event.x, event.y)),
                }
            }
        };

        tracing::debug!("Begin {mode:?} on element {}", element.id);
        self.gesture = Some(ActiveGesture {
            mode,
            pointer_start: (event.x, event.y),
            original: element.clone(),
            _capture: capture.map(CaptureGuard::acquire),
        });
        true
    }

    /// Apply a pointer-move. Returns the id of the updated element, or
    /// `None` when idle.
    pub fn update(
        &mut self,
        layout: &mut TemplateLayout,
        settings: &CanvasSettings,
        event: &PointerEvent,
    ) -> Option<ElementId> {
        let gesture = self.gesture.as_ref()?;
        let original = &gesture.original;
        let element = layout.get_element_mut(&original.id)?;

        let zoom = settings.zoom();
        let dx = (event.x - gesture.pointer_start.0) / zoom;
        let dy = (event.y - gesture.pointer_start.1) / zoom;
        let start = original.bounds();

        match gesture.mode {
            Mode::Drag => {
                element.transform.set_bounds(drag_bounds(start, dx, dy, settings));
            }
            Mode::Resize(handle) => {
                element
                    .transform
                    .set_bounds(resize_bounds(original.kind, start, handle, dx, dy));
            }
            Mode::Rotate {
                center,
                initial_angle,
            } => {
                let current = pointer_angle(center, (event.x, event.y));
                element.transform.rotation = rotated(
                    original.transform.rotation,
                    initial_angle,
                    current,
                    event.modifiers.shift,
                );
            }
        }

        tracing::trace!(
            "{} -> ({:.1}, {:.1}, {:.1}x{:.1}, {:.1} deg)",
            element.id,
            element.transform.x,
            element.transform.y,
            element.transform.width,
            element.transform.height,
            element.transform.rotation
        );
        Some(element.id.clone())
    }

    /// End the gesture on pointer-up (or pointer leaving the window).
    ///
    /// Returns `None` when no gesture was active.
    pub fn finish(&mut self, layout: &TemplateLayout) -> Option<GestureOutcome> {
        let gesture = self.gesture.take()?;
        let id = gesture.original.id.clone();
        let changed = layout
            .get_element(&id)
            .is_some_and(|now| now.transform != gesture.original.transform);

        if changed {
            tracing::debug!("Gesture on {id} committed");
            Some(GestureOutcome::Changed { element_id: id })
        } else {
            tracing::debug!("Gesture on {id} made no change");
            Some(GestureOutcome::Unchanged)
        }
    }

    /// Abort the gesture and restore the element exactly as it was at
    /// pointer-down. Returns `None` when no gesture was active.
    pub fn cancel(&mut self, layout: &mut TemplateLayout) -> Option<GestureOutcome> {
        let gesture = self.gesture.take()?;
        if let Some(element) = layout.get_element_mut(&gesture.original.id) {
            *element = gesture.original;
            tracing::debug!("Gesture on {} cancelled", element.id);
        }
        Some(GestureOutcome::Cancelled)
    }
}
