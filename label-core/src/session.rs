//! Editing session: the context object that owns a layout being designed.
//!
//! All mutation goes through the session so that exactly one component
//! writes at a time: the transform controller while a gesture is active,
//! the history while undoing or redoing, and the structural edit methods
//! otherwise. Structural edits, undo/redo and settings changes are ignored
//! while a gesture is in progress.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capture::PointerCapture;
use crate::event::{PointerEvent, PointerTarget};
use crate::guides::{compute_guides, GuideLine};
use crate::history::History;
use crate::selection::{self, Selection};
use crate::transform::{
    constrain_bounds, normalize_rotation, GestureOutcome, TransformController, TransformState,
};
use crate::{
    Bounds, CanvasSettings, DesignerError, DesignerResult, ElementId, ElementKind,
    LayoutElement, TemplateLayout,
};

/// Flags a toolbar needs to render its buttons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarState {
    /// Undo is available.
    pub can_undo: bool,
    /// Redo is available.
    pub can_redo: bool,
    /// Unsaved changes exist.
    pub is_dirty: bool,
    /// Number of selected elements.
    pub selected: usize,
    /// Current zoom factor.
    pub zoom: f64,
}

/// An isolated editing session over one template layout.
pub struct EditorSession {
    layout: TemplateLayout,
    settings: CanvasSettings,
    history: History,
    selection: Selection,
    controller: TransformController,
    capture: Option<Rc<dyn PointerCapture>>,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("layout", &self.layout)
            .field("settings", &self.settings)
            .field("history", &self.history)
            .field("selection", &self.selection)
            .field("controller", &self.controller)
            .field("capture", &self.capture.is_some())
            .finish()
    }
}

impl EditorSession {
    /// Open a session on `layout` with default settings.
    #[must_use]
    pub fn new(layout: TemplateLayout) -> Self {
        Self::with_settings(layout, CanvasSettings::default())
    }

    /// Open a session with explicit settings.
    #[must_use]
    pub fn with_settings(layout: TemplateLayout, settings: CanvasSettings) -> Self {
        Self {
            history: History::new(layout.clone()),
            layout,
            settings,
            selection: Selection::new(),
            controller: TransformController::new(),
            capture: None,
        }
    }

    /// Open a session from stored layout JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or violates the geometry model.
    pub fn from_json(json: &str) -> DesignerResult<Self> {
        TemplateLayout::from_json(json).map(Self::new)
    }

    /// Install the host's pointer capture, attached for each gesture.
    #[must_use]
    pub fn with_capture(mut self, capture: Rc<dyn PointerCapture>) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Bound the number of undo entries kept.
    #[must_use]
    pub fn with_history_limit(mut self, max_entries: usize) -> Self {
        self.history = History::with_max_entries(self.layout.clone(), max_entries);
        self
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// The current layout.
    #[must_use]
    pub const fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    /// An owned copy of the current layout for persistence.
    #[must_use]
    pub fn snapshot(&self) -> TemplateLayout {
        self.layout.clone()
    }

    /// Serialize the current layout.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DesignerResult<String> {
        self.layout.to_json()
    }

    /// Current canvas settings.
    #[must_use]
    pub const fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected elements, in selection order.
    pub fn selected_elements(&self) -> impl Iterator<Item = &LayoutElement> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.layout.get_element(id))
    }

    /// Transform controller state.
    #[must_use]
    pub fn transform_state(&self) -> TransformState {
        self.controller.state()
    }

    /// Undo/redo availability, dirty flag and zoom.
    #[must_use]
    pub fn toolbar_state(&self) -> ToolbarState {
        ToolbarState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            is_dirty: self.is_dirty(),
            selected: self.selection.len(),
            zoom: self.settings.zoom(),
        }
    }

    /// Guides for the primary selected element (or the element under an
    /// active gesture).
    #[must_use]
    pub fn guides(&self) -> Vec<GuideLine> {
        let active = self
            .controller
            .active_element()
            .or_else(|| self.selection.primary())
            .and_then(|id| self.layout.get_element(id));
        active.map_or_else(Vec::new, |element| {
            compute_guides(
                element,
                self.layout.elements(),
                self.layout.width,
                self.layout.height,
            )
        })
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    /// Resolve a pointer-down at the event position and start a gesture.
    ///
    /// Clicking an element selects it (Shift toggles it within the
    /// selection); clicking empty canvas clears the selection unless Shift
    /// is held. Returns what was hit.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> PointerTarget {
        if self.controller.is_active() {
            tracing::debug!("Ignoring pointer-down during active gesture");
            return PointerTarget::Canvas;
        }
        let target = selection::hit_test(
            &self.layout,
            &self.selection,
            &self.settings,
            event.x,
            event.y,
        );
        self.pointer_down_on(&target, event);
        target
    }

    /// Start a gesture on a target the host resolved itself.
    /// Returns whether a gesture started.
    pub fn pointer_down_on(&mut self, target: &PointerTarget, event: &PointerEvent) -> bool {
        if self.controller.is_active() {
            return false;
        }
        match target {
            PointerTarget::Canvas => {
                if !event.modifiers.shift {
                    self.selection.clear();
                }
                return false;
            }
            PointerTarget::Body(id) => {
                if event.modifiers.shift {
                    self.selection.select(&self.layout, id, true);
                } else if !self.selection.contains(id) {
                    self.selection.select(&self.layout, id, false);
                }
                if !self.selection.contains(id) {
                    return false;
                }
            }
            PointerTarget::Handle(id, _) | PointerTarget::Rotation(id) => {
                if !self.selection.contains(id) {
                    self.selection.select(&self.layout, id, false);
                }
            }
        }
        self.controller.begin(
            &self.layout,
            &self.settings,
            target,
            event,
            self.capture.clone(),
        )
    }

    /// Apply a pointer-move. Returns the guide lines to draw for drag and
    /// resize gestures; empty when idle or rotating.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> Vec<GuideLine> {
        let Some(id) = self.controller.update(&mut self.layout, &self.settings, event) else {
            return Vec::new();
        };
        if self.controller.state() == TransformState::Rotating {
            return Vec::new();
        }
        self.layout.get_element(&id).map_or_else(Vec::new, |element| {
            compute_guides(
                element,
                self.layout.elements(),
                self.layout.width,
                self.layout.height,
            )
        })
    }

    /// Finish the gesture at the event position. Returns whether a history
    /// entry was committed.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> bool {
        if !self.controller.is_active() {
            return false;
        }
        self.controller.update(&mut self.layout, &self.settings, event);
        self.end_gesture()
    }

    /// The pointer left the window or the host lost capture: end the
    /// gesture at its last position. Returns whether a history entry was
    /// committed.
    pub fn pointer_leave(&mut self) -> bool {
        self.end_gesture()
    }

    /// Abort the active gesture (Escape), restoring the pre-gesture state.
    /// Returns whether a gesture was cancelled.
    pub fn cancel_gesture(&mut self) -> bool {
        self.controller.cancel(&mut self.layout).is_some()
    }

    fn end_gesture(&mut self) -> bool {
        match self.controller.finish(&self.layout) {
            Some(GestureOutcome::Changed { element_id }) => {
                self.commit(&format!("transform {element_id}"));
                true
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select an element; see [`Selection::select`].
    pub fn select(&mut self, id: &ElementId, additive: bool) -> bool {
        if self.controller.is_active() {
            return false;
        }
        self.selection.select(&self.layout, id, additive)
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        if !self.controller.is_active() {
            self.selection.clear();
        }
    }

    // ------------------------------------------------------------------
    // Structural edits (one history entry each)
    // ------------------------------------------------------------------

    /// Add an element, repairing its geometry to satisfy the model. A
    /// clashing id is replaced with a fresh one. Returns the element id.
    pub fn add_element(&mut self, mut element: LayoutElement) -> Option<ElementId> {
        if self.blocked("add element") {
            return None;
        }
        if self.layout.contains(&element.id) {
            element.id = ElementId::new();
        }
        let bounds = constrain_bounds(element.kind, element.bounds());
        element.transform.set_bounds(bounds);
        element.transform.rotation = normalize_rotation(element.transform.rotation);

        let id = self.layout.add_element(element);
        self.commit(&format!("add {id}"));
        Some(id)
    }

    /// Create an element of `kind` at `(x, y)` on top of the stack and
    /// select it.
    pub fn insert(&mut self, kind: ElementKind, x: f64, y: f64) -> Option<ElementId> {
        let (width, height) = kind.default_size();
        let z = self.layout.max_z_index().map_or(0, |z| z.saturating_add(1));
        let element = LayoutElement::new(kind)
            .with_bounds(Bounds::new(x, y, width, height))
            .with_z_index(z);
        let id = self.add_element(element)?;
        self.selection.select(&self.layout, &id, false);
        Some(id)
    }

    /// Merge `changes` into an element's properties. A `null` value removes
    /// the key. Commits only when something changed.
    ///
    /// # Errors
    ///
    /// Returns [`DesignerError::ElementNotFound`] for an unknown id.
    pub fn update_properties(
        &mut self,
        id: &ElementId,
        changes: Map<String, Value>,
    ) -> DesignerResult<bool> {
        if self.blocked("update properties") {
            return Ok(false);
        }
        let element = self
            .layout
            .get_element_mut(id)
            .ok_or_else(|| DesignerError::ElementNotFound(id.to_string()))?;
        let before = element.properties.clone();
        for (key, value) in changes {
            if value.is_null() {
                element.properties.remove(&key);
            } else {
                element.properties.insert(key, value);
            }
        }
        if element.properties == before {
            return Ok(false);
        }
        self.commit(&format!("properties {id}"));
        Ok(true)
    }

    /// Set position and size from numeric input. The kind's constraints are
    /// applied. Commits only when something changed.
    ///
    /// # Errors
    ///
    /// Returns [`DesignerError::ElementNotFound`] for an unknown id.
    pub fn set_element_bounds(&mut self, id: &ElementId, bounds: Bounds) -> DesignerResult<bool> {
        if self.blocked("set bounds") {
            return Ok(false);
        }
        let element = self
            .layout
            .get_element_mut(id)
            .ok_or_else(|| DesignerError::ElementNotFound(id.to_string()))?;
        let constrained = constrain_bounds(element.kind, bounds);
        if element.bounds() == constrained {
            return Ok(false);
        }
        element.transform.set_bounds(constrained);
        self.commit(&format!("bounds {id}"));
        Ok(true)
    }

    /// Set rotation from numeric input, normalized into `[0, 360)`.
    ///
    /// # Errors
    ///
    /// Returns [`DesignerError::ElementNotFound`] for an unknown id.
    pub fn set_element_rotation(&mut self, id: &ElementId, degrees: f64) -> DesignerResult<bool> {
        if self.blocked("set rotation") {
            return Ok(false);
        }
        let element = self
            .layout
            .get_element_mut(id)
            .ok_or_else(|| DesignerError::ElementNotFound(id.to_string()))?;
        let rotation = normalize_rotation(degrees);
        if (element.transform.rotation - rotation).abs() < f64::EPSILON {
            return Ok(false);
        }
        element.transform.rotation = rotation;
        self.commit(&format!("rotation {id}"));
        Ok(true)
    }

    /// Delete every selected element. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        if self.blocked("delete") {
            return 0;
        }
        let removed = self.selection.delete_selected(&mut self.layout).len();
        if removed > 0 {
            self.commit(&format!("delete {removed}"));
        }
        removed
    }

    /// Duplicate one element and select the copy.
    pub fn duplicate(&mut self, id: &ElementId) -> Option<ElementId> {
        if self.blocked("duplicate") {
            return None;
        }
        let copy = selection::duplicate_element(&mut self.layout, id)?;
        self.selection.select(&self.layout, &copy, false);
        self.commit(&format!("duplicate {id}"));
        Some(copy)
    }

    /// Duplicate every selected element as one history entry and select the
    /// copies.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        if self.blocked("duplicate") {
            return Vec::new();
        }
        let sources = self.selection.ids().to_vec();
        let copies: Vec<_> = sources
            .iter()
            .filter_map(|id| selection::duplicate_element(&mut self.layout, id))
            .collect();
        if copies.is_empty() {
            return copies;
        }
        self.selection.clear();
        for copy in &copies {
            self.selection.select(&self.layout, copy, true);
        }
        self.commit(&format!("duplicate {}", copies.len()));
        copies
    }

    /// Raise an element above all others.
    pub fn bring_to_front(&mut self, id: &ElementId) -> bool {
        if self.blocked("bring to front") || !selection::bring_to_front(&mut self.layout, id) {
            return false;
        }
        self.commit(&format!("front {id}"));
        true
    }

    /// Lower an element below all others.
    pub fn send_to_back(&mut self, id: &ElementId) -> bool {
        if self.blocked("send to back") || !selection::send_to_back(&mut self.layout, id) {
            return false;
        }
        self.commit(&format!("back {id}"));
        true
    }

    /// Change the canvas size.
    ///
    /// # Errors
    ///
    /// Returns [`DesignerError::InvalidLayout`] for a non-positive size.
    pub fn resize_canvas(&mut self, width: f64, height: f64) -> DesignerResult<bool> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(DesignerError::InvalidLayout(format!(
                "canvas size must be positive, got {width}x{height}"
            )));
        }
        if self.blocked("resize canvas") {
            return Ok(false);
        }
        if (self.layout.width - width).abs() < f64::EPSILON
            && (self.layout.height - height).abs() < f64::EPSILON
        {
            return Ok(false);
        }
        self.layout.width = width;
        self.layout.height = height;
        self.commit("canvas size");
        Ok(true)
    }

    /// Change the canvas background color.
    pub fn set_background(&mut self, color: &str) -> bool {
        if self.blocked("background") || self.layout.background_color == color {
            return false;
        }
        self.layout.background_color = color.to_string();
        self.commit("background");
        true
    }

    // ------------------------------------------------------------------
    // Settings (not part of history)
    // ------------------------------------------------------------------

    /// Set the zoom factor (clamped).
    pub fn set_zoom(&mut self, zoom: f64) {
        if !self.blocked("zoom") {
            self.settings.set_zoom(zoom);
        }
    }

    /// Zoom in one step.
    pub fn zoom_in(&mut self) {
        if !self.blocked("zoom") {
            self.settings.zoom_in();
        }
    }

    /// Zoom out one step.
    pub fn zoom_out(&mut self) {
        if !self.blocked("zoom") {
            self.settings.zoom_out();
        }
    }

    /// Enable or disable snap-to-grid.
    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        if !self.blocked("snap") {
            self.settings.snap_to_grid = enabled;
        }
    }

    /// Set the grid size; non-positive sizes are ignored.
    pub fn set_grid_size(&mut self, size: f64) -> bool {
        !self.blocked("grid size") && self.settings.set_grid_size(size)
    }

    /// Toggle grid visibility.
    pub fn toggle_grid(&mut self) {
        if !self.blocked("grid") {
            self.settings.show_grid = !self.settings.show_grid;
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Undo the last committed action.
    pub fn undo(&mut self) -> bool {
        if self.blocked("undo") {
            return false;
        }
        match self.history.undo() {
            Some(state) => {
                self.layout = state.clone();
                self.selection.retain_existing(&self.layout);
                true
            }
            None => false,
        }
    }

    /// Redo the last undone action.
    pub fn redo(&mut self) -> bool {
        if self.blocked("redo") {
            return false;
        }
        match self.history.redo() {
            Some(state) => {
                self.layout = state.clone();
                self.selection.retain_existing(&self.layout);
                true
            }
            None => false,
        }
    }

    /// Whether undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether the layout differs from the last persisted state.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.history.is_dirty()
    }

    /// Record that the current layout has been persisted.
    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    /// The underlying history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    fn commit(&mut self, action: &str) {
        tracing::debug!("Commit: {action}");
        self.history.commit(self.layout.clone());
    }

    fn blocked(&self, action: &str) -> bool {
        let active = self.controller.is_active();
        if active {
            tracing::debug!("Ignoring {action} during active gesture");
        }
        active
    }
}
