//! Selection tracking, stacking order, and hit testing.

use serde::{Deserialize, Serialize};

use crate::event::{PointerTarget, ResizeHandle};
use crate::{CanvasSettings, ElementId, LayoutElement, TemplateLayout};

/// Offset applied to duplicated elements, in design pixels.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Side length of a resize handle, in viewport pixels.
pub const HANDLE_SIZE: f64 = 8.0;

/// Distance of the rotation handle above the top edge, in viewport pixels.
pub const ROTATION_HANDLE_OFFSET: f64 = 24.0;

/// Hit radius of the rotation handle, in viewport pixels.
pub const ROTATION_HANDLE_RADIUS: f64 = 6.0;

/// Ordered set of selected element ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`.
    ///
    /// Non-additive selection replaces the current set; additive selection
    /// toggles `id` in or out. Unknown ids are ignored. Returns whether the
    /// selection changed.
    pub fn select(&mut self, layout: &TemplateLayout, id: &ElementId, additive: bool) -> bool {
        if !layout.contains(id) {
            return false;
        }
        if additive {
            if let Some(pos) = self.ids.iter().position(|s| s == id) {
                self.ids.remove(pos);
            } else {
                self.ids.push(id.clone());
            }
            true
        } else if self.ids.len() == 1 && &self.ids[0] == id {
            false
        } else {
            self.ids = vec![id.clone()];
            true
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Remove every selected element from `layout` and empty the selection.
    /// Returns the removed elements; empty when nothing was selected.
    pub fn delete_selected(&mut self, layout: &mut TemplateLayout) -> Vec<LayoutElement> {
        let removed: Vec<_> = self
            .ids
            .drain(..)
            .filter_map(|id| layout.remove_element(&id).ok())
            .collect();
        if !removed.is_empty() {
            tracing::debug!("Deleted {} element(s)", removed.len());
        }
        removed
    }

    /// Drop ids that no longer exist in `layout`.
    pub fn retain_existing(&mut self, layout: &TemplateLayout) {
        self.ids.retain(|id| layout.contains(id));
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.ids.contains(id)
    }

    /// Selected ids in selection order.
    #[must_use]
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    /// Most recently selected id.
    #[must_use]
    pub fn primary(&self) -> Option<&ElementId> {
        self.ids.last()
    }

    /// Number of selected elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Clone `id` with a fresh id, offset position, and a z-index above every
/// existing element. Returns the new id, or `None` if `id` is unknown or no
/// z-index above the current top exists.
pub fn duplicate_element(layout: &mut TemplateLayout, id: &ElementId) -> Option<ElementId> {
    let source = layout.get_element(id)?;
    let top = layout.max_z_index().unwrap_or(source.transform.z_index);
    let Some(z_index) = top.checked_add(1) else {
        tracing::warn!("Cannot duplicate {id}: z-index {top} is already the maximum");
        return None;
    };

    let mut copy = source.clone();
    copy.id = ElementId::new();
    copy.transform.x += DUPLICATE_OFFSET;
    copy.transform.y += DUPLICATE_OFFSET;
    copy.transform.z_index = z_index;

    tracing::debug!("Duplicated {id} as {}", copy.id);
    Some(layout.add_element(copy))
}

/// Raise `id` above every other element. Returns whether anything changed.
pub fn bring_to_front(layout: &mut TemplateLayout, id: &ElementId) -> bool {
    let Some(z) = layout.get_element(id).map(|e| e.transform.z_index) else {
        return false;
    };
    let raised = layout
        .siblings_of(id)
        .map(|e| e.transform.z_index)
        .max()
        .filter(|top| *top >= z)
        .and_then(|top| top.checked_add(1));
    set_z_index(layout, id, raised)
}

/// Lower `id` below every other element. Returns whether anything changed.
pub fn send_to_back(layout: &mut TemplateLayout, id: &ElementId) -> bool {
    let Some(z) = layout.get_element(id).map(|e| e.transform.z_index) else {
        return false;
    };
    let lowered = layout
        .siblings_of(id)
        .map(|e| e.transform.z_index)
        .min()
        .filter(|bottom| *bottom <= z)
        .and_then(|bottom| bottom.checked_sub(1));
    set_z_index(layout, id, lowered)
}

fn set_z_index(layout: &mut TemplateLayout, id: &ElementId, z_index: Option<i32>) -> bool {
    match (z_index, layout.get_element_mut(id)) {
        (Some(z), Some(element)) if element.transform.z_index != z => {
            element.transform.z_index = z;
            true
        }
        _ => false,
    }
}

/// Elements in paint order: ascending z-index, ties in insertion order.
#[must_use]
pub fn paint_order(layout: &TemplateLayout) -> Vec<&LayoutElement> {
    let mut ordered: Vec<_> = layout.elements().iter().collect();
    ordered.sort_by_key(|e| e.transform.z_index);
    ordered
}

/// Topmost element containing the canvas point, if any.
#[must_use]
pub fn topmost_at(layout: &TemplateLayout, x: f64, y: f64) -> Option<&LayoutElement> {
    paint_order(layout)
        .into_iter()
        .rev()
        .find(|e| e.contains_point(x, y))
}

/// Resolve a pointer-down at viewport `(x, y)`.
///
/// Handles of selected elements take priority over bodies; among bodies the
/// topmost z-index wins.
#[must_use]
pub fn hit_test(
    layout: &TemplateLayout,
    selection: &Selection,
    settings: &CanvasSettings,
    x: f64,
    y: f64,
) -> PointerTarget {
    let zoom = settings.zoom();
    let (cx, cy) = (x / zoom, y / zoom);
    let half = HANDLE_SIZE / 2.0 / zoom;

    for element in paint_order(layout).into_iter().rev() {
        if !selection.contains(&element.id) {
            continue;
        }
        let (lx, ly) = element.to_local(cx, cy);
        let bounds = element.bounds();

        let (rx, ry) = (bounds.center().0, bounds.y - ROTATION_HANDLE_OFFSET / zoom);
        if (lx - rx).hypot(ly - ry) <= ROTATION_HANDLE_RADIUS / zoom {
            return PointerTarget::Rotation(element.id.clone());
        }

        for handle in ResizeHandle::ALL {
            if !handle.is_available(&bounds) {
                continue;
            }
            let (hx, hy) = handle.anchor(&bounds);
            if (lx - hx).abs() <= half && (ly - hy).abs() <= half {
                return PointerTarget::Handle(element.id.clone(), handle);
            }
        }
    }

    topmost_at(layout, cx, cy).map_or(PointerTarget::Canvas, |e| PointerTarget::Body(e.id.clone()))
}
