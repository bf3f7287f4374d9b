//! Template layout: the document edited by a session.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DesignerError, DesignerResult, ElementId, LayoutElement};

/// Default canvas background.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// A label template: canvas dimensions plus placed elements.
///
/// Element order carries no meaning; `zIndex` governs stacking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLayout {
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// Canvas background color as hex.
    #[serde(default = "default_background")]
    pub background_color: String,
    /// All elements on the canvas.
    #[serde(default)]
    elements: Vec<LayoutElement>,
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

impl TemplateLayout {
    /// Create a new empty layout with the given canvas size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background_color: default_background(),
            elements: Vec::new(),
        }
    }

    /// Add an element to the layout.
    pub fn add_element(&mut self, element: LayoutElement) -> ElementId {
        let id = element.id.clone();
        self.elements.push(element);
        id
    }

    /// Remove an element from the layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: &ElementId) -> DesignerResult<LayoutElement> {
        let index = self
            .elements
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| DesignerError::ElementNotFound(id.to_string()))?;
        Ok(self.elements.remove(index))
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: &ElementId) -> Option<&LayoutElement> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_element_mut(&mut self, id: &ElementId) -> Option<&mut LayoutElement> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    /// Whether an element with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get_element(id).is_some()
    }

    /// All elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    /// Elements other than `id`.
    pub fn siblings_of<'a>(
        &'a self,
        id: &'a ElementId,
    ) -> impl Iterator<Item = &'a LayoutElement> + 'a {
        self.elements.iter().filter(move |e| &e.id != id)
    }

    /// Highest z-index in use, if any element exists.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.transform.z_index).max()
    }

    /// Lowest z-index in use, if any element exists.
    #[must_use]
    pub fn min_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.transform.z_index).min()
    }

    /// Get the number of elements in the layout.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the layout is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Check the geometry model invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DesignerError::InvalidLayout`] for a non-positive canvas,
    /// non-finite or negative element geometry, non-positive element size,
    /// or duplicate element ids.
    pub fn validate(&self) -> DesignerResult<()> {
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(DesignerError::InvalidLayout(format!(
                "canvas size must be positive, got {}x{}",
                self.width, self.height
            )));
        }

        let mut seen = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !seen.insert(&element.id) {
                return Err(DesignerError::InvalidLayout(format!(
                    "duplicate element id {}",
                    element.id
                )));
            }
            let t = &element.transform;
            if ![t.x, t.y, t.width, t.height, t.rotation]
                .iter()
                .all(|v| v.is_finite())
            {
                return Err(DesignerError::InvalidLayout(format!(
                    "element {} has non-finite geometry",
                    element.id
                )));
            }
            if t.width <= 0.0 || t.height <= 0.0 {
                return Err(DesignerError::InvalidLayout(format!(
                    "element {} has non-positive size {}x{}",
                    element.id, t.width, t.height
                )));
            }
            if t.x < 0.0 || t.y < 0.0 {
                return Err(DesignerError::InvalidLayout(format!(
                    "element {} has negative position ({}, {})",
                    element.id, t.x, t.y
                )));
            }
        }
        Ok(())
    }

    /// Serialize the layout to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DesignerResult<String> {
        serde_json::to_string(self).map_err(DesignerError::Serialization)
    }

    /// Serialize the layout to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> DesignerResult<String> {
        serde_json::to_string_pretty(self).map_err(DesignerError::Serialization)
    }

    /// Deserialize and validate a layout from JSON.
    ///
    /// Rotations are normalized into `[0, 360)`. Anything else that breaks
    /// the geometry model is refused rather than repaired.
    ///
    /// # Errors
    ///
    /// Returns [`DesignerError::Serialization`] for malformed JSON and
    /// [`DesignerError::InvalidLayout`] for invariant violations.
    pub fn from_json(json: &str) -> DesignerResult<Self> {
        let mut layout: Self = serde_json::from_str(json).map_err(DesignerError::Serialization)?;
        if let Err(err) = layout.validate() {
            tracing::warn!("Rejected layout: {err}");
            return Err(err);
        }
        for element in &mut layout.elements {
            element.transform.rotation = crate::transform::normalize_rotation(element.transform.rotation);
        }
        Ok(layout)
    }
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self::new(400.0, 300.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, ElementKind};

    #[test]
    fn test_layout_add_remove() {
        let mut layout = TemplateLayout::new(400.0, 300.0);
        assert!(layout.is_empty());

        let id = layout.add_element(LayoutElement::new(ElementKind::Text));
        assert_eq!(layout.element_count(), 1);
        assert!(layout.get_element(&id).is_some());

        layout.remove_element(&id).expect("should remove");
        assert!(layout.is_empty());
        assert!(matches!(
            layout.remove_element(&id),
            Err(DesignerError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_from_json_accepts_storage_shape() {
        let json = r##"{
            "width": 400, "height": 300, "backgroundColor": "#f8f9fa",
            "elements": [
                {"id": "e1", "type": "barcode", "x": 10, "y": 10, "width": 160, "height": 60,
                 "rotation": -90, "zIndex": 2, "properties": {"dataField": "sku"}}
            ]
        }"##;
        let layout = TemplateLayout::from_json(json).expect("valid layout");
        assert_eq!(layout.background_color, "#f8f9fa");
        let element = layout.get_element(&ElementId::from("e1")).expect("e1");
        assert!((element.transform.rotation - 270.0).abs() < 1e-9);
        assert_eq!(element.transform.z_index, 2);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = TemplateLayout::from_json("{\"width\": 400").expect_err("malformed");
        assert!(matches!(err, DesignerError::Serialization(_)));

        let err = TemplateLayout::from_json(r#"{"width": 400, "height": 300, "elements": [{"id": "a", "type": "hexagon", "x": 0, "y": 0, "width": 1, "height": 1}]}"#)
            .expect_err("unknown type");
        assert!(matches!(err, DesignerError::Serialization(_)));
    }

    #[test]
    fn test_from_json_rejects_invariant_violations() {
        let negative = r#"{"width": 400, "height": 300, "elements": [{"id": "a", "type": "text", "x": -1, "y": 0, "width": 10, "height": 10}]}"#;
        assert!(matches!(
            TemplateLayout::from_json(negative),
            Err(DesignerError::InvalidLayout(_))
        ));

        let zero = r#"{"width": 400, "height": 300, "elements": [{"id": "a", "type": "text", "x": 0, "y": 0, "width": 0, "height": 10}]}"#;
        assert!(matches!(
            TemplateLayout::from_json(zero),
            Err(DesignerError::InvalidLayout(_))
        ));

        let dup = r#"{"width": 400, "height": 300, "elements": [
            {"id": "a", "type": "text", "x": 0, "y": 0, "width": 10, "height": 10},
            {"id": "a", "type": "line", "x": 0, "y": 0, "width": 10, "height": 10}]}"#;
        assert!(matches!(
            TemplateLayout::from_json(dup),
            Err(DesignerError::InvalidLayout(_))
        ));

        let canvas = r#"{"width": 0, "height": 300, "elements": []}"#;
        assert!(matches!(
            TemplateLayout::from_json(canvas),
            Err(DesignerError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_preserves_layout() {
        let mut layout = TemplateLayout::new(200.0, 100.0);
        layout.add_element(
            LayoutElement::new(ElementKind::QrCode)
                .with_bounds(Bounds::new(5.0, 5.0, 40.0, 40.0))
                .with_property("dataField", "url"),
        );
        let json = layout.to_json().expect("serialize");
        let back = TemplateLayout::from_json(&json).expect("deserialize");
        assert_eq!(back, layout);
    }

    #[test]
    fn test_max_z_index() {
        let mut layout = TemplateLayout::default();
        assert!(layout.max_z_index().is_none());
        layout.add_element(LayoutElement::new(ElementKind::Text).with_z_index(4));
        layout.add_element(LayoutElement::new(ElementKind::Text).with_z_index(-2));
        assert_eq!(layout.max_z_index(), Some(4));
        assert_eq!(layout.min_z_index(), Some(-2));
    }
}
