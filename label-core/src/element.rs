//! Layout elements - the building blocks of a label template.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for an element.
///
/// Layouts loaded from storage may carry arbitrary string ids; ids minted by
/// the designer are UUID v4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of element types a label can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Static text.
    #[serde(rename = "text")]
    Text,
    /// Text filled from form data at generation time.
    #[serde(rename = "dynamic-text")]
    DynamicText,
    /// Linear barcode.
    #[serde(rename = "barcode")]
    Barcode,
    /// QR code.
    #[serde(rename = "qrcode")]
    QrCode,
    /// Product code text.
    #[serde(rename = "product-code")]
    ProductCode,
    /// Static image.
    #[serde(rename = "image")]
    Image,
    /// Image supplied at generation time.
    #[serde(rename = "dynamic-image")]
    DynamicImage,
    /// Logo image.
    #[serde(rename = "logo")]
    Logo,
    /// Filled rectangle.
    #[serde(rename = "rectangle")]
    Rectangle,
    /// Horizontal rule.
    #[serde(rename = "line")]
    Line,
}

/// How an element type constrains its aspect ratio while resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectPolicy {
    /// Width and height vary independently.
    Free,
    /// Width always equals height.
    Square,
}

/// Per-type geometric constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindConstraints {
    /// Minimum width in design pixels.
    pub min_width: f64,
    /// Minimum height in design pixels.
    pub min_height: f64,
    /// Aspect ratio policy.
    pub aspect: AspectPolicy,
}

impl KindConstraints {
    const fn free(min_width: f64, min_height: f64) -> Self {
        Self {
            min_width,
            min_height,
            aspect: AspectPolicy::Free,
        }
    }
}

impl ElementKind {
    /// Every element kind, in toolbar order.
    pub const ALL: [Self; 10] = [
        Self::Text,
        Self::DynamicText,
        Self::Barcode,
        Self::QrCode,
        Self::ProductCode,
        Self::Image,
        Self::DynamicImage,
        Self::Logo,
        Self::Rectangle,
        Self::Line,
    ];

    /// Geometric constraints applied by the transform controller.
    #[must_use]
    pub const fn constraints(self) -> KindConstraints {
        match self {
            Self::Text | Self::DynamicText => KindConstraints::free(20.0, 15.0),
            Self::ProductCode => KindConstraints::free(30.0, 12.0),
            Self::Barcode => KindConstraints::free(80.0, 30.0),
            Self::QrCode => KindConstraints {
                min_width: 30.0,
                min_height: 30.0,
                aspect: AspectPolicy::Square,
            },
            Self::Image | Self::DynamicImage | Self::Logo => KindConstraints::free(20.0, 20.0),
            Self::Rectangle => KindConstraints::free(10.0, 10.0),
            Self::Line => KindConstraints::free(20.0, 1.0),
        }
    }

    /// Whether the element is bound to form data at generation time.
    #[must_use]
    pub const fn is_dynamic(self) -> bool {
        matches!(
            self,
            Self::DynamicText | Self::DynamicImage | Self::Barcode | Self::QrCode | Self::ProductCode
        )
    }

    /// Wire name used in layout JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::DynamicText => "dynamic-text",
            Self::Barcode => "barcode",
            Self::QrCode => "qrcode",
            Self::ProductCode => "product-code",
            Self::Image => "image",
            Self::DynamicImage => "dynamic-image",
            Self::Logo => "logo",
            Self::Rectangle => "rectangle",
            Self::Line => "line",
        }
    }

    /// Size given to a freshly added element of this kind.
    #[must_use]
    pub const fn default_size(self) -> (f64, f64) {
        match self {
            Self::Text | Self::DynamicText => (120.0, 30.0),
            Self::ProductCode => (100.0, 24.0),
            Self::Barcode => (160.0, 60.0),
            Self::QrCode => (80.0, 80.0),
            Self::Image | Self::DynamicImage => (100.0, 100.0),
            Self::Logo => (80.0, 80.0),
            Self::Rectangle => (100.0, 60.0),
            Self::Line => (120.0, 2.0),
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned box in canvas space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// X position (pixels from left).
    pub x: f64,
    /// Y position (pixels from top).
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Bounds {
    /// Create bounds from position and size.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Position, size, rotation and stacking of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position (pixels from left).
    pub x: f64,
    /// Y position (pixels from top).
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Rotation in degrees, `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Z-index for layering.
    #[serde(default, rename = "zIndex")]
    pub z_index: i32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            z_index: 0,
        }
    }
}

impl Transform {
    /// The axis-aligned box, ignoring rotation.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Replace position and size, keeping rotation and z-index.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
    }
}

/// A placed element with its type, geometry and type-specific properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    /// Unique identifier.
    pub id: ElementId,
    /// Element type.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Position, size, rotation and z-index.
    #[serde(flatten)]
    pub transform: Transform,
    /// Open key/value bag (font size, colors, `dataField`, ...).
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl LayoutElement {
    /// Create a new element of the given kind with its default size at the origin.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id: ElementId::new(),
            kind,
            transform: Transform {
                width,
                height,
                ..Transform::default()
            },
            properties: Map::new(),
        }
    }

    /// Set the element id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set position and size.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.transform.set_bounds(bounds);
        self
    }

    /// Set the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.transform.z_index = z_index;
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.transform.rotation = degrees;
        self
    }

    /// Set a single property.
    #[must_use]
    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Position and size, ignoring rotation.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.transform.bounds()
    }

    /// The `dataField` property, if it is a non-empty string.
    #[must_use]
    pub fn data_field(&self) -> Option<&str> {
        self.properties
            .get("dataField")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Map a canvas point into the element's unrotated frame.
    #[must_use]
    pub fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.bounds().center();
        let theta = -self.transform.rotation.to_radians();
        let (sin, cos) = theta.sin_cos();
        let (dx, dy) = (x - cx, y - cy);
        (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
    }

    /// Check if a point (in canvas coordinates) is within this element,
    /// honoring its rotation.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let (lx, ly) = self.to_local(x, y);
        let b = self.bounds();
        lx >= b.x && lx <= b.right() && ly >= b.y && ly <= b.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names_roundtrip() {
        for kind in ElementKind::ALL {
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let back: ElementKind = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_constraint_table() {
        let barcode = ElementKind::Barcode.constraints();
        assert!((barcode.min_width - 80.0).abs() < f64::EPSILON);
        assert!((barcode.min_height - 30.0).abs() < f64::EPSILON);
        assert_eq!(ElementKind::QrCode.constraints().aspect, AspectPolicy::Square);
        assert!((ElementKind::Line.constraints().min_height - 1.0).abs() < f64::EPSILON);
        assert_eq!(ElementKind::Rectangle.constraints().aspect, AspectPolicy::Free);
    }

    #[test]
    fn test_dynamic_kinds() {
        let dynamic: Vec<_> = ElementKind::ALL.into_iter().filter(|k| k.is_dynamic()).collect();
        assert_eq!(
            dynamic,
            [
                ElementKind::DynamicText,
                ElementKind::Barcode,
                ElementKind::QrCode,
                ElementKind::ProductCode,
                ElementKind::DynamicImage,
            ]
        );
    }

    #[test]
    fn test_element_json_is_flat() {
        let element = LayoutElement::new(ElementKind::QrCode)
            .with_id("e1")
            .with_bounds(Bounds::new(10.0, 20.0, 40.0, 40.0))
            .with_z_index(3)
            .with_property("dataField", "sku");
        let value = serde_json::to_value(&element).expect("serialize");
        assert_eq!(value["id"], "e1");
        assert_eq!(value["type"], "qrcode");
        assert_eq!(value["x"], 10.0);
        assert_eq!(value["zIndex"], 3);
        assert_eq!(value["properties"]["dataField"], "sku");
    }

    #[test]
    fn test_missing_rotation_and_z_default_to_zero() {
        let json = r#"{"id":"a","type":"line","x":1,"y":2,"width":30,"height":2}"#;
        let element: LayoutElement = serde_json::from_str(json).expect("deserialize");
        assert!(element.transform.rotation.abs() < f64::EPSILON);
        assert_eq!(element.transform.z_index, 0);
        assert!(element.properties.is_empty());
    }

    #[test]
    fn test_contains_point_respects_rotation() {
        let element = LayoutElement::new(ElementKind::Rectangle)
            .with_bounds(Bounds::new(0.0, 40.0, 100.0, 20.0))
            .with_rotation(90.0);
        // Rotated 90 degrees about (50, 50): now spans x 40..60, y 0..100.
        assert!(element.contains_point(50.0, 5.0));
        assert!(!element.contains_point(5.0, 50.0));
    }

    #[test]
    fn test_data_field_ignores_empty() {
        let element = LayoutElement::new(ElementKind::Barcode).with_property("dataField", "");
        assert!(element.data_field().is_none());
    }
}
