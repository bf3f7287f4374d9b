//! Data contract with the label generation step.
//!
//! Dynamic elements name a `dataField` in their properties; at generation
//! time a form supplies a value for each field and the layout plus data is
//! handed to an external rendering service.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DesignerError, DesignerResult, ElementKind, TemplateLayout};

/// Form data keyed by data field.
pub type FormData = HashMap<String, String>;

/// Tag shown for dynamic images that have no `dataField`.
pub const DYNAMIC_IMAGE_TAG: &str = "Dynamic Image";

/// A form field required to fill the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataField {
    /// Key in the form data map.
    pub data_field: String,
    /// Human-readable label.
    pub tag: String,
}

/// Collect the form fields the layout needs, in first-seen order.
///
/// The `tag` property labels a field and falls back to its name. Dynamic
/// images without a `dataField` are keyed by their element id. When several
/// elements share a field the last tag wins.
#[must_use]
pub fn data_fields(layout: &TemplateLayout) -> Vec<DataField> {
    let mut fields: Vec<DataField> = Vec::new();
    for element in layout.elements() {
        let tag_prop = element.properties.get("tag").and_then(|v| v.as_str());
        let (key, tag) = if let Some(field) = element.data_field() {
            (field.to_string(), tag_prop.unwrap_or(field).to_string())
        } else if element.kind == ElementKind::DynamicImage {
            (
                element.id.to_string(),
                tag_prop.unwrap_or(DYNAMIC_IMAGE_TAG).to_string(),
            )
        } else {
            continue;
        };

        match fields.iter_mut().find(|f| f.data_field == key) {
            Some(existing) => existing.tag = tag,
            None => fields.push(DataField {
                data_field: key,
                tag,
            }),
        }
    }
    fields
}

/// Distinct `dataField` values, in first-seen order.
#[must_use]
pub fn required_fields(layout: &TemplateLayout) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for field in layout.elements().iter().filter_map(|e| e.data_field()) {
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }
    fields
}

/// Placeholder values for previewing a layout without real data.
#[must_use]
pub fn sample_data(layout: &TemplateLayout) -> BTreeMap<String, String> {
    layout
        .elements()
        .iter()
        .filter_map(|element| {
            let sample = match element.kind {
                ElementKind::Barcode | ElementKind::ProductCode => "123456789",
                ElementKind::QrCode => "Sample QR Data",
                ElementKind::DynamicText | ElementKind::Text => "Sample Text",
                _ => "Sample Data",
            };
            element
                .data_field()
                .map(|field| (field.to_string(), sample.to_string()))
        })
        .collect()
}

/// Fields from [`data_fields`] whose value is absent or blank.
#[must_use]
pub fn missing_fields(layout: &TemplateLayout, data: &FormData) -> Vec<DataField> {
    data_fields(layout)
        .into_iter()
        .filter(|f| data.get(&f.data_field).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

/// Output document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PDF document.
    #[default]
    Pdf,
}

/// Request sent to the rendering service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Stored template id.
    pub template_id: i64,
    /// Layout serialized as JSON.
    pub layout_json: String,
    /// Form values keyed by data field.
    pub data: FormData,
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl GenerateRequest {
    /// Build a request for `layout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout cannot be serialized.
    pub fn new(template_id: i64, layout: &TemplateLayout, data: FormData) -> DesignerResult<Self> {
        Ok(Self {
            template_id,
            layout_json: layout.to_json()?,
            data,
            format: OutputFormat::default(),
        })
    }

    /// Ensure every field the layout needs has a value.
    ///
    /// # Errors
    ///
    /// Returns the load error if the embedded layout JSON is invalid, or
    /// [`DesignerError::Render`] naming the missing fields.
    pub fn check_complete(&self) -> DesignerResult<()> {
        let layout = TemplateLayout::from_json(&self.layout_json)?;
        let missing = missing_fields(&layout, &self.data);
        if missing.is_empty() {
            Ok(())
        } else {
            let names: Vec<_> = missing.iter().map(|f| f.data_field.as_str()).collect();
            Err(DesignerError::Render(format!(
                "missing values for {}",
                names.join(", ")
            )))
        }
    }
}

/// External service that turns a layout and data into a document.
#[async_trait(?Send)]
pub trait LabelRenderer {
    /// Render the request, returning the document bytes.
    async fn generate(&self, request: &GenerateRequest) -> DesignerResult<Vec<u8>>;
}
