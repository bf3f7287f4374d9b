//! # Label Designer Core
//!
//! Headless editing engine for label templates: a layout of positioned
//! elements that a pointer can drag, resize and rotate, with alignment
//! guides, selection and undo/redo.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                EditorSession                │
//! ├─────────────────────────────────────────────┤
//! │  Layout Model    │  Transform Controller    │
//! │  - Elements      │  - Drag / resize / rotate│
//! │  - Kind limits   │  - Grid + rotation snap  │
//! │  - JSON contract │  - Pointer capture guard │
//! ├─────────────────────────────────────────────┤
//! │  Selection       │  History     │  Guides   │
//! │  - Hit testing   │  - Undo/redo │  - Center │
//! │  - Z-order       │  - Dirty     │  - Edges  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rendering and document generation live outside this crate; see
//! [`data::LabelRenderer`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod data;
pub mod element;
pub mod error;
pub mod event;
pub mod guides;
pub mod history;
pub mod layout;
pub mod selection;
pub mod session;
pub mod settings;
pub mod transform;

pub use capture::{CaptureGuard, PointerCapture};
pub use data::{DataField, FormData, GenerateRequest, LabelRenderer, OutputFormat};
pub use element::{
    AspectPolicy, Bounds, ElementId, ElementKind, KindConstraints, LayoutElement, Transform,
};
pub use error::{DesignerError, DesignerResult};
pub use event::{KeyModifiers, PointerEvent, PointerTarget, ResizeHandle};
pub use guides::{GuideKind, GuideLine, Orientation};
pub use history::History;
pub use layout::TemplateLayout;
pub use selection::Selection;
pub use session::{EditorSession, ToolbarState};
pub use settings::CanvasSettings;
pub use transform::{GestureOutcome, TransformController, TransformState};

/// Label designer core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
