//! Command implementations.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use label_core::data::{data_fields, sample_data};
use label_core::guides::{compute_guides, dedup};
use label_core::selection::paint_order;
use label_core::transform::snap_rotation;
use label_core::{
    CanvasSettings, DesignerError, EditorSession, ElementId, PointerEvent, PointerTarget,
    ResizeHandle, TemplateLayout,
};

use crate::{Command, DesignerConfig};

/// Run the configured command and return its report.
///
/// Edits print the resulting layout JSON, or write it to the output file
/// and report the path.
///
/// # Errors
///
/// Returns an error if the layout cannot be read or parsed, the element does
/// not exist, or the edit cannot be applied.
pub fn run(config: DesignerConfig) -> anyhow::Result<String> {
    let settings = config.settings;
    match config.command {
        Command::Inspect { layout } => inspect(&load(&layout)?),
        Command::Fields { layout, sample } => fields(&load(&layout)?, sample),
        Command::Guides { layout, id } => guides(&load(&layout)?, &ElementId::from(id)),
        Command::Drag {
            layout,
            id,
            dx,
            dy,
            output,
        } => {
            let mut session = open(&layout, settings)?;
            drag(&mut session, &ElementId::from(id), dx, dy)?;
            emit(&session, output.as_deref())
        }
        Command::Resize {
            layout,
            id,
            handle,
            dx,
            dy,
            output,
        } => {
            let mut session = open(&layout, settings)?;
            resize(&mut session, &ElementId::from(id), handle, dx, dy)?;
            emit(&session, output.as_deref())
        }
        Command::Rotate {
            layout,
            id,
            degrees,
            snap,
            output,
        } => {
            let mut session = open(&layout, settings)?;
            let degrees = if snap { snap_rotation(degrees) } else { degrees };
            session.set_element_rotation(&ElementId::from(id), degrees)?;
            emit(&session, output.as_deref())
        }
    }
}

fn load(path: &Path) -> anyhow::Result<TemplateLayout> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let layout = TemplateLayout::from_json(&json)
        .with_context(|| format!("Failed to load layout from {}", path.display()))?;
    tracing::info!(
        "Loaded {} ({} elements)",
        path.display(),
        layout.element_count()
    );
    Ok(layout)
}

fn open(path: &Path, settings: CanvasSettings) -> anyhow::Result<EditorSession> {
    Ok(EditorSession::with_settings(load(path)?, settings))
}

fn emit(session: &EditorSession, output: Option<&Path>) -> anyhow::Result<String> {
    let json = session.layout().to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
            Ok(format!("Wrote {}", path.display()))
        }
        None => Ok(json),
    }
}

fn inspect(layout: &TemplateLayout) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "Canvas {}x{} background {}",
        layout.width, layout.height, layout.background_color
    )?;
    writeln!(out, "{} elements (bottom to top):", layout.element_count())?;
    for element in paint_order(layout) {
        let t = &element.transform;
        write!(
            out,
            "  {:<36} {:<14} at ({}, {}) size {}x{} rot {} z {}",
            element.id.as_str(),
            element.kind.as_str(),
            t.x,
            t.y,
            t.width,
            t.height,
            t.rotation,
            t.z_index
        )?;
        if element.kind.is_dynamic() {
            match element.data_field() {
                Some(field) => write!(out, " [field: {field}]")?,
                None => write!(out, " [unbound]")?,
            }
        }
        writeln!(out)?;
    }
    Ok(out)
}

fn fields(layout: &TemplateLayout, sample: bool) -> anyhow::Result<String> {
    if sample {
        return Ok(serde_json::to_string_pretty(&sample_data(layout))?);
    }
    let mut out = String::new();
    for field in data_fields(layout) {
        writeln!(out, "{}\t{}", field.data_field, field.tag)?;
    }
    Ok(out)
}

fn guides(layout: &TemplateLayout, id: &ElementId) -> anyhow::Result<String> {
    let element = layout
        .get_element(id)
        .ok_or_else(|| DesignerError::ElementNotFound(id.to_string()))?;
    let lines = dedup(&compute_guides(
        element,
        layout.elements(),
        layout.width,
        layout.height,
    ));
    Ok(serde_json::to_string_pretty(&lines)?)
}

/// Replay a body drag from the element's center.
fn drag(session: &mut EditorSession, id: &ElementId, dx: f64, dy: f64) -> anyhow::Result<()> {
    let (cx, cy) = element_bounds(session, id)?.center();
    replay(session, &PointerTarget::Body(id.clone()), (cx, cy), dx, dy)
}

/// Replay a handle drag from the handle's anchor.
fn resize(
    session: &mut EditorSession,
    id: &ElementId,
    handle: ResizeHandle,
    dx: f64,
    dy: f64,
) -> anyhow::Result<()> {
    let bounds = element_bounds(session, id)?;
    if !handle.is_available(&bounds) {
        anyhow::bail!("Handle {handle:?} is not offered at {}x{}", bounds.width, bounds.height);
    }
    let anchor = handle.anchor(&bounds);
    replay(session, &PointerTarget::Handle(id.clone(), handle), anchor, dx, dy)
}

fn replay(
    session: &mut EditorSession,
    target: &PointerTarget,
    start: (f64, f64),
    dx: f64,
    dy: f64,
) -> anyhow::Result<()> {
    let zoom = session.settings().zoom();
    let (sx, sy) = (start.0 * zoom, start.1 * zoom);
    if !session.pointer_down_on(target, &PointerEvent::at(sx, sy)) {
        anyhow::bail!("Could not start gesture on {target:?}");
    }
    let end = PointerEvent::at(sx + dx * zoom, sy + dy * zoom);
    session.pointer_move(&end);
    if session.pointer_up(&end) {
        tracing::info!("Applied {:?}", session.transform_state());
    } else {
        tracing::info!("Gesture made no change");
    }
    Ok(())
}

fn element_bounds(session: &EditorSession, id: &ElementId) -> anyhow::Result<label_core::Bounds> {
    Ok(session
        .layout()
        .get_element(id)
        .ok_or_else(|| DesignerError::ElementNotFound(id.to_string()))?
        .bounds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use label_core::{Bounds, ElementKind, LayoutElement};
    use std::path::PathBuf;

    fn write_layout(dir: &tempfile::TempDir) -> PathBuf {
        let mut layout = TemplateLayout::new(400.0, 300.0);
        layout.add_element(
            LayoutElement::new(ElementKind::Barcode)
                .with_id("bc")
                .with_bounds(Bounds::new(100.0, 100.0, 120.0, 60.0))
                .with_property("dataField", "sku"),
        );
        layout.add_element(
            LayoutElement::new(ElementKind::Text)
                .with_id("title")
                .with_bounds(Bounds::new(102.0, 20.0, 120.0, 30.0)),
        );
        let path = dir.path().join("layout.json");
        std::fs::write(&path, layout.to_json().expect("serialize")).expect("write");
        path
    }

    fn reload(path: &Path) -> TemplateLayout {
        TemplateLayout::from_json(&std::fs::read_to_string(path).expect("read")).expect("parse")
    }

    #[test]
    fn test_drag_with_grid_writes_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = write_layout(&dir);
        let output = dir.path().join("out.json");

        let settings = CanvasSettings::default().with_snap_to_grid(true, 10.0);
        let config = DesignerConfig {
            settings,
            command: Command::Drag {
                layout,
                id: "bc".into(),
                dx: 13.0,
                dy: -4.0,
                output: Some(output.clone()),
            },
        };
        let report = run(config).expect("run");
        assert!(report.starts_with("Wrote"));

        let moved = reload(&output);
        let b = moved.get_element(&ElementId::from("bc")).expect("bc").bounds();
        assert_eq!(b, Bounds::new(110.0, 100.0, 120.0, 60.0));
    }

    #[test]
    fn test_resize_at_zoom_prints_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = write_layout(&dir);
        let config = DesignerConfig {
            settings: CanvasSettings::default().with_zoom(2.0),
            command: Command::Resize {
                layout,
                id: "bc".into(),
                handle: ResizeHandle::Nw,
                dx: 500.0,
                dy: 0.0,
                output: None,
            },
        };
        let json = run(config).expect("run");
        let resized = TemplateLayout::from_json(&json).expect("parse");
        let b = resized.get_element(&ElementId::from("bc")).expect("bc").bounds();
        // Floored to the barcode minimum with the right edge anchored.
        assert_eq!(b, Bounds::new(140.0, 100.0, 80.0, 60.0));
    }

    #[test]
    fn test_rotate_snaps() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = write_layout(&dir);
        let config = DesignerConfig::new(Command::Rotate {
            layout,
            id: "title".into(),
            degrees: -37.0,
            snap: true,
            output: None,
        });
        let rotated = TemplateLayout::from_json(&run(config).expect("run")).expect("parse");
        let r = rotated
            .get_element(&ElementId::from("title"))
            .expect("title")
            .transform
            .rotation;
        assert!((r - 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_reports() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = write_layout(&dir);

        let summary = run(DesignerConfig::new(Command::Inspect {
            layout: layout.clone(),
        }))
        .expect("inspect");
        assert!(summary.contains("Canvas 400x300"));
        assert!(summary.contains("barcode"));
        let lines: Vec<_> = summary.lines().collect();
        assert!(lines.iter().any(|l| l.contains("bc") && l.ends_with("[field: sku]")));
        // Static text carries no binding marker.
        assert!(lines.iter().any(|l| l.contains("title") && !l.contains('[')));

        let fields = run(DesignerConfig::new(Command::Fields {
            layout: layout.clone(),
            sample: false,
        }))
        .expect("fields");
        assert_eq!(fields.trim(), "sku\tsku");

        let guides = run(DesignerConfig::new(Command::Guides {
            layout,
            id: "title".into(),
        }))
        .expect("guides");
        let lines: serde_json::Value = serde_json::from_str(&guides).expect("json");
        // Left edges 102 vs 100 align.
        assert!(lines
            .as_array()
            .expect("array")
            .iter()
            .any(|l| l["position"] == 100.0 && l["kind"] == "edge"));
    }

    #[test]
    fn test_unknown_element_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = write_layout(&dir);
        let err = run(DesignerConfig::new(Command::Drag {
            layout,
            id: "ghost".into(),
            dx: 1.0,
            dy: 1.0,
            output: None,
        }))
        .expect_err("missing element");
        assert!(err.to_string().contains("ghost"));
    }
}
