//! # Alignment Guides
//!
//! Advisory guide lines shown while an element is dragged or resized.
//!
//! ```text
//! canvas center   -> blue    (always present, one vertical + one horizontal)
//! center/center   -> green   (both axes)
//! edge/edge       -> amber   (left/left, right/right, top/top, bottom/bottom)
//! edge/center     -> purple  (active edge against a sibling's center)
//! ```
//!
//! Guides are a pure function of the active element, its siblings and the
//! canvas size. Lines are placed at the sibling's coordinate and are not
//! deduplicated; see [`dedup`] for rendering.

use serde::{Deserialize, Serialize};

use crate::{Bounds, LayoutElement};

/// Maximum absolute difference (design pixels, exclusive) that counts as aligned.
pub const ALIGN_THRESHOLD: f64 = 5.0;

/// Line orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Constant x.
    Vertical,
    /// Constant y.
    Horizontal,
}

/// Why a guide was emitted. Doubles as a rendering hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuideKind {
    /// Canvas midline.
    CanvasCenter,
    /// Active center matches a sibling center.
    CenterToCenter,
    /// Active edge matches the same edge of a sibling.
    Edge,
    /// Active edge matches a sibling center.
    Cross,
}

impl GuideKind {
    /// Hex color used to draw the guide.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::CanvasCenter => "#3b82f6",
            Self::CenterToCenter => "#10b981",
            Self::Edge => "#f59e0b",
            Self::Cross => "#8b5cf6",
        }
    }
}

/// A single guide line in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    /// Line orientation.
    pub orientation: Orientation,
    /// X for vertical lines, y for horizontal lines.
    pub position: f64,
    /// Category.
    pub kind: GuideKind,
    /// Optional caption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl GuideLine {
    fn new(orientation: Orientation, position: f64, kind: GuideKind) -> Self {
        Self {
            orientation,
            position,
            kind,
            label: None,
        }
    }

    /// Hex color of this line.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        self.kind.color()
    }
}

fn aligned(a: f64, b: f64) -> bool {
    (a - b).abs() < ALIGN_THRESHOLD
}

/// Compute the guide lines for `active` against `others`.
///
/// Entries of `others` sharing the active element's id are skipped, so the
/// full element list can be passed directly.
pub fn compute_guides<'a>(
    active: &LayoutElement,
    others: impl IntoIterator<Item = &'a LayoutElement>,
    canvas_width: f64,
    canvas_height: f64,
) -> Vec<GuideLine> {
    let mut lines = vec![
        GuideLine {
            label: Some("Canvas Center".to_string()),
            ..GuideLine::new(Orientation::Vertical, canvas_width / 2.0, GuideKind::CanvasCenter)
        },
        GuideLine {
            label: Some("Canvas Center".to_string()),
            ..GuideLine::new(Orientation::Horizontal, canvas_height / 2.0, GuideKind::CanvasCenter)
        },
    ];

    let a = active.bounds();
    for other in others {
        if other.id == active.id {
            continue;
        }
        push_sibling_guides(&mut lines, &a, &other.bounds());
    }
    lines
}

fn push_sibling_guides(lines: &mut Vec<GuideLine>, a: &Bounds, b: &Bounds) {
    use GuideKind::{CenterToCenter, Cross, Edge};
    use Orientation::{Horizontal, Vertical};

    let (acx, acy) = a.center();
    let (bcx, bcy) = b.center();

    let checks = [
        (acx, bcx, Vertical, CenterToCenter),
        (acy, bcy, Horizontal, CenterToCenter),
        (a.x, b.x, Vertical, Edge),
        (a.right(), b.right(), Vertical, Edge),
        (a.y, b.y, Horizontal, Edge),
        (a.bottom(), b.bottom(), Horizontal, Edge),
        (a.x, bcx, Vertical, Cross),
        (a.right(), bcx, Vertical, Cross),
        (a.y, bcy, Horizontal, Cross),
        (a.bottom(), bcy, Horizontal, Cross),
    ];

    for (mine, theirs, orientation, kind) in checks {
        if aligned(mine, theirs) {
            lines.push(GuideLine::new(orientation, theirs, kind));
        }
    }
}

/// Drop lines that repeat an earlier line's orientation and position.
/// The first occurrence wins, so canvas-center lines keep their label.
#[must_use]
pub fn dedup(lines: &[GuideLine]) -> Vec<GuideLine> {
    let mut out: Vec<GuideLine> = Vec::with_capacity(lines.len());
    for line in lines {
        let seen = out.iter().any(|l| {
            l.orientation == line.orientation && (l.position - line.position).abs() < f64::EPSILON
        });
        if !seen {
            out.push(line.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementKind;

    fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> LayoutElement {
        LayoutElement::new(ElementKind::Rectangle)
            .with_id(id)
            .with_bounds(Bounds::new(x, y, w, h))
    }

    fn has(lines: &[GuideLine], orientation: Orientation, position: f64, kind: GuideKind) -> bool {
        lines.iter().any(|l| {
            l.orientation == orientation && (l.position - position).abs() < 1e-9 && l.kind == kind
        })
    }

    #[test]
    fn test_canvas_center_always_present() {
        let active = rect("a", 0.0, 0.0, 10.0, 10.0);
        let lines = compute_guides(&active, [], 400.0, 300.0);
        assert_eq!(lines.len(), 2);
        assert!(has(&lines, Orientation::Vertical, 200.0, GuideKind::CanvasCenter));
        assert!(has(&lines, Orientation::Horizontal, 150.0, GuideKind::CanvasCenter));
        assert_eq!(lines[0].label.as_deref(), Some("Canvas Center"));
        assert_eq!(lines[0].color(), "#3b82f6");
    }

    #[test]
    fn test_left_edge_within_threshold() {
        // Left edges 144 and 148 differ by 4.
        let a = rect("a", 144.0, 100.0, 50.0, 50.0);
        let b = rect("b", 148.0, 100.0, 50.0, 50.0);
        let lines = compute_guides(&a, [&a, &b], 400.0, 300.0);

        assert!(has(&lines, Orientation::Vertical, 148.0, GuideKind::Edge));
        assert!(!lines.iter().any(|l| l.orientation == Orientation::Vertical
            && ((l.position - 150.0).abs() < 1e-9 || (l.position - 144.0).abs() < 1e-9)));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let a = rect("a", 100.0, 0.0, 50.0, 20.0);
        let b = rect("b", 105.0, 200.0, 50.0, 20.0);
        let lines = compute_guides(&a, [&b], 400.0, 300.0);
        assert!(!lines.iter().any(|l| l.kind == GuideKind::Edge));
    }

    #[test]
    fn test_center_and_cross_alignment() {
        let a = rect("a", 0.0, 0.0, 40.0, 40.0);
        // Center x of b = 22 -> centers within 2; a.right (40) vs 22 too far.
        let b = rect("b", 12.0, 100.0, 20.0, 20.0);
        let lines = compute_guides(&a, [&b], 400.0, 300.0);
        assert!(has(&lines, Orientation::Vertical, 22.0, GuideKind::CenterToCenter));

        // a.bottom (40) vs c center y (41)
        let c = rect("c", 200.0, 31.0, 20.0, 20.0);
        let lines = compute_guides(&a, [&c], 400.0, 300.0);
        assert!(has(&lines, Orientation::Horizontal, 41.0, GuideKind::Cross));
        assert_eq!(GuideKind::Cross.color(), "#8b5cf6");
    }

    #[test]
    fn test_identical_siblings_emit_duplicates() {
        let a = rect("a", 10.0, 10.0, 20.0, 20.0);
        let b = rect("b", 10.0, 10.0, 20.0, 20.0);
        let c = rect("c", 10.0, 10.0, 20.0, 20.0);
        let lines = compute_guides(&a, [&b, &c], 400.0, 300.0);
        // center x2, edges x4 per sibling
        assert_eq!(lines.len(), 2 + 2 * 6);
        let unique = dedup(&lines);
        assert!(unique.len() < lines.len());
        assert_eq!(unique[0].kind, GuideKind::CanvasCenter);
    }
}
