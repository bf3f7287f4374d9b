//! Pointer input for canvas interaction.

use serde::{Deserialize, Serialize};

use crate::{Bounds, ElementId};

/// Edge threshold (design pixels) above which edge handles are offered.
pub const EDGE_HANDLE_MIN_EXTENT: f64 = 40.0;

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Only Shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// A pointer sample in viewport pixels, relative to the canvas top-left
/// corner at the current zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Active modifier keys.
    #[serde(default)]
    pub modifiers: KeyModifiers,
}

impl PointerEvent {
    /// A pointer sample with no modifiers.
    #[must_use]
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            modifiers: KeyModifiers {
                shift: false,
                ctrl: false,
                alt: false,
                meta: false,
            },
        }
    }

    /// Same sample with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// One of the eight resize handles around an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Top-left corner.
    Nw,
    /// Top edge.
    N,
    /// Top-right corner.
    Ne,
    /// Right edge.
    E,
    /// Bottom-right corner.
    Se,
    /// Bottom edge.
    S,
    /// Bottom-left corner.
    Sw,
    /// Left edge.
    W,
}

impl ResizeHandle {
    /// All handles, clockwise from the top-left corner.
    pub const ALL: [Self; 8] = [
        Self::Nw,
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
    ];

    /// Whether the handle sits on a corner.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        matches!(self, Self::Nw | Self::Ne | Self::Sw | Self::Se)
    }

    /// Handle moves the left edge.
    #[must_use]
    pub const fn moves_left(self) -> bool {
        matches!(self, Self::Nw | Self::Sw | Self::W)
    }

    /// Handle moves the right edge.
    #[must_use]
    pub const fn moves_right(self) -> bool {
        matches!(self, Self::Ne | Self::Se | Self::E)
    }

    /// Handle moves the top edge.
    #[must_use]
    pub const fn moves_top(self) -> bool {
        matches!(self, Self::Nw | Self::Ne | Self::N)
    }

    /// Handle moves the bottom edge.
    #[must_use]
    pub const fn moves_bottom(self) -> bool {
        matches!(self, Self::Sw | Self::Se | Self::S)
    }

    /// Whether the handle is offered for an element of this size.
    ///
    /// Corners are always available. `n`/`s` need a width above
    /// [`EDGE_HANDLE_MIN_EXTENT`], `e`/`w` a height above it.
    #[must_use]
    pub fn is_available(self, bounds: &Bounds) -> bool {
        match self {
            Self::N | Self::S => bounds.width > EDGE_HANDLE_MIN_EXTENT,
            Self::E | Self::W => bounds.height > EDGE_HANDLE_MIN_EXTENT,
            _ => true,
        }
    }

    /// Handle anchor in canvas space, ignoring rotation.
    #[must_use]
    pub fn anchor(self, bounds: &Bounds) -> (f64, f64) {
        let (cx, cy) = bounds.center();
        let x = if self.moves_left() {
            bounds.x
        } else if self.moves_right() {
            bounds.right()
        } else {
            cx
        };
        let y = if self.moves_top() {
            bounds.y
        } else if self.moves_bottom() {
            bounds.bottom()
        } else {
            cy
        };
        (x, y)
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "data", rename_all = "snake_case")]
pub enum PointerTarget {
    /// Empty canvas.
    Canvas,
    /// An element body.
    Body(ElementId),
    /// A resize handle of an element.
    Handle(ElementId, ResizeHandle),
    /// The rotation handle of an element.
    Rotation(ElementId),
}

impl PointerTarget {
    /// Element the target belongs to.
    #[must_use]
    pub fn element(&self) -> Option<&ElementId> {
        match self {
            Self::Canvas => None,
            Self::Body(id) | Self::Handle(id, _) | Self::Rotation(id) => Some(id),
        }
    }
}
