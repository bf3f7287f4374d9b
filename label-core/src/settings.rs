//! Canvas settings shared by the editing session.

use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.25;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 4.0;

/// Zoom change applied by the toolbar zoom buttons.
pub const ZOOM_STEP: f64 = 0.25;

/// View and snapping settings for the active editing session.
///
/// Deserialized values pass through the same setters as live edits, so an
/// out-of-range zoom is clamped and a bad grid size falls back to the default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredSettings")]
pub struct CanvasSettings {
    zoom: f64,
    /// Round dragged positions to the grid.
    pub snap_to_grid: bool,
    grid_size: f64,
    /// Draw the grid behind the canvas.
    pub show_grid: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            snap_to_grid: false,
            grid_size: 10.0,
            show_grid: true,
        }
    }
}

/// Settings exactly as stored, before range checks.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredSettings {
    zoom: f64,
    snap_to_grid: bool,
    grid_size: f64,
    show_grid: bool,
}

impl Default for StoredSettings {
    fn default() -> Self {
        let settings = CanvasSettings::default();
        Self {
            zoom: settings.zoom,
            snap_to_grid: settings.snap_to_grid,
            grid_size: settings.grid_size,
            show_grid: settings.show_grid,
        }
    }
}

impl From<StoredSettings> for CanvasSettings {
    fn from(stored: StoredSettings) -> Self {
        let mut settings = Self {
            snap_to_grid: stored.snap_to_grid,
            show_grid: stored.show_grid,
            ..Self::default()
        };
        settings.set_zoom(stored.zoom);
        if !settings.set_grid_size(stored.grid_size) {
            tracing::warn!("Ignoring grid size {}", stored.grid_size);
        }
        settings
    }
}

impl CanvasSettings {
    /// Current zoom factor, always within `[MIN_ZOOM, MAX_ZOOM]`.
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    /// Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Zoom in by one toolbar step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    /// Zoom out by one toolbar step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    /// Grid spacing in design pixels, always positive.
    #[must_use]
    pub const fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// Set the grid spacing. Returns `false` and keeps the old value when
    /// `size` is not a positive finite number.
    pub fn set_grid_size(&mut self, size: f64) -> bool {
        if size.is_finite() && size > 0.0 {
            self.grid_size = size;
            true
        } else {
            false
        }
    }

    /// Builder-style snap toggle.
    #[must_use]
    pub fn with_snap_to_grid(mut self, enabled: bool, grid_size: f64) -> Self {
        self.snap_to_grid = enabled;
        self.set_grid_size(grid_size);
        self
    }

    /// Builder-style zoom.
    #[must_use]
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.set_zoom(zoom);
        self
    }

    /// Round `value` to the nearest grid multiple.
    #[must_use]
    pub fn snap(&self, value: f64) -> f64 {
        (value / self.grid_size).round() * self.grid_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_clamped() {
        let mut settings = CanvasSettings::default();
        settings.set_zoom(10.0);
        assert!((settings.zoom() - MAX_ZOOM).abs() < f64::EPSILON);
        settings.set_zoom(0.0);
        assert!((settings.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
        settings.set_zoom(f64::NAN);
        assert!((settings.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_steps() {
        let mut settings = CanvasSettings::default();
        settings.zoom_in();
        assert!((settings.zoom() - 1.25).abs() < f64::EPSILON);
        for _ in 0..20 {
            settings.zoom_out();
        }
        assert!((settings.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_grid_size_must_be_positive() {
        let mut settings = CanvasSettings::default();
        assert!(!settings.set_grid_size(0.0));
        assert!(!settings.set_grid_size(-5.0));
        assert!((settings.grid_size() - 10.0).abs() < f64::EPSILON);
        assert!(settings.set_grid_size(8.0));
        assert!((settings.snap(13.0) - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_settings_json_shape() {
        let json = serde_json::to_value(CanvasSettings::default()).expect("serialize");
        assert_eq!(json["snapToGrid"], false);
        assert_eq!(json["gridSize"], 10.0);
        assert_eq!(json["showGrid"], true);
    }

    #[test]
    fn test_stored_settings_are_range_checked() {
        let settings: CanvasSettings = serde_json::from_str(
            r#"{"zoom":0.0,"snapToGrid":true,"gridSize":0.0,"showGrid":true}"#,
        )
        .expect("deserialize");
        assert!((settings.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
        assert!((settings.grid_size() - 10.0).abs() < f64::EPSILON);
        assert!(settings.snap_to_grid);

        let settings: CanvasSettings =
            serde_json::from_str(r#"{"zoom":9,"gridSize":-3}"#).expect("deserialize");
        assert!((settings.zoom() - MAX_ZOOM).abs() < f64::EPSILON);
        assert!((settings.grid_size() - 10.0).abs() < f64::EPSILON);
        assert!(settings.show_grid);

        let round_trip: CanvasSettings =
            serde_json::from_value(serde_json::to_value(CanvasSettings::default().with_zoom(2.0)).expect("serialize"))
                .expect("deserialize");
        assert_eq!(round_trip, CanvasSettings::default().with_zoom(2.0));
    }
}
