//! # Label Designer CLI
//!
//! Command-line host for `label-core`: loads a stored layout, reports on it,
//! and replays single edits through an editing session.
//!
//! ## Usage
//!
//! ```bash
//! label-designer inspect layout.json
//! label-designer fields layout.json --sample
//! label-designer guides layout.json <element-id>
//! label-designer drag layout.json <element-id> 40 0 --output moved.json
//! LABEL_GRID_SIZE=10 label-designer drag layout.json <element-id> 4 4
//! label-designer resize layout.json <element-id> se 60 20
//! label-designer rotate layout.json <element-id> 37 --snap
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `DesignerConfig` - Canvas settings and the command to run
//! - `run` - Executes a command and returns its report

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod commands;

pub use commands::run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use label_core::{CanvasSettings, ResizeHandle};

/// Command-line arguments for label-designer.
#[derive(Debug, Clone, Parser)]
#[command(name = "label-designer")]
#[command(about = "Inspect label layouts and replay edits")]
#[command(version)]
pub struct CliArgs {
    /// Snap moved elements to a grid of this size (design pixels)
    #[arg(long, global = true, env = "LABEL_GRID_SIZE")]
    pub grid_size: Option<f64>,

    /// Viewport zoom factor used to replay gestures
    #[arg(long, global = true, env = "LABEL_ZOOM", default_value = "1.0")]
    pub zoom: f64,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Summarize canvas and elements
    Inspect {
        /// Layout JSON file
        layout: PathBuf,
    },
    /// List the form fields the layout needs
    Fields {
        /// Layout JSON file
        layout: PathBuf,
        /// Print placeholder values instead
        #[arg(long)]
        sample: bool,
    },
    /// Alignment guides for one element
    Guides {
        /// Layout JSON file
        layout: PathBuf,
        /// Element id
        id: String,
    },
    /// Move an element by a design-pixel offset
    Drag {
        /// Layout JSON file
        layout: PathBuf,
        /// Element id
        id: String,
        /// Horizontal offset
        #[arg(allow_hyphen_values = true)]
        dx: f64,
        /// Vertical offset
        #[arg(allow_hyphen_values = true)]
        dy: f64,
        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Drag a resize handle by a design-pixel offset
    Resize {
        /// Layout JSON file
        layout: PathBuf,
        /// Element id
        id: String,
        /// Handle: nw, n, ne, e, se, s, sw, w
        #[arg(value_parser = parse_handle)]
        handle: ResizeHandle,
        /// Horizontal offset
        #[arg(allow_hyphen_values = true)]
        dx: f64,
        /// Vertical offset
        #[arg(allow_hyphen_values = true)]
        dy: f64,
        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Set an element's rotation
    Rotate {
        /// Layout JSON file
        layout: PathBuf,
        /// Element id
        id: String,
        /// Rotation in degrees
        #[arg(allow_hyphen_values = true)]
        degrees: f64,
        /// Round to the nearest 15 degrees
        #[arg(long)]
        snap: bool,
        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn parse_handle(value: &str) -> Result<ResizeHandle, String> {
    serde_json::from_value(serde_json::Value::String(value.to_ascii_lowercase()))
        .map_err(|_| format!("unknown handle '{value}'"))
}

/// Designer configuration.
#[derive(Debug, Clone)]
pub struct DesignerConfig {
    /// Canvas settings used when replaying gestures.
    pub settings: CanvasSettings,
    /// Command to run.
    pub command: Command,
}

impl DesignerConfig {
    /// Configuration with default canvas settings.
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            settings: CanvasSettings::default(),
            command,
        }
    }
}

impl From<CliArgs> for DesignerConfig {
    fn from(args: CliArgs) -> Self {
        let mut settings = CanvasSettings::default().with_zoom(args.zoom);
        if let Some(size) = args.grid_size {
            settings = settings.with_snap_to_grid(true, size);
        }
        Self {
            settings,
            command: args.command,
        }
    }
}
