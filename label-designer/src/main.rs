//! # Label Designer
//!
//! Command-line front end for the label designer.

use clap::Parser;
use label_designer::{run, CliArgs, DesignerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing on stderr so stdout carries only command output.
///
/// Set `RUST_LOG` to control log levels (default: label_designer=info,label_core=info).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("label_designer=info,label_core=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = DesignerConfig::from(args);
    tracing::debug!(
        "Zoom {} snap {} grid {}",
        config.settings.zoom(),
        config.settings.snap_to_grid,
        config.settings.grid_size()
    );

    let report = run(config)?;
    print!("{report}");
    if !report.ends_with('\n') {
        println!();
    }
    Ok(())
}
