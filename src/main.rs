//! view_spot_finder: print the highest view spots of a terrain mesh.
//!
//! Reads a JSON mesh file and writes the selected spots to stdout as JSON.
//! Logs go to stderr; set `RUST_LOG` or pass `-v`/`-vv` to see them.
//!
//! ```bash
//! view_spot_finder mesh.json 5
//! RUST_LOG=view_spot_finder=debug view_spot_finder mesh.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use view_spot_finder::{Mesh, PeakWindow, SpotFinder, ViewSpot};

/// Find the N highest local maxima of a mesh with an implicit grid.
#[derive(Parser)]
#[command(name = "view_spot_finder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Mesh file (JSON with `nodes`, `elements` and `values`)
    mesh: PathBuf,

    /// Number of view spots
    #[arg(default_value_t = 1)]
    n: usize,

    /// Side length of the local-maximum window, in grid cells
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    window: u16,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    /// Suppress all log output
    #[arg(long, short)]
    quiet: bool,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "view_spot_finder=info",
            _ => "view_spot_finder=debug",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mesh = Mesh::load(&cli.mesh)
        .with_context(|| format!("Failed to load mesh from {:?}", cli.mesh))?;
    info!(
        "Mesh loaded: {} nodes, {} elements",
        mesh.nodes.len(),
        mesh.elements.len()
    );

    let finder = SpotFinder::with_window(PeakWindow::square(cli.window as usize));
    let window = finder.window();
    info!("Searching with a {}x{} window", window.width, window.height);
    let spots = finder.find_spots(&mesh, cli.n)?;

    println!("{}", render_spots(&spots, cli.compact)?);
    Ok(())
}

/// JSON array of spots, indented by four spaces unless `compact`.
fn render_spots(spots: &[ViewSpot], compact: bool) -> Result<String> {
    if compact {
        return Ok(serde_json::to_string(spots)?);
    }
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    spots.serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}
