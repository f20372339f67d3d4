//! View Spot Finder
//!
//! Locates the most prominent view spots of a terrain mesh. The mesh must
//! carry an implicit regular grid: every pair of consecutive triangles covers
//! one rectangular cell. The pair values are averaged into a dense grid,
//! local maxima are found with a sliding window, and each peak is resolved
//! back to its highest mesh element.

pub mod finder;
pub mod grid;
pub mod handler;
pub mod mesh;
pub mod peak;
pub mod validate;

pub use finder::{find_spot, SpotFinder, ViewSpot};
pub use grid::{lookup_mesh_element, scale_to_grid, ValueGrid};
pub use handler::{handle_event, handle_event_json};
pub use mesh::{Element, GridLayout, Mesh, Node, Value};
pub use peak::{find_peaks, Peak, PeakWindow};
pub use validate::validate_mesh;

use thiserror::Error;

/// Errors that can occur while finding view spots
#[derive(Debug, Error)]
pub enum ViewSpotError {
    /// The mesh does not describe an implicit regular grid
    #[error("Support only well-defined mesh format (i.e. implicit grid)")]
    InvalidMeshFormat,
    /// Grid rows are empty or of unequal length
    #[error("Invalid grid dimensions")]
    InvalidDimensions,
    /// I/O error when reading mesh files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Mesh or request is not valid JSON or misses required fields
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Request event could not be turned into a call
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for view spot operations
pub type Result<T> = std::result::Result<T, ViewSpotError>;
