use std::time::Instant;

use serde::{Serialize, Serializer};
use serde_json::{Map, Number};
use tracing::{debug, info};

use crate::grid::{lookup_mesh_element, ValueGrid};
use crate::mesh::{serialize_record, Mesh, Value};
use crate::peak::{find_peaks, Peak, PeakWindow};
use crate::validate::check_mesh;
use crate::{Result, ViewSpotError};

/// A mesh element chosen to represent one peak.
///
/// Serializes as the element's source value record, extra fields and the
/// number as written included.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSpot {
    pub element_id: usize,
    pub value: f64,
    pub extra: Map<String, serde_json::Value>,
    source: Option<Number>,
}

impl From<&Value> for ViewSpot {
    fn from(value: &Value) -> Self {
        ViewSpot {
            element_id: value.element_id,
            value: value.value,
            extra: value.extra.clone(),
            source: value.source_number().cloned(),
        }
    }
}

impl Serialize for ViewSpot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let source = self
            .source
            .as_ref()
            .filter(|n| n.as_f64() == Some(self.value));
        serialize_record(serializer, self.element_id, self.value, source, &self.extra)
    }
}

/// Finds the highest local maxima of a mesh. Holds no state besides its
/// window, so one finder can serve any number of meshes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpotFinder {
    window: PeakWindow,
}

impl SpotFinder {
    pub fn new() -> Self {
        SpotFinder::default()
    }

    pub fn with_window(window: PeakWindow) -> Self {
        SpotFinder { window }
    }

    pub fn window(&self) -> PeakWindow {
        self.window
    }

    /// Returns up to `n` view spots, highest value first.
    ///
    /// Fails with `ViewSpotError::InvalidMeshFormat` when the mesh is not an
    /// implicit regular grid.
    pub fn find_spots(&self, mesh: &Mesh, n: usize) -> Result<Vec<ViewSpot>> {
        let start_time = Instant::now();

        let layout = check_mesh(mesh)?;
        let grid = ValueGrid::from_mesh(mesh, &layout)?;
        let peaks = find_peaks(&grid, &self.window);
        debug!("Peaks located in {:.2?}", start_time.elapsed());

        let mut spots = peaks
            .iter()
            .map(|peak| self.resolve_peak(&grid, peak, mesh))
            .collect::<Result<Vec<_>>>()?;

        // Stable, so equal values keep peak order.
        spots.sort_by(|a, b| b.value.total_cmp(&a.value));
        spots.truncate(n);

        info!(
            "Selected {} of {} peaks in {:.2?}",
            spots.len(),
            peaks.len(),
            start_time.elapsed()
        );
        Ok(spots)
    }

    /// Picks the higher of the two elements behind a peak cell; the lower
    /// element id wins a tie.
    fn resolve_peak(&self, grid: &ValueGrid, peak: &Peak, mesh: &Mesh) -> Result<ViewSpot> {
        let [first, second] =
            lookup_mesh_element(grid, peak.coord(), mesh).ok_or(ViewSpotError::InvalidMeshFormat)?;

        let first = mesh.values.get(first).ok_or(ViewSpotError::InvalidMeshFormat)?;
        let second = mesh.values.get(second).ok_or(ViewSpotError::InvalidMeshFormat)?;

        let chosen = if second.value > first.value { second } else { first };
        Ok(ViewSpot::from(chosen))
    }
}

/// Returns the `n` highest view spots of `mesh` using the default 4 x 4 window.
pub fn find_spot(mesh: &Mesh, n: usize) -> Result<Vec<ViewSpot>> {
    SpotFinder::new().find_spots(mesh, n)
}
