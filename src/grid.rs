use tracing::debug;

use crate::mesh::{GridLayout, Mesh};
use crate::{Result, ViewSpotError};

/// Dense grid of cell values, indexed `[x][y]`.
///
/// Built once from a mesh and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGrid {
    cells: Vec<Vec<f64>>,
    pub width: usize,
    pub height: usize,
}

impl ValueGrid {
    pub fn new(cells: Vec<Vec<f64>>) -> Result<Self> {
        let width = cells.len();
        if width == 0 {
            return Err(ViewSpotError::InvalidDimensions);
        }

        let height = cells[0].len();
        if height == 0 {
            return Err(ViewSpotError::InvalidDimensions);
        }

        if cells.iter().any(|column| column.len() != height) {
            return Err(ViewSpotError::InvalidDimensions);
        }

        Ok(ValueGrid {
            cells,
            width,
            height,
        })
    }

    /// Averages each element pair of a validated mesh into one cell.
    pub(crate) fn from_mesh(mesh: &Mesh, layout: &GridLayout) -> Result<Self> {
        let (width, height) = layout.cell_shape();
        let mut cells = Vec::with_capacity(width);

        for x in 0..width {
            let mut column = Vec::with_capacity(height);
            for y in 0..height {
                let i = layout.cell_index(x, y);
                let (upper, lower) = match (mesh.values.get(2 * i), mesh.values.get(2 * i + 1)) {
                    (Some(upper), Some(lower)) => (upper, lower),
                    _ => return Err(ViewSpotError::InvalidMeshFormat),
                };
                column.push((upper.value + lower.value) / 2.0);
            }
            cells.push(column);
        }

        debug!("Grid derived: {} x {} ({} cells)", width, height, width * height);
        Self::new(cells)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn get_value(&self, x: usize, y: usize) -> Option<f64> {
        if x < self.width && y < self.height {
            Some(self.cells[x][y])
        } else {
            None
        }
    }

    /// Value at `(x, y)` with out-of-range coordinates clamped to the
    /// nearest edge cell.
    pub fn get_clamped(&self, x: isize, y: isize) -> f64 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.cells[cx][cy]
    }

    pub fn coords_to_index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }
}

/// Derives the cell grid of a mesh.
///
/// The lattice is recomputed from the nodes, so the mesh should already have
/// passed `validate_mesh`. A mesh whose nodes span no lattice is rejected.
pub fn scale_to_grid(mesh: &Mesh) -> Result<ValueGrid> {
    let layout = GridLayout::from_nodes(&mesh.nodes).ok_or(ViewSpotError::InvalidMeshFormat)?;
    ValueGrid::from_mesh(mesh, &layout)
}

/// Ids of the two mesh elements that produced grid cell `(x, y)`.
///
/// Returns `None` if the mesh has no element pair at that cell.
pub fn lookup_mesh_element(grid: &ValueGrid, coord: (usize, usize), mesh: &Mesh) -> Option<[usize; 2]> {
    let (x, y) = coord;
    let i = grid.coords_to_index(x, y);
    let upper = mesh.elements.get(2 * i)?;
    let lower = mesh.elements.get(2 * i + 1)?;
    Some([upper.id, lower.id])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Element, Node, Value};

    fn create_test_mesh(rows: usize, cols: usize, values: &[f64]) -> Mesh {
        let nodes = (0..rows * cols)
            .map(|i| Node::new(i, (i / rows) as f64 * 10.0, (i % rows) as f64 * 10.0))
            .collect();
        let mut elements = Vec::new();
        for x in 0..cols - 1 {
            for y in 0..rows - 1 {
                let n = x * rows + y;
                let id = elements.len();
                elements.push(Element::new(id, [n, n + 1, n + 1 + rows]));
                elements.push(Element::new(id + 1, [n, n + rows, n + 1 + rows]));
            }
        }
        let values = values.iter().enumerate().map(|(i, v)| Value::new(i, *v)).collect();
        Mesh::new(nodes, elements, values)
    }

    #[test]
    fn test_grid_rejects_ragged_cells() {
        assert!(ValueGrid::new(vec![]).is_err());
        assert!(ValueGrid::new(vec![vec![]]).is_err());
        assert!(ValueGrid::new(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn test_single_cell_is_pair_average() {
        let mesh = create_test_mesh(2, 2, &[1.0, 4.0]);
        let grid = scale_to_grid(&mesh).unwrap();
        assert_eq!(grid.shape(), (1, 1));
        assert_eq!(grid.get_value(0, 0), Some(2.5));
    }

    #[test]
    fn test_grid_follows_column_major_cells() {
        // rows = 3, cols = 2: one column of two cells
        let mesh = create_test_mesh(3, 2, &[1.0, 3.0, 6.0, 8.0]);
        let grid = scale_to_grid(&mesh).unwrap();
        assert_eq!(grid.shape(), (1, 2));
        assert_eq!(grid.get_value(0, 0), Some(2.0));
        assert_eq!(grid.get_value(0, 1), Some(7.0));
        assert_eq!(grid.get_value(1, 0), None);
    }

    #[test]
    fn test_clamped_access_repeats_edges() {
        let grid = ValueGrid::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(grid.get_clamped(-2, -1), 1.0);
        assert_eq!(grid.get_clamped(5, 0), 3.0);
        assert_eq!(grid.get_clamped(0, 9), 2.0);
        assert_eq!(grid.get_clamped(1, 1), 4.0);
    }

    #[test]
    fn test_lookup_returns_cell_pair() {
        let mesh = create_test_mesh(3, 3, &[0.0; 8]);
        let grid = scale_to_grid(&mesh).unwrap();
        assert_eq!(lookup_mesh_element(&grid, (0, 0), &mesh), Some([0, 1]));
        assert_eq!(lookup_mesh_element(&grid, (0, 1), &mesh), Some([2, 3]));
        assert_eq!(lookup_mesh_element(&grid, (1, 1), &mesh), Some([6, 7]));
        assert_eq!(lookup_mesh_element(&grid, (2, 0), &mesh), None);
    }
}
