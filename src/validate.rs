use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::mesh::{GridLayout, Mesh};
use crate::{Result, ViewSpotError};

/// The first invariant a mesh was found to break. Only logged; callers see
/// `ViewSpotError::InvalidMeshFormat`.
#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum MeshDefect {
    #[error("node at position {0} has a different id")]
    NodeOrder(usize),
    #[error("element at position {0} has a different id")]
    ElementOrder(usize),
    #[error("value at position {0} has a different element_id")]
    ValueOrder(usize),
    #[error("{elements} elements but {values} values")]
    ValueCount { elements: usize, values: usize },
    #[error("elements reference {referenced} distinct nodes, mesh has {nodes}")]
    NodeReferences { referenced: usize, nodes: usize },
    #[error("odd number of elements ({0})")]
    OddElementCount(usize),
    #[error("element pair starting at {0} does not share exactly one edge")]
    PairEdge(usize),
    #[error("nodes do not span a regular lattice")]
    DegenerateLattice,
    #[error("lattice of {rows}x{cols} does not hold {nodes} nodes")]
    LatticeSize { rows: usize, cols: usize, nodes: usize },
    #[error("node {0} is off the lattice")]
    NodePosition(usize),
    #[error("cell ({x}, {y}) is not covered by its element pair")]
    CellPair { x: usize, y: usize },
}

/// Checks that `mesh` describes an implicit regular grid.
///
/// Any broken invariant yields `ViewSpotError::InvalidMeshFormat`.
pub fn validate_mesh(mesh: &Mesh) -> Result<()> {
    check_mesh(mesh).map(|_| ())
}

/// Validates `mesh` and returns the lattice it spans.
pub(crate) fn check_mesh(mesh: &Mesh) -> Result<GridLayout> {
    match inspect(mesh) {
        Ok(layout) => {
            debug!(rows = layout.rows, cols = layout.cols, "Mesh validated");
            Ok(layout)
        }
        Err(defect) => {
            debug!("Mesh rejected: {}", defect);
            Err(ViewSpotError::InvalidMeshFormat)
        }
    }
}

fn inspect(mesh: &Mesh) -> std::result::Result<GridLayout, MeshDefect> {
    check_ordering(mesh)?;

    if mesh.elements.len() != mesh.values.len() {
        return Err(MeshDefect::ValueCount {
            elements: mesh.elements.len(),
            values: mesh.values.len(),
        });
    }

    let referenced: HashSet<usize> = mesh
        .elements
        .iter()
        .flat_map(|e| e.nodes.iter().copied())
        .collect();
    if referenced.len() != mesh.nodes.len() {
        return Err(MeshDefect::NodeReferences {
            referenced: referenced.len(),
            nodes: mesh.nodes.len(),
        });
    }

    if mesh.elements.len() % 2 != 0 {
        return Err(MeshDefect::OddElementCount(mesh.elements.len()));
    }
    for (pair, chunk) in mesh.elements.chunks_exact(2).enumerate() {
        let first: HashSet<usize> = chunk[0].nodes.iter().copied().collect();
        let second: HashSet<usize> = chunk[1].nodes.iter().copied().collect();
        if first.intersection(&second).count() != 2 {
            return Err(MeshDefect::PairEdge(pair * 2));
        }
    }

    let layout = GridLayout::from_nodes(&mesh.nodes).ok_or(MeshDefect::DegenerateLattice)?;
    check_lattice(mesh, &layout)?;
    check_cells(mesh, &layout)?;
    Ok(layout)
}

fn check_ordering(mesh: &Mesh) -> std::result::Result<(), MeshDefect> {
    if let Some(idx) = mesh.nodes.iter().enumerate().position(|(i, n)| n.id != i) {
        return Err(MeshDefect::NodeOrder(idx));
    }
    if let Some(idx) = mesh.elements.iter().enumerate().position(|(i, e)| e.id != i) {
        return Err(MeshDefect::ElementOrder(idx));
    }
    if let Some(idx) = mesh
        .values
        .iter()
        .enumerate()
        .position(|(i, v)| v.element_id != i)
    {
        return Err(MeshDefect::ValueOrder(idx));
    }
    Ok(())
}

// Exact equality, no tolerance.
#[allow(clippy::float_cmp)]
fn check_lattice(mesh: &Mesh, layout: &GridLayout) -> std::result::Result<(), MeshDefect> {
    if layout.node_count() != mesh.nodes.len() {
        return Err(MeshDefect::LatticeSize {
            rows: layout.rows,
            cols: layout.cols,
            nodes: mesh.nodes.len(),
        });
    }
    for (idx, node) in mesh.nodes.iter().enumerate() {
        if node.y != layout.expected_y(idx) || node.x != layout.expected_x(idx) {
            return Err(MeshDefect::NodePosition(idx));
        }
    }
    Ok(())
}

fn check_cells(mesh: &Mesh, layout: &GridLayout) -> std::result::Result<(), MeshDefect> {
    let rows = layout.rows;
    for x in 0..layout.cols - 1 {
        for y in 0..rows - 1 {
            let i = layout.cell_index(x, y);
            let corner = layout.corner_node(x, y);
            let (upper, lower) = match (mesh.elements.get(2 * i), mesh.elements.get(2 * i + 1)) {
                (Some(upper), Some(lower)) => (upper, lower),
                _ => return Err(MeshDefect::CellPair { x, y }),
            };
            if upper.sorted_nodes() != [corner, corner + 1, corner + 1 + rows]
                || lower.sorted_nodes() != [corner, corner + rows, corner + 1 + rows]
            {
                return Err(MeshDefect::CellPair { x, y });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Element, Node, Value};

    /// Regular `rows` x `cols` lattice with two triangles per cell.
    fn create_test_mesh(rows: usize, cols: usize) -> Mesh {
        let nodes = (0..rows * cols)
            .map(|i| Node::new(i, (i / rows) as f64, (i % rows) as f64))
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
        let values = (0..elements.len()).map(|i| Value::new(i, i as f64)).collect();
        Mesh::new(nodes, elements, values)
    }

    #[test]
    fn test_regular_meshes_pass() {
        for rows in 2..6 {
            for cols in 2..6 {
                let mesh = create_test_mesh(rows, cols);
                let layout = inspect(&mesh).unwrap();
                assert_eq!((layout.rows, layout.cols), (rows, cols));
            }
        }
    }

    #[test]
    fn test_swapped_nodes_rejected() {
        let mut mesh = create_test_mesh(3, 3);
        mesh.nodes.swap(2, 3);
        assert_eq!(inspect(&mesh), Err(MeshDefect::NodeOrder(2)));
    }

    #[test]
    fn test_missing_value_rejected() {
        let mut mesh = create_test_mesh(3, 3);
        mesh.values.pop();
        assert!(matches!(inspect(&mesh), Err(MeshDefect::ValueCount { .. })));
    }

    #[test]
    fn test_unreferenced_node_rejected() {
        let mut mesh = create_test_mesh(2, 2);
        // Node 2 is no longer referenced
        mesh.elements[1].nodes = mesh.elements[0].nodes.clone();
        assert_eq!(
            inspect(&mesh),
            Err(MeshDefect::NodeReferences {
                referenced: 3,
                nodes: 4
            })
        );
    }

    #[test]
    fn test_odd_element_count_rejected() {
        let mut mesh = create_test_mesh(2, 2);
        mesh.elements.push(Element::new(2, [0, 1, 3]));
        mesh.values.push(Value::new(2, 0.0));
        assert_eq!(inspect(&mesh), Err(MeshDefect::OddElementCount(3)));
    }

    #[test]
    fn test_pair_without_shared_edge_rejected() {
        let mut mesh = create_test_mesh(3, 3);
        // Elements 2 and 3 now only share node 1
        mesh.elements[3].nodes = vec![1, 0, 3];
        mesh.elements[2].nodes = vec![1, 2, 5];
        assert_eq!(inspect(&mesh), Err(MeshDefect::PairEdge(2)));
    }

    #[test]
    fn test_shifted_node_rejected() {
        let mut mesh = create_test_mesh(3, 3);
        mesh.nodes[4].x += 0.25;
        assert_eq!(inspect(&mesh), Err(MeshDefect::NodePosition(4)));
    }

    #[test]
    fn test_flipped_diagonal_rejected() {
        let mut mesh = create_test_mesh(2, 2);
        mesh.elements[0].nodes = vec![0, 1, 2];
        mesh.elements[1].nodes = vec![1, 2, 3];
        assert_eq!(inspect(&mesh), Err(MeshDefect::CellPair { x: 0, y: 0 }));
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mesh = Mesh::default();
        assert_eq!(inspect(&mesh), Err(MeshDefect::DegenerateLattice));
        assert!(matches!(
            validate_mesh(&mesh),
            Err(ViewSpotError::InvalidMeshFormat)
        ));
    }
}
