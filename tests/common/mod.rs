//! Shared mesh fixtures for the integration tests.

#![allow(dead_code)]

use view_spot_finder::{Element, Mesh, Node, Value};

/// Regular `rows` x `cols` lattice, two triangles per cell, with the given
/// element values. Nodes sit at multiples of `step` starting from `origin`.
pub fn generate_mesh(rows: usize, cols: usize, origin: (f64, f64), step: (f64, f64), values: &[f64]) -> Mesh {
    let nodes = (0..rows * cols)
        .map(|i| {
            Node::new(
                i,
                origin.0 + step.0 * (i / rows) as f64,
                origin.1 + step.1 * (i % rows) as f64,
            )
        })
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
    assert_eq!(elements.len(), values.len(), "one value per element");

    let values = values
        .iter()
        .enumerate()
        .map(|(i, v)| Value::new(i, *v))
        .collect();
    Mesh::new(nodes, elements, values)
}

/// Unit-spaced mesh whose cell `(x, y)` pair holds `cell_value(x, y)` twice.
pub fn mesh_from_cells<F: Fn(usize, usize) -> f64>(rows: usize, cols: usize, cell_value: F) -> Mesh {
    let mut values = Vec::new();
    for x in 0..cols - 1 {
        for y in 0..rows - 1 {
            let v = cell_value(x, y);
            values.push(v);
            values.push(v);
        }
    }
    generate_mesh(rows, cols, (0.0, 0.0), (1.0, 1.0), &values)
}

/// The 3 x 3 scenario: the top-right cell holds the maximum.
pub fn top_right_mesh() -> Mesh {
    generate_mesh(3, 3, (0.0, 0.0), (1.0, 1.0), &[5.0, 5.0, 1.0, 1.0, 1.0, 1.0, 9.0, 9.0])
}
