use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number};
use tracing::debug;

use crate::Result;

/// A mesh vertex. Its position in `Mesh::nodes` must equal `id`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Node { id, x, y }
    }
}

/// A triangle referencing three node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: usize,
    pub nodes: Vec<usize>,
}

impl Element {
    pub fn new(id: usize, nodes: [usize; 3]) -> Self {
        Element {
            id,
            nodes: nodes.to_vec(),
        }
    }

    /// Node ids in ascending order, for set comparisons.
    pub fn sorted_nodes(&self) -> Vec<usize> {
        let mut nodes = self.nodes.clone();
        nodes.sort_unstable();
        nodes
    }
}

/// Scalar attached to one element. Unknown fields of the source record are
/// kept in `extra` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ValueRecord")]
pub struct Value {
    pub element_id: usize,
    pub value: f64,
    pub extra: Map<String, serde_json::Value>,
    source: Option<Number>,
}

impl Value {
    pub fn new(element_id: usize, value: f64) -> Self {
        Value {
            element_id,
            value,
            extra: Map::new(),
            source: None,
        }
    }

    /// The number as it appeared in the input, while `value` still matches it.
    pub fn source_number(&self) -> Option<&Number> {
        self.source
            .as_ref()
            .filter(|n| n.as_f64() == Some(self.value))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_record(serializer, self.element_id, self.value, self.source_number(), &self.extra)
    }
}

#[derive(Deserialize)]
struct ValueRecord {
    element_id: usize,
    value: Number,
    #[serde(flatten)]
    extra: Map<String, serde_json::Value>,
}

impl From<ValueRecord> for Value {
    fn from(record: ValueRecord) -> Self {
        Value {
            element_id: record.element_id,
            value: record.value.as_f64().unwrap_or(f64::NAN),
            extra: record.extra,
            source: Some(record.value),
        }
    }
}

/// Writes `element_id`, `value` and the extra fields as one flat map.
/// `source` is written in place of `value` when given, so `9` stays `9`.
pub(crate) fn serialize_record<S: Serializer>(
    serializer: S,
    element_id: usize,
    value: f64,
    source: Option<&Number>,
    extra: &Map<String, serde_json::Value>,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(extra.len() + 2))?;
    map.serialize_entry("element_id", &element_id)?;
    match source {
        Some(number) => map.serialize_entry("value", number)?,
        None => map.serialize_entry("value", &value)?,
    }
    for (key, field) in extra {
        map.serialize_entry(key, field)?;
    }
    map.end()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub values: Vec<Value>,
}

impl Mesh {
    pub fn new(nodes: Vec<Node>, elements: Vec<Element>, values: Vec<Value>) -> Self {
        Mesh {
            nodes,
            elements,
            values,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_value(json: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading mesh file: {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let mesh: Mesh = serde_json::from_reader(reader)?;
        debug!(
            nodes = mesh.nodes.len(),
            elements = mesh.elements.len(),
            values = mesh.values.len(),
            "Mesh loaded"
        );
        Ok(mesh)
    }
}

/// Geometry of the regular lattice implied by a mesh's node sequence.
///
/// Nodes are laid out column by column: `rows` consecutive nodes share one
/// `x`, and `y` advances by `step_y` within a column. Derived from the first,
/// second and last node only; whether every other node agrees is checked by
/// the validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub origin_x: f64,
    pub origin_y: f64,
    pub step_x: f64,
    pub step_y: f64,
}

impl GridLayout {
    /// Returns `None` when the nodes cannot span a lattice of at least one cell.
    pub fn from_nodes(nodes: &[Node]) -> Option<Self> {
        if nodes.len() < 2 {
            return None;
        }
        let first = nodes[0];
        let second = nodes[1];
        let last = nodes[nodes.len() - 1];

        let width = last.x - first.x;
        let height = last.y - first.y;
        let step_y = second.y - first.y;

        let spans = height / step_y;
        // More spans than nodes can never fill a lattice.
        if !spans.is_finite() || spans < 0.0 || spans >= nodes.len() as f64 {
            return None;
        }
        let rows = 1 + spans.trunc() as usize;
        let cols = nodes.len() / rows;
        if rows < 2 || cols < 2 {
            return None;
        }
        let step_x = width / (cols - 1) as f64;

        Some(GridLayout {
            rows,
            cols,
            origin_x: first.x,
            origin_y: first.y,
            step_x,
            step_y,
        })
    }

    pub fn node_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Grid shape as `(cols - 1, rows - 1)` cells.
    pub fn cell_shape(&self) -> (usize, usize) {
        (self.cols - 1, self.rows - 1)
    }

    /// Flat index of cell `(x, y)`; its elements sit at `2i` and `2i + 1`.
    pub fn cell_index(&self, x: usize, y: usize) -> usize {
        x * (self.rows - 1) + y
    }

    /// Id of the node at the lower corner of cell `(x, y)`.
    pub fn corner_node(&self, x: usize, y: usize) -> usize {
        x * self.rows + y
    }

    pub fn expected_x(&self, idx: usize) -> f64 {
        self.origin_x + self.step_x * (idx / self.rows) as f64
    }

    pub fn expected_y(&self, idx: usize) -> f64 {
        self.origin_y + self.step_y * (idx % self.rows) as f64
    }
}
