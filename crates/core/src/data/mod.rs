//! Data model for every chart kind.
//!
//! Payload types serialize to exactly the JSON shape the chart scripts read,
//! so preprocessing is "validate, adjust, `serde_json::to_value`".

mod process;
mod table;
mod transform;
mod validate;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use process::normalize_points3d;
pub use table::Table;
pub use transform::{index_network, pivot_records, IndexedEdge, IndexedNetwork, IndexedNode};
pub use validate::validate_points3d;

/// One series of a line, bar or radar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Value>,
    /// Chart.js dataset options passed through verbatim (`borderColor`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dataset {
    pub fn new<I, V>(label: impl Into<String>, data: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            label: label.into(),
            data: data.into_iter().map(Into::into).collect(),
            extra: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Labelled series data for line, bar and radar charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<Value>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    pub fn new<I, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            datasets: Vec::new(),
        }
    }

    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Parts of a whole, for pie and donut charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieData {
    pub labels: Vec<Value>,
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

impl PieData {
    pub fn new<I, V>(slices: I) -> Self
    where
        I: IntoIterator<Item = (V, f64)>,
        V: Into<Value>,
    {
        let (labels, values) = slices
            .into_iter()
            .map(|(label, value)| (label.into(), value))
            .unzip();
        Self {
            labels,
            values,
            sort: None,
        }
    }

    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterDataset {
    pub label: String,
    pub data: Vec<Point2>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterData {
    pub datasets: Vec<ScatterDataset>,
}

/// A dense grid of values with row (`y_labels`) and column (`x_labels`)
/// headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    pub x_labels: Vec<Value>,
    pub y_labels: Vec<Value>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Filled in by preprocessing.
    #[serde(default)]
    pub in_degree: usize,
    #[serde(default)]
    pub out_degree: usize,
    #[serde(default)]
    pub degree: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Routes well-known attribute names to their typed fields and keeps the
    /// rest in `extra`.
    pub fn set_attribute(&mut self, name: &str, value: Value) {
        match name {
            "group" => self.group = Some(label_string(&value)),
            "label" => self.label = Some(label_string(&value)),
            "size" => self.size = value.as_f64(),
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
    }
}

/// Directed edge of a network, referencing nodes by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn set_attribute(&mut self, name: &str, value: Value) {
        match name {
            "weight" => self.weight = value.as_f64(),
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl NetworkData {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Builds a network from an edge list, declaring every endpoint as a node
    /// in first-seen order.
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for edge in &edges {
            for id in [&edge.source, &edge.target] {
                if seen.insert(id.clone()) {
                    nodes.push(Node::new(id.clone()));
                }
            }
        }
        Self { nodes, edges }
    }
}

/// Hierarchy for tree and treemap charts. Leaves carry the values a treemap
/// sizes its rectangles by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in the subtree, including `self`.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::len).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Height field for a surface plot; `values[row][col]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceData {
    pub values: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_range: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_range: Option<[f64; 2]>,
}

impl SurfaceData {
    pub fn new(values: Vec<Vec<f64>>) -> Self {
        Self {
            values,
            x_range: None,
            y_range: None,
        }
    }

    /// Samples `f(x, z)` on a `resolution × resolution` grid spanning the two
    /// ranges. Rows follow `x`, columns follow `z`.
    pub fn sample<F>(x_range: [f64; 2], z_range: [f64; 2], resolution: usize, f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        let resolution = resolution.max(2);
        let step = |range: [f64; 2], i: usize| {
            range[0] + i as f64 * (range[1] - range[0]) / (resolution - 1) as f64
        };

        let values = (0..resolution)
            .map(|i| {
                let x = step(x_range, i);
                (0..resolution).map(|j| f(x, step(z_range, j))).collect()
            })
            .collect();

        Self {
            values,
            x_range: Some(x_range),
            y_range: Some(z_range),
        }
    }
}

/// String form of a cell used for labels and node ids. Strings are taken
/// verbatim, `null` becomes empty, everything else uses its JSON text.
pub fn label_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn dataset_options_flatten_into_json() {
        let dataset = Dataset::new("Sales", [1, 2, 3]).with_option("borderColor", "#ff0000");
        let value = serde_json::to_value(&dataset).unwrap();
        assert_eq!(
            value,
            json!({ "label": "Sales", "data": [1, 2, 3], "borderColor": "#ff0000" })
        );
    }

    #[test]
    fn node_attributes_route_to_fields() {
        let mut node = Node::new("a");
        node.set_attribute("group", json!(3));
        node.set_attribute("size", json!(2.5));
        node.set_attribute("team", json!("core"));

        assert_eq!(node.group.as_deref(), Some("3"));
        assert_eq!(node.size, Some(2.5));
        assert_eq!(node.extra.get("team"), Some(&json!("core")));
    }

    #[test]
    fn network_from_edges_declares_endpoints_once() {
        let network = NetworkData::from_edges(vec![
            Edge::new("a", "b"),
            Edge::new("b", "c"),
            Edge::new("c", "a"),
        ]);
        let ids: Vec<&str> = network.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn tree_counts_nodes_and_depth() {
        let tree = TreeNode::branch(
            "root",
            vec![
                TreeNode::branch("left", vec![TreeNode::leaf("x", 1.0)]),
                TreeNode::leaf("right", 2.0),
            ],
        );
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.depth(), 3);
        let value = serde_json::to_value(&tree).unwrap();
        assert!(value["children"][1].get("children").is_none());
    }

    #[test]
    fn surface_sampling_covers_ranges() {
        let surface = SurfaceData::sample([-1.0, 1.0], [0.0, 2.0], 3, |x, z| x + z);
        assert_eq!(surface.values.len(), 3);
        assert_eq!(surface.values[0], vec![-1.0, 0.0, 1.0]);
        assert_eq!(surface.values[2], vec![1.0, 2.0, 3.0]);
        assert_eq!(surface.x_range, Some([-1.0, 1.0]));
    }

    #[test]
    fn pie_constructor_splits_slices() {
        let pie = PieData::new([("a", 1.0), ("b", 2.0)]);
        assert_eq!(pie.labels, vec![json!("a"), json!("b")]);
        assert_eq!(pie.values, vec![1.0, 2.0]);
    }
}
