//! Conversions from [`Table`] and loose JSON into chart payloads.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    label_string, ChartData, Dataset, Edge, HeatmapData, NetworkData, Node, PieData, Point2,
    Point3, ScatterData, ScatterDataset, Table,
};
use crate::config::ChartType;
use crate::error::{Result, VisError};

impl Table {
    /// Resolves the `x`/`ys` column selection: `x` defaults to the first
    /// column and `ys` to every other column.
    fn select_columns<'a>(
        &'a self,
        x: Option<&'a str>,
        ys: &[&'a str],
    ) -> Result<(&'a str, Vec<&'a str>)> {
        let x = match x {
            Some(x) => x,
            None => self
                .columns()
                .first()
                .map(String::as_str)
                .ok_or_else(|| VisError::invalid("table has no columns"))?,
        };
        self.column_index(x)?;

        let ys: Vec<&str> = if ys.is_empty() {
            self.columns()
                .iter()
                .map(String::as_str)
                .filter(|column| *column != x)
                .collect()
        } else {
            ys.to_vec()
        };
        if ys.is_empty() {
            return Err(VisError::invalid(format!("no value columns besides `{x}`")));
        }

        Ok((x, ys))
    }

    pub fn to_chart_data(&self, x: Option<&str>, ys: &[&str]) -> Result<ChartData> {
        let (x, ys) = self.select_columns(x, ys)?;
        let labels = self.column(x)?.into_iter().cloned().collect();

        let datasets = ys
            .into_iter()
            .map(|y| {
                let data = self.column(y)?.into_iter().cloned().collect::<Vec<_>>();
                Ok(Dataset::new(y, data))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ChartData { labels, datasets })
    }

    pub fn to_pie_data(&self, x: Option<&str>, y: Option<&str>) -> Result<PieData> {
        let ys: Vec<&str> = y.into_iter().collect();
        let (x, ys) = self.select_columns(x, &ys)?;

        Ok(PieData {
            labels: self.column(x)?.into_iter().cloned().collect(),
            values: self.numeric_column(ys[0])?,
            sort: None,
        })
    }

    pub fn to_scatter_data(&self, x: Option<&str>, ys: &[&str]) -> Result<ScatterData> {
        let (x, ys) = self.select_columns(x, ys)?;
        let xs = self.numeric_column(x)?;

        let datasets = ys
            .into_iter()
            .map(|y| {
                let data = xs
                    .iter()
                    .zip(self.numeric_column(y)?)
                    .map(|(&x, y)| Point2 { x, y })
                    .collect();
                Ok(ScatterDataset {
                    label: y.to_string(),
                    data,
                    extra: Map::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ScatterData { datasets })
    }

    /// Pivots long-form rows into a grid. Labels keep first-seen order and
    /// absent cells are 0.
    pub fn to_heatmap_data(&self, x: &str, y: &str, value: &str) -> Result<HeatmapData> {
        let xs = self.column(x)?;
        let ys = self.column(y)?;
        let values = self.numeric_column(value)?;

        let mut x_labels = LabelIndex::default();
        let mut y_labels = LabelIndex::default();
        let cells: Vec<(usize, usize, f64)> = xs
            .into_iter()
            .zip(ys)
            .zip(values)
            .map(|((x, y), value)| (x_labels.insert(x), y_labels.insert(y), value))
            .collect();

        let mut grid = vec![vec![0.0; x_labels.len()]; y_labels.len()];
        for (col, row, value) in cells {
            grid[row][col] = value;
        }

        Ok(HeatmapData {
            x_labels: x_labels.into_labels(),
            y_labels: y_labels.into_labels(),
            values: grid,
        })
    }

    /// Reads an edge list. `node_attrs` and `edge_attrs` map attribute names
    /// to the columns that hold them; node attributes come from the first row
    /// where the node is the source.
    pub fn to_network_data(
        &self,
        source: &str,
        target: &str,
        weight: Option<&str>,
        node_attrs: &[(&str, &str)],
        edge_attrs: &[(&str, &str)],
    ) -> Result<NetworkData> {
        let source_col = self.column_index(source)?;
        let target_col = self.column_index(target)?;
        let weight_col = weight.map(|w| self.column_index(w)).transpose()?;
        let node_cols = resolve_attrs(self, node_attrs)?;
        let edge_cols = resolve_attrs(self, edge_attrs)?;

        let mut nodes: Vec<Node> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut attributed: Vec<bool> = Vec::new();
        let mut edges = Vec::with_capacity(self.len());

        for (i, row) in self.rows().iter().enumerate() {
            let source_id = label_string(&row[source_col]);
            let target_id = label_string(&row[target_col]);

            for id in [&source_id, &target_id] {
                if !positions.contains_key(id) {
                    positions.insert(id.clone(), nodes.len());
                    nodes.push(Node::new(id.clone()));
                    attributed.push(false);
                }
            }

            let source_pos = positions[&source_id];
            if !attributed[source_pos] {
                for (name, col) in &node_cols {
                    nodes[source_pos].set_attribute(name, row[*col].clone());
                }
                attributed[source_pos] = true;
            }

            let mut edge = Edge::new(source_id, target_id);
            if let Some(col) = weight_col {
                let weight = row[col].as_f64().ok_or_else(|| {
                    VisError::invalid(format!("weight in row {i} is not numeric: {}", row[col]))
                })?;
                edge.weight = Some(weight);
            }
            for (name, col) in &edge_cols {
                edge.set_attribute(name, row[*col].clone());
            }
            edges.push(edge);
        }

        Ok(NetworkData { nodes, edges })
    }

    pub fn to_points3d(
        &self,
        x: &str,
        y: &str,
        z: &str,
        group: Option<&str>,
    ) -> Result<Vec<Point3>> {
        let xs = self.numeric_column(x)?;
        let ys = self.numeric_column(y)?;
        let zs = self.numeric_column(z)?;
        let groups = group.map(|g| self.column(g)).transpose()?;

        Ok((0..self.len())
            .map(|i| Point3 {
                group: groups.as_ref().map(|g| label_string(g[i])),
                ..Point3::new(xs[i], ys[i], zs[i])
            })
            .collect())
    }

    /// Converts the table into the payload a tabular chart kind expects.
    ///
    /// Pie charts read their values from `ys[0]`. Heatmaps pivot `x` against
    /// `ys[0]` with cells from `value`; scatter3d reads `ys[0]`, `ys[1]` as y
    /// and z and groups points by `value`.
    pub fn to_payload(
        &self,
        kind: ChartType,
        x: Option<&str>,
        ys: &[&str],
        value: Option<&str>,
    ) -> Result<Value> {
        match kind {
            ChartType::Line | ChartType::Bar | ChartType::Radar => {
                to_value(self.to_chart_data(x, ys)?)
            }
            ChartType::Pie | ChartType::Donut => {
                to_value(self.to_pie_data(x, ys.first().copied())?)
            }
            ChartType::Scatter => to_value(self.to_scatter_data(x, ys)?),
            ChartType::Heatmap => {
                let (x, ys) = self.select_columns(x, ys)?;
                let value = value.ok_or_else(|| VisError::invalid("heatmap needs a value column"))?;
                to_value(self.to_heatmap_data(x, ys[0], value)?)
            }
            ChartType::Scatter3D => {
                let (x, ys) = self.select_columns(x, ys)?;
                if ys.len() < 2 {
                    return Err(VisError::invalid("scatter3d needs y and z columns"));
                }
                to_value(self.to_points3d(x, ys[0], ys[1], value)?)
            }
            ChartType::Network | ChartType::Network3D => Err(VisError::invalid(
                "network data needs source and target columns; use Table::to_network_data",
            )),
            ChartType::Tree | ChartType::Treemap => Err(VisError::invalid(
                "hierarchical data cannot be derived from a flat table; build a TreeNode",
            )),
            ChartType::Surface3D => Err(VisError::invalid(
                "surface data is a grid; build SurfaceData directly or sample a function",
            )),
        }
    }
}

fn to_value<T: Serialize>(payload: T) -> Result<Value> {
    Ok(serde_json::to_value(payload)?)
}

fn resolve_attrs<'a>(table: &Table, attrs: &[(&'a str, &str)]) -> Result<Vec<(&'a str, usize)>> {
    attrs
        .iter()
        .map(|(name, column)| Ok((*name, table.column_index(column)?)))
        .collect()
}

/// Unique labels in insertion order.
#[derive(Default)]
struct LabelIndex {
    labels: Vec<Value>,
    positions: HashMap<String, usize>,
}

impl LabelIndex {
    fn insert(&mut self, label: &Value) -> usize {
        let key = label_string(label);
        if let Some(&pos) = self.positions.get(&key) {
            return pos;
        }
        let pos = self.labels.len();
        self.positions.insert(key, pos);
        self.labels.push(label.clone());
        pos
    }

    fn len(&self) -> usize {
        self.labels.len()
    }

    fn into_labels(self) -> Vec<Value> {
        self.labels
    }
}

fn compare_labels(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        _ => label_string(a).cmp(&label_string(b)),
    }
}

/// Heatmap pivot over JSON records with sorted labels. Numbers sort
/// numerically, everything else by its string form; missing cells are 0.
pub fn pivot_records(
    records: &[Map<String, Value>],
    x_key: &str,
    y_key: &str,
    value_key: &str,
) -> Result<HeatmapData> {
    let field = |i: usize, record: &Map<String, Value>, key: &str| -> Result<Value> {
        record
            .get(key)
            .cloned()
            .ok_or_else(|| VisError::invalid(format!("record {i} has no `{key}` field")))
    };

    let mut cells = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let x = field(i, record, x_key)?;
        let y = field(i, record, y_key)?;
        let value = field(i, record, value_key)?
            .as_f64()
            .ok_or_else(|| VisError::invalid(format!("record {i} `{value_key}` is not numeric")))?;
        cells.push((x, y, value));
    }

    let sorted_unique = |pick: fn(&(Value, Value, f64)) -> &Value| {
        let mut labels: Vec<Value> = Vec::new();
        for cell in &cells {
            let label = pick(cell);
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        labels.sort_by(compare_labels);
        labels
    };
    let x_labels = sorted_unique(|cell| &cell.0);
    let y_labels = sorted_unique(|cell| &cell.1);

    let mut values = vec![vec![0.0; x_labels.len()]; y_labels.len()];
    for (x, y, value) in &cells {
        let col = x_labels.iter().position(|label| label == x);
        let row = y_labels.iter().position(|label| label == y);
        if let (Some(col), Some(row)) = (col, row) {
            values[row][col] = *value;
        }
    }

    Ok(HeatmapData {
        x_labels,
        y_labels,
        values,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedNode {
    pub index: usize,
    #[serde(flatten)]
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedEdge {
    pub source_index: usize,
    pub target_index: usize,
    #[serde(flatten)]
    pub edge: Edge,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexedNetwork {
    pub nodes: Vec<IndexedNode>,
    pub edges: Vec<IndexedEdge>,
}

/// Positional form of a network. Edges whose endpoints are not declared are
/// left out.
pub fn index_network(network: &NetworkData) -> IndexedNetwork {
    let positions: HashMap<&str, usize> = network
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let nodes = network
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| IndexedNode {
            index,
            node: node.clone(),
        })
        .collect();

    let edges = network
        .edges
        .iter()
        .filter_map(|edge| {
            let source_index = *positions.get(edge.source.as_str())?;
            let target_index = *positions.get(edge.target.as_str())?;
            Some(IndexedEdge {
                source_index,
                target_index,
                edge: edge.clone(),
            })
        })
        .collect();

    IndexedNetwork { nodes, edges }
}
