use std::collections::HashSet;

use super::{
    ChartData, HeatmapData, NetworkData, PieData, Point3, ScatterData, SurfaceData, TreeNode,
};
use crate::error::{Result, VisError};

impl ChartData {
    pub fn validate(&self) -> Result<()> {
        for dataset in &self.datasets {
            if dataset.data.len() != self.labels.len() {
                return Err(VisError::invalid(format!(
                    "Dataset '{}' has {} values but there are {} labels",
                    dataset.label,
                    dataset.data.len(),
                    self.labels.len()
                )));
            }
        }
        Ok(())
    }
}

impl PieData {
    pub fn validate(&self) -> Result<()> {
        if self.values.len() != self.labels.len() {
            return Err(VisError::invalid(format!(
                "pie data has {} values but {} labels",
                self.values.len(),
                self.labels.len()
            )));
        }
        if let Some(value) = self.values.iter().find(|v| !v.is_finite()) {
            return Err(VisError::invalid(format!("pie value {value} is not finite")));
        }
        if self.values.iter().sum::<f64>() == 0.0 {
            return Err(VisError::invalid("pie values sum to zero"));
        }
        Ok(())
    }
}

impl ScatterData {
    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            return Err(VisError::invalid("scatter data has no datasets"));
        }
        for dataset in &self.datasets {
            if dataset.data.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                return Err(VisError::invalid(format!(
                    "dataset '{}' has a non-finite point",
                    dataset.label
                )));
            }
        }
        Ok(())
    }
}

impl HeatmapData {
    pub fn validate(&self) -> Result<()> {
        if self.values.len() != self.y_labels.len() {
            return Err(VisError::invalid(format!(
                "heatmap has {} rows but {} y labels",
                self.values.len(),
                self.y_labels.len()
            )));
        }
        for (i, row) in self.values.iter().enumerate() {
            if row.len() != self.x_labels.len() {
                return Err(VisError::invalid(format!(
                    "heatmap row {i} has {} cells but there are {} x labels",
                    row.len(),
                    self.x_labels.len()
                )));
            }
        }
        Ok(())
    }
}

impl NetworkData {
    /// Node ids must be unique.
    pub(crate) fn validate_nodes(&self) -> Result<HashSet<&str>> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.id.is_empty() {
                return Err(VisError::invalid("network node with an empty id"));
            }
            if !ids.insert(node.id.as_str()) {
                return Err(VisError::invalid(format!("duplicate node id '{}'", node.id)));
            }
        }
        Ok(ids)
    }

    /// Node ids are unique and every edge endpoint is a declared node.
    pub fn validate(&self) -> Result<()> {
        let ids = self.validate_nodes()?;
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(VisError::invalid(format!(
                        "edge {} -> {} references unknown node '{endpoint}'",
                        edge.source, edge.target
                    )));
                }
            }
        }
        Ok(())
    }
}

impl TreeNode {
    /// Names are non-empty and leaf values are finite and not negative.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(VisError::invalid("tree node with an empty name"));
        }
        if let Some(value) = self.value {
            if !value.is_finite() || value < 0.0 {
                return Err(VisError::invalid(format!(
                    "tree node '{}' has invalid value {value}",
                    self.name
                )));
            }
        }
        self.children.iter().try_for_each(TreeNode::validate)
    }
}

pub fn validate_points3d(points: &[Point3]) -> Result<()> {
    if points.is_empty() {
        return Err(VisError::invalid("no 3D points"));
    }
    for (i, p) in points.iter().enumerate() {
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return Err(VisError::invalid(format!("point {i} has a non-finite coordinate")));
        }
    }
    Ok(())
}

impl SurfaceData {
    pub fn validate(&self) -> Result<()> {
        if self.values.len() < 2 {
            return Err(VisError::invalid("surface needs at least two rows"));
        }
        let cols = self.values[0].len();
        if cols < 2 {
            return Err(VisError::invalid("surface needs at least two columns"));
        }
        for (i, row) in self.values.iter().enumerate() {
            if row.len() != cols {
                return Err(VisError::invalid(format!(
                    "surface row {i} has {} values, expected {cols}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(VisError::invalid(format!("surface row {i} has a non-finite value")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::{Dataset, Edge, Node};

    #[test]
    fn chart_data_lengths_must_match_labels() {
        let data = ChartData::new(["a", "b", "c"]).with_dataset(Dataset::new("s", [1, 2]));
        let err = data.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid data: Dataset 's' has 2 values but there are 3 labels"
        );
    }

    #[test]
    fn pie_rejects_zero_sum() {
        assert!(PieData::new([("a", 0.0), ("b", 0.0)]).validate().is_err());
        assert!(PieData::new([("a", 1.0), ("b", 0.0)]).validate().is_ok());
        let mismatched = PieData {
            labels: vec![json!("a")],
            values: vec![1.0, 2.0],
            sort: None,
        };
        assert!(mismatched.validate().is_err());
    }

    #[test]
    fn network_edges_must_reference_nodes() {
        let mut network =
            NetworkData::new(vec![Node::new("a"), Node::new("b")], vec![Edge::new("a", "b")]);
        assert!(network.validate().is_ok());

        network.edges.push(Edge::new("a", "z"));
        assert!(network.validate().unwrap_err().to_string().contains("'z'"));

        network.nodes.push(Node::new("a"));
        assert!(network.validate().unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn heatmap_shape_is_checked() {
        let heatmap = HeatmapData {
            x_labels: vec![json!("a"), json!("b")],
            y_labels: vec![json!(1)],
            values: vec![vec![1.0]],
        };
        assert!(heatmap.validate().unwrap_err().to_string().contains("row 0"));
    }

    #[test]
    fn surface_rows_must_be_even() {
        assert!(SurfaceData::new(vec![vec![0.0, 1.0]]).validate().is_err());
        assert!(SurfaceData::new(vec![vec![0.0, 1.0], vec![2.0]]).validate().is_err());
        assert!(SurfaceData::new(vec![vec![0.0, 1.0], vec![2.0, 3.0]]).validate().is_ok());
    }

    #[test]
    fn tree_values_must_be_non_negative() {
        let tree = TreeNode::branch("root", vec![TreeNode::leaf("bad", -1.0)]);
        assert!(tree.validate().is_err());
        assert!(validate_points3d(&[]).is_err());
        assert!(ScatterData::default().validate().is_err());
    }
}
