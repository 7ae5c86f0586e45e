//! Chart-specific adjustments applied after validation, right before a
//! payload is embedded in a page.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::{NetworkData, PieData, Point3, SortOrder, SurfaceData};
use crate::error::Result;

/// Coordinates beyond this magnitude are rescaled to fit the scene.
const MAX_SCENE_COORDINATE: f64 = 1000.0;
const SCENE_SCALE: f64 = 100.0;

impl PieData {
    /// Validates and applies the requested sort order. The sort travels with
    /// the labels so slices keep their names.
    pub fn process(mut self) -> Result<Self> {
        self.validate()?;

        if let Some(order) = self.sort {
            let mut slices: Vec<_> = self.labels.into_iter().zip(self.values).collect();
            slices.sort_by(|a, b| match order {
                SortOrder::Ascending => a.1.total_cmp(&b.1),
                SortOrder::Descending => b.1.total_cmp(&a.1),
            });
            let (labels, values) = slices.into_iter().unzip();
            self.labels = labels;
            self.values = values;
        }

        Ok(self)
    }
}

impl NetworkData {
    /// Drops edges with undeclared endpoints and annotates every node with
    /// its in, out and total degree.
    pub fn process(mut self) -> Result<Self> {
        let ids: HashSet<String> = self
            .validate_nodes()?
            .into_iter()
            .map(str::to_string)
            .collect();

        let before = self.edges.len();
        let edges: Vec<_> = self
            .edges
            .into_iter()
            .filter(|edge| {
                ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str())
            })
            .collect();
        let dropped = before - edges.len();
        if dropped > 0 {
            warn!(dropped, "dropping edges that reference unknown nodes");
        }
        self.edges = edges;

        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut out_degree: HashMap<&str, usize> = HashMap::new();
        for edge in &self.edges {
            *out_degree.entry(edge.source.as_str()).or_default() += 1;
            *in_degree.entry(edge.target.as_str()).or_default() += 1;
        }
        let degrees: Vec<(usize, usize)> = self
            .nodes
            .iter()
            .map(|node| {
                let id = node.id.as_str();
                (
                    in_degree.get(id).copied().unwrap_or(0),
                    out_degree.get(id).copied().unwrap_or(0),
                )
            })
            .collect();

        for (node, (incoming, outgoing)) in self.nodes.iter_mut().zip(degrees) {
            node.in_degree = incoming;
            node.out_degree = outgoing;
            node.degree = incoming + outgoing;
        }

        debug!(nodes = self.nodes.len(), edges = self.edges.len(), "processed network");
        Ok(self)
    }
}

/// Rescales a point cloud so its largest coordinate is 100 when anything
/// exceeds 1000 in magnitude.
pub fn normalize_points3d(points: &mut [Point3]) {
    let max = points
        .iter()
        .flat_map(|p| [p.x.abs(), p.y.abs(), p.z.abs()])
        .fold(0.0, f64::max);

    if max > MAX_SCENE_COORDINATE {
        let scale = SCENE_SCALE / max;
        debug!(max, scale, "rescaling 3D points");
        for p in points.iter_mut() {
            p.x *= scale;
            p.y *= scale;
            p.z *= scale;
        }
    }
}

impl SurfaceData {
    /// Validates and fills missing ranges with the grid extent.
    pub fn process(mut self) -> Result<Self> {
        self.validate()?;
        let rows = self.values.len() as f64;
        let cols = self.values[0].len() as f64;
        self.x_range.get_or_insert([0.0, cols]);
        self.y_range.get_or_insert([0.0, rows]);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::{Edge, Node};

    #[test]
    fn pie_sorts_with_labels() {
        let pie = PieData::new([("a", 1.0), ("b", 3.0), ("c", 2.0)])
            .sorted(SortOrder::Descending)
            .process()
            .unwrap();
        assert_eq!(pie.labels, vec![json!("b"), json!("c"), json!("a")]);
        assert_eq!(pie.values, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn pie_zero_sum_fails() {
        assert!(PieData::new([("a", 0.0)]).process().is_err());
    }

    #[test]
    fn network_degrees_and_dangling_edges() {
        let network = NetworkData::new(
            vec![Node::new("a"), Node::new("b"), Node::new("c")],
            vec![
                Edge::new("a", "b"),
                Edge::new("a", "c"),
                Edge::new("c", "a"),
                Edge::new("a", "missing"),
            ],
        )
        .process()
        .unwrap();

        assert_eq!(network.edges.len(), 3);
        let a = &network.nodes[0];
        assert_eq!((a.in_degree, a.out_degree, a.degree), (1, 2, 3));
        let b = &network.nodes[1];
        assert_eq!((b.in_degree, b.out_degree, b.degree), (1, 0, 1));
    }

    #[test]
    fn network_duplicate_ids_fail() {
        let network = NetworkData::new(vec![Node::new("a"), Node::new("a")], Vec::new());
        assert!(network.process().is_err());
    }

    #[test]
    fn large_points_are_rescaled() {
        let mut points = vec![Point3::new(2000.0, -500.0, 0.0), Point3::new(10.0, 20.0, 30.0)];
        normalize_points3d(&mut points);
        assert_eq!(points[0].x, 100.0);
        assert_eq!(points[0].y, -25.0);
        assert_eq!(points[1].z, 1.5);

        let mut small = vec![Point3::new(1.0, 2.0, 3.0)];
        normalize_points3d(&mut small);
        assert_eq!(small[0], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn surface_ranges_default_to_grid() {
        let surface = SurfaceData::new(vec![vec![0.0; 4]; 3]).process().unwrap();
        assert_eq!(surface.x_range, Some([0.0, 4.0]));
        assert_eq!(surface.y_range, Some([0.0, 3.0]));
    }
}
