//! D3.js charts.

use serde_json::Value;

use crate::config::ChartType;
use crate::data::{HeatmapData, NetworkData, TreeNode};
use crate::error::Result;
use crate::render::Library;

const NETWORK_SCRIPT: &str = chart_script!("d3", "network.js");
const TREE_SCRIPT: &str = chart_script!("d3", "tree.js");
const TREEMAP_SCRIPT: &str = chart_script!("d3", "treemap.js");
const HEATMAP_SCRIPT: &str = chart_script!("d3", "heatmap.js");

chart! {
    /// Force-directed graph. Edges to undeclared nodes are dropped and nodes
    /// are sized by degree unless they carry an explicit `size`.
    NetworkGraph(NetworkData) {
        chart_type: ChartType::Network,
        title: "Network Graph",
        size: (800, 500),
    }

    fn libraries(&self) -> Vec<Library> {
        vec![Library::D3, Library::D3Force]
    }

    fn preprocess(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.data.clone().process()?)?)
    }

    fn script(&self) -> &'static str {
        NETWORK_SCRIPT
    }
}

impl NetworkGraph {
    pub fn show_labels(mut self, show: bool) -> Self {
        self.frame.config.additional_options.insert("show_labels".into(), show.into());
        self
    }
}

chart! {
    /// Horizontal node-link tree.
    TreeVis(TreeNode) {
        chart_type: ChartType::Tree,
        title: "Hierarchical Tree",
        size: (800, 600),
    }

    fn libraries(&self) -> Vec<Library> {
        vec![Library::D3]
    }

    fn preprocess(&self) -> Result<Value> {
        self.data.validate()?;
        Ok(serde_json::to_value(&self.data)?)
    }

    fn script(&self) -> &'static str {
        TREE_SCRIPT
    }
}

chart! {
    /// Nested rectangles sized by leaf value, colored by top-level branch.
    TreemapVis(TreeNode) {
        chart_type: ChartType::Treemap,
        title: "Treemap",
        size: (800, 600),
    }

    fn libraries(&self) -> Vec<Library> {
        vec![Library::D3]
    }

    fn preprocess(&self) -> Result<Value> {
        self.data.validate()?;
        Ok(serde_json::to_value(&self.data)?)
    }

    fn script(&self) -> &'static str {
        TREEMAP_SCRIPT
    }
}

chart! {
    /// Grid of colored cells. The `color_scale` option picks `sequential`
    /// or `diverging` d3 interpolators; otherwise the palette's first and
    /// last colors are blended.
    HeatmapVis(HeatmapData) {
        chart_type: ChartType::Heatmap,
        title: "Heatmap",
        size: (800, 600),
    }

    fn libraries(&self) -> Vec<Library> {
        vec![Library::D3]
    }

    fn preprocess(&self) -> Result<Value> {
        self.data.validate()?;
        Ok(serde_json::to_value(&self.data)?)
    }

    fn script(&self) -> &'static str {
        HEATMAP_SCRIPT
    }
}

impl HeatmapVis {
    pub fn color_scale(mut self, scale: impl Into<String>) -> Self {
        self.frame
            .config
            .additional_options
            .insert("color_scale".into(), Value::String(scale.into()));
        self
    }
}
