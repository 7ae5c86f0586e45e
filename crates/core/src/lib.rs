//! Core library for LlamaVis.
//!
//! Charts are typed payloads paired with a [`VisualizationConfig`]. Rendering
//! validates the payload, embeds it in a standalone HTML page together with
//! the configuration, and loads Chart.js, D3.js or Three.js from a CDN to
//! draw it in the browser.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use llamavis_core::{BarChart, ChartData, Dataset, Visualization};
//!
//! let data = ChartData::new(["Q1", "Q2"]).with_dataset(Dataset::new("Sales", [10, 20]));
//! BarChart::new(data).save(Path::new("sales.html"), true)?;
//! # Ok::<(), llamavis_core::VisError>(())
//! ```

pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod render;
pub mod util;

pub use chart::{
    BarChart, DonutChart, Frame, HeatmapVis, LineChart, Network3D, NetworkGraph, PieChart,
    RadarChart, Scatter3D, ScatterChart, Surface3D, TreeVis, TreemapVis, Visualization,
};
pub use color::{
    contrasting_text_color, generate_color_scale, generate_contrasting_colors, hex_to_rgb,
    hex_to_rgba, interpolate_colors, is_dark_color, rgb_to_hex,
};
pub use config::{
    AppConfig, ChartType, Interaction, Margin, RenderConfig, ThemeType, VisualizationConfig,
};
pub use data::{
    ChartData, Dataset, Edge, HeatmapData, NetworkData, Node, PieData, Point2, Point3,
    ScatterData, ScatterDataset, SortOrder, SurfaceData, Table, TreeNode,
};
pub use error::{Result, VisError};
pub use render::{Dimension, Library, Page, Renderer};

/// Version of the core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
