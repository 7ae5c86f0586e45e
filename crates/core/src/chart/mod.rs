//! Chart types and the [`Visualization`] trait that turns them into pages.
//!
//! Every chart owns a [`Frame`] (configuration, size, container id, title)
//! plus a typed payload. Rendering preprocesses the payload, declares it in
//! the page as `data` next to `config` and `frame`, then inlines the chart's
//! static script.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{ChartType, VisualizationConfig};
use crate::error::{Result, VisError};
use crate::render::{self, embed_data, Dimension, Library, Page, Renderer};
use crate::util::generate_unique_id;

/// Declares a chart struct over a payload type together with its
/// constructors and the frame plumbing of its [`Visualization`] impl.
macro_rules! chart {
    (
        $(#[$meta:meta])*
        $name:ident($data:ty) {
            chart_type: $chart_type:expr,
            title: $title:literal,
            size: ($width:literal, $height:literal) $(,)?
        }
        $($body:tt)*
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            frame: $crate::chart::Frame,
            data: $data,
        }

        impl $name {
            pub fn new(data: $data) -> Self {
                Self::with_config(data, $crate::config::VisualizationConfig::new($chart_type))
            }

            /// Uses `config` with its chart type forced to this chart's.
            pub fn with_config(data: $data, config: $crate::config::VisualizationConfig) -> Self {
                Self {
                    frame: $crate::chart::Frame::new(config, $chart_type, $title, $width, $height),
                    data,
                }
            }

            /// Rebuilds a chart from [`Visualization::to_json`] output.
            pub fn from_json(json: &str, data: $data) -> $crate::error::Result<Self> {
                let frame = $crate::chart::Frame::new(
                    $crate::config::VisualizationConfig::new($chart_type),
                    $chart_type,
                    $title,
                    $width,
                    $height,
                )
                .restore(json)?;
                Ok(Self { frame, data })
            }

            pub fn data(&self) -> &$data {
                &self.data
            }

            pub fn update_data(&mut self, data: $data) -> &mut Self {
                self.data = data;
                self
            }
        }

        impl $crate::chart::Visualization for $name {
            fn frame(&self) -> &$crate::chart::Frame {
                &self.frame
            }

            fn frame_mut(&mut self) -> &mut $crate::chart::Frame {
                &mut self.frame
            }

            fn kind(&self) -> &'static str {
                stringify!($name)
            }

            $($body)*
        }
    };
}

/// Inlines the shared helpers ahead of a chart script from `assets/js`.
macro_rules! chart_script {
    ($family:literal, $file:literal) => {
        concat!(
            include_str!("../../assets/js/common.js"),
            "\n",
            include_str!(concat!("../../assets/js/", $family, "_common.js")),
            "\n",
            include_str!(concat!("../../assets/js/", $file)),
        )
    };
}

mod chartjs;
mod d3;
mod threejs;

pub use chartjs::{BarChart, DonutChart, LineChart, PieChart, RadarChart, ScatterChart};
pub use d3::{HeatmapVis, NetworkGraph, TreeVis, TreemapVis};
pub use threejs::{Network3D, Scatter3D, Surface3D};

const DEFAULT_PAGE_TITLE: &str = "LlamaVis Visualization";

/// Placement and presentation shared by every chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub config: VisualizationConfig,
    pub width: Dimension,
    pub height: Dimension,
    pub container_id: String,
    pub title: String,
    /// Loaded after the chart's own libraries.
    pub extra_libraries: Vec<Library>,
}

impl Frame {
    pub fn new(
        mut config: VisualizationConfig,
        chart_type: ChartType,
        title: &str,
        width: u32,
        height: u32,
    ) -> Self {
        config.chart_type = chart_type;
        Self {
            config,
            width: Dimension::Pixels(width),
            height: Dimension::Pixels(height),
            container_id: generate_unique_id("llamavis-container"),
            title: title.to_string(),
            extra_libraries: Vec::new(),
        }
    }

    /// Restores a frame written by [`Visualization::to_json`]. Missing fields
    /// keep the chart's defaults.
    pub fn restore(mut self, json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Stored {
            config: Option<VisualizationConfig>,
            width: Option<Dimension>,
            height: Option<Dimension>,
            container_id: Option<String>,
            title: Option<String>,
        }

        let stored: Stored = serde_json::from_str(json)?;
        if let Some(mut config) = stored.config {
            config.chart_type = self.config.chart_type;
            self.config = config;
        }
        if let Some(width) = stored.width {
            self.width = width;
        }
        if let Some(height) = stored.height {
            self.height = height;
        }
        if let Some(container_id) = stored.container_id {
            self.container_id = container_id;
        }
        if let Some(title) = stored.title {
            self.title = title;
        }
        Ok(self)
    }

    /// The `data`, `config` and `frame` declarations every chart script reads.
    fn declarations(&self, data: &Value) -> Result<String> {
        let frame = json!({
            "container_id": self.container_id,
            "title": self.title,
            "width": self.width,
            "height": self.height,
        });
        Ok([
            embed_data("data", data)?,
            embed_data("config", &self.config.to_value()?)?,
            embed_data("frame", &frame)?,
        ]
        .join("\n"))
    }
}

/// A renderable chart.
pub trait Visualization {
    fn frame(&self) -> &Frame;

    fn frame_mut(&mut self) -> &mut Frame;

    /// Type name used in exported JSON, e.g. `"LineChart"`.
    fn kind(&self) -> &'static str;

    /// CDN libraries the chart script needs, in load order.
    fn libraries(&self) -> Vec<Library>;

    /// Validated, chart-ready payload.
    fn preprocess(&self) -> Result<Value>;

    /// The static script that draws the chart.
    fn script(&self) -> &'static str;

    fn config(&self) -> &VisualizationConfig {
        &self.frame().config
    }

    fn page(&self) -> Result<Page> {
        let frame = self.frame();
        let data = self.preprocess()?;
        let script = format!("{}\n{}", frame.declarations(&data)?, self.script());

        let title = if frame.title.is_empty() {
            DEFAULT_PAGE_TITLE
        } else {
            frame.title.as_str()
        };

        debug!(kind = self.kind(), container = %frame.container_id, "assembling page");
        Ok(Page::new(title, frame.container_id.as_str())
            .size(frame.width.clone(), frame.height.clone())
            .libraries(self.libraries())
            .libraries(frame.extra_libraries.iter().copied())
            .script(script))
    }

    fn to_html(&self) -> Result<String> {
        Ok(Renderer::new().render_page(&self.page()?))
    }

    /// Writes the page to `path`; see [`render::save_html`].
    fn save(&self, path: &Path, overwrite: bool) -> Result<PathBuf> {
        render::save_html(&self.to_html()?, path, overwrite)
    }

    /// Writes the page to `path`, or to a kept temporary file when `None`,
    /// and opens it in the default browser.
    fn show(&self, path: Option<&Path>) -> Result<PathBuf> {
        let html = self.to_html()?;
        let path = match path {
            Some(path) => render::save_html(&html, path, true)?,
            None => {
                let file = tempfile::Builder::new()
                    .prefix("llamavis-")
                    .suffix(".html")
                    .tempfile()?;
                fs::write(file.path(), &html)?;
                let (_file, path) = file.keep().map_err(|err| err.error)?;
                path
            }
        };
        render::open_in_browser(&path)?;
        Ok(path)
    }

    /// `<iframe>` embedding of the page; sizes default to the chart's own.
    fn to_iframe(&self, width: Option<Dimension>, height: Option<Dimension>) -> Result<String> {
        let frame = self.frame();
        let width = width.unwrap_or_else(|| frame.width.clone());
        let height = height.unwrap_or_else(|| frame.height.clone());
        Ok(render::iframe_embed(&self.to_html()?, &width, &height))
    }

    fn to_json(&self) -> Result<String> {
        let frame = self.frame();
        let doc = json!({
            "type": self.kind(),
            "config": frame.config.to_value()?,
            "width": frame.width,
            "height": frame.height,
            "container_id": frame.container_id,
            "title": frame.title,
        });
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Updates one configuration key. The chart type is fixed by the chart
    /// and cannot be changed here.
    fn update_config(&mut self, key: &str, value: Value) -> Result<&mut Self>
    where
        Self: Sized,
    {
        let config = &mut self.frame_mut().config;
        let chart_type = config.chart_type;
        if key == "chart_type" && value.as_str() != Some(chart_type.as_str()) {
            return Err(VisError::Config(format!(
                "chart_type is fixed to `{chart_type}` for this chart"
            )));
        }
        config.update(key, value)?;
        Ok(self)
    }

    fn with_title(mut self, title: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.frame_mut().title = title.into();
        self
    }

    fn with_size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self
    where
        Self: Sized,
    {
        let frame = self.frame_mut();
        frame.width = width.into();
        frame.height = height.into();
        self
    }

    fn with_container_id(mut self, id: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.frame_mut().container_id = id.into();
        self
    }

    fn with_library(mut self, library: Library) -> Self
    where
        Self: Sized,
    {
        self.frame_mut().extra_libraries.push(library);
        self
    }
}
