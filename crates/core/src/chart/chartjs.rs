//! Chart.js charts.

use serde_json::Value;

use crate::config::ChartType;
use crate::data::{ChartData, PieData, ScatterData, SortOrder};
use crate::error::Result;
use crate::render::Library;

use super::Frame;

const LINE_SCRIPT: &str = chart_script!("chartjs", "line.js");
const BAR_SCRIPT: &str = chart_script!("chartjs", "bar.js");
const PIE_SCRIPT: &str = chart_script!("chartjs", "pie.js");
const RADAR_SCRIPT: &str = chart_script!("chartjs", "radar.js");
const SCATTER_SCRIPT: &str = chart_script!("chartjs", "scatter.js");

/// Chart.js, plus the datalabels plugin when the `datalabels` option is set.
fn chartjs_libraries(frame: &Frame) -> Vec<Library> {
    let mut libraries = vec![Library::ChartJs];
    if frame.config.option("datalabels", false) {
        libraries.push(Library::ChartJsDatalabels);
    }
    libraries
}

chart! {
    /// Series over shared labels, drawn as lines. Honors `smooth_curves`
    /// and the `fill` and `begin_at_zero` options.
    LineChart(ChartData) {
        chart_type: ChartType::Line,
        title: "Line Chart",
        size: (800, 400),
    }

    fn libraries(&self) -> Vec<Library> {
        chartjs_libraries(&self.frame)
    }

    fn preprocess(&self) -> Result<Value> {
        self.data.validate()?;
        Ok(serde_json::to_value(&self.data)?)
    }

    fn script(&self) -> &'static str {
        LINE_SCRIPT
    }
}

chart! {
    /// Grouped bars. The legend only shows for more than one dataset.
    BarChart(ChartData) {
        chart_type: ChartType::Bar,
        title: "Bar Chart",
        size: (800, 400),
    }

    fn libraries(&self) -> Vec<Library> {
        chartjs_libraries(&self.frame)
    }

    fn preprocess(&self) -> Result<Value> {
        self.data.validate()?;
        Ok(serde_json::to_value(&self.data)?)
    }

    fn script(&self) -> &'static str {
        BAR_SCRIPT
    }
}

impl BarChart {
    /// Bars grow along the x axis.
    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.frame.config.additional_options.insert("horizontal".into(), horizontal.into());
        self
    }

    pub fn stacked(mut self, stacked: bool) -> Self {
        self.frame.config.additional_options.insert("stacked".into(), stacked.into());
        self
    }
}

fn pie_payload(data: &PieData) -> Result<Value> {
    Ok(serde_json::to_value(data.clone().process()?)?)
}

chart! {
    PieChart(PieData) {
        chart_type: ChartType::Pie,
        title: "Pie Chart",
        size: (600, 400),
    }

    fn libraries(&self) -> Vec<Library> {
        chartjs_libraries(&self.frame)
    }

    fn preprocess(&self) -> Result<Value> {
        pie_payload(&self.data)
    }

    fn script(&self) -> &'static str {
        PIE_SCRIPT
    }
}

impl PieChart {
    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.data.sort = Some(order);
        self
    }
}

chart! {
    /// A pie with a hollow center; `cutout` defaults to `70%`.
    DonutChart(PieData) {
        chart_type: ChartType::Donut,
        title: "Donut Chart",
        size: (600, 400),
    }

    fn libraries(&self) -> Vec<Library> {
        chartjs_libraries(&self.frame)
    }

    fn preprocess(&self) -> Result<Value> {
        pie_payload(&self.data)
    }

    fn script(&self) -> &'static str {
        PIE_SCRIPT
    }
}

impl DonutChart {
    pub fn with_cutout(mut self, cutout: impl Into<String>) -> Self {
        self.frame.config.additional_options.insert("cutout".into(), Value::String(cutout.into()));
        self
    }

    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.data.sort = Some(order);
        self
    }
}

chart! {
    RadarChart(ChartData) {
        chart_type: ChartType::Radar,
        title: "Radar Chart",
        size: (600, 400),
    }

    fn libraries(&self) -> Vec<Library> {
        chartjs_libraries(&self.frame)
    }

    fn preprocess(&self) -> Result<Value> {
        self.data.validate()?;
        Ok(serde_json::to_value(&self.data)?)
    }

    fn script(&self) -> &'static str {
        RADAR_SCRIPT
    }
}

chart! {
    ScatterChart(ScatterData) {
        chart_type: ChartType::Scatter,
        title: "Scatter Plot",
        size: (800, 400),
    }

    fn libraries(&self) -> Vec<Library> {
        chartjs_libraries(&self.frame)
    }

    fn preprocess(&self) -> Result<Value> {
        self.data.validate()?;
        Ok(serde_json::to_value(&self.data)?)
    }

    fn script(&self) -> &'static str {
        SCATTER_SCRIPT
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::chart::Visualization;
    use crate::data::{Dataset, Point2, ScatterDataset};

    fn monthly() -> ChartData {
        ChartData::new(["Jan", "Feb"])
            .with_dataset(Dataset::new("A", [1, 2]))
            .with_dataset(Dataset::new("B", [3, 4]))
    }

    #[test]
    fn default_frames_match_chart_kind() {
        let line = LineChart::new(monthly());
        assert_eq!(line.frame().title, "Line Chart");
        assert_eq!(line.kind(), "LineChart");

        let pie = PieChart::new(PieData::new([("a", 1.0)]));
        assert_eq!(pie.frame().width.to_string(), "600px");
        assert_eq!(pie.config().chart_type, ChartType::Pie);
    }

    #[test]
    fn bar_options_reach_config() {
        let bar = BarChart::new(monthly()).horizontal(true).stacked(true);
        assert!(bar.config().option("horizontal", false));
        let html = bar.to_html().unwrap();
        assert!(html.contains(r#""horizontal":true"#));
        assert!(html.contains("indexAxis"));
    }

    #[test]
    fn datalabels_plugin_is_opt_in() {
        let mut line = LineChart::new(monthly());
        assert_eq!(line.libraries(), vec![Library::ChartJs]);
        line.update_config("datalabels", json!(true)).unwrap();
        assert_eq!(line.libraries(), vec![Library::ChartJs, Library::ChartJsDatalabels]);
    }

    #[test]
    fn donut_sorts_and_sets_cutout() {
        let donut = DonutChart::new(PieData::new([("a", 1.0), ("b", 5.0)]))
            .with_cutout("50%")
            .sorted(SortOrder::Descending);
        let payload = donut.preprocess().unwrap();
        assert_eq!(payload["labels"], json!(["b", "a"]));
        assert_eq!(donut.config().option("cutout", String::new()), "50%");
        assert!(donut.to_html().unwrap().contains("\"doughnut\""));
    }

    #[test]
    fn pie_zero_total_is_rejected() {
        let pie = PieChart::new(PieData::new([("a", 0.0), ("b", 0.0)]));
        assert!(pie.to_html().is_err());
    }

    #[test]
    fn scatter_needs_datasets() {
        assert!(ScatterChart::new(ScatterData::default()).preprocess().is_err());

        let data = ScatterData {
            datasets: vec![ScatterDataset {
                label: "pts".into(),
                data: vec![Point2 { x: 1.0, y: 2.0 }],
                extra: Default::default(),
            }],
        };
        let payload = ScatterChart::new(data).preprocess().unwrap();
        assert_eq!(payload["datasets"][0]["data"][0], json!({ "x": 1.0, "y": 2.0 }));
    }

    #[test]
    fn radar_uses_radial_scale() {
        let html = RadarChart::new(monthly()).to_html().unwrap();
        assert!(html.contains("type: \"radar\""));
        assert!(html.contains("circular: true"));
    }
}
