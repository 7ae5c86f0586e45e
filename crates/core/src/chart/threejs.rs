//! Three.js charts.

use serde_json::Value;

use crate::config::ChartType;
use crate::data::{normalize_points3d, validate_points3d, NetworkData, Point3, SurfaceData};
use crate::error::Result;
use crate::render::Library;

use super::Frame;

const SCATTER3D_SCRIPT: &str = chart_script!("three", "scatter3d.js");
const NETWORK3D_SCRIPT: &str = chart_script!("three", "network3d.js");
const SURFACE3D_SCRIPT: &str = chart_script!("three", "surface3d.js");

/// Three.js, with orbit controls only when the scene is interactive.
fn three_libraries(frame: &Frame) -> Vec<Library> {
    let mut libraries = vec![Library::ThreeJs];
    if frame.config.interactive {
        libraries.push(Library::ThreeJsControls);
    }
    libraries
}

chart! {
    /// Point cloud in a rotatable scene, one color per group. Points beyond
    /// ±1000 are rescaled before embedding.
    Scatter3D(Vec<Point3>) {
        chart_type: ChartType::Scatter3D,
        title: "3D Scatter Plot",
        size: (800, 600),
    }

    fn libraries(&self) -> Vec<Library> {
        three_libraries(&self.frame)
    }

    fn preprocess(&self) -> Result<Value> {
        validate_points3d(&self.data)?;
        let mut points = self.data.clone();
        normalize_points3d(&mut points);
        Ok(serde_json::to_value(points)?)
    }

    fn script(&self) -> &'static str {
        SCATTER3D_SCRIPT
    }
}

chart! {
    /// Spheres and lines laid out by a small force simulation. Labels use
    /// the CSS2D renderer unless `show_labels` is false.
    Network3D(NetworkData) {
        chart_type: ChartType::Network3D,
        title: "3D Network Graph",
        size: (800, 600),
    }

    fn libraries(&self) -> Vec<Library> {
        let mut libraries = three_libraries(&self.frame);
        if self.frame.config.option("show_labels", true) {
            libraries.push(Library::ThreeJsCss2d);
        }
        libraries
    }

    fn preprocess(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.data.clone().process()?)?)
    }

    fn script(&self) -> &'static str {
        NETWORK3D_SCRIPT
    }
}

impl Network3D {
    /// Layout passes run before the first frame.
    pub fn force_iterations(mut self, iterations: u32) -> Self {
        self.frame
            .config
            .additional_options
            .insert("force_iterations".into(), iterations.into());
        self
    }
}

chart! {
    /// Height field colored by the palette from low to high.
    Surface3D(SurfaceData) {
        chart_type: ChartType::Surface3D,
        title: "3D Surface Plot",
        size: (800, 600),
    }

    fn libraries(&self) -> Vec<Library> {
        three_libraries(&self.frame)
    }

    fn preprocess(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.data.clone().process()?)?)
    }

    fn script(&self) -> &'static str {
        SURFACE3D_SCRIPT
    }
}

impl Surface3D {
    /// Samples `f(x, z)` over `[-5, 5]²` at 50×50, the default surface grid.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        Self::new(SurfaceData::sample([-5.0, 5.0], [-5.0, 5.0], 50, f))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::chart::Visualization;
    use crate::data::{Edge, Node};

    #[test]
    fn scatter3d_rescales_large_coordinates() {
        let chart = Scatter3D::new(vec![
            Point3::new(5000.0, 0.0, 0.0).with_group("a"),
            Point3::new(0.0, 2500.0, 0.0).with_group("b"),
        ]);
        let payload = chart.preprocess().unwrap();
        assert_eq!(payload[0]["x"], json!(100.0));
        assert_eq!(payload[1]["y"], json!(50.0));
        assert_eq!(chart.data()[0].x, 5000.0);
    }

    #[test]
    fn scatter3d_requires_points() {
        assert!(Scatter3D::new(Vec::new()).to_html().is_err());
    }

    #[test]
    fn controls_follow_interactivity() {
        let mut chart = Scatter3D::new(vec![Point3::new(1.0, 2.0, 3.0)]);
        assert_eq!(chart.libraries(), vec![Library::ThreeJs, Library::ThreeJsControls]);
        chart.update_config("interactive", json!(false)).unwrap();
        assert_eq!(chart.libraries(), vec![Library::ThreeJs]);
    }

    #[test]
    fn network3d_loads_label_renderer() {
        let network =
            NetworkData::new(vec![Node::new("a"), Node::new("b")], vec![Edge::new("a", "b")]);
        let chart = Network3D::new(network).force_iterations(20);
        assert!(chart.libraries().contains(&Library::ThreeJsCss2d));
        let html = chart.to_html().unwrap();
        assert!(html.contains(r#""force_iterations":20"#));
        assert!(html.contains("CSS2DRenderer"));
    }

    #[test]
    fn surface_from_function_fills_ranges() {
        let chart = Surface3D::from_fn(|x, z| (x * x + z * z).sqrt().sin());
        assert_eq!(chart.data().values.len(), 50);
        let payload = chart.preprocess().unwrap();
        assert_eq!(payload["x_range"], json!([-5.0, 5.0]));

        let grid = Surface3D::new(SurfaceData::new(vec![vec![0.0, 1.0], vec![2.0, 3.0]]));
        assert_eq!(grid.preprocess().unwrap()["y_range"], json!([0.0, 2.0]));
    }
}
