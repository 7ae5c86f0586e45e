use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{Result, VisError};

/// Declares a lowercase configuration enum with `FromStr`, `Display` and a
/// list of every variant.
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = VisError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim().to_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == wanted)
                    .ok_or_else(|| VisError::Unsupported {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|variant| variant.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

config_enum! {
    /// Color themes understood by the chart templates.
    ThemeType, "theme" {
        Light => "light",
        Dark => "dark",
        Colorblind => "colorblind",
        Monochrome => "monochrome",
        Pastel => "pastel",
        Vibrant => "vibrant",
        Corporate => "corporate",
        Scientific => "scientific",
    }
}

config_enum! {
    /// Every chart kind a visualization can render as.
    ChartType, "chart type" {
        Line => "line",
        Bar => "bar",
        Pie => "pie",
        Donut => "donut",
        Scatter => "scatter",
        Radar => "radar",
        Network => "network",
        Tree => "tree",
        Treemap => "treemap",
        Heatmap => "heatmap",
        Scatter3D => "scatter3d",
        Network3D => "network3d",
        Surface3D => "surface3d",
    }
}

config_enum! {
    /// Browser-side interactions a chart may enable.
    Interaction, "interaction" {
        Hover => "hover",
        Click => "click",
        Zoom => "zoom",
        Pan => "pan",
        Rotate => "rotate",
        Select => "select",
        Drag => "drag",
    }
}

impl Default for ThemeType {
    fn default() -> Self {
        Self::Light
    }
}

impl Default for ChartType {
    fn default() -> Self {
        Self::Bar
    }
}

impl ThemeType {
    /// Page background used when the configuration does not set one.
    pub fn default_background(&self) -> &'static str {
        match self {
            Self::Light => "#ffffff",
            Self::Dark => "#1a1a1a",
            _ => "#f6f6f9",
        }
    }
}

pub const LLAMASEARCH_PALETTE: &[&str] = &["#6E44FF", "#B892FF", "#FFC2E2", "#FF90B3", "#EF7A85"];

pub const CATEGORICAL_PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const SEQUENTIAL_PALETTE: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

pub const DIVERGING_PALETTE: &[&str] = &[
    "#d73027", "#f46d43", "#fdae61", "#fee090", "#ffffbf", "#e0f3f8", "#abd9e9", "#74add1",
    "#4575b4",
];

/// Names accepted by [`palette`].
pub const PALETTE_NAMES: &[&str] = &["llamasearch", "categorical", "sequential", "diverging"];

/// Looks up a named color palette.
pub fn palette(name: &str) -> Option<&'static [&'static str]> {
    match name.trim().to_lowercase().as_str() {
        "llamasearch" => Some(LLAMASEARCH_PALETTE),
        "categorical" => Some(CATEGORICAL_PALETTE),
        "sequential" => Some(SEQUENTIAL_PALETTE),
        "diverging" => Some(DIVERGING_PALETTE),
        _ => None,
    }
}

/// Resolves a palette name, falling back to the house palette for unknown
/// names.
pub fn resolve_palette(name: &str) -> Vec<String> {
    let colors = palette(name).unwrap_or_else(|| {
        tracing::warn!(name, "unknown color palette, using llamasearch");
        LLAMASEARCH_PALETTE
    });
    colors.iter().map(|c| c.to_string()).collect()
}

fn deserialize_palette<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PaletteSpec {
        Named(String),
        Colors(Vec<String>),
    }

    Ok(match PaletteSpec::deserialize(deserializer)? {
        PaletteSpec::Named(name) => resolve_palette(&name),
        PaletteSpec::Colors(colors) => colors,
    })
}

/// Space reserved around the plotting area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 40,
            right: 20,
            bottom: 50,
            left: 60,
        }
    }
}

const STANDARD_FIELDS: &[&str] = &[
    "theme",
    "chart_type",
    "color_palette",
    "show_legend",
    "show_axes",
    "show_grid",
    "interactive",
    "interactions",
    "animation",
    "animation_duration",
    "background_color",
    "axis_labels",
    "font_size",
    "font_family",
    "title_font_size",
    "responsive",
    "smooth_curves",
    "tooltip_format",
    "margin",
];

/// Display options shared by every chart.
///
/// Keys that are not part of the standard set are kept in
/// `additional_options` and serialized alongside the standard ones, so chart
/// templates can read backend-specific switches such as `horizontal` or
/// `cutout` straight off the embedded `config` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub theme: ThemeType,
    pub chart_type: ChartType,
    #[serde(deserialize_with = "deserialize_palette")]
    pub color_palette: Vec<String>,
    pub show_legend: bool,
    pub show_axes: bool,
    pub show_grid: bool,
    pub interactive: bool,
    pub interactions: Vec<Interaction>,
    pub animation: bool,
    /// Milliseconds.
    pub animation_duration: u32,
    pub background_color: Option<String>,
    pub axis_labels: BTreeMap<String, String>,
    pub font_size: u32,
    pub font_family: String,
    pub title_font_size: u32,
    pub responsive: bool,
    pub smooth_curves: bool,
    pub tooltip_format: Option<String>,
    pub margin: Margin,
    #[serde(flatten)]
    pub additional_options: Map<String, Value>,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            theme: ThemeType::default(),
            chart_type: ChartType::default(),
            color_palette: resolve_palette("llamasearch"),
            show_legend: true,
            show_axes: true,
            show_grid: true,
            interactive: true,
            interactions: vec![Interaction::Hover, Interaction::Click, Interaction::Zoom],
            animation: true,
            animation_duration: 1000,
            background_color: None,
            axis_labels: [("x", "X-Axis"), ("y", "Y-Axis"), ("z", "Z-Axis")]
                .into_iter()
                .map(|(axis, label)| (axis.to_string(), label.to_string()))
                .collect(),
            font_size: 12,
            font_family: "Arial, sans-serif".to_string(),
            title_font_size: 18,
            responsive: true,
            smooth_curves: true,
            tooltip_format: None,
            margin: Margin::default(),
            additional_options: Map::new(),
        }
    }
}

impl VisualizationConfig {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            ..Self::default()
        }
    }

    pub fn with_theme(mut self, theme: ThemeType) -> Self {
        self.theme = theme;
        self
    }

    /// Uses a named palette (unknown names fall back to `llamasearch`).
    pub fn with_palette(mut self, name: &str) -> Self {
        self.color_palette = resolve_palette(name);
        self
    }

    pub fn with_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.color_palette = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    pub fn with_interactions(mut self, interactions: Vec<Interaction>) -> Self {
        self.interactions = interactions;
        self
    }

    pub fn with_axis_label(mut self, axis: &str, label: impl Into<String>) -> Self {
        self.axis_labels.insert(axis.to_string(), label.into());
        self
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_options.insert(key.into(), value.into());
        self
    }

    /// Explicit background color, or the theme's default.
    pub fn background_color(&self) -> &str {
        self.background_color
            .as_deref()
            .unwrap_or_else(|| self.theme.default_background())
    }

    pub fn has_interaction(&self, interaction: Interaction) -> bool {
        self.interactions.contains(&interaction)
    }

    /// Reads an additional option, returning `default` when it is missing or
    /// does not have the requested type.
    pub fn option<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.additional_options
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or(default)
    }

    /// Serialized form with the background color resolved against the theme.
    /// This is the object chart templates see as `config`.
    pub fn to_value(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert(
                "background_color".to_string(),
                Value::String(self.background_color().to_string()),
            );
        }
        Ok(value)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }

    /// Builds a configuration from a JSON object. Unknown keys are kept as
    /// additional options.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|err| VisError::Config(err.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Sets a single option by name.
    ///
    /// Standard keys are type-checked against the field they replace; any
    /// other key is stored verbatim as an additional option.
    pub fn update(&mut self, key: &str, value: Value) -> Result<&mut Self> {
        if !STANDARD_FIELDS.contains(&key) {
            self.additional_options.insert(key.to_string(), value);
            return Ok(self);
        }

        let mut current = serde_json::to_value(&*self)?;
        if let Value::Object(map) = &mut current {
            map.insert(key.to_string(), value);
        }
        *self = serde_json::from_value(current)
            .map_err(|err| VisError::Config(format!("`{key}`: {err}")))?;
        Ok(self)
    }
}

impl fmt::Display for VisualizationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VisualizationConfig(theme='{}', chart_type='{}')",
            self.theme, self.chart_type
        )
    }
}

/// Top-level configuration structure for the command line application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub render: RenderConfig,
    pub visualization: VisualizationConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(?path, "loading configuration");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| VisError::Config(err.to_string()))
    }
}

/// Output settings applied when charts are written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub output_dir: Option<String>,
    pub overwrite: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            overwrite: true,
            width: None,
            height: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_follow_light_theme() {
        let config = VisualizationConfig::default();
        assert_eq!(config.chart_type, ChartType::Bar);
        assert_eq!(config.background_color(), "#ffffff");
        assert_eq!(config.color_palette[0], "#6E44FF");
        assert_eq!(config.axis_labels["z"], "Z-Axis");
        assert!(config.has_interaction(Interaction::Zoom));
        assert!(!config.has_interaction(Interaction::Drag));
    }

    #[test]
    fn background_tracks_theme_until_set() {
        let dark = VisualizationConfig::default().with_theme(ThemeType::Dark);
        assert_eq!(dark.background_color(), "#1a1a1a");
        let pastel = VisualizationConfig::default().with_theme(ThemeType::Pastel);
        assert_eq!(pastel.background_color(), "#f6f6f9");
        let custom = pastel.with_background("#000000");
        assert_eq!(custom.background_color(), "#000000");
    }

    #[test]
    fn parses_enums_case_insensitively() {
        assert_eq!("DARK".parse::<ThemeType>().unwrap(), ThemeType::Dark);
        assert_eq!(" scatter3d ".parse::<ChartType>().unwrap(), ChartType::Scatter3D);
        let err = "hologram".parse::<ChartType>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("hologram"));
        assert!(message.contains("surface3d"));
    }

    #[test]
    fn json_round_trip_keeps_additional_options() {
        let config = VisualizationConfig::new(ChartType::Line)
            .with_option("fill", true)
            .with_axis_label("x", "Month");
        let json = config.to_json().unwrap();
        let restored = VisualizationConfig::from_json(&json).unwrap();

        assert_eq!(restored.chart_type, ChartType::Line);
        assert_eq!(restored.additional_options.get("fill"), Some(&json!(true)));
        assert_eq!(restored.axis_labels["x"], "Month");
        assert_eq!(restored.background_color.as_deref(), Some("#ffffff"));
    }

    #[test]
    fn palette_accepts_names_and_lists() {
        let named =
            VisualizationConfig::from_value(json!({ "color_palette": "diverging" })).unwrap();
        assert_eq!(named.color_palette.len(), DIVERGING_PALETTE.len());

        let unknown = VisualizationConfig::from_value(json!({ "color_palette": "nope" })).unwrap();
        assert_eq!(unknown.color_palette[0], LLAMASEARCH_PALETTE[0]);

        let listed =
            VisualizationConfig::from_value(json!({ "color_palette": ["#000", "#fff"] })).unwrap();
        assert_eq!(listed.color_palette, vec!["#000", "#fff"]);
    }

    #[test]
    fn update_checks_standard_fields() {
        let mut config = VisualizationConfig::default();
        config.update("font_size", json!(16)).unwrap();
        config.update("horizontal", json!(true)).unwrap();
        assert_eq!(config.font_size, 16);
        assert!(config.option("horizontal", false));

        let err = config.update("font_size", json!("huge")).unwrap_err();
        assert!(matches!(err, VisError::Config(_)));
        assert_eq!(config.font_size, 16);
    }

    #[test]
    fn option_falls_back_on_type_mismatch() {
        let config = VisualizationConfig::default().with_option("cutout", 5);
        assert_eq!(config.option("cutout", "70%".to_string()), "70%");
        assert_eq!(config.option("missing", 3_u32), 3);
    }

    #[test]
    fn display_matches_short_form() {
        let config = VisualizationConfig::new(ChartType::Pie);
        assert_eq!(
            config.to_string(),
            "VisualizationConfig(theme='light', chart_type='pie')"
        );
    }

    #[test]
    fn app_config_reads_toml_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [render]
            overwrite = false
            width = 640

            [visualization]
            theme = "dark"
            color_palette = "categorical"
            show_labels = true
            "#,
        )
        .unwrap();

        assert!(!config.render.overwrite);
        assert_eq!(config.render.width, Some(640));
        assert_eq!(config.visualization.theme, ThemeType::Dark);
        assert_eq!(config.visualization.color_palette.len(), 10);
        assert!(config.visualization.option("show_labels", false));
    }

    #[test]
    fn default_app_config_serializes_to_toml() {
        let text = AppConfig::default().to_toml_string().unwrap();
        assert!(text.contains("[visualization]"));
        let restored = AppConfig::from_toml_str(&text).unwrap();
        assert_eq!(restored, AppConfig::default());
    }
}
