//! HTML page assembly and output for rendered visualizations.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, VisError};

/// JavaScript libraries a page can load from a CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Library {
    #[serde(rename = "chartjs")]
    ChartJs,
    #[serde(rename = "chartjs-datalabels")]
    ChartJsDatalabels,
    #[serde(rename = "d3")]
    D3,
    #[serde(rename = "d3-force")]
    D3Force,
    #[serde(rename = "threejs")]
    ThreeJs,
    #[serde(rename = "threejs-controls")]
    ThreeJsControls,
    #[serde(rename = "threejs-css2d")]
    ThreeJsCss2d,
    #[serde(rename = "gsap")]
    Gsap,
    #[serde(rename = "lottie")]
    Lottie,
    #[serde(rename = "jquery")]
    JQuery,
}

impl Library {
    pub const ALL: [Library; 10] = [
        Library::ChartJs,
        Library::ChartJsDatalabels,
        Library::D3,
        Library::D3Force,
        Library::ThreeJs,
        Library::ThreeJsControls,
        Library::ThreeJsCss2d,
        Library::Gsap,
        Library::Lottie,
        Library::JQuery,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Library::ChartJs => "chartjs",
            Library::ChartJsDatalabels => "chartjs-datalabels",
            Library::D3 => "d3",
            Library::D3Force => "d3-force",
            Library::ThreeJs => "threejs",
            Library::ThreeJsControls => "threejs-controls",
            Library::ThreeJsCss2d => "threejs-css2d",
            Library::Gsap => "gsap",
            Library::Lottie => "lottie",
            Library::JQuery => "jquery",
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            Library::ChartJs => "https://cdn.jsdelivr.net/npm/chart.js@4.3.0/dist/chart.umd.min.js",
            Library::ChartJsDatalabels => {
                "https://cdn.jsdelivr.net/npm/chartjs-plugin-datalabels@2.2.0/dist/chartjs-plugin-datalabels.min.js"
            }
            Library::D3 => "https://d3js.org/d3.v7.min.js",
            Library::D3Force => "https://d3js.org/d3-force.v2.min.js",
            Library::ThreeJs => "https://cdn.jsdelivr.net/npm/three@0.154.0/build/three.min.js",
            Library::ThreeJsControls => {
                "https://cdn.jsdelivr.net/npm/three@0.154.0/examples/js/controls/OrbitControls.js"
            }
            Library::ThreeJsCss2d => {
                "https://cdn.jsdelivr.net/npm/three@0.154.0/examples/js/renderers/CSS2DRenderer.js"
            }
            Library::Gsap => "https://cdn.jsdelivr.net/npm/gsap@3.12.2/dist/gsap.min.js",
            Library::Lottie => "https://cdnjs.cloudflare.com/ajax/libs/bodymovin/5.12.0/lottie.min.js",
            Library::JQuery => "https://code.jquery.com/jquery-3.7.0.min.js",
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Library {
    type Err = VisError;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim().to_ascii_lowercase().replace('_', "-");
        Library::ALL
            .into_iter()
            .find(|lib| lib.name() == wanted)
            .ok_or_else(|| VisError::Unsupported {
                kind: "library",
                value: value.to_string(),
                expected: Library::ALL.map(Library::name).join(", "),
            })
    }
}

/// A CSS length. Pixel counts serialize as plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(u32),
    Css(String),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Pixels(px) => write!(f, "{px}px"),
            Dimension::Css(css) => f.write_str(css),
        }
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Dimension::Pixels(px)
    }
}

impl From<&str> for Dimension {
    fn from(css: &str) -> Self {
        Dimension::Css(css.to_string())
    }
}

impl From<String> for Dimension {
    fn from(css: String) -> Self {
        Dimension::Css(css)
    }
}

/// Everything that goes into one standalone HTML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    pub container_id: String,
    pub width: Dimension,
    pub height: Dimension,
    pub libraries: Vec<Library>,
    pub styles: Vec<(String, String)>,
    pub css: String,
    pub script: String,
}

impl Page {
    pub fn new(title: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            container_id: container_id.into(),
            width: Dimension::from("100%"),
            height: Dimension::from("500px"),
            libraries: Vec::new(),
            styles: Vec::new(),
            css: String::new(),
            script: String::new(),
        }
    }

    pub fn size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.width = width.into();
        self.height = height.into();
        self
    }

    /// Adds a library unless it is already present.
    pub fn library(mut self, library: Library) -> Self {
        if !self.libraries.contains(&library) {
            self.libraries.push(library);
        }
        self
    }

    pub fn libraries(self, libraries: impl IntoIterator<Item = Library>) -> Self {
        libraries.into_iter().fold(self, Page::library)
    }

    /// Extra inline style on the container. Overrides a base property of the
    /// same name.
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.push((property.into(), value.into()));
        self
    }

    pub fn css(mut self, css: impl Into<String>) -> Self {
        self.css = css.into();
        self
    }

    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    fn container_style(&self) -> String {
        let mut styles: Vec<(String, String)> = vec![
            ("width".into(), self.width.to_string()),
            ("height".into(), self.height.to_string()),
            ("margin".into(), "0 auto".into()),
            ("position".into(), "relative".into()),
            ("overflow".into(), "hidden".into()),
        ];
        for (property, value) in &self.styles {
            match styles.iter_mut().find(|(p, _)| p == property) {
                Some(existing) => existing.1 = value.clone(),
                None => styles.push((property.clone(), value.clone())),
            }
        }
        styles
            .iter()
            .map(|(p, v)| format!("{p}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

const BASE_CSS: &str = "\
        body {
            font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #f5f5f5;
        }
        .container {
            background-color: #fff;
            border-radius: 5px;
            box-shadow: 0 2px 10px rgba(0, 0, 0, 0.1);
            padding: 20px;
            max-width: 1200px;
            margin: 0 auto;
        }";

/// Turns a [`Page`] into a standalone HTML5 document.
#[derive(Debug, Clone, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_page(&self, page: &Page) -> String {
        debug!(
            container = %page.container_id,
            libraries = page.libraries.len(),
            "rendering page"
        );

        let scripts: String = page
            .libraries
            .iter()
            .map(|lib| format!("\n    <script src=\"{}\"></script>", lib.url()))
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{base_css}
        {css}
    </style>{scripts}
</head>
<body>
    <div class="container">
        <div id="{id}" style="{style}"></div>
    </div>
    <script>
        document.addEventListener('DOMContentLoaded', function() {{
{script}
        }});
    </script>
</body>
</html>"#,
            base_css = BASE_CSS,
            title = escape_html(&page.title),
            css = page.css,
            id = escape_html(&page.container_id),
            style = escape_html(&page.container_style()),
            script = page.script,
        )
    }
}

/// Escapes the five HTML special characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// `const var_name = <json>;` with `<`, `>` and `&` written as unicode
/// escapes, so embedded strings cannot end the script element or open a
/// comment inside it.
pub fn embed_data<T: Serialize + ?Sized>(var_name: &str, data: &T) -> Result<String> {
    let json = serde_json::to_string(data)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026");
    Ok(format!("const {var_name} = {json};"))
}

pub fn script_tag(code: &str, is_module: bool, id: Option<&str>) -> String {
    let id_attr = id
        .map(|id| format!(" id=\"{}\"", escape_html(id)))
        .unwrap_or_default();
    let type_attr = if is_module { " type=\"module\"" } else { "" };
    format!("<script{id_attr}{type_attr}>\n{code}\n</script>")
}

/// Writes `html` to `path`, creating parent directories. Without
/// `overwrite`, an existing file is kept and the first free `stem_N.ext`
/// is used instead. Returns the absolute path written.
pub fn save_html(html: &str, path: impl AsRef<Path>, overwrite: bool) -> Result<PathBuf> {
    let path = path.as_ref();
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let target = if overwrite || !path.exists() {
        path
    } else {
        next_free_path(&path)
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, html)?;
    info!(path = %target.display(), bytes = html.len(), "saved visualization");
    Ok(target)
}

fn next_free_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| path.with_file_name(format!("{stem}_{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// `<iframe>` carrying the whole document as a base64 `data:` URI.
pub fn iframe_embed(html: &str, width: &Dimension, height: &Dimension) -> String {
    let encoded = STANDARD.encode(html.as_bytes());
    format!(
        "<iframe src=\"data:text/html;base64,{encoded}\" width=\"{width}\" height=\"{height}\" frameborder=\"0\"></iframe>"
    )
}

pub fn open_in_browser(path: impl AsRef<Path>) -> Result<()> {
    let path = fs::canonicalize(path.as_ref())?;
    let url = format!("file://{}", path.display());
    webbrowser::open(&url)?;
    info!(%url, "opened visualization in browser");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn page() -> Page {
        Page::new("Sales <2024>", "chart_1")
            .size(Dimension::Pixels(800), "60vh")
            .libraries([Library::D3, Library::D3Force, Library::D3])
            .script("draw();")
    }

    #[test]
    fn page_includes_cdn_scripts_once() {
        let html = Renderer::new().render_page(&page());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches(Library::D3.url()).count(), 1);
        assert!(html.contains(Library::D3Force.url()));
        assert!(html.contains("<title>Sales &lt;2024&gt;</title>"));
        assert!(html.contains("document.addEventListener('DOMContentLoaded'"));
    }

    #[test]
    fn container_style_merges_overrides() {
        let page = page().style("overflow", "visible").style("border", "1px solid");
        let html = Renderer::new().render_page(&page);
        assert!(html.contains(
            "style=\"width: 800px; height: 60vh; margin: 0 auto; position: relative; overflow: visible; border: 1px solid\""
        ));
    }

    #[test]
    fn embedded_data_cannot_close_script() {
        let js = embed_data("data", &json!({ "label": "</script><b>" })).unwrap();
        assert_eq!(js, r#"const data = {"label":"\u003c/script\u003e\u003cb\u003e"};"#);

        let js = embed_data("data", &json!({ "labels": ["<!--<script>", "a & b"] })).unwrap();
        assert!(!js.contains('<'));
        assert!(!js.contains('>'));
        assert!(js.contains(r#""\u003c!--\u003cscript\u003e","a \u0026 b""#));
        let literal = &js["const data = ".len()..js.len() - 1];
        let decoded: serde_json::Value = serde_json::from_str(literal).unwrap();
        assert_eq!(decoded["labels"][0], "<!--<script>");
    }

    #[test]
    fn script_tag_attributes() {
        assert_eq!(script_tag("x()", false, None), "<script>\nx()\n</script>");
        assert_eq!(
            script_tag("x()", true, Some("main")),
            "<script id=\"main\" type=\"module\">\nx()\n</script>"
        );
    }

    #[test]
    fn save_without_overwrite_picks_free_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chart.html");

        let first = save_html("<p>1</p>", &path, false).unwrap();
        let second = save_html("<p>2</p>", &path, false).unwrap();
        let third = save_html("<p>3</p>", &path, false).unwrap();

        assert_eq!(first, path);
        assert_eq!(second, dir.path().join("nested").join("chart_1.html"));
        assert_eq!(third, dir.path().join("nested").join("chart_2.html"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>1</p>");

        save_html("<p>4</p>", &path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>4</p>");
    }

    #[test]
    fn iframe_carries_base64_document() {
        let iframe = iframe_embed("<p>hi</p>", &Dimension::from("100%"), &Dimension::Pixels(300));
        assert!(iframe.contains("src=\"data:text/html;base64,PHA+aGk8L3A+\""));
        assert!(iframe.contains("width=\"100%\" height=\"300px\""));
    }

    #[test]
    fn library_names_parse() {
        assert_eq!("d3_force".parse::<Library>().unwrap(), Library::D3Force);
        assert_eq!("ChartJS".parse::<Library>().unwrap(), Library::ChartJs);
        assert!("plotly".parse::<Library>().is_err());
        assert_eq!(serde_json::to_value(Library::ThreeJsCss2d).unwrap(), json!("threejs-css2d"));
    }

    #[test]
    fn dimensions_render_as_css() {
        assert_eq!(Dimension::from(640u32).to_string(), "640px");
        assert_eq!(Dimension::from("50%").to_string(), "50%");
        assert_eq!(serde_json::to_value(Dimension::Pixels(10)).unwrap(), json!(10));
    }
}
