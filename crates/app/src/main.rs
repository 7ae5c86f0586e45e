use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use llamavis_core::{
    generate_color_scale, AppConfig, BarChart, ChartType, Dimension, DonutChart, HeatmapVis,
    LineChart, Network3D, NetworkGraph, PieChart, RadarChart, Scatter3D, ScatterChart, Table,
    ThemeType, VisError, Visualization,
};
use tracing_subscriber::EnvFilter;

fn main() -> llamavis_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chart {
            kind,
            input,
            x,
            y,
            value,
            output,
        } => run_chart(&kind, &input, x.as_deref(), &y, value.as_deref(), &output),
        Commands::Network {
            input,
            source,
            target,
            weight,
            three_d,
            output,
        } => run_network(&input, &source, &target, weight.as_deref(), three_d, &output),
        Commands::Palette {
            scheme,
            count,
            start,
            end,
        } => run_palette(&scheme, count, start.as_deref(), end.as_deref()),
        Commands::Config { format } => run_config(format),
    }
}

fn run_chart(
    kind: &str,
    input: &Path,
    x: Option<&str>,
    ys: &[String],
    value: Option<&str>,
    output: &OutputArgs,
) -> llamavis_core::Result<()> {
    let kind: ChartType = kind.parse()?;
    tracing::info!(%kind, ?input, "rendering chart");

    let table = read_table(input)?;
    let ys: Vec<&str> = ys.iter().map(String::as_str).collect();
    let app = output.app_config()?;
    let config = output.visualization_config(&app, kind)?;

    let chart: Box<dyn Visualization> = match kind {
        ChartType::Line => Box::new(LineChart::with_config(table.to_chart_data(x, &ys)?, config)),
        ChartType::Bar => Box::new(BarChart::with_config(table.to_chart_data(x, &ys)?, config)),
        ChartType::Radar => Box::new(RadarChart::with_config(table.to_chart_data(x, &ys)?, config)),
        ChartType::Pie => {
            let data = table.to_pie_data(x, ys.first().copied())?;
            Box::new(PieChart::with_config(data, config))
        }
        ChartType::Donut => {
            let data = table.to_pie_data(x, ys.first().copied())?;
            Box::new(DonutChart::with_config(data, config))
        }
        ChartType::Scatter => {
            Box::new(ScatterChart::with_config(table.to_scatter_data(x, &ys)?, config))
        }
        ChartType::Heatmap => {
            let (x, y, value) = match (x, ys.first(), value) {
                (Some(x), Some(y), Some(value)) => (x, *y, value),
                _ => return Err(VisError::msg("heatmap needs --x, --y and --value")),
            };
            Box::new(HeatmapVis::with_config(table.to_heatmap_data(x, y, value)?, config))
        }
        ChartType::Scatter3D => {
            let (x, y, z) = match (x, ys.as_slice()) {
                (Some(x), [y, z, ..]) => (x, *y, *z),
                _ => return Err(VisError::msg("scatter3d needs --x and two --y columns")),
            };
            Box::new(Scatter3D::with_config(table.to_points3d(x, y, z, value)?, config))
        }
        other => {
            return Err(VisError::Unsupported {
                kind: "chart command kind",
                value: other.to_string(),
                expected: "line, bar, pie, donut, radar, scatter, heatmap, scatter3d".into(),
            })
        }
    };

    emit(chart, output, &app)
}

fn run_network(
    input: &Path,
    source: &str,
    target: &str,
    weight: Option<&str>,
    three_d: bool,
    output: &OutputArgs,
) -> llamavis_core::Result<()> {
    tracing::info!(?input, three_d, "rendering network");

    let table = read_table(input)?;
    let data = table.to_network_data(source, target, weight, &[], &[])?;
    let app = output.app_config()?;

    let chart: Box<dyn Visualization> = if three_d {
        let config = output.visualization_config(&app, ChartType::Network3D)?;
        Box::new(Network3D::with_config(data, config))
    } else {
        let config = output.visualization_config(&app, ChartType::Network)?;
        Box::new(NetworkGraph::with_config(data, config))
    };

    emit(chart, output, &app)
}

fn run_palette(
    scheme: &str,
    count: usize,
    start: Option<&str>,
    end: Option<&str>,
) -> llamavis_core::Result<()> {
    let scheme = match (start, end) {
        (Some(_), Some(_)) => "gradient",
        _ => scheme,
    };
    for color in generate_color_scale(count, scheme, start, end)? {
        println!("{color}");
    }
    Ok(())
}

fn run_config(format: ConfigFormat) -> llamavis_core::Result<()> {
    let config = AppConfig::default();
    let text = match format {
        ConfigFormat::Toml => config.to_toml_string()?,
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
    };
    println!("{text}");
    Ok(())
}

/// Reads a table from a `.json` array of records, or from CSV otherwise.
fn read_table(path: &Path) -> llamavis_core::Result<Table> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Table::from_json_str(&std::fs::read_to_string(path)?)
    } else {
        Table::from_csv_path(path)
    }
}

fn emit(
    mut chart: Box<dyn Visualization>,
    output: &OutputArgs,
    app: &AppConfig,
) -> llamavis_core::Result<()> {
    let frame = chart.frame_mut();
    if let Some(title) = &output.title {
        frame.title = title.clone();
    }
    if let Some(width) = output.width.or(app.render.width) {
        frame.width = Dimension::Pixels(width);
    }
    if let Some(height) = output.height.or(app.render.height) {
        frame.height = Dimension::Pixels(height);
    }

    if output.iframe {
        println!("{}", chart.to_iframe(None, None)?);
        return Ok(());
    }

    let path = output.output_path(app);
    match (path, output.open) {
        (Some(path), false) => {
            let overwrite = app.render.overwrite && !output.no_overwrite;
            let saved = chart.save(&path, overwrite)?;
            println!("{}", saved.display());
        }
        (path, true) => {
            let shown = chart.show(path.as_deref())?;
            println!("{}", shown.display());
        }
        (None, false) => {
            return Err(VisError::msg("--output is required unless --open or --iframe is set"))
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Render LlamaVis charts to standalone HTML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a chart from a CSV or JSON table.
    Chart {
        /// Chart kind: line, bar, pie, donut, radar, scatter, heatmap or scatter3d.
        #[arg(short, long)]
        kind: String,
        /// CSV file, or a `.json` array of records.
        #[arg(short, long)]
        input: PathBuf,
        /// Label (or x) column; defaults to the first column.
        #[arg(long)]
        x: Option<String>,
        /// Value columns; defaults to every column but `--x`.
        #[arg(long)]
        y: Vec<String>,
        /// Cell column for heatmaps, group column for scatter3d.
        #[arg(long)]
        value: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render a network from an edge list.
    Network {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        weight: Option<String>,
        /// Draw a Three.js scene instead of a D3 force layout.
        #[arg(long = "three-d")]
        three_d: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print a color scale, one hex color per line.
    Palette {
        #[arg(long, default_value = "spectrum")]
        scheme: String,
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Gradient start; used with `--end`.
        #[arg(long, requires = "end")]
        start: Option<String>,
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
    /// Print the default configuration.
    Config {
        #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConfigFormat {
    Json,
    Toml,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// HTML file to write.
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    theme: Option<String>,
    /// TOML file with `[render]` and `[visualization]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Write `name_1.html` and so on instead of replacing an existing file.
    #[arg(long)]
    no_overwrite: bool,
    /// Open the page in the default browser.
    #[arg(long)]
    open: bool,
    /// Print an iframe snippet instead of writing a file.
    #[arg(long)]
    iframe: bool,
}

impl OutputArgs {
    fn app_config(&self) -> llamavis_core::Result<AppConfig> {
        match &self.config {
            Some(path) => AppConfig::load(path),
            None => Ok(AppConfig::default()),
        }
    }

    fn visualization_config(
        &self,
        app: &AppConfig,
        kind: ChartType,
    ) -> llamavis_core::Result<llamavis_core::VisualizationConfig> {
        let mut config = app.visualization.clone();
        config.chart_type = kind;
        if let Some(theme) = &self.theme {
            config = config.with_theme(theme.parse::<ThemeType>()?);
        }
        Ok(config)
    }

    /// `--output`, resolved against `[render] output_dir` when relative.
    fn output_path(&self, app: &AppConfig) -> Option<PathBuf> {
        let path = self.output.as_ref()?;
        match &app.render.output_dir {
            Some(dir) if path.is_relative() => Some(Path::new(dir).join(path)),
            _ => Some(path.clone()),
        }
    }
}
