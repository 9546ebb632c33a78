//! # Blue Carbon CLI
//!
//! Headless inspection of ecosystem map data.
//!
//! ## Usage
//!
//! ```bash
//! # Totals for every site in a file
//! bluecarbon summary --data ecosystems.json
//!
//! # Totals for active mangrove and seagrass projects only
//! bluecarbon summary --data ecosystems.json --type mangrove --type seagrass --status active
//!
//! # Project visible sites through the backend described in map.toml
//! bluecarbon markers --config map.toml --json
//!
//! # Print the legend
//! bluecarbon legend
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bluecarbon_map::{
    aggregate, filter, legend, load_records, EcosystemType, FilterState, IngestReport,
    MapBackend, MapConfig, MapRenderer, MapSession, ProjectStatus, StorageLevel,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "bluecarbon")]
#[command(about = "Inspect blue carbon ecosystem map data")]
#[command(version)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count and total the sites that pass the filters
    Summary {
        /// Record file (.json or .geojson)
        #[arg(short, long)]
        data: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Print projected markers for the view described in map.toml
    Markers {
        /// Map configuration file
        #[arg(short, long, env = "BLUECARBON_MAP_CONFIG")]
        config: PathBuf,

        /// Emit the full scene as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print legend labels and colors
    Legend,
}

/// Filter selection; a dimension with no flags stays fully selected
#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Ecosystem type to keep (repeatable)
    #[arg(long = "type", value_name = "TYPE")]
    types: Vec<EcosystemType>,

    /// Storage level to keep (repeatable)
    #[arg(long = "level", value_name = "LEVEL")]
    levels: Vec<StorageLevel>,

    /// Project status to keep (repeatable)
    #[arg(long = "status", value_name = "STATUS")]
    statuses: Vec<ProjectStatus>,
}

impl FilterArgs {
    fn to_state(&self) -> FilterState {
        let mut state = FilterState::all();
        if !self.types.is_empty() {
            state.ecosystem_types = self.types.iter().copied().collect();
        }
        if !self.levels.is_empty() {
            state.storage_levels = self.levels.iter().copied().collect();
        }
        if !self.statuses.is_empty() {
            state.project_statuses = self.statuses.iter().copied().collect();
        }
        state
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Summary { data, filters } => run_summary(&data, &filters),
        Command::Markers { config, json } => run_markers(&config, json),
        Command::Legend => {
            print_legend();
            Ok(())
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn load(path: &Path) -> Result<IngestReport> {
    let report = load_records(path)
        .with_context(|| format!("Failed to load records from {}", path.display()))?;
    if !report.is_clean() {
        warn!(
            "{} record(s) rejected; see warnings above",
            report.rejected.len()
        );
    }
    Ok(report)
}

fn run_summary(data: &Path, filters: &FilterArgs) -> Result<()> {
    let report = load(data)?;
    let state = filters.to_state();
    let visible = filter(&report.records, &state);
    let display = aggregate(visible).display();

    println!("{}", "Blue Carbon Summary".bold());
    println!("  {:<22} {}", "Ecosystems", display.count.cyan());
    println!("  {:<22} {}", "Total Carbon Storage", display.total_carbon_storage.green());
    println!("  {:<22} {}", "Total Area", display.total_area.blue());
    Ok(())
}

fn run_markers(config_path: &Path, json: bool) -> Result<()> {
    let config = MapConfig::load(config_path)
        .with_context(|| format!("Failed to load map config {}", config_path.display()))?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let report = load(&config.resolve_path(base_dir, &config.project.data))?;
    let session = MapSession::with_filters(report.records, config.initial_filters());

    let backend = config.backend(base_dir)?;
    info!(
        "Rendering '{}' with the {} backend ({} of {} records visible)",
        config.project.name,
        backend.name(),
        session.visible_count(),
        session.records().len()
    );

    let renderer = MapRenderer::new(backend);
    let scene = renderer.scene(session.visible());

    if json {
        println!("{}", serde_json::to_string_pretty(&scene)?);
        return Ok(());
    }

    println!("{}", config.project.name.bold());
    for marker in &scene.markers {
        let position = format!("({:>5.1}%, {:>5.1}%)", marker.position.x_pct, marker.position.y_pct);
        let position = if marker.position.clamped {
            position.yellow()
        } else {
            position.normal()
        };
        println!(
            "  {:<3} {:<32} {:<18} {}",
            marker.order,
            marker.label,
            marker.ecosystem_type.display_name(),
            position
        );
    }

    let display = session.summary().display();
    println!(
        "\n  {} ecosystems · {} · {}",
        display.count, display.total_carbon_storage, display.total_area
    );
    Ok(())
}

fn print_legend() {
    let legend = legend();

    println!("{}", "Ecosystem Types".bold());
    for entry in &legend.ecosystem_types {
        println!("  {:<16} {}", entry.value, entry.label);
    }

    println!("{}", "Carbon Storage".bold());
    for entry in &legend.storage_levels {
        println!("  {} {:<16} {}", swatch(entry.color), entry.value, entry.label);
    }

    println!("{}", "Project Status".bold());
    for entry in &legend.project_statuses {
        println!("  {} {:<16} {}", swatch(entry.color), entry.value, entry.label);
    }
}

/// Two-cell colored block for a `#rrggbb` color
fn swatch(color: Option<&str>) -> String {
    let rgb = color
        .and_then(|c| c.strip_prefix('#'))
        .filter(|hex| hex.len() == 6)
        .and_then(|hex| {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        });
    match rgb {
        Some((r, g, b)) => "  ".on_truecolor(r, g, b).to_string(),
        None => "  ".to_string(),
    }
}
