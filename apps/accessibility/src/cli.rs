//! Command-line arguments and their mapping onto [`EngineConfig`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use ax_core::{EngineConfig, Weight};

#[derive(Parser, Debug)]
#[command(name = "accessibility")]
#[command(about = "Network distance from every target to its nearest point of interest, per category")]
#[command(version)]
pub struct Args {
    /// Node table: `node_id,easting,northing` (planar metres).
    #[arg(long)]
    pub nodes: PathBuf,

    /// Edge table: `source,target,length,time_weighted`.
    #[arg(long)]
    pub edges: PathBuf,

    /// Target points: `id,easting,northing[,node_id]`.
    #[arg(long)]
    pub targets: PathBuf,

    /// Directory of source files; each `*.csv` is one category.
    #[arg(long)]
    pub sources_dir: PathBuf,

    /// Disconnected links (ferries) merged into the network before attachment.
    #[arg(long)]
    pub links: Option<PathBuf>,

    /// Output directory.  Checkpoint logs go to `<out-dir>/logs`.
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Engine configuration as JSON; flags below override its fields.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Routing cost: `time` or `length`.
    #[arg(long)]
    pub weight: Option<Weight>,

    #[arg(long)]
    pub min_buffer: Option<f64>,

    #[arg(long)]
    pub max_buffer: Option<f64>,

    #[arg(long)]
    pub estimate_k: Option<usize>,

    #[arg(long)]
    pub attach_k: Option<usize>,

    /// Parallel shards per category (needs the `parallel` feature).
    #[arg(long, default_value_t = 1)]
    pub shards: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Sqlite,
    Parquet,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv     => "csv",
            OutputFormat::Sqlite  => "sqlite",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl Args {
    /// Defaults, then the JSON file, then command-line overrides.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => EngineConfig::default(),
        };
        if let Some(weight) = self.weight {
            config.weight = weight;
        }
        if let Some(v) = self.min_buffer {
            config.min_buffer = v;
        }
        if let Some(v) = self.max_buffer {
            config.max_buffer = v;
        }
        if let Some(v) = self.estimate_k {
            config.estimate_k = v;
        }
        if let Some(v) = self.attach_k {
            config.attach_k = v;
        }
        config.validate().context("invalid engine configuration")?;
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<EngineConfig> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening config {}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing config {}", path.display()))
}
