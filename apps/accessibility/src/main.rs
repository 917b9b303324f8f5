//! `accessibility`: network distance from every target to the nearest source
//! of each point-of-interest category.
//!
//! Each `*.csv` file in `--sources-dir` is one category.  A category whose
//! output already exists is skipped; an interrupted category resumes from its
//! checkpoint log under `<out-dir>/logs`.
//!
//! Run with:
//!   cargo run -p accessibility --release -- --nodes nodes.csv --edges edges.csv \
//!       --targets postcodes.csv --sources-dir pois/ --out-dir out/

mod cli;
mod progress;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use ax_batch::Pipeline;
use ax_network::loader::{load_links_csv, load_network_csv, load_points_csv};
use ax_network::merge_links;
use ax_reduce::{CsvWriter, DistanceWriter, export_table};

use cli::{Args, OutputFormat};
use progress::ProgressObserver;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let config = args.engine_config()?;
    info!("engine config: {config:?}");

    // 1. Road network, plus ferries.
    let t_load = Instant::now();
    let mut builder = load_network_csv(&args.nodes, &args.edges).context("loading road network")?;
    if let Some(links) = &args.links {
        let links = load_links_csv(links).with_context(|| format!("loading links {}", links.display()))?;
        let merged = merge_links(&mut builder, &links)?;
        info!("merged {merged} of {} disconnected links", links.len());
    }

    // 2. Targets are attached once and shared by every category.
    let targets = load_points_csv(&args.targets)
        .with_context(|| format!("loading targets {}", args.targets.display()))?;
    let pipeline = Pipeline::new(config, builder, &targets).context("attaching targets")?;
    info!("network ready in {:.2}s", t_load.elapsed().as_secs_f64());

    // 3. Categories.
    let log_dir = args.out_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating {}", log_dir.display()))?;

    for (category, path) in categories(&args.sources_dir)? {
        let out_path = args.out_dir.join(format!("{category}.{}", args.format.extension()));
        if out_path.exists() {
            warn!("{category}: {} exists, skipping", out_path.display());
            continue;
        }

        let t_cat = Instant::now();
        let sources = load_points_csv(&path)
            .with_context(|| format!("loading sources {}", path.display()))?;
        let mut observer = ProgressObserver::default();
        let outcome = pipeline
            .run_category(&category, &sources, &log_dir, args.shards, &mut observer)
            .with_context(|| format!("routing category {category}"))?;

        // Written under a temporary name so a crash never leaves an output
        // that would make the next run skip the category.  The checkpoint
        // log is only removed after the rename.
        let partial = out_path.with_extension(format!("{}.partial", args.format.extension()));
        let mut writer = open_writer(args.format, &partial)?;
        let rows = export_table(&outcome.table, pipeline.targets(), writer.as_mut())
            .with_context(|| format!("writing {}", partial.display()))?;
        drop(writer);
        std::fs::rename(&partial, &out_path)
            .with_context(|| format!("renaming {} to {}", partial.display(), out_path.display()))?;
        outcome.finish().with_context(|| format!("removing checkpoint logs of {category}"))?;

        info!(
            "{category}: {rows} rows to {} in {:.2}s",
            out_path.display(),
            t_cat.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

/// `(category, path)` for every `*.csv` in `dir`, sorted by name.
fn categories(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "csv") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                found.push((stem.to_string(), path.clone()));
            }
        }
    }
    found.sort();
    info!("{} categories in {}", found.len(), dir.display());
    Ok(found)
}

fn open_writer(format: OutputFormat, path: &Path) -> Result<Box<dyn DistanceWriter>> {
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvWriter::new(path)?),
        #[cfg(feature = "sqlite")]
        OutputFormat::Sqlite => Box::new(ax_reduce::SqliteWriter::new(path)?),
        #[cfg(feature = "parquet")]
        OutputFormat::Parquet => Box::new(ax_reduce::ParquetWriter::new(path)?),
        #[allow(unreachable_patterns)]
        other => bail!("output format {other:?} needs the `{}` feature", other.extension()),
    })
}
