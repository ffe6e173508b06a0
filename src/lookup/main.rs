//! One-shot and batch territory lookups from the command line.

mod batch;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gridfinder::config::Config;
use gridfinder::models::checked_position;
use gridfinder::spatial::haversine_miles;
use gridfinder::AssignmentResolver;

#[derive(Parser, Debug)]
#[command(name = "lookup")]
#[command(about = "Resolve points to substation, feeder, hut and grid")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "gridfinder.toml")]
    config: PathBuf,

    /// Longitude of a single query point
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Latitude of a single query point
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// CSV file of lon,lat[,label] rows
    #[arg(long, conflicts_with_all = ["lon", "lat"])]
    csv: Option<PathBuf>,

    /// Also report the distance from the query point to this "lon,lat"
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    compare: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout carries results
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load_from_file(&args.config)?;
    let layers = config.load_layers().context("Failed to load layers")?;
    let resolver = AssignmentResolver::new(config.resolver_options());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Some(path) = &args.csv {
        let rows = batch::read_rows(path)?;
        batch::run(&rows, &resolver, &layers, &mut out)?;
        out.flush()?;
        return Ok(());
    }

    let (Some(lon), Some(lat)) = (args.lon, args.lat) else {
        bail!("either --lon/--lat or --csv is required");
    };
    let point = checked_position(lon, lat).map_err(anyhow::Error::msg)?;

    info!("Resolving ({}, {})", lon, lat);
    let result = resolver.resolve(point, &layers);
    serde_json::to_writer_pretty(&mut out, &result)?;
    writeln!(out)?;

    if let Some(other) = &args.compare {
        let parts: Vec<f64> = other
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect();
        let [other_lon, other_lat] = parts.as_slice() else {
            bail!("--compare expects \"lon,lat\", got {:?}", other);
        };
        let other_point = checked_position(*other_lon, *other_lat).map_err(anyhow::Error::msg)?;
        writeln!(
            out,
            "Distance to ({}, {}): {:.2} mi",
            other_lon,
            other_lat,
            haversine_miles(point, other_point)
        )?;
    }

    out.flush()?;
    Ok(())
}
