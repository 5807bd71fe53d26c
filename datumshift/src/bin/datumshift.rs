use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use datumshift::grid_file::GridShiftFile;
use datumshift::{
    BridgeBuilder, Catalog, ConversionDispatcher, Coordinate, EngineConfig, ErrorPolicy, Result,
    Status,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Geodetic datum shifts with NTv2 grid files", long_about = None)]
struct Cli {
    /// Verbosity; repeat for more (-v, -vv, -vvv). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the headers and sub-grids of a grid file
    Info {
        /// Grid file
        grid: PathBuf,
    },
    /// Apply a grid file to one point
    Shift {
        /// Grid file
        grid: PathBuf,
        /// Longitude, degrees east
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        /// Latitude, degrees north
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        /// Apply the file's inverse
        #[arg(long)]
        inverse: bool,
    },
    /// Convert one point between two datums of a catalog
    Convert {
        /// Catalog of datums and transformations (JSON)
        #[arg(long)]
        catalog: PathBuf,
        /// Source datum
        #[arg(long)]
        from: String,
        /// Target datum
        #[arg(long)]
        to: String,
        /// Longitude, degrees east
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        /// Latitude, degrees north
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        /// Ellipsoidal height, meters
        #[arg(allow_negative_numbers = true, default_value_t = 0.0)]
        hgt: f64,
        /// Soft error policy; defaults to the configured one
        #[arg(long)]
        policy: Option<ErrorPolicy>,
        /// Convert heights as well
        #[arg(long)]
        three_d: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Info { grid } => run_info(&grid, &config),
        Commands::Shift {
            grid,
            lng,
            lat,
            inverse,
        } => run_shift(&grid, lng, lat, inverse, &config),
        Commands::Convert {
            catalog,
            from,
            to,
            lng,
            lat,
            hgt,
            policy,
            three_d,
        } => run_convert(
            &catalog,
            &from,
            &to,
            Coordinate::new(lng, lat, hgt),
            policy.unwrap_or(config.policy),
            three_d,
            &config,
        ),
    });

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            EngineConfig::from_json_file(path)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn run_info(grid: &Path, config: &EngineConfig) -> Result<ExitCode> {
    let file = GridShiftFile::open(grid, config.grid.clone())?;
    let header = file.header();
    let bounds = file.bounds();
    println!("file:       {}", file.path().display());
    println!("backend:    {}", file.backend());
    println!("dialect:    {} {:?}-endian", header.dialect, header.byte_order);
    println!("units:      {}", header.units.label());
    println!("version:    {}", header.version);
    println!("systems:    {} -> {}", header.system_from, header.system_to);
    println!(
        "bounds:     lng {:.6}..{:.6}  lat {:.6}..{:.6}",
        bounds.min_lng, bounds.max_lng, bounds.min_lat, bounds.max_lat
    );
    println!("density:    {:.6} deg", file.density());
    println!(
        "search:     {}",
        if file.is_overlapping() {
            "flat (overlapping top-level sub-grids)"
        } else {
            "hierarchical"
        }
    );
    println!("sub-grids:  {}", file.subgrids().len());
    for sg in file.subgrids() {
        println!(
            "  {:<8} parent {:<8} lng {:.4}..{:.4} lat {:.4}..{:.4} {}x{} nodes, {} children",
            sg.name,
            sg.parent_name,
            sg.extent.min_lng,
            sg.extent.max_lng,
            sg.extent.min_lat,
            sg.extent.max_lat,
            sg.rows,
            sg.cols,
            sg.children.len()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn run_shift(grid: &Path, lng: f64, lat: f64, inverse: bool, config: &EngineConfig) -> Result<ExitCode> {
    let mut file = GridShiftFile::open(grid, config.grid.clone())?.with_iteration(config.iteration);
    let point = Coordinate::lng_lat(lng, lat);
    let out = if inverse {
        file.inverse(point)?
    } else {
        file.forward(point)?
    };
    println!("{:.9} {:.9}", out.value.lng, out.value.lat);
    match out.soft {
        Some(e) => {
            tracing::warn!(%e, "soft error");
            eprintln!("warning: {e}");
            Ok(ExitCode::from(2))
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

fn run_convert(
    catalog: &Path,
    from: &str,
    to: &str,
    point: Coordinate,
    policy: ErrorPolicy,
    three_d: bool,
    config: &EngineConfig,
) -> Result<ExitCode> {
    let registries = Catalog::from_json_file(catalog)?.into_registries()?;
    let builder = BridgeBuilder::new(&registries.datums)
        .with_transformations(&registries.transformations)
        .with_paths(&registries.paths)
        .with_config(config);
    let mut bridge = builder.build(from, to, policy)?;
    tracing::info!(description = %bridge.description(), "bridge");

    let out = ConversionDispatcher::new().convert(&mut bridge, point, three_d);
    let c = out.coordinate;
    if three_d {
        println!("{:.9} {:.9} {:.4}", c.lng, c.lat, c.hgt);
    } else {
        println!("{:.9} {:.9}", c.lng, c.lat);
    }
    match out.status {
        Status::Ok => Ok(ExitCode::SUCCESS),
        Status::Soft { kind, .. } => {
            eprintln!("warning: {kind}");
            Ok(ExitCode::from(2))
        }
        Status::Hard(e) => Err(e),
    }
}
