use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dusk_core::{LandscapeConfig, Ray};
use dusk_landscape::{HeightBands, Landscape, MemoryScene, SimplexHills};
use dusk_persist::scan_file;
use glam::Vec3;

#[derive(Parser, Debug)]
#[command(name = "dusk-landtool")]
#[command(about = "Create, inspect and edit Dusk landscape files")]
struct Args {
    /// RON file with landscape settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a tiled landscape and save it
    Create {
        file: PathBuf,

        /// Tiles along X
        #[arg(long, default_value = "1")]
        cols: u32,

        /// Tiles along Z
        #[arg(long, default_value = "1")]
        rows: u32,

        /// Flat terrain at this height
        #[arg(long, conflicts_with = "seed")]
        height: Option<f32>,

        /// Simplex hills from this seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a summary of every record in a file
    Info { file: PathBuf },

    /// Print the interpolated terrain height at a world position
    Height {
        file: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        z: f32,
    },

    /// Cast a ray and print where it first hits the terrain
    Pick {
        file: PathBuf,
        #[arg(allow_negative_numbers = true)]
        ox: f32,
        #[arg(allow_negative_numbers = true)]
        oy: f32,
        #[arg(allow_negative_numbers = true)]
        oz: f32,
        #[arg(allow_negative_numbers = true)]
        dx: f32,
        #[arg(allow_negative_numbers = true)]
        dy: f32,
        #[arg(allow_negative_numbers = true)]
        dz: f32,
    },

    /// Raise (or lower) the terrain at a world position and save the file
    Raise {
        file: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        z: f32,
        #[arg(allow_negative_numbers = true)]
        delta: f32,
    },
}

fn load_config(path: Option<&Path>) -> Result<LandscapeConfig> {
    match path {
        Some(path) => {
            let config = LandscapeConfig::from_ron_file(path)?;
            log::info!("Loaded landscape config from {}", path.display());
            Ok(config)
        }
        None => Ok(LandscapeConfig::default()),
    }
}

fn open(file: &Path, config: LandscapeConfig) -> Result<Landscape> {
    let mut land = Landscape::with_config(config);
    land.load_from_file(file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    Ok(land)
}

fn create(
    file: &Path,
    config: LandscapeConfig,
    cols: u32,
    rows: u32,
    height: Option<f32>,
    seed: Option<u64>,
) -> Result<()> {
    if cols == 0 || rows == 0 {
        bail!("a landscape needs at least one tile");
    }
    let mut land = Landscape::with_config(config);
    for col in 0..cols {
        for row in 0..rows {
            let id = land.create_record();
            land.edit(id, |record| {
                let extent = record.extent();
                let (ox, oy) = (col as f32 * extent, row as f32 * extent);
                record.move_to(ox, oy);
                match seed {
                    Some(seed) => {
                        let hills = SimplexHills::new(seed).at_tile(ox, oy, extent);
                        record.generate_by_function(&mut hills.clone());
                        let base = hills.base_height;
                        let step = hills.amplitude * 0.5;
                        record.colour_by_function(&mut HeightBands::terrain(hills, base, step));
                    }
                    None => {
                        record.make_plain(height.unwrap_or(0.0));
                        record.colour_by_function(&mut |_x: f32, _z: f32| [86, 140, 54]);
                    }
                }
            })?;
        }
    }
    land.save_to_file(file)?;
    println!("Wrote {} records to {}", land.records_available(), file.display());
    Ok(())
}

fn info(file: &Path, config: &LandscapeConfig) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let summary = scan_file(&bytes, config.max_records)?;
    println!("{}: {} records", file.display(), summary.record_count());
    for (index, record) in summary.records.iter().enumerate() {
        println!(
            "  #{index:<4} offset ({:.1}, {:.1})  stride {:.2}  height {:.2} .. {:.2}",
            record.offset_x, record.offset_y, record.stride, record.lowest, record.highest
        );
    }
    if summary.trailing_bytes > 0 {
        log::warn!("{} trailing bytes after the last record", summary.trailing_bytes);
    }
    Ok(())
}

fn raise(file: &Path, config: LandscapeConfig, x: f32, z: f32, delta: f32) -> Result<()> {
    let mut land = open(file, config)?;
    let mut scene = MemoryScene::new();
    land.send_to_engine(&mut scene, false)?;

    let id = land.terraform_at(x, z, delta)?;
    let report = land.update_records(&mut scene, false);
    log::info!(
        "{} landscape record(s) updated, {} failed",
        report.updated,
        report.failed
    );
    land.remove_from_engine(&mut scene)?;

    land.save_to_file(file)?;
    println!(
        "Record {id}: height at ({x}, {z}) is now {:.3}",
        land.height_at_position(x, z)
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Command::Create {
            file,
            cols,
            rows,
            height,
            seed,
        } => create(file, config, *cols, *rows, *height, *seed),
        Command::Info { file } => info(file, &config),
        Command::Height { file, x, z } => {
            let land = open(file, config)?;
            match land.record_at_position(*x, *z) {
                Some(record) => println!(
                    "{:.3} (record {})",
                    land.height_at_position(*x, *z),
                    record.id()
                ),
                None => println!("0.000 (no record covers this position)"),
            }
            Ok(())
        }
        Command::Pick {
            file,
            ox,
            oy,
            oz,
            dx,
            dy,
            dz,
        } => {
            let direction = Vec3::new(*dx, *dy, *dz);
            if direction == Vec3::ZERO {
                bail!("ray direction must not be zero");
            }
            let land = open(file, config)?;
            let ray = Ray::new(Vec3::new(*ox, *oy, *oz), direction);
            match land.pick(&ray) {
                Some(hit) => println!(
                    "hit record {} at ({:.3}, {:.3}, {:.3}), distance {:.3}",
                    hit.record, hit.point.x, hit.point.y, hit.point.z, hit.distance
                ),
                None => println!("no hit"),
            }
            Ok(())
        }
        Command::Raise { file, x, z, delta } => raise(file, config, *x, *z, *delta),
    }
}
