use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use ringstone::PreviewConfig;
use ringstone::preview;
use ringstone_core::world::Quadrant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Distribution preset: default, sparse, dense, wide_rings
    #[arg(long)]
    preset: Option<String>,

    /// Ring to generate
    #[arg(long, default_value = "0")]
    ring: u32,

    /// Quadrant to generate: 0 = +X+Z, 1 = +X-Z, 2 = -X-Z, 3 = -X+Z
    #[arg(long, default_value = "0")]
    quadrant: u8,

    /// Generate all four quadrants of the ring
    #[arg(long)]
    all_quadrants: bool,

    /// Side of the search area around each region center
    #[arg(long)]
    footprint: Option<f64>,

    /// Write the preview here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Omit individual placement records from the output
    #[arg(long)]
    summary_only: bool,

    /// Generated-region ledger to restore before and save after generation
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Print the first N ring definitions and exit
    #[arg(long)]
    list_rings: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = PreviewConfig::load()?;
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if let Some(preset) = &args.preset {
        config.world.preset = preset.clone();
        config.world.distribution_file = None;
    }
    if let Some(footprint) = args.footprint {
        config.world.footprint = footprint;
    }
    if args.summary_only {
        config.output.include_records = false;
    }

    let level = if config.debug.verbose_logging {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let distributor = preview::build_distributor(&config, args.ledger.as_deref())?;

    // Handle --list-rings flag
    if let Some(count) = args.list_rings {
        for ring in preview::ring_table(distributor.catalog(), count)? {
            println!(
                "ring {:>3}  {:>10.1} .. {:<10.1}  difficulty {:>2}  density {:.2}  {}",
                ring.index,
                ring.inner_radius,
                ring.outer_radius,
                ring.difficulty,
                ring.content_density,
                ring.biome_style.name()
            );
        }
        return Ok(());
    }

    let quadrant = if args.all_quadrants {
        None
    } else {
        match Quadrant::from_index(args.quadrant) {
            Some(quadrant) => Some(quadrant),
            None => bail!("Quadrant must be 0-3, got {}", args.quadrant),
        }
    };
    let regions = preview::regions_for(args.ring, quadrant);

    log::info!(
        "Previewing {} region(s) of ring {} (seed {}, '{}')",
        regions.len(),
        args.ring,
        config.world.seed,
        distributor.config().name
    );

    let document = preview::generate_preview(
        &distributor,
        &regions,
        config.world.footprint,
        config.output.include_records,
    )?;
    let serialized = preview::to_ron(&document, config.output.pretty)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, serialized)?;
            log::info!("Wrote preview to {:?}", path);
        }
        None => println!("{}", serialized),
    }

    if let Some(path) = &args.ledger {
        preview::save_ledger(&distributor, path)?;
    }

    Ok(())
}
