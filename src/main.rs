//! # Burrow Simulator Entry Point
//!
//! Loads a catalog, builds or loads a set of floors, runs the per-tick income
//! pass and prints what every room produced.

use burrow::{
    advance_ticks, calculate_floor_production, calculate_single_room_production, calculate_total,
    production_per_minute, BurrowResult, ContentCatalog, Floor, ResourceLedger, ResourceMap,
    SandboxConfig, SandboxGenerator, SimulationConfig, UpgradeResolver,
};
use clap::Parser;
use log::{info, LevelFilter};
use std::path::PathBuf;

/// Command line arguments for the Burrow simulator.
#[derive(Parser, Debug)]
#[command(name = "burrow")]
#[command(about = "Room placement and production simulator for a dungeon base builder")]
#[command(version)]
struct Args {
    /// Content catalog JSON; the built-in catalog when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Simulation config JSON (modifier tables, multipliers, caps)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Floors JSON to simulate instead of a generated sandbox
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Random seed for the sandbox layout
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of sandbox floors
    #[arg(long, default_value_t = 3)]
    floors: u32,

    /// Write the simulated floors to this path as JSON
    #[arg(long)]
    save_layout: Option<PathBuf>,

    /// Ticks to simulate
    #[arg(short, long, default_value_t = 60)]
    ticks: u32,

    /// Hour of day, overriding the config
    #[arg(long)]
    hour: Option<u32>,

    /// Treat dark upgrades as unlocked regardless of corruption
    #[arg(long)]
    dark_unlocked: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> BurrowResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Burrow simulator v{}", burrow::VERSION);

    let catalog = match &args.catalog {
        Some(path) => ContentCatalog::load_from_path(path)?,
        None => ContentCatalog::builtin()?,
    };

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load_from_path(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(hour) = args.hour {
        config.hour = hour % 24;
    }

    let floors = load_floors(&args, &catalog)?;
    if let Some(path) = &args.save_layout {
        std::fs::write(path, serde_json::to_string_pretty(&floors)?)?;
        info!("Saved layout to {}", path.display());
    }

    let registry = config.build_registry();
    let context = config.context(&catalog, &registry);

    for floor in &floors {
        print_floor(floor, &catalog, &context, args.dark_unlocked);
    }

    let total = calculate_total(&floors, &context);
    println!("Total per tick:");
    print_resources(&total);

    let ledger = advance_ticks(&floors, &config.ledger(), &context, args.ticks);
    println!("Ledger after {} ticks:", args.ticks);
    print_ledger(&ledger);

    if !args.dark_unlocked && ledger.dark_upgrades_unlocked() {
        println!("Corruption threshold reached: dark upgrades are now available");
    }

    Ok(())
}

/// Initializes `env_logger`, falling back to info for unknown levels.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}

fn load_floors(args: &Args, catalog: &ContentCatalog) -> BurrowResult<Vec<Floor>> {
    if let Some(path) = &args.layout {
        info!("Loading layout from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&json)?);
    }

    info!("Generating sandbox layout with seed {}", args.seed);
    let config = SandboxConfig {
        floor_count: args.floors,
        ..SandboxConfig::new(args.seed)
    };
    SandboxGenerator::new().generate(catalog, &config)
}

fn print_floor(
    floor: &Floor,
    catalog: &ContentCatalog,
    context: &burrow::ProductionContext<'_>,
    dark_unlocked: bool,
) {
    println!(
        "Floor {} ({}): {} rooms, {} inhabitants",
        floor.depth,
        floor.biome,
        floor.rooms.len(),
        floor.inhabitants.len()
    );

    let resolver = UpgradeResolver::new(catalog);
    for room in &floor.rooms {
        let output = calculate_single_room_production(room, floor, context);
        let workers = floor.inhabitants_in(room.id).len();
        println!(
            "  {:<16} at {:<8} workers {}  {}",
            room.room_type_id,
            room.anchor.to_string(),
            workers,
            format_resources(&output)
        );

        let available: Vec<&str> = resolver
            .get_available(room, dark_unlocked)
            .iter()
            .map(|path| path.name.as_str())
            .collect();
        if !available.is_empty() {
            println!("    upgrades: {}", available.join(", "));
        }
    }

    println!("  floor total: {}", format_resources(&calculate_floor_production(floor, context)));
}

fn format_resources(resources: &ResourceMap) -> String {
    if resources.is_empty() {
        return "idle".to_string();
    }
    resources
        .iter()
        .map(|(resource, amount)| format!("{} {:.2}/tick", resource, amount))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_resources(resources: &ResourceMap) {
    if resources.is_empty() {
        println!("  nothing");
    }
    for (resource, amount) in resources {
        println!(
            "  {:<11} {:>8.2}/tick {:>9.2}/min",
            resource.to_string(),
            amount,
            production_per_minute(*amount)
        );
    }
}

fn print_ledger(ledger: &ResourceLedger) {
    for (resource, amount) in &ledger.resources {
        println!("  {:<11} {:>8.2} / {:.0}", resource.to_string(), amount.current, amount.max);
    }
}
