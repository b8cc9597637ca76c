#![deny(warnings)]

//! Headless runner: builds a grid of regions, runs the housing simulation
//! and prints per-tick aggregates.

use anyhow::{bail, Context, Result};
use housing_core::{grid_regions, SimConfig};
use housing_runtime::{run_ticks_in_place, Simulation, TickReport};
use std::str::FromStr;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    scenario: Option<String>,
    ticks: Option<u32>,
    grid: Option<(u32, u32)>,
    seed: Option<u64>,
    json: bool,
}

fn parse_grid(s: &str) -> Option<(u32, u32)> {
    let (cols, rows) = s.split_once(['x', 'X'])?;
    Some((cols.parse().ok()?, rows.parse().ok()?))
}

fn flag_value<T: FromStr>(flag: &str, raw: Option<String>) -> Result<T> {
    let raw = raw.unwrap_or_default();
    match raw.parse() {
        Ok(value) => Ok(value),
        Err(_) => bail!("{flag} expects a non-negative integer, got {raw:?}"),
    }
}

fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = it.next(),
            "--ticks" => args.ticks = Some(flag_value("--ticks", it.next())?),
            "--grid" => {
                let raw = it.next().unwrap_or_default();
                match parse_grid(&raw) {
                    Some(g) => args.grid = Some(g),
                    None => bail!("--grid expects <cols>x<rows>, got {raw:?}"),
                }
            }
            "--seed" => args.seed = Some(flag_value("--seed", it.next())?),
            "--json" => args.json = true,
            _ => {}
        }
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing scenario {path}"))
}

fn print_tick(r: &TickReport) {
    println!(
        "tick {:>4} | housed: {} | displaced: {} (low-income {}) | quality reg/unreg: {:.1}/{:.1} | rent reg/unreg: {:.3}/{:.3} | moves: +{} | renov: +{} | enforce: +{}",
        r.tick,
        r.housed,
        r.displaced,
        r.low_income_displaced,
        r.mean_region_quality.regulated,
        r.mean_region_quality.unregulated,
        r.mean_rent.regulated,
        r.mean_rent.unregulated,
        r.activity.moves,
        r.activity.renovations,
        r.activity.enforcements,
    );
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(
        sha = env!("GIT_SHA"),
        built = env!("BUILD_DATE"),
        ?args,
        "starting housing simulation"
    );

    let mut config = load_config(args.scenario.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let (cols, rows) = args.grid.unwrap_or((10, 10));
    let ticks = args.ticks.unwrap_or(50);

    let mut sim = Simulation::new(grid_regions(cols, rows, 1.0), config)?;
    let history = run_ticks_in_place(&mut sim, ticks)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    for r in &history {
        print_tick(r);
    }
    let last = sim.report()?;
    println!(
        "KPI | ticks: {} | households: {} | displaced: {:.1}% (low-income {:.1}%) | moves: {} (low-income {}) | rent/quality attempts: {}/{} | renovations: {} | enforcements: {} | complaints: {}",
        last.tick,
        last.households,
        100.0 * last.displaced as f64 / last.households.max(1) as f64,
        100.0 * last.displaced_share.low_income,
        last.moves,
        last.low_income_moves,
        last.rent_attempts.others + last.rent_attempts.low_income,
        last.quality_attempts.others + last.quality_attempts.low_income,
        last.renovations,
        last.enforcements,
        last.resident_complaints,
    );
    Ok(())
}
