#![deny(warnings)]

//! Simulation runtime: setup, per-agent steps, the random-activation
//! scheduler and per-tick reporting.
//!
//! A [`Simulation`] owns its spatial index and its single seeded generator, so
//! independent runs share nothing and identical seeds replay identically.

pub mod metrics;
pub mod person_agent;
pub mod region_agent;
pub mod scheduler;
pub mod setup;

pub use metrics::{ByIncome, ByRegulation, TickReport};
pub use person_agent::{move_to_suitable_region, step_person, MoveOutcome, PersonDecision};
pub use region_agent::{step_region, RegionTransition};
pub use scheduler::{Scheduler, TickActivity};
pub use setup::SetupError;

use housing_core::{RegionGeometry, SimConfig, SpatialError, SpatialIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// One simulation run.
pub struct Simulation {
    config: SimConfig,
    index: SpatialIndex,
    rng: ChaCha8Rng,
    scheduler: Scheduler,
}

impl Simulation {
    /// Validate the configuration and seed regions and households.
    pub fn new(geometries: Vec<RegionGeometry>, config: SimConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut index = SpatialIndex::new();
        setup::populate_regions(&mut index, geometries, &config, &mut rng)?;
        setup::populate_households(&mut index, &config, &mut rng)?;
        Ok(Self {
            config,
            index,
            rng,
            scheduler: Scheduler::new(),
        })
    }

    /// Advance one tick and report on the result.
    pub fn step(&mut self) -> Result<TickReport, SpatialError> {
        let activity = self
            .scheduler
            .step(&mut self.index, &self.config, &mut self.rng)?;
        TickReport::collect(&self.index, self.scheduler.ticks(), activity)
    }

    /// Report on the current state without advancing.
    pub fn report(&self) -> Result<TickReport, SpatialError> {
        TickReport::collect(&self.index, self.scheduler.ticks(), TickActivity::default())
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Completed ticks.
    pub fn tick(&self) -> u64 {
        self.scheduler.ticks()
    }
}

/// Run `ticks` ticks, consuming the simulation, and return every report.
pub fn run_ticks(mut sim: Simulation, ticks: u32) -> Result<Vec<TickReport>, SpatialError> {
    run_ticks_in_place(&mut sim, ticks)
}

/// Run `ticks` ticks on an existing simulation and return every report.
pub fn run_ticks_in_place(
    sim: &mut Simulation,
    ticks: u32,
) -> Result<Vec<TickReport>, SpatialError> {
    let mut history = Vec::with_capacity(ticks as usize);
    for _ in 0..ticks {
        history.push(sim.step()?);
    }
    if let Some(last) = history.last() {
        info!(
            tick = last.tick,
            housed = last.housed,
            displaced = last.displaced,
            moves = last.moves,
            renovations = last.renovations,
            enforcements = last.enforcements,
            "run finished"
        );
    }
    Ok(history)
}
