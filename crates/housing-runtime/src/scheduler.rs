//! Random-activation scheduler.

use crate::person_agent::{step_person, MoveOutcome, PersonDecision};
use crate::region_agent::{step_region, RegionTransition};
use housing_core::{AgentId, AttemptCause, SimConfig, SpatialError, SpatialIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Events counted during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickActivity {
    pub renovations: u32,
    pub enforcements: u32,
    pub moves: u32,
    pub displacements: u32,
    pub complaints: u32,
}

impl TickActivity {
    fn record_region(&mut self, t: RegionTransition) {
        match t {
            RegionTransition::Renovated => self.renovations += 1,
            RegionTransition::Enforced => self.enforcements += 1,
            RegionTransition::Decayed => {}
        }
    }

    fn record_person(&mut self, d: PersonDecision) {
        match d {
            PersonDecision::Stayed => {}
            PersonDecision::Complained => self.complaints += 1,
            PersonDecision::Relocated { cause, outcome } => {
                // A quality search is triggered by the complaint that reached the limit.
                if cause == AttemptCause::Quality {
                    self.complaints += 1;
                }
                match outcome {
                    MoveOutcome::Moved { .. } => self.moves += 1,
                    MoveOutcome::Displaced { .. } => self.displacements += 1,
                }
            }
        }
    }
}

/// Steps every agent once per tick in a freshly shuffled order.
///
/// Agents see the effects of everything activated before them in the same
/// tick; there is no phase barrier between regions and households.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    order: Vec<AgentId>,
    ticks: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn step<R: Rng + ?Sized>(
        &mut self,
        index: &mut SpatialIndex,
        config: &SimConfig,
        rng: &mut R,
    ) -> Result<TickActivity, SpatialError> {
        self.order.clear();
        self.order.extend(index.all_agents());
        self.order.shuffle(rng);

        let mut activity = TickActivity::default();
        for &agent in &self.order {
            match agent {
                AgentId::Region(id) => {
                    let transition = step_region(index, id, config)?;
                    activity.record_region(transition);
                }
                AgentId::Person(id) => {
                    let decision = step_person(index, id, config, rng)?;
                    activity.record_person(decision);
                }
            }
        }
        self.ticks += 1;
        debug!(
            tick = self.ticks,
            agents = self.order.len(),
            ?activity,
            "tick complete"
        );
        Ok(activity)
    }
}
