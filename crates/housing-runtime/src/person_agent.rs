//! Household mobility decisions and the relocation search.

use housing_core::{
    AttemptCause, PersonId, RegionId, SimConfig, SpatialError, SpatialIndex, MAX_POINT_ATTEMPTS,
};
use housing_econ::RegionEconomics;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of a relocation search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Membership moved to `to`.
    Moved {
        from: Option<RegionId>,
        to: RegionId,
    },
    /// No candidate region; the household left `from` (if it had one).
    Displaced { from: Option<RegionId> },
}

/// What a household did during its step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonDecision {
    /// Rent affordable and quality acceptable.
    Stayed,
    /// Quality below threshold, not yet enough complaints to leave.
    Complained,
    /// A relocation search ran.
    Relocated {
        cause: AttemptCause,
        outcome: MoveOutcome,
    },
}

/// Step one household.
pub fn step_person<R: Rng + ?Sized>(
    index: &mut SpatialIndex,
    id: PersonId,
    config: &SimConfig,
    rng: &mut R,
) -> Result<PersonDecision, SpatialError> {
    let person = index.person(id)?;
    let Some(home) = person.region() else {
        return relocate(index, id, AttemptCause::DisplacedRetry, config, rng);
    };
    let max_rent = person.maximum_affordable_rent();
    let threshold = person.quality_threshold();

    let econ = RegionEconomics::new(index, home)?;
    let rent = econ.rent_price();
    let quality = econ.region().quality;

    if rent > max_rent {
        let decision = relocate(index, id, AttemptCause::Rent, config, rng)?;
        index.person_mut(id)?.clear_complaints();
        return Ok(decision);
    }

    if quality < threshold {
        let complaints = index.person_mut(id)?.record_complaint();
        if complaints >= config.max_complaint {
            let decision = relocate(index, id, AttemptCause::Quality, config, rng)?;
            index.person_mut(id)?.clear_complaints();
            return Ok(decision);
        }
        return Ok(PersonDecision::Complained);
    }

    index.person_mut(id)?.clear_complaints();
    Ok(PersonDecision::Stayed)
}

fn relocate<R: Rng + ?Sized>(
    index: &mut SpatialIndex,
    id: PersonId,
    cause: AttemptCause,
    config: &SimConfig,
    rng: &mut R,
) -> Result<PersonDecision, SpatialError> {
    index.person_mut(id)?.record_attempt(cause);
    let outcome = move_to_suitable_region(index, id, config, rng)?;
    debug!(person = %id, ?cause, ?outcome, "relocation search");
    Ok(PersonDecision::Relocated { cause, outcome })
}

/// Regions a household would accept, in registration order.
///
/// A candidate has quality at or above the household's threshold, rent
/// within its budget and, when a cap is configured, room below the cap.
/// The household's current region is never a candidate.
pub fn suitable_regions(
    index: &SpatialIndex,
    id: PersonId,
    config: &SimConfig,
) -> Result<Vec<RegionId>, SpatialError> {
    let person = index.person(id)?;
    let current = person.region();
    let max_rent = person.maximum_affordable_rent();
    let threshold = person.quality_threshold();
    let mut candidates = Vec::new();
    for region in index.regions() {
        if Some(region.id()) == current || region.quality < threshold {
            continue;
        }
        let econ = RegionEconomics::new(index, region.id())?;
        let occupancy = econ.occupancy();
        if config.max_occupancy.is_some_and(|cap| occupancy >= cap) {
            continue;
        }
        if econ.rent_price() <= max_rent {
            candidates.push(region.id());
        }
    }
    Ok(candidates)
}

/// Search for a region and move there, or become displaced.
///
/// The destination is drawn uniformly from [`suitable_regions`]. A
/// successful move clears the running complaint counter; an empty candidate
/// set takes the household out of its region.
pub fn move_to_suitable_region<R: Rng + ?Sized>(
    index: &mut SpatialIndex,
    id: PersonId,
    config: &SimConfig,
    rng: &mut R,
) -> Result<MoveOutcome, SpatialError> {
    let candidates = suitable_regions(index, id, config)?;
    match candidates.choose(rng) {
        Some(&to) => {
            let from = index.relocate_person(id, to)?;
            let region = index.region_by_id(to)?;
            let location = region
                .boundary()
                .sample_point(rng, MAX_POINT_ATTEMPTS)
                .unwrap_or_else(|| region.interior_point());
            index.person_mut(id)?.record_move(location);
            Ok(MoveOutcome::Moved { from, to })
        }
        None => {
            let from = match index.person(id)?.region() {
                Some(_) => Some(index.remove_person(id)?),
                None => None,
            };
            index.person_mut(id)?.record_displacement();
            Ok(MoveOutcome::Displaced { from })
        }
    }
}
