//! Per-tick region transition: age, decay, then enforcement or renovation.

use housing_core::{RegionId, SimConfig, SpatialError, SpatialIndex};
use housing_econ::{decayed_quality, renovation_pays_off, RegionEconomics, RentTerms};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What happened to a region during its step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionTransition {
    /// Plain exponential decay.
    Decayed,
    /// Resident complaints forced quality back to the floor.
    Enforced,
    /// Projected rent gains paid for a renovation.
    Renovated,
}

/// Step one region.
///
/// Enforcement is checked before renovation and the two never happen in
/// the same tick.
pub fn step_region(
    index: &mut SpatialIndex,
    id: RegionId,
    config: &SimConfig,
) -> Result<RegionTransition, SpatialError> {
    {
        let region = index.region_mut(id)?;
        region.advance_age();
        let (initial, k) = (region.initial_quality, region.decay_constant);
        region.quality = decayed_quality(initial, k, region.age());
    }

    let econ = RegionEconomics::new(index, id)?;
    let complaints = econ.complaint_total();
    let transition = if complaints > config.enforcement_complaint_threshold {
        RegionTransition::Enforced
    } else {
        let terms = RentTerms::of(econ.region());
        let renovations = econ.region().renovations();
        let area_income = econ.area_income();
        let rent = terms.rent(area_income, renovations);
        let profit = terms.profit(area_income, renovations);
        let horizon = config.renovation_profit_horizon;
        let cost_months = config.num_month_rent_renovation;
        if renovation_pays_off(profit, rent, horizon, cost_months) {
            RegionTransition::Renovated
        } else {
            RegionTransition::Decayed
        }
    };

    let region = index.region_mut(id)?;
    match transition {
        RegionTransition::Enforced => region.enforce(),
        RegionTransition::Renovated => region.renovate(),
        RegionTransition::Decayed => {}
    }
    debug!(
        region = %id,
        ?transition,
        quality = region.quality,
        age = region.age(),
        complaints,
        "region stepped"
    );
    Ok(transition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use housing_core::{grid_regions, Person, PersonId, Point, Region};

    fn single_region(regulated: bool, initial_quality: f64, config: &SimConfig) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        let origin = Point::new(0.5, 0.5);
        let regions = grid_regions(1, 1, 1.0)
            .into_iter()
            .map(|g| Region::new(g, origin, regulated, initial_quality, config))
            .collect();
        index.register_regions(regions, 1e-9).unwrap();
        index
    }

    fn resident(index: &mut SpatialIndex, income: f64) -> PersonId {
        let p = Person::new(PersonId(0), income, 65.0, Point::new(0.5, 0.5));
        index.spawn_person(p, RegionId(0)).unwrap()
    }

    #[test]
    fn vacant_region_only_decays() {
        let cfg = SimConfig::default();
        let mut index = single_region(false, 100.0, &cfg);
        let mut last = 100.0;
        for age in 1..=10 {
            assert_eq!(
                step_region(&mut index, RegionId(0), &cfg).unwrap(),
                RegionTransition::Decayed
            );
            let region = index.region_by_id(RegionId(0)).unwrap();
            assert_eq!(region.age(), age);
            assert!(region.quality < last);
            last = region.quality;
        }
        assert!((last - 22.31).abs() < 0.01);
    }

    #[test]
    fn unregulated_region_with_residents_renovates() {
        // Default terms: 0.12 * 60 months of gain beats 4 months of rent.
        let cfg = SimConfig::default();
        let mut index = single_region(false, 70.0, &cfg);
        resident(&mut index, 1.0);
        let t = step_region(&mut index, RegionId(0), &cfg).unwrap();
        assert_eq!(t, RegionTransition::Renovated);
        let region = index.region_by_id(RegionId(0)).unwrap();
        assert_eq!(region.quality, region.renovated_quality());
        assert_eq!(region.quality, 100.0);
        assert_eq!(region.age(), 0);
        assert_eq!(region.renovations(), 1);
    }

    #[test]
    fn regulated_region_does_not_renovate_on_default_terms() {
        let cfg = SimConfig::default();
        let mut index = single_region(true, 70.0, &cfg);
        resident(&mut index, 1.0);
        assert_eq!(
            step_region(&mut index, RegionId(0), &cfg).unwrap(),
            RegionTransition::Decayed
        );
        assert_eq!(index.region_by_id(RegionId(0)).unwrap().renovations(), 0);
    }

    #[test]
    fn complaints_trigger_enforcement_before_renovation() {
        let cfg = SimConfig::default();
        let mut index = single_region(false, 70.0, &cfg);
        let a = resident(&mut index, 1.0);
        let b = resident(&mut index, 1.0);
        for _ in 0..3 {
            index.person_mut(a).unwrap().record_complaint();
            index.person_mut(b).unwrap().record_complaint();
        }
        let t = step_region(&mut index, RegionId(0), &cfg).unwrap();
        assert_eq!(t, RegionTransition::Enforced);
        let region = index.region_by_id(RegionId(0)).unwrap();
        assert_eq!(region.quality, 60.0);
        assert_eq!(region.age(), 0);
        assert_eq!(region.renovations(), 0);
        assert_eq!(region.enforcements(), 1);
    }

    #[test]
    fn enforcement_needs_threshold_exceeded() {
        let cfg = SimConfig {
            rent_increase_differential: 0.0,
            ..SimConfig::default()
        };
        let mut index = single_region(true, 70.0, &cfg);
        let a = resident(&mut index, 1.0);
        for _ in 0..5 {
            index.person_mut(a).unwrap().record_complaint();
        }
        assert_eq!(
            step_region(&mut index, RegionId(0), &cfg).unwrap(),
            RegionTransition::Decayed
        );
        index.person_mut(a).unwrap().record_complaint();
        assert_eq!(
            step_region(&mut index, RegionId(0), &cfg).unwrap(),
            RegionTransition::Enforced
        );
        assert_eq!(index.region_by_id(RegionId(0)).unwrap().quality, 50.0);
    }

    #[test]
    fn decay_restarts_from_initial_quality_after_reset() {
        let cfg = SimConfig::default();
        let mut index = single_region(false, 80.0, &cfg);
        resident(&mut index, 1.0);
        step_region(&mut index, RegionId(0), &cfg).unwrap();
        // Empty the region so the next tick is plain decay at age 1.
        index.remove_person(PersonId(0)).unwrap();
        step_region(&mut index, RegionId(0), &cfg).unwrap();
        let region = index.region_by_id(RegionId(0)).unwrap();
        assert_eq!(region.age(), 1);
        assert!((region.quality - 80.0 * (-0.15f64).exp()).abs() < 1e-12);
    }
}
