//! Initial population: regions from geometry, households per region.

use housing_core::{
    Person, PersonId, Region, RegionGeometry, SimConfig, SpatialError, SpatialIndex,
    ThresholdPolicy, ValidationError, INITIAL_QUALITY_MAX, INITIAL_QUALITY_MIN, MAX_POINT_ATTEMPTS,
};
use housing_econ::income_derived_threshold;
use rand::Rng;
use rand_distr::{Beta, BetaError, Distribution, Normal, NormalError};
use thiserror::Error;
use tracing::{debug, info};

/// Shape parameters of the income draw, `2 * Beta(a, b)`.
pub const INCOME_BETA: (f64, f64) = (2.5, 3.5);
/// Scale applied to the Beta draw.
pub const INCOME_SCALE: f64 = 2.0;
/// Mean and standard deviation of drawn quality thresholds.
pub const THRESHOLD_NORMAL: (f64, f64) = (65.0, 10.0);

/// Failures while building a run.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ValidationError),
    #[error(transparent)]
    Spatial(#[from] SpatialError),
    #[error("invalid income distribution: {0}")]
    Income(#[from] BetaError),
    #[error("invalid quality threshold distribution: {0}")]
    Threshold(#[from] NormalError),
}

/// Draw region attributes and register every region.
pub fn populate_regions<R: Rng + ?Sized>(
    index: &mut SpatialIndex,
    geometries: Vec<RegionGeometry>,
    config: &SimConfig,
    rng: &mut R,
) -> Result<(), SetupError> {
    let mut regions = Vec::with_capacity(geometries.len());
    for geometry in geometries {
        if let Some(reason) = geometry.boundary.degeneracy() {
            return Err(SpatialError::DegenerateGeometry {
                region: geometry.id,
                reason,
            }
            .into());
        }
        let interior = geometry
            .boundary
            .sample_point(rng, MAX_POINT_ATTEMPTS)
            .ok_or(SpatialError::DegenerateGeometry {
                region: geometry.id,
                reason: "no interior point found",
            })?;
        let regulated = config.has_regulation && rng.gen_bool(config.regulation_probability);
        let initial_quality = rng.gen_range(INITIAL_QUALITY_MIN..=INITIAL_QUALITY_MAX);
        debug!(
            region = %geometry.id,
            regulated,
            initial_quality,
            "region created"
        );
        let region = Region::new(geometry, interior, regulated, initial_quality, config);
        regions.push(region);
    }
    index.register_regions(regions, config.adjacency_tolerance)?;
    Ok(())
}

/// Seed `init_num_people` households in every registered region.
pub fn populate_households<R: Rng + ?Sized>(
    index: &mut SpatialIndex,
    config: &SimConfig,
    rng: &mut R,
) -> Result<(), SetupError> {
    let income = Beta::new(INCOME_BETA.0, INCOME_BETA.1)?;
    let threshold = Normal::new(THRESHOLD_NORMAL.0, THRESHOLD_NORMAL.1)?;
    let ids: Vec<_> = index.region_ids().collect();
    for region_id in ids {
        for _ in 0..config.init_num_people {
            let income_level = INCOME_SCALE * income.sample(rng);
            let quality_threshold = match config.threshold_policy {
                ThresholdPolicy::Drawn => threshold.sample(rng),
                ThresholdPolicy::IncomeDerived => income_derived_threshold(income_level),
            };
            let region = index.region_by_id(region_id)?;
            let location = region
                .boundary()
                .sample_point(rng, MAX_POINT_ATTEMPTS)
                .unwrap_or_else(|| region.interior_point());
            let person = Person::new(PersonId(0), income_level, quality_threshold, location);
            let id = index.spawn_person(person, region_id)?;
            debug!(
                person = %id,
                region = %region_id,
                income_level,
                quality_threshold,
                "household created"
            );
        }
    }
    info!(
        regions = index.region_count(),
        households = index.person_count(),
        "population seeded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use housing_core::{grid_regions, Point, Polygon, RegionId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn build(config: &SimConfig) -> SpatialIndex {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut index = SpatialIndex::new();
        populate_regions(&mut index, grid_regions(4, 3, 1.0), config, &mut rng).unwrap();
        populate_households(&mut index, config, &mut rng).unwrap();
        index
    }

    #[test]
    fn every_region_gets_initial_households() {
        let cfg = SimConfig {
            init_num_people: 3,
            ..SimConfig::default()
        };
        let index = build(&cfg);
        assert_eq!(index.region_count(), 12);
        assert_eq!(index.person_count(), 36);
        for id in index.region_ids() {
            assert_eq!(index.occupancy(id).unwrap(), 3);
        }
        for p in index.persons() {
            let region = index.region_by_id(p.region().unwrap()).unwrap();
            assert!(region.boundary().contains(p.location));
        }
    }

    #[test]
    fn draws_stay_in_range() {
        let index = build(&SimConfig::default());
        for r in index.regions() {
            let range = INITIAL_QUALITY_MIN..=INITIAL_QUALITY_MAX;
            assert!(range.contains(&r.initial_quality));
            assert_eq!(r.quality, r.initial_quality);
        }
        for p in index.persons() {
            assert!((0.0..=INCOME_SCALE).contains(&p.income()));
        }
    }

    #[test]
    fn regulation_can_be_disabled() {
        let cfg = SimConfig {
            has_regulation: false,
            ..SimConfig::default()
        };
        let index = build(&cfg);
        assert!(index.regions().iter().all(|r| !r.regulated));
        let cfg = SimConfig {
            regulation_probability: 1.0,
            ..SimConfig::default()
        };
        assert!(build(&cfg).regions().iter().all(|r| r.regulated));
    }

    #[test]
    fn income_derived_thresholds() {
        let cfg = SimConfig {
            threshold_policy: ThresholdPolicy::IncomeDerived,
            ..SimConfig::default()
        };
        for p in build(&cfg).persons() {
            assert_eq!(p.quality_threshold(), income_derived_threshold(p.income()));
        }
    }

    #[test]
    fn degenerate_boundary_fails_setup() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut index = SpatialIndex::new();
        let sliver = RegionGeometry {
            id: RegionId(3),
            boundary: Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 2.0),
            ]),
        };
        let cfg = SimConfig::default();
        let err = populate_regions(&mut index, vec![sliver], &cfg, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SetupError::Spatial(SpatialError::DegenerateGeometry {
                region: RegionId(3),
                ..
            })
        ));
    }

    #[test]
    fn distribution_errors_keep_their_source() {
        let beta = Beta::<f64>::new(0.0, 1.0).unwrap_err();
        assert!(matches!(SetupError::from(beta), SetupError::Income(_)));
        let normal = Normal::<f64>::new(65.0, -1.0).unwrap_err();
        let err = SetupError::from(normal);
        assert!(matches!(err, SetupError::Threshold(_)));
        let message = err.to_string();
        assert!(message.starts_with("invalid quality threshold"));
    }
}
