//! Housing regions and their physical state transitions.

use crate::config::SimConfig;
use crate::geometry::{Point, Polygon, RegionGeometry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a region as assigned by the geometry source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// Lower bound of the initial quality draw.
pub const INITIAL_QUALITY_MIN: f64 = 50.0;
/// Upper bound of the initial quality draw.
pub const INITIAL_QUALITY_MAX: f64 = 100.0;

/// Quality after renovating a regulated region.
pub const RENOVATED_QUALITY_REGULATED: f64 = 90.0;
/// Quality after renovating an unregulated region.
pub const RENOVATED_QUALITY_UNREGULATED: f64 = 100.0;
/// Quality after enforcement in a regulated region.
pub const ENFORCED_QUALITY_REGULATED: f64 = 50.0;
/// Quality after enforcement in an unregulated region.
pub const ENFORCED_QUALITY_UNREGULATED: f64 = 60.0;

/// A fixed-boundary housing unit.
///
/// Quality follows `initial_quality * exp(-decay_constant * age)` except on
/// the tick of a renovation or enforcement, which pin it to a fixed value
/// and restart the age counter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Region {
    id: RegionId,
    boundary: Polygon,
    interior_point: Point,
    /// Whether rent is regulated. Fixed at creation.
    pub regulated: bool,
    /// Per-tick decay exponent, including the regulation differential.
    pub decay_constant: f64,
    /// Quality drawn at creation; decay baseline.
    pub initial_quality: f64,
    /// Current quality.
    pub quality: f64,
    /// Rent factor applied when regulated.
    pub rent_discount: f64,
    /// Rent multiplier compounded once per renovation.
    pub rent_increase: f64,
    renovations: u32,
    enforcements: u32,
    age: u32,
}

impl Region {
    /// Build a region in the decaying state with quality equal to its initial draw.
    ///
    /// Decay and rent parameters are taken from `config` for the given
    /// regulation status.
    pub fn new(
        geometry: RegionGeometry,
        interior_point: Point,
        regulated: bool,
        initial_quality: f64,
        config: &SimConfig,
    ) -> Self {
        Self {
            id: geometry.id,
            boundary: geometry.boundary,
            interior_point,
            regulated,
            decay_constant: config.decay_constant(regulated),
            initial_quality,
            quality: initial_quality,
            rent_discount: config.rent_discount,
            rent_increase: config.rent_increase(regulated),
            renovations: 0,
            enforcements: 0,
            age: 0,
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    /// A point known to lie inside the boundary.
    pub fn interior_point(&self) -> Point {
        self.interior_point
    }

    /// Completed renovations since creation.
    pub fn renovations(&self) -> u32 {
        self.renovations
    }

    /// Completed enforcements since creation.
    pub fn enforcements(&self) -> u32 {
        self.enforcements
    }

    /// Ticks since creation or the last renovation/enforcement.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Advance the age counter by one tick.
    pub fn advance_age(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Quality ceiling reached by a renovation.
    pub fn renovated_quality(&self) -> f64 {
        if self.regulated {
            RENOVATED_QUALITY_REGULATED
        } else {
            RENOVATED_QUALITY_UNREGULATED
        }
    }

    /// Quality floor restored by an enforcement.
    pub fn enforced_quality(&self) -> f64 {
        if self.regulated {
            ENFORCED_QUALITY_REGULATED
        } else {
            ENFORCED_QUALITY_UNREGULATED
        }
    }

    /// Renovate: quality to the ceiling, one more renovation, age back to 0.
    pub fn renovate(&mut self) {
        self.quality = self.renovated_quality();
        self.renovations += 1;
        self.age = 0;
    }

    /// Enforce: quality to the floor, age back to 0. Renovations are untouched.
    pub fn enforce(&mut self) {
        self.quality = self.enforced_quality();
        self.enforcements += 1;
        self.age = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(regulated: bool) -> Region {
        Region::new(
            RegionGeometry {
                id: RegionId(1),
                boundary: Polygon::rectangle(0.0, 0.0, 1.0, 1.0),
            },
            Point::new(0.5, 0.5),
            regulated,
            80.0,
            &SimConfig::default(),
        )
    }

    #[test]
    fn starts_at_initial_quality() {
        let r = region(false);
        assert_eq!(r.quality, 80.0);
        assert_eq!(r.age(), 0);
        assert_eq!(r.renovations(), 0);
        assert!((r.decay_constant - 0.15).abs() < 1e-12);
        assert!((region(true).decay_constant - 0.2).abs() < 1e-12);
    }

    #[test]
    fn renovation_resets_age_and_counts() {
        for regulated in [true, false] {
            let mut r = region(regulated);
            r.advance_age();
            r.advance_age();
            r.renovate();
            assert_eq!(r.age(), 0);
            assert_eq!(r.renovations(), 1);
            assert_eq!(r.quality, r.renovated_quality());
        }
        assert_eq!(region(true).renovated_quality(), 90.0);
        assert_eq!(region(false).renovated_quality(), 100.0);
    }

    #[test]
    fn enforcement_keeps_renovation_count() {
        let mut r = region(true);
        r.renovate();
        r.advance_age();
        r.enforce();
        assert_eq!(r.renovations(), 1);
        assert_eq!(r.enforcements(), 1);
        assert_eq!(r.age(), 0);
        assert_eq!(r.quality, ENFORCED_QUALITY_REGULATED);
    }
}
