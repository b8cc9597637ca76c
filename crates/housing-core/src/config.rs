//! Run configuration and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a household's quality threshold is chosen at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Independent normal draw (mean 65, sd 10).
    #[default]
    Drawn,
    /// `100 * income`, replaced by 90 above 100 and by 50 below 50.
    IncomeDerived,
}

/// Simulation configuration parameters.
///
/// Every field has a default, so scenario files only need to name the
/// values they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the run's single deterministic RNG.
    pub seed: u64,
    /// When false no region is ever regulated.
    pub has_regulation: bool,
    /// Chance that a region is regulated when regulation is enabled, in [0,1].
    pub regulation_probability: f64,
    /// Multiplicative rent factor for regulated regions, in [0,1].
    pub rent_discount: f64,
    /// Baseline per-tick decay exponent (>= 0).
    pub base_decay_constant: f64,
    /// Extra decay exponent for regulated regions (>= 0).
    pub decay_differential: f64,
    /// Renovation cost expressed in months of current rent (> 0).
    pub num_month_rent_renovation: f64,
    /// Months of marginal rent counted as renovation profit (> 0).
    pub renovation_profit_horizon: f64,
    /// Per-renovation rent multiplier of regulated regions (>= 1).
    pub base_rent_increase: f64,
    /// Extra rent multiplier of unregulated regions (>= 0).
    pub rent_increase_differential: f64,
    /// Households seeded in every region at setup.
    pub init_num_people: u32,
    /// Consecutive complaints after which a household relocates (>= 1).
    pub max_complaint: u32,
    /// Resident complaints a region must exceed before enforcement.
    pub enforcement_complaint_threshold: u32,
    /// Optional occupancy cap for relocation candidates (>= 1).
    pub max_occupancy: Option<usize>,
    /// Household quality threshold policy.
    pub threshold_policy: ThresholdPolicy,
    /// Distance under which two region boundaries count as touching (>= 0).
    pub adjacency_tolerance: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            has_regulation: true,
            regulation_probability: 0.5,
            rent_discount: 0.5,
            base_decay_constant: 0.15,
            decay_differential: 0.05,
            num_month_rent_renovation: 4.0,
            renovation_profit_horizon: 60.0,
            base_rent_increase: 1.02,
            rent_increase_differential: 0.1,
            init_num_people: 2,
            max_complaint: 5,
            enforcement_complaint_threshold: 5,
            max_occupancy: None,
            threshold_policy: ThresholdPolicy::Drawn,
            adjacency_tolerance: 1e-9,
        }
    }
}

/// Validation errors for configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("`{0}` must be finite")]
    NonFinite(&'static str),
    /// Field must be non-negative.
    #[error("`{field}` must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },
    /// Field must be strictly positive.
    #[error("`{field}` must be > 0, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    /// Field must lie in the unit interval.
    #[error("`{field}` must be within [0,1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },
    /// Rent can never fall with a renovation.
    #[error("`base_rent_increase` must be >= 1, got {0}")]
    ShrinkingRent(f64),
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite(field))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if finite(field, value)? < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if finite(field, value)? <= 0.0 {
        return Err(ValidationError::NonPositive { field, value });
    }
    Ok(())
}

fn unit(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&finite(field, value)?) {
        return Err(ValidationError::OutOfUnitRange { field, value });
    }
    Ok(())
}

impl SimConfig {
    /// Validate all fields, failing on the first offending one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        unit("regulation_probability", self.regulation_probability)?;
        unit("rent_discount", self.rent_discount)?;
        non_negative("base_decay_constant", self.base_decay_constant)?;
        non_negative("decay_differential", self.decay_differential)?;
        positive("num_month_rent_renovation", self.num_month_rent_renovation)?;
        positive("renovation_profit_horizon", self.renovation_profit_horizon)?;
        if finite("base_rent_increase", self.base_rent_increase)? < 1.0 {
            return Err(ValidationError::ShrinkingRent(self.base_rent_increase));
        }
        non_negative(
            "rent_increase_differential",
            self.rent_increase_differential,
        )?;
        positive("max_complaint", f64::from(self.max_complaint))?;
        positive(
            "enforcement_complaint_threshold",
            f64::from(self.enforcement_complaint_threshold),
        )?;
        if let Some(cap) = self.max_occupancy {
            positive("max_occupancy", cap as f64)?;
        }
        non_negative("adjacency_tolerance", self.adjacency_tolerance)?;
        Ok(())
    }

    /// Decay exponent for a region with the given regulation status.
    pub fn decay_constant(&self, regulated: bool) -> f64 {
        if regulated {
            self.base_decay_constant + self.decay_differential
        } else {
            self.base_decay_constant
        }
    }

    /// Per-renovation rent multiplier for a region with the given regulation status.
    pub fn rent_increase(&self, regulated: bool) -> f64 {
        if regulated {
            self.base_rent_increase
        } else {
            self.base_rent_increase + self.rent_increase_differential
        }
    }
}
