#![deny(warnings)]

//! Core domain models and invariants for the geo-housing simulation.
//!
//! This crate defines the region and household types, the validated run
//! configuration, planar geometry helpers, and the [`SpatialIndex`] that owns
//! every region and household along with the live membership between them.

pub mod config;
pub mod geometry;
pub mod person;
pub mod region;
pub mod spatial;

pub use config::{SimConfig, ThresholdPolicy, ValidationError};
pub use geometry::{grid_regions, Bounds, Point, Polygon, RegionGeometry, MAX_POINT_ATTEMPTS};
pub use person::{AttemptCause, Person, PersonId, RENT_BURDEN_SHARE};
pub use region::{Region, RegionId, INITIAL_QUALITY_MAX, INITIAL_QUALITY_MIN};
pub use spatial::{AgentId, SpatialError, SpatialIndex};

/// Income at or below which a household is reported as low income.
pub const LOW_INCOME_BRACKET: f64 = 0.5;

/// Very-low-income cutoff: resident complaints count toward the low-income
/// total strictly below it, displaced households are reported at or below it.
pub const LOW_INCOME_COMPLAINT_CUTOFF: f64 = 0.3;

/// Region quality under which households are counted as living in low-quality housing.
pub const LOW_QUALITY_THRESHOLD: f64 = 50.0;
