//! Households and their decision counters.

use crate::geometry::Point;
use crate::region::RegionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a household; also its slot in the [`crate::SpatialIndex`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u32);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "person#{}", self.0)
    }
}

/// Share of income a household will spend on rent at most.
pub const RENT_BURDEN_SHARE: f64 = 0.5;

/// Why a household started a relocation search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptCause {
    /// Rent above the affordable maximum.
    Rent,
    /// Too many consecutive quality complaints.
    Quality,
    /// Retry while displaced.
    DisplacedRetry,
}

/// A household.
///
/// The current region is only ever changed by the spatial index; a
/// household without a region is displaced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Person {
    pub(crate) id: PersonId,
    income: f64,
    quality_threshold: f64,
    pub(crate) region: Option<RegionId>,
    /// Position inside the current (or last) region, for map rendering.
    pub location: Point,
    complaints: u32,
    total_complaints: u32,
    move_count: u32,
    displacement_count: u32,
    attempt_rent: u32,
    attempt_quality: u32,
    attempt_displaced: u32,
}

impl Person {
    /// A new household that is not placed in any region yet.
    pub fn new(id: PersonId, income: f64, quality_threshold: f64, location: Point) -> Self {
        Self {
            id,
            income,
            quality_threshold,
            region: None,
            location,
            complaints: 0,
            total_complaints: 0,
            move_count: 0,
            displacement_count: 0,
            attempt_rent: 0,
            attempt_quality: 0,
            attempt_displaced: 0,
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn income(&self) -> f64 {
        self.income
    }

    pub fn quality_threshold(&self) -> f64 {
        self.quality_threshold
    }

    pub fn maximum_affordable_rent(&self) -> f64 {
        RENT_BURDEN_SHARE * self.income
    }

    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    pub fn is_displaced(&self) -> bool {
        self.region.is_none()
    }

    /// Consecutive complaints about the current region.
    pub fn complaints(&self) -> u32 {
        self.complaints
    }

    pub fn total_complaints(&self) -> u32 {
        self.total_complaints
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Relocation searches that found no candidate.
    pub fn displacement_count(&self) -> u32 {
        self.displacement_count
    }

    pub fn attempts(&self, cause: AttemptCause) -> u32 {
        match cause {
            AttemptCause::Rent => self.attempt_rent,
            AttemptCause::Quality => self.attempt_quality,
            AttemptCause::DisplacedRetry => self.attempt_displaced,
        }
    }

    /// One more complaint; the running and the lifetime counters move together.
    pub fn record_complaint(&mut self) -> u32 {
        self.complaints += 1;
        self.total_complaints += 1;
        self.complaints
    }

    pub fn clear_complaints(&mut self) {
        self.complaints = 0;
    }

    pub fn record_attempt(&mut self, cause: AttemptCause) {
        match cause {
            AttemptCause::Rent => self.attempt_rent += 1,
            AttemptCause::Quality => self.attempt_quality += 1,
            AttemptCause::DisplacedRetry => self.attempt_displaced += 1,
        }
    }

    /// Bookkeeping after a successful relocation.
    pub fn record_move(&mut self, location: Point) {
        self.move_count += 1;
        self.complaints = 0;
        self.location = location;
    }

    /// Bookkeeping after a search without candidates.
    pub fn record_displacement(&mut self) {
        self.displacement_count += 1;
    }
}
