#![deny(warnings)]

//! Economic models: rent, decay and renovation helpers for housing regions.
//!
//! This module provides:
//! - Exponential quality decay
//! - Income-driven rent with regulation discount and compounded renovation hikes
//! - The renovation payback test
//! - [`RegionEconomics`], the derived per-region quantities read from the spatial index

use housing_core::{
    Person, Region, RegionId, SpatialError, SpatialIndex, LOW_INCOME_COMPLAINT_CUTOFF,
};

/// Share of area income charged as base rent.
pub const BASE_RENT_SHARE: f64 = 0.5;

/// Quality after `age` ticks of exponential decay from `initial`.
///
/// Example:
/// let q = decayed_quality(100.0, 0.15, 10);
/// assert!((q - 22.313).abs() < 1e-3);
pub fn decayed_quality(initial: f64, decay_constant: f64, age: u32) -> f64 {
    initial * (-decay_constant * f64::from(age)).exp()
}

/// Arithmetic mean, 0 for an empty input.
///
/// Example:
/// assert_eq!(mean([1.0, 2.0, 3.0]), 2.0);
/// assert_eq!(mean(std::iter::empty()), 0.0);
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0u64), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Rent terms of one region: regulation status and its pricing factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RentTerms {
    pub regulated: bool,
    /// Multiplicative factor applied when regulated.
    pub discount: f64,
    /// Multiplier compounded once per renovation.
    pub increase: f64,
}

impl RentTerms {
    pub fn of(region: &Region) -> Self {
        Self {
            regulated: region.regulated,
            discount: region.rent_discount,
            increase: region.rent_increase,
        }
    }

    /// Rent after `renovations` stacked hikes for the given area income.
    ///
    /// Example:
    /// let terms = RentTerms { regulated: true, discount: 0.5, increase: 1.02 };
    /// assert_eq!(terms.rent(1.0, 0), 0.25);
    pub fn rent(&self, area_income: f64, renovations: u32) -> f64 {
        let base = BASE_RENT_SHARE * area_income;
        let regulated = if self.regulated {
            base * self.discount
        } else {
            base
        };
        let hikes = i32::try_from(renovations).unwrap_or(i32::MAX);
        regulated * self.increase.powi(hikes)
    }

    /// Rent gained by one more renovation.
    pub fn profit(&self, area_income: f64, renovations: u32) -> f64 {
        self.rent(area_income, renovations.saturating_add(1)) - self.rent(area_income, renovations)
    }
}

/// Whether `horizon` months of the marginal rent gain exceed a renovation
/// costing `cost_months` months of current rent.
///
/// A vacant neighbourhood (zero rent and zero profit) never renovates.
pub fn renovation_pays_off(profit: f64, rent: f64, horizon: f64, cost_months: f64) -> bool {
    profit * horizon > rent * cost_months
}

/// Quality threshold derived from income: `100 * income`, replaced by 90
/// when above 100 and by 50 when below 50.
pub fn income_derived_threshold(income: f64) -> f64 {
    let quality = 100.0 * income;
    if quality > 100.0 {
        90.0
    } else if quality < 50.0 {
        50.0
    } else {
        quality
    }
}

/// Derived, read-only economics of one region, recomputed from current membership.
///
/// Every aggregate over an empty resident set is 0.
#[derive(Clone, Copy)]
pub struct RegionEconomics<'a> {
    index: &'a SpatialIndex,
    region: &'a Region,
}

impl<'a> RegionEconomics<'a> {
    pub fn new(index: &'a SpatialIndex, id: RegionId) -> Result<Self, SpatialError> {
        Ok(Self {
            index,
            region: index.region_by_id(id)?,
        })
    }

    pub fn region(&self) -> &'a Region {
        self.region
    }

    fn residents(&self) -> impl Iterator<Item = &'a Person> + 'a {
        let index = self.index;
        // Registered regions always resolve.
        index
            .member_ids(self.region.id())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |p| index.person(*p).ok())
    }

    /// Mean income over residents of this region and all its neighbours.
    pub fn area_income(&self) -> f64 {
        let index = self.index;
        let neighbours = index.neighbors_of(self.region.id()).unwrap_or(&[]);
        let nearby = std::iter::once(self.region.id())
            .chain(neighbours.iter().copied())
            .flat_map(move |id| index.member_ids(id).unwrap_or(&[]).iter())
            .filter_map(move |p| index.person(*p).ok());
        mean(nearby.map(Person::income))
    }

    /// Mean income over this region's own residents.
    pub fn own_income(&self) -> f64 {
        mean(self.residents().map(Person::income))
    }

    pub fn rent_price(&self) -> f64 {
        let terms = RentTerms::of(self.region);
        terms.rent(self.area_income(), self.region.renovations())
    }

    pub fn rent_profit(&self) -> f64 {
        let terms = RentTerms::of(self.region);
        terms.profit(self.area_income(), self.region.renovations())
    }

    pub fn occupancy(&self) -> usize {
        let members = self.index.member_ids(self.region.id());
        members.map_or(0, <[_]>::len)
    }

    /// Sum of the residents' running complaint counters.
    pub fn complaint_total(&self) -> u32 {
        self.residents().map(Person::complaints).sum()
    }

    /// Complaint total restricted to residents below the low-income cutoff.
    pub fn low_income_complaint_total(&self) -> u32 {
        self.residents()
            .filter(|p| p.income() < LOW_INCOME_COMPLAINT_CUTOFF)
            .map(Person::complaints)
            .sum()
    }
}
