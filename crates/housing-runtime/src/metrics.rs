//! Per-tick aggregate report.

use crate::scheduler::TickActivity;
use housing_core::{
    AttemptCause, Person, SpatialError, SpatialIndex, LOW_INCOME_BRACKET,
    LOW_INCOME_COMPLAINT_CUTOFF, LOW_QUALITY_THRESHOLD,
};
use housing_econ::{mean, RegionEconomics};
use serde::{Deserialize, Serialize};

/// A quantity split by household income bracket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ByIncome<T> {
    /// Income above the low-income bracket.
    pub others: T,
    pub low_income: T,
}

/// A quantity split by region regulation status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ByRegulation<T> {
    pub regulated: T,
    pub unregulated: T,
}

/// Snapshot of the simulation after a tick.
///
/// Counters on households and regions are cumulative since setup; `activity`
/// holds what happened during the tick itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub households: usize,
    pub housed: usize,
    pub displaced: usize,
    /// Displaced households with income at or below the complaint cutoff.
    pub low_income_displaced: usize,
    /// Mean quality of the home region over housed households.
    pub mean_housing_quality: ByIncome<f64>,
    pub mean_complaints: ByIncome<f64>,
    pub displaced_share: ByIncome<f64>,
    pub mean_region_quality: ByRegulation<f64>,
    pub mean_rent: ByRegulation<f64>,
    /// Housed households whose region is below the low-quality mark.
    pub low_quality_households: ByIncome<usize>,
    pub households_by_regulation: ByRegulation<usize>,
    pub moves: u32,
    pub low_income_moves: u32,
    pub rent_attempts: ByIncome<u32>,
    pub quality_attempts: ByIncome<u32>,
    pub renovations: u32,
    pub enforcements: u32,
    /// Running complaint counters summed over every region's residents.
    pub resident_complaints: u32,
    pub low_income_resident_complaints: u32,
    pub activity: TickActivity,
}

impl<T> ByRegulation<T> {
    fn get_mut(&mut self, regulated: bool) -> &mut T {
        if regulated {
            &mut self.regulated
        } else {
            &mut self.unregulated
        }
    }

    fn map<U>(self, mut f: impl FnMut(T) -> U) -> ByRegulation<U> {
        ByRegulation {
            regulated: f(self.regulated),
            unregulated: f(self.unregulated),
        }
    }
}

fn is_low_income(p: &Person) -> bool {
    p.income() <= LOW_INCOME_BRACKET
}

fn very_low_income_displaced(p: &&Person) -> bool {
    p.is_displaced() && p.income() <= LOW_INCOME_COMPLAINT_CUTOFF
}

fn complaint_level(p: &Person) -> f64 {
    f64::from(p.complaints())
}

fn split<'a, T, F>(persons: &'a [Person], mut f: F) -> ByIncome<T>
where
    F: FnMut(&mut dyn Iterator<Item = &'a Person>) -> T,
{
    ByIncome {
        others: f(&mut persons.iter().filter(|p| !is_low_income(p))),
        low_income: f(&mut persons.iter().filter(|p| is_low_income(p))),
    }
}

fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn displaced_fraction(persons: &mut dyn Iterator<Item = &Person>) -> f64 {
    let (mut displaced, mut total) = (0, 0);
    for p in persons {
        total += 1;
        if p.is_displaced() {
            displaced += 1;
        }
    }
    share(displaced, total)
}

fn attempt_totals(persons: &[Person], cause: AttemptCause) -> ByIncome<u32> {
    split(persons, |it| it.map(|p| p.attempts(cause)).sum())
}

impl TickReport {
    /// Read every aggregate from the index.
    pub fn collect(
        index: &SpatialIndex,
        tick: u64,
        activity: TickActivity,
    ) -> Result<Self, SpatialError> {
        let persons = index.persons();

        let mut quality = ByRegulation::<Vec<f64>>::default();
        let mut rent = ByRegulation::<Vec<f64>>::default();
        let mut by_regulation = ByRegulation::<usize>::default();
        let mut resident_complaints = 0;
        let mut low_income_resident_complaints = 0;
        let mut renovations = 0;
        let mut enforcements = 0;
        for region in index.regions() {
            let econ = RegionEconomics::new(index, region.id())?;
            let regulated = region.regulated;
            quality.get_mut(regulated).push(region.quality);
            rent.get_mut(regulated).push(econ.rent_price());
            *by_regulation.get_mut(regulated) += econ.occupancy();
            resident_complaints += econ.complaint_total();
            low_income_resident_complaints += econ.low_income_complaint_total();
            renovations += region.renovations();
            enforcements += region.enforcements();
        }

        let home_quality = |p: &Person| {
            let region = index.region_by_id(p.region()?).ok()?;
            Some(region.quality)
        };
        let low_quality = |q: &f64| *q < LOW_QUALITY_THRESHOLD;

        let low_income_displaced = persons.iter().filter(very_low_income_displaced).count();
        let mean_housing_quality = split(persons, |it| mean(it.filter_map(home_quality)));
        let mean_complaints = split(persons, |it| mean(it.map(complaint_level)));
        let low_quality_households = split(persons, |it| {
            let qualities = it.filter_map(home_quality);
            qualities.filter(low_quality).count()
        });
        let moves: ByIncome<u32> = split(persons, |it| it.map(Person::move_count).sum());

        Ok(Self {
            tick,
            households: persons.len(),
            housed: index.housed_count(),
            displaced: index.displaced_count(),
            low_income_displaced,
            mean_housing_quality,
            mean_complaints,
            displaced_share: split(persons, displaced_fraction),
            mean_region_quality: quality.map(mean),
            mean_rent: rent.map(mean),
            low_quality_households,
            households_by_regulation: by_regulation,
            moves: moves.others + moves.low_income,
            low_income_moves: moves.low_income,
            rent_attempts: attempt_totals(persons, AttemptCause::Rent),
            quality_attempts: attempt_totals(persons, AttemptCause::Quality),
            renovations,
            enforcements,
            resident_complaints,
            low_income_resident_complaints,
            activity,
        })
    }
}
