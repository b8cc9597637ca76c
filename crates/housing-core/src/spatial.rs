//! Spatial bookkeeping: regions, their adjacency, and household membership.
//!
//! The index is the only owner of regions and households. Membership is kept
//! per region so resident lookups never scan the whole population, and every
//! membership change goes through [`SpatialIndex::add_person`],
//! [`SpatialIndex::remove_person`] or [`SpatialIndex::relocate_person`].

use crate::person::{Person, PersonId};
use crate::region::{Region, RegionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by index lookups and membership changes.
#[derive(Debug, Error, PartialEq)]
pub enum SpatialError {
    /// Lookup by an id that was never registered.
    #[error("unknown region {0}")]
    UnknownRegion(RegionId),
    /// Membership change targeting an id that was never registered.
    #[error("cannot place a household in unregistered {0}")]
    InvalidRegion(RegionId),
    /// The same id was registered twice.
    #[error("{0} is registered more than once")]
    DuplicateRegion(RegionId),
    /// Boundary unusable as a region.
    #[error("degenerate geometry for {region}: {reason}")]
    DegenerateGeometry {
        region: RegionId,
        reason: &'static str,
    },
    /// Lookup by an id that was never spawned.
    #[error("unknown household {0}")]
    UnknownPerson(PersonId),
    /// Removal of a household that has no region.
    #[error("{0} is not a member of any region")]
    NotAMember(PersonId),
    /// Insertion of a household that already has a region.
    #[error("{person} already lives in {region}")]
    AlreadyPlaced { person: PersonId, region: RegionId },
}

/// Handle over every steppable agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    Region(RegionId),
    Person(PersonId),
}

/// Authoritative store of regions, adjacency and household membership.
#[derive(Clone, Debug, Default)]
pub struct SpatialIndex {
    regions: Vec<Region>,
    slots: BTreeMap<RegionId, usize>,
    neighbors: Vec<Vec<RegionId>>,
    members: Vec<Vec<PersonId>>,
    persons: Vec<Person>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register regions in bulk and rebuild the adjacency relation.
    ///
    /// Two regions are neighbours when their boundaries come within
    /// `tolerance` of each other. Nothing is registered if any region is
    /// rejected.
    pub fn register_regions(
        &mut self,
        regions: Vec<Region>,
        tolerance: f64,
    ) -> Result<(), SpatialError> {
        let mut incoming: BTreeMap<RegionId, usize> = BTreeMap::new();
        for (i, region) in regions.iter().enumerate() {
            if let Some(reason) = region.boundary().degeneracy() {
                return Err(SpatialError::DegenerateGeometry {
                    region: region.id(),
                    reason,
                });
            }
            let slot = self.regions.len() + i;
            let taken = self.slots.contains_key(&region.id());
            if taken || incoming.insert(region.id(), slot).is_some() {
                return Err(SpatialError::DuplicateRegion(region.id()));
            }
        }
        let added = regions.len();
        self.slots.extend(incoming);
        self.regions.extend(regions);
        self.members.resize_with(self.regions.len(), Vec::new);
        self.rebuild_adjacency(tolerance);
        info!(
            added,
            total = self.regions.len(),
            edges = self.neighbors.iter().map(Vec::len).sum::<usize>() / 2,
            "registered regions"
        );
        Ok(())
    }

    fn rebuild_adjacency(&mut self, tolerance: f64) {
        let n = self.regions.len();
        let mut neighbors = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.regions[i], &self.regions[j]);
                if a.boundary().touches(b.boundary(), tolerance) {
                    neighbors[i].push(b.id());
                    neighbors[j].push(a.id());
                }
            }
        }
        self.neighbors = neighbors;
    }

    fn slot(&self, id: RegionId) -> Result<usize, SpatialError> {
        self.slots
            .get(&id)
            .copied()
            .ok_or(SpatialError::UnknownRegion(id))
    }

    fn person_slot(&self, id: PersonId) -> Result<usize, SpatialError> {
        let slot = id.0 as usize;
        if slot < self.persons.len() {
            Ok(slot)
        } else {
            Err(SpatialError::UnknownPerson(id))
        }
    }

    pub fn region_by_id(&self, id: RegionId) -> Result<&Region, SpatialError> {
        Ok(&self.regions[self.slot(id)?])
    }

    pub fn region_mut(&mut self, id: RegionId) -> Result<&mut Region, SpatialError> {
        let slot = self.slot(id)?;
        Ok(&mut self.regions[slot])
    }

    /// Cached neighbours of a region, never including the region itself.
    pub fn neighbors_of(&self, id: RegionId) -> Result<&[RegionId], SpatialError> {
        Ok(&self.neighbors[self.slot(id)?])
    }

    /// Ids of the households currently living in a region.
    pub fn member_ids(&self, id: RegionId) -> Result<&[PersonId], SpatialError> {
        Ok(&self.members[self.slot(id)?])
    }

    /// Households currently living in a region.
    pub fn members_of(
        &self,
        id: RegionId,
    ) -> Result<impl Iterator<Item = &Person> + '_, SpatialError> {
        let ids = self.member_ids(id)?;
        Ok(ids.iter().map(move |p| &self.persons[p.0 as usize]))
    }

    pub fn occupancy(&self, id: RegionId) -> Result<usize, SpatialError> {
        Ok(self.member_ids(id)?.len())
    }

    pub fn person(&self, id: PersonId) -> Result<&Person, SpatialError> {
        Ok(&self.persons[self.person_slot(id)?])
    }

    /// Mutable access to a household's counters. Membership stays with the index.
    pub fn person_mut(&mut self, id: PersonId) -> Result<&mut Person, SpatialError> {
        let slot = self.person_slot(id)?;
        Ok(&mut self.persons[slot])
    }

    /// Insert a new household directly into a region, assigning its id.
    pub fn spawn_person(
        &mut self,
        mut person: Person,
        region: RegionId,
    ) -> Result<PersonId, SpatialError> {
        let slot = self
            .slots
            .get(&region)
            .copied()
            .ok_or(SpatialError::InvalidRegion(region))?;
        let id = PersonId(self.persons.len() as u32);
        person.id = id;
        person.region = Some(region);
        self.persons.push(person);
        self.members[slot].push(id);
        Ok(id)
    }

    /// Place an unplaced (displaced) household in a region.
    pub fn add_person(&mut self, person: PersonId, region: RegionId) -> Result<(), SpatialError> {
        let slot = self
            .slots
            .get(&region)
            .copied()
            .ok_or(SpatialError::InvalidRegion(region))?;
        let p = self.person_slot(person)?;
        if let Some(current) = self.persons[p].region {
            return Err(SpatialError::AlreadyPlaced {
                person,
                region: current,
            });
        }
        self.persons[p].region = Some(region);
        self.members[slot].push(person);
        Ok(())
    }

    /// Take a household out of its region, returning the region it left.
    pub fn remove_person(&mut self, person: PersonId) -> Result<RegionId, SpatialError> {
        let p = self.person_slot(person)?;
        let region = self.persons[p]
            .region
            .ok_or(SpatialError::NotAMember(person))?;
        let slot = self.slot(region)?;
        let members = &mut self.members[slot];
        let pos = members
            .iter()
            .position(|m| *m == person)
            .ok_or(SpatialError::NotAMember(person))?;
        members.remove(pos);
        self.persons[p].region = None;
        Ok(region)
    }

    /// Move a household to `to` as one transfer, returning the region it left.
    ///
    /// The target is checked before anything changes, so a failed call
    /// leaves membership untouched.
    pub fn relocate_person(
        &mut self,
        person: PersonId,
        to: RegionId,
    ) -> Result<Option<RegionId>, SpatialError> {
        if !self.slots.contains_key(&to) {
            return Err(SpatialError::InvalidRegion(to));
        }
        let from = match self.person(person)?.region {
            Some(_) => Some(self.remove_person(person)?),
            None => None,
        };
        self.add_person(person, to)?;
        debug!(%person, ?from, %to, "household relocated");
        Ok(from)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    /// Region ids in registration order.
    pub fn region_ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.iter().map(Region::id)
    }

    /// Every agent: regions in registration order, then households in creation order.
    pub fn all_agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.region_ids()
            .map(AgentId::Region)
            .chain(self.persons.iter().map(|p| AgentId::Person(p.id())))
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    /// Households with a region.
    pub fn housed_count(&self) -> usize {
        self.members.iter().map(Vec::len).sum()
    }

    pub fn displaced_count(&self) -> usize {
        self.persons.iter().filter(|p| p.is_displaced()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::geometry::{grid_regions, Point, Polygon, RegionGeometry};
    use proptest::prelude::*;

    fn grid_index(cols: u32, rows: u32) -> SpatialIndex {
        let cfg = SimConfig::default();
        let regions = grid_regions(cols, rows, 1.0)
            .into_iter()
            .map(|g| {
                let b = g.boundary.bounds();
                let centre = Point::new((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0);
                Region::new(g, centre, false, 80.0, &cfg)
            })
            .collect();
        let mut index = SpatialIndex::new();
        index.register_regions(regions, 1e-9).unwrap();
        index
    }

    fn household(income: f64) -> Person {
        Person::new(PersonId(u32::MAX), income, 65.0, Point::new(0.0, 0.0))
    }

    #[test]
    fn adjacency_excludes_self_and_is_symmetric() {
        let index = grid_index(3, 3);
        let centre = index.neighbors_of(RegionId(4)).unwrap();
        assert_eq!(centre.len(), 8);
        assert!(!centre.contains(&RegionId(4)));
        let corner = index.neighbors_of(RegionId(0)).unwrap();
        assert_eq!(corner, &[RegionId(1), RegionId(3), RegionId(4)]);
        for id in index.region_ids() {
            for n in index.neighbors_of(id).unwrap() {
                assert!(index.neighbors_of(*n).unwrap().contains(&id));
            }
        }
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut index = grid_index(2, 1);
        assert_eq!(
            index.region_by_id(RegionId(9)).err(),
            Some(SpatialError::UnknownRegion(RegionId(9)))
        );
        assert_eq!(
            index.spawn_person(household(1.0), RegionId(9)).err(),
            Some(SpatialError::InvalidRegion(RegionId(9)))
        );
        assert_eq!(
            index.person(PersonId(0)).err(),
            Some(SpatialError::UnknownPerson(PersonId(0)))
        );
    }

    #[test]
    fn duplicate_and_degenerate_regions_are_rejected() {
        let cfg = SimConfig::default();
        let square = |id| RegionGeometry {
            id: RegionId(id),
            boundary: Polygon::rectangle(0.0, 0.0, 1.0, 1.0),
        };
        let mut index = SpatialIndex::new();
        let dup = vec![
            Region::new(square(1), Point::new(0.5, 0.5), false, 70.0, &cfg),
            Region::new(square(1), Point::new(0.5, 0.5), false, 70.0, &cfg),
        ];
        assert_eq!(
            index.register_regions(dup, 1e-9),
            Err(SpatialError::DuplicateRegion(RegionId(1)))
        );
        assert_eq!(index.region_count(), 0);

        let flat = RegionGeometry {
            id: RegionId(2),
            boundary: Polygon::rectangle(0.0, 0.0, 1.0, 0.0),
        };
        let region = Region::new(flat, Point::new(0.0, 0.0), false, 70.0, &cfg);
        let err = index.register_regions(vec![region], 1e-9).unwrap_err();
        assert!(matches!(err, SpatialError::DegenerateGeometry { .. }));
    }

    #[test]
    fn membership_is_indexed_per_region() {
        let mut index = grid_index(2, 1);
        let a = index.spawn_person(household(0.2), RegionId(0)).unwrap();
        let b = index.spawn_person(household(0.8), RegionId(0)).unwrap();
        let c = index.spawn_person(household(0.5), RegionId(1)).unwrap();
        assert_eq!(index.member_ids(RegionId(0)).unwrap(), &[a, b]);
        let incomes: Vec<f64> = index
            .members_of(RegionId(1))
            .unwrap()
            .map(Person::income)
            .collect();
        assert_eq!(incomes, vec![0.5]);
        assert_eq!(index.person(c).unwrap().region(), Some(RegionId(1)));
        assert_eq!(index.housed_count(), 3);
    }

    #[test]
    fn remove_then_add_round_trip() {
        let mut index = grid_index(2, 1);
        let a = index.spawn_person(household(0.2), RegionId(0)).unwrap();
        assert_eq!(index.remove_person(a), Ok(RegionId(0)));
        assert!(index.person(a).unwrap().is_displaced());
        assert_eq!(index.occupancy(RegionId(0)), Ok(0));
        assert_eq!(index.displaced_count(), 1);
        assert_eq!(index.remove_person(a), Err(SpatialError::NotAMember(a)));
        index.add_person(a, RegionId(1)).unwrap();
        assert_eq!(
            index.add_person(a, RegionId(0)),
            Err(SpatialError::AlreadyPlaced {
                person: a,
                region: RegionId(1)
            })
        );
        assert_eq!(index.occupancy(RegionId(1)), Ok(1));
    }

    #[test]
    fn failed_relocation_changes_nothing() {
        let mut index = grid_index(2, 1);
        let a = index.spawn_person(household(0.2), RegionId(0)).unwrap();
        assert_eq!(
            index.relocate_person(a, RegionId(7)),
            Err(SpatialError::InvalidRegion(RegionId(7)))
        );
        assert_eq!(index.person(a).unwrap().region(), Some(RegionId(0)));
        assert_eq!(index.relocate_person(a, RegionId(1)), Ok(Some(RegionId(0))));
        assert_eq!(index.occupancy(RegionId(0)), Ok(0));
        assert_eq!(index.member_ids(RegionId(1)).unwrap(), &[a]);
    }

    #[test]
    fn all_agents_lists_regions_then_people() {
        let mut index = grid_index(2, 1);
        let a = index.spawn_person(household(0.2), RegionId(1)).unwrap();
        let agents: Vec<AgentId> = index.all_agents().collect();
        assert_eq!(
            agents,
            vec![
                AgentId::Region(RegionId(0)),
                AgentId::Region(RegionId(1)),
                AgentId::Person(a)
            ]
        );
    }

    proptest! {
        #[test]
        fn occupancy_sums_to_housed_population(moves in proptest::collection::vec((0u32..6, 0u32..5), 0..60)) {
            let mut index = grid_index(5, 1);
            for i in 0..6u32 {
                index.spawn_person(household(0.5), RegionId(i % 5)).unwrap();
            }
            for (p, r) in moves {
                let person = PersonId(p);
                if r == 4 && !index.person(person).unwrap().is_displaced() {
                    index.remove_person(person).unwrap();
                } else {
                    index.relocate_person(person, RegionId(r)).unwrap();
                }
                let occupied: usize = index.region_ids().map(|id| index.occupancy(id).unwrap()).sum();
                prop_assert_eq!(occupied + index.displaced_count(), index.person_count());
                prop_assert_eq!(occupied, index.housed_count());
            }
        }
    }
}
