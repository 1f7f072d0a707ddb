//! Occupancy tracking: who is standing in which location.
//!
//! Two indexes kept in lockstep:
//!
//! ```text
//!   rooms:  location ──→ { occupant, occupant, ... }   (ordered)
//!   index:  occupant ──→ location
//! ```
//!
//! The forward index answers "who is here?" (for `look`, `who`, and room
//! broadcasts); the reverse index answers "where is this one?" in O(1).
//! Every mutation updates both or neither, so an occupant is always in
//! exactly one location's set or in none.
//!
//! The tracker is generic over the occupant key: the session registry
//! tracks `SessionId`s, the population tracks `ActorId`s.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;

use hearth_protocol::LocationId;

use crate::WorldError;

/// Location ↔ occupant bookkeeping.
///
/// Like the session registry that owns one, this is a plain single-owner
/// structure: no locks inside. The realm actor is the only writer.
#[derive(Debug, Clone)]
pub struct OccupancyTracker<K> {
    /// Occupants per location. Sets are ordered so listings are stable.
    /// Empty sets are removed rather than kept around.
    rooms: HashMap<LocationId, BTreeSet<K>>,

    /// Reverse index: where each occupant currently is.
    index: HashMap<K, LocationId>,
}

impl<K> Default for OccupancyTracker<K> {
    fn default() -> Self {
        Self {
            rooms: HashMap::new(),
            index: HashMap::new(),
        }
    }
}

impl<K> OccupancyTracker<K>
where
    K: Ord + Hash + Clone + fmt::Display,
{
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `key` into `location`.
    ///
    /// Placing an occupant where it already is does nothing.
    ///
    /// # Errors
    /// Returns [`WorldError::InvariantViolation`] if `key` is already in a
    /// *different* location. Use [`relocate`](Self::relocate) to move.
    pub fn place(
        &mut self,
        key: K,
        location: LocationId,
    ) -> Result<(), WorldError> {
        match self.index.get(&key) {
            Some(current) if *current == location => return Ok(()),
            Some(current) => {
                return Err(WorldError::InvariantViolation(format!(
                    "{key} is already in {current}, cannot place in {location}"
                )));
            }
            None => {}
        }
        self.rooms
            .entry(location.clone())
            .or_default()
            .insert(key.clone());
        self.index.insert(key, location);
        Ok(())
    }

    /// Takes `key` out of `location`.
    ///
    /// Returns `false` (and changes nothing) if `key` wasn't there, which
    /// makes a duplicate removal on the disconnect path harmless.
    pub fn remove(&mut self, key: &K, location: &LocationId) -> bool {
        if self.index.get(key) != Some(location) {
            return false;
        }
        self.index.remove(key);
        if let Some(set) = self.rooms.get_mut(location) {
            set.remove(key);
            if set.is_empty() {
                self.rooms.remove(location);
            }
        }
        true
    }

    /// Moves `key` from `from` to `to` in one step.
    ///
    /// # Errors
    /// Returns [`WorldError::InvariantViolation`] if `key` is not currently
    /// in `from`. On error nothing changes.
    pub fn relocate(
        &mut self,
        key: &K,
        from: &LocationId,
        to: LocationId,
    ) -> Result<(), WorldError> {
        if self.index.get(key) != Some(from) {
            return Err(WorldError::InvariantViolation(format!(
                "{key} is not in {from}"
            )));
        }
        self.remove(key, from);
        // Cannot fail: `key` was just removed from the index.
        self.place(key.clone(), to)
    }

    /// Everyone in `location`, in key order.
    pub fn occupants_of(
        &self,
        location: &LocationId,
    ) -> impl Iterator<Item = &K> + '_ {
        self.rooms.get(location).into_iter().flatten()
    }

    /// Where `key` is, if anywhere.
    pub fn location_of(&self, key: &K) -> Option<&LocationId> {
        self.index.get(key)
    }

    /// `true` if `key` is somewhere.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Total number of tracked occupants.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// `true` when nobody is anywhere.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Checks that the two indexes mirror each other exactly.
    ///
    /// Used by owners in `debug_assert!` after every mutation.
    pub fn is_consistent(&self) -> bool {
        let forward: usize = self.rooms.values().map(BTreeSet::len).sum();
        forward == self.index.len()
            && self.rooms.values().all(|set| !set.is_empty())
            && self.rooms.iter().all(|(location, set)| {
                set.iter().all(|k| self.index.get(k) == Some(location))
            })
    }
}

#[cfg(test)]
mod tests {
    use hearth_protocol::SessionId;

    use super::*;

    fn sid(id: u64) -> SessionId {
        SessionId(id)
    }

    fn at(tracker: &OccupancyTracker<SessionId>, loc: &str) -> Vec<u64> {
        tracker
            .occupants_of(&loc.into())
            .map(|s| s.0)
            .collect()
    }

    // =====================================================================
    // place()
    // =====================================================================

    #[test]
    fn test_place_new_occupant_indexes_both_ways() {
        let mut t = OccupancyTracker::new();
        t.place(sid(2), "square".into()).unwrap();
        t.place(sid(1), "square".into()).unwrap();

        assert_eq!(at(&t, "square"), vec![1, 2], "ordered by key");
        assert_eq!(t.location_of(&sid(1)), Some(&LocationId::from("square")));
        assert!(t.is_consistent());
    }

    #[test]
    fn test_place_same_location_twice_is_noop() {
        let mut t = OccupancyTracker::new();
        t.place(sid(1), "square".into()).unwrap();
        t.place(sid(1), "square".into()).unwrap();

        assert_eq!(t.len(), 1);
        assert_eq!(at(&t, "square"), vec![1]);
    }

    #[test]
    fn test_place_elsewhere_returns_invariant_violation() {
        let mut t = OccupancyTracker::new();
        t.place(sid(1), "square".into()).unwrap();

        let result = t.place(sid(1), "market".into());

        assert!(matches!(result, Err(WorldError::InvariantViolation(_))));
        assert_eq!(at(&t, "square"), vec![1]);
        assert!(at(&t, "market").is_empty());
    }

    // =====================================================================
    // remove()
    // =====================================================================

    #[test]
    fn test_remove_present_occupant_returns_true() {
        let mut t = OccupancyTracker::new();
        t.place(sid(1), "square".into()).unwrap();

        assert!(t.remove(&sid(1), &"square".into()));
        assert!(t.is_empty());
        assert!(at(&t, "square").is_empty());
        assert!(t.is_consistent());
    }

    #[test]
    fn test_remove_absent_occupant_is_noop() {
        let mut t = OccupancyTracker::new();
        t.place(sid(1), "square".into()).unwrap();

        assert!(!t.remove(&sid(9), &"square".into()));
        assert!(!t.remove(&sid(1), &"market".into()), "wrong location");
        assert_eq!(t.location_of(&sid(1)), Some(&LocationId::from("square")));
    }

    // =====================================================================
    // relocate()
    // =====================================================================

    #[test]
    fn test_relocate_moves_between_sets() {
        let mut t = OccupancyTracker::new();
        t.place(sid(1), "square".into()).unwrap();
        t.place(sid(2), "square".into()).unwrap();

        t.relocate(&sid(1), &"square".into(), "market".into())
            .unwrap();

        assert_eq!(at(&t, "square"), vec![2]);
        assert_eq!(at(&t, "market"), vec![1]);
        assert_eq!(t.location_of(&sid(1)), Some(&LocationId::from("market")));
        assert!(t.is_consistent());
    }

    #[test]
    fn test_relocate_from_wrong_location_changes_nothing() {
        let mut t = OccupancyTracker::new();
        t.place(sid(1), "square".into()).unwrap();

        let result = t.relocate(&sid(1), &"tavern".into(), "market".into());

        assert!(matches!(result, Err(WorldError::InvariantViolation(_))));
        assert_eq!(t.location_of(&sid(1)), Some(&LocationId::from("square")));
        assert!(at(&t, "market").is_empty());
    }

    #[test]
    fn test_relocate_unknown_occupant_returns_error() {
        let mut t: OccupancyTracker<SessionId> = OccupancyTracker::new();
        let result = t.relocate(&sid(1), &"square".into(), "market".into());
        assert!(result.is_err());
        assert!(t.is_empty());
    }
}
