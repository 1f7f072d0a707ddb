//! World topology: the immutable graph of locations and exits.
//!
//! The map is built once at startup, validated, and then shared read-only
//! (behind an `Arc`) by everything that needs to know where an exit leads.
//! Exits are directed edges: a one-way exit is perfectly legal, the loader
//! only checks that every exit points at a location that exists.

use std::collections::{BTreeMap, HashMap};

use hearth_protocol::LocationId;
use serde::{Deserialize, Serialize};

use crate::WorldError;

/// One place in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    /// Title shown on the first line of a room view.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Direction label → destination.
    ///
    /// A `BTreeMap` keeps directions sorted, so exits always list in the
    /// same order ("east, north, south") no matter how the file was written.
    #[serde(default)]
    pub exits: BTreeMap<String, LocationId>,
}

/// The shape of a map file on disk.
#[derive(Debug, Deserialize)]
struct MapFile {
    start: LocationId,
    locations: Vec<Location>,
}

/// The read-only world map.
#[derive(Debug, Clone)]
pub struct WorldMap {
    locations: HashMap<LocationId, Location>,
    start: LocationId,
}

impl WorldMap {
    /// Builds a map from a list of locations and a start location.
    ///
    /// # Errors
    /// - [`WorldError::DuplicateLocation`] if two locations share an id
    /// - [`WorldError::UnknownLocation`] if the start location or any exit
    ///   target is missing
    pub fn new(
        locations: Vec<Location>,
        start: LocationId,
    ) -> Result<Self, WorldError> {
        let mut by_id = HashMap::with_capacity(locations.len());
        for location in locations {
            if by_id.contains_key(&location.id) {
                return Err(WorldError::DuplicateLocation(location.id));
            }
            by_id.insert(location.id.clone(), location);
        }

        if !by_id.contains_key(&start) {
            return Err(WorldError::UnknownLocation(start));
        }
        for location in by_id.values() {
            for target in location.exits.values() {
                if !by_id.contains_key(target) {
                    return Err(WorldError::UnknownLocation(target.clone()));
                }
            }
        }

        tracing::debug!(locations = by_id.len(), %start, "world map loaded");
        Ok(Self {
            locations: by_id,
            start,
        })
    }

    /// Parses a `{ "start": "...", "locations": [...] }` document.
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let file: MapFile = serde_json::from_str(json)?;
        Self::new(file.locations, file.start)
    }

    /// Looks up a location.
    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    /// `true` if the id names a location on this map.
    pub fn contains(&self, id: &LocationId) -> bool {
        self.locations.contains_key(id)
    }

    /// The exits of a location, sorted by direction label. Empty for an
    /// unknown location.
    pub fn exits_of(
        &self,
        id: &LocationId,
    ) -> impl Iterator<Item = (&str, &LocationId)> + '_ {
        self.locations
            .get(id)
            .into_iter()
            .flat_map(|loc| loc.exits.iter().map(|(d, to)| (d.as_str(), to)))
    }

    /// Where `direction` leads from `from`, or `None` if there is no such
    /// exit. Direction labels are matched exactly; callers lowercase them.
    pub fn destination(
        &self,
        from: &LocationId,
        direction: &str,
    ) -> Option<&LocationId> {
        self.locations.get(from)?.exits.get(direction)
    }

    /// Where new characters (and characters with no valid saved location)
    /// appear.
    pub fn start_location(&self) -> &LocationId {
        &self.start
    }

    /// Number of locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// `true` for a map with no locations. A validated map never is.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// The direction you came from, for the fixed compass and vertical pairs.
///
/// ```rust
/// use hearth_world::opposite_direction;
///
/// assert_eq!(opposite_direction("north"), Some("south"));
/// assert_eq!(opposite_direction("up"), Some("down"));
/// assert_eq!(opposite_direction("through the portal"), None);
/// ```
pub fn opposite_direction(direction: &str) -> Option<&'static str> {
    match direction {
        "north" => Some("south"),
        "south" => Some("north"),
        "east" => Some("west"),
        "west" => Some("east"),
        "up" => Some("down"),
        "down" => Some("up"),
        _ => None,
    }
}
