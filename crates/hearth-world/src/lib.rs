//! The world model for Hearth.
//!
//! Everything that exists in the game lives here: the immutable map of
//! locations, the actors that wander it, and the bookkeeping of who is
//! standing where.
//!
//! # Key types
//!
//! - [`WorldMap`] / [`Location`] — read-only topology, shared via `Arc`
//! - [`OccupancyTracker`] — location → occupants, with a reverse index
//! - [`Actor`] / [`ActorKind`] — players, NPCs, monsters, and items
//! - [`Population`] — the spawned (non-player) actors and where they are
//! - [`CharacterRecord`] — the persisted projection of a player character

mod actor;
mod error;
mod occupancy;
mod population;
mod record;
mod topology;

pub use actor::{
    Actor, ActorKind, Advancement, EXPERIENCE_PER_LEVEL, find_by_name,
};
pub use error::WorldError;
pub use occupancy::OccupancyTracker;
pub use population::Population;
pub use record::{CharacterRecord, ItemRecord};
pub use topology::{Location, WorldMap, opposite_direction};
