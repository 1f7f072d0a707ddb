//! The spawned population: every non-player actor standing somewhere.

use std::collections::HashMap;

use hearth_protocol::{ActorId, LocationId};

use crate::{Actor, OccupancyTracker, WorldError, find_by_name};

/// Monsters, NPCs, and loose items placed in the world.
///
/// Players are not here: they live in the session registry, which has
/// its own occupancy tracker keyed by session.
#[derive(Debug, Default)]
pub struct Population {
    actors: HashMap<ActorId, Actor>,
    placement: OccupancyTracker<ActorId>,
    /// Ids are handed out monotonically and never reused.
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a new actor at `location` and returns its id.
    ///
    /// The caller is responsible for `location` being on the map.
    pub fn spawn(
        &mut self,
        actor: Actor,
        location: LocationId,
    ) -> Result<ActorId, WorldError> {
        self.next_id += 1;
        let id = ActorId(self.next_id);
        self.placement.place(id, location.clone())?;
        tracing::debug!(%id, name = %actor.name, %location, "actor spawned");
        self.actors.insert(id, actor);
        Ok(id)
    }

    /// Removes an actor from the world, returning it and where it was.
    pub fn despawn(&mut self, id: ActorId) -> Option<(Actor, LocationId)> {
        let actor = self.actors.remove(&id)?;
        let location = self.placement.location_of(&id).cloned()?;
        self.placement.remove(&id, &location);
        tracing::debug!(%id, name = %actor.name, %location, "actor despawned");
        debug_assert!(self.placement.is_consistent());
        Some((actor, location))
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn location_of(&self, id: ActorId) -> Option<&LocationId> {
        self.placement.location_of(&id)
    }

    /// Every actor at `location`, in spawn order.
    pub fn actors_at(
        &self,
        location: &LocationId,
    ) -> impl Iterator<Item = (ActorId, &Actor)> + '_ {
        self.placement
            .occupants_of(location)
            .filter_map(|id| self.actors.get(id).map(|actor| (*id, actor)))
    }

    /// Resolves a typed name to an actor at `location`.
    ///
    /// See [`find_by_name`] for the matching rule.
    pub fn find_at(
        &self,
        location: &LocationId,
        name: &str,
    ) -> Option<ActorId> {
        find_by_name(
            self.actors_at(location)
                .map(|(id, actor)| (id, actor.name.as_str())),
            name,
        )
    }

    /// Like [`find_at`](Self::find_at), restricted to actors that pass
    /// `filter`.
    pub fn find_at_where(
        &self,
        location: &LocationId,
        name: &str,
        filter: impl Fn(&Actor) -> bool,
    ) -> Option<ActorId> {
        find_by_name(
            self.actors_at(location)
                .filter(|(_, actor)| filter(actor))
                .map(|(id, actor)| (id, actor.name.as_str())),
            name,
        )
    }

    /// Number of spawned actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
