//! The realm state and its lifecycle operations.
//!
//! A [`Realm`] owns everything that changes while people play: the
//! session registry (players and where they are), the population
//! (monsters, NPCs, items), and the combat roll. The world map and the
//! template table are immutable and shared.
//!
//! All methods are synchronous and perform no I/O beyond queuing
//! messages on session channels. The [`actor`](crate::RealmHandle) wraps
//! a `Realm` in a task so callers on many connections can use it safely.

use std::sync::Arc;

use hearth_combat::{Combatant, HitRoll, SeededRoll, TemplateTable};
use hearth_protocol::{
    ActorId, ActorRef, GameEvent, LocationId, Recipient, RoomView,
    ServerMessage, SessionId,
};
use hearth_session::{
    Outbound, PendingRegistration, SessionConfig, SessionRegistry,
};
use hearth_world::{Actor, CharacterRecord, Population, WorldError, WorldMap};

use crate::{
    BroadcastRouter, Command, CommandError, ContentFilter, Notification,
    RealmError, WordListFilter,
};

/// The live game world.
pub struct Realm {
    pub(crate) world: Arc<WorldMap>,
    pub(crate) templates: Arc<TemplateTable>,
    pub(crate) registry: SessionRegistry,
    pub(crate) population: Population,
    pub(crate) roll: Box<dyn HitRoll>,
    pub(crate) filter: Box<dyn ContentFilter>,
}

impl Realm {
    /// Creates an empty realm over `world`.
    ///
    /// Characters without a usable saved location appear at the map's
    /// start location. Rolls are seeded from OS entropy and speech is not
    /// filtered until [`with_roll`](Self::with_roll) and
    /// [`with_filter`](Self::with_filter) say otherwise.
    pub fn new(world: Arc<WorldMap>, templates: Arc<TemplateTable>) -> Self {
        let config = SessionConfig {
            default_location: world.start_location().clone(),
        };
        Self {
            world,
            templates,
            registry: SessionRegistry::new(config),
            population: Population::new(),
            roll: Box::new(SeededRoll::from_entropy()),
            filter: Box::new(WordListFilter::default()),
        }
    }

    /// Replaces the source of combat rolls.
    pub fn with_roll(mut self, roll: impl HitRoll + 'static) -> Self {
        self.roll = Box::new(roll);
        self
    }

    /// Replaces the speech filter.
    pub fn with_filter(mut self, filter: impl ContentFilter) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn world(&self) -> &WorldMap {
        &self.world
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    // -- Session lifecycle -------------------------------------------------

    /// Registers a freshly connected session.
    pub fn open(
        &mut self,
        session: SessionId,
        outbound: Outbound,
    ) -> Result<(), RealmError> {
        Ok(self.registry.open(session, outbound)?)
    }

    /// Stores a validated name and clan while the client authenticates.
    pub fn begin_registration(
        &mut self,
        session: SessionId,
        pending: PendingRegistration,
    ) -> Result<(), RealmError> {
        Ok(self.registry.begin_registration(session, pending)?)
    }

    /// Hands back the stored name and clan.
    pub fn take_pending(
        &mut self,
        session: SessionId,
    ) -> Result<PendingRegistration, RealmError> {
        Ok(self.registry.take_pending(session)?)
    }

    /// Brings a stored character into the world on `session`.
    ///
    /// The character appears at its last location, or at the configured
    /// default if it has none (or it's no longer on the map), at full
    /// health. The player gets a welcome and a view of the room; everyone
    /// already there sees them arrive.
    ///
    /// # Errors
    /// - [`RealmError::Combat`] — the record's job has no template
    /// - [`RealmError::Session`] — see [`SessionRegistry::bind`]; in
    ///   particular `AlreadyConnected` when the character is being played
    ///   elsewhere
    pub fn login(
        &mut self,
        session: SessionId,
        record: &CharacterRecord,
    ) -> Result<(), RealmError> {
        let job = self.templates.job(&record.job)?;
        let location = record
            .last_location
            .clone()
            .filter(|loc| self.world.contains(loc))
            .unwrap_or_else(|| {
                self.registry.config().default_location.clone()
            });
        if !self.world.contains(&location) {
            return Err(WorldError::UnknownLocation(location).into());
        }

        let character = record.to_actor(job);
        let name = character.name.clone();
        self.registry.bind(session, character, location.clone())?;

        let location_name = self.location_name(&location);
        let view = self.room_view(session, &location);
        self.deliver(vec![
            Notification::to_session(
                session,
                GameEvent::LoggedIn {
                    name: name.clone(),
                    location: location_name,
                },
            ),
            Notification::to_session(session, GameEvent::Room(view)),
            Notification::event(
                Recipient::RoomExcept(location.clone(), session),
                GameEvent::Arrived { name, from: None },
            ),
        ]);
        tracing::info!(session_id = %session, %location, "player entered");
        Ok(())
    }

    /// Parses and runs one line of player input, then delivers the
    /// resulting notifications.
    ///
    /// A rejected command is reported to the player as a single
    /// `ServerMessage::Error` and also returned, so the caller can log it.
    /// On success, returns how many messages were delivered.
    pub fn submit(
        &mut self,
        session: SessionId,
        text: &str,
    ) -> Result<usize, CommandError> {
        let command = Command::parse(text);
        match self.dispatch(session, command) {
            Ok(notifications) => Ok(self.deliver(notifications)),
            Err(error) => {
                tracing::debug!(
                    session_id = %session,
                    %error,
                    code = error.code(),
                    "command rejected"
                );
                self.registry.send(
                    session,
                    ServerMessage::Error {
                        code: error.code(),
                        message: error.to_string(),
                    },
                );
                Err(error)
            }
        }
    }

    /// Removes a session for good (the connection is gone).
    ///
    /// Releases its occupancy, ends any fight it was in (the opponent goes
    /// back to idle), and tells the room the character vanished. Returns
    /// the character's record for the caller to persist; `None` if the
    /// session never logged in or was already gone, so calling this twice
    /// is harmless.
    pub fn disconnect(
        &mut self,
        session: SessionId,
    ) -> Option<CharacterRecord> {
        let closed = self.registry.close(session)?;
        let (mut character, location) = closed.into_character()?;

        if let Some(partner) = character
            .combatant
            .as_mut()
            .and_then(Combatant::disengage)
        {
            let me = ActorRef::Player(session);
            if let Some(c) = self.combatant_mut(partner) {
                c.disengage_from(me);
            }
        }

        self.deliver(vec![Notification::event(
            Recipient::Room(location.clone()),
            GameEvent::Vanished {
                name: character.name.clone(),
            },
        )]);
        tracing::info!(session_id = %session, %location, "player left");
        CharacterRecord::from_actor(&character, Some(location))
    }

    // -- Population --------------------------------------------------------

    /// Spawns a fresh monster from its template.
    pub fn spawn_monster(
        &mut self,
        template: &str,
        location: LocationId,
    ) -> Result<ActorId, RealmError> {
        let template = self.templates.monster(template)?;
        let monster = Actor::monster(template);
        self.spawn(monster, location)
    }

    /// Places any actor (an NPC, an item on the floor, ...) in the world.
    pub fn spawn(
        &mut self,
        actor: Actor,
        location: LocationId,
    ) -> Result<ActorId, RealmError> {
        if !self.world.contains(&location) {
            return Err(WorldError::UnknownLocation(location).into());
        }
        Ok(self.population.spawn(actor, location)?)
    }

    /// Names of everyone and everything at `location`: players first, then
    /// spawned actors.
    pub fn occupants(&self, location: &LocationId) -> Vec<String> {
        self.registry
            .sessions_at(location)
            .filter_map(|id| self.registry.character(id))
            .map(|c| c.name.clone())
            .chain(
                self.population
                    .actors_at(location)
                    .map(|(_, a)| a.name.clone()),
            )
            .collect()
    }

    /// Checks every registry invariant. Cheap enough for tests and health
    /// checks; not meant for the hot path.
    pub fn is_consistent(&self) -> bool {
        self.registry.is_consistent()
    }

    // -- Shared helpers ----------------------------------------------------

    pub(crate) fn deliver(&self, notifications: Vec<Notification>) -> usize {
        BroadcastRouter::deliver(&self.registry, notifications)
    }

    /// The display name of a location, falling back to its id.
    pub(crate) fn location_name(&self, location: &LocationId) -> String {
        self.world
            .location(location)
            .map_or_else(|| location.to_string(), |l| l.name.clone())
    }

    /// What `viewer` sees at `location`: everyone but themselves, and the
    /// exits in sorted order.
    pub(crate) fn room_view(
        &self,
        viewer: SessionId,
        location: &LocationId,
    ) -> RoomView {
        let (name, description) = match self.world.location(location) {
            Some(l) => (l.name.clone(), l.description.clone()),
            None => (location.to_string(), String::new()),
        };
        let occupants = self
            .registry
            .sessions_at(location)
            .filter(|id| *id != viewer)
            .filter_map(|id| self.registry.character(id))
            .map(|c| c.name.clone())
            .chain(
                self.population
                    .actors_at(location)
                    .map(|(_, a)| a.name.clone()),
            )
            .collect();
        let exits = self
            .world
            .exits_of(location)
            .map(|(dir, _)| dir.to_string())
            .collect();
        RoomView {
            name,
            description,
            occupants,
            exits,
        }
    }

    pub(crate) fn combatant(&self, who: ActorRef) -> Option<&Combatant> {
        match who {
            ActorRef::Player(id) => {
                self.registry.character(id)?.combatant.as_ref()
            }
            ActorRef::Spawned(id) => {
                self.population.get(id)?.combatant.as_ref()
            }
        }
    }

    pub(crate) fn combatant_mut(
        &mut self,
        who: ActorRef,
    ) -> Option<&mut Combatant> {
        combatant_in(&mut self.registry, &mut self.population, who)
    }

    pub(crate) fn display_name(&self, who: ActorRef) -> String {
        let actor = match who {
            ActorRef::Player(id) => self.registry.character(id),
            ActorRef::Spawned(id) => self.population.get(id),
        };
        actor.map_or_else(|| who.to_string(), |a| a.name.clone())
    }
}

/// Finds a combatant given disjoint borrows of its two possible owners,
/// so the caller can keep using the rest of the realm (e.g. the roll).
pub(crate) fn combatant_in<'a>(
    registry: &'a mut SessionRegistry,
    population: &'a mut Population,
    who: ActorRef,
) -> Option<&'a mut Combatant> {
    match who {
        ActorRef::Player(id) => registry.character_mut(id)?.combatant.as_mut(),
        ActorRef::Spawned(id) => population.get_mut(id)?.combatant.as_mut(),
    }
}
