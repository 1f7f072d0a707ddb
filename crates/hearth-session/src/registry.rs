//! The session registry: every live connection and what it is playing.
//!
//! The registry owns two things that must never disagree:
//!
//! - the session map, where an `Authenticated` session carries its
//!   character's location, and
//! - an [`OccupancyTracker`] keyed by session, answering "which sessions
//!   are in this location?" for room broadcasts.
//!
//! Every mutating method updates both or neither.
//!
//! # Concurrency note
//!
//! Like the tracker inside it, the registry is a plain single-owner
//! structure. The realm actor owns it and serializes every access, so
//! there's no locking here.

use std::collections::HashMap;

use hearth_protocol::{LocationId, ServerMessage, SessionId};
use hearth_world::{Actor, OccupancyTracker, find_by_name};

use crate::{
    Outbound, PendingRegistration, Session, SessionConfig, SessionError,
    SessionPhase,
};

/// Registry of live sessions and their bindings.
///
/// ## Lifecycle
///
/// ```text
/// open() ──→ begin_registration() ──→ take_pending() ─┐
///   │                                                 │
///   └──────────────────────→ bind() ←─────────────────┘
///                              │
///                  relocate() ─┤
///                              ▼
///                   unbind() / close()
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Every open session, authenticated or not.
    sessions: HashMap<SessionId, Session>,

    /// Where each authenticated session stands. Mirrors the `location`
    /// inside each `SessionPhase::Authenticated`.
    occupancy: OccupancyTracker<SessionId>,

    config: SessionConfig,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            occupancy: OccupancyTracker::new(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Registers a new, unauthenticated session.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyOpen`] if the id is taken.
    pub fn open(
        &mut self,
        id: SessionId,
        outbound: Outbound,
    ) -> Result<(), SessionError> {
        if self.sessions.contains_key(&id) {
            return Err(SessionError::AlreadyOpen(id));
        }
        self.sessions.insert(
            id,
            Session {
                id,
                phase: SessionPhase::Unauthenticated,
                outbound,
            },
        );
        tracing::debug!(session_id = %id, "session opened");
        Ok(())
    }

    /// Remembers the name and clan a client asked to register with.
    ///
    /// Calling it again while registering replaces the pending data.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — no such session
    /// - [`SessionError::AlreadyAuthenticated`] — already playing
    pub fn begin_registration(
        &mut self,
        id: SessionId,
        pending: PendingRegistration,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        if session.is_authenticated() {
            return Err(SessionError::AlreadyAuthenticated(id));
        }
        session.phase = SessionPhase::Registering(pending);
        Ok(())
    }

    /// Takes the pending registration, returning the session to
    /// `Unauthenticated`.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — no such session
    /// - [`SessionError::NotRegistering`] — nothing pending
    pub fn take_pending(
        &mut self,
        id: SessionId,
    ) -> Result<PendingRegistration, SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        if !matches!(session.phase, SessionPhase::Registering(_)) {
            return Err(SessionError::NotRegistering(id));
        }
        match std::mem::replace(
            &mut session.phase,
            SessionPhase::Unauthenticated,
        ) {
            SessionPhase::Registering(pending) => Ok(pending),
            // Checked just above.
            _ => Err(SessionError::NotRegistering(id)),
        }
    }

    /// Binds a player character to a session and places it at `location`.
    ///
    /// All-or-nothing: on any error neither the session map nor the
    /// occupancy tracker is touched.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — no such session
    /// - [`SessionError::AlreadyAuthenticated`] — session already bound
    /// - [`SessionError::NotACharacter`] — `character` is not a player
    /// - [`SessionError::AlreadyConnected`] — another live session is
    ///   already playing this identity; that binding is left alone
    pub fn bind(
        &mut self,
        id: SessionId,
        character: Actor,
        location: LocationId,
    ) -> Result<(), SessionError> {
        let identity = character
            .identity()
            .cloned()
            .ok_or_else(|| SessionError::NotACharacter(character.name.clone()))?;

        match self.sessions.get(&id) {
            None => return Err(SessionError::NotFound(id)),
            Some(s) if s.is_authenticated() => {
                return Err(SessionError::AlreadyAuthenticated(id));
            }
            Some(_) => {}
        }

        let taken = self
            .sessions
            .values()
            .filter_map(Session::character)
            .any(|c| c.identity() == Some(&identity));
        if taken {
            return Err(SessionError::AlreadyConnected(identity));
        }

        self.occupancy.place(id, location.clone())?;
        if let Some(session) = self.sessions.get_mut(&id) {
            session.phase = SessionPhase::Authenticated {
                character: Box::new(character),
                location: location.clone(),
            };
        }

        tracing::info!(
            session_id = %id,
            %identity,
            %location,
            "character bound"
        );
        self.debug_check();
        Ok(())
    }

    /// Moves an authenticated session's character to `to`, updating the
    /// occupancy tracker and the session's location as one step.
    ///
    /// Returns the location it came from.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — no such session
    /// - [`SessionError::NotAuthenticated`] — nothing to move
    pub fn relocate(
        &mut self,
        id: SessionId,
        to: LocationId,
    ) -> Result<LocationId, SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        let SessionPhase::Authenticated { location, .. } = &mut session.phase
        else {
            return Err(SessionError::NotAuthenticated(id));
        };

        self.occupancy.relocate(&id, location, to.clone())?;
        let from = std::mem::replace(location, to);

        self.debug_check();
        Ok(from)
    }

    /// Logs the character out, keeping the session open.
    ///
    /// Returns the character and its last location; `None` if the session
    /// wasn't bound (or doesn't exist).
    pub fn unbind(&mut self, id: SessionId) -> Option<(Actor, LocationId)> {
        let session = self.sessions.get_mut(&id)?;
        if !session.is_authenticated() {
            return None;
        }
        let phase =
            std::mem::replace(&mut session.phase, SessionPhase::Unauthenticated);
        let SessionPhase::Authenticated {
            character,
            location,
        } = phase
        else {
            return None;
        };
        self.occupancy.remove(&id, &location);

        tracing::info!(session_id = %id, %location, "character unbound");
        self.debug_check();
        Some((*character, location))
    }

    /// Forgets a session entirely (disconnect).
    ///
    /// Occupancy is released; the returned session keeps its phase so the
    /// caller can persist the character with
    /// [`Session::into_character`]. Closing an unknown or already-closed
    /// session returns `None`.
    pub fn close(&mut self, id: SessionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        if let Some(location) = session.location() {
            self.occupancy.remove(&id, location);
        }
        tracing::debug!(session_id = %id, "session closed");
        self.debug_check();
        Some(session)
    }

    // -- Queries ------------------------------------------------------------

    /// Authenticated sessions at `location`, in id order.
    pub fn sessions_at(
        &self,
        location: &LocationId,
    ) -> impl Iterator<Item = SessionId> + '_ {
        self.occupancy.occupants_of(location).copied()
    }

    /// Looks up a session.
    pub fn session_of(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// The character bound to `id`, if any.
    pub fn character(&self, id: SessionId) -> Option<&Actor> {
        self.sessions.get(&id)?.character()
    }

    /// Mutable access to the bound character.
    ///
    /// Location is not reachable through this: moves go through
    /// [`relocate`](Self::relocate).
    pub fn character_mut(&mut self, id: SessionId) -> Option<&mut Actor> {
        match &mut self.sessions.get_mut(&id)?.phase {
            SessionPhase::Authenticated { character, .. } => {
                Some(&mut **character)
            }
            _ => None,
        }
    }

    /// Where `id`'s character stands.
    pub fn location_of(&self, id: SessionId) -> Option<&LocationId> {
        self.sessions.get(&id)?.location()
    }

    /// Resolves a typed name to a player at `location`.
    pub fn find_at(
        &self,
        location: &LocationId,
        name: &str,
    ) -> Option<SessionId> {
        find_by_name(
            self.sessions_at(location).filter_map(|id| {
                self.character(id).map(|c| (id, c.name.as_str()))
            }),
            name,
        )
    }

    /// Every authenticated session.
    pub fn authenticated(&self) -> impl Iterator<Item = &Session> + '_ {
        self.sessions.values().filter(|s| s.is_authenticated())
    }

    /// Queues a message for one session. `false` if it is gone.
    pub fn send(&self, id: SessionId, message: ServerMessage) -> bool {
        self.sessions
            .get(&id)
            .is_some_and(|session| session.send(message))
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Checks every registry invariant:
    ///
    /// - the occupancy indexes mirror each other,
    /// - each authenticated session is tracked at exactly its location,
    /// - nothing else is tracked,
    /// - no identity is bound twice.
    pub fn is_consistent(&self) -> bool {
        let mut identities = std::collections::HashSet::new();
        let mut bound = 0;
        for session in self.sessions.values() {
            let Some(location) = session.location() else {
                continue;
            };
            bound += 1;
            if self.occupancy.location_of(&session.id) != Some(location) {
                return false;
            }
            let identity = session.character().and_then(Actor::identity);
            if !identity.is_some_and(|i| identities.insert(i.clone())) {
                return false;
            }
        }
        self.occupancy.is_consistent() && self.occupancy.len() == bound
    }

    fn debug_check(&self) {
        debug_assert!(self.is_consistent(), "session registry out of sync");
    }
}
