//! Session types: the server's record of one live connection.
//!
//! A session tracks:
//! - WHO is connected (a [`SessionId`] derived from the connection)
//! - WHAT stage of the login flow they're in ([`SessionPhase`])
//! - HOW to reach them (the [`Outbound`] channel drained by the
//!   connection's writer task)
//!
//! The character and its location live *inside* the `Authenticated`
//! phase, so an unauthenticated session simply has no location to get
//! out of sync.

use hearth_protocol::{LocationId, ServerMessage, SessionId};
use hearth_world::Actor;
use tokio::sync::mpsc;

/// Where messages for one session are queued.
///
/// Unbounded so that fan-out from the realm never waits on a slow client.
/// The connection's writer task is the only receiver.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session registry.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where a character appears when its record has no last location,
    /// or names one that no longer exists.
    pub default_location: LocationId,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_location: LocationId::from("town-square"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// The name and clan chosen in `InitiateRegistration`, held until the
/// client proves its identity in `CompleteRegistration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub name: String,
    pub clan: String,
}

/// Where a session is in the login flow.
///
/// ```text
///   Unauthenticated ──(InitiateRegistration)──→ Registering
///         │   ↑                                     │
///         │   └──────(validation failed)────────────┤
///         │                                         │
///      (Login)                           (CompleteRegistration)
///         │                                         │
///         ▼                                         ▼
///   Authenticated { character, location } ←─────────┘
/// ```
#[derive(Debug, Clone)]
pub enum SessionPhase {
    /// Connected, not yet logged in.
    Unauthenticated,

    /// Name and clan accepted, waiting for the identity token.
    Registering(PendingRegistration),

    /// Playing a character.
    ///
    /// Boxed because an `Actor` is much larger than the other phases.
    Authenticated {
        character: Box<Actor>,
        location: LocationId,
    },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One live connection.
#[derive(Debug)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) phase: SessionPhase,
    pub(crate) outbound: Outbound,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, SessionPhase::Authenticated { .. })
    }

    /// The bound character, once authenticated.
    pub fn character(&self) -> Option<&Actor> {
        match &self.phase {
            SessionPhase::Authenticated { character, .. } => Some(&**character),
            _ => None,
        }
    }

    /// The character's location, once authenticated.
    pub fn location(&self) -> Option<&LocationId> {
        match &self.phase {
            SessionPhase::Authenticated { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Queues a message for this session.
    ///
    /// Returns `false` if the connection's writer is gone. That is not an
    /// error: the disconnect path will clean the session up shortly.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbound.send(message).is_ok()
    }

    /// Consumes the session, handing back the character and where it was.
    pub fn into_character(self) -> Option<(Actor, LocationId)> {
        match self.phase {
            SessionPhase::Authenticated {
                character,
                location,
            } => Some((*character, location)),
            _ => None,
        }
    }
}
