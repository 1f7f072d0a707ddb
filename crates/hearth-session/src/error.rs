//! Error types for the session layer.

use hearth_protocol::{CharacterId, SessionId};
use hearth_world::WorldError;

/// Errors that can occur while managing sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Authentication failed: the token was rejected by the
    /// [`Authenticator`](crate::Authenticator).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The token was empty or structurally unusable.
    #[error("invalid identity token")]
    InvalidToken,

    /// No session with this id is open.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// A session with this id is already open.
    #[error("session {0} is already open")]
    AlreadyOpen(SessionId),

    /// The character is already being played from another connection.
    /// A character can only be bound to one session at a time.
    #[error("character {0} is already connected")]
    AlreadyConnected(CharacterId),

    /// The session is already playing a character.
    #[error("session {0} is already authenticated")]
    AlreadyAuthenticated(SessionId),

    /// The session has not logged in yet.
    #[error("session {0} is not authenticated")]
    NotAuthenticated(SessionId),

    /// `CompleteRegistration` arrived without an `InitiateRegistration`.
    #[error("session {0} has no registration in progress")]
    NotRegistering(SessionId),

    /// Only player characters can be bound to a session.
    #[error("{0} is not a player character")]
    NotACharacter(String),

    /// The store has no record for this identity.
    #[error("no character record for {0}")]
    RecordNotFound(CharacterId),

    /// Occupancy bookkeeping refused the change.
    #[error(transparent)]
    Invariant(#[from] WorldError),
}
