//! Unified error type for the Hearth server.

use hearth_combat::CombatError;
use hearth_protocol::ProtocolError;
use hearth_realm::RealmError;
use hearth_session::SessionError;
use hearth_transport::TransportError;
use hearth_world::WorldError;

/// Top-level error that wraps every crate-specific error.
///
/// Building and running a server only ever surfaces this one type. Each
/// variant has a `#[from]` conversion, so `?` lifts sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum HearthError {
    /// Binding, accepting, sending, or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Authentication, the character store, or the session registry
    /// refused something.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The realm refused something or has stopped.
    #[error(transparent)]
    Realm(#[from] RealmError),

    /// Template data is missing or malformed.
    #[error(transparent)]
    Combat(#[from] CombatError),

    /// The world map is missing or malformed.
    #[error(transparent)]
    World(#[from] WorldError),
}
