//! Identifiers, routing, and the messages that travel on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GameEvent;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies one live connection for as long as it stays open.
///
/// This is a "newtype wrapper" around the transport's connection counter.
/// Wrapping the `u64` means a `SessionId` can never be confused with an
/// [`ActorId`] even though both are integers underneath.
///
/// `#[serde(transparent)]` serializes it as the bare number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Identifies a non-player actor (monster, NPC, item on the floor) that
/// the realm spawned. Never reused while the process runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

/// The persisted identity of a player character.
///
/// Issued by the identity provider (a user id from the auth token), so it
/// is an opaque string rather than a number we control.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CharacterId(pub String);

impl CharacterId {
    /// Creates an identity from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a location in the world map, e.g. `"town-square"`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl LocationId {
    /// Creates a location id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LocationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to anything that can take part in combat.
///
/// Players are addressed through their live session; everything else the
/// realm spawned is addressed by its [`ActorId`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub enum ActorRef {
    /// A player character bound to a live session.
    Player(SessionId),
    /// A monster or NPC spawned into the world.
    Spawned(ActorId),
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(id) => write!(f, "{id}"),
            Self::Spawned(id) => write!(f, "{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive a notification?
// ---------------------------------------------------------------------------

/// Specifies who should receive a notification.
///
/// The command dispatcher never sends anything itself. It returns
/// `(Recipient, message)` pairs and the broadcast router resolves each
/// recipient against the live occupancy at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Only the given session (usually the one that issued the command).
    Session(SessionId),

    /// Every session currently in the location, the issuer included.
    Room(LocationId),

    /// Every session in the location except one. Used for
    /// "X arrives from the south." so the mover doesn't see it.
    RoomExcept(LocationId, SessionId),

    /// Every authenticated session in the world.
    Everyone,
}

// ---------------------------------------------------------------------------
// ClientMessage — client → server
// ---------------------------------------------------------------------------

/// Everything a client can send.
///
/// `#[serde(tag = "type")]` produces `{ "type": "Login", "id_token": "…" }`,
/// which is the shape the browser client builds by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Step 1 of registration: pick a character name and clan.
    /// The server validates both before the client creates the account.
    InitiateRegistration {
        character_name: String,
        clan: String,
    },

    /// Step 2 of registration: the account exists, here is its token.
    CompleteRegistration { id_token: String },

    /// Log an existing character in.
    Login { id_token: String },

    /// A raw text command, e.g. `"go north"` or `"say hello"`.
    Command { text: String },

    /// The client is leaving.
    Quit,
}

// ---------------------------------------------------------------------------
// ServerMessage — server → client
// ---------------------------------------------------------------------------

/// Everything the server can send.
///
/// Adjacently tagged (`{ "type": "Event", "data": { "kind": … } }`) because
/// [`GameEvent`] carries its own `kind` tag and the two must not collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// Greeting sent as soon as the connection opens.
    Welcome { text: String },

    /// Name and clan were accepted; the client should create the account.
    CreateUser,

    /// The character record was written.
    RegistrationComplete,

    /// Name, clan, or token was rejected during registration.
    RegistrationError { message: String },

    /// Login was rejected (bad token, no record, already connected).
    LoginFailed { message: String },

    /// Something happened in the world.
    Event(GameEvent),

    /// A command was rejected. Only ever sent to the issuing session.
    ///
    /// `code` borrows HTTP's vocabulary: 400 bad input, 401 not logged in,
    /// 404 no such thing, 409 conflicting state.
    Error { code: u16, message: String },
}

impl ServerMessage {
    /// Wraps a [`GameEvent`].
    pub fn event(event: GameEvent) -> Self {
        Self::Event(event)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display_has_prefix() {
        assert_eq!(SessionId(7).to_string(), "S-7");
        assert_eq!(ActorId(3).to_string(), "A-3");
    }

    #[test]
    fn test_location_id_serializes_as_bare_string() {
        let json = serde_json::to_string(&LocationId::from("tavern"))
            .expect("should serialize");
        assert_eq!(json, "\"tavern\"");
    }

    #[test]
    fn test_actor_ref_orders_players_before_spawned() {
        // Ordering matters: occupant lists are built from ordered sets,
        // and we want deterministic output in tests and on the wire.
        let mut refs = vec![
            ActorRef::Spawned(ActorId(1)),
            ActorRef::Player(SessionId(9)),
        ];
        refs.sort();
        assert_eq!(refs[0], ActorRef::Player(SessionId(9)));
    }

    #[test]
    fn test_client_message_login_shape() {
        let msg = ClientMessage::Login {
            id_token: "abc".into(),
        };
        let value = serde_json::to_value(&msg).expect("should serialize");
        assert_eq!(value["type"], "Login");
        assert_eq!(value["id_token"], "abc");
    }

    #[test]
    fn test_server_message_unit_variant_has_no_data() {
        let value = serde_json::to_value(ServerMessage::CreateUser)
            .expect("should serialize");
        assert_eq!(value["type"], "CreateUser");
        assert!(value.get("data").is_none());
    }
}
