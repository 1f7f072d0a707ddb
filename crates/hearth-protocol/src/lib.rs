//! Wire protocol for Hearth.
//!
//! This crate defines the "language" spoken between a player's client and
//! the server, and the identifiers every other layer shares:
//!
//! - **Identifiers** ([`SessionId`], [`CharacterId`], [`LocationId`],
//!   [`ActorId`], [`ActorRef`]) — newtypes so a location can never be
//!   passed where a character is expected.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`], [`GameEvent`]) —
//!   what travels on the wire.
//! - **Routing** ([`Recipient`]) — who a notification is meant for.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become bytes.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Realm (commands, events)
//! ```
//!
//! The protocol layer knows nothing about rooms, combat, or connections.

mod codec;
mod error;
mod event;
mod types;

pub use codec::{Codec, MAX_FRAME_LEN};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{GameEvent, RoomView};
pub use types::{
    ActorId, ActorRef, CharacterId, ClientMessage, LocationId, Recipient,
    ServerMessage, SessionId,
};
