//! The live realm for Hearth.
//!
//! The realm is where player commands turn into state changes: it owns
//! the session registry, the spawned population, the world map, and the
//! combat roll, and it runs as a single Tokio task (actor model) so every
//! command sees and leaves a consistent world.
//!
//! # Key types
//!
//! - [`Command`] — a parsed player action
//! - [`Realm`] — the state, plus the command dispatcher
//! - [`BroadcastRouter`] / [`Notification`] — fan-out to the right sessions
//! - [`RealmHandle`] — send requests to the running realm actor
//! - [`ContentFilter`] — the hook that vets names and speech

mod actor;
mod command;
mod dispatch;
mod error;
mod filter;
mod router;
mod state;

pub use actor::{RealmHandle, spawn_realm};
pub use command::Command;
pub use error::{CommandError, ErrorClass, RealmError};
pub use filter::{ContentFilter, WordListFilter};
pub use router::{BroadcastRouter, Notification};
pub use state::Realm;
