//! Session management for Hearth.
//!
//! This crate binds live connections to characters:
//!
//! 1. **Authentication** — turning a client token into a character
//!    identity ([`Authenticator`])
//! 2. **Storage** — loading and saving the persisted character
//!    ([`CharacterStore`])
//! 3. **Registry** — knowing which session plays which character, and
//!    where that character stands ([`SessionRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Realm (above)          ← dispatches commands against the registry
//!     ↕
//! Session (this crate)   ← sessions, bindings, session occupancy
//!     ↕
//! World / Protocol       ← Actor, OccupancyTracker, SessionId, messages
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod registry;
mod session;
mod store;

pub use auth::{Authenticator, DevAuthenticator};
pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{
    Outbound, PendingRegistration, Session, SessionConfig, SessionPhase,
};
pub use store::{CharacterStore, MemoryCharacterStore};
