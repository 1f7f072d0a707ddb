//! # Hearth
//!
//! The server for a small multiplayer text adventure.
//!
//! Hearth tracks which connected player is where, resolves combat, and
//! tells exactly the right players about everything that happens. This
//! crate wires the layers together: a WebSocket transport, the JSON wire
//! protocol, and the realm actor that owns the world.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hearth::prelude::*;
//!
//! # async fn start(world: WorldMap, templates: TemplateTable) -> Result<(), HearthError> {
//! let server = HearthServerBuilder::new()
//!     .bind("0.0.0.0:3000")
//!     .build(
//!         Arc::new(world),
//!         Arc::new(templates),
//!         DevAuthenticator,
//!         MemoryCharacterStore::new(),
//!     )
//!     .await?;
//! server.realm().spawn_monster("rat", "cellar".into()).await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::HearthError;
pub use server::{
    DEFAULT_CLANS, HearthServer, HearthServerBuilder, MAX_NAME_LEN,
    ServerConfig,
};

/// Everything needed to stand up a server.
pub mod prelude {
    pub use crate::{HearthError, HearthServer, HearthServerBuilder, ServerConfig};
    pub use hearth_combat::{MonsterTemplate, StatTemplate, Stats, TemplateTable};
    pub use hearth_protocol::{
        ClientMessage, GameEvent, LocationId, ServerMessage,
    };
    pub use hearth_realm::{ContentFilter, RealmHandle, WordListFilter};
    pub use hearth_session::{
        Authenticator, CharacterStore, DevAuthenticator, MemoryCharacterStore,
        SessionError,
    };
    pub use hearth_world::{Actor, CharacterRecord, Location, WorldMap};
}
