//! `HearthServer` builder and server loop.
//!
//! This is the entry point for running a Hearth server. It ties together
//! all the layers: transport → protocol → realm.

use std::sync::Arc;
use std::time::Duration;

use hearth_combat::{SeededRoll, TemplateTable};
use hearth_protocol::{Codec, JsonCodec};
use hearth_realm::{
    ContentFilter, Realm, RealmHandle, WordListFilter, spawn_realm,
};
use hearth_session::{Authenticator, CharacterStore};
use hearth_transport::{Transport, WebSocketTransport};
use hearth_world::WorldMap;
use serde::Deserialize;

use crate::HearthError;
use crate::handler::handle_connection;

/// The clans a new character may join unless configured otherwise.
pub const DEFAULT_CLANS: [&str; 4] =
    ["Yellow Dog", "Red Bird", "Green Frog", "Blue Flower"];

/// Longest accepted character name, in characters.
pub const MAX_NAME_LEN: usize = 24;

/// Server settings.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on. Port 0 picks a free one.
    pub bind_addr: String,
    /// Sent to every connection as soon as it opens.
    pub welcome: String,
    /// Clans a new character may choose from (exact match).
    pub clans: Vec<String>,
    /// Job given to newly registered characters.
    pub default_job: String,
    /// A connection that sends nothing for this long is dropped.
    pub idle_timeout_secs: u64,
    /// Capacity of the realm's request queue.
    pub realm_channel_size: usize,
    /// Seeds combat rolls for reproducible runs; OS entropy if unset.
    pub combat_seed: Option<u64>,
    /// Words refused in character names and speech.
    pub blocked_words: Vec<String>,
}

impl ServerConfig {
    /// The idle timeout, never shorter than one second.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            welcome: "Welcome to the MUD! Please register or log in."
                .to_string(),
            clans: DEFAULT_CLANS.iter().map(|c| c.to_string()).collect(),
            default_job: "warrior".to_string(),
            idle_timeout_secs: 600,
            realm_channel_size: 256,
            combat_seed: None,
            blocked_words: Vec::new(),
        }
    }
}

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. Nothing in
/// here needs a lock: the realm serializes its own requests, and the
/// store handles its own synchronization.
pub(crate) struct ServerState<A: Authenticator, S: CharacterStore, C: Codec> {
    pub(crate) realm: RealmHandle,
    pub(crate) auth: A,
    pub(crate) store: S,
    pub(crate) codec: C,
    pub(crate) filter: Arc<dyn ContentFilter>,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Hearth server.
///
/// # Example
///
/// ```rust,ignore
/// use hearth::prelude::*;
///
/// let server = HearthServerBuilder::new()
///     .bind("0.0.0.0:3000")
///     .blocked_words(["darn"])
///     .build(world, templates, DevAuthenticator, MemoryCharacterStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct HearthServerBuilder {
    config: ServerConfig,
}

impl HearthServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces every setting at once, e.g. with a config loaded from disk.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the greeting sent when a connection opens.
    pub fn welcome(mut self, text: impl Into<String>) -> Self {
        self.config.welcome = text.into();
        self
    }

    /// Sets the clans new characters may choose from.
    pub fn clans<I, S>(mut self, clans: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.clans = clans.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the job given to newly registered characters.
    pub fn default_job(mut self, job: impl Into<String>) -> Self {
        self.config.default_job = job.into();
        self
    }

    /// Sets how long a silent connection is kept open.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Seeds combat rolls so a run can be replayed.
    pub fn combat_seed(mut self, seed: u64) -> Self {
        self.config.combat_seed = Some(seed);
        self
    }

    /// Sets the words refused in names and speech.
    pub fn blocked_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.blocked_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Starts the realm, binds the listener, and returns the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    ///
    /// # Errors
    /// - [`HearthError::Combat`] if the default job has no template
    /// - [`HearthError::Transport`] if the address can't be bound
    pub async fn build<A, S>(
        self,
        world: Arc<WorldMap>,
        templates: Arc<TemplateTable>,
        auth: A,
        store: S,
    ) -> Result<HearthServer<A, S, JsonCodec>, HearthError>
    where
        A: Authenticator,
        S: CharacterStore,
    {
        let config = self.config;
        templates.job(&config.default_job)?;

        let filter: Arc<dyn ContentFilter> =
            Arc::new(WordListFilter::new(&config.blocked_words));
        let mut realm =
            Realm::new(world, templates).with_filter(Arc::clone(&filter));
        if let Some(seed) = config.combat_seed {
            realm = realm.with_roll(SeededRoll::from_seed(seed));
        }
        let realm = spawn_realm(realm, config.realm_channel_size.max(1));

        let transport = WebSocketTransport::bind(&config.bind_addr).await?;

        let state = Arc::new(ServerState {
            realm,
            auth,
            store,
            codec: JsonCodec,
            filter,
            config,
        });
        Ok(HearthServer { transport, state })
    }
}

impl Default for HearthServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Hearth server.
///
/// Populate the world through [`realm()`](Self::realm), then call
/// [`run()`](Self::run) to start accepting connections.
pub struct HearthServer<A: Authenticator, S: CharacterStore, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, S, C>>,
}

impl<A, S, C> HearthServer<A, S, C>
where
    A: Authenticator,
    S: CharacterStore,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the running realm, for spawning monsters and NPCs.
    pub fn realm(&self) -> &RealmHandle {
        &self.state.realm
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), HearthError> {
        tracing::info!(
            addr = %self.state.config.bind_addr,
            "Hearth server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_timeout_zero_clamps_to_one_second() {
        let config = ServerConfig {
            idle_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.idle_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_idle_timeout_keeps_configured_value() {
        let config = ServerConfig::default();
        assert_eq!(config.idle_timeout(), Duration::from_secs(600));
    }
}
