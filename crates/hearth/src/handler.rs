//! Per-connection handler: registration, login, and command routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Open a session in the realm → send the welcome text
//!   2. Register a new character, or log an existing one in
//!   3. Loop: receive frames → forward commands to the realm
//!
//! Everything the player sees goes through one outbound channel that a
//! writer task drains onto the socket. The handler's own replies and the
//! notifications produced by other players therefore arrive in the order
//! they were queued.

use std::sync::Arc;

use hearth_protocol::{ClientMessage, Codec, ServerMessage, SessionId};
use hearth_realm::{ContentFilter, RealmError};
use hearth_session::{
    Authenticator, CharacterStore, Outbound, PendingRegistration,
    SessionError,
};
use hearth_transport::{Connection, WebSocketConnection};
use hearth_world::CharacterRecord;
use tokio::sync::mpsc;

use crate::HearthError;
use crate::server::{MAX_NAME_LEN, ServerConfig, ServerState};

/// Whether the read loop should keep going after a message.
enum Flow {
    Continue,
    Close,
}

/// Drop guard that takes a player out of the world when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task that disconnects the
/// session and saves the character it was playing.
struct SessionGuard<A: Authenticator, S: CharacterStore, C: Codec> {
    session: SessionId,
    state: Arc<ServerState<A, S, C>>,
}

impl<A: Authenticator, S: CharacterStore, C: Codec> Drop
    for SessionGuard<A, S, C>
{
    fn drop(&mut self) {
        let session = self.session;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let record = match state.realm.disconnect(session).await {
                Ok(Some(record)) => record,
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!(
                        session_id = %session,
                        error = %e,
                        "disconnect failed"
                    );
                    return;
                }
            };
            let identity = record.identity.clone();
            match state.store.save(record).await {
                Ok(()) => {
                    tracing::debug!(%identity, "character saved");
                }
                Err(e) => {
                    tracing::warn!(
                        %identity,
                        error = %e,
                        "saving character failed"
                    );
                }
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, S, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, S, C>>,
) -> Result<(), HearthError>
where
    A: Authenticator,
    S: CharacterStore,
    C: Codec,
{
    let conn = Arc::new(conn);
    let session = SessionId(conn.id().into_inner());
    tracing::debug!(
        session_id = %session,
        peer = %conn.peer_addr(),
        "handling new connection"
    );

    let (outbound, frames) = mpsc::unbounded_channel();
    tokio::spawn(write_frames(Arc::clone(&conn), Arc::clone(&state), frames));

    // Open the session and arm the guard together: if opening fails there
    // is nothing to clean up.
    state.realm.open(session, outbound.clone()).await?;
    let _guard = SessionGuard {
        session,
        state: Arc::clone(&state),
    };

    let _ = outbound.send(ServerMessage::Welcome {
        text: state.config.welcome.clone(),
    });

    loop {
        let data = match tokio::time::timeout(
            state.config.idle_timeout(),
            conn.recv(),
        )
        .await
        {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(session_id = %session, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(session_id = %session, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(session_id = %session, "connection timed out");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    session_id = %session, error = %e, "failed to decode message"
                );
                let _ = outbound.send(ServerMessage::Error {
                    code: 400,
                    message: format!("invalid message: {e}"),
                });
                continue;
            }
        };

        match handle_message(&state, session, &outbound, msg).await? {
            Flow::Continue => {}
            Flow::Close => break,
        }
    }

    // _guard drops here → disconnect and save fire. Once the realm lets go
    // of its sender too, the writer drains and closes the socket.
    Ok(())
}

/// Encodes queued messages onto the socket until every sender is gone,
/// then closes the connection.
async fn write_frames<A, S, C>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<A, S, C>>,
    mut frames: mpsc::UnboundedReceiver<ServerMessage>,
) where
    A: Authenticator,
    S: CharacterStore,
    C: Codec,
{
    while let Some(msg) = frames.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(id = %conn.id(), error = %e, "send failed");
            break;
        }
    }
    let _ = conn.close().await;
}

/// Handles one decoded client message.
async fn handle_message<A, S, C>(
    state: &ServerState<A, S, C>,
    session: SessionId,
    outbound: &Outbound,
    msg: ClientMessage,
) -> Result<Flow, HearthError>
where
    A: Authenticator,
    S: CharacterStore,
    C: Codec,
{
    match msg {
        ClientMessage::InitiateRegistration {
            character_name,
            clan,
        } => {
            let reply = match validate_registration(
                &state.config,
                state.filter.as_ref(),
                &character_name,
                &clan,
            ) {
                Err(message) => ServerMessage::RegistrationError { message },
                Ok(pending) => {
                    match state.realm.begin_registration(session, pending).await
                    {
                        Ok(()) => ServerMessage::CreateUser,
                        Err(RealmError::Session(
                            SessionError::AlreadyAuthenticated(_),
                        )) => ServerMessage::RegistrationError {
                            message: "You are already logged in.".into(),
                        },
                        Err(e) => return Err(e.into()),
                    }
                }
            };
            let _ = outbound.send(reply);
        }

        ClientMessage::CompleteRegistration { id_token } => {
            complete_registration(state, session, outbound, &id_token).await?;
        }

        ClientMessage::Login { id_token } => {
            login(state, session, outbound, &id_token).await?;
        }

        ClientMessage::Command { text } => {
            match state.realm.submit(session, text).await {
                // A rejected command was already reported to the player.
                Ok(_) | Err(RealmError::Command(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        ClientMessage::Quit => {
            tracing::info!(session_id = %session, "client quit");
            return Ok(Flow::Close);
        }
    }

    Ok(Flow::Continue)
}

/// Checks a proposed character name and clan.
///
/// Returns the trimmed name and clan ready to park in the session, or the
/// message to show the player.
fn validate_registration(
    config: &ServerConfig,
    filter: &dyn ContentFilter,
    name: &str,
    clan: &str,
) -> Result<PendingRegistration, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Character name cannot be empty".into());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!(
            "Character name must be at most {MAX_NAME_LEN} characters"
        ));
    }
    if filter.is_disallowed(name) {
        return Err("Character name contains inappropriate language".into());
    }
    if !config.clans.iter().any(|c| c == clan) {
        return Err("Invalid clan".into());
    }
    Ok(PendingRegistration {
        name: name.to_string(),
        clan: clan.to_string(),
    })
}

/// Second registration step: verify the token, write a fresh record, and
/// bring the new character into the world.
async fn complete_registration<A, S, C>(
    state: &ServerState<A, S, C>,
    session: SessionId,
    outbound: &Outbound,
    id_token: &str,
) -> Result<(), HearthError>
where
    A: Authenticator,
    S: CharacterStore,
    C: Codec,
{
    let failed = |reason: &dyn std::fmt::Display| {
        let _ = outbound.send(ServerMessage::RegistrationError {
            message: format!("Failed to complete registration: {reason}"),
        });
    };

    // Verify before taking the pending data so a bad token can be retried.
    let identity = match state.auth.verify(id_token).await {
        Ok(identity) => identity,
        Err(e) => {
            failed(&e);
            return Ok(());
        }
    };
    let pending = match state.realm.take_pending(session).await {
        Ok(pending) => pending,
        Err(RealmError::Session(SessionError::NotRegistering(_))) => {
            failed(&"Registration data not found");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let record = CharacterRecord::new(
        identity,
        pending.name,
        pending.clan,
        state.config.default_job.clone(),
    );
    if let Err(e) = state.store.save(record.clone()).await {
        failed(&e);
        return Ok(());
    }
    tracing::info!(
        session_id = %session,
        identity = %record.identity,
        "character registered"
    );
    let _ = outbound.send(ServerMessage::RegistrationComplete);

    enter_world(state, session, outbound, record).await
}

/// Verifies the token, loads the stored character, and logs it in.
async fn login<A, S, C>(
    state: &ServerState<A, S, C>,
    session: SessionId,
    outbound: &Outbound,
    id_token: &str,
) -> Result<(), HearthError>
where
    A: Authenticator,
    S: CharacterStore,
    C: Codec,
{
    let refuse = |message: String| {
        let _ = outbound.send(ServerMessage::LoginFailed { message });
    };

    let identity = match state.auth.verify(id_token).await {
        Ok(identity) => identity,
        Err(e) => {
            refuse(format!("Login failed: {e}"));
            return Ok(());
        }
    };
    let record = match state.store.load(&identity).await {
        Ok(record) => record,
        Err(SessionError::RecordNotFound(_)) => {
            refuse("Character not found.".into());
            return Ok(());
        }
        Err(e) => {
            refuse(format!("Login failed: {e}"));
            return Ok(());
        }
    };

    enter_world(state, session, outbound, record).await
}

/// Binds `record` to the session. Refusals become a `LoginFailed` frame;
/// only a stopped realm is an error for the connection.
async fn enter_world<A, S, C>(
    state: &ServerState<A, S, C>,
    session: SessionId,
    outbound: &Outbound,
    record: CharacterRecord,
) -> Result<(), HearthError>
where
    A: Authenticator,
    S: CharacterStore,
    C: Codec,
{
    let identity = record.identity.clone();
    let message = match state.realm.login(session, record).await {
        Ok(()) => {
            tracing::info!(session_id = %session, %identity, "player logged in");
            return Ok(());
        }
        Err(RealmError::Unavailable) => return Err(RealmError::Unavailable.into()),
        Err(RealmError::Session(SessionError::AlreadyConnected(_))) => {
            "You are already logged in from another session.".to_string()
        }
        Err(RealmError::Session(SessionError::AlreadyAuthenticated(_))) => {
            "You are already logged in.".to_string()
        }
        Err(e) => {
            tracing::warn!(%identity, error = %e, "login refused");
            format!("Login failed: {e}")
        }
    };
    let _ = outbound.send(ServerMessage::LoginFailed { message });
    Ok(())
}
