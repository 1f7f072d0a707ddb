//! Realm actor: the single Tokio task that owns the [`Realm`].
//!
//! Every connection handler talks to the realm through a cloned
//! [`RealmHandle`]. Requests queue on one mpsc channel and the actor
//! applies them one at a time, so each command observes a world no other
//! command is halfway through changing. No locks, just message passing.

use hearth_protocol::{ActorId, LocationId, SessionId};
use hearth_session::{Outbound, PendingRegistration};
use hearth_world::{Actor, CharacterRecord};
use tokio::sync::{mpsc, oneshot};

use crate::{CommandError, Realm, RealmError};

/// Requests sent to the realm actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel: the caller
/// sends a request and waits for the answer on it.
enum RealmCommand {
    Open {
        session: SessionId,
        outbound: Outbound,
        reply: oneshot::Sender<Result<(), RealmError>>,
    },
    BeginRegistration {
        session: SessionId,
        pending: PendingRegistration,
        reply: oneshot::Sender<Result<(), RealmError>>,
    },
    TakePending {
        session: SessionId,
        reply: oneshot::Sender<Result<PendingRegistration, RealmError>>,
    },
    Login {
        session: SessionId,
        record: Box<CharacterRecord>,
        reply: oneshot::Sender<Result<(), RealmError>>,
    },
    Submit {
        session: SessionId,
        text: String,
        reply: oneshot::Sender<Result<usize, CommandError>>,
    },
    Disconnect {
        session: SessionId,
        reply: oneshot::Sender<Option<CharacterRecord>>,
    },
    SpawnMonster {
        template: String,
        location: LocationId,
        reply: oneshot::Sender<Result<ActorId, RealmError>>,
    },
    Spawn {
        actor: Box<Actor>,
        location: LocationId,
        reply: oneshot::Sender<Result<ActorId, RealmError>>,
    },
    Occupants {
        location: LocationId,
        reply: oneshot::Sender<Vec<String>>,
    },
    CheckConsistency {
        reply: oneshot::Sender<bool>,
    },
    Shutdown,
}

/// Handle to the running realm actor.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. Each connection
/// handler holds one. Every method fails with [`RealmError::Unavailable`]
/// once the actor has stopped.
#[derive(Clone)]
pub struct RealmHandle {
    sender: mpsc::Sender<RealmCommand>,
}

impl RealmHandle {
    /// Sends `command` built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RealmCommand,
    ) -> Result<T, RealmError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RealmError::Unavailable)?;
        reply_rx.await.map_err(|_| RealmError::Unavailable)
    }

    /// Registers a new connection. See [`Realm::open`].
    pub async fn open(
        &self,
        session: SessionId,
        outbound: Outbound,
    ) -> Result<(), RealmError> {
        self.request(|reply| RealmCommand::Open {
            session,
            outbound,
            reply,
        })
        .await?
    }

    /// See [`Realm::begin_registration`].
    pub async fn begin_registration(
        &self,
        session: SessionId,
        pending: PendingRegistration,
    ) -> Result<(), RealmError> {
        self.request(|reply| RealmCommand::BeginRegistration {
            session,
            pending,
            reply,
        })
        .await?
    }

    /// See [`Realm::take_pending`].
    pub async fn take_pending(
        &self,
        session: SessionId,
    ) -> Result<PendingRegistration, RealmError> {
        self.request(|reply| RealmCommand::TakePending { session, reply })
            .await?
    }

    /// Brings a stored character into the world. See [`Realm::login`].
    pub async fn login(
        &self,
        session: SessionId,
        record: CharacterRecord,
    ) -> Result<(), RealmError> {
        self.request(|reply| RealmCommand::Login {
            session,
            record: Box::new(record),
            reply,
        })
        .await?
    }

    /// Runs one line of player input. See [`Realm::submit`].
    ///
    /// The player has already been told about a rejection by the time
    /// this returns `Err(RealmError::Command(_))`.
    pub async fn submit(
        &self,
        session: SessionId,
        text: impl Into<String>,
    ) -> Result<usize, RealmError> {
        let text = text.into();
        Ok(self
            .request(|reply| RealmCommand::Submit {
                session,
                text,
                reply,
            })
            .await??)
    }

    /// Removes a session and returns the record to persist, if it was
    /// playing. See [`Realm::disconnect`].
    pub async fn disconnect(
        &self,
        session: SessionId,
    ) -> Result<Option<CharacterRecord>, RealmError> {
        self.request(|reply| RealmCommand::Disconnect { session, reply })
            .await
    }

    /// Spawns a monster from its template at `location`.
    pub async fn spawn_monster(
        &self,
        template: impl Into<String>,
        location: LocationId,
    ) -> Result<ActorId, RealmError> {
        let template = template.into();
        self.request(|reply| RealmCommand::SpawnMonster {
            template,
            location,
            reply,
        })
        .await?
    }

    /// Places an arbitrary actor (an NPC, an item) at `location`.
    pub async fn spawn(
        &self,
        actor: Actor,
        location: LocationId,
    ) -> Result<ActorId, RealmError> {
        self.request(|reply| RealmCommand::Spawn {
            actor: Box::new(actor),
            location,
            reply,
        })
        .await?
    }

    /// Names of everyone and everything at `location`.
    pub async fn occupants(
        &self,
        location: LocationId,
    ) -> Result<Vec<String>, RealmError> {
        self.request(|reply| RealmCommand::Occupants { location, reply })
            .await
    }

    /// Asks the actor to verify its registry invariants.
    pub async fn is_consistent(&self) -> Result<bool, RealmError> {
        self.request(|reply| RealmCommand::CheckConsistency { reply })
            .await
    }

    /// Tells the realm to stop. Queued requests ahead of this one are
    /// still served.
    pub async fn shutdown(&self) -> Result<(), RealmError> {
        self.sender
            .send(RealmCommand::Shutdown)
            .await
            .map_err(|_| RealmError::Unavailable)
    }
}

/// The actor half. Runs inside a Tokio task.
struct RealmActor {
    realm: Realm,
    receiver: mpsc::Receiver<RealmCommand>,
}

impl RealmActor {
    /// Serves requests until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!(
            locations = self.realm.world().len(),
            "realm actor started"
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RealmCommand::Open {
                    session,
                    outbound,
                    reply,
                } => {
                    let _ = reply.send(self.realm.open(session, outbound));
                }
                RealmCommand::BeginRegistration {
                    session,
                    pending,
                    reply,
                } => {
                    let result = self.realm.begin_registration(session, pending);
                    let _ = reply.send(result);
                }
                RealmCommand::TakePending { session, reply } => {
                    let _ = reply.send(self.realm.take_pending(session));
                }
                RealmCommand::Login {
                    session,
                    record,
                    reply,
                } => {
                    let _ = reply.send(self.realm.login(session, &record));
                }
                RealmCommand::Submit {
                    session,
                    text,
                    reply,
                } => {
                    let _ = reply.send(self.realm.submit(session, &text));
                }
                RealmCommand::Disconnect { session, reply } => {
                    let _ = reply.send(self.realm.disconnect(session));
                }
                RealmCommand::SpawnMonster {
                    template,
                    location,
                    reply,
                } => {
                    let result = self.realm.spawn_monster(&template, location);
                    let _ = reply.send(result);
                }
                RealmCommand::Spawn {
                    actor,
                    location,
                    reply,
                } => {
                    let _ = reply.send(self.realm.spawn(*actor, location));
                }
                RealmCommand::Occupants { location, reply } => {
                    let _ = reply.send(self.realm.occupants(&location));
                }
                RealmCommand::CheckConsistency { reply } => {
                    let _ = reply.send(self.realm.is_consistent());
                }
                RealmCommand::Shutdown => {
                    tracing::info!("realm shutting down");
                    break;
                }
            }
        }

        tracing::info!(
            sessions = self.realm.registry().len(),
            "realm actor stopped"
        );
    }
}

/// Spawns the realm actor and returns a handle to it.
///
/// `channel_size` bounds the request queue; callers wait when it's full.
/// A size of zero is treated as one.
pub fn spawn_realm(realm: Realm, channel_size: usize) -> RealmHandle {
    let (sender, receiver) = mpsc::channel(channel_size.max(1));
    let actor = RealmActor { realm, receiver };
    tokio::spawn(actor.run());
    RealmHandle { sender }
}
