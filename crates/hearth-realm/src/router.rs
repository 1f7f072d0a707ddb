//! Broadcast routing: turning "who should hear this" into channel sends.

use hearth_protocol::{GameEvent, Recipient, ServerMessage, SessionId};
use hearth_session::SessionRegistry;

/// One outbound message and who it is for.
///
/// The dispatcher produces these; it never sends anything itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: Recipient,
    pub message: ServerMessage,
}

impl Notification {
    pub fn new(recipient: Recipient, message: ServerMessage) -> Self {
        Self { recipient, message }
    }

    /// A game event for `recipient`.
    pub fn event(recipient: Recipient, event: GameEvent) -> Self {
        Self::new(recipient, ServerMessage::Event(event))
    }

    /// A game event for one session.
    pub fn to_session(id: SessionId, event: GameEvent) -> Self {
        Self::event(Recipient::Session(id), event)
    }
}

/// Resolves recipients against the registry and sends.
///
/// Delivery is at-most-once: a session whose channel has closed is
/// skipped silently. Its disconnect is already on the way.
pub struct BroadcastRouter;

impl BroadcastRouter {
    /// Delivers `notifications` in order and returns how many individual
    /// sends succeeded.
    ///
    /// Room recipients are resolved against the registry *as it is now*,
    /// so this must run right after the dispatch that produced them,
    /// before anything else mutates the registry.
    pub fn deliver(
        registry: &SessionRegistry,
        notifications: impl IntoIterator<Item = Notification>,
    ) -> usize {
        let mut delivered = 0;
        for Notification { recipient, message } in notifications {
            delivered += match recipient {
                Recipient::Session(id) => {
                    usize::from(registry.send(id, message))
                }
                Recipient::Room(location) => fan_out(
                    registry,
                    registry.sessions_at(&location),
                    &message,
                ),
                Recipient::RoomExcept(location, excluded) => fan_out(
                    registry,
                    registry
                        .sessions_at(&location)
                        .filter(|id| *id != excluded),
                    &message,
                ),
                Recipient::Everyone => fan_out(
                    registry,
                    registry.authenticated().map(|s| s.id()),
                    &message,
                ),
            };
        }
        tracing::trace!(delivered, "notifications delivered");
        delivered
    }
}

fn fan_out(
    registry: &SessionRegistry,
    targets: impl Iterator<Item = SessionId>,
    message: &ServerMessage,
) -> usize {
    targets
        .filter(|id| registry.send(*id, message.clone()))
        .count()
}
