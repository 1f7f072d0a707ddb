//! Game events: the things players see happen.
//!
//! Every event is structured (so a rich client can render it however it
//! likes) and also implements `Display`, producing the plain text line a
//! terminal-style client prints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a player sees when they look around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    /// The location's display name, e.g. "Town Square".
    pub name: String,
    /// The location's descriptive text.
    pub description: String,
    /// Display names of everyone and everything else here.
    pub occupants: Vec<String>,
    /// Exit directions, sorted.
    pub exits: Vec<String>,
}

/// Something that happened in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GameEvent {
    /// Sent to a player right after login or registration.
    LoggedIn { name: String, location: String },

    /// The result of `look`, and what a mover sees on arrival.
    Room(RoomView),

    /// Someone spoke in the room.
    Said { speaker: String, text: String },

    /// The result of `who` when other players are present.
    Occupants { names: Vec<String> },

    /// The result of `who` when nobody else is here.
    Alone,

    /// Seen by the mover before the new room's view.
    Moved { direction: String, destination: String },

    /// Seen by the room a player just left.
    Departed { name: String, direction: String },

    /// Seen by the room a player just entered. `from` is `None` when the
    /// traversed direction has no opposite (a portal, a "climb", …).
    Arrived { name: String, from: Option<String> },

    /// A player's connection dropped.
    Vanished { name: String },

    /// An attack landed.
    AttackHit {
        attacker: String,
        target: String,
        damage: u32,
        remaining_hp: u32,
    },

    /// An attack missed.
    AttackMissed { attacker: String, target: String },

    /// A combatant dropped to zero hit points.
    Defeated { name: String, by: String },

    /// Experience awarded for a defeated monster.
    ExperienceGained { amount: u32, total: u32 },

    /// The player reached a new level.
    LevelUp { level: u32 },

    /// The result of `inventory`.
    Inventory { items: Vec<String> },

    /// An NPC said one of its lines to the player.
    Dialogue { speaker: String, line: String },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedIn { name, location } => write!(
                f,
                "Welcome back, {name}! You are now in the {location}."
            ),
            Self::Room(view) => {
                writeln!(f, "{}", view.name)?;
                write!(f, "{}", view.description)?;
                if !view.occupants.is_empty() {
                    write!(f, "\nAlso here: {}", view.occupants.join(", "))?;
                }
                write!(f, "\nExits: {}", view.exits.join(", "))
            }
            Self::Said { speaker, text } => write!(f, "{speaker} says: {text}"),
            Self::Occupants { names } => {
                write!(f, "Players here: {}", names.join(", "))
            }
            Self::Alone => write!(f, "You are alone here."),
            Self::Moved {
                direction,
                destination,
            } => write!(f, "You move {direction} to {destination}."),
            Self::Departed { name, direction } => {
                write!(f, "{name} leaves to the {direction}.")
            }
            Self::Arrived {
                name,
                from: Some(from),
            } => write!(f, "{name} arrives from the {from}."),
            Self::Arrived { name, from: None } => {
                write!(f, "{name} arrives from somewhere.")
            }
            Self::Vanished { name } => write!(f, "{name} fades from view."),
            Self::AttackHit {
                attacker,
                target,
                damage,
                ..
            } => write!(f, "{attacker} hits {target} for {damage} damage."),
            Self::AttackMissed { attacker, target } => {
                write!(f, "{attacker} misses {target}.")
            }
            Self::Defeated { name, by } => {
                write!(f, "{name} has been defeated by {by}!")
            }
            Self::ExperienceGained { amount, total } => {
                write!(f, "You gain {amount} experience ({total} total).")
            }
            Self::LevelUp { level } => write!(f, "You are now level {level}!"),
            Self::Inventory { items } if items.is_empty() => {
                write!(f, "You are empty-handed.")
            }
            Self::Inventory { items } => {
                write!(f, "You are carrying: {}", items.join(", "))
            }
            Self::Dialogue { speaker, line } => {
                write!(f, "{speaker} says: \"{line}\"")
            }
        }
    }
}
