//! Actors: everything in the world that has a name.
//!
//! Players, shopkeepers, rats, and rusty swords are all the same record
//! with a different [`ActorKind`] tag. Whatever can fight carries a
//! [`Combatant`]; whatever can be carried is an `Item`.

use hearth_combat::{
    Combatant, MonsterTemplate, StatTemplate, Stats, derive_stats,
};
use hearth_protocol::CharacterId;

use crate::WorldError;

/// Experience needed per level: reaching `100 × level` advances one level.
pub const EXPERIENCE_PER_LEVEL: u32 = 100;

/// What sort of thing an actor is.
#[derive(Debug, Clone, PartialEq)]
pub enum ActorKind {
    /// A character controlled by a connected player.
    PlayerCharacter {
        identity: CharacterId,
        clan: String,
        /// Class template id, e.g. `"warrior"`.
        job: String,
        level: u32,
        /// Experience toward the next level.
        experience: u32,
    },
    /// A non-hostile character that talks when talked to.
    NonPlayerCharacter {
        dialogue: Vec<String>,
        /// Index of the line `talk` will say next.
        next_line: usize,
    },
    /// Something to fight.
    Monster {
        /// Monster template id.
        template: String,
        experience_award: u32,
    },
    /// Something to carry.
    Item { weight: u32 },
}

/// One thing in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub name: String,
    pub description: String,
    pub kind: ActorKind,
    /// Present only on actors that can fight.
    pub combatant: Option<Combatant>,
    /// Carried items, in pickup order. Only `Item` actors go in here.
    inventory: Vec<Actor>,
}

/// The result of [`Actor::gain_experience`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advancement {
    /// Experience toward the next level after the award.
    pub experience: u32,
    /// The new level, if at least one level was gained.
    pub new_level: Option<u32>,
}

impl Actor {
    /// A player character at `level`, with stats derived from its class.
    pub fn player(
        identity: CharacterId,
        name: impl Into<String>,
        clan: impl Into<String>,
        job: &StatTemplate,
        level: u32,
        experience: u32,
    ) -> Self {
        let level = level.max(1);
        Self {
            name: name.into(),
            description: String::new(),
            kind: ActorKind::PlayerCharacter {
                identity,
                clan: clan.into(),
                job: job.id.clone(),
                level,
                experience,
            },
            combatant: Some(Combatant::new(derive_stats(job, level))),
            inventory: Vec::new(),
        }
    }

    /// A fresh monster at full health.
    pub fn monster(template: &MonsterTemplate) -> Self {
        Self {
            name: template.name.clone(),
            description: template.description.clone(),
            kind: ActorKind::Monster {
                template: template.id.clone(),
                experience_award: template.experience_award,
            },
            combatant: Some(Combatant::new(template.stats())),
            inventory: Vec::new(),
        }
    }

    /// A talking, non-fighting character.
    pub fn npc(
        name: impl Into<String>,
        description: impl Into<String>,
        dialogue: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: ActorKind::NonPlayerCharacter {
                dialogue,
                next_line: 0,
            },
            combatant: None,
            inventory: Vec::new(),
        }
    }

    /// A carryable item.
    pub fn item(
        name: impl Into<String>,
        description: impl Into<String>,
        weight: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: ActorKind::Item { weight },
            combatant: None,
            inventory: Vec::new(),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, ActorKind::PlayerCharacter { .. })
    }

    pub fn is_monster(&self) -> bool {
        matches!(self.kind, ActorKind::Monster { .. })
    }

    pub fn is_npc(&self) -> bool {
        matches!(self.kind, ActorKind::NonPlayerCharacter { .. })
    }

    pub fn is_item(&self) -> bool {
        matches!(self.kind, ActorKind::Item { .. })
    }

    /// The persisted identity, for player characters.
    pub fn identity(&self) -> Option<&CharacterId> {
        match &self.kind {
            ActorKind::PlayerCharacter { identity, .. } => Some(identity),
            _ => None,
        }
    }

    /// The player's level. Everything else is level 1.
    pub fn level(&self) -> u32 {
        match &self.kind {
            ActorKind::PlayerCharacter { level, .. } => *level,
            _ => 1,
        }
    }

    /// `true` for actors whose combatant is at zero hit points.
    pub fn is_defeated(&self) -> bool {
        self.combatant.as_ref().is_some_and(Combatant::is_defeated)
    }

    /// Carried items, in pickup order.
    pub fn inventory(&self) -> &[Actor] {
        &self.inventory
    }

    /// Adds an item to the inventory.
    ///
    /// # Errors
    /// Returns [`WorldError::NotAnItem`] for anything that isn't an `Item`.
    pub fn add_item(&mut self, item: Actor) -> Result<(), WorldError> {
        if !item.is_item() {
            return Err(WorldError::NotAnItem(item.name));
        }
        self.inventory.push(item);
        Ok(())
    }

    /// Returns the NPC's next dialogue line and advances round-robin.
    ///
    /// `None` for non-NPCs and for NPCs with nothing to say.
    pub fn next_line(&mut self) -> Option<String> {
        let ActorKind::NonPlayerCharacter {
            dialogue,
            next_line,
        } = &mut self.kind
        else {
            return None;
        };
        let line = dialogue.get(*next_line % dialogue.len().max(1))?.clone();
        *next_line = (*next_line + 1) % dialogue.len();
        Some(line)
    }

    /// Awards experience to a player character, advancing levels as the
    /// thresholds are crossed.
    ///
    /// Each level costs `100 × level`; leftover experience carries over.
    /// On a level change the combatant is rescaled from `job`. Returns
    /// `None` for non-players.
    pub fn gain_experience(
        &mut self,
        amount: u32,
        job: &StatTemplate,
    ) -> Option<Advancement> {
        let ActorKind::PlayerCharacter {
            level, experience, ..
        } = &mut self.kind
        else {
            return None;
        };

        let start_level = *level;
        *experience = experience.saturating_add(amount);
        // Levels come from stored records, so the cost saturates instead of
        // overflowing and the level stops at the top of the range.
        loop {
            let cost = EXPERIENCE_PER_LEVEL.saturating_mul(*level);
            if *experience < cost || *level == u32::MAX {
                break;
            }
            *experience -= cost;
            *level += 1;
        }

        let advancement = Advancement {
            experience: *experience,
            new_level: (*level > start_level).then_some(*level),
        };
        if let Some(new_level) = advancement.new_level {
            let stats: Stats = derive_stats(job, new_level);
            if let Some(combatant) = self.combatant.as_mut() {
                combatant.rescale(stats);
            }
        }
        Some(advancement)
    }
}

/// Picks a name out of `candidates` the way players type them.
///
/// A case-insensitive exact match wins; then the first candidate whose
/// name starts with `query`; then the first with any word starting with
/// `query`, so "rat" finds "a giant rat". An empty query matches nothing.
///
/// ```rust
/// use hearth_world::find_by_name;
///
/// let here = [(1, "Ayla"), (2, "a giant rat"), (3, "Aylin")];
/// assert_eq!(find_by_name(here, "ayla"), Some(1));
/// assert_eq!(find_by_name(here, "a giant"), Some(2));
/// assert_eq!(find_by_name(here, "rat"), Some(2));
/// assert_eq!(find_by_name(here, "bob"), None);
/// ```
pub fn find_by_name<'a, T>(
    candidates: impl IntoIterator<Item = (T, &'a str)>,
    query: &str,
) -> Option<T> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    let mut prefix = None;
    let mut word = None;
    for (value, name) in candidates {
        let name = name.to_lowercase();
        if name == query {
            return Some(value);
        }
        if prefix.is_some() {
            continue;
        }
        if name.starts_with(&query) {
            prefix = Some(value);
        } else if word.is_none()
            && name.split_whitespace().any(|w| w.starts_with(&query))
        {
            word = Some(value);
        }
    }
    prefix.or(word)
}
