//! The persisted projection of a player character.
//!
//! The live [`Actor`] carries things that only matter while playing
//! (current hit points, engagement). The record is what survives between
//! sessions: identity, progression, belongings, and where the character
//! last stood. Hit points are deliberately absent; a character always
//! logs in at full health.

use hearth_combat::StatTemplate;
use hearth_protocol::{CharacterId, LocationId};
use serde::{Deserialize, Serialize};

use crate::{Actor, ActorKind};

/// A carried item, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub weight: u32,
}

/// A player character, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub identity: CharacterId,
    pub name: String,
    pub clan: String,
    pub job: String,
    pub level: u32,
    pub experience: u32,
    #[serde(default)]
    pub inventory: Vec<ItemRecord>,
    /// `None` for a character that has never been placed.
    #[serde(default)]
    pub last_location: Option<LocationId>,
}

impl CharacterRecord {
    /// A brand-new level-1 character with nothing in its pockets.
    pub fn new(
        identity: CharacterId,
        name: impl Into<String>,
        clan: impl Into<String>,
        job: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            name: name.into(),
            clan: clan.into(),
            job: job.into(),
            level: 1,
            experience: 0,
            inventory: Vec::new(),
            last_location: None,
        }
    }

    /// Builds the live player actor from this record.
    ///
    /// `job` must be the template named by `self.job`; stats are derived
    /// from it at the stored level.
    pub fn to_actor(&self, job: &StatTemplate) -> Actor {
        let mut actor = Actor::player(
            self.identity.clone(),
            self.name.clone(),
            self.clan.clone(),
            job,
            self.level,
            self.experience,
        );
        for item in &self.inventory {
            // Items are always accepted into an inventory.
            let _ = actor.add_item(Actor::item(
                item.name.clone(),
                item.description.clone(),
                item.weight,
            ));
        }
        actor
    }

    /// Projects a live player actor back into a record.
    ///
    /// Returns `None` for anything that isn't a player character.
    pub fn from_actor(
        actor: &Actor,
        location: Option<LocationId>,
    ) -> Option<Self> {
        let ActorKind::PlayerCharacter {
            identity,
            clan,
            job,
            level,
            experience,
        } = &actor.kind
        else {
            return None;
        };
        let inventory = actor
            .inventory()
            .iter()
            .filter_map(|item| match item.kind {
                ActorKind::Item { weight } => Some(ItemRecord {
                    name: item.name.clone(),
                    description: item.description.clone(),
                    weight,
                }),
                _ => None,
            })
            .collect();
        Some(Self {
            identity: identity.clone(),
            name: actor.name.clone(),
            clan: clan.clone(),
            job: job.clone(),
            level: *level,
            experience: *experience,
            inventory,
            last_location: location,
        })
    }
}

#[cfg(test)]
mod tests {
    use hearth_combat::{Growth, Stats};

    use super::*;

    fn rogue() -> StatTemplate {
        StatTemplate {
            id: "rogue".into(),
            base: Stats {
                hp: 40,
                attack: 8,
                guard: 3,
                agility: 9,
            },
            growth: Growth {
                hp: 8.0,
                ..Growth::default()
            },
        }
    }

    #[test]
    fn test_new_record_starts_at_level_one() {
        let record = CharacterRecord::new(
            CharacterId::new("u-7"),
            "Bram",
            "Green Frog",
            "rogue",
        );
        assert_eq!(record.level, 1);
        assert_eq!(record.experience, 0);
        assert!(record.last_location.is_none());
    }

    #[test]
    fn test_to_actor_restores_level_and_full_health() {
        let mut record = CharacterRecord::new(
            CharacterId::new("u-7"),
            "Bram",
            "Green Frog",
            "rogue",
        );
        record.level = 2;
        record.inventory.push(ItemRecord {
            name: "Lantern".into(),
            description: String::new(),
            weight: 2,
        });

        let actor = record.to_actor(&rogue());

        let combatant = actor.combatant.as_ref().unwrap();
        assert_eq!(combatant.max_hp(), 48);
        assert_eq!(combatant.current_hp(), 48);
        assert_eq!(actor.inventory().len(), 1);
        assert_eq!(actor.identity(), Some(&CharacterId::new("u-7")));
    }

    #[test]
    fn test_from_actor_captures_progress_and_location() {
        let record = CharacterRecord::new(
            CharacterId::new("u-7"),
            "Bram",
            "Green Frog",
            "rogue",
        );
        let mut actor = record.to_actor(&rogue());
        actor.gain_experience(120, &rogue());
        actor.add_item(Actor::item("Coin", "", 0)).unwrap();

        let saved =
            CharacterRecord::from_actor(&actor, Some("market".into()))
                .expect("player");

        assert_eq!(saved.level, 2);
        assert_eq!(saved.experience, 20);
        assert_eq!(saved.inventory[0].name, "Coin");
        assert_eq!(saved.last_location, Some(LocationId::from("market")));
    }

    #[test]
    fn test_from_actor_non_player_returns_none() {
        let rat = Actor::item("Rat tail", "", 0);
        assert!(CharacterRecord::from_actor(&rat, None).is_none());
    }
}
