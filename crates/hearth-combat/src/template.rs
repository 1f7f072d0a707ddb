//! Stat templates and the stat-derivation rule.
//!
//! A template is the immutable "blueprint" for a class (job) or a monster:
//! base values at level 1 plus how much each attribute grows per level.
//! Templates are loaded once at startup and never mutated.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::CombatError;

// ---------------------------------------------------------------------------
// Stats / Growth
// ---------------------------------------------------------------------------

/// The four combat attributes, as whole non-negative numbers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct Stats {
    /// Maximum hit points.
    pub hp: u32,
    /// Raw damage dealt before the defender's guard is subtracted.
    pub attack: u32,
    /// Damage absorbed from every hit taken.
    pub guard: u32,
    /// Shifts hit chance by 5% per point of difference.
    pub agility: u32,
}

/// Per-level growth for each attribute.
///
/// Fractional on purpose: a growth of `0.5` agility means +1 every two
/// levels once [`derive_stats`] floors the result.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Growth {
    pub hp: f64,
    pub attack: f64,
    pub guard: f64,
    pub agility: f64,
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Blueprint for a player class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatTemplate {
    /// Class identifier, e.g. `"warrior"`.
    pub id: String,
    /// Stats at level 1.
    pub base: Stats,
    /// Added per level above 1.
    #[serde(default)]
    pub growth: Growth,
}

/// Blueprint for a monster.
///
/// Monsters don't level: their stats are the base values, which is the
/// same as deriving at level 1 with zero growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    /// Monster identifier, e.g. `"rat"`.
    pub id: String,
    /// Display name, e.g. `"a giant rat"`.
    pub name: String,
    /// What players see when they look at it.
    #[serde(default)]
    pub description: String,
    /// Fixed stats.
    pub base: Stats,
    /// Experience granted to whoever defeats it.
    #[serde(default)]
    pub experience_award: u32,
}

impl MonsterTemplate {
    /// The monster's stats: the template derived at level 1.
    pub fn stats(&self) -> Stats {
        derive(&self.base, &Growth::default(), 1)
    }
}

/// Computes stats for a class at a level.
///
/// For every attribute: `floor(base + growth × (level − 1))`. This is the
/// only place stats are derived; player leveling and monster spawning
/// both go through it. Level 0 is treated as level 1.
///
/// ```rust
/// use hearth_combat::{Growth, StatTemplate, Stats, derive_stats};
///
/// let template = StatTemplate {
///     id: "warrior".into(),
///     base: Stats { hp: 50, attack: 10, guard: 5, agility: 5 },
///     growth: Growth { hp: 10.0, ..Growth::default() },
/// };
/// assert_eq!(derive_stats(&template, 3).hp, 70);
/// ```
pub fn derive_stats(template: &StatTemplate, level: u32) -> Stats {
    derive(&template.base, &template.growth, level)
}

fn derive(base: &Stats, growth: &Growth, level: u32) -> Stats {
    let steps = f64::from(level.max(1) - 1);
    let grow = |base: u32, rate: f64| -> u32 {
        // `as` saturates for floats: negative growth bottoms out at 0.
        (f64::from(base) + rate * steps).floor() as u32
    };
    Stats {
        hp: grow(base.hp, growth.hp),
        attack: grow(base.attack, growth.attack),
        guard: grow(base.guard, growth.guard),
        agility: grow(base.agility, growth.agility),
    }
}

// ---------------------------------------------------------------------------
// TemplateTable
// ---------------------------------------------------------------------------

/// The shape of a template file on disk.
#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    jobs: Vec<StatTemplate>,
    #[serde(default)]
    monsters: Vec<MonsterTemplate>,
}

/// Immutable lookup from class / monster id to its template.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    jobs: HashMap<String, StatTemplate>,
    monsters: HashMap<String, MonsterTemplate>,
}

impl TemplateTable {
    /// Builds a table, rejecting duplicate ids within each namespace.
    pub fn new(
        jobs: Vec<StatTemplate>,
        monsters: Vec<MonsterTemplate>,
    ) -> Result<Self, CombatError> {
        let mut table = Self::default();
        for job in jobs {
            if table.jobs.contains_key(&job.id) {
                return Err(CombatError::DuplicateTemplate(job.id));
            }
            table.jobs.insert(job.id.clone(), job);
        }
        for monster in monsters {
            if table.monsters.contains_key(&monster.id) {
                return Err(CombatError::DuplicateTemplate(monster.id));
            }
            table.monsters.insert(monster.id.clone(), monster);
        }
        tracing::debug!(
            jobs = table.jobs.len(),
            monsters = table.monsters.len(),
            "template table loaded"
        );
        Ok(table)
    }

    /// Parses a `{ "jobs": [...], "monsters": [...] }` document.
    pub fn from_json(json: &str) -> Result<Self, CombatError> {
        let file: TemplateFile = serde_json::from_str(json)?;
        Self::new(file.jobs, file.monsters)
    }

    /// Looks up a class template.
    pub fn job(&self, id: &str) -> Result<&StatTemplate, CombatError> {
        self.jobs
            .get(id)
            .ok_or_else(|| CombatError::UnknownJob(id.to_string()))
    }

    /// Looks up a monster template.
    pub fn monster(&self, id: &str) -> Result<&MonsterTemplate, CombatError> {
        self.monsters
            .get(id)
            .ok_or_else(|| CombatError::UnknownMonster(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warrior() -> StatTemplate {
        StatTemplate {
            id: "warrior".into(),
            base: Stats {
                hp: 50,
                attack: 10,
                guard: 5,
                agility: 5,
            },
            growth: Growth {
                hp: 10.0,
                attack: 2.0,
                guard: 1.0,
                agility: 0.5,
            },
        }
    }

    #[test]
    fn test_derive_stats_level_one_is_base() {
        assert_eq!(derive_stats(&warrior(), 1), warrior().base);
    }

    #[test]
    fn test_derive_stats_level_three_adds_two_growth_steps() {
        let stats = derive_stats(&warrior(), 3);
        assert_eq!(stats.hp, 70);
        assert_eq!(stats.attack, 14);
        assert_eq!(stats.guard, 7);
        // 5 + 0.5 × 2 = 6
        assert_eq!(stats.agility, 6);
    }

    #[test]
    fn test_derive_stats_floors_fractional_growth() {
        // 5 + 0.5 × 1 = 5.5 → 5
        assert_eq!(derive_stats(&warrior(), 2).agility, 5);
    }

    #[test]
    fn test_derive_stats_level_zero_treated_as_one() {
        assert_eq!(derive_stats(&warrior(), 0), warrior().base);
    }

    #[test]
    fn test_monster_stats_ignore_level() {
        let rat = MonsterTemplate {
            id: "rat".into(),
            name: "a giant rat".into(),
            description: String::new(),
            base: Stats {
                hp: 8,
                attack: 3,
                guard: 2,
                agility: 4,
            },
            experience_award: 10,
        };
        assert_eq!(rat.stats(), rat.base);
    }

    #[test]
    fn test_from_json_parses_jobs_and_monsters() {
        let json = r#"{
            "jobs": [
                { "id": "rogue",
                  "base": { "hp": 40, "attack": 8, "guard": 3, "agility": 9 },
                  "growth": { "hp": 8, "agility": 1 } }
            ],
            "monsters": [
                { "id": "rat", "name": "a giant rat",
                  "base": { "hp": 8, "attack": 3, "guard": 2, "agility": 4 },
                  "experience_award": 10 }
            ]
        }"#;

        let table = TemplateTable::from_json(json).expect("should parse");

        let rogue = table.job("rogue").expect("rogue exists");
        assert_eq!(rogue.growth.attack, 0.0, "missing growth defaults to 0");
        assert_eq!(derive_stats(rogue, 2).agility, 10);
        assert_eq!(table.monster("rat").unwrap().experience_award, 10);
    }

    #[test]
    fn test_lookup_unknown_ids_return_errors() {
        let table = TemplateTable::default();
        assert!(matches!(table.job("bard"), Err(CombatError::UnknownJob(_))));
        assert!(matches!(
            table.monster("dragon"),
            Err(CombatError::UnknownMonster(_))
        ));
    }

    #[test]
    fn test_new_rejects_duplicate_job_ids() {
        let result = TemplateTable::new(vec![warrior(), warrior()], vec![]);
        assert!(matches!(result, Err(CombatError::DuplicateTemplate(id)) if id == "warrior"));
    }

    #[test]
    fn test_from_json_malformed_returns_error() {
        let result = TemplateTable::from_json("{ not json");
        assert!(matches!(result, Err(CombatError::Malformed(_))));
    }
}
