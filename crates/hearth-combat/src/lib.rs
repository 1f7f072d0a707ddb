//! Combat for Hearth.
//!
//! Everything here is synchronous, bounded, and free of I/O: the realm
//! calls into it while it owns the world state.
//!
//! # Key types
//!
//! - [`StatTemplate`] / [`MonsterTemplate`] / [`TemplateTable`] — the
//!   immutable class and monster tables loaded at startup
//! - [`derive_stats`] — the single stat-derivation rule
//! - [`Combatant`] — hit points, derived stats, and engagement
//! - [`resolve_attack`] — one attack, one roll, one outcome
//! - [`HitRoll`] — the seedable source of randomness behind every roll

mod combatant;
mod error;
mod resolve;
mod roll;
mod template;

pub use combatant::{Combatant, Engagement};
pub use error::CombatError;
pub use resolve::{
    AttackOutcome, BASE_HIT_CHANCE, HIT_CHANCE_PER_AGILITY, damage_against,
    hit_chance, resolve_attack,
};
pub use roll::{FixedRoll, HitRoll, ScriptedRoll, SeededRoll};
pub use template::{
    Growth, MonsterTemplate, StatTemplate, Stats, TemplateTable, derive_stats,
};
