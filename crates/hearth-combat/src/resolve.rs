//! Attack resolution.

use crate::{Combatant, HitRoll};

/// Hit chance between two combatants with equal agility.
pub const BASE_HIT_CHANCE: f64 = 0.70;

/// How much each point of agility advantage moves the hit chance.
pub const HIT_CHANCE_PER_AGILITY: f64 = 0.05;

/// What happened when one combatant attacked another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The attack landed.
    Hit {
        /// Hit points removed.
        damage: u32,
        /// The defender's hit points afterwards.
        remaining_hp: u32,
    },
    /// The attack missed. Nothing changed.
    Miss,
}

/// Probability that `attacker` hits `defender`, in `[0, 1]`.
///
/// `0.70 + 0.05 × (attacker.agility − defender.agility)`, clamped.
pub fn hit_chance(attacker: &Combatant, defender: &Combatant) -> f64 {
    let delta = i64::from(attacker.agility()) - i64::from(defender.agility());
    (BASE_HIT_CHANCE + HIT_CHANCE_PER_AGILITY * delta as f64).clamp(0.0, 1.0)
}

/// Damage one landed hit deals: `max(1, attack − guard)`.
///
/// Every hit hurts a little, however thick the armour.
pub fn damage_against(attacker: &Combatant, defender: &Combatant) -> u32 {
    attacker.attack().saturating_sub(defender.guard()).max(1)
}

/// Resolves a single attack.
///
/// Draws exactly once from `roll`; the attack hits when the draw is below
/// [`hit_chance`]. On a hit the defender loses [`damage_against`] hit
/// points, clamped at zero. Engagement is not touched here: pairing is
/// the caller's decision.
pub fn resolve_attack(
    attacker: &Combatant,
    defender: &mut Combatant,
    roll: &mut dyn HitRoll,
) -> AttackOutcome {
    let chance = hit_chance(attacker, defender);
    let draw = roll.draw();
    if draw >= chance {
        tracing::trace!(chance, draw, "attack missed");
        return AttackOutcome::Miss;
    }
    let damage = damage_against(attacker, defender);
    let remaining_hp = defender.suffer(damage);
    tracing::trace!(chance, draw, damage, remaining_hp, "attack hit");
    AttackOutcome::Hit {
        damage,
        remaining_hp,
    }
}
