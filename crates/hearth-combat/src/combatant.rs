//! The combat component attached to any actor that can fight.

use hearth_protocol::ActorRef;

use crate::Stats;

/// Whether a combatant is currently fighting someone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engagement {
    /// Not fighting.
    #[default]
    Idle,
    /// Fighting the referenced actor. Always paired: if A is engaged with
    /// B, B is engaged with A.
    Engaged(ActorRef),
}

/// Hit points, derived stats, and engagement for one actor.
///
/// Fields are private so `current_hp` can never leave `0..=max_hp`:
/// every write goes through a method that clamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combatant {
    current_hp: u32,
    max_hp: u32,
    attack: u32,
    guard: u32,
    agility: u32,
    engagement: Engagement,
}

impl Combatant {
    /// Creates an idle combatant at full health.
    pub fn new(stats: Stats) -> Self {
        Self {
            current_hp: stats.hp,
            max_hp: stats.hp,
            attack: stats.attack,
            guard: stats.guard,
            agility: stats.agility,
            engagement: Engagement::Idle,
        }
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn attack(&self) -> u32 {
        self.attack
    }

    pub fn guard(&self) -> u32 {
        self.guard
    }

    pub fn agility(&self) -> u32 {
        self.agility
    }

    /// The derived stats this combatant was built from.
    pub fn stats(&self) -> Stats {
        Stats {
            hp: self.max_hp,
            attack: self.attack,
            guard: self.guard,
            agility: self.agility,
        }
    }

    /// `true` once hit points reach zero.
    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }

    /// Restores up to `amount` hit points, never past `max_hp`.
    /// Returns the new hit point total.
    pub fn heal(&mut self, amount: u32) -> u32 {
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
        self.current_hp
    }

    /// Removes `damage` hit points, never below zero. Returns what's left.
    ///
    /// This is the already-mitigated amount; see
    /// [`damage_against`](crate::damage_against) for the formula.
    pub(crate) fn suffer(&mut self, damage: u32) -> u32 {
        self.current_hp = self.current_hp.saturating_sub(damage);
        self.current_hp
    }

    /// Replaces the derived stats after a level change.
    ///
    /// Hit points rise by however much `max_hp` rose, so leveling up in
    /// the middle of a fight heals by the growth and nothing more.
    pub fn rescale(&mut self, stats: Stats) {
        let gained = stats.hp.saturating_sub(self.max_hp);
        self.max_hp = stats.hp;
        self.attack = stats.attack;
        self.guard = stats.guard;
        self.agility = stats.agility;
        self.current_hp = self.current_hp.saturating_add(gained).min(self.max_hp);
    }

    pub fn engagement(&self) -> Engagement {
        self.engagement
    }

    /// The actor this combatant is fighting, if any.
    pub fn opponent(&self) -> Option<ActorRef> {
        match self.engagement {
            Engagement::Idle => None,
            Engagement::Engaged(other) => Some(other),
        }
    }

    /// Marks this side of a pair as fighting `other`.
    ///
    /// One-sided on purpose: the two combatants of a fight usually live
    /// in different owners (a session and a spawned monster), so the caller
    /// engages each side and keeps the pair symmetric.
    pub fn engage_with(&mut self, other: ActorRef) {
        self.engagement = Engagement::Engaged(other);
    }

    /// Returns to idle, handing back the former opponent so the caller
    /// can release the other side too.
    pub fn disengage(&mut self) -> Option<ActorRef> {
        let previous = self.opponent();
        self.engagement = Engagement::Idle;
        previous
    }

    /// Releases this side only if it is engaged with `other`.
    ///
    /// Used on the partner's side so a stale reference never knocks a
    /// combatant out of a newer fight.
    pub fn disengage_from(&mut self, other: ActorRef) -> bool {
        if self.engagement == Engagement::Engaged(other) {
            self.engagement = Engagement::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use hearth_protocol::{ActorId, SessionId};

    use super::*;

    fn stats(hp: u32) -> Stats {
        Stats {
            hp,
            attack: 10,
            guard: 5,
            agility: 5,
        }
    }

    #[test]
    fn test_new_starts_full_and_idle() {
        let c = Combatant::new(stats(30));
        assert_eq!(c.current_hp(), 30);
        assert_eq!(c.max_hp(), 30);
        assert_eq!(c.engagement(), Engagement::Idle);
        assert!(!c.is_defeated());
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut c = Combatant::new(stats(30));
        c.suffer(12);

        assert_eq!(c.heal(5), 23);
        assert_eq!(c.heal(1_000), 30);
        assert_eq!(c.heal(u32::MAX), 30, "no overflow at the top end");
    }

    #[test]
    fn test_suffer_clamps_to_zero_and_defeats() {
        let mut c = Combatant::new(stats(10));
        assert_eq!(c.suffer(25), 0);
        assert!(c.is_defeated());
    }

    #[test]
    fn test_rescale_heals_by_growth_only() {
        let mut c = Combatant::new(stats(50));
        c.suffer(20); // 30 / 50

        c.rescale(Stats {
            hp: 60,
            attack: 12,
            guard: 6,
            agility: 5,
        });

        assert_eq!(c.max_hp(), 60);
        assert_eq!(c.current_hp(), 40);
        assert_eq!(c.attack(), 12);
    }

    #[test]
    fn test_rescale_down_clamps_current_hp() {
        let mut c = Combatant::new(stats(50));
        c.rescale(stats(20));
        assert_eq!(c.current_hp(), 20);
    }

    #[test]
    fn test_disengage_returns_former_opponent() {
        let foe = ActorRef::Spawned(ActorId(4));
        let mut c = Combatant::new(stats(10));
        c.engage_with(foe);

        assert_eq!(c.opponent(), Some(foe));
        assert_eq!(c.disengage(), Some(foe));
        assert_eq!(c.engagement(), Engagement::Idle);
        assert_eq!(c.disengage(), None);
    }

    #[test]
    fn test_disengage_from_ignores_other_opponents() {
        let mut c = Combatant::new(stats(10));
        c.engage_with(ActorRef::Player(SessionId(2)));

        assert!(!c.disengage_from(ActorRef::Player(SessionId(3))));
        assert_eq!(c.opponent(), Some(ActorRef::Player(SessionId(2))));
        assert!(c.disengage_from(ActorRef::Player(SessionId(2))));
    }
}
