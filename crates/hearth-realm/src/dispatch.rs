//! The command dispatcher: one parsed command in, a list of notifications
//! out.
//!
//! Each handler either rejects the command (changing nothing) or applies
//! it and describes who should hear about it. Nothing here sends: the
//! notifications go to the [`BroadcastRouter`](crate::BroadcastRouter)
//! right after, while the realm is still in the state they describe.

use hearth_combat::{AttackOutcome, resolve_attack};
use hearth_protocol::{
    ActorId, ActorRef, GameEvent, LocationId, Recipient, SessionId,
};
use hearth_world::{ActorKind, find_by_name, opposite_direction};

use crate::state::combatant_in;
use crate::{Command, CommandError, Notification, Realm};

type Outcome = Result<Vec<Notification>, CommandError>;

impl Realm {
    /// Applies `command` on behalf of `session`.
    ///
    /// # Errors
    /// [`CommandError::NotAuthenticated`] unless the session is playing a
    /// character; otherwise whatever the command itself rejects with. A
    /// rejected command leaves the realm untouched.
    pub fn dispatch(&mut self, session: SessionId, command: Command) -> Outcome {
        let location = self
            .registry
            .location_of(session)
            .cloned()
            .ok_or(CommandError::NotAuthenticated)?;

        match command {
            Command::Say(text) => self.say(session, location, text),
            Command::Look => Ok(vec![Notification::to_session(
                session,
                GameEvent::Room(self.room_view(session, &location)),
            )]),
            Command::Who => Ok(self.who(session, &location)),
            Command::Move(direction) => {
                self.move_to(session, location, direction)
            }
            Command::Attack(name) => self.attack(session, location, &name),
            Command::Inventory => Ok(self.inventory(session)),
            Command::Talk(name) => self.talk(session, &location, &name),
            Command::Unknown(verb) => Err(CommandError::UnknownCommand(verb)),
        }
    }

    fn say(
        &self,
        session: SessionId,
        location: LocationId,
        text: String,
    ) -> Outcome {
        if text.trim().is_empty() {
            return Err(CommandError::EmptySpeech);
        }
        if self.filter.is_disallowed(&text) {
            return Err(CommandError::Disallowed);
        }
        Ok(vec![Notification::event(
            Recipient::Room(location),
            GameEvent::Said {
                speaker: self.display_name(ActorRef::Player(session)),
                text,
            },
        )])
    }

    fn who(&self, session: SessionId, location: &LocationId) -> Vec<Notification> {
        let names: Vec<String> = self
            .registry
            .sessions_at(location)
            .filter(|id| *id != session)
            .filter_map(|id| self.registry.character(id))
            .map(|c| c.name.clone())
            .collect();
        let event = if names.is_empty() {
            GameEvent::Alone
        } else {
            GameEvent::Occupants { names }
        };
        vec![Notification::to_session(session, event)]
    }

    /// Walks through an exit.
    ///
    /// Leaving a room ends any fight the mover was in.
    fn move_to(
        &mut self,
        session: SessionId,
        from: LocationId,
        direction: String,
    ) -> Outcome {
        if direction.is_empty() {
            return Err(CommandError::MissingArgument("Go where?"));
        }
        let to = self
            .world
            .destination(&from, &direction)
            .cloned()
            .ok_or_else(|| CommandError::NoSuchExit(direction.clone()))?;

        self.registry.relocate(session, to.clone())?;
        self.release(ActorRef::Player(session));

        let name = self.display_name(ActorRef::Player(session));
        let view = self.room_view(session, &to);
        Ok(vec![
            Notification::event(
                Recipient::Room(from),
                GameEvent::Departed {
                    name: name.clone(),
                    direction: direction.clone(),
                },
            ),
            Notification::event(
                Recipient::RoomExcept(to.clone(), session),
                GameEvent::Arrived {
                    name,
                    from: opposite_direction(&direction).map(str::to_string),
                },
            ),
            Notification::to_session(
                session,
                GameEvent::Moved {
                    direction,
                    destination: view.name.clone(),
                },
            ),
            Notification::to_session(session, GameEvent::Room(view)),
        ])
    }

    /// One exchange of blows.
    ///
    /// The player attacks; if the target is a monster that survives, it
    /// strikes back once. Players are matched before monsters, and only
    /// things that can fight are valid targets.
    fn attack(
        &mut self,
        session: SessionId,
        location: LocationId,
        name: &str,
    ) -> Outcome {
        if name.is_empty() {
            return Err(CommandError::MissingArgument("Attack whom?"));
        }
        let me = ActorRef::Player(session);
        if self.combatant(me).is_none_or(|c| c.is_defeated()) {
            return Err(CommandError::Incapacitated);
        }

        let target = self
            .resolve_target(session, &location, name)
            .ok_or_else(|| CommandError::NoSuchTarget(name.to_string()))?;

        let room = Recipient::Room(location);
        let mut out = Vec::new();

        self.pair(me, target);
        let target_defeated = self.strike(me, target, &room, &mut out);

        if target_defeated {
            self.release(me);
            if let ActorRef::Spawned(id) = target {
                self.defeat_monster(session, id, &mut out);
            }
        } else if matches!(target, ActorRef::Spawned(_))
            && self.strike(target, me, &room, &mut out)
        {
            self.release(me);
        }
        Ok(out)
    }

    /// Finds an attackable target by name: another player first, then a
    /// monster. Defeated players and non-combatants don't count.
    fn resolve_target(
        &self,
        session: SessionId,
        location: &LocationId,
        name: &str,
    ) -> Option<ActorRef> {
        let standing = self
            .registry
            .sessions_at(location)
            .filter(|id| *id != session)
            .filter_map(|id| self.registry.character(id).map(|c| (id, c)))
            .filter(|(_, c)| {
                c.combatant.as_ref().is_some_and(|c| !c.is_defeated())
            })
            .map(|(id, c)| (id, c.name.as_str()));
        if let Some(id) = find_by_name(standing, name) {
            return Some(ActorRef::Player(id));
        }
        self.population
            .find_at_where(location, name, |a| {
                a.is_monster() && a.combatant.is_some()
            })
            .map(ActorRef::Spawned)
    }

    /// `attacker` swings at `defender`. Pushes the result (and a defeat, if
    /// any) for the room and returns whether `defender` went down.
    fn strike(
        &mut self,
        attacker: ActorRef,
        defender: ActorRef,
        room: &Recipient,
        out: &mut Vec<Notification>,
    ) -> bool {
        let attacker_name = self.display_name(attacker);
        let defender_name = self.display_name(defender);
        let Some(attacker_stats) = self.combatant(attacker).cloned() else {
            return false;
        };

        let Realm {
            registry,
            population,
            roll,
            ..
        } = self;
        let Some(target) = combatant_in(registry, population, defender) else {
            return false;
        };
        let outcome = resolve_attack(&attacker_stats, target, roll.as_mut());

        match outcome {
            AttackOutcome::Hit {
                damage,
                remaining_hp,
            } => {
                out.push(Notification::event(
                    room.clone(),
                    GameEvent::AttackHit {
                        attacker: attacker_name.clone(),
                        target: defender_name.clone(),
                        damage,
                        remaining_hp,
                    },
                ));
                if remaining_hp == 0 {
                    tracing::debug!(%attacker, %defender, "combatant defeated");
                    out.push(Notification::event(
                        room.clone(),
                        GameEvent::Defeated {
                            name: defender_name,
                            by: attacker_name,
                        },
                    ));
                    return true;
                }
                false
            }
            AttackOutcome::Miss => {
                out.push(Notification::event(
                    room.clone(),
                    GameEvent::AttackMissed {
                        attacker: attacker_name,
                        target: defender_name,
                    },
                ));
                false
            }
        }
    }

    /// Removes a defeated monster and pays its experience to the victor.
    fn defeat_monster(
        &mut self,
        session: SessionId,
        id: ActorId,
        out: &mut Vec<Notification>,
    ) {
        let Some((monster, _)) = self.population.despawn(id) else {
            return;
        };
        let ActorKind::Monster {
            experience_award, ..
        } = monster.kind
        else {
            return;
        };
        if experience_award == 0 {
            return;
        }

        let Some(character) = self.registry.character_mut(session) else {
            return;
        };
        let ActorKind::PlayerCharacter { job, .. } = &character.kind else {
            return;
        };
        let Ok(job) = self.templates.job(job) else {
            tracing::warn!(session_id = %session, "player job has no template");
            return;
        };
        let Some(advancement) = character.gain_experience(experience_award, job)
        else {
            return;
        };

        out.push(Notification::to_session(
            session,
            GameEvent::ExperienceGained {
                amount: experience_award,
                total: advancement.experience,
            },
        ));
        if let Some(level) = advancement.new_level {
            tracing::info!(session_id = %session, level, "player levelled up");
            out.push(Notification::to_session(
                session,
                GameEvent::LevelUp { level },
            ));
        }
    }

    fn inventory(&self, session: SessionId) -> Vec<Notification> {
        let items = self
            .registry
            .character(session)
            .map(|c| c.inventory().iter().map(|i| i.name.clone()).collect())
            .unwrap_or_default();
        vec![Notification::to_session(
            session,
            GameEvent::Inventory { items },
        )]
    }

    fn talk(
        &mut self,
        session: SessionId,
        location: &LocationId,
        name: &str,
    ) -> Outcome {
        if name.is_empty() {
            return Err(CommandError::MissingArgument("Talk to whom?"));
        }
        let npc = self
            .population
            .find_at_where(location, name, |a| a.is_npc())
            .and_then(|id| self.population.get_mut(id))
            .ok_or_else(|| CommandError::NoSuchTarget(name.to_string()))?;

        let line = npc.next_line().unwrap_or_else(|| "...".to_string());
        Ok(vec![Notification::to_session(
            session,
            GameEvent::Dialogue {
                speaker: npc.name.clone(),
                line,
            },
        )])
    }

    // -- Engagement bookkeeping ---------------------------------------------

    /// Engages `a` and `b` with each other.
    ///
    /// Whoever either of them was fighting before is released first, so
    /// engagement stays symmetric.
    fn pair(&mut self, a: ActorRef, b: ActorRef) {
        for (me, other) in [(a, b), (b, a)] {
            let previous = self.combatant(me).and_then(|c| c.opponent());
            if let Some(previous) = previous.filter(|p| *p != other) {
                if let Some(c) = self.combatant_mut(previous) {
                    c.disengage_from(me);
                }
            }
        }
        if let Some(c) = self.combatant_mut(a) {
            c.engage_with(b);
        }
        if let Some(c) = self.combatant_mut(b) {
            c.engage_with(a);
        }
    }

    /// Ends whatever fight `who` is in, on both sides.
    pub(crate) fn release(&mut self, who: ActorRef) {
        let partner = self.combatant_mut(who).and_then(|c| c.disengage());
        if let Some(partner) = partner {
            if let Some(c) = self.combatant_mut(partner) {
                c.disengage_from(who);
            }
        }
    }
}
