//! The combat contract and autoattack resolution (spec.md §4.3, §4.4).
//!
//! `rooms`, `mobs`, and `characters` would import each other in a cycle if
//! mobs and characters both needed to name each other's concrete type
//! directly. [`CombatantRef`] breaks that: it's a closed enum naming a
//! combatant by coordinates (a character name, or a zone + mob instance
//! ID) rather than by reference, so a [`Character`](crate::character::Character)
//! can hold a `Vec<CombatantRef>` of its targets without ever naming
//! `MobInstance`. Only `world::tick` needs to resolve a `CombatantRef` back
//! into the real data, and it already imports all three modules.

use crate::ids::{MobInstanceId, ZoneId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Names a combatant without borrowing it: either a player character (by
/// name, since character names are globally unique and stable) or a mob
/// instance (by zone + instance ID, since instance IDs are only unique
/// within a zone's mob tables).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantRef {
  Player(String),
  Mob(ZoneId, MobInstanceId),
}

/// Implemented by both [`Character`](crate::character::Character) and
/// [`MobInstance`](crate::mob::MobInstance). Lets death handling and combat
/// bookkeeping (scrubbing targets, checking HP) operate without caring
/// which kind of combatant it's touching.
pub trait Combatant {
  fn name(&self) -> &str;
  fn defense(&self) -> i32;
  fn hp(&self) -> i32;
  fn atk_roll(&self) -> i32;
  fn dam_roll(&self) -> i32;
  fn targets(&self) -> &[CombatantRef];
  fn targets_mut(&mut self) -> &mut Vec<CombatantRef>;
  fn autoattack_cooldown(&self) -> i32;
  fn set_autoattack_cooldown(&mut self, v: i32);
  fn receive_damage(&mut self, amount: i32);
  fn enter_combat(&mut self, target: CombatantRef);
  fn exit_combat(&mut self);

  fn is_dead(&self) -> bool { self.hp() <= 0 }
}

/// A resolved snapshot of one side of an autoattack, so the resolver doesn't
/// need two simultaneous mutable borrows of the attacker and the defender.
/// Every combatant pair the tick engine resolves is a (player, mob) pair
/// held in different top-level collections, but we still read the attacker
/// fully before touching the defender, to keep the borrow pattern uniform.
pub struct AttackerSnapshot {
  pub name:     String,
  pub atk_roll: i32,
  pub dam_roll: i32,
}

/// The result of one autoattack, worded for narration to the attacker and to
/// the room respectively (spec.md §4.4 step 2).
pub struct AttackOutcome {
  pub hit:            bool,
  pub damage:         i32,
  pub defender_name:  String,
  pub attacker_name:  String,
}

/// Resolves one autoattack swing from `attacker` against `defender`,
/// mutating `defender`'s HP in place. This is the algorithm from spec.md
/// §4.4 steps 2-4, with `atk_roll` folded into the target number so a
/// higher `AtkRoll` raises hit chance (spec.md §8 scenario 3 requires an
/// `AtkRoll=+100` mob to always land its blow, which only holds if `AtkRoll`
/// widens `tn` rather than the roll):
///
/// 1. `tn = 99 - defender.defense() + attacker.atk_roll`.
/// 2. Roll `r = uniform_int[0,99]`; a hit iff `r <= tn`.
/// 3. On a hit, damage is `uniform_int[1,10] + attacker.dam_roll`, applied
///    via `receive_damage`.
pub fn resolve_autoattack(
  rng: &mut impl Rng,
  attacker: &AttackerSnapshot,
  defender: &mut dyn Combatant,
) -> AttackOutcome {
  let tn = 99 - defender.defense() + attacker.atk_roll;
  let r = rng.gen_range(0..=99);
  let hit = r <= tn;

  let mut damage = 0;
  if hit {
    damage = rng.gen_range(1..=10) + attacker.dam_roll;
    defender.receive_damage(damage);
  }

  AttackOutcome { hit, damage, defender_name: defender.name().to_string(), attacker_name: attacker.name.clone() }
}
