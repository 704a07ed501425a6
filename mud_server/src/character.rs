//! Player characters (spec.md §3, §6). A [`Character`] is split from its
//! on-disk [`CharacterSheet`]: the sheet is exactly what gets serialized to
//! `chara/<Name>.json`, while the live `Character` additionally carries
//! runtime-only state (the response channel, the pending command queue,
//! combat targets) that has no business surviving a save/load round trip.

use crate::{
  combat::{Combatant, CombatantRef},
  ids::{ItemId, RoomId, ZoneId},
  item::Item,
};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
  Standing,
  Fighting,
  Sitting,
  Sleeping,
}

impl Position {
  fn standing() -> Position { Position::Standing }
}

/// The exact shape persisted to `chara/<Name>.json`. No runtime-only field
/// belongs here; if it shouldn't survive a restart, it goes on
/// [`Character`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CharacterSheet {
  pub name: String,
  pub desc: String,
  pub zone: ZoneId,
  #[serde(rename = "Location")]
  pub loc:  RoomId,
  #[serde(default = "Position::standing")]
  pub position: Position,

  #[serde(rename = "HPCurrent")]
  pub hp_current: i32,
  #[serde(rename = "HPMax")]
  pub hp_max:     i32,
  #[serde(rename = "MPCurrent")]
  pub mp_current: i32,
  #[serde(rename = "MPMax")]
  pub mp_max:     i32,
  pub atk_roll:   i32,
  pub dam_roll:   i32,

  #[serde(rename = "Inv")]
  pub inventory: Vec<Item>,
}

/// A logged-in player, live in [`crate::world::World::users`]. Carries the
/// persisted sheet fields directly (flattened, not nested) plus everything
/// that only makes sense while the session is open.
pub struct Character {
  pub name:     String,
  pub desc:     String,
  pub zone:     ZoneId,
  pub loc:      RoomId,
  pub position: Position,

  pub hp_current: i32,
  pub hp_max:     i32,
  pub mp_current: i32,
  pub mp_max:     i32,
  pub atk_roll:   i32,
  pub dam_roll:   i32,

  pub inventory: Vec<Item>,

  /// Writes to this land in the connection worker's write thread and reach
  /// the player's socket. Closing (dropping) this is how the world core
  /// disconnects a session (e.g. the loser of a duplicate login race).
  pub response_tx: Sender<String>,

  /// Raw input lines waiting to be interpreted, fed by the world's intake
  /// drain (spec.md §4.2 step 1) and drained one-per-tick by the command
  /// pass (step 4).
  pub incoming_cmds: VecDeque<String>,

  pub autoattack_cooldown: i32,
  pub targets:             Vec<CombatantRef>,
}

impl Character {
  pub fn from_sheet(sheet: CharacterSheet, response_tx: Sender<String>) -> Character {
    Character {
      name: sheet.name,
      desc: sheet.desc,
      zone: sheet.zone,
      loc: sheet.loc,
      position: sheet.position,
      hp_current: sheet.hp_current,
      hp_max: sheet.hp_max,
      mp_current: sheet.mp_current,
      mp_max: sheet.mp_max,
      atk_roll: sheet.atk_roll,
      dam_roll: sheet.dam_roll,
      inventory: sheet.inventory,
      response_tx,
      incoming_cmds: VecDeque::new(),
      autoattack_cooldown: 0,
      targets: Vec::new(),
    }
  }

  pub fn to_sheet(&self) -> CharacterSheet {
    CharacterSheet {
      name: self.name.clone(),
      desc: self.desc.clone(),
      zone: self.zone.clone(),
      loc: self.loc.clone(),
      position: self.position,
      hp_current: self.hp_current,
      hp_max: self.hp_max,
      mp_current: self.mp_current,
      mp_max: self.mp_max,
      atk_roll: self.atk_roll,
      dam_roll: self.dam_roll,
      inventory: self.inventory.clone(),
    }
  }

  pub fn is_dead(&self) -> bool { self.hp_current <= 0 }

  /// Sends a line to this character's own socket. Best-effort: if the
  /// session has already torn down, the write silently drops rather than
  /// erroring the caller.
  pub fn tell(&self, line: impl Into<String>) { let _ = self.response_tx.send(line.into()); }

  pub fn find_item(&self, word: &str) -> Option<&Item> { self.inventory.iter().find(|i| i.matches(word)) }

  pub fn take_item(&mut self, id: &ItemId) -> Option<Item> {
    let idx = self.inventory.iter().position(|i| &i.id == id)?;
    Some(self.inventory.remove(idx))
  }
}

impl Combatant for Character {
  fn name(&self) -> &str { &self.name }
  fn defense(&self) -> i32 { 0 }
  fn hp(&self) -> i32 { self.hp_current }
  fn atk_roll(&self) -> i32 { self.atk_roll }
  fn dam_roll(&self) -> i32 { self.dam_roll }
  fn targets(&self) -> &[CombatantRef] { &self.targets }
  fn targets_mut(&mut self) -> &mut Vec<CombatantRef> { &mut self.targets }
  fn autoattack_cooldown(&self) -> i32 { self.autoattack_cooldown }
  fn set_autoattack_cooldown(&mut self, v: i32) { self.autoattack_cooldown = v; }
  fn receive_damage(&mut self, amount: i32) { self.hp_current -= amount; }
  fn enter_combat(&mut self, target: CombatantRef) {
    self.position = Position::Fighting;
    if !self.targets.contains(&target) {
      self.targets.push(target);
    }
  }
  fn exit_combat(&mut self) {
    self.targets.clear();
    if self.position == Position::Fighting {
      self.position = Position::Standing;
    }
  }
}
