//! Mob templates and live mob instances (spec.md §3, §4.4 repop).

use crate::{
  combat::{Combatant, CombatantRef},
  ids::{ItemId, MobInstanceId, MobTemplateId, RoomId, ZoneId},
};
use serde::{Deserialize, Serialize};

/// Static data loaded once from `mobs/mobs-<zone>.json`. Never mutated at
/// runtime; each [`MobInstance`] is stamped out from one of these at zone
/// load and again at every repop. `cont_list` names the item templates a
/// fresh instance spawns holding; this implementation loads it for file
/// compatibility but mob inventory/loot is out of scope (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MobTemplate {
  #[serde(rename = "ID")]
  pub id:        MobTemplateId,
  pub name:      String,
  pub keywords:  Vec<String>,
  pub desc:      String,
  pub start_loc: RoomId,
  #[serde(rename = "HPMax")]
  pub hp_max:    i32,
  #[serde(rename = "MPMax")]
  pub mp_max:    i32,
  pub atk_roll:  i32,
  pub dam_roll:  i32,
  #[serde(default)]
  pub cont_list: Vec<ItemId>,
}

/// On-disk shape of `mobs/mobs-<zone>.json`: a flat map from template ID to
/// template, one file per zone.
pub type MobTemplateList = std::collections::HashMap<MobTemplateId, MobTemplate>;

/// A single living (or recently-dead, pending repop) mob in the world.
/// Lives in `Zone::active_mobs` or `Zone::dead_mobs`, never both.
#[derive(Debug, Clone)]
pub struct MobInstance {
  pub instance_id: MobInstanceId,
  pub template_id: MobTemplateId,
  pub name:        String,
  pub keywords:    Vec<String>,
  pub desc:        String,
  pub zone:        ZoneId,
  pub loc:         RoomId,
  /// The template's `StartLoc`, fixed at spawn time. Repop always resets
  /// `loc` back to this, independent of wherever wander AI moved the mob
  /// before it died (spec.md §4.4 step "reset Loc to StartLoc").
  pub start_loc:   RoomId,

  pub hp_current: i32,
  pub hp_max:     i32,
  pub mp_current: i32,
  pub mp_max:     i32,
  pub atk_roll:   i32,
  pub dam_roll:   i32,

  pub autoattack_cooldown: i32,
  pub targets:             Vec<CombatantRef>,
}

impl MobInstance {
  /// Stamps out a fresh instance from `template`, placed at its `start_loc`
  /// with full health, at the given `instance_id`. Used both at initial
  /// zone load and at repop (spec.md §4.4).
  pub fn spawn(template: &MobTemplate, instance_id: MobInstanceId) -> MobInstance {
    MobInstance {
      instance_id,
      template_id: template.id.clone(),
      name: template.name.clone(),
      keywords: template.keywords.clone(),
      desc: template.desc.clone(),
      zone: ZoneId(String::new()), // filled in by the caller, which knows the zone
      loc: template.start_loc.clone(),
      start_loc: template.start_loc.clone(),
      hp_current: template.hp_max,
      hp_max: template.hp_max,
      mp_current: template.mp_max,
      mp_max: template.mp_max,
      atk_roll: template.atk_roll,
      dam_roll: template.dam_roll,
      autoattack_cooldown: 0,
      targets: Vec::new(),
    }
  }

  /// True if `word` is a case-insensitive prefix of any of this mob's
  /// keywords or its name (spec.md §4.6).
  pub fn matches(&self, word: &str) -> bool {
    let word = word.to_lowercase();
    if self.name.to_lowercase().starts_with(&word) {
      return true;
    }
    self.keywords.iter().any(|k| k.to_lowercase().starts_with(&word))
  }

  pub fn is_dead(&self) -> bool { self.hp_current <= 0 }
}

impl Combatant for MobInstance {
  fn name(&self) -> &str { &self.name }
  fn defense(&self) -> i32 { 0 }
  fn hp(&self) -> i32 { self.hp_current }
  fn atk_roll(&self) -> i32 { self.atk_roll }
  fn dam_roll(&self) -> i32 { self.dam_roll }
  fn targets(&self) -> &[CombatantRef] { &self.targets }
  fn targets_mut(&mut self) -> &mut Vec<CombatantRef> { &mut self.targets }
  fn autoattack_cooldown(&self) -> i32 { self.autoattack_cooldown }
  fn set_autoattack_cooldown(&mut self, v: i32) { self.autoattack_cooldown = v }
  fn receive_damage(&mut self, amount: i32) { self.hp_current -= amount; }
  fn enter_combat(&mut self, target: CombatantRef) {
    if !self.targets.contains(&target) {
      self.targets.push(target);
    }
  }
  fn exit_combat(&mut self) { self.targets.clear(); }
}
