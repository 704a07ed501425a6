//! The tick engine: the single authoritative loop (spec.md §4.2).

use crate::{
  combat::{self, CombatantRef},
  command,
  ids::{MobInstanceId, ZoneId},
  net::{self, ControlMsg},
  persist,
  world::{death, transfer, World},
};
use rand::Rng;
use std::time::{Duration, Instant};

pub const AUTOATTACK_COOLDOWN: i32 = 20;
/// Per spec.md §4.2: "with probability 1/300 per tick".
const WANDER_PROBABILITY_DENOM: u32 = 300;

/// Runs the tick loop forever, pacing to `world.config.tick_millis`. Never
/// returns under normal operation; only exits if the process is killed.
pub fn run(world: &mut World) {
  loop {
    let tick_duration = Duration::from_millis(world.config.tick_millis);
    let start = Instant::now();
    tick_once(world);
    let elapsed = start.elapsed();
    if elapsed > tick_duration {
      warn!("tick length exceeded: {:?} over budget", elapsed - tick_duration);
    } else {
      spin_sleep::sleep(tick_duration - elapsed);
    }
  }
}

/// Runs exactly one tick's worth of work (spec.md §4.2 steps 1-4). Exposed
/// separately from [`run`] so tests can drive the engine tick-by-tick
/// without real-time sleeping.
pub fn tick_once(world: &mut World) {
  world.tick_count += 1;
  let is_heal_tick = world.tick_count % world.config.heal_every_ticks == 0;

  drain_intake(world);
  mob_pass(world, is_heal_tick);
  if is_heal_tick {
    player_heal_pass(world);
  }
  player_command_pass(world);
}

// --- Step 1: intake drain --------------------------------------------------

fn drain_intake(world: &mut World) {
  while let Ok(stream) = world.connections_rx.try_recv() {
    net::spawn_connection_worker(stream, world.control_tx.clone(), world.input_tx.clone(), world.config.clone());
  }

  while let Ok(msg) = world.control_rx.try_recv() {
    match msg {
      ControlMsg::Login { name, response_tx } => handle_login(world, name, response_tx),
      ControlMsg::Disconnect { name } => {
        if world.users.contains_key(&name) {
          world.quit_character(&name);
        }
      }
    }
  }

  while let Ok(input) = world.input_rx.try_recv() {
    if let Some(c) = world.users.get_mut(&input.character) {
      c.incoming_cmds.push_back(input.line);
    }
  }
}

fn handle_login(world: &mut World, name: String, response_tx: crossbeam_channel::Sender<String>) {
  if world.users.contains_key(&name) {
    let _ = response_tx.send("Character already logged in.".to_string());
    drop(response_tx);
    if let Some(existing) = world.users.get(&name) {
      existing.tell("Duplicate login attempt.");
    }
    return;
  }

  let sheet = match persist::load_character(&name, &world.config.chara_dir) {
    Ok(s) => s,
    Err(e) => {
      let _ = response_tx.send(format!("Could not load your character: {e}"));
      return;
    }
  };

  let character = crate::character::Character::from_sheet(sheet, response_tx);
  let (zone_id, room_id) = (character.zone.clone(), character.loc.clone());
  world.users.insert(name.clone(), character);

  if let Some(zone) = world.zones.get_mut(&zone_id) {
    if let Some(room) = zone.rooms.get_mut(&room_id) {
      room.players.push(name.clone());
    }
  }
  world.broadcast_room(&zone_id, &room_id, Some(&name), &format!("{name} wakes up."));
  if let Some(text) = world.look_room_text(&name) {
    if let Some(c) = world.users.get(&name) {
      c.tell(text);
    }
  }
  world.send_prompt(&name);
}

// --- Step 2: mob pass --------------------------------------------------

fn mob_pass(world: &mut World, is_heal_tick: bool) {
  let mut rng = rand::thread_rng();
  let zone_ids: Vec<ZoneId> = world.zones.keys().cloned().collect();
  for zone_id in zone_ids {
    let mob_ids: Vec<MobInstanceId> = match world.zones.get(&zone_id) {
      Some(z) => z.active_mobs.keys().copied().collect(),
      None => continue,
    };
    for mob_id in mob_ids {
      process_one_mob(world, &mut rng, &zone_id, mob_id, is_heal_tick);
    }
    advance_repop(world, &mut rng, &zone_id);
  }
}

fn process_one_mob(world: &mut World, rng: &mut impl Rng, zone_id: &ZoneId, mob_id: MobInstanceId, is_heal_tick: bool) {
  if is_heal_tick {
    if let Some(mob) = world.zones.get_mut(zone_id).and_then(|z| z.active_mobs.get_mut(&mob_id)) {
      mob.hp_current = (mob.hp_current + 5).min(mob.hp_max);
      mob.mp_current = (mob.mp_current + 5).min(mob.mp_max);
    }
  }

  let (has_target, cooldown) = match world.zones.get(zone_id).and_then(|z| z.active_mobs.get(&mob_id)) {
    Some(m) => (!m.targets.is_empty(), m.autoattack_cooldown),
    None => return,
  };

  if has_target {
    if cooldown <= 0 {
      resolve_mob_attack(world, rng, zone_id, mob_id);
    } else if let Some(mob) = world.zones.get_mut(zone_id).and_then(|z| z.active_mobs.get_mut(&mob_id)) {
      mob.autoattack_cooldown -= 1;
    }
  } else if rng.gen_range(0..WANDER_PROBABILITY_DENOM) == 0 {
    try_wander(world, rng, zone_id, mob_id);
  }
}

fn resolve_mob_attack(world: &mut World, rng: &mut impl Rng, zone_id: &ZoneId, mob_id: MobInstanceId) {
  if let Some(mob) = world.zones.get_mut(zone_id).and_then(|z| z.active_mobs.get_mut(&mob_id)) {
    mob.autoattack_cooldown = AUTOATTACK_COOLDOWN;
  }

  let Some((snapshot, target, mob_loc)) = world.zones.get(zone_id).and_then(|z| z.active_mobs.get(&mob_id)).map(|m| {
    let snapshot = combat::AttackerSnapshot { name: m.name.clone(), atk_roll: m.atk_roll, dam_roll: m.dam_roll };
    (snapshot, m.targets.first().cloned(), m.loc.clone())
  }) else {
    return;
  };
  let Some(CombatantRef::Player(player_name)) = target else { return };
  let Some(defender) = world.users.get_mut(&player_name) else { return };

  let outcome = combat::resolve_autoattack(rng, &snapshot, defender);
  let (self_msg, observer_msg) = if outcome.hit {
    (
      format!("{} hits you for {} damage!", outcome.attacker_name, outcome.damage),
      format!("{} hits {} for {} damage!", outcome.attacker_name, outcome.defender_name, outcome.damage),
    )
  } else {
    (format!("{} misses you.", outcome.attacker_name), format!("{} misses {}.", outcome.attacker_name, outcome.defender_name))
  };
  if let Some(c) = world.users.get(&player_name) {
    c.tell(self_msg);
  }
  world.broadcast_room(zone_id, &mob_loc, Some(&player_name), &observer_msg);

  let dead = world.users.get(&player_name).map(|c| c.is_dead()).unwrap_or(false);
  if dead {
    death::player_death(world, &player_name);
  }
}

fn try_wander(world: &mut World, rng: &mut impl Rng, zone_id: &ZoneId, mob_id: MobInstanceId) {
  let loc = match world.zones.get(zone_id).and_then(|z| z.active_mobs.get(&mob_id)) {
    Some(m) => m.loc.clone(),
    None => return,
  };
  let candidates: Vec<_> = match world.zones.get(zone_id).and_then(|z| z.rooms.get(&loc)) {
    Some(room) if !room.exits.is_empty() => room.exits.values().cloned().collect(),
    _ => return,
  };
  let dest = &candidates[rng.gen_range(0..candidates.len())];
  if dest.dest_zone != *zone_id {
    return; // mobs never cross zones under wander AI
  }
  transfer::transfer_mob(world, zone_id, mob_id, dest.dest_room.clone());
}

fn advance_repop(world: &mut World, rng: &mut impl Rng, zone_id: &ZoneId) {
  let reached = match world.zones.get_mut(zone_id) {
    Some(zone) => {
      zone.repop_ctr += 1;
      if zone.repop_ctr >= zone.repop_time {
        zone.repop_ctr = rng.gen_range(-599..=600);
        true
      } else {
        false
      }
    }
    None => return,
  };
  if reached {
    do_repop(world, zone_id);
  }
}

fn do_repop(world: &mut World, zone_id: &ZoneId) {
  let Some((repop_msg, room_ids)) = world.zones.get(zone_id).map(|z| (z.repop_msg.clone(), z.rooms.keys().cloned().collect::<Vec<_>>())) else {
    return;
  };
  for room_id in &room_ids {
    world.broadcast_room(zone_id, room_id, None, &repop_msg);
  }

  let dead_ids: Vec<MobInstanceId> = match world.zones.get(zone_id) {
    Some(z) => z.dead_mobs.keys().copied().collect(),
    None => return,
  };
  for mob_id in dead_ids {
    let Some(zone) = world.zones.get_mut(zone_id) else { return };
    let Some(mut mob) = zone.dead_mobs.remove(&mob_id) else { continue };
    mob.hp_current = mob.hp_max;
    mob.mp_current = mob.mp_max;
    mob.loc = mob.start_loc.clone();
    let start_loc = mob.loc.clone();
    zone.active_mobs.insert(mob_id, mob);
    if let Some(room) = zone.rooms.get_mut(&start_loc) {
      room.mobs.push(mob_id);
    }
  }
}

// --- Step 3: player heal pass --------------------------------------------------

fn player_heal_pass(world: &mut World) {
  for c in world.users.values_mut() {
    c.hp_current = (c.hp_current + 5).min(c.hp_max);
    c.mp_current = (c.mp_current + 5).min(c.mp_max);
  }
}

// --- Step 4: player command pass --------------------------------------------------

fn player_command_pass(world: &mut World) {
  let mut rng = rand::thread_rng();
  let names: Vec<String> = world.users.keys().cloned().collect();
  for name in names {
    // the character may have quit/disconnected earlier in this same pass
    // (e.g. a QUIT command from a name earlier in iteration order)
    if !world.users.contains_key(&name) {
      continue;
    }

    let next_cmd = world.users.get_mut(&name).and_then(|c| c.incoming_cmds.pop_front());
    if let Some(line) = next_cmd {
      command::dispatch(world, &name, &line);
    }

    if !world.users.contains_key(&name) {
      continue; // QUIT handler just removed this character
    }

    let (has_target, cooldown) = match world.users.get(&name) {
      Some(c) => (!c.targets.is_empty(), c.autoattack_cooldown),
      None => continue,
    };
    if has_target {
      if cooldown <= 0 {
        resolve_player_attack(world, &mut rng, &name);
      } else if let Some(c) = world.users.get_mut(&name) {
        c.autoattack_cooldown -= 1;
      }
    }
  }
}

fn resolve_player_attack(world: &mut World, rng: &mut impl Rng, name: &str) {
  if let Some(c) = world.users.get_mut(name) {
    c.autoattack_cooldown = AUTOATTACK_COOLDOWN;
  }

  let Some((snapshot, target, zone_id, room_id)) = world.users.get(name).map(|c| {
    let snapshot = combat::AttackerSnapshot { name: c.name.clone(), atk_roll: c.atk_roll, dam_roll: c.dam_roll };
    (snapshot, c.targets.first().cloned(), c.zone.clone(), c.loc.clone())
  }) else {
    return;
  };
  let Some(CombatantRef::Mob(mob_zone, mob_id)) = target else { return };
  let Some(defender) = world.zones.get_mut(&mob_zone).and_then(|z| z.active_mobs.get_mut(&mob_id)) else { return };

  let outcome = combat::resolve_autoattack(rng, &snapshot, defender);
  let (self_msg, observer_msg) = if outcome.hit {
    (
      format!("You hit {} for {} damage!", outcome.defender_name, outcome.damage),
      format!("{} hits {} for {} damage!", outcome.attacker_name, outcome.defender_name, outcome.damage),
    )
  } else {
    (format!("You miss {}.", outcome.defender_name), format!("{} misses {}.", outcome.attacker_name, outcome.defender_name))
  };
  if let Some(c) = world.users.get(name) {
    c.tell(self_msg);
  }
  world.broadcast_room(&zone_id, &room_id, Some(name), &observer_msg);

  let dead = world
    .zones
    .get(&mob_zone)
    .and_then(|z| z.active_mobs.get(&mob_id))
    .map(|m| m.is_dead())
    .unwrap_or(false);
  if dead {
    death::mob_death(world, &mob_zone, mob_id);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    character::{Character, CharacterSheet, Position},
    combat::CombatantRef,
    ids::{ItemId, RoomId},
    item::ItemTemplateList,
    mob::MobInstance,
    net::Intake,
    room::Room,
    zone::Zone,
  };
  use std::{collections::HashMap, sync::Arc};

  /// One zone, one room, one player and one mob both already targeting
  /// each other, so a tick's mob pass and player command pass both resolve
  /// an autoattack.
  fn combat_world() -> World {
    let intake = Intake::new();
    let room = Room {
      id: RoomId("r1".into()),
      zone: ZoneId("z1".into()),
      name: "Arena".into(),
      desc: "A dirt ring.".into(),
      exits: HashMap::new(),
      items: Vec::new(),
      mobs: vec![1],
      players: vec!["Alice".into()],
    };
    let mut rooms = HashMap::new();
    rooms.insert(RoomId("r1".into()), room);

    let mut mob = MobInstance {
      instance_id: 1,
      template_id: crate::ids::MobTemplateId("rat".into()),
      name: "a rat".into(),
      keywords: vec!["rat".into()],
      desc: "A rat.".into(),
      zone: ZoneId("z1".into()),
      loc: RoomId("r1".into()),
      start_loc: RoomId("r1".into()),
      hp_current: 20,
      hp_max: 20,
      mp_current: 0,
      mp_max: 0,
      atk_roll: 50,
      dam_roll: 5,
      autoattack_cooldown: 0,
      targets: vec![CombatantRef::Player("Alice".into())],
    };
    mob.autoattack_cooldown = 0;
    let mut active_mobs = HashMap::new();
    active_mobs.insert(1, mob);

    let mut zones = HashMap::new();
    zones.insert(
      ZoneId("z1".into()),
      Zone { id: ZoneId("z1".into()), name: "Zone One".into(), rooms, repop_time: 500, repop_ctr: 0, repop_msg: "Life stirs.".into(), active_mobs, dead_mobs: HashMap::new() },
    );

    let item_templates: ItemTemplateList = HashMap::new();
    let config = Arc::new(crate::config::Config::default());
    let mut world = World::new(
      zones,
      item_templates,
      config,
      intake.connections_rx,
      intake.control_tx,
      intake.control_rx,
      intake.input_tx,
      intake.input_rx,
    );

    let (tx, _rx) = crossbeam_channel::unbounded();
    let sheet = CharacterSheet {
      name: "Alice".into(),
      desc: "Alice.".into(),
      zone: ZoneId("z1".into()),
      loc: RoomId("r1".into()),
      position: Position::Fighting,
      hp_current: 50,
      hp_max: 50,
      mp_current: 50,
      mp_max: 50,
      atk_roll: 50,
      dam_roll: 5,
      inventory: vec![crate::item::Item { id: ItemId("sword".into()), name: "a sword".into(), keywords: vec!["sword".into()], desc: "Sharp.".into() }],
    };
    let mut alice = Character::from_sheet(sheet, tx);
    alice.targets.push(CombatantRef::Mob(ZoneId("z1".into()), 1));
    world.users.insert("Alice".into(), alice);
    world
  }

  #[test]
  fn mob_pass_attacks_a_targeted_player_and_resets_cooldown() {
    let mut world = combat_world();
    mob_pass(&mut world, false);
    let alice = world.users.get("Alice").unwrap();
    // atk_roll 50 vs defense 0 means tn=99, r in 50..=149 always <= 99 only
    // sometimes; just assert the cooldown reset fired, which is unconditional.
    let mob = world.zones.get(&ZoneId("z1".into())).unwrap().active_mobs.get(&1).unwrap();
    assert_eq!(mob.autoattack_cooldown, AUTOATTACK_COOLDOWN);
    let _ = alice.hp_current; // may or may not have dropped depending on the roll
  }

  #[test]
  fn player_command_pass_resolves_autoattack_against_targeted_mob() {
    let mut world = combat_world();
    player_command_pass(&mut world);
    let alice = world.users.get("Alice").unwrap();
    assert_eq!(alice.autoattack_cooldown, AUTOATTACK_COOLDOWN);
  }

  #[test]
  fn heal_tick_restores_hp_and_mp_up_to_max() {
    let mut world = combat_world();
    if let Some(c) = world.users.get_mut("Alice") {
      c.hp_current = 10;
      c.mp_current = 10;
    }
    player_heal_pass(&mut world);
    let alice = world.users.get("Alice").unwrap();
    assert_eq!(alice.hp_current, 15);
    assert_eq!(alice.mp_current, 15);
  }

  #[test]
  fn heal_tick_never_exceeds_max() {
    let mut world = combat_world();
    player_heal_pass(&mut world);
    let alice = world.users.get("Alice").unwrap();
    assert_eq!(alice.hp_current, 50);
    assert_eq!(alice.mp_current, 50);
  }

  #[test]
  fn repop_restores_dead_mobs_to_full_health_at_start_loc() {
    let mut world = combat_world();
    let zone = world.zones.get_mut(&ZoneId("z1".into())).unwrap();
    let mut dead = zone.active_mobs.remove(&1).unwrap();
    dead.hp_current = 0;
    zone.dead_mobs.insert(1, dead);
    zone.repop_ctr = zone.repop_time;

    let mut rng = rand::thread_rng();
    advance_repop(&mut world, &mut rng, &ZoneId("z1".into()));

    let zone = world.zones.get(&ZoneId("z1".into())).unwrap();
    assert!(zone.dead_mobs.is_empty());
    let mob = zone.active_mobs.get(&1).unwrap();
    assert_eq!(mob.hp_current, mob.hp_max);
    assert_eq!(mob.loc, RoomId("r1".into()));
  }

  #[test]
  fn tick_once_drains_a_queued_command_for_the_player() {
    let mut world = combat_world();
    world.users.get_mut("Alice").unwrap().incoming_cmds.push_back("look".to_string());
    tick_once(&mut world);
    assert!(world.users.get("Alice").unwrap().incoming_cmds.is_empty());
  }
}
