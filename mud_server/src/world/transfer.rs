//! TransferPlayer / TransferMob (spec.md §4.5).

use crate::{
  character::Position,
  combat::CombatantRef,
  ids::{MobInstanceId, RoomId, ZoneId},
  room::Direction,
  world::World,
};

const MYSTERIOUS: &str = "somewhere mysterious";

fn direction_label(dir: Direction) -> String {
  match dir {
    Direction::Up => "above".to_string(),
    Direction::Down => "below".to_string(),
    other => format!("the {}", other.name()),
  }
}

/// Finds the exit out of `(zone_id, room_id)` whose destination is
/// `(target_zone, target_room)`, for narration purposes (spec.md §4.5's
/// "directional tie-break").
fn find_exit_direction(
  world: &World,
  zone_id: &ZoneId,
  room_id: &RoomId,
  target_zone: &ZoneId,
  target_room: &RoomId,
) -> Option<Direction> {
  let room = world.zones.get(zone_id)?.rooms.get(room_id)?;
  room
    .exits
    .iter()
    .find(|(_, dest)| &dest.dest_zone == target_zone && &dest.dest_room == target_room)
    .map(|(dir, _)| *dir)
}

/// Removes `who` from the targets of every mob and player present in
/// `zone_id`/`room_id`, clearing `FIGHTING` position on any player left with
/// no targets. Guarantees invariant 6: no dangling Combatant reference
/// survives a move (spec.md §3, §4.3).
pub(crate) fn scrub_from_room(world: &mut World, zone_id: &ZoneId, room_id: &RoomId, who: &CombatantRef) {
  let mob_ids = world
    .zones
    .get(zone_id)
    .and_then(|z| z.rooms.get(room_id))
    .map(|r| r.mobs.clone())
    .unwrap_or_default();
  if let Some(zone) = world.zones.get_mut(zone_id) {
    for id in mob_ids {
      if let Some(mob) = zone.active_mobs.get_mut(&id) {
        mob.targets.retain(|t| t != who);
      }
    }
  }

  let player_names = world
    .zones
    .get(zone_id)
    .and_then(|z| z.rooms.get(room_id))
    .map(|r| r.players.clone())
    .unwrap_or_default();
  for name in player_names {
    if let Some(c) = world.users.get_mut(&name) {
      c.targets.retain(|t| t != who);
      if c.targets.is_empty() && c.position == Position::Fighting {
        c.position = Position::Standing;
      }
    }
  }
}

/// Moves `name` from its current room to `(dest_zone, dest_room)`. When
/// `announce` is true, narrates the departure and arrival to both rooms
/// (spec.md §4.5 step 2); player death respawn passes `announce = false`.
pub fn transfer_player(world: &mut World, name: &str, dest_zone: ZoneId, dest_room: RoomId, announce: bool) {
  let (src_zone, src_room) = match world.users.get(name) {
    Some(c) => (c.zone.clone(), c.loc.clone()),
    None => return,
  };

  scrub_from_room(world, &src_zone, &src_room, &CombatantRef::Player(name.to_string()));
  if let Some(c) = world.users.get_mut(name) {
    c.targets.clear();
    if c.position == Position::Fighting {
      c.position = Position::Standing;
    }
  }

  if announce {
    let leave_dir = find_exit_direction(world, &src_zone, &src_room, &dest_zone, &dest_room)
      .map(direction_label)
      .unwrap_or_else(|| MYSTERIOUS.to_string());
    world.broadcast_room(&src_zone, &src_room, Some(name), &format!("{name} leaves for {leave_dir}."));
    if let Some(c) = world.users.get(name) {
      c.tell(format!("You leave for {leave_dir}."));
    }

    let arrive_dir = find_exit_direction(world, &dest_zone, &dest_room, &src_zone, &src_room)
      .map(direction_label)
      .unwrap_or_else(|| MYSTERIOUS.to_string());
    world.broadcast_room(&dest_zone, &dest_room, None, &format!("{name} arrives from {arrive_dir}."));
  }

  if let Some(zone) = world.zones.get_mut(&src_zone) {
    if let Some(room) = zone.rooms.get_mut(&src_room) {
      room.remove_player(name);
    }
  }
  if let Some(zone) = world.zones.get_mut(&dest_zone) {
    if let Some(room) = zone.rooms.get_mut(&dest_room) {
      room.players.push(name.to_string());
    }
  }
  if let Some(c) = world.users.get_mut(name) {
    c.zone = dest_zone;
    c.loc = dest_room;
  }
}

/// Moves a mob within its zone (mobs never cross zones, spec.md §3).
pub fn transfer_mob(world: &mut World, zone_id: &ZoneId, mob_id: MobInstanceId, dest_room: RoomId) {
  let src_room = match world.zones.get(zone_id).and_then(|z| z.active_mobs.get(&mob_id)) {
    Some(m) => m.loc.clone(),
    None => return,
  };

  let who = CombatantRef::Mob(zone_id.clone(), mob_id);
  scrub_from_room(world, zone_id, &src_room, &who);
  if let Some(mob) = world.zones.get_mut(zone_id).and_then(|z| z.active_mobs.get_mut(&mob_id)) {
    mob.targets.clear();
  }

  let name = world
    .zones
    .get(zone_id)
    .and_then(|z| z.active_mobs.get(&mob_id))
    .map(|m| m.name.clone())
    .unwrap_or_default();

  let leave_dir = find_exit_direction(world, zone_id, &src_room, zone_id, &dest_room)
    .map(direction_label)
    .unwrap_or_else(|| MYSTERIOUS.to_string());
  world.broadcast_room(zone_id, &src_room, None, &format!("{name} leaves for {leave_dir}."));

  let arrive_dir = find_exit_direction(world, zone_id, &dest_room, zone_id, &src_room)
    .map(direction_label)
    .unwrap_or_else(|| MYSTERIOUS.to_string());
  world.broadcast_room(zone_id, &dest_room, None, &format!("{name} arrives from {arrive_dir}."));

  if let Some(zone) = world.zones.get_mut(zone_id) {
    if let Some(room) = zone.rooms.get_mut(&src_room) {
      room.remove_mob(mob_id);
    }
    if let Some(room) = zone.rooms.get_mut(&dest_room) {
      room.mobs.push(mob_id);
    }
    if let Some(mob) = zone.active_mobs.get_mut(&mob_id) {
      mob.loc = dest_room;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    character::{Character, CharacterSheet, Position},
    item::ItemTemplateList,
    net::Intake,
    room::{Room, TransDest},
    zone::Zone,
  };
  use std::{collections::HashMap, sync::Arc};

  fn two_room_world() -> World {
    let intake = Intake::new();
    let mut r1 = Room {
      id: RoomId("r1".into()),
      zone: ZoneId("z1".into()),
      name: "Room One".into(),
      desc: "".into(),
      exits: HashMap::new(),
      items: Vec::new(),
      mobs: Vec::new(),
      players: vec!["Alice".into()],
    };
    let r2 = Room {
      id: RoomId("r2".into()),
      zone: ZoneId("z1".into()),
      name: "Room Two".into(),
      desc: "".into(),
      exits: HashMap::new(),
      items: Vec::new(),
      mobs: Vec::new(),
      players: Vec::new(),
    };
    r1.exits.insert(
      Direction::East,
      TransDest { dest_zone: ZoneId("z1".into()), dest_room: RoomId("r2".into()), is_locked: false, lock_key: None, needs_flying: false },
    );
    let mut rooms = HashMap::new();
    rooms.insert(RoomId("r1".into()), r1);
    rooms.insert(RoomId("r2".into()), r2);

    let mut zones = HashMap::new();
    zones.insert(
      ZoneId("z1".into()),
      Zone { id: ZoneId("z1".into()), name: "Zone One".into(), rooms, repop_time: 100, repop_ctr: 0, repop_msg: "".into(), active_mobs: HashMap::new(), dead_mobs: HashMap::new() },
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
      desc: "".into(),
      zone: ZoneId("z1".into()),
      loc: RoomId("r1".into()),
      position: Position::Fighting,
      hp_current: 50,
      hp_max: 50,
      mp_current: 50,
      mp_max: 50,
      atk_roll: 0,
      dam_roll: 5,
      inventory: Vec::new(),
    };
    let mut alice = Character::from_sheet(sheet, tx);
    alice.targets.push(CombatantRef::Mob(ZoneId("z1".into()), 1));
    world.users.insert("Alice".into(), alice);
    world
  }

  #[test]
  fn transfer_player_moves_rooms_and_clears_combat_state() {
    let mut world = two_room_world();
    transfer_player(&mut world, "Alice", ZoneId("z1".into()), RoomId("r2".into()), true);

    let alice = world.users.get("Alice").unwrap();
    assert_eq!(alice.loc, RoomId("r2".into()));
    assert_eq!(alice.position, Position::Standing);
    assert!(alice.targets.is_empty());

    let r1 = world.zones.get(&ZoneId("z1".into())).unwrap().rooms.get(&RoomId("r1".into())).unwrap();
    assert!(!r1.players.contains(&"Alice".to_string()));
    let r2 = world.zones.get(&ZoneId("z1".into())).unwrap().rooms.get(&RoomId("r2".into())).unwrap();
    assert!(r2.players.contains(&"Alice".to_string()));
  }

  #[test]
  fn scrub_from_room_removes_dangling_target_references() {
    let mut world = two_room_world();
    scrub_from_room(&mut world, &ZoneId("z1".into()), &RoomId("r1".into()), &CombatantRef::Mob(ZoneId("z1".into()), 1));
    let alice = world.users.get("Alice").unwrap();
    assert!(alice.targets.is_empty());
    assert_eq!(alice.position, Position::Standing);
  }

  #[test]
  fn find_exit_direction_resolves_the_named_exit() {
    let world = two_room_world();
    let dir = find_exit_direction(&world, &ZoneId("z1".into()), &RoomId("r1".into()), &ZoneId("z1".into()), &RoomId("r2".into()));
    assert_eq!(dir, Some(Direction::East));
  }
}
