//! Death handling for mobs and players (spec.md §4.3).

use crate::{
  combat::CombatantRef,
  ids::{MobInstanceId, RoomId, ZoneId},
  world::{transfer, World},
};

/// Mob death sequence: scrub this mob from every present player's targets,
/// broadcast the death line, and move it from `ActiveMobs` to `DeadMobs`
/// (repop later moves it back).
pub fn mob_death(world: &mut World, zone_id: &ZoneId, mob_id: MobInstanceId) {
  let Some(room_id) = world.zones.get(zone_id).and_then(|z| z.active_mobs.get(&mob_id)).map(|m| m.loc.clone()) else {
    return;
  };
  let name = world
    .zones
    .get(zone_id)
    .and_then(|z| z.active_mobs.get(&mob_id))
    .map(|m| m.name.clone())
    .unwrap_or_default();

  transfer::scrub_from_room(world, zone_id, &room_id, &CombatantRef::Mob(zone_id.clone(), mob_id));

  if let Some(zone) = world.zones.get_mut(zone_id) {
    if let Some(room) = zone.rooms.get_mut(&room_id) {
      room.remove_mob(mob_id);
    }
  }

  world.broadcast_room(zone_id, &room_id, None, &format!("{name} falls over dead!"));

  if let Some(zone) = world.zones.get_mut(zone_id) {
    if let Some(mut mob) = zone.active_mobs.remove(&mob_id) {
      mob.targets.clear();
      zone.dead_mobs.insert(mob_id, mob);
    }
  }
}

/// Player death sequence: scrub from every present mob's targets, narrate,
/// restore half HP, and respawn without directional narration (spec.md
/// §4.3's `announce = false` mode of TransferPlayer), followed by an
/// implicit LOOK.
pub fn player_death(world: &mut World, name: &str) {
  let Some(c) = world.users.get(name) else { return };
  let (zone_id, room_id, hp_max) = (c.zone.clone(), c.loc.clone(), c.hp_max);

  transfer::scrub_from_room(world, &zone_id, &room_id, &CombatantRef::Player(name.to_string()));

  if let Some(c) = world.users.get_mut(name) {
    c.targets.clear();
  }

  if let Some(c) = world.users.get(name) {
    c.tell("You have been slain!");
  }
  world.broadcast_room(&zone_id, &room_id, Some(name), &format!("{name} has been slain!"));

  if let Some(c) = world.users.get_mut(name) {
    c.hp_current = hp_max / 2;
  }

  let (respawn_zone, respawn_room) = (world.config.respawn_zone.clone(), world.config.respawn_room.clone());
  transfer::transfer_player(world, name, ZoneId(respawn_zone), RoomId(respawn_room), false);

  if let Some(text) = world.look_room_text(name) {
    if let Some(c) = world.users.get(name) {
      c.tell(text);
    }
  }
  world.send_prompt(name);
}
