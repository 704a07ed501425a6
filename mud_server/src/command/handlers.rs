//! Command handlers (spec.md §4.6). Each function emits output exclusively
//! via a character's response channel or the world's room-broadcast helper,
//! and (except a successful GO, which defers to its implicit LOOK) finishes
//! by sending the HP/MP prompt.

use super::parser::Token;
use crate::{
  character::Position,
  combat::{Combatant, CombatantRef},
  ids::ItemId,
  room::Direction,
  world::{transfer, World},
};

/// Runs LOOK's no-argument room description plus the prompt, the same
/// sequence used for a successful GO and for the implicit LOOK after login
/// and after death (spec.md §4.2, §4.3, §4.5).
pub(crate) fn implicit_look(world: &mut World, name: &str) {
  if let Some(text) = world.look_room_text(name) {
    if let Some(c) = world.users.get(name) {
      c.tell(text);
    }
  }
  world.send_prompt(name);
}

pub fn unknown(world: &mut World, name: &str) {
  if let Some(c) = world.users.get(name) {
    c.tell("Huh? You don't understand that command.");
  }
  world.send_prompt(name);
}

// --- LOOK --------------------------------------------------------------

pub fn look(world: &mut World, name: &str, args: &[Token]) {
  let first_word = match args.first() {
    None | Some(Token::Here) => {
      implicit_look(world, name);
      return;
    }
    Some(Token::Me) => {
      if let Some(c) = world.users.get(name) {
        c.tell(c.desc.clone());
      }
      world.send_prompt(name);
      return;
    }
    Some(Token::Ident(w)) => w.clone(),
    Some(_) => {
      if let Some(c) = world.users.get(name) {
        c.tell("You don't see that here.");
      }
      world.send_prompt(name);
      return;
    }
  };

  let desc = find_desc(world, name, &first_word);
  if let Some(c) = world.users.get(name) {
    match desc {
      Some(d) => c.tell(d),
      None => c.tell(format!("You don't see \"{first_word}\" here.")),
    }
  }
  world.send_prompt(name);
}

/// Searches, in order, inventory, room contents, room PCs, room mobs
/// (spec.md §4.6's LOOK `<word>` rule), returning the first match's Desc.
fn find_desc(world: &World, name: &str, word: &str) -> Option<String> {
  let c = world.users.get(name)?;
  if let Some(item) = c.find_item(word) {
    return Some(item.desc.clone());
  }
  let zone = world.zones.get(&c.zone)?;
  let room = zone.rooms.get(&c.loc)?;
  if let Some(item) = room.find_item(word) {
    return Some(item.desc.clone());
  }
  for other in &room.players {
    if other != name && other.to_lowercase().starts_with(&word.to_lowercase()) {
      return world.users.get(other).map(|oc| oc.desc.clone());
    }
  }
  for mob_id in &room.mobs {
    if let Some(mob) = zone.active_mobs.get(mob_id) {
      if mob.matches(word) {
        return Some(mob.desc.clone());
      }
    }
  }
  None
}

// --- GO ------------------------------------------------------------------

/// GO with an explicit argument (`go north`), as opposed to the bare
/// direction word shortcut (spec.md §4.6: "direction verbs ... are treated
/// as an implicit GO <dir>").
pub fn go_from_tokens(world: &mut World, name: &str, args: &[Token]) {
  let word = match args.first() {
    Some(Token::Ident(w)) => w.clone(),
    _ => {
      if let Some(c) = world.users.get(name) {
        c.tell("Go where?");
      }
      world.send_prompt(name);
      return;
    }
  };
  match Direction::parse_prefix(&word) {
    Some(dir) => go(world, name, dir),
    None => {
      if let Some(c) = world.users.get(name) {
        c.tell("That's not a direction.");
      }
      world.send_prompt(name);
    }
  }
}

/// Moves `name` through `dir`, if standing and an exit exists (spec.md
/// §4.5). On success, defers the prompt to the implicit LOOK; on failure,
/// reports the error and sends the prompt itself.
pub fn go(world: &mut World, name: &str, dir: Direction) {
  let Some(c) = world.users.get(name) else { return };
  if c.position != Position::Standing {
    c.tell("You can't do that right now.");
    world.send_prompt(name);
    return;
  }
  let (zone_id, room_id) = (c.zone.clone(), c.loc.clone());
  let dest = world.zones.get(&zone_id).and_then(|z| z.rooms.get(&room_id)).and_then(|r| r.exits.get(&dir)).cloned();

  let Some(dest) = dest else {
    if let Some(c) = world.users.get(name) {
      c.tell("You can't go that way.");
    }
    world.send_prompt(name);
    return;
  };

  transfer::transfer_player(world, name, dest.dest_zone, dest.dest_room, true);
  implicit_look(world, name);
}

// --- GET / DROP ------------------------------------------------------------

fn ident_arg(args: &[Token]) -> Option<&str> {
  args.iter().find_map(|t| match t {
    Token::Ident(w) => Some(w.as_str()),
    _ => None,
  })
}

pub fn get(world: &mut World, name: &str, args: &[Token]) {
  let Some(word) = ident_arg(args) else {
    if let Some(c) = world.users.get(name) {
      c.tell("Get what?");
    }
    world.send_prompt(name);
    return;
  };

  let (zone_id, room_id) = match world.users.get(name) {
    Some(c) => (c.zone.clone(), c.loc.clone()),
    None => return,
  };
  let item_id: Option<ItemId> = world
    .zones
    .get(&zone_id)
    .and_then(|z| z.rooms.get(&room_id))
    .and_then(|r| r.find_item(word))
    .map(|i| i.id.clone());

  let Some(item_id) = item_id else {
    if let Some(c) = world.users.get(name) {
      c.tell(format!("You don't see \"{word}\" here."));
    }
    world.send_prompt(name);
    return;
  };

  let item = world.zones.get_mut(&zone_id).and_then(|z| z.rooms.get_mut(&room_id)).and_then(|r| r.take_item(&item_id));
  let Some(item) = item else { return };

  let item_name = item.name.clone();
  if let Some(c) = world.users.get_mut(name) {
    c.tell(format!("You pick up {item_name}."));
    c.inventory.push(item);
  }
  world.broadcast_room(&zone_id, &room_id, Some(name), &format!("{name} picks up {item_name}."));
  world.send_prompt(name);
}

pub fn drop(world: &mut World, name: &str, args: &[Token]) {
  let Some(word) = ident_arg(args) else {
    if let Some(c) = world.users.get(name) {
      c.tell("Drop what?");
    }
    world.send_prompt(name);
    return;
  };

  let item_id: Option<ItemId> = world.users.get(name).and_then(|c| c.find_item(word)).map(|i| i.id.clone());
  let Some(item_id) = item_id else {
    if let Some(c) = world.users.get(name) {
      c.tell(format!("You don't have \"{word}\"."));
    }
    world.send_prompt(name);
    return;
  };

  let (zone_id, room_id, item) = match world.users.get_mut(name) {
    Some(c) => {
      let item = c.take_item(&item_id);
      (c.zone.clone(), c.loc.clone(), item)
    }
    None => return,
  };
  let Some(item) = item else { return };

  let item_name = item.name.clone();
  if let Some(c) = world.users.get(name) {
    c.tell(format!("You drop {item_name} on the ground."));
  }
  if let Some(room) = world.zones.get_mut(&zone_id).and_then(|z| z.rooms.get_mut(&room_id)) {
    room.items.push(item);
  }
  world.broadcast_room(&zone_id, &room_id, Some(name), &format!("{name} drops {item_name} on the ground."));
  world.send_prompt(name);
}

// --- INVENTORY ------------------------------------------------------------

pub fn inventory(world: &mut World, name: &str) {
  if let Some(c) = world.users.get(name) {
    if c.inventory.is_empty() {
      c.tell("You aren't carrying anything.");
    } else {
      let names: Vec<_> = c.inventory.iter().map(|i| i.name.as_str()).collect();
      c.tell(format!("You are carrying: {}.", names.join(", ")));
    }
  }
  world.send_prompt(name);
}

// --- SAY / TELL ------------------------------------------------------------

pub fn say(world: &mut World, name: &str, rest: &str) {
  if rest.is_empty() {
    if let Some(c) = world.users.get(name) {
      c.tell("Say what?");
    }
    world.send_prompt(name);
    return;
  }
  let (zone_id, room_id) = match world.users.get(name) {
    Some(c) => (c.zone.clone(), c.loc.clone()),
    None => return,
  };
  if let Some(c) = world.users.get(name) {
    c.tell(format!("You say, '{rest}'"));
  }
  world.broadcast_room(&zone_id, &room_id, Some(name), &format!("{name} says, '{rest}'"));
  world.send_prompt(name);
}

pub fn tell(world: &mut World, name: &str, rest: &str) {
  let (target_word, message) = match rest.split_once(' ') {
    Some((t, m)) => (t, m.trim_start()),
    None => (rest, ""),
  };
  if target_word.is_empty() || message.is_empty() {
    if let Some(c) = world.users.get(name) {
      c.tell("Tell whom what?");
    }
    world.send_prompt(name);
    return;
  }

  let target_lower = target_word.to_lowercase();
  let target = world.users.keys().find(|n| n.to_lowercase().starts_with(&target_lower) && n.as_str() != name).cloned();

  match target {
    Some(target) => {
      if let Some(c) = world.users.get(&target) {
        c.tell(format!("{name} tells you, '{message}'"));
      }
      if let Some(c) = world.users.get(name) {
        c.tell(format!("You tell {target}, '{message}'"));
      }
    }
    None => {
      if let Some(c) = world.users.get(name) {
        c.tell(format!("No one by the name \"{target_word}\" is here."));
      }
    }
  }
  world.send_prompt(name);
}

// --- QUIT / SAVE ------------------------------------------------------------

pub fn quit(world: &mut World, name: &str) {
  if let Some(c) = world.users.get(name) {
    c.tell("Goodnight.");
  }
  world.quit_character(name);
}

pub fn save(world: &mut World, name: &str) {
  let sheet = match world.users.get(name) {
    Some(c) => c.to_sheet(),
    None => return,
  };
  match crate::persist::save_character(&sheet, &world.config.chara_dir) {
    Ok(()) => {
      if let Some(c) = world.users.get(name) {
        c.tell("Saved.");
      }
    }
    Err(e) => {
      warn!("save failed for {}: {}", name, e);
      if let Some(c) = world.users.get(name) {
        c.tell("Your character could not be saved.");
      }
    }
  }
  world.send_prompt(name);
}

// --- KILL ------------------------------------------------------------------

pub fn kill(world: &mut World, name: &str, args: &[Token]) {
  let Some(word) = ident_arg(args) else {
    if let Some(c) = world.users.get(name) {
      c.tell("Kill what?");
    }
    world.send_prompt(name);
    return;
  };

  let (zone_id, room_id) = match world.users.get(name) {
    Some(c) => (c.zone.clone(), c.loc.clone()),
    None => return,
  };
  let mob_id = world.zones.get(&zone_id).and_then(|z| z.rooms.get(&room_id)).and_then(|r| {
    r.mobs.iter().find(|id| z_mob_matches(world, &zone_id, **id, word)).copied()
  });

  let Some(mob_id) = mob_id else {
    if let Some(c) = world.users.get(name) {
      c.tell(format!("You don't see \"{word}\" here."));
    }
    world.send_prompt(name);
    return;
  };

  if let Some(c) = world.users.get_mut(name) {
    c.enter_combat(CombatantRef::Mob(zone_id.clone(), mob_id));
  }
  if let Some(mob) = world.zones.get_mut(&zone_id).and_then(|z| z.active_mobs.get_mut(&mob_id)) {
    mob.enter_combat(CombatantRef::Player(name.to_string()));
  }

  let mob_name = world.zones.get(&zone_id).and_then(|z| z.active_mobs.get(&mob_id)).map(|m| m.name.clone()).unwrap_or_default();
  if let Some(c) = world.users.get(name) {
    c.tell(format!("You attack {mob_name}!"));
  }
  world.broadcast_room(&zone_id, &room_id, Some(name), &format!("{name} attacks {mob_name}!"));
  world.send_prompt(name);
}

fn z_mob_matches(world: &World, zone_id: &crate::ids::ZoneId, mob_id: crate::ids::MobInstanceId, word: &str) -> bool {
  world.zones.get(zone_id).and_then(|z| z.active_mobs.get(&mob_id)).map(|m| m.matches(word)).unwrap_or(false)
}
