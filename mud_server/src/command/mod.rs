//! The command interpreter (spec.md §4.6): resolves one input line into a
//! handler call against the live [`World`], per the player-command pass
//! (spec.md §4.2 step 4). Every handler here completes within the tick that
//! invokes it; none of them suspend or perform unbounded I/O.

pub mod handlers;
pub mod parser;

use crate::world::World;
use parser::{parse, Resolved};

/// Parses `line` and dispatches it for `name` against `world`. Errors in
/// user input (unknown verb, bad argument) are reported to the player and do
/// not change any state (spec.md §7); this function itself never fails.
pub fn dispatch(world: &mut World, name: &str, line: &str) {
  let parsed = parse(line);
  match parsed.resolved {
    Resolved::Direction(dir) => handlers::go(world, name, dir),
    Resolved::Verb(verb) => match verb {
      parser::Verb::Look => handlers::look(world, name, &parsed.tokens),
      parser::Verb::Go => handlers::go_from_tokens(world, name, &parsed.tokens),
      parser::Verb::Get => handlers::get(world, name, &parsed.tokens),
      parser::Verb::Drop => handlers::drop(world, name, &parsed.tokens),
      parser::Verb::Inventory => handlers::inventory(world, name),
      parser::Verb::Say => handlers::say(world, name, &parsed.rest),
      parser::Verb::Tell => handlers::tell(world, name, &parsed.rest),
      parser::Verb::Quit => handlers::quit(world, name),
      parser::Verb::Kill => handlers::kill(world, name, &parsed.tokens),
      parser::Verb::Save => handlers::save(world, name),
    },
    Resolved::Unknown => handlers::unknown(world, name),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{character::Character, ids::ZoneId, item::ItemTemplateList, net::Intake, room::Room, world::World, zone::Zone};
  use std::collections::HashMap;

  /// Builds a minimal two-room world (z1: r1 <-> r2 via east/west) with one
  /// logged-in character at r1, for exercising command handlers without a
  /// socket. Returns the world plus the character's response receiver.
  fn test_world() -> (World, crossbeam_channel::Receiver<String>) {
    let intake = Intake::new();
    let mut zones = HashMap::new();

    let mut r1 = Room {
      id: crate::ids::RoomId("r1".into()),
      zone: ZoneId("z1".into()),
      name: "Room One".into(),
      desc: "The first room.".into(),
      exits: HashMap::new(),
      items: Vec::new(),
      mobs: Vec::new(),
      players: Vec::new(),
    };
    let mut r2 = Room {
      id: crate::ids::RoomId("r2".into()),
      zone: ZoneId("z1".into()),
      name: "Room Two".into(),
      desc: "The second room.".into(),
      exits: HashMap::new(),
      items: Vec::new(),
      mobs: Vec::new(),
      players: Vec::new(),
    };
    r1.exits.insert(
      crate::room::Direction::East,
      crate::room::TransDest {
        dest_zone: ZoneId("z1".into()),
        dest_room: crate::ids::RoomId("r2".into()),
        is_locked: false,
        lock_key: None,
        needs_flying: false,
      },
    );
    r2.exits.insert(
      crate::room::Direction::West,
      crate::room::TransDest {
        dest_zone: ZoneId("z1".into()),
        dest_room: crate::ids::RoomId("r1".into()),
        is_locked: false,
        lock_key: None,
        needs_flying: false,
      },
    );
    r1.items.push(crate::item::Item {
      id: crate::ids::ItemId("sword".into()),
      name: "a sword".into(),
      keywords: vec!["sword".into()],
      desc: "A sharp sword.".into(),
    });

    let mut rooms = HashMap::new();
    rooms.insert(crate::ids::RoomId("r1".into()), r1);
    rooms.insert(crate::ids::RoomId("r2".into()), r2);
    zones.insert(
      ZoneId("z1".into()),
      Zone {
        id: ZoneId("z1".into()),
        name: "Zone One".into(),
        rooms,
        repop_time: 1000,
        repop_ctr: 0,
        repop_msg: "Life returns.".into(),
        active_mobs: HashMap::new(),
        dead_mobs: HashMap::new(),
      },
    );

    let item_templates: ItemTemplateList = HashMap::new();
    let config = std::sync::Arc::new(crate::config::Config::default());
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

    let (tx, rx) = crossbeam_channel::unbounded();
    let sheet = crate::character::CharacterSheet {
      name: "Alice".into(),
      desc: "Alice, a test adventurer.".into(),
      zone: ZoneId("z1".into()),
      loc: crate::ids::RoomId("r1".into()),
      position: crate::character::Position::Standing,
      hp_current: 100,
      hp_max: 100,
      mp_current: 100,
      mp_max: 100,
      atk_roll: 0,
      dam_roll: 5,
      inventory: Vec::new(),
    };
    world.users.insert("Alice".into(), Character::from_sheet(sheet, tx));
    world.zones.get_mut(&ZoneId("z1".into())).unwrap().rooms.get_mut(&crate::ids::RoomId("r1".into())).unwrap().players.push("Alice".into());

    (world, rx)
  }

  fn drain(rx: &crossbeam_channel::Receiver<String>) -> Vec<String> { rx.try_iter().collect() }

  #[test]
  fn look_with_no_argument_describes_the_room() {
    let (mut world, rx) = test_world();
    dispatch(&mut world, "Alice", "look");
    let out = drain(&rx).join("\n");
    assert!(out.contains("Room One"));
    assert!(out.contains("Exits: east"));
    assert!(out.contains("a sword"));
  }

  #[test]
  fn go_moves_the_player_and_updates_location() {
    let (mut world, rx) = test_world();
    dispatch(&mut world, "Alice", "east");
    assert_eq!(world.users.get("Alice").unwrap().loc, crate::ids::RoomId("r2".into()));
    let out = drain(&rx).join("\n");
    assert!(out.contains("Room Two"));
  }

  #[test]
  fn go_direction_with_no_exit_reports_failure_and_does_not_move() {
    let (mut world, rx) = test_world();
    dispatch(&mut world, "Alice", "north");
    assert_eq!(world.users.get("Alice").unwrap().loc, crate::ids::RoomId("r1".into()));
    let out = drain(&rx).join("\n");
    assert!(out.contains("can't go that way"));
  }

  #[test]
  fn get_and_drop_round_trip_an_item() {
    let (mut world, _rx) = test_world();
    dispatch(&mut world, "Alice", "get sword");
    assert_eq!(world.users.get("Alice").unwrap().inventory.len(), 1);
    assert!(world.zones.get(&ZoneId("z1".into())).unwrap().rooms.get(&crate::ids::RoomId("r1".into())).unwrap().items.is_empty());

    dispatch(&mut world, "Alice", "drop sword");
    assert!(world.users.get("Alice").unwrap().inventory.is_empty());
    assert_eq!(world.zones.get(&ZoneId("z1".into())).unwrap().rooms.get(&crate::ids::RoomId("r1".into())).unwrap().items.len(), 1);
  }

  #[test]
  fn get_missing_item_reports_not_found() {
    let (mut world, rx) = test_world();
    dispatch(&mut world, "Alice", "get shield");
    let out = drain(&rx).join("\n");
    assert!(out.contains("don't see"));
  }

  #[test]
  fn unknown_verb_is_reported() {
    let (mut world, rx) = test_world();
    dispatch(&mut world, "Alice", "xyzzy");
    let out = drain(&rx).join("\n");
    assert!(out.to_lowercase().contains("don't understand") || out.contains("Huh?"));
  }
}
