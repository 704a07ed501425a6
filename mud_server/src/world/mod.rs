//! The world core: global registries plus the orchestration that ties the
//! entity model to the tick engine (spec.md §3 "Global registries", §9
//! "expose them as encapsulated fields of a World object").

pub mod death;
pub mod loader;
pub mod tick;
pub mod transfer;

use crate::{
  character::Character,
  combat::CombatantRef,
  config::Config,
  ids::ZoneId,
  item::ItemTemplateList,
  net::{ControlMsg, InputLine},
  persist,
  zone::Zone,
};
use crossbeam_channel::{Receiver, Sender};
use std::{collections::HashMap, net::TcpStream, sync::Arc};

/// Owns every piece of mutable world state plus the channel ends needed to
/// admit new connections. Nothing outside `world::tick`'s drain step
/// touches `zones`/`users` directly from another thread; this struct is
/// only ever driven by the single tick-loop thread (spec.md §5).
pub struct World {
  pub zones:          HashMap<ZoneId, Zone>,
  pub item_templates: ItemTemplateList,
  pub users:          HashMap<String, Character>,
  pub config:         Arc<Config>,

  pub tick_count: u64,

  pub connections_rx: Receiver<TcpStream>,
  pub control_rx:     Receiver<ControlMsg>,
  pub input_rx:       Receiver<InputLine>,

  /// Cloned into every connection worker the intake drain spawns.
  pub control_tx: Sender<ControlMsg>,
  pub input_tx:   Sender<InputLine>,
}

impl World {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    zones: HashMap<ZoneId, Zone>,
    item_templates: ItemTemplateList,
    config: Arc<Config>,
    connections_rx: Receiver<TcpStream>,
    control_tx: Sender<ControlMsg>,
    control_rx: Receiver<ControlMsg>,
    input_tx: Sender<InputLine>,
    input_rx: Receiver<InputLine>,
  ) -> World {
    World {
      zones,
      item_templates,
      users: HashMap::new(),
      config,
      tick_count: 0,
      connections_rx,
      control_rx,
      input_rx,
      control_tx,
      input_tx,
    }
  }

  /// Sends `line` to every player present in `room_id`/`zone_id`, except
  /// (optionally) `except`. The room-local broadcast primitive spec.md §4
  /// repeatedly calls out ("LocalAnnouncePCMsg").
  pub fn broadcast_room(&self, zone_id: &ZoneId, room_id: &crate::ids::RoomId, except: Option<&str>, line: &str) {
    let Some(zone) = self.zones.get(zone_id) else { return };
    let Some(room) = zone.rooms.get(room_id) else { return };
    for name in &room.players {
      if Some(name.as_str()) == except {
        continue;
      }
      if let Some(c) = self.users.get(name) {
        c.tell(line);
      }
    }
  }

  /// The HP/MP status line appended to most command responses (spec.md §6).
  pub fn prompt_for(&self, name: &str) -> Option<String> {
    let c = self.users.get(name)?;
    Some(format!("\n{}/{} HP {}/{} MP >>", c.hp_current, c.hp_max, c.mp_current, c.mp_max))
  }

  pub fn send_prompt(&self, name: &str) {
    if let Some(p) = self.prompt_for(name) {
      if let Some(c) = self.users.get(name) {
        c.tell(p);
      }
    }
  }

  /// Builds the full room description LOOK emits with no argument (spec.md
  /// §4.6): name, description, exits, other occupants, and contents. Lives
  /// here rather than in `command::handlers` so both the command
  /// interpreter and the death-handling "implicit LOOK" can call it without
  /// `world` needing to depend on `command`.
  pub fn look_room_text(&self, name: &str) -> Option<String> {
    let c = self.users.get(name)?;
    let zone = self.zones.get(&c.zone)?;
    let room = zone.rooms.get(&c.loc)?;

    let mut out = String::new();
    out.push_str(&room.name);
    out.push('\n');
    out.push_str(&room.desc);

    if !room.exits.is_empty() {
      let mut dirs: Vec<_> = room.exits.keys().map(|d| d.name()).collect();
      dirs.sort_unstable();
      out.push_str("\nExits: ");
      out.push_str(&dirs.join(", "));
    }

    let mut others: Vec<String> = Vec::new();
    for other in &room.players {
      if other != name {
        others.push(other.clone());
      }
    }
    for mob_id in &room.mobs {
      if let Some(mob) = zone.active_mobs.get(mob_id) {
        others.push(mob.name.clone());
      }
    }
    if !others.is_empty() {
      out.push_str("\nAlso here: ");
      out.push_str(&others.join(", "));
      out.push('.');
    }

    if !room.items.is_empty() {
      let names: Vec<_> = room.items.iter().map(|i| i.name.as_str()).collect();
      out.push_str("\nYou see: ");
      out.push_str(&names.join(", "));
      out.push('.');
    }

    Some(out)
  }

  /// Saves and removes a character (spec.md §4.6 QUIT, and §7's "implicit
  /// quit" run on a session error). Broadcasts a sleep narration, scrubs the
  /// departing character from every present mob's targets, and drops its
  /// response channel, which tears down the connection worker.
  pub fn quit_character(&mut self, name: &str) {
    let Some(c) = self.users.get(name) else { return };
    let (zone_id, room_id) = (c.zone.clone(), c.loc.clone());
    let sheet = c.to_sheet();
    if let Err(e) = persist::save_character(&sheet, &self.config.chara_dir) {
      warn!("could not save {} on quit: {}", name, e);
    }

    self::transfer::scrub_from_room(self, &zone_id, &room_id, &CombatantRef::Player(name.to_string()));
    self.broadcast_room(&zone_id, &room_id, Some(name), &format!("{name} falls asleep."));

    if let Some(zone) = self.zones.get_mut(&zone_id) {
      if let Some(room) = zone.rooms.get_mut(&room_id) {
        room.remove_player(name);
      }
    }
    self.users.remove(name);
  }
}
