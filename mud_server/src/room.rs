//! Rooms and the directions that connect them (spec.md §3, §4.5).

use crate::{
  ids::{ItemId, MobInstanceId, MobTemplateId, RoomId, ZoneId},
  item::Item,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
  North,
  South,
  East,
  West,
  Up,
  Down,
  Northeast,
  Northwest,
  Southeast,
  Southwest,
}

impl Direction {
  /// Declared order (spec.md §6's reserved-keyword list, and the order the
  /// original's `dirList` walks for prefix autocomplete). Order matters:
  /// "s" is a prefix of both "south" and "southeast"/"southwest", and
  /// `south` winning is only guaranteed because it's declared first.
  pub const ALL: [Direction; 10] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
    Direction::Up,
    Direction::Down,
    Direction::Northeast,
    Direction::Northwest,
    Direction::Southeast,
    Direction::Southwest,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Direction::North => "north",
      Direction::South => "south",
      Direction::East => "east",
      Direction::West => "west",
      Direction::Up => "up",
      Direction::Down => "down",
      Direction::Northeast => "northeast",
      Direction::Northwest => "northwest",
      Direction::Southeast => "southeast",
      Direction::Southwest => "southwest",
    }
  }

  pub fn opposite(self) -> Direction {
    match self {
      Direction::North => Direction::South,
      Direction::South => Direction::North,
      Direction::East => Direction::West,
      Direction::West => Direction::East,
      Direction::Up => Direction::Down,
      Direction::Down => Direction::Up,
      Direction::Northeast => Direction::Southwest,
      Direction::Northwest => Direction::Southeast,
      Direction::Southeast => Direction::Northwest,
      Direction::Southwest => Direction::Northeast,
    }
  }

  /// Resolves a direction word or abbreviation (spec.md §4.6, §6's reserved
  /// two-letter diagonal abbreviations). Tries, in order: the exact-name
  /// match, the single/double-letter abbreviation table, then a prefix
  /// autocomplete over [`Direction::ALL`] in declared order (first match
  /// wins, mirroring the verb-table fallback the rest of the interpreter
  /// uses), so "n" hits the abbreviation table directly, while "no"/"nor"
  /// fall through to prefix matching and still resolve to north.
  pub fn parse_prefix(word: &str) -> Option<Direction> {
    let word = word.to_lowercase();
    if word.is_empty() {
      return None;
    }
    if let Some(d) = Direction::ALL.iter().find(|d| d.name() == word) {
      return Some(*d);
    }
    let abbrev = match word.as_str() {
      "n" => Some(Direction::North),
      "s" => Some(Direction::South),
      "e" => Some(Direction::East),
      "w" => Some(Direction::West),
      "u" => Some(Direction::Up),
      "d" => Some(Direction::Down),
      "ne" => Some(Direction::Northeast),
      "nw" => Some(Direction::Northwest),
      "se" => Some(Direction::Southeast),
      "sw" => Some(Direction::Southwest),
      _ => None,
    };
    if abbrev.is_some() {
      return abbrev;
    }
    Direction::ALL.iter().find(|d| d.name().starts_with(&word)).copied()
  }
}

/// Where a direction's exit leads (spec.md §3). `is_locked`/`lock_key`/
/// `needs_flying` are carried through from the file format but, per
/// spec.md §9's open question, are not enforced by the command layer in
/// this implementation; a future movement-precondition pass would read
/// them here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransDest {
  pub dest_zone:     ZoneId,
  pub dest_room:     RoomId,
  #[serde(default)]
  pub is_locked:     bool,
  #[serde(default)]
  pub lock_key:      Option<ItemId>,
  #[serde(default)]
  pub needs_flying:  bool,
}

pub type Exits = HashMap<Direction, TransDest>;

/// On-disk shape of a room entry in `rooms/<zone>.json`. `cont_list` and
/// `mob_list` name item/mob *template* IDs; the world loader resolves them
/// into live [`Item`] copies and spawned [`crate::mob::MobInstance`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoomTemplate {
  #[serde(rename = "ID")]
  pub id:    RoomId,
  pub name:  String,
  pub desc:  String,
  pub exits: Exits,
  #[serde(default)]
  pub cont_list: Vec<ItemId>,
  #[serde(default)]
  pub mob_list:  Vec<MobTemplateId>,
}

/// A live room. `items`, `mobs`, and `players` are the "contents" lists
/// spec.md §3 describes; order matters, since it's what breaks keyword
/// match ties during autocomplete (first match in list order wins).
pub struct Room {
  pub id:    RoomId,
  pub zone:  ZoneId,
  pub name:  String,
  pub desc:  String,
  pub exits: Exits,

  pub items:   Vec<Item>,
  pub mobs:    Vec<MobInstanceId>,
  pub players: Vec<String>,
}

impl Room {
  /// Builds the room shell (name/desc/exits) from its template. `items` and
  /// `mobs` start empty; the world loader fills them in separately once
  /// every zone's templates are loaded, since `cont_list`/`mob_list` name
  /// templates that may live in a different file.
  pub fn from_template(zone: ZoneId, t: RoomTemplate) -> Room {
    Room { id: t.id, zone, name: t.name, desc: t.desc, exits: t.exits, items: Vec::new(), mobs: Vec::new(), players: Vec::new() }
  }

  pub fn find_item(&self, word: &str) -> Option<&Item> { self.items.iter().find(|i| i.matches(word)) }

  pub fn take_item(&mut self, id: &ItemId) -> Option<Item> {
    let idx = self.items.iter().position(|i| &i.id == id)?;
    Some(self.items.remove(idx))
  }

  pub fn remove_player(&mut self, name: &str) { self.players.retain(|p| p != name); }
  pub fn remove_mob(&mut self, id: MobInstanceId) { self.mobs.retain(|m| *m != id); }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_full_names_and_single_letter_abbreviations() {
    assert_eq!(Direction::parse_prefix("north"), Some(Direction::North));
    assert_eq!(Direction::parse_prefix("n"), Some(Direction::North));
    assert_eq!(Direction::parse_prefix("s"), Some(Direction::South));
    assert_eq!(Direction::parse_prefix("u"), Some(Direction::Up));
  }

  #[test]
  fn parses_diagonal_abbreviations() {
    assert_eq!(Direction::parse_prefix("ne"), Some(Direction::Northeast));
    assert_eq!(Direction::parse_prefix("nw"), Some(Direction::Northwest));
    assert_eq!(Direction::parse_prefix("se"), Some(Direction::Southeast));
    assert_eq!(Direction::parse_prefix("sw"), Some(Direction::Southwest));
  }

  #[test]
  fn ambiguous_single_letter_prefix_resolves_to_declared_order_winner() {
    // "s" is a valid abbreviation on its own, so it never reaches the
    // generic prefix fallback; "so" does, and only "south" matches.
    assert_eq!(Direction::parse_prefix("so"), Some(Direction::South));
  }

  #[test]
  fn opposite_direction_round_trips() {
    for d in Direction::ALL {
      assert_eq!(d.opposite().opposite(), d);
    }
  }

  #[test]
  fn unknown_word_resolves_to_none() {
    assert_eq!(Direction::parse_prefix("xyzzy"), None);
    assert_eq!(Direction::parse_prefix(""), None);
  }
}
