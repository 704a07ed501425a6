//! Zones: the unit of mob repop and the top-level container for rooms
//! (spec.md §3, §4.4).

use crate::{
  ids::{MobInstanceId, RoomId, ZoneId},
  mob::MobInstance,
  room::Room,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// On-disk shape of an entry in `rooms/zones.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneTemplate {
  #[serde(rename = "ID")]
  pub id:         ZoneId,
  pub name:       String,
  pub repop_time: i64,
  pub repop_msg:  String,
}

pub struct Zone {
  pub id:   ZoneId,
  pub name: String,

  pub rooms: HashMap<RoomId, Room>,

  /// Ticks between repops, jittered per cycle to a random value in
  /// [-599, 600] once `repop_ctr` reaches it (spec.md §4.2).
  pub repop_time: i64,
  /// Counts up each tick; repop fires once it reaches `repop_time`.
  pub repop_ctr:  i64,
  /// Broadcast to every room in the zone the moment repop fires.
  pub repop_msg:  String,

  pub active_mobs: HashMap<MobInstanceId, MobInstance>,
  pub dead_mobs:    HashMap<MobInstanceId, MobInstance>,
}
