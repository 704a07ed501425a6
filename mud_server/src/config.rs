//! Server configuration (SPEC_FULL.md §10.2), loaded via
//! [`mud_common::config::load`] from `server.toml` if present, else
//! defaults. A `server-default.toml` reference copy is always written
//! alongside it so operators can diff their own file against what the
//! server actually assumes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// TCP listen address (spec.md §6: port 4040).
  pub address: String,
  /// Nominal tick period in milliseconds (spec.md §4.2: "nominal period 100
  /// ms").
  pub tick_millis: u64,
  /// Ticks between heal pulses (spec.md §4.2: "every 200th tick, ~20s").
  pub heal_every_ticks: u64,

  pub chara_dir: String,
  pub items_dir: String,
  pub rooms_dir: String,
  pub mobs_dir:  String,

  /// Zone/room a slain player respawns in (spec.md §4.3 step e).
  pub respawn_zone: String,
  pub respawn_room: String,

  /// Intake channel capacities (spec.md §5): new-connection queue, login
  /// control-message queue, and the shared per-line input queue.
  pub connections_capacity: usize,
  pub control_capacity:     usize,
  pub input_capacity:       usize,
}

impl Default for Config {
  fn default() -> Config {
    Config {
      address: "0.0.0.0:4040".to_string(),
      tick_millis: 100,
      heal_every_ticks: 200,
      chara_dir: "chara".to_string(),
      items_dir: "items".to_string(),
      rooms_dir: "rooms".to_string(),
      mobs_dir: "mobs".to_string(),
      respawn_zone: "z1000".to_string(),
      respawn_room: "r1000".to_string(),
      connections_capacity: 20,
      control_capacity: 20,
      input_capacity: 400,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_spec() {
    let c = Config::default();
    assert_eq!(c.address, "0.0.0.0:4040");
    assert_eq!(c.tick_millis, 100);
    assert_eq!(c.heal_every_ticks, 200);
    assert_eq!(c.respawn_zone, "z1000");
    assert_eq!(c.respawn_room, "r1000");
  }
}
