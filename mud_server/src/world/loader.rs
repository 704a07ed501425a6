//! World loader: materializes zones -> rooms -> mobs -> items from the
//! files under `items/`, `rooms/`, and `mobs/` at boot (spec.md §4, "World
//! loader"). Any missing or malformed file here is fatal; spec.md §7
//! treats boot-time data errors as process-exiting.

use crate::{
  config::Config,
  ids::{RoomId, ZoneId},
  item::ItemTemplateList,
  mob::{MobInstance, MobTemplateList},
  room::{Room, RoomTemplate},
  zone::{Zone, ZoneTemplate},
};
use std::{collections::HashMap, fs, io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("could not read `{path}`: {source}")]
  Io { path: String, source: io::Error },
  #[error("malformed JSON in `{path}`: {source}")]
  Json { path: String, source: serde_json::Error },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
  let text = fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.display().to_string(), source })?;
  serde_json::from_str(&text).map_err(|source| LoadError::Json { path: path.display().to_string(), source })
}

/// Like [`read_json`], but a missing file yields an empty default instead of
/// an error, used for per-zone mob files, since a zone with no mobs simply
/// has no `mobs/mobs-<zone>.json`.
fn read_json_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T, LoadError> {
  if !path.exists() {
    return Ok(T::default());
  }
  read_json(path)
}

/// Loads the full world: item templates first (rooms reference them by ID),
/// then every zone's rooms and mobs. Directory locations come from `config`
/// (spec.md §10.2) rather than hardcoded paths.
pub fn load_world(config: &Config) -> Result<(HashMap<ZoneId, Zone>, ItemTemplateList), LoadError> {
  let items_path = format!("{}/items.json", config.items_dir);
  let item_templates: ItemTemplateList = read_json(Path::new(&items_path))?;
  let zones_path = format!("{}/zones.json", config.rooms_dir);
  let zone_templates: HashMap<ZoneId, ZoneTemplate> = read_json(Path::new(&zones_path))?;

  let mut zones = HashMap::new();
  for (zone_id, zt) in zone_templates {
    let zone = load_zone(config, &zone_id, zt, &item_templates)?;
    zones.insert(zone_id, zone);
  }
  Ok((zones, item_templates))
}

fn load_zone(config: &Config, zone_id: &ZoneId, zt: ZoneTemplate, item_templates: &ItemTemplateList) -> Result<Zone, LoadError> {
  let room_path = format!("{}/{}.json", config.rooms_dir, zone_id.as_str());
  let room_templates: HashMap<RoomId, RoomTemplate> = read_json(Path::new(&room_path))?;

  let mob_path = format!("{}/mobs-{}.json", config.mobs_dir, zone_id.as_str());
  let mob_templates: MobTemplateList = read_json_or_default(Path::new(&mob_path))?;

  let mut rooms = HashMap::new();
  let mut active_mobs = HashMap::new();
  let mut next_instance_id: u64 = 1;

  for (room_id, rt) in room_templates {
    let mob_list = rt.mob_list.clone();
    let cont_list = rt.cont_list.clone();
    let mut room = Room::from_template(zone_id.clone(), rt);

    for item_id in &cont_list {
      match item_templates.get(item_id) {
        Some(item) => room.items.push(item.clone()),
        None => warn!("zone {}: room {} references unknown item {}", zone_id, room_id, item_id),
      }
    }

    for template_id in &mob_list {
      match mob_templates.get(template_id) {
        Some(template) => {
          let instance_id = next_instance_id;
          next_instance_id += 1;
          let mut instance = MobInstance::spawn(template, instance_id);
          instance.zone = zone_id.clone();
          instance.loc = room_id.clone();
          room.mobs.push(instance_id);
          active_mobs.insert(instance_id, instance);
        }
        None => warn!("zone {}: room {} references unknown mob template {}", zone_id, room_id, template_id),
      }
    }

    rooms.insert(room_id, room);
  }

  Ok(Zone {
    id: zone_id.clone(),
    name: zt.name,
    rooms,
    repop_time: zt.repop_time,
    repop_ctr: 0,
    repop_msg: zt.repop_msg,
    active_mobs,
    dead_mobs: HashMap::new(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ids::ItemId, item::Item, mob::MobTemplate};
  use std::collections::HashMap as Map;

  #[test]
  fn load_zone_resolves_items_and_spawns_mobs() {
    let mut item_templates = Map::new();
    item_templates.insert(
      ItemId("sword".into()),
      Item { id: ItemId("sword".into()), name: "a sword".into(), keywords: vec!["sword".into()], desc: "Sharp.".into() },
    );

    let mut mob_templates = Map::new();
    mob_templates.insert(
      crate::ids::MobTemplateId("rat".into()),
      MobTemplate {
        id: crate::ids::MobTemplateId("rat".into()),
        name: "a rat".into(),
        keywords: vec!["rat".into()],
        desc: "A rat.".into(),
        start_loc: RoomId("r1000".into()),
        hp_max: 10,
        mp_max: 0,
        atk_roll: 0,
        dam_roll: 1,
        cont_list: Vec::new(),
      },
    );

    let rt = RoomTemplate {
      id: RoomId("r1000".into()),
      name: "Town square".into(),
      desc: "A square.".into(),
      exits: crate::room::Exits::new(),
      cont_list: vec![ItemId("sword".into())],
      mob_list: vec![crate::ids::MobTemplateId("rat".into())],
    };
    let mut room_templates = Map::new();
    room_templates.insert(RoomId("r1000".into()), rt);

    // Exercise load_zone directly against in-memory templates by writing
    // them to a scratch directory and loading through the public path.
    let dir = tempfile::tempdir().unwrap();
    let cwd = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    std::fs::create_dir_all("rooms").unwrap();
    std::fs::create_dir_all("mobs").unwrap();
    std::fs::write("rooms/z1000.json", serde_json::to_string(&room_templates).unwrap()).unwrap();
    std::fs::write("mobs/mobs-z1000.json", serde_json::to_string(&mob_templates).unwrap()).unwrap();

    let zt = ZoneTemplate { id: ZoneId("z1000".into()), name: "Town".into(), repop_time: 10, repop_msg: "Life returns.".into() };
    let config = Config::default();
    let zone = load_zone(&config, &ZoneId("z1000".into()), zt, &item_templates).unwrap();
    std::env::set_current_dir(cwd).unwrap();

    let room = zone.rooms.get(&RoomId("r1000".into())).unwrap();
    assert_eq!(room.items.len(), 1);
    assert_eq!(room.mobs.len(), 1);
    assert_eq!(zone.active_mobs.len(), 1);
  }
}
