#[macro_use]
extern crate log;

use clap::Parser;
use mud_server::{config::Config, net, persist, world::World};
use std::{
  io::{self, Write},
  path::Path,
  sync::Arc,
  thread,
};

#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
  /// Path to the TOML config file (spec.md §10.5).
  #[clap(long, default_value = "server.toml")]
  config:          String,
  /// Overrides `address`'s port, leaving the host part of the config alone.
  #[clap(long)]
  port:            Option<u16>,
  /// Forces the interactive admin-creation prompt even if `charlist.csv`
  /// already exists.
  #[clap(long)]
  bootstrap_admin: bool,
}

fn main() {
  let args = Args::parse();

  let config_path = Path::new(&args.config);
  let default_path = config_path.with_file_name("server-default.toml");
  let mut config: Config = match mud_common::config::load(config_path, &default_path) {
    Ok(c) => c,
    Err(e) => {
      eprintln!("could not load configuration: {e}");
      std::process::exit(1);
    }
  };

  if let Some(port) = args.port {
    let host = config.address.rsplit_once(':').map(|(host, _)| host).unwrap_or("0.0.0.0");
    config.address = format!("{host}:{port}");
  }

  mud_common::logging::init("mud_server");

  let charlist_exists = Path::new(&config.chara_dir).join("charlist.csv").exists();
  if args.bootstrap_admin || !charlist_exists {
    if let Err(e) = bootstrap_admin(&config) {
      error!("admin bootstrap failed: {e}");
      std::process::exit(1);
    }
  }

  let (zones, item_templates) = match mud_server::world::loader::load_world(&config) {
    Ok(v) => v,
    Err(e) => {
      error!("could not load world data: {e}");
      std::process::exit(1);
    }
  };

  let listener = match std::net::TcpListener::bind(&config.address) {
    Ok(l) => l,
    Err(e) => {
      error!("could not bind {}: {}", config.address, e);
      std::process::exit(1);
    }
  };
  info!("listening on {}", config.address);

  let config = Arc::new(config);
  let intake = net::Intake::from_config(&config);

  let listener_connections_tx = intake.connections_tx.clone();
  thread::spawn(move || net::run_listener(listener, listener_connections_tx));

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

  mud_server::world::tick::run(&mut world);
}

/// Interactive first-run admin creation (spec.md §6): prompts on stdin/stdout
/// for a name and password and writes the resulting character the same way
/// the login handshake's `new` path does, so the very first login can use it.
fn bootstrap_admin(config: &Config) -> io::Result<()> {
  println!("No characters exist yet. Let's create the first (admin) character.");

  let name = loop {
    print!("Choose a name (3-16 letters): ");
    io::stdout().flush()?;
    let raw = read_stdin_line()?;
    let name = persist::normalize_name(raw.trim());
    let charlist = persist::read_charlist(&config.chara_dir)?;
    if persist::is_valid_name(&name, &charlist) {
      break name;
    }
    println!("That name is invalid, reserved, or already taken.");
  };

  let password = loop {
    print!("Choose a password (8-64 characters): ");
    io::stdout().flush()?;
    let pw1 = read_stdin_line()?;
    let pw1 = pw1.trim().to_string();
    if !persist::is_valid_password(&pw1) {
      println!("Password must be 8-64 characters.");
      continue;
    }
    print!("Confirm password: ");
    io::stdout().flush()?;
    let pw2 = read_stdin_line()?;
    if pw1 != pw2.trim() {
      println!("Passwords did not match.");
      continue;
    }
    break pw1;
  };

  persist::append_charlist_entry(&name, &password, &config.chara_dir)?;

  let sheet = mud_server::character::CharacterSheet {
    name: name.clone(),
    desc: format!("{name} is a new adventurer."),
    zone: mud_server::ids::ZoneId(config.respawn_zone.clone()),
    loc: mud_server::ids::RoomId(config.respawn_room.clone()),
    position: mud_server::character::Position::Standing,
    hp_current: 100,
    hp_max: 100,
    mp_current: 100,
    mp_max: 100,
    atk_roll: 0,
    dam_roll: 5,
    inventory: Vec::new(),
  };
  persist::save_character(&sheet, &config.chara_dir)?;
  println!("Admin character {name} created.");
  Ok(())
}

fn read_stdin_line() -> io::Result<String> {
  let mut line = String::new();
  io::stdin().read_line(&mut line)?;
  Ok(line)
}
