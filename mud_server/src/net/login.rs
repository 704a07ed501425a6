//! The login handshake (spec.md §4.1 phase 2): prompts for a name or `new`,
//! runs character creation or password verification, and terminates with
//! the character's normalized name on success.

use crate::{
  character::{CharacterSheet, Position},
  config::Config,
  ids::{RoomId, ZoneId},
  persist::{self, CreateError, LoginError},
};
use std::{
  io::{self, BufRead, BufReader, Write},
  net::TcpStream,
};

const START_HP: i32 = 100;
const START_MP: i32 = 100;
const START_ATK: i32 = 0;
const START_DAM: i32 = 5;

/// Runs the handshake to completion, returning the logged-in character's
/// name. Returns `Err` only on an I/O failure (socket closed mid-prompt);
/// recoverable input errors (bad name, wrong password) are reported to the
/// client and the handshake loops back to the name prompt.
pub fn handshake(reader: &mut BufReader<TcpStream>, writer: &mut TcpStream, config: &Config) -> io::Result<String> {
  loop {
    write!(writer, "Enter your character's name, or 'new' to create one: ")?;
    writer.flush()?;
    let line = read_line(reader)?;
    let trimmed = line.trim();

    if trimmed.eq_ignore_ascii_case("new") {
      match create_character(reader, writer, config) {
        Ok(name) => {
          writeln!(writer, "Welcome to Endless Crystal Blue MUD, {name}.")?;
          writer.flush()?;
          return Ok(name);
        }
        Err(e) => {
          writeln!(writer, "{e}")?;
          writer.flush()?;
        }
      }
    } else {
      match login_existing(reader, writer, trimmed, config) {
        Ok(name) => {
          writeln!(writer, "Welcome back, {name}.")?;
          writer.flush()?;
          return Ok(name);
        }
        Err(e) => {
          writeln!(writer, "{e}")?;
          writer.flush()?;
        }
      }
    }
  }
}

fn login_existing(
  reader: &mut BufReader<TcpStream>,
  writer: &mut TcpStream,
  raw_name: &str,
  config: &Config,
) -> Result<String, LoginError> {
  let name = persist::normalize_name(raw_name);
  let charlist = persist::read_charlist(&config.chara_dir)?;
  let stored = charlist.get(&name).ok_or(LoginError::NoSuchCharacter)?;

  write!(writer, "Password: ")?;
  writer.flush()?;
  let password = read_line(reader)?;
  let password = password.trim();

  if !persist::verify_password(password, stored) {
    return Err(LoginError::WrongPassword);
  }
  Ok(name)
}

fn create_character(reader: &mut BufReader<TcpStream>, writer: &mut TcpStream, config: &Config) -> Result<String, CreateError> {
  write!(writer, "Choose a name (3-16 letters): ")?;
  writer.flush()?;
  let raw_name = read_line(reader)?;
  let name = persist::normalize_name(raw_name.trim());

  let charlist = persist::read_charlist(&config.chara_dir)?;
  if !persist::is_valid_name(&name, &charlist) {
    return Err(CreateError::InvalidName);
  }

  write!(writer, "Choose a password (8-64 characters): ")?;
  writer.flush()?;
  let pw1 = read_line(reader)?;
  let pw1 = pw1.trim();
  if !persist::is_valid_password(pw1) {
    return Err(CreateError::InvalidPassword);
  }

  write!(writer, "Confirm password: ")?;
  writer.flush()?;
  let pw2 = read_line(reader)?;
  if pw1 != pw2.trim() {
    return Err(CreateError::PasswordMismatch);
  }

  persist::append_charlist_entry(&name, pw1, &config.chara_dir)?;

  let sheet = CharacterSheet {
    name: name.clone(),
    desc: format!("{name} is a new adventurer."),
    zone: ZoneId(config.respawn_zone.clone()),
    loc: RoomId(config.respawn_room.clone()),
    position: Position::Standing,
    hp_current: START_HP,
    hp_max: START_HP,
    mp_current: START_MP,
    mp_max: START_MP,
    atk_roll: START_ATK,
    dam_roll: START_DAM,
    inventory: Vec::new(),
  };
  persist::save_character(&sheet, &config.chara_dir)?;

  Ok(name)
}

fn read_line(reader: &mut BufReader<TcpStream>) -> io::Result<String> {
  let mut line = String::new();
  let n = reader.read_line(&mut line)?;
  if n == 0 {
    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed"));
  }
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
