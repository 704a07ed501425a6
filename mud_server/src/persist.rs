//! On-disk persistence: the character name/password list, character
//! sheets, and the salted password KDF (spec.md §6, §9; SPEC_FULL.md §10.6).
//!
//! Save atomicity follows spec.md §9's reimplementation note: writes go to
//! a temp file in the same directory, then an atomic rename, rather than
//! truncating the live file in place.

use crate::character::CharacterSheet;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use std::{
  collections::HashMap,
  fs,
  io::{self, BufReader, BufWriter, Write},
  path::{Path, PathBuf},
};
use thiserror::Error;

const CHARLIST_FILE: &str = "charlist.csv";
const PBKDF2_ROUNDS: u32 = 100_000;
const SALT_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("no character named `{0}`")]
  NotFound(String),
  #[error("could not read character file: {0}")]
  Io(#[from] io::Error),
  #[error("malformed character file: {0}")]
  Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SaveError {
  #[error("could not write character file: {0}")]
  Io(#[from] io::Error),
  #[error("could not serialize character sheet: {0}")]
  Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LoginError {
  #[error("No character by that name. Enter 'new' to create one.")]
  NoSuchCharacter,
  #[error("Incorrect password.")]
  WrongPassword,
  #[error("internal error: {0}")]
  Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum CreateError {
  #[error("That name is invalid, reserved, or already taken.")]
  InvalidName,
  #[error("Password must be 8-64 characters.")]
  InvalidPassword,
  #[error("Passwords did not match.")]
  PasswordMismatch,
  #[error("internal error: {0}")]
  Io(#[from] io::Error),
  #[error("internal error: {0}")]
  Save(#[from] SaveError),
}

/// Reserved verbs a new character may not be named after (case-insensitive),
/// per spec.md §4.1.
pub const RESERVED_NAMES: &[&str] = &["new", "quit", "look", "save", "get", "kill", "cast"];

/// True if `name` satisfies spec.md §4.1's name-validity rule: 3-16 letters,
/// not a reserved verb, not already registered. `existing` is the set of
/// already-registered names (from `charlist.csv`), compared case-sensitively
/// against the already Title-cased candidate the caller passes in.
pub fn is_valid_name(name: &str, existing: &HashMap<String, String>) -> bool {
  if name.chars().count() < 3 || name.chars().count() > 16 {
    return false;
  }
  if !name.chars().all(|c| c.is_alphabetic()) {
    return false;
  }
  if RESERVED_NAMES.contains(&name.to_lowercase().as_str()) {
    return false;
  }
  !existing.contains_key(name)
}

/// True if `pw` satisfies spec.md §4.1's password-length rule.
pub fn is_valid_password(pw: &str) -> bool { pw.len() >= 8 && pw.len() <= 64 }

/// Normalizes a raw name entry to Title case, e.g. `"aLICE"` -> `"Alice"`,
/// matching spec.md §4.1's "normalized to Title case".
pub fn normalize_name(raw: &str) -> String {
  let mut chars = raw.chars();
  match chars.next() {
    None => String::new(),
    Some(first) => {
      first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    }
  }
}

fn charlist_path(chara_dir: &str) -> PathBuf { Path::new(chara_dir).join(CHARLIST_FILE) }

/// Reads `<chara_dir>/charlist.csv` into a name -> hash-column map. A
/// missing file yields an empty map (mirrors the original's open-or-create
/// behavior), so bootstrap and bootstrap-before-first-admin both see an
/// empty map rather than erroring.
pub fn read_charlist(chara_dir: &str) -> io::Result<HashMap<String, String>> {
  let path = charlist_path(chara_dir);
  if !path.exists() {
    return Ok(HashMap::new());
  }
  let file = fs::File::open(path)?;
  let reader = BufReader::new(file);
  let mut out = HashMap::new();
  for line in io::BufRead::lines(reader) {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }
    if let Some((name, hash)) = line.split_once(',') {
      out.insert(name.to_string(), hash.to_string());
    }
  }
  Ok(out)
}

/// Appends one `Name,salt$hash` row to `<chara_dir>/charlist.csv`, creating
/// the file and its parent directory if needed.
pub fn append_charlist_entry(name: &str, password: &str, chara_dir: &str) -> io::Result<()> {
  fs::create_dir_all(chara_dir)?;
  let hash_col = hash_password(password);
  let mut f = fs::OpenOptions::new().create(true).append(true).open(charlist_path(chara_dir))?;
  writeln!(f, "{name},{hash_col}")?;
  Ok(())
}

/// Hashes `password` with a fresh random salt, returning the `salt$hash`
/// hex string stored as the CSV's second column. The column stays a single
/// opaque string, so the schema (`Name,HexLowercaseSHA512Hash` in the
/// original) is unchanged in shape even though the contents are now a
/// salted KDF output rather than bare `sha512(password)` (spec.md §9).
pub fn hash_password(password: &str) -> String {
  let mut salt = [0u8; SALT_LEN];
  rand::thread_rng().fill_bytes(&mut salt);
  let hash = derive(password, &salt);
  format!("{}${}", hex::encode(salt), hex::encode(hash))
}

/// Verifies `password` against a stored `salt$hash` column value.
pub fn verify_password(password: &str, stored: &str) -> bool {
  let Some((salt_hex, hash_hex)) = stored.split_once('$') else { return false };
  let Ok(salt) = hex::decode(salt_hex) else { return false };
  let Ok(expected) = hex::decode(hash_hex) else { return false };
  let actual = derive(password, &salt);
  actual == expected
}

fn derive(password: &str, salt: &[u8]) -> [u8; 32] {
  let mut out = [0u8; 32];
  pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut out);
  out
}

fn character_path(name: &str, chara_dir: &str) -> PathBuf { Path::new(chara_dir).join(format!("{name}.json")) }

/// Loads a character sheet from `<chara_dir>/<Name>.json`.
pub fn load_character(name: &str, chara_dir: &str) -> Result<CharacterSheet, LoadError> {
  let path = character_path(name, chara_dir);
  if !path.exists() {
    return Err(LoadError::NotFound(name.to_string()));
  }
  let file = fs::File::open(&path)?;
  let sheet = serde_json::from_reader(BufReader::new(file))?;
  Ok(sheet)
}

/// Writes a character sheet to `<chara_dir>/<Name>.json` via
/// write-temp-then-rename, so a crash mid-write never leaves a truncated
/// file on disk (spec.md §9's reimplementation note on save atomicity).
pub fn save_character(sheet: &CharacterSheet, chara_dir: &str) -> Result<(), SaveError> {
  fs::create_dir_all(chara_dir)?;
  let path = character_path(&sheet.name, chara_dir);
  let tmp_path = path.with_extension("json.tmp");
  {
    let file = fs::File::create(&tmp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, sheet)?;
    writer.flush()?;
  }
  fs::rename(&tmp_path, &path)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_round_trips_through_hash_and_verify() {
    let stored = hash_password("hunter22");
    assert!(verify_password("hunter22", &stored));
    assert!(!verify_password("wrongpass", &stored));
  }

  #[test]
  fn two_hashes_of_the_same_password_differ() {
    // different random salts
    assert_ne!(hash_password("hunter22"), hash_password("hunter22"));
  }

  #[test]
  fn name_validity_rules() {
    let existing = HashMap::from([("Alice".to_string(), "x".to_string())]);
    assert!(is_valid_name("Bob", &existing));
    assert!(!is_valid_name("Alice", &existing));
    assert!(!is_valid_name("Bo", &existing));
    assert!(!is_valid_name(&"B".repeat(17), &existing));
    assert!(!is_valid_name("Bob1", &existing));
    assert!(!is_valid_name("Kill", &existing));
  }

  #[test]
  fn password_validity_rules() {
    assert!(is_valid_password("12345678"));
    assert!(!is_valid_password("short"));
    assert!(!is_valid_password(&"x".repeat(65)));
  }

  #[test]
  fn normalize_name_title_cases() {
    assert_eq!(normalize_name("aLICE"), "Alice");
    assert_eq!(normalize_name("BOB"), "Bob");
  }

  #[test]
  fn charlist_entry_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let chara_dir = dir.path().join("chara");
    let chara_dir = chara_dir.to_str().unwrap();
    append_charlist_entry("Alice", "hunter22", chara_dir).unwrap();
    let list = read_charlist(chara_dir).unwrap();
    assert!(verify_password("hunter22", list.get("Alice").unwrap()));
  }

  #[test]
  fn character_sheet_round_trips_through_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let chara_dir = dir.path().join("chara");
    let chara_dir = chara_dir.to_str().unwrap();
    let sheet = CharacterSheet {
      name: "Alice".to_string(),
      desc: "A test adventurer.".to_string(),
      zone: crate::ids::ZoneId("z1000".into()),
      loc: crate::ids::RoomId("r1000".into()),
      position: crate::character::Position::Standing,
      hp_current: 100,
      hp_max: 100,
      mp_current: 100,
      mp_max: 100,
      atk_roll: 0,
      dam_roll: 5,
      inventory: Vec::new(),
    };
    save_character(&sheet, chara_dir).unwrap();
    let loaded = load_character("Alice", chara_dir).unwrap();
    assert_eq!(loaded.name, "Alice");
    assert_eq!(loaded.hp_max, 100);
  }

  #[test]
  fn load_missing_character_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let chara_dir = dir.path().join("chara");
    let chara_dir = chara_dir.to_str().unwrap();
    let err = load_character("Nobody", chara_dir).unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));
  }
}
