//! Endless Crystal Blue: a line-oriented, multi-user persistent world
//! server. The entity model, room operations, command interpreter, world
//! loader, connection worker, and tick engine all live here; `main.rs` wires
//! them together and owns bootstrap.

#[macro_use]
extern crate log;

pub mod character;
pub mod combat;
pub mod command;
pub mod config;
pub mod ids;
pub mod item;
pub mod mob;
pub mod net;
pub mod persist;
pub mod room;
pub mod world;
pub mod zone;
