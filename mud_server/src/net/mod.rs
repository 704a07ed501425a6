//! Connection admission and the per-connection worker (spec.md §4.1, §5).
//!
//! Each accepted socket gets a dedicated OS thread running the greeting and
//! login handshake inline (blocking I/O); once logged in, it splits into a
//! reader thread (socket -> `inputs` channel) and the original thread
//! becomes the writer (`response` channel -> socket). This collapses the
//! "sub-task with private prompt/reply channels" spec.md describes for the
//! login phase into plain sequential blocking calls on the connection's own
//! thread; the thread boundary already gives the same isolation from the
//! world core without adding another pair of channels (see DESIGN.md).

pub mod login;

use crate::config::Config;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::{
  io::{BufRead, BufReader, Write},
  net::TcpStream,
  sync::Arc,
  thread,
  time::Duration,
};

/// One line of input, tagged with the character that sent it (spec.md §4.2
/// step 1).
pub struct InputLine {
  pub character: String,
  pub line:      String,
}

/// Control-plane messages from connection workers to the world core.
pub enum ControlMsg {
  /// Login finalization handoff (spec.md §4.1 phase 3): names the
  /// character and carries its response channel.
  Login { name: String, response_tx: Sender<String> },
  /// Not part of spec.md's enumerated control messages, but required by
  /// §7's "session errors ... if logged in, run the implicit quit": the
  /// reader thread sends this when it observes a closed or failed socket,
  /// so the world core (the only thing allowed to touch `UserList`) can
  /// save and remove the character exactly as an explicit QUIT would.
  Disconnect { name: String },
}

/// The world's three intake channels, sized per spec.md §5.
pub struct Intake {
  pub connections_tx: Sender<TcpStream>,
  pub connections_rx: Receiver<TcpStream>,
  pub control_tx:     Sender<ControlMsg>,
  pub control_rx:     Receiver<ControlMsg>,
  pub input_tx:       Sender<InputLine>,
  pub input_rx:       Receiver<InputLine>,
}

impl Intake {
  pub fn new() -> Intake { Intake::with_capacities(20, 20, 400) }

  pub fn with_capacities(connections: usize, control: usize, input: usize) -> Intake {
    let (connections_tx, connections_rx) = crossbeam_channel::bounded(connections);
    let (control_tx, control_rx) = crossbeam_channel::bounded(control);
    let (input_tx, input_rx) = crossbeam_channel::bounded(input);
    Intake { connections_tx, connections_rx, control_tx, control_rx, input_tx, input_rx }
  }

  pub fn from_config(config: &Config) -> Intake {
    Intake::with_capacities(config.connections_capacity, config.control_capacity, config.input_capacity)
  }
}

impl Default for Intake {
  fn default() -> Self { Intake::new() }
}

/// Blocking accept loop. Runs on its own thread for the lifetime of the
/// process; each accepted socket is handed to the world core's intake drain
/// via `connections_tx`.
pub fn run_listener(listener: std::net::TcpListener, connections_tx: Sender<TcpStream>) {
  for stream in listener.incoming() {
    match stream {
      Ok(s) => {
        if connections_tx.send(s).is_err() {
          return; // world core shut down
        }
      }
      Err(e) => warn!("accept failed: {}", e),
    }
  }
}

/// Spawns the connection worker thread for one freshly-accepted socket.
/// Called by the world core's intake drain (spec.md §4.2 step 1).
pub fn spawn_connection_worker(
  stream: TcpStream,
  control_tx: Sender<ControlMsg>,
  input_tx: Sender<InputLine>,
  config: Arc<Config>,
) {
  thread::spawn(move || {
    if let Err(e) = run_connection(stream, control_tx, input_tx, config) {
      debug!("connection worker exited: {}", e);
    }
  });
}

fn run_connection(
  stream: TcpStream,
  control_tx: Sender<ControlMsg>,
  input_tx: Sender<InputLine>,
  config: Arc<Config>,
) -> std::io::Result<()> {
  let mut reader = BufReader::new(stream.try_clone()?);
  let mut writer = stream;

  greet(&mut writer)?;
  let name = match login::handshake(&mut reader, &mut writer, &config) {
    Ok(name) => name,
    Err(e) => {
      debug!("login handshake aborted: {}", e);
      return Ok(());
    }
  };

  let (response_tx, response_rx) = crossbeam_channel::unbounded();
  if control_tx.send(ControlMsg::Login { name: name.clone(), response_tx }).is_err() {
    return Ok(()); // world core shut down between login and handoff
  }

  let writer_stream = writer.try_clone()?;
  let writer_name = name.clone();
  let writer_handle = thread::spawn(move || session_writer(writer_stream, response_rx, writer_name));

  session_reader(reader, &name, &input_tx, &control_tx);
  let _ = writer_handle.join();
  Ok(())
}

fn greet(writer: &mut TcpStream) -> std::io::Result<()> {
  writeln!(writer, "Welcome to Endless Crystal Blue MUD.")?;
  writer.flush()
}

/// Reads lines from the socket and forwards them to the world's shared
/// `inputs` channel. If that channel is momentarily full, sleeps briefly
/// and retries rather than blocking indefinitely or dropping the line,
/// per spec.md §5's per-client rate limiting.
fn session_reader(
  mut reader: BufReader<TcpStream>,
  character: &str,
  input_tx: &Sender<InputLine>,
  control_tx: &Sender<ControlMsg>,
) {
  loop {
    let mut line = String::new();
    match reader.read_line(&mut line) {
      Ok(0) => break,    // EOF: client closed the connection
      Ok(_) => {}
      Err(_) => break,   // socket error
    }
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    let mut msg = InputLine { character: character.to_string(), line };
    loop {
      match input_tx.try_send(msg) {
        Ok(()) => break,
        Err(TrySendError::Full(back)) => {
          msg = back;
          thread::sleep(Duration::from_millis(20));
        }
        Err(TrySendError::Disconnected(_)) => return, // world core shut down
      }
    }
  }
  let _ = control_tx.send(ControlMsg::Disconnect { name: character.to_string() });
}

/// Writes every string received on `response_rx` to the socket, verbatim
/// plus a newline. Exits (and the session ends) when the world closes the
/// channel.
fn session_writer(mut writer: TcpStream, response_rx: Receiver<String>, character: String) {
  for line in response_rx.iter() {
    if writeln!(writer, "{line}").is_err() {
      break;
    }
    let _ = writer.flush();
  }
  debug!("session writer for {} finished", character);
  let _ = writer.shutdown(std::net::Shutdown::Both);
}
