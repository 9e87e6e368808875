//! Line-oriented operator console.
//!
//! Reads one command per line from stdin on a `console-input` thread:
//!
//! ```text
//! set <roll> <pitch> <yaw> <height>   absolute pose target
//! stick <1|2|3> <dx> <dy>             move a virtual stick
//! release                             let go of every stick
//! quit                                stop the control loop
//! ```
//!
//! End of input behaves like `quit`.

use std::io::BufRead;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use thiserror::Error;

use quadpose_core::error::QuadposeError;
use quadpose_core::types::Pose;
use quadpose_teleop::{PoseCommander, PoseMapper, Stick};

pub const CONSOLE_THREAD_NAME: &str = "console-input";

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Set(Pose),
    Stick { stick: Stick, dx: f64, dy: f64 },
    Release,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{command}' takes {expected} arguments, got {got}")]
    WrongArity {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Not a number: '{0}'")]
    BadNumber(String),

    #[error("No stick numbered '{0}' (use 1, 2 or 3)")]
    BadStick(String),
}

fn numbers<const N: usize>(command: &'static str, args: &[&str]) -> Result<[f64; N], ParseError> {
    if args.len() != N {
        return Err(ParseError::WrongArity {
            command,
            expected: N,
            got: args.len(),
        });
    }
    let mut out = [0.0; N];
    for (value, arg) in out.iter_mut().zip(args) {
        *value = arg
            .parse()
            .map_err(|_| ParseError::BadNumber((*arg).to_string()))?;
    }
    Ok(out)
}

/// Parse one console line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "set" => {
            let [roll, pitch, yaw, height] = numbers::<4>("set", &args)?;
            ConsoleCommand::Set(Pose::new(roll, pitch, yaw, height))
        }
        "stick" => {
            let Some((number, rest)) = args.split_first() else {
                return Err(ParseError::WrongArity {
                    command: "stick",
                    expected: 3,
                    got: 0,
                });
            };
            let stick = number
                .parse::<u8>()
                .ok()
                .and_then(Stick::from_number)
                .ok_or_else(|| ParseError::BadStick((*number).to_string()))?;
            let [dx, dy] = numbers::<2>("stick", rest).map_err(|e| match e {
                ParseError::WrongArity { got, .. } => ParseError::WrongArity {
                    command: "stick",
                    expected: 3,
                    got: got + 1,
                },
                other => other,
            })?;
            ConsoleCommand::Stick { stick, dx, dy }
        }
        "release" => ConsoleCommand::Release,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// Applies console commands to the shared pose target.
pub struct Console {
    commander: PoseCommander,
    mapper: PoseMapper,
}

impl Console {
    pub fn new(commander: PoseCommander) -> Self {
        let baseline = commander.neutral().height;
        let mapper = PoseMapper::new(commander.input_config().clone(), baseline);
        Self { commander, mapper }
    }

    /// Apply a command. Returns `false` once the console should close.
    pub fn apply(&mut self, command: ConsoleCommand) -> bool {
        match command {
            ConsoleCommand::Set(pose) => {
                self.commander.set_pose(pose);
                debug!("Target set to {:?}", self.commander.read_target());
            }
            ConsoleCommand::Stick { stick, dx, dy } => {
                let pose = self.mapper.move_stick(stick, dx, dy);
                self.commander.set_pose(pose);
                debug!("{stick} moved, target {pose:?}");
            }
            ConsoleCommand::Release => {
                self.mapper.release_all();
                self.commander.release();
                debug!("Sticks released, target {:?}", self.commander.read_target());
            }
            ConsoleCommand::Quit => return false,
        }
        true
    }

    /// Read commands until `quit` or end of input, then disconnect the
    /// commander so the control loop stops.
    pub fn run<R: BufRead>(mut self, reader: R) {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Console read failed: {e}");
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(command)) => {
                    if !self.apply(command) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{e}"),
            }
        }
        info!("Console closed");
        self.commander.disconnect();
    }

    /// Read stdin on a dedicated thread.
    pub fn spawn_stdin(self) -> Result<JoinHandle<()>, QuadposeError> {
        thread::Builder::new()
            .name(CONSOLE_THREAD_NAME.to_string())
            .spawn(move || self.run(std::io::stdin().lock()))
            .map_err(|e| QuadposeError::Runtime(format!("Failed to spawn console thread: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
