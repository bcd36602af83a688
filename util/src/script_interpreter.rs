//! # Message script interpreter module
//!
//! This module replays timed message scripts into the guidance executable, standing in for the
//! live transport. Each entry of a script is a session time followed by a JSON message and
//! terminated with a semicolon:
//!
//! ```text
//! 0.0: {"type": "VELOCITY", "payload": {"linear_x_ms": 10.0}};
//! 0.5: {"type": "ROUTE_STATE", "payload": {"downtrack_m": 4.0, "lane_index": 1}};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::msg::{Msg, MsgParseError};
use crate::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A message which is scripted to be delivered at a specific time.
struct ScriptedMsg {
    /// The time the message is to be delivered at
    exec_time_s: f64,

    msg: Msg
}

/// A script interpreter.
///
/// After initialising with the path to the script use `.get_pending_msgs` to
/// acquire the messages that are due for delivery.
pub struct ScriptInterpreter {
    _script_path: Option<PathBuf>,
    msgs: VecDeque<ScriptedMsg>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid message at {0} s: {1}")]
    InvalidMsg(f64, MsgParseError)
}

pub enum PendingMsgs {
    None,
    Some(Vec<Msg>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        let path = PathBuf::from(script_path.as_ref());
        
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.display().to_string()));
        }

        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_script_str(&script)?;
        si._script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {

        let mut msg_queue: VecDeque<ScriptedMsg> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = match RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build() 
        {
            Ok(r) => r,
            Err(_) => return Err(ScriptError::ScriptEmpty)
        };

        for cap in re.captures_iter(script) {
            let (time_str, payload) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(p)) => (t.as_str(), p.as_str()),
                _ => continue
            };

            let exec_time_s: f64 = time_str.parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // The scripts contain JSON only.
            let msg = Msg::from_json(payload)
                .map_err(|e| ScriptError::InvalidMsg(exec_time_s, e))?;

            msg_queue.push_back(ScriptedMsg {
                exec_time_s,
                msg
            });
        }

        if msg_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            _script_path: None,
            msgs: msg_queue
        })
    }

    /// Return the messages due at the current session time.
    pub fn get_pending_msgs(&mut self) -> PendingMsgs {
        self.get_pending_msgs_at(get_elapsed_seconds())
    }

    /// Return the messages due at the given time, or `None` if no messages are due.
    pub fn get_pending_msgs_at(&mut self, current_time_s: f64) -> PendingMsgs {

        // If the queue is empty the script is over
        if self.msgs.is_empty() {
            return PendingMsgs::EndOfScript
        }

        let mut msg_vec: Vec<Msg> = vec![];

        // Pop messages until the head's time is later than the current time
        while let Some(head) = self.msgs.front() {
            if head.exec_time_s > current_time_s {
                break;
            }
            if let Some(m) = self.msgs.pop_front() {
                msg_vec.push(m.msg);
            }
        }

        if !msg_vec.is_empty() {
            PendingMsgs::Some(msg_vec)
        }
        else {
            PendingMsgs::None
        }
    }

    /// Get the number of messages left in the script
    pub fn get_num_msgs(&self) -> usize {
        self.msgs.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.msgs.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
        0.0: {"type": "VELOCITY", "payload": {"linear_x_ms": 5.0}};
        0.0: {"type": "ROUTE_STATE", "payload": {"downtrack_m": 0.0, "lane_index": 1}};
        1.5: {"type": "VELOCITY", "payload": {"linear_x_ms": 6.0}};
    "#;

    #[test]
    fn test_replay_order() {
        let mut si = ScriptInterpreter::from_script_str(SCRIPT).unwrap();
        assert_eq!(si.get_num_msgs(), 3);
        assert_eq!(si.get_duration(), 1.5);

        match si.get_pending_msgs_at(0.1) {
            PendingMsgs::Some(msgs) => {
                assert_eq!(msgs.len(), 2);
                assert!(matches!(msgs[0], Msg::Velocity(_)));
                assert!(matches!(msgs[1], Msg::RouteState(_)));
            },
            _ => panic!("Expected two messages")
        }

        assert!(matches!(si.get_pending_msgs_at(1.0), PendingMsgs::None));
        assert!(matches!(si.get_pending_msgs_at(2.0), PendingMsgs::Some(ref m) if m.len() == 1));
        assert!(matches!(si.get_pending_msgs_at(3.0), PendingMsgs::EndOfScript));
    }

    #[test]
    fn test_empty_script() {
        assert!(matches!(
            ScriptInterpreter::from_script_str("# nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_invalid_msg() {
        assert!(matches!(
            ScriptInterpreter::from_script_str(r#"2.0: {"type": "NOPE"};"#),
            Err(ScriptError::InvalidMsg(t, _)) if t == 2.0
        ));
    }

    #[test]
    fn test_missing_script() {
        assert!(matches!(
            ScriptInterpreter::new("/definitely/not/a/script.txt"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
