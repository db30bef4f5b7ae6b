//! In-memory transport simulator.
//!
//! [`SimTransport`] implements [`TagTransport`] against a process-local
//! value store instead of a real controller, so batching behavior can be
//! exercised without hardware. Demos and the integration tests run on it.
//!
//! Per-tag behavior is scriptable:
//!
//! - [`set_latency`](SimTransport::set_latency) delays completion, so the
//!   poll loop actually observes `Pending`;
//! - [`stall`](SimTransport::stall) makes a tag never complete, for
//!   timeout tests;
//! - [`fail_with`](SimTransport::fail_with) settles a tag's operations
//!   with a fixed error code;
//! - [`fail_destroy`](SimTransport::fail_destroy) makes handle close
//!   report an error (the handle still closes), for disposal-sweep tests.
//!
//! # Example
//!
//! ```
//! use logix_tags::{SimTransport, TagTransport, TransportStatus};
//!
//! let sim = SimTransport::new();
//! sim.preset("Speed", &42i32);
//!
//! let handle = sim
//!     .create("protocol=ab_eip&gateway=10.0.0.1&path=1,0&cpu=lgx&elem_size=4&elem_count=1&name=Speed")
//!     .unwrap();
//! sim.begin_read(handle).unwrap();
//! assert_eq!(sim.status(handle), TransportStatus::Ok);
//! assert_eq!(sim.read_value(handle).unwrap(), 42i32.to_le_bytes());
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::data_type::TagValue;
use crate::error::{Result, TagError};
use crate::transport::{
    TagHandle, TagTransport, TransportStatus, ERR_BAD_PARAM, ERR_NETWORK, ERR_NOT_FOUND,
    ERR_REMOTE, ERR_TIMEOUT, STATUS_OK, STATUS_PENDING,
};

#[derive(Debug, Clone, Copy)]
enum OpKind {
    Read,
    Write,
}

#[derive(Debug, Clone, Default)]
struct Script {
    latency: Duration,
    stall: bool,
    fail_code: Option<i32>,
    destroy_code: Option<i32>,
}

struct Session {
    name: String,
    op: Option<(OpKind, Instant)>,
    staged: Vec<u8>,
    fetched: Vec<u8>,
}

#[derive(Default)]
struct SimState {
    next_handle: u32,
    sessions: HashMap<u32, Session>,
    values: HashMap<String, Vec<u8>>,
    scripts: HashMap<String, Script>,
    destroyed: usize,
}

/// In-memory [`TagTransport`] implementation for tests and demos.
#[derive(Default)]
pub struct SimTransport {
    state: Mutex<SimState>,
}

impl SimTransport {
    /// Creates an empty simulator with no preset values or scripts.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        // A panic while holding the lock only poisons test state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Presets the stored value for a tag name.
    pub fn preset<T: TagValue>(&self, name: &str, value: &T) {
        self.preset_raw(name, value.encode());
    }

    /// Presets the stored value for a tag name from raw bytes.
    pub fn preset_raw(&self, name: &str, bytes: Vec<u8>) {
        self.state().values.insert(name.to_string(), bytes);
    }

    /// Returns the currently stored bytes for a tag name, if any.
    pub fn value_of(&self, name: &str) -> Option<Vec<u8>> {
        self.state().values.get(name).cloned()
    }

    /// Delays completion of every operation on the named tag.
    pub fn set_latency(&self, name: &str, latency: Duration) {
        self.state().scripts.entry(name.to_string()).or_default().latency = latency;
    }

    /// Makes every operation on the named tag report `Pending` forever.
    pub fn stall(&self, name: &str) {
        self.state().scripts.entry(name.to_string()).or_default().stall = true;
    }

    /// Makes every operation on the named tag settle with the given code.
    pub fn fail_with(&self, name: &str, code: i32) {
        self.state().scripts.entry(name.to_string()).or_default().fail_code = Some(code);
    }

    /// Makes destroying the named tag's handle report the given code.
    ///
    /// The handle is still closed; this models a close that fails at the
    /// protocol level after the local resources are gone.
    pub fn fail_destroy(&self, name: &str, code: i32) {
        self.state().scripts.entry(name.to_string()).or_default().destroy_code = Some(code);
    }

    /// Number of sessions currently open.
    pub fn open_sessions(&self) -> usize {
        self.state().sessions.len()
    }

    /// Number of handles destroyed so far.
    pub fn destroyed(&self) -> usize {
        self.state().destroyed
    }

    fn script_for(state: &SimState, name: &str) -> Script {
        state.scripts.get(name).cloned().unwrap_or_default()
    }
}

impl TagTransport for SimTransport {
    fn create(&self, address: &str) -> Result<TagHandle> {
        let mut attrs = HashMap::new();
        for pair in address.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                attrs.insert(key, value);
            }
        }
        for required in ["gateway", "name"] {
            match attrs.get(required) {
                Some(value) if !value.is_empty() => {}
                _ => {
                    return Err(TagError::handle_creation_failed(format!(
                        "address missing '{required}' attribute"
                    )))
                }
            }
        }
        let name = attrs["name"].to_string();

        let mut state = self.state();
        state.next_handle += 1;
        let handle = TagHandle(state.next_handle);
        state.sessions.insert(
            handle.0,
            Session {
                name,
                op: None,
                staged: Vec::new(),
                fetched: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn destroy(&self, handle: TagHandle) -> Result<()> {
        let mut state = self.state();
        let Some(session) = state.sessions.remove(&handle.0) else {
            return Err(TagError::transport(ERR_NOT_FOUND));
        };
        state.destroyed += 1;
        match Self::script_for(&state, &session.name).destroy_code {
            Some(code) => Err(TagError::transport(code)),
            None => Ok(()),
        }
    }

    fn begin_read(&self, handle: TagHandle) -> Result<()> {
        let mut state = self.state();
        let session = state
            .sessions
            .get_mut(&handle.0)
            .ok_or(TagError::Transport { code: ERR_NOT_FOUND })?;
        session.op = Some((OpKind::Read, Instant::now()));
        Ok(())
    }

    fn begin_write(&self, handle: TagHandle) -> Result<()> {
        let mut state = self.state();
        let session = state
            .sessions
            .get_mut(&handle.0)
            .ok_or(TagError::Transport { code: ERR_NOT_FOUND })?;
        session.op = Some((OpKind::Write, Instant::now()));
        Ok(())
    }

    fn status(&self, handle: TagHandle) -> TransportStatus {
        let mut state = self.state();
        let Some(session) = state.sessions.get(&handle.0) else {
            return TransportStatus::Error(ERR_NOT_FOUND);
        };
        let Some((kind, started)) = session.op else {
            // No operation in flight; the last one already settled.
            return TransportStatus::Ok;
        };
        let script = Self::script_for(&state, &session.name);
        if script.stall || started.elapsed() < script.latency {
            return TransportStatus::Pending;
        }
        if let Some(code) = script.fail_code {
            if let Some(session) = state.sessions.get_mut(&handle.0) {
                session.op = None;
            }
            return TransportStatus::Error(code);
        }

        let name = session.name.clone();
        match kind {
            OpKind::Read => {
                let value = state.values.get(&name).cloned().unwrap_or_default();
                if let Some(session) = state.sessions.get_mut(&handle.0) {
                    session.fetched = value;
                    session.op = None;
                }
            }
            OpKind::Write => {
                let staged = session.staged.clone();
                state.values.insert(name, staged);
                if let Some(session) = state.sessions.get_mut(&handle.0) {
                    session.op = None;
                }
            }
        }
        TransportStatus::Ok
    }

    fn read_value(&self, handle: TagHandle) -> Result<Vec<u8>> {
        let state = self.state();
        state
            .sessions
            .get(&handle.0)
            .map(|s| s.fetched.clone())
            .ok_or(TagError::Transport { code: ERR_NOT_FOUND })
    }

    fn write_value(&self, handle: TagHandle, bytes: &[u8]) -> Result<()> {
        let mut state = self.state();
        let session = state
            .sessions
            .get_mut(&handle.0)
            .ok_or(TagError::Transport { code: ERR_NOT_FOUND })?;
        session.staged = bytes.to_vec();
        Ok(())
    }

    fn decode_error(&self, code: i32) -> String {
        let text = match code {
            STATUS_OK => "operation succeeded",
            STATUS_PENDING => "operation pending",
            ERR_BAD_PARAM => "bad parameter or address attribute",
            ERR_NETWORK => "network failure",
            ERR_NOT_FOUND => "tag not found",
            ERR_REMOTE => "controller reported an error",
            ERR_TIMEOUT => "operation timed out",
            _ => return format!("unknown status {code}"),
        };
        text.to_string()
    }
}
