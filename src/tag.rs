//! Tags and their per-operation state machine.
//!
//! A [`Tag`] is one named data point on the controller. It exclusively
//! owns one transport handle, created when the tag is created and
//! destroyed exactly once when the owning group is closed. Between those
//! points the tag caches the last value read (or written) and tracks the
//! state of its current operation:
//!
//! ```text
//! Idle ──begin──▶ Pending ──poll──▶ Ok
//!                         └───────▶ Faulted(code)
//!                         └───────▶ TimedOut   (deadline, marked by the group)
//! ```
//!
//! A `Pending → terminal` transition happens at most once per operation;
//! once terminal, the tag is excluded from further polling. Tags never
//! start operations on their own — only the owning
//! [`TagGroup`](crate::TagGroup)'s batch loop drives them, which is what
//! keeps a single tag from carrying two in-flight operations at once.

use log::{debug, warn};

use crate::data_type::{DataType, TagValue};
use crate::error::{Result, TagError};
use crate::transport::{TagHandle, TagTransport, TransportStatus};

/// State of a tag's most recent operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagState {
    /// No operation has been started yet.
    Idle,
    /// An operation is in flight.
    Pending,
    /// The last operation completed successfully.
    Ok,
    /// The last operation failed with a transport status code.
    Faulted(i32),
    /// The last operation was still pending when the group deadline passed.
    TimedOut,
}

impl TagState {
    /// Returns whether the last operation completed successfully.
    pub fn is_ok(self) -> bool {
        matches!(self, TagState::Ok)
    }

    /// Returns whether this state ends an operation (anything but
    /// `Idle`/`Pending`).
    pub fn is_terminal(self) -> bool {
        !matches!(self, TagState::Idle | TagState::Pending)
    }
}

impl std::fmt::Display for TagState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagState::Idle => write!(f, "idle"),
            TagState::Pending => write!(f, "pending"),
            TagState::Ok => write!(f, "ok"),
            TagState::Faulted(code) => write!(f, "error {code}"),
            TagState::TimedOut => write!(f, "timeout"),
        }
    }
}

/// Kind of batched operation a group drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpKind {
    Read,
    Write,
}

/// A named, typed data point bound to one controller tag session.
///
/// Tags are created through
/// [`Controller::create_tag`](crate::Controller::create_tag) and always
/// belong to exactly one [`TagGroup`](crate::TagGroup). Reading and
/// writing happen in batches via the group; the tag itself only exposes
/// typed access to the cached value.
pub struct Tag {
    name: String,
    address: String,
    data_type: DataType,
    handle: Option<TagHandle>,
    state: TagState,
    op: Option<OpKind>,
    cached: Vec<u8>,
    staged: Option<Vec<u8>>,
}

impl Tag {
    pub(crate) fn new(
        name: String,
        address: String,
        data_type: DataType,
        handle: TagHandle,
    ) -> Self {
        debug!("tag '{name}' opened (handle {})", handle.raw());
        Self {
            name,
            address,
            data_type,
            handle: Some(handle),
            state: TagState::Idle,
            op: None,
            cached: Vec::new(),
            staged: None,
        }
    }

    /// Returns the tag name (unique within its controller).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the transport address string the tag was opened with.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the declared data type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns the state of the most recent operation.
    pub fn state(&self) -> TagState {
        self.state
    }

    /// Decodes the cached last-known value as `T`.
    ///
    /// The cache is only refreshed by a successful batched read (or by the
    /// completion of a batched write of this tag).
    ///
    /// # Errors
    ///
    /// - [`TypeMismatch`](TagError::TypeMismatch) if `T` does not match the
    ///   tag's declared data type.
    /// - [`NoValue`](TagError::NoValue) if the tag has never resolved a
    ///   value.
    ///
    /// # Example
    ///
    /// ```
    /// # use logix_tags::{Controller, ControllerConfig, CpuFamily, DataType, SimTransport};
    /// # use std::sync::Arc;
    /// # let sim = Arc::new(SimTransport::new());
    /// # sim.preset("Speed", &42i32);
    /// # let config = ControllerConfig::new("10.0.0.1", CpuFamily::ControlLogix).with_path("1,0");
    /// # let mut controller = Controller::connect(config, sim).unwrap();
    /// # let group = controller.create_group();
    /// # let speed = controller.create_tag(group, "Speed", DataType::Dint).unwrap();
    /// # controller.read_group(group, None).unwrap();
    /// let speed_value: i32 = controller.tag(speed).unwrap().get()?;
    /// assert_eq!(speed_value, 42);
    /// # Ok::<(), logix_tags::TagError>(())
    /// ```
    pub fn get<T: TagValue>(&self) -> Result<T> {
        if T::data_type() != self.data_type {
            return Err(TagError::type_mismatch(
                self.data_type.to_string(),
                T::data_type().to_string(),
            ));
        }
        if self.cached.is_empty() {
            return Err(TagError::no_value(&self.name));
        }
        T::decode(&self.cached)
    }

    /// Stages a value to be sent by the next batched write.
    ///
    /// No I/O happens here; the value is held locally until
    /// [`Controller::write_group`](crate::Controller::write_group) runs.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`](TagError::TypeMismatch) if `T` does not
    /// match the tag's declared data type.
    pub fn set<T: TagValue>(&mut self, value: &T) -> Result<()> {
        if T::data_type() != self.data_type {
            return Err(TagError::type_mismatch(
                self.data_type.to_string(),
                T::data_type().to_string(),
            ));
        }
        self.staged = Some(value.encode());
        Ok(())
    }

    /// Returns whether a value is staged for the next batched write.
    pub fn has_staged_value(&self) -> bool {
        self.staged.is_some()
    }

    /// Starts this tag's part of a batched operation.
    ///
    /// Start-phase failures become the tag's terminal outcome immediately;
    /// the rest of the batch proceeds.
    pub(crate) fn begin(&mut self, transport: &dyn TagTransport, kind: OpKind) {
        debug_assert!(
            self.state != TagState::Pending,
            "tag '{}' already has an operation in flight",
            self.name
        );
        let Some(handle) = self.handle else {
            self.state = TagState::Faulted(TagError::Closed.status_code());
            return;
        };

        if kind == OpKind::Write && self.staged.is_none() {
            // Nothing staged: a no-op success for this batch.
            self.op = None;
            self.state = TagState::Ok;
            return;
        }

        let started = match kind {
            OpKind::Read => transport.begin_read(handle),
            OpKind::Write => {
                let staged = self.staged.clone().unwrap_or_default();
                transport
                    .write_value(handle, &staged)
                    .and_then(|()| transport.begin_write(handle))
            }
        };

        match started {
            Ok(()) => {
                self.op = Some(kind);
                self.state = TagState::Pending;
            }
            Err(err) => {
                warn!("tag '{}': start failed: {err}", self.name);
                self.op = None;
                self.state = TagState::Faulted(err.status_code());
            }
        }
    }

    /// Polls the in-flight operation once.
    ///
    /// Does nothing unless the tag is `Pending`; the transition to a
    /// terminal state happens at most once per operation.
    pub(crate) fn poll(&mut self, transport: &dyn TagTransport) {
        if self.state != TagState::Pending {
            return;
        }
        let Some(handle) = self.handle else {
            self.state = TagState::Faulted(TagError::Closed.status_code());
            return;
        };

        match transport.status(handle) {
            TransportStatus::Pending => {}
            TransportStatus::Ok => {
                match self.op {
                    Some(OpKind::Read) => match transport.read_value(handle) {
                        Ok(bytes) => {
                            self.cached = bytes;
                            self.state = TagState::Ok;
                        }
                        Err(err) => {
                            self.state = TagState::Faulted(err.status_code());
                        }
                    },
                    Some(OpKind::Write) => {
                        // The controller now holds the staged value; it is
                        // the best last-known value we have.
                        if let Some(staged) = self.staged.clone() {
                            self.cached = staged;
                        }
                        self.state = TagState::Ok;
                    }
                    None => {
                        self.state = TagState::Ok;
                    }
                }
                self.op = None;
            }
            TransportStatus::Error(code) => {
                debug!("tag '{}' settled with status {code}", self.name);
                self.op = None;
                self.state = TagState::Faulted(code);
            }
        }
    }

    /// Marks a still-pending operation as timed out.
    ///
    /// The in-flight native operation is abandoned, not aborted; the
    /// handle is closed later at disposal.
    pub(crate) fn mark_timed_out(&mut self) {
        if self.state == TagState::Pending {
            self.op = None;
            self.state = TagState::TimedOut;
        }
    }

    /// Closes the transport handle. Idempotent; errors are logged and
    /// swallowed so a disposal sweep always finishes.
    pub(crate) fn close(&mut self, transport: &dyn TagTransport) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = transport.destroy(handle) {
                warn!("tag '{}': close reported {err}", self.name);
            } else {
                debug!("tag '{}' closed", self.name);
            }
        }
    }

    /// Returns whether the transport handle has been released.
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }
}

impl std::fmt::Debug for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tag")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("state", &self.state)
            .field("closed", &self.handle.is_none())
            .finish()
    }
}
