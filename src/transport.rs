//! Transport boundary for asynchronous tag sessions.
//!
//! This crate does not implement the CIP/EtherNet-IP codec. It drives an
//! external transport through the handle-based API defined here: the
//! transport owns session negotiation, framing and the address-string
//! grammar; this crate owns grouping, polling and lifecycle. The batching
//! layer never sees bytes on the wire, only handles and status codes.
//!
//! # Contract
//!
//! - [`TagTransport::create`] opens one tag session for an address string
//!   and returns an opaque [`TagHandle`]. The handle is exclusively owned
//!   by one [`Tag`](crate::Tag) until [`TagTransport::destroy`].
//! - `begin_read`/`begin_write` start an operation without blocking; the
//!   transport is free to pipeline many in-flight operations to the same
//!   controller.
//! - [`TagTransport::status`] is a cheap, repeatable, side-effect-free
//!   check. An operation reports [`TransportStatus::Pending`] until it
//!   settles, then `Ok` or `Error` exactly once per operation.
//! - `read_value`/`write_value` move raw bytes across the boundary; byte
//!   interpretation belongs to [`TagValue`](crate::TagValue).
//!
//! The crate ships one implementation, the in-memory
//! [`SimTransport`](crate::SimTransport), used by tests and demos.

use crate::error::Result;

/// Status code for a completed operation.
pub const STATUS_OK: i32 = 0;
/// Status code for an operation still in flight.
pub const STATUS_PENDING: i32 = 1;
/// An argument or address attribute was rejected.
pub const ERR_BAD_PARAM: i32 = -5;
/// The network layer reported a failure.
pub const ERR_NETWORK: i32 = -14;
/// The tag does not exist on the controller.
pub const ERR_NOT_FOUND: i32 = -20;
/// The controller replied with an error.
pub const ERR_REMOTE: i32 = -27;
/// The operation exceeded its deadline.
pub const ERR_TIMEOUT: i32 = -32;

/// Opaque identifier for one open tag session.
///
/// Handles are issued by [`TagTransport::create`] and are only meaningful
/// to the transport that issued them. Each handle is owned by exactly one
/// [`Tag`](crate::Tag) and is destroyed exactly once at disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagHandle(pub(crate) u32);

impl TagHandle {
    /// Returns the raw handle value (diagnostics only).
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Result of polling an in-flight operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// The operation has not settled yet.
    Pending,
    /// The operation completed successfully.
    Ok,
    /// The operation failed with the given status code.
    Error(i32),
}

impl TransportStatus {
    /// Maps a raw status code onto the enum.
    ///
    /// Zero is success, [`STATUS_PENDING`] is in flight, anything else is
    /// an error code surfaced verbatim.
    pub fn from_code(code: i32) -> Self {
        match code {
            STATUS_OK => TransportStatus::Ok,
            STATUS_PENDING => TransportStatus::Pending,
            other => TransportStatus::Error(other),
        }
    }
}

/// Handle-based API the batching core drives.
///
/// Implementations wrap the native protocol library (or, for tests, an
/// in-memory fake). All methods take `&self`: the transport is shared by
/// every tag on a controller and is expected to synchronize internally.
pub trait TagTransport: Send + Sync {
    /// Opens a tag session for the given address string.
    ///
    /// # Errors
    ///
    /// Returns [`HandleCreationFailed`](crate::TagError::HandleCreationFailed)
    /// if the transport rejects the address or configuration.
    fn create(&self, address: &str) -> Result<TagHandle>;

    /// Closes a tag session. The handle is invalid afterwards.
    ///
    /// # Errors
    ///
    /// May report a transport error; callers performing disposal sweeps
    /// treat such errors as best-effort and keep closing other handles.
    fn destroy(&self, handle: TagHandle) -> Result<()>;

    /// Starts an asynchronous read. Does not block.
    fn begin_read(&self, handle: TagHandle) -> Result<()>;

    /// Starts an asynchronous write of the bytes previously staged with
    /// [`write_value`](TagTransport::write_value). Does not block.
    fn begin_write(&self, handle: TagHandle) -> Result<()>;

    /// Polls the status of the last started operation.
    fn status(&self, handle: TagHandle) -> TransportStatus;

    /// Returns the bytes fetched by the last completed read.
    fn read_value(&self, handle: TagHandle) -> Result<Vec<u8>>;

    /// Stages bytes to be sent by the next [`begin_write`](TagTransport::begin_write).
    fn write_value(&self, handle: TagHandle, bytes: &[u8]) -> Result<()>;

    /// Returns the transport's message text for a status code.
    fn decode_error(&self, code: i32) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_code() {
        assert_eq!(TransportStatus::from_code(0), TransportStatus::Ok);
        assert_eq!(TransportStatus::from_code(1), TransportStatus::Pending);
        assert_eq!(
            TransportStatus::from_code(ERR_TIMEOUT),
            TransportStatus::Error(-32)
        );
    }

    #[test]
    fn test_handle_raw() {
        assert_eq!(TagHandle(7).raw(), 7);
    }
}
