//! # Batched Tag I/O for Allen-Bradley PLCs
//!
//! A Rust library for reading and writing named data points ("tags") on
//! Allen-Bradley family controllers over EtherNet/IP (CIP). The wire
//! protocol itself lives in an external transport driven through a
//! handle-based API; this crate implements the part with real concurrency
//! and lifecycle complexity — connection identity, tag-handle ownership,
//! and the batched read/write state machine:
//!
//! - **Pipelined batches** — a [`TagGroup`] starts every member tag's
//!   asynchronous operation before polling any of them, so round-trips to
//!   the controller overlap instead of serializing.
//! - **Per-tag outcomes** — one slow or broken tag never aborts the
//!   others; every member independently settles to success, a transport
//!   error, or timeout, collected in a [`BatchReport`].
//! - **Deterministic disposal** — each tag exclusively owns one transport
//!   handle; closing the [`Controller`] releases every handle exactly
//!   once, best-effort, and `Drop` backstops a forgotten `close()`.
//! - **No panics** — all errors returned as `Result<T, TagError>`.
//!
//! ## Quick Start
//!
//! ```
//! use logix_tags::{Controller, ControllerConfig, CpuFamily, DataType, SimTransport};
//! use std::sync::Arc;
//!
//! fn main() -> logix_tags::Result<()> {
//!     // The simulator stands in for the native transport here; against
//!     // real hardware you would wrap the protocol library instead.
//!     let sim = Arc::new(SimTransport::new());
//!     sim.preset("Motor1.Speed", &1450i32);
//!     sim.preset("Motor1.Running", &true);
//!
//!     // ControlLogix sits behind a backplane, so a routing path is required.
//!     let config = ControllerConfig::new("10.0.0.1", CpuFamily::ControlLogix)
//!         .with_path("1,0");
//!     let mut controller = Controller::connect(config, sim)?;
//!
//!     let motors = controller.create_group();
//!     let speed = controller.create_tag(motors, "Motor1.Speed", DataType::Dint)?;
//!     let running = controller.create_tag(motors, "Motor1.Running", DataType::Bool)?;
//!
//!     // One synchronous-looking call, pipelined under the hood.
//!     let report = controller.read_group(motors, None)?;
//!     assert!(report.all_ok());
//!
//!     let rpm: i32 = controller.tag(speed).unwrap().get()?;
//!     let on: bool = controller.tag(running).unwrap().get()?;
//!     println!("speed={rpm} running={on}");
//!
//!     controller.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Writing
//!
//! Writes are staged locally with [`Tag::set`] and flushed as a batch:
//!
//! ```
//! # use logix_tags::{Controller, ControllerConfig, CpuFamily, DataType, SimTransport};
//! # use std::sync::Arc;
//! # let sim = Arc::new(SimTransport::new());
//! # let config = ControllerConfig::new("10.0.0.1", CpuFamily::CompactLogix).with_path("1,0");
//! # let mut controller = Controller::connect(config, sim)?;
//! # let group = controller.create_group();
//! # let setpoint = controller.create_tag(group, "Setpoint", DataType::Real)?;
//! controller.tag_mut(setpoint).unwrap().set(&72.5f32)?;
//! let report = controller.write_group(group, None)?;
//! assert!(report.all_ok());
//! # Ok::<(), logix_tags::TagError>(())
//! ```
//!
//! ## Partial failure
//!
//! The aggregate call never fails because a member did. Aggregation
//! policy — "fail if any failed", "use what arrived" — belongs to the
//! caller:
//!
//! ```
//! # use logix_tags::{Controller, ControllerConfig, CpuFamily, DataType, SimTransport};
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # let sim = Arc::new(SimTransport::new());
//! # sim.preset("Good", &1i32);
//! # sim.stall("Stuck");
//! # let config = ControllerConfig::new("10.0.0.1", CpuFamily::ControlLogix)
//! #     .with_path("1,0")
//! #     .with_poll_interval(Duration::from_millis(2));
//! # let mut controller = Controller::connect(config, sim)?;
//! # let group = controller.create_group();
//! # controller.create_tag(group, "Good", DataType::Dint)?;
//! # controller.create_tag(group, "Stuck", DataType::Dint)?;
//! let report = controller.read_group(group, Some(Duration::from_millis(50)))?;
//! for entry in report.failures() {
//!     eprintln!("{}: {}", entry.name, controller.decode_error(-32));
//! }
//! # Ok::<(), logix_tags::TagError>(())
//! ```
//!
//! ## Controller families
//!
//! The [`CpuFamily`] decides whether a routing path is mandatory:
//! Logix-class controllers (ControlLogix, CompactLogix) require one, the
//! PLC-5/SLC/MicroLogix families do not. Construction fails fast with
//! [`TagError::InvalidConfiguration`] when a required path is missing.
//!
//! ## Design Philosophy
//!
//! 1. The transport owns bytes; this crate owns batching and lifecycle.
//! 2. Per-tag outcomes over all-or-nothing aggregates.
//! 3. Timeout is the only cancellation; abandoned operations are cleaned
//!    up at disposal, not aborted mid-flight.
//! 4. Explicit `close()` is the contract; `Drop` is a leak detector.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod address;
mod controller;
mod cpu;
mod data_type;
mod error;
mod group;
mod probe;
mod sim;
mod tag;
mod transport;

// Public re-exports
pub use controller::{Controller, ControllerConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
pub use cpu::CpuFamily;
pub use data_type::{DataType, TagValue};
pub use error::{Result, TagError};
pub use group::{BatchEntry, BatchReport, GroupId, TagGroup, TagId};
pub use probe::{ProbeReport, Prober, SystemProber};
pub use sim::SimTransport;
pub use tag::{Tag, TagState};
pub use transport::{
    TagHandle, TagTransport, TransportStatus, ERR_BAD_PARAM, ERR_NETWORK, ERR_NOT_FOUND,
    ERR_REMOTE, ERR_TIMEOUT, STATUS_OK, STATUS_PENDING,
};
