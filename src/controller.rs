//! Controller identity, registries and lifecycle.
//!
//! A [`Controller`] holds the connection identity (gateway address,
//! routing path, CPU family), the registries of groups and tags created
//! against it, and the communication timeout shared by batched operations.
//! It is the single owner of everything it creates: groups own their tags,
//! the controller owns its groups, and closing the controller cascades to
//! every tag handle exactly once.
//!
//! Callers hold copyable [`GroupId`]/[`TagId`] keys and borrow groups and
//! tags back through the controller. That keeps registry mutation
//! single-threaded and handle ownership exclusive by construction rather
//! than by convention.
//!
//! # Example
//!
//! ```
//! use logix_tags::{Controller, ControllerConfig, CpuFamily, DataType, SimTransport};
//! use std::sync::Arc;
//!
//! let sim = Arc::new(SimTransport::new());
//! sim.preset("Speed", &1500i32);
//!
//! let config = ControllerConfig::new("10.0.0.1", CpuFamily::ControlLogix).with_path("1,0");
//! let mut controller = Controller::connect(config, sim)?;
//!
//! let line = controller.create_group();
//! let speed = controller.create_tag(line, "Speed", DataType::Dint)?;
//!
//! let report = controller.read_group(line, None)?;
//! assert!(report.all_ok());
//! assert_eq!(controller.tag(speed).unwrap().get::<i32>()?, 1500);
//!
//! controller.close();
//! # Ok::<(), logix_tags::TagError>(())
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::address::tag_address;
use crate::cpu::CpuFamily;
use crate::data_type::DataType;
use crate::error::{Result, TagError};
use crate::group::{BatchReport, GroupId, TagGroup, TagId};
use crate::probe::{Prober, SystemProber};
use crate::tag::Tag;
use crate::transport::TagTransport;

/// Default communication timeout for batched operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default sleep between poll sweeps.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for connecting a [`Controller`].
///
/// # Example
///
/// ```
/// use logix_tags::{ControllerConfig, CpuFamily};
/// use std::time::Duration;
///
/// let config = ControllerConfig::new("10.0.0.1", CpuFamily::ControlLogix)
///     .with_path("1,0")
///     .with_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Gateway IP address or hostname.
    pub gateway: String,
    /// Routing path from the gateway to the CPU (e.g. `"1,0"`).
    ///
    /// Required for Logix-class families, optional for the rest.
    pub path: Option<String>,
    /// Controller model family.
    pub cpu: CpuFamily,
    /// Communication timeout for batched operations.
    pub timeout: Duration,
    /// Sleep between poll sweeps inside a batched operation.
    pub poll_interval: Duration,
}

impl ControllerConfig {
    /// Creates a configuration with default timeout and no routing path.
    pub fn new(gateway: impl Into<String>, cpu: CpuFamily) -> Self {
        Self {
            gateway: gateway.into(),
            path: None,
            cpu,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the routing path (e.g. `"1,0"` for backplane port, slot 0).
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets a custom communication timeout (default is 5000 ms).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets a custom poll interval (default is 10 ms).
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// One PLC connection identity plus the groups and tags created against it.
///
/// See the [module docs](self) for the ownership model and an end-to-end
/// example.
pub struct Controller {
    gateway: String,
    path: Option<String>,
    cpu: CpuFamily,
    timeout: Duration,
    poll_interval: Duration,
    transport: Arc<dyn TagTransport>,
    prober: Box<dyn Prober>,
    groups: Vec<TagGroup>,
    tag_names: BTreeSet<String>,
    tag_order: Vec<TagId>,
    closed: bool,
}

impl Controller {
    /// Validates the configuration and builds a controller over the given
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfiguration`](TagError::InvalidConfiguration)
    /// when the CPU family mandates a routing path and none (or an empty
    /// one) was configured, or when the gateway address is empty.
    pub fn connect(config: ControllerConfig, transport: Arc<dyn TagTransport>) -> Result<Self> {
        if config.gateway.is_empty() {
            return Err(TagError::invalid_configuration("gateway address is empty"));
        }
        let path = config.path.filter(|p| !p.is_empty());
        if config.cpu.requires_path() && path.is_none() {
            return Err(TagError::invalid_configuration(format!(
                "routing path is required for {}",
                config.cpu
            )));
        }

        debug!(
            "controller connected: gateway={} cpu={} path={:?}",
            config.gateway, config.cpu, path
        );
        Ok(Self {
            gateway: config.gateway,
            path,
            cpu: config.cpu,
            timeout: config.timeout,
            poll_interval: config.poll_interval,
            transport,
            prober: Box::new(SystemProber),
            groups: Vec::new(),
            tag_names: BTreeSet::new(),
            tag_order: Vec::new(),
            closed: false,
        })
    }

    /// Returns the gateway address.
    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    /// Returns the routing path, if one was configured.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the controller family.
    pub fn cpu(&self) -> CpuFamily {
        self.cpu
    }

    /// Returns the communication timeout used when a batched call passes
    /// no explicit one.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Changes the communication timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Replaces the reachability prober (tests use a canned one).
    pub fn set_prober(&mut self, prober: Box<dyn Prober>) {
        self.prober = prober;
    }

    /// Creates a new, empty tag group owned by this controller.
    pub fn create_group(&mut self) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(TagGroup::new(id));
        id
    }

    /// Returns the groups created so far, in creation order.
    pub fn groups(&self) -> &[TagGroup] {
        &self.groups
    }

    /// Borrows a group by id.
    pub fn group(&self, id: GroupId) -> Option<&TagGroup> {
        self.groups.get(id.0)
    }

    /// Creates a tag in the given group and opens its transport handle.
    ///
    /// The tag's address string is composed from the controller identity
    /// plus the tag's own name and data type. The name must be unique
    /// across the whole controller, not just within the group.
    ///
    /// # Errors
    ///
    /// - [`Closed`](TagError::Closed) if the controller was closed.
    /// - [`InvalidConfiguration`](TagError::InvalidConfiguration) if the
    ///   group id is stale.
    /// - [`DuplicateTag`](TagError::DuplicateTag) on a name collision; the
    ///   existing tag is unaffected.
    /// - [`HandleCreationFailed`](TagError::HandleCreationFailed) if the
    ///   transport rejects the address.
    pub fn create_tag(
        &mut self,
        group: GroupId,
        name: impl Into<String>,
        data_type: DataType,
    ) -> Result<TagId> {
        if self.closed {
            return Err(TagError::Closed);
        }
        let name = name.into();
        if self.groups.get(group.0).is_none() {
            return Err(TagError::invalid_configuration(format!(
                "no such group: {}",
                group.0
            )));
        }
        if self.tag_names.contains(&name) {
            return Err(TagError::duplicate_tag(name));
        }

        let address = tag_address(&self.gateway, self.path.as_deref(), self.cpu, &name, data_type);
        let handle = self.transport.create(&address)?;
        let tag = Tag::new(name.clone(), address, data_type, handle);

        // Registration happens only after the handle exists, so a failed
        // creation leaves no trace in the registries.
        let index = self.groups[group.0].push(tag);
        let id = TagId { group, index };
        self.tag_names.insert(name);
        self.tag_order.push(id);
        Ok(id)
    }

    /// Borrows a tag by id.
    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.groups.get(id.group.0)?.tag(id.index)
    }

    /// Mutably borrows a tag by id (for [`Tag::set`]).
    pub fn tag_mut(&mut self, id: TagId) -> Option<&mut Tag> {
        self.groups.get_mut(id.group.0)?.tag_mut(id.index)
    }

    /// Iterates over every tag on the controller, in creation order.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tag_order.iter().filter_map(move |id| self.tag(*id))
    }

    /// Reads every tag in the group as one pipelined batch.
    ///
    /// `timeout` overrides the controller-wide setting for this call; the
    /// budget always starts fresh per call. Per-tag failures land in the
    /// report, never as an `Err` — the call itself only fails if the
    /// controller is closed or the group id is stale.
    pub fn read_group(&mut self, group: GroupId, timeout: Option<Duration>) -> Result<BatchReport> {
        let (transport, timeout, poll) = self.batch_params(timeout)?;
        let group = self
            .groups
            .get_mut(group.0)
            .ok_or_else(|| TagError::invalid_configuration(format!("no such group: {}", group.0)))?;
        Ok(group.read_all(transport.as_ref(), timeout, poll))
    }

    /// Writes every tag in the group that has a staged value, as one
    /// pipelined batch. Same contract as [`read_group`](Self::read_group).
    pub fn write_group(&mut self, group: GroupId, timeout: Option<Duration>) -> Result<BatchReport> {
        let (transport, timeout, poll) = self.batch_params(timeout)?;
        let group = self
            .groups
            .get_mut(group.0)
            .ok_or_else(|| TagError::invalid_configuration(format!("no such group: {}", group.0)))?;
        Ok(group.write_all(transport.as_ref(), timeout, poll))
    }

    fn batch_params(
        &self,
        timeout: Option<Duration>,
    ) -> Result<(Arc<dyn TagTransport>, Duration, Duration)> {
        if self.closed {
            return Err(TagError::Closed);
        }
        Ok((
            Arc::clone(&self.transport),
            timeout.unwrap_or(self.timeout),
            self.poll_interval,
        ))
    }

    /// Sends one reachability probe to the gateway.
    ///
    /// When `echo` is set, a one-line human-readable report is written to
    /// standard output; that side channel is not part of the return
    /// contract.
    pub fn ping(&self, echo: bool) -> bool {
        let report = self.prober.probe(&self.gateway, self.timeout);
        if echo {
            println!("{report}");
        }
        report.success
    }

    /// Returns the transport's message text for a status code.
    pub fn decode_error(&self, code: i32) -> String {
        self.transport.decode_error(code)
    }

    /// Returns whether the controller has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes the controller: every group's member handles are destroyed
    /// (best-effort, exactly once each) and the registries are cleared.
    ///
    /// Idempotent; later calls are no-ops. This is the deterministic
    /// disposal callers should rely on — the `Drop` fallback only covers
    /// forgotten controllers.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for group in &mut self.groups {
            group.close(self.transport.as_ref());
        }
        self.groups.clear();
        self.tag_names.clear();
        self.tag_order.clear();
        debug!("controller {} closed", self.gateway);
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if !self.closed && !self.groups.is_empty() {
            warn!(
                "controller {} dropped without close(); releasing {} group(s)",
                self.gateway,
                self.groups.len()
            );
        }
        self.close();
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("gateway", &self.gateway)
            .field("path", &self.path)
            .field("cpu", &self.cpu)
            .field("timeout", &self.timeout)
            .field("groups", &self.groups.len())
            .field("tags", &self.tag_order.len())
            .field("closed", &self.closed)
            .finish()
    }
}
