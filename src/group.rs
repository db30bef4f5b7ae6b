//! Tag groups and the batched poll loop.
//!
//! Grouping exists for one reason: a controller round-trip costs the same
//! whether one request or twenty are in flight, so the group starts every
//! member's asynchronous operation first and only then begins polling.
//! The transport pipelines the in-flight requests; this loop just watches
//! them settle.
//!
//! The loop is the protocol-level core of the crate:
//!
//! 1. **Start phase** — issue the read (or write) for every member without
//!    waiting. A member whose start fails gets its terminal outcome right
//!    there; the rest of the batch is unaffected.
//! 2. **Poll phase** — sweep only the still-pending members. Each member
//!    transitions `Pending → terminal` exactly once and is then excluded
//!    from later sweeps. A bounded sleep between sweeps keeps the loop
//!    from busy-spinning.
//! 3. **Termination** — when every member is terminal, or when the
//!    deadline passes. On deadline, still-pending members are marked
//!    [`TagState::TimedOut`]; members that already settled keep their
//!    outcome.
//!
//! One member's failure never aborts the others: the call always returns a
//! [`BatchReport`] with an independent outcome per tag, and any
//! all-or-nothing policy is the caller's to apply on top.

use std::time::{Duration, Instant};

use log::debug;

use crate::tag::{OpKind, Tag, TagState};
use crate::transport::TagTransport;

/// Key identifying a [`TagGroup`] within its controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) usize);

/// Key identifying a [`Tag`] within its controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId {
    pub(crate) group: GroupId,
    pub(crate) index: usize,
}

impl TagId {
    /// Returns the id of the group this tag belongs to.
    pub fn group(self) -> GroupId {
        self.group
    }
}

/// Outcome of a batched read or write for one member tag.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// Name of the tag.
    pub name: String,
    /// Terminal state the tag reached in this batch.
    pub outcome: TagState,
}

impl BatchEntry {
    /// Returns whether this tag's operation succeeded.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-tag outcomes of one batched read or write, in member order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    entries: Vec<BatchEntry>,
    elapsed: Duration,
}

impl BatchReport {
    /// Returns whether every member succeeded.
    pub fn all_ok(&self) -> bool {
        self.entries.iter().all(BatchEntry::is_ok)
    }

    /// Returns how many members succeeded.
    pub fn ok_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_ok()).count()
    }

    /// Iterates over the members that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| !e.is_ok())
    }

    /// Iterates over all entries in member order.
    pub fn iter(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter()
    }

    /// Returns the outcome recorded for a tag name, if it was a member.
    pub fn outcome_of(&self, name: &str) -> Option<TagState> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.outcome)
    }

    /// Number of member tags in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the batch had no members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wall-clock time the batch took.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// A batch of tags read and written together against one controller.
///
/// Groups are created through
/// [`Controller::create_group`](crate::Controller::create_group) and own
/// their member tags; a tag belongs to exactly one group for its whole
/// life. The batched operations are driven through the controller
/// ([`read_group`](crate::Controller::read_group) /
/// [`write_group`](crate::Controller::write_group)), which lends the group
/// its transport.
pub struct TagGroup {
    id: GroupId,
    tags: Vec<Tag>,
}

impl TagGroup {
    pub(crate) fn new(id: GroupId) -> Self {
        Self { id, tags: Vec::new() }
    }

    /// Returns this group's id.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the member tags in creation order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Number of member tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub(crate) fn push(&mut self, tag: Tag) -> usize {
        self.tags.push(tag);
        self.tags.len() - 1
    }

    pub(crate) fn tag(&self, index: usize) -> Option<&Tag> {
        self.tags.get(index)
    }

    pub(crate) fn tag_mut(&mut self, index: usize) -> Option<&mut Tag> {
        self.tags.get_mut(index)
    }

    pub(crate) fn read_all(
        &mut self,
        transport: &dyn TagTransport,
        timeout: Duration,
        poll_interval: Duration,
    ) -> BatchReport {
        self.run_batch(transport, OpKind::Read, timeout, poll_interval)
    }

    pub(crate) fn write_all(
        &mut self,
        transport: &dyn TagTransport,
        timeout: Duration,
        poll_interval: Duration,
    ) -> BatchReport {
        self.run_batch(transport, OpKind::Write, timeout, poll_interval)
    }

    /// The batched poll state machine. See the module docs for the phases.
    fn run_batch(
        &mut self,
        transport: &dyn TagTransport,
        kind: OpKind,
        timeout: Duration,
        poll_interval: Duration,
    ) -> BatchReport {
        let started = Instant::now();
        let deadline = started + timeout;

        // Start phase: get everything in flight before polling anything.
        for tag in &mut self.tags {
            tag.begin(transport, kind);
        }

        loop {
            let mut pending = 0usize;
            for tag in &mut self.tags {
                if tag.state() == TagState::Pending {
                    tag.poll(transport);
                    if tag.state() == TagState::Pending {
                        pending += 1;
                    }
                }
            }
            if pending == 0 {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(
                    "group {:?}: deadline passed with {pending} tag(s) pending",
                    self.id
                );
                for tag in &mut self.tags {
                    tag.mark_timed_out();
                }
                break;
            }

            // Bounded sleep: never past the deadline, never busy-spinning.
            std::thread::sleep(poll_interval.min(deadline - now));
        }

        let report = BatchReport {
            entries: self
                .tags
                .iter()
                .map(|tag| BatchEntry {
                    name: tag.name().to_string(),
                    outcome: tag.state(),
                })
                .collect(),
            elapsed: started.elapsed(),
        };
        debug!(
            "group {:?}: batch settled, {}/{} ok in {:?}",
            self.id,
            report.ok_count(),
            report.len(),
            report.elapsed()
        );
        report
    }

    /// Closes every member's handle, best-effort, then drops the members.
    ///
    /// An error closing one handle never stops the sweep. Idempotent.
    pub(crate) fn close(&mut self, transport: &dyn TagTransport) {
        for tag in &mut self.tags {
            tag.close(transport);
        }
        self.tags.clear();
    }
}

impl std::fmt::Debug for TagGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagGroup")
            .field("id", &self.id.0)
            .field("tags", &self.tags.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataType;
    use crate::sim::SimTransport;
    use crate::transport::ERR_REMOTE;

    const TIMEOUT: Duration = Duration::from_millis(500);
    const POLL: Duration = Duration::from_millis(2);

    fn group_with(sim: &SimTransport, names: &[&str]) -> TagGroup {
        let mut group = TagGroup::new(GroupId(0));
        for name in names {
            let address = format!(
                "protocol=ab_eip&gateway=10.0.0.1&path=1,0&cpu=lgx&elem_size=4&elem_count=1&name={name}"
            );
            let handle = sim.create(&address).unwrap();
            group.push(Tag::new(name.to_string(), address, DataType::Dint, handle));
        }
        group
    }

    #[test]
    fn test_empty_group_read_is_trivially_ok() {
        let sim = SimTransport::new();
        let mut group = group_with(&sim, &[]);
        let report = group.read_all(&sim, TIMEOUT, POLL);
        assert!(report.is_empty());
        assert!(report.all_ok());
    }

    #[test]
    fn test_read_all_resolves_every_member() {
        let sim = SimTransport::new();
        sim.preset("A", &1i32);
        sim.preset("B", &2i32);
        sim.set_latency("B", Duration::from_millis(20));

        let mut group = group_with(&sim, &["A", "B"]);
        let report = group.read_all(&sim, TIMEOUT, POLL);

        assert!(report.all_ok());
        assert!(group.tags().iter().all(|t| t.state().is_terminal()));
        assert_eq!(group.tags()[0].get::<i32>().unwrap(), 1);
        assert_eq!(group.tags()[1].get::<i32>().unwrap(), 2);
    }

    #[test]
    fn test_one_failure_does_not_abort_the_batch() {
        let sim = SimTransport::new();
        sim.preset("Good", &5i32);
        sim.fail_with("Bad", ERR_REMOTE);

        let mut group = group_with(&sim, &["Good", "Bad"]);
        let report = group.read_all(&sim, TIMEOUT, POLL);

        assert_eq!(report.outcome_of("Good"), Some(TagState::Ok));
        assert_eq!(report.outcome_of("Bad"), Some(TagState::Faulted(ERR_REMOTE)));
        assert_eq!(report.ok_count(), 1);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_stalled_member_times_out_alone() {
        let sim = SimTransport::new();
        sim.preset("Fast", &9i32);
        sim.stall("Stuck");

        let mut group = group_with(&sim, &["Fast", "Stuck"]);
        let report = group.read_all(&sim, Duration::from_millis(60), POLL);

        assert_eq!(report.outcome_of("Fast"), Some(TagState::Ok));
        assert_eq!(report.outcome_of("Stuck"), Some(TagState::TimedOut));
        assert!(report.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_batch_returns_before_timeout_when_all_resolve() {
        let sim = SimTransport::new();
        sim.preset("A", &1i32);
        sim.preset("B", &2i32);
        sim.set_latency("A", Duration::from_millis(10));
        sim.set_latency("B", Duration::from_millis(10));

        let mut group = group_with(&sim, &["A", "B"]);
        let report = group.read_all(&sim, Duration::from_secs(1), POLL);

        assert!(report.all_ok());
        assert!(report.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_write_all_pushes_staged_values() {
        let sim = SimTransport::new();
        let mut group = group_with(&sim, &["Setpoint", "Untouched"]);
        group.tag_mut(0).unwrap().set(&777i32).unwrap();

        let report = group.write_all(&sim, TIMEOUT, POLL);

        assert!(report.all_ok());
        assert_eq!(sim.value_of("Setpoint").unwrap(), 777i32.to_le_bytes());
        // No staged value, so nothing was written for it.
        assert!(sim.value_of("Untouched").is_none());
    }

    #[test]
    fn test_close_sweep_survives_destroy_errors() {
        let sim = SimTransport::new();
        sim.fail_destroy("A", crate::transport::ERR_NETWORK);
        let mut group = group_with(&sim, &["A", "B", "C"]);

        group.close(&sim);
        group.close(&sim);

        assert_eq!(sim.destroyed(), 3);
        assert_eq!(sim.open_sessions(), 0);
        assert!(group.is_empty());
    }
}
