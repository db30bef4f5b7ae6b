//! End-to-end scenarios for the batched tag I/O core, driven over the
//! simulator transport.

use std::sync::Arc;
use std::time::Duration;

use logix_tags::{
    Controller, ControllerConfig, CpuFamily, DataType, SimTransport, TagError, TagState,
};

fn connect(sim: Arc<SimTransport>) -> Controller {
    let config = ControllerConfig::new("10.0.0.1", CpuFamily::ControlLogix)
        .with_path("1,0")
        .with_poll_interval(Duration::from_millis(2));
    Controller::connect(config, sim).expect("controller should connect")
}

#[test]
fn controller_without_required_path_fails_fast() {
    let config = ControllerConfig::new("10.0.0.1", CpuFamily::ControlLogix);
    let err = Controller::connect(config, Arc::new(SimTransport::new())).unwrap_err();
    assert!(matches!(err, TagError::InvalidConfiguration { .. }));
}

#[test]
fn second_tag_named_speed_is_rejected_and_first_survives() {
    let sim = Arc::new(SimTransport::new());
    sim.preset("Speed", &1000i32);
    let mut controller = connect(sim);
    let group = controller.create_group();

    let speed = controller.create_tag(group, "Speed", DataType::Dint).unwrap();
    let err = controller.create_tag(group, "Speed", DataType::Dint).unwrap_err();
    assert!(matches!(err, TagError::DuplicateTag { .. }));

    // The original tag still works end to end.
    let report = controller.read_group(group, None).unwrap();
    assert!(report.all_ok());
    assert_eq!(controller.tag(speed).unwrap().get::<i32>().unwrap(), 1000);
}

#[test]
fn fast_batch_returns_well_before_the_timeout() {
    let sim = Arc::new(SimTransport::new());
    sim.preset("A", &1i32);
    sim.preset("B", &2i32);
    sim.set_latency("A", Duration::from_millis(20));
    sim.set_latency("B", Duration::from_millis(20));

    let mut controller = connect(sim);
    let group = controller.create_group();
    controller.create_tag(group, "A", DataType::Dint).unwrap();
    controller.create_tag(group, "B", DataType::Dint).unwrap();

    let report = controller
        .read_group(group, Some(Duration::from_millis(1000)))
        .unwrap();

    assert!(report.all_ok());
    assert_eq!(report.len(), 2);
    assert!(report.elapsed() < Duration::from_millis(1000));
    assert!(controller.tags().all(|t| t.state() != TagState::Pending));
}

#[test]
fn one_stuck_tag_times_out_without_dragging_the_rest() {
    let sim = Arc::new(SimTransport::new());
    sim.preset("Fast", &7i32);
    sim.preset("Slow", &8i32);
    sim.set_latency("Slow", Duration::from_millis(25));
    sim.stall("Stuck");

    let mut controller = connect(sim);
    let group = controller.create_group();
    controller.create_tag(group, "Fast", DataType::Dint).unwrap();
    controller.create_tag(group, "Slow", DataType::Dint).unwrap();
    controller.create_tag(group, "Stuck", DataType::Dint).unwrap();

    let report = controller
        .read_group(group, Some(Duration::from_millis(100)))
        .unwrap();

    assert_eq!(report.outcome_of("Fast"), Some(TagState::Ok));
    assert_eq!(report.outcome_of("Slow"), Some(TagState::Ok));
    assert_eq!(report.outcome_of("Stuck"), Some(TagState::TimedOut));
    assert!(!report.all_ok());
    assert_eq!(report.ok_count(), 2);
}

#[test]
fn timed_out_tag_recovers_on_the_next_batch() {
    let sim = Arc::new(SimTransport::new());
    sim.preset("Flaky", &11i32);
    sim.set_latency("Flaky", Duration::from_secs(60));

    let mut controller = connect(Arc::clone(&sim));
    let group = controller.create_group();
    let flaky = controller.create_tag(group, "Flaky", DataType::Dint).unwrap();

    let report = controller
        .read_group(group, Some(Duration::from_millis(40)))
        .unwrap();
    assert_eq!(report.outcome_of("Flaky"), Some(TagState::TimedOut));

    // Transport recovers; the timeout budget resets per call.
    sim.set_latency("Flaky", Duration::ZERO);
    let report = controller
        .read_group(group, Some(Duration::from_millis(200)))
        .unwrap();
    assert!(report.all_ok());
    assert_eq!(controller.tag(flaky).unwrap().get::<i32>().unwrap(), 11);
}

#[test]
fn write_then_read_round_trips_through_the_controller() {
    let sim = Arc::new(SimTransport::new());
    let mut controller = connect(Arc::clone(&sim));
    let group = controller.create_group();
    let speed = controller.create_tag(group, "Speed", DataType::Dint).unwrap();
    let label = controller.create_tag(group, "Label", DataType::String).unwrap();

    controller.tag_mut(speed).unwrap().set(&2200i32).unwrap();
    controller.tag_mut(label).unwrap().set(&"RUN-3".to_string()).unwrap();
    assert!(controller.write_group(group, None).unwrap().all_ok());

    assert!(controller.read_group(group, None).unwrap().all_ok());
    assert_eq!(controller.tag(speed).unwrap().get::<i32>().unwrap(), 2200);
    assert_eq!(controller.tag(label).unwrap().get::<String>().unwrap(), "RUN-3");
}

#[test]
fn closing_twice_closes_each_handle_once_despite_errors() {
    let sim = Arc::new(SimTransport::new());
    sim.fail_destroy("B", logix_tags::ERR_NETWORK);

    let mut controller = connect(Arc::clone(&sim));
    let first = controller.create_group();
    let second = controller.create_group();
    controller.create_tag(first, "A", DataType::Dint).unwrap();
    controller.create_tag(first, "B", DataType::Dint).unwrap();
    controller.create_tag(second, "C", DataType::Dint).unwrap();

    controller.close();
    controller.close();

    assert_eq!(sim.destroyed(), 3);
    assert_eq!(sim.open_sessions(), 0);
    assert!(matches!(controller.read_group(first, None), Err(TagError::Closed)));
}
