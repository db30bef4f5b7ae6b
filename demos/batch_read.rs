//! Example: Batched read of a tag group
//!
//! Run with: cargo run --example batch_read
//!
//! This example demonstrates:
//! - Connecting a controller over the simulator transport
//! - Creating a group and its member tags
//! - One pipelined read for the whole group
//! - Per-tag outcomes, including a tag that times out

use std::sync::Arc;
use std::time::Duration;

use logix_tags::{Controller, ControllerConfig, CpuFamily, DataType, SimTransport};

fn main() -> logix_tags::Result<()> {
    env_logger::init();

    // =========================================================================
    // Stand up a simulated controller
    // =========================================================================

    let sim = Arc::new(SimTransport::new());
    sim.preset("Line1.Speed", &1450i32);
    sim.preset("Line1.Temperature", &68.4f32);
    sim.preset("Line1.Running", &true);
    sim.set_latency("Line1.Temperature", Duration::from_millis(30));
    // This tag's transport never answers; it will time out alone.
    sim.stall("Line1.Orphan");

    // =========================================================================
    // Connect and build the group
    // =========================================================================

    let config = ControllerConfig::new("10.0.0.1", CpuFamily::ControlLogix).with_path("1,0");
    let mut controller = Controller::connect(config, sim)?;

    let line = controller.create_group();
    let speed = controller.create_tag(line, "Line1.Speed", DataType::Dint)?;
    let temperature = controller.create_tag(line, "Line1.Temperature", DataType::Real)?;
    let running = controller.create_tag(line, "Line1.Running", DataType::Bool)?;
    controller.create_tag(line, "Line1.Orphan", DataType::Dint)?;

    // =========================================================================
    // Read everything in one batch
    // =========================================================================

    println!("=== Batched Read ===\n");

    let report = controller.read_group(line, Some(Duration::from_millis(250)))?;
    println!(
        "batch settled in {:?}: {}/{} ok",
        report.elapsed(),
        report.ok_count(),
        report.len()
    );
    for entry in report.iter() {
        println!("  {:<20} {}", entry.name, entry.outcome);
    }

    // =========================================================================
    // Typed access to the cached values
    // =========================================================================

    println!("\n=== Cached Values ===\n");

    let rpm: i32 = controller.tag(speed).unwrap().get()?;
    let temp: f32 = controller.tag(temperature).unwrap().get()?;
    let on: bool = controller.tag(running).unwrap().get()?;

    println!("Line1.Speed       = {rpm} rpm");
    println!("Line1.Temperature = {temp:.1} C");
    println!("Line1.Running     = {on}");

    controller.close();
    println!("\nRead example completed!");
    Ok(())
}
