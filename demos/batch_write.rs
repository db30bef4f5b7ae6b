//! Example: Batched write of staged values
//!
//! Run with: cargo run --example batch_write
//!
//! This example demonstrates:
//! - Staging values with `Tag::set` (no I/O happens there)
//! - Flushing every staged value as one pipelined batch
//! - Reading back to verify

use std::sync::Arc;
use std::time::Duration;

use logix_tags::{Controller, ControllerConfig, CpuFamily, DataType, SimTransport};

fn main() -> logix_tags::Result<()> {
    env_logger::init();

    let sim = Arc::new(SimTransport::new());
    sim.set_latency("Oven.Setpoint", Duration::from_millis(15));

    let config = ControllerConfig::new("10.0.0.1", CpuFamily::CompactLogix).with_path("1,0");
    let mut controller = Controller::connect(config, sim)?;

    let oven = controller.create_group();
    let setpoint = controller.create_tag(oven, "Oven.Setpoint", DataType::Real)?;
    let recipe = controller.create_tag(oven, "Oven.Recipe", DataType::Dint)?;
    let label = controller.create_tag(oven, "Oven.Label", DataType::String)?;

    // =========================================================================
    // Stage values, then flush them together
    // =========================================================================

    controller.tag_mut(setpoint).unwrap().set(&215.5f32)?;
    controller.tag_mut(recipe).unwrap().set(&42i32)?;
    controller.tag_mut(label).unwrap().set(&"BATCH-007".to_string())?;

    println!("=== Batched Write ===\n");

    let report = controller.write_group(oven, None)?;
    println!(
        "batch settled in {:?}: {}/{} ok",
        report.elapsed(),
        report.ok_count(),
        report.len()
    );
    for entry in report.iter() {
        println!("  {:<15} {}", entry.name, entry.outcome);
    }

    // =========================================================================
    // Read back what the controller now holds
    // =========================================================================

    println!("\n=== Read Back ===\n");

    let report = controller.read_group(oven, None)?;
    assert!(report.all_ok());

    let sp: f32 = controller.tag(setpoint).unwrap().get()?;
    let rc: i32 = controller.tag(recipe).unwrap().get()?;
    let lb: String = controller.tag(label).unwrap().get()?;

    println!("Oven.Setpoint = {sp:.1}");
    println!("Oven.Recipe   = {rc}");
    println!("Oven.Label    = \"{lb}\"");

    controller.close();
    println!("\nWrite example completed!");
    Ok(())
}
