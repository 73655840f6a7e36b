//! Run a 256-sheet waterbag for two characteristic times and print each
//! reporting boundary.
//!
//! ```sh
//! cargo run -p sheetsim-engine --example quickstart
//! ```

use std::thread;

use sheetsim_engine::{ChannelObserver, SheetEngine, SimConfig};
use sheetsim_gen::Distribution;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SimConfig::new(256, 2.0, 1.0, Distribution::waterbag());
    config.interval = 0.1;
    config.seed = 42;

    let (observer, rx) = ChannelObserver::bounded("printer", 4);
    let printer = thread::spawn(move || {
        for snap in rx {
            println!(
                "t={:>5.2}  E={:.12}  virial={:.4}  x[min]={:+.4}  x[max]={:+.4}",
                snap.simulation_time,
                snap.total_energy(),
                snap.virial_ratio,
                snap.positions_in_slot_order().next().unwrap_or(0.0),
                snap.positions_in_slot_order().last().unwrap_or(0.0),
            );
        }
    });

    let mut engine = SheetEngine::builder(config)
        .observer(Box::new(observer))
        .build()?;
    let summary = engine.run()?;
    let metrics = engine.metrics().clone();
    drop(engine);
    printer.join().map_err(|_| "printer thread panicked")?;

    println!(
        "{} sheets, {} collisions, virial {:.4} -> {:.4}, max drift {:.2e}, {} us",
        summary.particle_count,
        metrics.collisions,
        summary.initial_virial_ratio,
        summary.final_virial_ratio,
        metrics.max_energy_drift,
        metrics.wall_time_us
    );
    Ok(())
}
