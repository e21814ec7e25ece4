use swarmform_controller::sequencer::MissionSequencer;
use swarmform_sim::{SimBackend, World};
use swarmform_structs::backend::VehicleBackend;
use swarmform_structs::config::{ControllerParams, MissionConfig};
use swarmform_structs::error::MissionError;
use swarmform_structs::surface::Sphere;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("mission failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), MissionError> {
    let mut backend = SimBackend::new(World::grid(6, 2.0));
    backend.connect("sim://local")?;

    let config = MissionConfig {
        output_dir: Some("missions".into()),
        ..MissionConfig::default()
    };
    let mut sequencer = MissionSequencer::new(&mut backend, config, ControllerParams::default());

    let surface = Sphere { radius: 1.0 };
    sequencer.prepare(&surface, "unit sphere formation", 6)?;
    let outcome = sequencer.execute()?;
    println!(
        "formation reached ({:?}), {} agents holding",
        outcome,
        sequencer.active_agents()
    );
    sequencer.shutdown()
}
