//! Beam Gate headless runner
//!
//! Loads a level (or the built-in demo), runs the simulation at a fixed
//! frame rate and logs every engine event.
//!
//! Usage: `beam-gate [level.json] [settings.json] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use beam_gate::{EngineSettings, LevelDefinition};

    env_logger::init();
    log::info!("Beam Gate (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let settings = args
        .get(2)
        .map(EngineSettings::load_or_default)
        .unwrap_or_default();
    let seconds: f32 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(3.0);

    let level = match args.get(1) {
        Some(path) => LevelDefinition::load(path),
        None => LevelDefinition::from_json(DEMO_LEVEL),
    };
    let level = match level {
        Ok(level) => level,
        Err(e) => {
            log::error!("Could not load level: {}", e);
            std::process::exit(1);
        }
    };

    run(&level, &settings, seconds);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Embedders drive `sim::tick` themselves
}

#[cfg(not(target_arch = "wasm32"))]
const DEMO_LEVEL: &str = include_str!("../levels/demo.json");

#[cfg(not(target_arch = "wasm32"))]
fn run(level: &beam_gate::LevelDefinition, settings: &beam_gate::EngineSettings, seconds: f32) {
    use beam_gate::renderer::beam_lines;
    use beam_gate::sim::{
        EngineContext, EngineEvent, FixedCollectables, FixedStepper, ManualClock, TickInput, tick,
    };

    /// Simulated display refresh
    const FRAME_DT: f32 = 1.0 / 60.0;

    let mut scene = level.scene.clone();
    let mut session = level.to_session(settings);
    let mut clock = ManualClock::new();
    let mut stepper = FixedStepper::new(settings.sim_dt, settings.max_substeps);
    let collectables = FixedCollectables(true);
    let input = TickInput::default();

    session.subscribe(None, |event| match event.subject() {
        Some(entity) => log::info!("event on {}: {:?}", entity, event),
        None => log::info!("event: {:?}", event),
    });

    let frames = (seconds / FRAME_DT).ceil() as u32;
    for _ in 0..frames {
        for _ in 0..stepper.accumulate(FRAME_DT) {
            clock.advance(settings.sim_dt as f64);
            let ctx = EngineContext::new(&scene, &collectables, &clock);
            let events = tick(&mut session, &ctx, &input);

            // The scene owns geometry; destroyed absorbers leave it here
            for event in &events {
                if let EngineEvent::AbsorberDestroyed { absorber } = *event {
                    scene.remove(absorber);
                }
            }
        }
    }

    println!("\nLevel: {}", session.name);
    println!("  ticks:     {}", session.tick_count());
    println!("  satisfied: {}", session.is_satisfied());
    println!(
        "  lit:       {}/{} targets",
        session.targets().active_count(),
        session.targets().len()
    );
    println!(
        "  gate:      {:?} / {:?} at {:.1} deg",
        session.gate().lock_state(),
        session.gate().door_state(),
        session.gate().angle()
    );
    for target in session.targets().iter() {
        println!(
            "  target {}: {:?} {}",
            target.id,
            target.filter,
            if target.is_active() { "lit" } else { "dark" }
        );
    }
    for beam in session.beams() {
        println!(
            "  beam from {} ({:?}): {} vertices, {} bounces, {:?}, {} line verts",
            beam.emitter,
            beam.color,
            beam.vertices.len(),
            beam.bounces,
            beam.end,
            beam_lines(beam).len()
        );
    }
}
