//! Headless scene viewer client
//!
//! Connects to a scene server, mirrors its objects through the sync
//! protocol, and runs the frame loop against the headless backend. Useful
//! for soak-testing servers and for driving the engine on machines without
//! a graphics stack.
//!
//! Usage: `scene_viewer [config.toml|config.ron] [ws://host:port]`

mod transport;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use view_engine::prelude::*;

use crate::transport::WebSocketTransport;

const DEFAULT_URL: &str = "ws://localhost:1008";
const TICK: Duration = Duration::from_millis(16);
const STATUS_INTERVAL: Duration = Duration::from_secs(5);

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Viewer error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(&args)?;
    let url = args
        .iter()
        .find(|arg| arg.starts_with("ws://") || arg.starts_with("wss://"))
        .cloned()
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    let backend: SharedBackend = Arc::new(Mutex::new(HeadlessBackend::new()));
    let mut engine = ViewerEngine::new(config, backend)?;

    engine.subscribe(|event| match event {
        ViewerEvent::RegistryChanged => log::debug!("scene changed"),
        ViewerEvent::ConnectionChanged(state) => log::info!("connection is now {state}"),
        ViewerEvent::Fault(message) => log::warn!("fault: {message}"),
    });

    match WebSocketTransport::connect(&url) {
        Ok(transport) => engine.connect(Box::new(transport)),
        // The viewer still runs offline; it just shows the built-ins.
        Err(e) => log::warn!("could not reach {url}: {e}"),
    }

    let mut timer = Timer::new();
    let mut last_status = Instant::now();
    loop {
        timer.update();
        engine.pump_messages();
        if let Err(e) = engine.tick(timer.delta_time()) {
            // A failed render pass skips the frame, not the viewer.
            log::error!("tick failed: {e}");
        }

        if last_status.elapsed() >= STATUS_INTERVAL {
            log::info!(
                "{:.1} fps, {} objects, {}",
                engine.fps(),
                engine.registry().len(),
                engine.connection_state()
            );
            last_status = Instant::now();
        }

        std::thread::sleep(TICK);
    }
}

fn load_config(args: &[String]) -> Result<ViewerConfig, ConfigError> {
    let path = args
        .iter()
        .find(|arg| arg.ends_with(".toml") || arg.ends_with(".ron"));
    match path {
        Some(path) => {
            log::info!("loading configuration from {path}");
            let config = ViewerConfig::load_from_file(path)?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(ViewerConfig::default()),
    }
}
