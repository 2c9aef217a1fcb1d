//! hlbridge: Main Entry Point
//!
//! Hexagonal architecture with a single-threaded event loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioOutput        IotHubClient     InterCoreSender            │
//! │  (OutputPin)       (CloudPort)      (InterCorePort)            │
//! │  SimulatedSht31    FileConfigStore  StdDelay                   │
//! │  (ClimateSensor)   (ConfigPort)     (DelayNs)                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Twin sync · Telemetry · Inter-core relay · Methods    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Event loop (timers · socket · SIGTERM)                        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::os::unix::net::UnixDatagram;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Result;
use async_io_mini::Async;
use log::{error, info, warn};
use signal_hook::consts::SIGTERM;

use hlbridge::adapters::config_store::FileConfigStore;
use hlbridge::adapters::inter_core::{InterCoreLink, InterCoreSender};
use hlbridge::adapters::iot_hub::IotHubClient;
use hlbridge::app::ports::{CloudPort, NullCloud};
use hlbridge::app::service::AppService;
use hlbridge::config::{LaunchArgs, SystemConfig};
use hlbridge::drivers::delay::StdDelay;
use hlbridge::drivers::gpio::GpioOutput;
use hlbridge::error::Error;
use hlbridge::event_loop::{self, Runtime};
use hlbridge::events::timer_table;
use hlbridge::peripherals::PeripheralSet;
use hlbridge::sensors::climate::SimulatedSht31;

type BridgeRuntime = Runtime<GpioOutput, Box<dyn CloudPort>, InterCoreSender, SimulatedSht31, StdDelay>;

// ── Initialisation ────────────────────────────────────────────

/// Open peripherals, the cloud client and the inter-core link.
/// Anything opened before a failure is released when it is dropped.
fn init(config: &SystemConfig, args: &LaunchArgs) -> Result<(BridgeRuntime, Async<UnixDatagram>), Error> {
    config.validate()?;

    let peripherals = PeripheralSet::open(config, |p| {
        GpioOutput::open(config.gpio_backend, p.pin, p.initial_level)
    })?;

    let cloud: Box<dyn CloudPort> = match &config.hub {
        Some(hub) => Box::new(IotHubClient::connect(hub, config.keepalive_secs)?),
        None => {
            warn!("No IoT Hub configured, running offline");
            Box::new(NullCloud)
        }
    };

    let InterCoreLink {
        mut sender,
        receiver,
    } = InterCoreLink::open(Path::new(&config.socket_dir), &args.rt_component_id)?;

    let mut app = AppService::new(peripherals, config);
    if let Err(e) = app.prime_inter_core(&mut sender) {
        warn!("Inter-core: initial heartbeat not sent: {}", e);
    }

    let runtime = Runtime::new(app, cloud, sender, SimulatedSht31::new(), StdDelay);
    Ok((runtime, receiver))
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("hlbridge v{} starting", env!("CARGO_PKG_VERSION"));

    let Some(args) = LaunchArgs::parse(std::env::args().skip(1)) else {
        error!("ScopeId and RTCore component id need to be set in the app_manifest CmdArgs");
        std::process::exit(-1);
    };
    info!("Using Azure IoT DPS Scope ID {}", args.scope_id);
    info!("Real-time core component {}", args.rt_component_id);

    let config = FileConfigStore::from_env().load_or_default();

    let terminate = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGTERM, Arc::clone(&terminate))?;

    match init(&config, &args) {
        Ok((mut runtime, receiver)) => {
            event_loop::run(&mut runtime, &timer_table(&config), &receiver, &terminate);
            runtime.close();
        }
        Err(e) => error!("Initialization failed: {}", e),
    }

    info!("Application exiting");
    Ok(())
}
