//! Single-threaded event loop.
//!
//! Runs on the main thread using `edge-executor` for cooperative
//! scheduling and `async-io-mini` for reactor-driven timers and socket
//! readiness.  Producer tasks push [`Ready`] events into a bounded
//! channel; a single dispatcher drains it and hands each event to
//! [`Runtime::dispatch`], which runs the handler to completion.
//!
//! ```text
//!  ┌─────────────────────────────────────────────────────────────┐
//!  │  futures_lite::block_on                                     │
//!  │  ┌───────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                         │  │
//!  │  │                                                       │  │
//!  │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐               │  │
//!  │  │  │ timer ×3 │ │ socket rx│ │ SIGTERM  │──▶ Ready ──┐  │  │
//!  │  │  └──────────┘ └──────────┘ └──────────┘            │  │  │
//!  │  │                        ┌────────────────────────┐  │  │  │
//!  │  │                        │ dispatch → AppService  │◀─┘  │  │
//!  │  │                        └────────────────────────┘     │  │
//!  │  └───────────────────────────────────────────────────────┘  │
//!  └─────────────────────────────────────────────────────────────┘
//! ```

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::os::unix::net::UnixDatagram;

use async_io_mini::{Async, Timer};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{error, info, warn};

use crate::app::ports::{ClimateSensor, CloudPort, InterCorePort};
use crate::app::service::AppService;
use crate::error::InterCoreError;
use crate::events::{Flow, Ready, TimerKind, TimerSpec};
use crate::intercore::{Datagram, RX_BUFFER_BYTES};

/// Pending ready events.  Producers wait when it is full.
const READY_DEPTH: usize = 8;

/// How often the termination flag is checked.
const TERMINATION_POLL: Duration = Duration::from_millis(100);

type ReadyChannel = Channel<NoopRawMutex, Ready, READY_DEPTH>;

// ───────────────────────────────────────────────────────────────
// Runtime
// ───────────────────────────────────────────────────────────────

/// The application service together with every port it drives.
pub struct Runtime<P, C, L, S, D> {
    app: AppService<P>,
    cloud: C,
    link: L,
    sensor: S,
    delay: D,
}

impl<P, C, L, S, D> Runtime<P, C, L, S, D>
where
    P: OutputPin,
    C: CloudPort,
    L: InterCorePort,
    S: ClimateSensor,
    D: DelayNs,
{
    pub fn new(app: AppService<P>, cloud: C, link: L, sensor: S, delay: D) -> Self {
        Self {
            app,
            cloud,
            link,
            sensor,
            delay,
        }
    }

    /// Run the handler for one ready source.
    pub fn dispatch(&mut self, ready: Ready) -> Flow {
        match ready {
            Ready::Timer(TimerKind::DoWork) => self.app.on_do_work(&mut self.cloud),
            Ready::Timer(TimerKind::MeasureSensor) => {
                self.app.on_measure_tick(&mut self.sensor, &mut self.cloud);
            }
            Ready::Timer(TimerKind::RtCoreHeartBeat) => self.app.on_heartbeat_tick(&mut self.link),
            Ready::InterCore(datagram) => {
                self.app
                    .on_intercore_message(&datagram, &mut self.delay, &mut self.cloud);
            }
            Ready::InterCoreFailed(e) => {
                error!("Inter-core: {}, stopping", e);
                return Flow::Stop;
            }
            Ready::Terminate => {
                info!("Received SIGTERM");
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    pub fn app(&self) -> &AppService<P> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut AppService<P> {
        &mut self.app
    }

    pub fn cloud(&self) -> &C {
        &self.cloud
    }

    pub fn cloud_mut(&mut self) -> &mut C {
        &mut self.cloud
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Release the peripherals and drop every port.
    pub fn close(self) {
        self.app.close();
    }
}

// ───────────────────────────────────────────────────────────────
// Producer tasks
// ───────────────────────────────────────────────────────────────

async fn timer_task(spec: TimerSpec, ready: &ReadyChannel) {
    loop {
        Timer::after(spec.period).await;
        ready.send(Ready::Timer(spec.kind)).await;
    }
}

/// Receive datagrams from the real-time core.  Stops after the first
/// receive error.
async fn socket_task(socket: &Async<UnixDatagram>, ready: &ReadyChannel) {
    let mut buf = [0u8; RX_BUFFER_BYTES];
    loop {
        match socket.read_with(|s| s.recv(&mut buf)).await {
            Ok(n) => {
                let datagram = Datagram::from_slice(&buf[..n]).unwrap_or_default();
                ready.send(Ready::InterCore(datagram)).await;
            }
            Err(e) => {
                let failure = InterCoreError::ReceiveFailed;
                warn!("Inter-core: {}: {}", failure, e);
                ready.send(Ready::InterCoreFailed(failure)).await;
                return;
            }
        }
    }
}

async fn termination_task(flag: &AtomicBool, ready: &ReadyChannel) {
    while !flag.load(Ordering::Relaxed) {
        Timer::after(TERMINATION_POLL).await;
    }
    ready.send(Ready::Terminate).await;
}

async fn dispatch_loop<P, C, L, S, D>(runtime: &mut Runtime<P, C, L, S, D>, ready: &ReadyChannel)
where
    P: OutputPin,
    C: CloudPort,
    L: InterCorePort,
    S: ClimateSensor,
    D: DelayNs,
{
    loop {
        let event = ready.receive().await;
        if runtime.dispatch(event) == Flow::Stop {
            return;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Entry point
// ───────────────────────────────────────────────────────────────

/// Run until termination is requested or the inter-core socket fails.
///
/// `socket` is the receive side of the inter-core link; `terminate` is
/// set asynchronously (by a signal handler).
pub fn run<P, C, L, S, D>(
    runtime: &mut Runtime<P, C, L, S, D>,
    timers: &[TimerSpec],
    socket: &Async<UnixDatagram>,
    terminate: &AtomicBool,
) where
    P: OutputPin,
    C: CloudPort,
    L: InterCorePort,
    S: ClimateSensor,
    D: DelayNs,
{
    let ready: ReadyChannel = Channel::new();
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    for spec in timers {
        info!("Timer '{}' every {:?}", spec.kind.name(), spec.period);
        executor.spawn(timer_task(*spec, &ready)).detach();
    }
    executor.spawn(socket_task(socket, &ready)).detach();
    executor.spawn(termination_task(terminate, &ready)).detach();

    info!("Event loop started ({} timers)", timers.len());

    futures_lite::future::block_on(executor.run(dispatch_loop(runtime, &ready)));

    info!("Event loop stopped");
}
