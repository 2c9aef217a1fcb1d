//! Mock adapters for integration tests.
//!
//! Every mock records what the application did to it so tests can
//! assert on the full history without real GPIO, sockets or a hub.

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use hlbridge::app::events::{CloudEvent, ConnectionReason};
use hlbridge::app::ports::{ClimateSensor, CloudPort, InterCorePort};
use hlbridge::app::service::AppService;
use hlbridge::config::SystemConfig;
use hlbridge::error::{CloudError, InterCoreError, SensorError};
use hlbridge::peripherals::PeripheralSet;
use hlbridge::sensors::ClimateReading;

// ── MockPin ───────────────────────────────────────────────────

/// Output pin that records every electrical level, starting with the
/// level it was opened at.
pub struct MockPin {
    pub levels: Vec<bool>,
}

#[allow(dead_code)]
impl MockPin {
    pub fn new(initial_high: bool) -> Self {
        Self {
            levels: vec![initial_high],
        }
    }

    pub fn last(&self) -> bool {
        *self.levels.last().unwrap()
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.push(true);
        Ok(())
    }
}

// ── MockCloud ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct MethodReply {
    pub request_id: String,
    pub status: u16,
    pub body: String,
}

#[derive(Default)]
pub struct MockCloud {
    pub events: Vec<String>,
    pub reported: Vec<String>,
    pub replies: Vec<MethodReply>,
    /// Batches returned by successive `do_work` calls.
    pub inbound: VecDeque<Vec<CloudEvent>>,
    pub do_work_calls: usize,
    /// Make every send fail.
    pub fail_sends: bool,
}

#[allow(dead_code)]
impl MockCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(&mut self, batch: Vec<CloudEvent>) {
        self.inbound.push_back(batch);
    }

    fn outcome(&self) -> Result<(), CloudError> {
        if self.fail_sends {
            Err(CloudError::PublishFailed)
        } else {
            Ok(())
        }
    }
}

impl CloudPort for MockCloud {
    fn send_event(&mut self, payload: &str) -> Result<(), CloudError> {
        self.outcome()?;
        self.events.push(payload.to_owned());
        Ok(())
    }

    fn send_reported_state(&mut self, payload: &str) -> Result<(), CloudError> {
        self.outcome()?;
        self.reported.push(payload.to_owned());
        Ok(())
    }

    fn respond_to_method(&mut self, request_id: &str, status: u16, body: &str) -> Result<(), CloudError> {
        self.outcome()?;
        self.replies.push(MethodReply {
            request_id: request_id.to_owned(),
            status,
            body: body.to_owned(),
        });
        Ok(())
    }

    fn do_work(&mut self) -> Vec<CloudEvent> {
        self.do_work_calls += 1;
        self.inbound.pop_front().unwrap_or_default()
    }
}

// ── MockLink ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLink {
    pub sent: Vec<String>,
    pub fail: bool,
}

impl InterCorePort for MockLink {
    fn send(&mut self, message: &[u8]) -> Result<(), InterCoreError> {
        if self.fail {
            return Err(InterCoreError::SendFailed);
        }
        self.sent.push(String::from_utf8_lossy(message).into_owned());
        Ok(())
    }
}

// ── FixedSensor ───────────────────────────────────────────────

pub struct FixedSensor {
    pub reading: Result<ClimateReading, SensorError>,
    pub reads: usize,
}

#[allow(dead_code)]
impl FixedSensor {
    pub fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            reading: Ok(ClimateReading {
                temperature_c,
                humidity_pct,
            }),
            reads: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            reading: Err(SensorError::ReadFailed),
            reads: 0,
        }
    }
}

impl ClimateSensor for FixedSensor {
    fn read(&mut self) -> Result<ClimateReading, SensorError> {
        self.reads += 1;
        self.reading
    }
}

// ── RecordingDelay ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDelay {
    pub ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}

// ── Builders ──────────────────────────────────────────────────

/// Service over mock pins with the default peripheral table.
#[allow(dead_code)]
pub fn service() -> AppService<MockPin> {
    service_with(&SystemConfig::default())
}

pub fn service_with(config: &SystemConfig) -> AppService<MockPin> {
    let set = PeripheralSet::open(config, |p| {
        Ok::<_, Infallible>(MockPin::new(p.initial_level.is_high()))
    })
    .unwrap();
    AppService::new(set, config)
}

/// Service that has already seen a successful connection.
#[allow(dead_code)]
pub fn authenticated_service(cloud: &mut MockCloud) -> AppService<MockPin> {
    let mut app = service();
    app.handle_cloud_event(connected(), cloud);
    app
}

#[allow(dead_code)]
pub fn connected() -> CloudEvent {
    CloudEvent::ConnectionStatus {
        authenticated: true,
        reason: ConnectionReason::Ok,
    }
}
