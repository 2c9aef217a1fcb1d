//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the peripheral set, the hub status and the message
//! counters.  Each timer or socket event maps to one handler; every
//! handler runs to completion and reaches the outside world only through
//! the ports passed in at the call site.
//!
//! ```text
//!  ClimateSensor ──▶ ┌────────────────────────┐ ──▶ CloudPort
//!                    │       AppService       │
//!   OutputPin(s) ◀── │  twin · telemetry · rt │ ──▶ InterCorePort
//!                    └────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, error, info, warn};

use crate::config::SystemConfig;
use crate::error::{InterCoreError, TwinError};
use crate::intercore::{self, PRIME_MESSAGE};
use crate::peripherals::PeripheralSet;
use crate::telemetry;
use crate::twin;

use super::commands::{self, DeviceMethod, MethodResponse};
use super::events::{CloudEvent, TwinUpdate};
use super::ports::{ClimateSensor, CloudPort, InterCorePort};

/// Whether the hub connection is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubStatus {
    NotAuthenticated,
    Authenticated,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<P> {
    peripherals: PeripheralSet<P>,
    hub: HubStatus,
    /// Next telemetry `MsgId`.
    msg_id: u32,
    /// Next heartbeat sequence number.
    heartbeat_count: u32,
    /// Messages received from the real-time core.
    button_presses: u32,
    relay_pulse_ms: u32,
}

impl<P: OutputPin> AppService<P> {
    /// Take ownership of the opened peripherals.  The hub starts
    /// unauthenticated.
    pub fn new(peripherals: PeripheralSet<P>, config: &SystemConfig) -> Self {
        Self {
            peripherals,
            hub: HubStatus::NotAuthenticated,
            msg_id: 0,
            heartbeat_count: 0,
            button_presses: 0,
            relay_pulse_ms: config.relay_pulse_ms,
        }
    }

    // ── Inter-core ────────────────────────────────────────────

    /// Announce ourselves to the real-time core.
    pub fn prime_inter_core(&mut self, link: &mut impl InterCorePort) -> Result<(), InterCoreError> {
        link.send(PRIME_MESSAGE.as_bytes())?;
        info!("Sending: {}", PRIME_MESSAGE);
        Ok(())
    }

    /// Send `HeartBeat-<n>`.  The sequence advances even if the send
    /// fails.
    pub fn on_heartbeat_tick(&mut self, link: &mut impl InterCorePort) {
        let msg = intercore::heartbeat(self.heartbeat_count);
        self.heartbeat_count = self.heartbeat_count.wrapping_add(1);
        match link.send(msg.as_bytes()) {
            Ok(()) => info!("Sending: {}", msg),
            Err(e) => warn!("Inter-core: {}: {}", msg, e),
        }
    }

    /// A datagram arrived from the real-time core: pulse the relay and
    /// report a button press.
    pub fn on_intercore_message(
        &mut self,
        bytes: &[u8],
        delay: &mut impl DelayNs,
        cloud: &mut impl CloudPort,
    ) {
        info!("Received {} bytes: {}", bytes.len(), intercore::sanitize(bytes));

        let relay = &mut self.peripherals.relay;
        let state = relay.twin_state();
        if let Err(e) = relay.peripheral_mut().drive(!state) {
            warn!("Relay pulse failed: {:?}", e);
        }
        delay.delay_ms(self.relay_pulse_ms);
        if let Err(e) = relay.peripheral_mut().drive(state) {
            warn!("Relay restore failed: {:?}", e);
        }

        self.button_presses = self.button_presses.wrapping_add(1);
        if !self.is_authenticated() {
            return;
        }
        let Some(msg) = telemetry::format_button_pressed(self.button_presses) else {
            return;
        };
        match cloud.send_event(&msg) {
            Ok(()) => info!("Sending IoT Hub Message: {}", msg),
            Err(e) => warn!("Failed to send ButtonPressed: {}", e),
        }
    }

    // ── Telemetry ─────────────────────────────────────────────

    /// Read the climate sensor and send one telemetry message.
    /// Does nothing while the hub is not authenticated.
    pub fn on_measure_tick(&mut self, sensor: &mut impl ClimateSensor, cloud: &mut impl CloudPort) {
        if !self.is_authenticated() {
            return;
        }

        let status = &mut self.peripherals.send_status;
        if let Err(e) = status.drive(true) {
            debug!("SendStatus on failed: {:?}", e);
        }

        match sensor.read() {
            Ok(reading) => match telemetry::format_climate(reading, self.msg_id) {
                Some(msg) => {
                    self.msg_id = self.msg_id.wrapping_add(1);
                    match cloud.send_event(&msg) {
                        Ok(()) => info!("Sending IoT Hub Message: {}", msg),
                        Err(e) => warn!("Failed to send telemetry: {}", e),
                    }
                }
                None => warn!("Telemetry message does not fit its buffer"),
            },
            Err(e) => warn!("Climate sensor: {}", e),
        }

        if let Err(e) = status.drive(false) {
            debug!("SendStatus off failed: {:?}", e);
        }
    }

    // ── Cloud ─────────────────────────────────────────────────

    /// Pump the cloud client and handle everything it delivered.
    pub fn on_do_work(&mut self, cloud: &mut impl CloudPort) {
        for event in cloud.do_work() {
            self.handle_cloud_event(event, cloud);
        }
    }

    pub fn handle_cloud_event(&mut self, event: CloudEvent, cloud: &mut impl CloudPort) {
        match event {
            CloudEvent::ConnectionStatus {
                authenticated,
                reason,
            } => {
                self.hub = if authenticated {
                    HubStatus::Authenticated
                } else {
                    HubStatus::NotAuthenticated
                };
                info!("IoT Hub Authenticated: {} ({})", authenticated, reason);
            }
            CloudEvent::TwinDocument { update, payload } => {
                let kind = match update {
                    TwinUpdate::Complete => "complete",
                    TwinUpdate::Partial => "partial",
                };
                debug!("Device twin update ({}), {} bytes", kind, payload.len());
                // Failures are already logged.
                let _ = self.on_twin_document(&payload, cloud);
            }
            CloudEvent::ReportedStateAck { status } => {
                info!("Device Twin reported properties update result: HTTP status code {}", status);
            }
            CloudEvent::MethodCall {
                name,
                request_id,
                payload,
            } => self.on_method_call(&name, &request_id, &payload, cloud),
            CloudEvent::MessageAccepted => debug!("IoT Hub accepted the message"),
        }
    }

    /// Apply a twin document to the twin-bound peripherals.
    pub fn on_twin_document(
        &mut self,
        payload: &[u8],
        cloud: &mut impl CloudPort,
    ) -> Result<usize, TwinError> {
        let mut twins = self.peripherals.twins_mut();
        twin::synchronize(payload, &mut twins, cloud).inspect_err(|e| {
            error!("Cannot parse device twin document: {}", e);
        })
    }

    /// Answer a direct method invocation.
    pub fn on_method_call(
        &mut self,
        name: &str,
        request_id: &str,
        payload: &[u8],
        cloud: &mut impl CloudPort,
    ) {
        info!("Received Device Method callback: Method name {}", name);
        let response = match commands::parse_method(name, payload) {
            Ok(DeviceMethod::FanSpeed { speed }) => {
                info!("Fan speed set to {}", speed);
                self.peripherals.fan.set_speed(speed);
                MethodResponse::SUCCESS
            }
            Err(response) => response,
        };
        if let Err(e) = cloud.respond_to_method(request_id, response.status, response.body) {
            warn!("Method '{}' response not sent: {}", name, e);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn hub_status(&self) -> HubStatus {
        self.hub
    }

    pub fn is_authenticated(&self) -> bool {
        self.hub == HubStatus::Authenticated
    }

    pub fn peripherals(&self) -> &PeripheralSet<P> {
        &self.peripherals
    }

    /// Button presses relayed from the real-time core.
    pub fn button_presses(&self) -> u32 {
        self.button_presses
    }

    // ── Shutdown ──────────────────────────────────────────────

    /// Release every peripheral.
    pub fn close(self) {
        info!("Closing peripherals");
        drop(self.peripherals);
    }
}
