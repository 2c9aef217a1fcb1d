//! Azure IoT Hub adapter.
//!
//! Implements [`CloudPort`] by speaking the IoT Hub MQTT dialect through
//! `rumqttc`.  The client's network loop runs on a dedicated thread and
//! forwards every notification over a channel; [`CloudPort::do_work`]
//! drains that channel and translates notifications into
//! [`CloudEvent`]s on the event-loop thread.
//!
//! ```text
//!  ┌──────────────┐  Notification  ┌────────────────┐  CloudEvent
//!  │ iothub-net   │───────────────▶│  IotHubClient  │────────────▶ AppService
//!  │ (rumqttc)    │◀───────────────│  (event loop)  │
//!  └──────────────┘    requests    └────────────────┘
//! ```
//!
//! | Direction | Topic                                                 |
//! |-----------|-------------------------------------------------------|
//! | D2C       | `devices/<id>/messages/events/`                       |
//! | C2D       | `$iothub/twin/PATCH/properties/desired/#`             |
//! | D2C / C2D | `$iothub/twin/GET/?$rid=<n>` / `$iothub/twin/res/#`   |
//! | D2C       | `$iothub/twin/PATCH/properties/reported/?$rid=<n>`    |
//! | C2D / D2C | `$iothub/methods/POST/#` / `$iothub/methods/res/...`  |

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

use log::{debug, info, warn};
use rumqttc::{
    Client, ConnectReturnCode, Connection, ConnectionError, Event, MqttOptions, Packet, Publish,
    QoS, Transport,
};

use crate::app::events::{CloudEvent, ConnectionReason, TwinUpdate};
use crate::app::ports::CloudPort;
use crate::config::HubConfig;
use crate::error::{CloudError, Error};

/// MQTT over TLS.
pub const IOT_HUB_PORT: u16 = 8883;

/// IoT Hub MQTT API version sent in the user name.
pub const API_VERSION: &str = "2021-04-12";

/// Requests the client may hold before `try_*` calls fail.
const REQUEST_CAPACITY: usize = 16;

/// Back-off between reconnect attempts on the network thread.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

const DESIRED_PATCH_PREFIX: &str = "$iothub/twin/PATCH/properties/desired/";
const TWIN_RESPONSE_PREFIX: &str = "$iothub/twin/res/";
const METHOD_PREFIX: &str = "$iothub/methods/POST/";

const SUBSCRIPTIONS: [&str; 3] = [
    "$iothub/twin/PATCH/properties/desired/#",
    "$iothub/twin/res/#",
    "$iothub/methods/POST/#",
];

type Notification = Result<Event, ConnectionError>;

// ── Topic helpers ─────────────────────────────────────────────

/// MQTT user name for `device_id` on `host`.
pub fn username(host: &str, device_id: &str) -> String {
    format!("{host}/{device_id}/?api-version={API_VERSION}")
}

pub fn telemetry_topic(device_id: &str) -> String {
    format!("devices/{device_id}/messages/events/")
}

pub fn twin_get_topic(rid: u32) -> String {
    format!("$iothub/twin/GET/?$rid={rid}")
}

pub fn reported_topic(rid: u32) -> String {
    format!("$iothub/twin/PATCH/properties/reported/?$rid={rid}")
}

pub fn method_response_topic(status: u16, rid: &str) -> String {
    format!("$iothub/methods/res/{status}/?$rid={rid}")
}

/// Value of `key` in a `?a=1&b=2` property bag.
fn query_value<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .find_map(|kv| kv.strip_prefix(key)?.strip_prefix('='))
}

/// `$iothub/twin/res/<status>/?$rid=<rid>[&...]` → `(status, rid)`.
pub fn parse_twin_response(topic: &str) -> Option<(u16, &str)> {
    let rest = topic.strip_prefix(TWIN_RESPONSE_PREFIX)?;
    let (status, query) = rest.split_once("/?")?;
    Some((status.parse().ok()?, query_value(query, "$rid")?))
}

/// `$iothub/methods/POST/<name>/?$rid=<rid>` → `(name, rid)`.
pub fn parse_method_topic(topic: &str) -> Option<(&str, &str)> {
    let rest = topic.strip_prefix(METHOD_PREFIX)?;
    let (name, query) = rest.split_once("/?")?;
    if name.is_empty() {
        return None;
    }
    Some((name, query_value(query, "$rid")?))
}

pub fn is_desired_patch(topic: &str) -> bool {
    topic.starts_with(DESIRED_PATCH_PREFIX)
}

fn refusal_reason(code: ConnectReturnCode) -> ConnectionReason {
    match code {
        ConnectReturnCode::BadUserNamePassword => ConnectionReason::BadCredential,
        ConnectReturnCode::NotAuthorized => ConnectionReason::DeviceDisabled,
        _ => ConnectionReason::CommunicationError,
    }
}

fn failure_reason(err: &ConnectionError) -> ConnectionReason {
    match err {
        ConnectionError::ConnectionRefused(code) => refusal_reason(*code),
        ConnectionError::Io(_) => ConnectionReason::NoNetwork,
        _ => ConnectionReason::CommunicationError,
    }
}

// ── Client ────────────────────────────────────────────────────

pub struct IotHubClient {
    client: Client,
    notifications: Receiver<Notification>,
    telemetry_topic: String,
    connected: bool,
    next_rid: u32,
    /// Request id of the outstanding full-twin GET.
    pending_get: Option<u32>,
}

impl IotHubClient {
    /// Configure the client and start its network thread.
    pub fn connect(hub: &HubConfig, keepalive_secs: u16) -> Result<Self, Error> {
        if hub.device_id.is_empty() || hub.device_id.starts_with(char::is_whitespace) {
            return Err(Error::Config("hub device_id is not a valid client id"));
        }
        let mut options = MqttOptions::new(hub.device_id.clone(), hub.host.clone(), IOT_HUB_PORT);
        options
            .set_keep_alive(Duration::from_secs(keepalive_secs.into()))
            .set_credentials(username(&hub.host, &hub.device_id), hub.sas_token.clone())
            .set_transport(Transport::tls_with_default_config());

        let (client, connection) = Client::new(options, REQUEST_CAPACITY);
        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("iothub-net".into())
            .spawn(move || network_loop(connection, tx))
            .map_err(|_| Error::Init("IoT Hub network thread"))?;

        info!("IoT Hub: connecting to {} as {}", hub.host, hub.device_id);
        Ok(Self::from_parts(client, rx, &hub.device_id))
    }

    /// Build the adapter around an existing client and notification feed.
    pub fn from_parts(client: Client, notifications: Receiver<Notification>, device_id: &str) -> Self {
        Self {
            client,
            notifications,
            telemetry_topic: telemetry_topic(device_id),
            connected: false,
            next_rid: 1,
            pending_get: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn take_rid(&mut self) -> u32 {
        let rid = self.next_rid;
        self.next_rid = self.next_rid.wrapping_add(1).max(1);
        rid
    }

    fn publish(&mut self, topic: String, qos: QoS, payload: &[u8]) -> Result<(), CloudError> {
        if !self.connected {
            return Err(CloudError::NotConnected);
        }
        self.client
            .try_publish(topic, qos, false, payload.to_vec())
            .map_err(|e| {
                warn!("IoT Hub: publish failed: {}", e);
                CloudError::PublishFailed
            })
    }

    /// Subscribe to the twin and method topics and ask for the full twin.
    fn on_connected(&mut self) {
        for topic in SUBSCRIPTIONS {
            if let Err(e) = self.client.try_subscribe(topic, QoS::AtMostOnce) {
                warn!("IoT Hub: subscribe {} failed: {}", topic, e);
            }
        }
        let rid = self.take_rid();
        match self.publish(twin_get_topic(rid), QoS::AtMostOnce, b"") {
            Ok(()) => self.pending_get = Some(rid),
            Err(e) => warn!("IoT Hub: twin request failed: {}", e),
        }
    }

    fn on_publish(&mut self, publish: Publish) -> Option<CloudEvent> {
        let topic = publish.topic.as_str();

        if is_desired_patch(topic) {
            return Some(CloudEvent::TwinDocument {
                update: TwinUpdate::Partial,
                payload: publish.payload.to_vec(),
            });
        }

        if let Some((status, rid)) = parse_twin_response(topic) {
            let is_get = rid.parse::<u32>().ok().is_some_and(|r| self.pending_get == Some(r));
            if !is_get {
                return Some(CloudEvent::ReportedStateAck { status });
            }
            self.pending_get = None;
            if status != 200 {
                warn!("IoT Hub: twin request failed with status {}", status);
                return None;
            }
            return Some(CloudEvent::TwinDocument {
                update: TwinUpdate::Complete,
                payload: publish.payload.to_vec(),
            });
        }

        if let Some((name, rid)) = parse_method_topic(topic) {
            return Some(CloudEvent::MethodCall {
                name: name.to_owned(),
                request_id: rid.to_owned(),
                payload: publish.payload.to_vec(),
            });
        }

        debug!("IoT Hub: ignoring message on {}", topic);
        None
    }

    fn on_notification(&mut self, notification: Notification) -> Option<CloudEvent> {
        match notification {
            Ok(Event::Incoming(Packet::ConnAck(ack))) if ack.code == ConnectReturnCode::Success => {
                self.connected = true;
                self.on_connected();
                Some(CloudEvent::ConnectionStatus {
                    authenticated: true,
                    reason: ConnectionReason::Ok,
                })
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => self.on_publish(publish),
            Ok(Event::Incoming(Packet::PubAck(_))) => Some(CloudEvent::MessageAccepted),
            Ok(_) => None,
            Err(e) => {
                warn!("IoT Hub: connection error: {}", e);
                if !self.connected {
                    return None;
                }
                self.connected = false;
                self.pending_get = None;
                Some(CloudEvent::ConnectionStatus {
                    authenticated: false,
                    reason: failure_reason(&e),
                })
            }
        }
    }
}

impl CloudPort for IotHubClient {
    fn send_event(&mut self, payload: &str) -> Result<(), CloudError> {
        let topic = self.telemetry_topic.clone();
        self.publish(topic, QoS::AtLeastOnce, payload.as_bytes())
    }

    fn send_reported_state(&mut self, payload: &str) -> Result<(), CloudError> {
        let rid = self.take_rid();
        self.publish(reported_topic(rid), QoS::AtMostOnce, payload.as_bytes())
    }

    fn respond_to_method(&mut self, request_id: &str, status: u16, body: &str) -> Result<(), CloudError> {
        self.publish(method_response_topic(status, request_id), QoS::AtMostOnce, body.as_bytes())
    }

    fn do_work(&mut self) -> Vec<CloudEvent> {
        let mut events = Vec::new();
        loop {
            match self.notifications.try_recv() {
                Ok(n) => events.extend(self.on_notification(n)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        self.connected = false;
                        events.push(CloudEvent::ConnectionStatus {
                            authenticated: false,
                            reason: ConnectionReason::CommunicationError,
                        });
                    }
                    break;
                }
            }
        }
        events
    }
}

/// Drive the MQTT connection, forwarding every notification.  Exits
/// when the adapter is dropped.
fn network_loop(mut connection: Connection, tx: Sender<Notification>) {
    for notification in connection.iter() {
        let failed = notification.is_err();
        if tx.send(notification).is_err() {
            break;
        }
        if failed {
            std::thread::sleep(RECONNECT_DELAY);
        }
    }
}
