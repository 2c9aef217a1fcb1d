//! Telemetry, inter-core relay, cloud pump and direct methods.

use hlbridge::app::events::{CloudEvent, ConnectionReason, TwinUpdate};
use hlbridge::app::service::HubStatus;

use crate::mock_hw::{
    FixedSensor, MethodReply, MockCloud, MockLink, RecordingDelay, authenticated_service,
    connected, service,
};

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_withheld_when_not_authenticated() {
    let mut app = service();
    let mut cloud = MockCloud::new();
    let mut sensor = FixedSensor::new(22.5, 40.0);

    app.on_measure_tick(&mut sensor, &mut cloud);

    assert!(cloud.events.is_empty());
    assert_eq!(sensor.reads, 0);
    assert_eq!(app.peripherals().send_status.output().levels, vec![true]);
}

#[test]
fn telemetry_sent_when_authenticated() {
    let mut cloud = MockCloud::new();
    let mut app = authenticated_service(&mut cloud);
    let mut sensor = FixedSensor::new(22.5, 40.0);

    app.on_measure_tick(&mut sensor, &mut cloud);
    app.on_measure_tick(&mut sensor, &mut cloud);

    assert_eq!(
        cloud.events,
        vec![
            r#"{"Temperature":"22.50","Humidity":"40.0","MsgId":0}"#,
            r#"{"Temperature":"22.50","Humidity":"40.0","MsgId":1}"#,
        ]
    );
}

#[test]
fn send_status_lit_while_sending() {
    let mut cloud = MockCloud::new();
    let mut app = authenticated_service(&mut cloud);
    let mut sensor = FixedSensor::new(20.0, 50.0);

    app.on_measure_tick(&mut sensor, &mut cloud);

    // Active-low: opened high, pulled low while sending, released.
    assert_eq!(app.peripherals().send_status.output().levels, vec![true, false, true]);
}

#[test]
fn sensor_failure_skips_send_and_keeps_msg_id() {
    let mut cloud = MockCloud::new();
    let mut app = authenticated_service(&mut cloud);

    app.on_measure_tick(&mut FixedSensor::failing(), &mut cloud);
    assert!(cloud.events.is_empty());
    assert!(app.peripherals().send_status.output().last());

    app.on_measure_tick(&mut FixedSensor::new(20.0, 50.0), &mut cloud);
    assert!(cloud.events[0].ends_with(r#""MsgId":0}"#));
}

#[test]
fn telemetry_stops_after_disconnect() {
    let mut cloud = MockCloud::new();
    let mut app = authenticated_service(&mut cloud);
    app.handle_cloud_event(
        CloudEvent::ConnectionStatus {
            authenticated: false,
            reason: ConnectionReason::ExpiredSasToken,
        },
        &mut cloud,
    );
    assert_eq!(app.hub_status(), HubStatus::NotAuthenticated);

    app.on_measure_tick(&mut FixedSensor::new(20.0, 50.0), &mut cloud);
    assert!(cloud.events.is_empty());
}

// ── Inter-core ────────────────────────────────────────────────

#[test]
fn prime_then_numbered_heartbeats() {
    let mut app = service();
    let mut link = MockLink::default();

    app.prime_inter_core(&mut link).unwrap();
    for _ in 0..3 {
        app.on_heartbeat_tick(&mut link);
    }

    assert_eq!(link.sent, vec!["HeartBeat", "HeartBeat-0", "HeartBeat-1", "HeartBeat-2"]);
}

#[test]
fn failed_heartbeat_still_advances() {
    let mut app = service();
    let mut link = MockLink {
        fail: true,
        ..MockLink::default()
    };
    app.on_heartbeat_tick(&mut link);

    link.fail = false;
    app.on_heartbeat_tick(&mut link);
    assert_eq!(link.sent, vec!["HeartBeat-1"]);
}

#[test]
fn inbound_message_pulses_relay() {
    let mut app = service();
    let mut cloud = MockCloud::new();
    let mut delay = RecordingDelay::default();

    app.on_intercore_message(b"button", &mut delay, &mut cloud);

    assert_eq!(app.peripherals().relay.peripheral().output().levels, vec![false, true, false]);
    assert_eq!(delay.ms, vec![100]);
    assert!(!app.peripherals().relay.twin_state());
}

#[test]
fn pulse_is_relative_to_twin_state() {
    let mut app = service();
    let mut cloud = MockCloud::new();
    let mut delay = RecordingDelay::default();
    app.on_twin_document(br#"{"relay1":{"value":true}}"#, &mut cloud)
        .unwrap();

    app.on_intercore_message(b"x", &mut delay, &mut cloud);

    assert_eq!(
        app.peripherals().relay.peripheral().output().levels,
        vec![false, true, false, true]
    );
}

#[test]
fn button_pressed_sent_only_when_authenticated() {
    let mut cloud = MockCloud::new();
    let mut delay = RecordingDelay::default();

    let mut offline = service();
    offline.on_intercore_message(b"b", &mut delay, &mut cloud);
    assert!(cloud.events.is_empty());
    assert_eq!(offline.button_presses(), 1);

    let mut online = authenticated_service(&mut cloud);
    online.on_intercore_message(b"b", &mut delay, &mut cloud);
    online.on_intercore_message(b"b", &mut delay, &mut cloud);
    assert_eq!(cloud.events, vec![r#"{"ButtonPressed":1}"#, r#"{"ButtonPressed":2}"#]);
}

// ── Cloud work pump ───────────────────────────────────────────

#[test]
fn do_work_dispatches_delivered_events() {
    let mut app = service();
    let mut cloud = MockCloud::new();
    cloud.deliver(vec![
        connected(),
        CloudEvent::TwinDocument {
            update: TwinUpdate::Complete,
            payload: br#"{"desired":{"relay1":{"value":true}}}"#.to_vec(),
        },
        CloudEvent::ReportedStateAck { status: 204 },
        CloudEvent::MessageAccepted,
    ]);

    app.on_do_work(&mut cloud);

    assert!(app.is_authenticated());
    assert!(app.peripherals().relay.twin_state());
    assert_eq!(cloud.reported, vec![r#"{"relay1":true}"#]);
    assert_eq!(cloud.do_work_calls, 1);

    app.on_do_work(&mut cloud);
    assert_eq!(cloud.do_work_calls, 2);
}

// ── Direct methods ────────────────────────────────────────────

fn call(name: &str, payload: &[u8]) -> CloudEvent {
    CloudEvent::MethodCall {
        name: name.into(),
        request_id: "17".into(),
        payload: payload.to_vec(),
    }
}

#[test]
fn fan_speed_method_succeeds() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    app.handle_cloud_event(call("fanspeed", br#"{"speed":3}"#), &mut cloud);

    assert_eq!(app.peripherals().fan.speed(), Some(3));
    assert_eq!(
        cloud.replies,
        vec![MethodReply {
            request_id: "17".into(),
            status: 200,
            body: "\"Successfully invoke device method\"".into(),
        }]
    );
}

#[test]
fn unknown_method_is_not_found() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    app.handle_cloud_event(call("reboot", b"{}"), &mut cloud);

    assert_eq!(cloud.replies[0].status, 404);
    assert_eq!(cloud.replies[0].body, "\"No method found\"");
}

#[test]
fn invalid_method_payload_is_rejected() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    app.handle_cloud_event(call("fanspeed", b"speed=3"), &mut cloud);

    assert_eq!(app.peripherals().fan.speed(), None);
    assert_eq!(cloud.replies[0].status, 500);
}

#[test]
fn array_method_payload_is_rejected() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    app.handle_cloud_event(call("fanspeed", b"[7]"), &mut cloud);

    assert_eq!(app.peripherals().fan.speed(), None);
    assert_eq!(cloud.replies[0].status, 500);
    assert_eq!(cloud.replies[0].body, "\"Invalid JSON\"");
}

#[test]
fn text_speed_sets_fan_to_zero() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    app.handle_cloud_event(call("fanspeed", br#"{"speed":"fast"}"#), &mut cloud);

    assert_eq!(app.peripherals().fan.speed(), Some(0));
    assert_eq!(cloud.replies[0].status, 200);
}
