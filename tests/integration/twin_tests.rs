//! Device twin synchronisation through the application service.

use hlbridge::app::events::{CloudEvent, TwinUpdate};
use hlbridge::config::SystemConfig;
use hlbridge::error::TwinError;

use crate::mock_hw::{MockCloud, service, service_with};

#[test]
fn desired_relay_true_drives_pin_high_and_reports() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    let applied = app
        .on_twin_document(br#"{"desired":{"relay1":{"value":true}}}"#, &mut cloud)
        .unwrap();

    assert_eq!(applied, 1);
    let relay = &app.peripherals().relay;
    assert!(relay.twin_state());
    assert_eq!(relay.peripheral().output().levels, vec![false, true]);
    assert_eq!(cloud.reported, vec![r#"{"relay1":true}"#]);
}

#[test]
fn inverted_light_is_driven_low_when_on() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    app.on_twin_document(br#"{"desired":{"led1":{"value":true}}}"#, &mut cloud)
        .unwrap();

    let light = &app.peripherals().light;
    assert_eq!(light.peripheral().output().levels, vec![true, false]);
    assert_eq!(cloud.reported, vec![r#"{"led1":true}"#]);
}

#[test]
fn unknown_property_changes_nothing() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    let applied = app
        .on_twin_document(br#"{"desired":{"heater":{"value":true}}}"#, &mut cloud)
        .unwrap();

    assert_eq!(applied, 0);
    assert_eq!(app.peripherals().relay.peripheral().output().levels, vec![false]);
    assert_eq!(app.peripherals().light.peripheral().output().levels, vec![true]);
    assert!(cloud.reported.is_empty());
}

#[test]
fn malformed_json_changes_nothing() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    let res = app.on_twin_document(br#"{"desired":{"relay1":{"value":tr"#, &mut cloud);

    assert_eq!(res, Err(TwinError::Parse));
    assert!(!app.peripherals().relay.twin_state());
    assert_eq!(app.peripherals().relay.peripheral().output().levels, vec![false]);
    assert!(cloud.reported.is_empty());
}

#[test]
fn patch_without_desired_wrapper_applies() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    app.on_twin_document(br#"{"relay1":{"value":true},"$version":7}"#, &mut cloud)
        .unwrap();

    assert!(app.peripherals().relay.twin_state());
    assert_eq!(cloud.reported, vec![r#"{"relay1":true}"#]);
}

#[test]
fn both_properties_reported_in_table_order() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    let applied = app
        .on_twin_document(
            br#"{"desired":{"led1":{"value":false},"relay1":{"value":true}}}"#,
            &mut cloud,
        )
        .unwrap();

    assert_eq!(applied, 2);
    assert_eq!(cloud.reported, vec![r#"{"relay1":true}"#, r#"{"led1":false}"#]);
}

#[test]
fn non_boolean_value_is_ignored() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    app.on_twin_document(br#"{"desired":{"relay1":{"value":"on"}}}"#, &mut cloud)
        .unwrap();

    assert!(!app.peripherals().relay.twin_state());
    assert!(cloud.reported.is_empty());
}

#[test]
fn failed_report_still_updates_state() {
    let mut app = service();
    let mut cloud = MockCloud {
        fail_sends: true,
        ..MockCloud::new()
    };

    app.on_twin_document(br#"{"desired":{"relay1":{"value":true}}}"#, &mut cloud)
        .unwrap();

    assert!(app.peripherals().relay.twin_state());
    assert!(app.peripherals().relay.peripheral().output().last());
}

#[test]
fn twin_document_event_is_applied() {
    let mut app = service();
    let mut cloud = MockCloud::new();

    app.handle_cloud_event(
        CloudEvent::TwinDocument {
            update: TwinUpdate::Complete,
            payload: br#"{"desired":{"led1":{"value":true}},"reported":{}}"#.to_vec(),
        },
        &mut cloud,
    );

    assert!(app.peripherals().light.twin_state());
    assert_eq!(cloud.reported, vec![r#"{"led1":true}"#]);
}

#[test]
fn renamed_property_follows_config() {
    let mut config = SystemConfig::default();
    config.relay.name = "pump".into();
    let mut app = service_with(&config);
    let mut cloud = MockCloud::new();

    app.on_twin_document(
        br#"{"desired":{"relay1":{"value":true},"pump":{"value":true}}}"#,
        &mut cloud,
    )
    .unwrap();

    assert_eq!(cloud.reported, vec![r#"{"pump":true}"#]);
}
