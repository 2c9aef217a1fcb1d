//! Event dispatch and the event loop end to end.

use std::os::unix::net::UnixDatagram;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_io_mini::Async;
use hlbridge::error::InterCoreError;
use hlbridge::event_loop::{self, Runtime};
use hlbridge::events::{Flow, Ready, TimerKind, TimerSpec};
use hlbridge::intercore::Datagram;

use crate::mock_hw::{
    FixedSensor, MockCloud, MockLink, MockPin, RecordingDelay, authenticated_service, connected,
    service,
};

type TestRuntime = Runtime<MockPin, MockCloud, MockLink, FixedSensor, RecordingDelay>;

fn runtime() -> TestRuntime {
    Runtime::new(
        service(),
        MockCloud::new(),
        MockLink::default(),
        FixedSensor::new(21.0, 55.0),
        RecordingDelay::default(),
    )
}

#[test]
fn do_work_timer_pumps_cloud() {
    let mut rt = runtime();
    rt.cloud_mut().deliver(vec![connected()]);

    assert_eq!(rt.dispatch(Ready::Timer(TimerKind::DoWork)), Flow::Continue);
    assert_eq!(rt.cloud().do_work_calls, 1);
    assert!(rt.app().is_authenticated());
}

#[test]
fn measure_timer_sends_telemetry_once_authenticated() {
    let mut rt = runtime();
    rt.dispatch(Ready::Timer(TimerKind::MeasureSensor));
    assert!(rt.cloud().events.is_empty());

    rt.cloud_mut().deliver(vec![connected()]);
    rt.dispatch(Ready::Timer(TimerKind::DoWork));
    rt.dispatch(Ready::Timer(TimerKind::MeasureSensor));
    assert_eq!(rt.cloud().events.len(), 1);
}

#[test]
fn heartbeat_timer_sends_to_rt_core() {
    let mut rt = runtime();
    rt.dispatch(Ready::Timer(TimerKind::RtCoreHeartBeat));
    rt.dispatch(Ready::Timer(TimerKind::RtCoreHeartBeat));
    assert_eq!(rt.link().sent, vec!["HeartBeat-0", "HeartBeat-1"]);
}

#[test]
fn datagram_pulses_relay() {
    let mut rt = runtime();
    let datagram = Datagram::from_slice(b"pressed").unwrap();

    assert_eq!(rt.dispatch(Ready::InterCore(datagram)), Flow::Continue);
    assert_eq!(rt.app().button_presses(), 1);
    assert_eq!(
        rt.app().peripherals().relay.peripheral().output().levels,
        vec![false, true, false]
    );
}

#[test]
fn terminate_and_socket_failure_stop() {
    let mut rt = runtime();
    assert_eq!(rt.dispatch(Ready::Terminate), Flow::Stop);
    assert_eq!(
        rt.dispatch(Ready::InterCoreFailed(InterCoreError::ReceiveFailed)),
        Flow::Stop
    );
}

#[test]
fn event_loop_relays_datagram_until_terminated() {
    let mut cloud = MockCloud::new();
    let app = authenticated_service(&mut cloud);
    let mut rt = Runtime::new(
        app,
        cloud,
        MockLink::default(),
        FixedSensor::new(21.0, 55.0),
        RecordingDelay::default(),
    );

    let (ours, peer) = UnixDatagram::pair().unwrap();
    let socket = Async::new(ours).unwrap();
    peer.send(b"btn").unwrap();

    let terminate = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&terminate);
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(300));
        flag.store(true, Ordering::Relaxed);
    });

    let timers = [TimerSpec {
        kind: TimerKind::RtCoreHeartBeat,
        period: Duration::from_secs(60),
    }];
    event_loop::run(&mut rt, &timers, &socket, &terminate);
    stopper.join().unwrap();

    assert_eq!(rt.app().button_presses(), 1);
    assert_eq!(rt.cloud().events, vec![r#"{"ButtonPressed":1}"#]);
    assert!(rt.link().sent.is_empty());
}
