//! Event-loop vocabulary.
//!
//! Every source the event loop waits on produces a [`Ready`] event; the
//! runtime dispatches each one to its handler and answers with a
//! [`Flow`] that tells the loop whether to keep going.
//!
//! ```text
//! ┌──────────────┐
//! │ DoWork  1 s  │───┐
//! │ Measure 10 s │───┤     ┌──────────────┐     ┌──────────────┐
//! │ RtCore  30 s │───┼────▶│ Ready queue  │────▶│  Dispatcher  │
//! │ Socket rx    │───┤     │ (bounded)    │     │  (one task)  │
//! │ SIGTERM      │───┘     └──────────────┘     └──────────────┘
//! └──────────────┘
//! ```

use core::time::Duration;

use crate::config::SystemConfig;
use crate::error::InterCoreError;
use crate::intercore::Datagram;

/// Periodic timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Pump the cloud client.
    DoWork,
    /// Read the climate sensor and send telemetry.
    MeasureSensor,
    /// Heartbeat to the real-time core.
    RtCoreHeartBeat,
}

impl TimerKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::DoWork => "DoWork",
            Self::MeasureSensor => "MeasureSensor",
            Self::RtCoreHeartBeat => "rtCoreSend",
        }
    }
}

/// A timer and its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSpec {
    pub kind: TimerKind,
    pub period: Duration,
}

/// The timer table.  All timers are periodic and start with the loop.
pub fn timer_table(config: &SystemConfig) -> [TimerSpec; 3] {
    [
        TimerSpec {
            kind: TimerKind::DoWork,
            period: Duration::from_secs(config.do_work_period_secs.into()),
        },
        TimerSpec {
            kind: TimerKind::MeasureSensor,
            period: Duration::from_secs(config.measure_period_secs.into()),
        },
        TimerSpec {
            kind: TimerKind::RtCoreHeartBeat,
            period: Duration::from_secs(config.heartbeat_period_secs.into()),
        },
    ]
}

/// A source that became ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ready {
    /// A periodic timer expired.
    Timer(TimerKind),
    /// A datagram arrived from the real-time core.
    InterCore(Datagram),
    /// The inter-core socket failed.
    InterCoreFailed(InterCoreError),
    /// Termination was requested (SIGTERM).
    Terminate,
}

/// What the loop does after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}
