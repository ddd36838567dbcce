//! UI-facing events emitted by the alarm machine.

use serde::{Deserialize, Serialize};

use crate::clock::AlarmTime;

/// Everything the presentation layer needs to hear from the core.
///
/// The machine itself performs no I/O; a sink renders these into DOM
/// updates, audio playback, confetti, or log lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AlarmEvent {
    /// Dancing advanced the target time
    TimeAdvanced { target: AlarmTime },
    /// The target crossed an hour boundary - celebration trigger
    HourCrossed { hour: u16 },
    DanceStarted,
    DanceStopped,
    /// The alarm was armed at this target
    AlarmSet { target: AlarmTime },
    /// Set request rejected: the target is still at midnight. A user-facing
    /// signal ("dance first!"), not an error.
    SetRejected,
    AlarmCancelled,
    /// The wall clock reached the target
    AlarmTriggered { target: AlarmTime },
    /// Accumulated dancing seconds toward silencing the ringing alarm
    StopProgress { seconds_danced: f64 },
    /// Ten seconds of dancing accumulated - the alarm is silenced
    AlarmStopped,
    /// 1 Hz readout refresh of the current wall-clock time
    ClockTick { minute_of_day: u16 },
}
