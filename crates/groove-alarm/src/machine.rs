//! The alarm state machine: setup → waiting → ringing.
//!
//! All mutable alarm state lives here, mutated only from the engine's
//! single task - frame-driven dance updates and the 1 Hz clock tick never
//! run concurrently. Methods return the events each step produced; the
//! machine performs no I/O of its own.

use groove_motion::DanceStatus;
use tokio::time::Instant;

use crate::clock::AlarmTime;
use crate::events::AlarmEvent;

/// Seconds of accumulated dancing required to silence a ringing alarm
pub const SECONDS_TO_STOP_ALARM: f64 = 10.0;

/// Dance-to-time conversion rate: minutes of alarm time per second of
/// continuous dancing
pub const MINUTES_PER_DANCE_SECOND: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmMode {
    /// Dancing advances the target time; `set_alarm` arms it
    Setup,
    /// Armed; a periodic wall-clock check decides when to ring
    Waiting,
    /// Ringing; accumulated dancing silences it
    Ringing,
}

/// Owns the alarm target, mode, and the two elapsed-time markers.
///
/// Markers are monotonic instants: the dance-to-time marker only resets
/// when whole minutes actually accrue (fractional elapsed time keeps
/// counting against the same marker), and the stop-alarm marker is cleared
/// outright whenever dancing stops so a resume never back-credits the gap.
#[derive(Debug)]
pub struct AlarmMachine {
    mode: AlarmMode,
    target: AlarmTime,
    dancing: bool,
    /// Setup mode: last instant minutes were credited
    advance_marker: Option<Instant>,
    /// Ringing mode: seconds danced toward the stop threshold
    stop_secs: f64,
    /// Ringing mode: last instant stop progress was credited
    stop_marker: Option<Instant>,
}

impl AlarmMachine {
    pub fn new() -> Self {
        Self {
            mode: AlarmMode::Setup,
            target: AlarmTime::MIDNIGHT,
            dancing: false,
            advance_marker: None,
            stop_secs: 0.0,
            stop_marker: None,
        }
    }

    pub fn mode(&self) -> AlarmMode {
        self.mode
    }

    pub fn target(&self) -> AlarmTime {
        self.target
    }

    pub fn is_dancing(&self) -> bool {
        self.dancing
    }

    pub fn stop_progress_secs(&self) -> f64 {
        self.stop_secs
    }

    /// Restore the initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed one frame's dance classification.
    pub fn on_dance(&mut self, status: DanceStatus) -> Vec<AlarmEvent> {
        let mut events = Vec::new();

        match status {
            DanceStatus::Started => {
                self.dancing = true;
                let now = Instant::now();
                self.advance_marker = Some(now);
                if self.mode == AlarmMode::Ringing {
                    self.stop_marker = Some(now);
                }
                events.push(AlarmEvent::DanceStarted);
            }
            DanceStatus::Dancing => match self.mode {
                AlarmMode::Setup => self.advance_time(&mut events),
                AlarmMode::Ringing => self.advance_stop_progress(&mut events),
                AlarmMode::Waiting => {}
            },
            DanceStatus::Stopped => {
                self.dancing = false;
                self.advance_marker = None;
                self.stop_marker = None;
                events.push(AlarmEvent::DanceStopped);
            }
            DanceStatus::Idle => {
                // A resumed dance times its next interval fresh
                if self.mode == AlarmMode::Ringing {
                    self.stop_marker = None;
                }
            }
        }

        events
    }

    /// Arm the alarm at the current target.
    ///
    /// Rejected while the target is still at midnight - there is nothing to
    /// wake up to. On success the dancing state is force-stopped without a
    /// `DanceStopped` event, so exit side effects (music toggle) stay quiet.
    pub fn set_alarm(&mut self) -> Vec<AlarmEvent> {
        if self.mode != AlarmMode::Setup {
            return Vec::new();
        }
        if self.target.is_midnight() {
            return vec![AlarmEvent::SetRejected];
        }

        self.mode = AlarmMode::Waiting;
        self.dancing = false;
        self.advance_marker = None;

        vec![AlarmEvent::AlarmSet {
            target: self.target,
        }]
    }

    /// Disarm a waiting alarm and return to setup at midnight.
    pub fn cancel(&mut self) -> Vec<AlarmEvent> {
        if self.mode != AlarmMode::Waiting {
            return Vec::new();
        }

        self.mode = AlarmMode::Setup;
        self.target = AlarmTime::MIDNIGHT;

        vec![AlarmEvent::AlarmCancelled]
    }

    /// Feed one 1 Hz wall-clock tick.
    ///
    /// Fires at most once per armed alarm: the trigger moves the mode out
    /// of `Waiting`, so later ticks cannot re-trigger. The comparison is a
    /// plain minute-of-day `>=` - a target earlier in the day than now
    /// rings on the next tick rather than the next day.
    pub fn on_clock_tick(&mut self, minute_of_day: u16) -> Vec<AlarmEvent> {
        let mut events = vec![AlarmEvent::ClockTick { minute_of_day }];

        if self.mode == AlarmMode::Waiting && minute_of_day >= self.target.as_minutes() {
            self.mode = AlarmMode::Ringing;
            self.stop_secs = 0.0;
            self.stop_marker = None;
            events.push(AlarmEvent::AlarmTriggered {
                target: self.target,
            });
        }

        events
    }

    /// Setup-mode dance-to-time conversion: 1 minute per second of
    /// continuous dancing, credited in whole minutes.
    fn advance_time(&mut self, events: &mut Vec<AlarmEvent>) {
        let now = Instant::now();
        let marker = match self.advance_marker {
            Some(marker) => marker,
            None => {
                self.advance_marker = Some(now);
                return;
            }
        };

        let elapsed = (now - marker).as_secs_f64();
        let minutes = (elapsed * MINUTES_PER_DANCE_SECOND).floor() as u32;
        if minutes == 0 {
            return;
        }

        let previous = self.target;
        self.target = self.target.saturating_add(minutes);
        self.advance_marker = Some(now);

        events.push(AlarmEvent::TimeAdvanced {
            target: self.target,
        });

        if self.target.hour() > previous.hour() {
            events.push(AlarmEvent::HourCrossed {
                hour: self.target.hour(),
            });
        }
    }

    /// Ringing-mode stop progress: real elapsed seconds, 1:1, only while
    /// dancing.
    fn advance_stop_progress(&mut self, events: &mut Vec<AlarmEvent>) {
        let now = Instant::now();
        let marker = match self.stop_marker {
            Some(marker) => marker,
            None => {
                self.stop_marker = Some(now);
                return;
            }
        };

        self.stop_secs += (now - marker).as_secs_f64();
        self.stop_marker = Some(now);

        events.push(AlarmEvent::StopProgress {
            seconds_danced: self.stop_secs,
        });

        if self.stop_secs >= SECONDS_TO_STOP_ALARM {
            self.mode = AlarmMode::Setup;
            self.target = AlarmTime::MIDNIGHT;
            self.stop_secs = 0.0;
            self.stop_marker = None;
            self.advance_marker = None;
            events.push(AlarmEvent::AlarmStopped);
        }
    }
}

impl Default for AlarmMachine {
    fn default() -> Self {
        Self::new()
    }
}
