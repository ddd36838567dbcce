//! Event sinks: where core events become something the user can see.

use groove_alarm::AlarmEvent;
use tracing::{debug, info, trace, warn};

/// Consumes the events the alarm machine emits.
///
/// The real presentation layer (DOM, audio, confetti) lives outside this
/// workspace; implementations here render to logs.
pub trait EventSink: Send {
    fn deliver(&mut self, event: &AlarmEvent);
}

const IDLE_LINES: &[&str] = &[
    "Zzz... no dancing?",
    "Bored... dance maybe?",
    "I see you... why no dance?",
    "Move it or lose it!",
    "Standing still...",
];

const DANCING_LINES: &[&str] = &[
    "YEAH! GET IT!",
    "DANCE MACHINE!",
    "YOU'RE ON FIRE!",
    "INCREDIBLE MOVES!",
    "PARTY TIME!",
    "ELECTRIC!",
    "SUPERSTAR!",
    "TO THE MOON!",
];

/// Renders events as human-facing log lines, rotating through the status
/// banter deterministically.
pub struct LogSink {
    idle_cursor: usize,
    dance_cursor: usize,
    last_stop_floor: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self {
            idle_cursor: 0,
            dance_cursor: 0,
            last_stop_floor: 0,
        }
    }

    fn next_idle_line(&mut self) -> &'static str {
        let line = IDLE_LINES[self.idle_cursor % IDLE_LINES.len()];
        self.idle_cursor += 1;
        line
    }

    fn next_dance_line(&mut self) -> &'static str {
        let line = DANCING_LINES[self.dance_cursor % DANCING_LINES.len()];
        self.dance_cursor += 1;
        line
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn deliver(&mut self, event: &AlarmEvent) {
        match event {
            AlarmEvent::TimeAdvanced { target } => {
                info!(
                    target_time = %target,
                    meter = %format_args!("{:.0}%", target.fraction_of_day() * 100.0),
                    "alarm target advanced"
                );
            }
            AlarmEvent::HourCrossed { hour } => {
                let hour12 = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                let meridiem = if *hour < 12 { "AM" } else { "PM" };
                info!("{}:00 {}! keep grooving!", hour12, meridiem);
            }
            AlarmEvent::DanceStarted => {
                info!("{}", self.next_dance_line());
            }
            AlarmEvent::DanceStopped => {
                info!("{}", self.next_idle_line());
            }
            AlarmEvent::AlarmSet { target } => {
                info!(target_time = %target, "alarm set - go to sleep");
            }
            AlarmEvent::SetRejected => {
                warn!("dance first to set a time!");
            }
            AlarmEvent::AlarmCancelled => {
                info!("alarm cancelled");
            }
            AlarmEvent::AlarmTriggered { target } => {
                self.last_stop_floor = 0;
                info!(target_time = %target, "WAKE UP! dance to stop the alarm");
                info!("0 / 10 seconds - START DANCING!");
            }
            AlarmEvent::StopProgress { seconds_danced } => {
                let floor = *seconds_danced as u64;
                if floor != self.last_stop_floor {
                    self.last_stop_floor = floor;
                    info!("{} / 10 seconds - KEEP DANCING!", floor);
                } else {
                    debug!(seconds_danced, "stop progress");
                }
            }
            AlarmEvent::AlarmStopped => {
                info!("ALARM STOPPED! enjoy the day");
            }
            AlarmEvent::ClockTick { minute_of_day } => {
                trace!(minute_of_day, "clock tick");
            }
        }
    }
}
