//! The single-task engine loop.
//!
//! One `tokio::select!` loop multiplexes three inputs - pose frames, the
//! 1 Hz wall-clock tick, and user commands - into one serialized
//! state-update path. All mutable state (scorer, classifier, alarm machine)
//! is owned here and never touched from another task, so the frame path and
//! the clock check cannot interleave mid-update.

use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use groove_alarm::{minute_of_day, AlarmMachine, AlarmMode};
use groove_core::{Error, PoseFrame, Result, SessionId};
use groove_motion::{DanceClassifier, DanceStatus, MovementScorer};

use crate::config::ClockConfig;
use crate::sink::EventSink;
use crate::source::PoseSource;

/// A stalled pose source must not freeze the state machine
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Confidence floor for keypoints in the skeleton overlay
const OVERLAY_MIN_CONFIDENCE: f32 = 0.3;

/// User requests, the stand-in for the set/cancel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    SetAlarm,
    CancelAlarm,
    Shutdown,
}

/// Owns the whole detection-to-alarm pipeline for one session.
pub struct DanceAlarmEngine<S: EventSink> {
    session_id: SessionId,
    scorer: MovementScorer,
    classifier: DanceClassifier,
    machine: AlarmMachine,
    sink: S,
    visibility_warned: bool,
}

impl<S: EventSink> DanceAlarmEngine<S> {
    pub fn new(session_id: SessionId, sink: S) -> Self {
        Self {
            session_id,
            scorer: MovementScorer::new(),
            classifier: DanceClassifier::default(),
            machine: AlarmMachine::new(),
            sink,
            visibility_warned: false,
        }
    }

    /// Run until a shutdown command arrives (or the command channel
    /// closes). Source startup failure is fatal and aborts before the loop.
    pub async fn run<P: PoseSource>(
        &mut self,
        mut source: P,
        mut commands: mpsc::Receiver<EngineCommand>,
        clock: &ClockConfig,
    ) -> Result<()> {
        source.start().await?;
        info!(session = %self.session_id.0, "engine started");

        let mut ticker = tokio::time::interval(Duration::from_secs(clock.tick_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                result = tokio::time::timeout(FRAME_TIMEOUT, source.next_frame()) => {
                    match result {
                        Err(_) => {
                            let err = Error::FrameTimeout {
                                duration_ms: FRAME_TIMEOUT.as_millis() as u64,
                            };
                            warn!(%err, "skipping frame");
                        }
                        Ok(Err(err)) => warn!(%err, "skipping frame"),
                        Ok(Ok(frame)) => self.handle_frame(frame),
                    }
                }
                _ = ticker.tick() => self.handle_tick(),
                command = commands.recv() => {
                    let command = command.unwrap_or(EngineCommand::Shutdown);
                    if !self.handle_command(command) {
                        break;
                    }
                }
            }
        }

        source.stop().await?;
        info!("engine stopped");
        Ok(())
    }

    /// Restore the initial state: fresh scorer baseline, empty score
    /// history, alarm back to setup at midnight.
    pub fn reset(&mut self) {
        self.scorer.clear();
        self.classifier.reset();
        self.machine.reset();
        self.visibility_warned = false;
    }

    /// One pose frame (or a no-person detection) through the whole path.
    fn handle_frame(&mut self, frame: Option<PoseFrame>) {
        let dance = match frame {
            Some(frame) => {
                let segments = frame.skeleton_segments(OVERLAY_MIN_CONFIDENCE);
                trace!(segments = segments.len(), "overlay skeleton");

                let sample = self.scorer.score(&frame);
                self.warn_on_lost_visibility(sample.visibility.any());
                self.classifier.update(sample.score, sample.visibility.any())
            }
            None => self.classifier.no_person(),
        };

        if let Some(duration) = dance.ended_after {
            debug!(secs = duration.as_secs_f64(), "dance burst ended");
        }

        // The "Moving... N%" readout: visible movement that has not yet
        // crossed the threshold, only meaningful while setting up.
        if dance.status == DanceStatus::Idle
            && self.machine.mode() == AlarmMode::Setup
            && dance.level_percent > 30
        {
            debug!(level = dance.level_percent, "moving, not yet dancing");
        }

        let events = self.machine.on_dance(dance.status);
        self.dispatch(events);
    }

    fn handle_tick(&mut self) {
        self.handle_minute(minute_of_day(&Local::now()));
    }

    fn handle_minute(&mut self, minute: u16) {
        let events = self.machine.on_clock_tick(minute);
        self.dispatch(events);
    }

    /// Returns false when the engine should stop.
    fn handle_command(&mut self, command: EngineCommand) -> bool {
        match command {
            EngineCommand::SetAlarm => {
                let events = self.machine.set_alarm();
                if self.machine.mode() == AlarmMode::Waiting {
                    // Dancing ends here without a Stopped edge: the exit
                    // side effects must not fire when the alarm arms.
                    self.classifier.force_idle();
                }
                self.dispatch(events);
                true
            }
            EngineCommand::CancelAlarm => {
                let events = self.machine.cancel();
                self.dispatch(events);
                true
            }
            EngineCommand::Shutdown => {
                info!("shutdown requested");
                false
            }
        }
    }

    fn dispatch(&mut self, events: Vec<groove_alarm::AlarmEvent>) {
        for event in &events {
            self.sink.deliver(event);
        }
    }

    /// Edge-triggered "can't see you" warning
    fn warn_on_lost_visibility(&mut self, limbs_visible: bool) {
        if !limbs_visible && !self.visibility_warned {
            warn!("can't see your limbs - step back into frame");
            self.visibility_warned = true;
        } else if limbs_visible && self.visibility_warned {
            self.visibility_warned = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_alarm::{AlarmEvent, AlarmTime};
    use groove_core::{KeypointDetection, Landmark, Timestamp};
    use nalgebra::Point2;
    use tokio::time;

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<AlarmEvent>,
    }

    impl EventSink for RecordingSink {
        fn deliver(&mut self, event: &AlarmEvent) {
            self.events.push(*event);
        }
    }

    fn engine() -> DanceAlarmEngine<RecordingSink> {
        DanceAlarmEngine::new(SessionId::new(), RecordingSink::default())
    }

    /// A frame with only a wrist, placed at `x`: one qualifying landmark,
    /// so the movement score equals the wrist displacement.
    fn wrist_frame(x: f64) -> PoseFrame {
        let mut frame = PoseFrame::empty(Timestamp::from_nanos(0), SessionId::new());
        frame.set(KeypointDetection::new(
            Landmark::LeftWrist,
            Point2::new(x, 0.0),
            0.9,
        ));
        frame
    }

    /// Dance hard for `secs` seconds at one frame per second.
    async fn dance(engine: &mut DanceAlarmEngine<RecordingSink>, secs: u64) {
        for i in 0..=secs {
            engine.handle_frame(Some(wrist_frame(if i % 2 == 0 { 0.0 } else { 100.0 })));
            if i < secs {
                time::advance(Duration::from_secs(1)).await;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dancing_frames_advance_the_target() {
        let mut engine = engine();
        dance(&mut engine, 65).await;

        assert_eq!(engine.machine.target().as_minutes(), 64);
        assert!(engine.sink.events.contains(&AlarmEvent::DanceStarted));
        assert!(engine
            .sink
            .events
            .contains(&AlarmEvent::HourCrossed { hour: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn no_person_fires_the_exit_transition() {
        let mut engine = engine();
        dance(&mut engine, 3).await;
        assert!(engine.classifier.is_dancing());

        engine.handle_frame(None);
        assert_eq!(
            engine.sink.events.last(),
            Some(&AlarmEvent::DanceStopped)
        );
        assert!(!engine.classifier.is_dancing());
    }

    #[tokio::test(start_paused = true)]
    async fn set_alarm_command_arms_without_a_stop_edge() {
        let mut engine = engine();
        dance(&mut engine, 30).await;
        engine.sink.events.clear();

        assert!(engine.handle_command(EngineCommand::SetAlarm));
        assert_eq!(engine.machine.mode(), AlarmMode::Waiting);
        assert!(!engine.classifier.is_dancing());
        assert!(engine
            .sink
            .events
            .iter()
            .any(|e| matches!(e, AlarmEvent::AlarmSet { .. })));
        assert!(!engine.sink.events.contains(&AlarmEvent::DanceStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn set_alarm_at_midnight_is_rejected() {
        let mut engine = engine();
        assert!(engine.handle_command(EngineCommand::SetAlarm));

        assert_eq!(engine.sink.events, vec![AlarmEvent::SetRejected]);
        assert_eq!(engine.machine.mode(), AlarmMode::Setup);
    }

    #[tokio::test(start_paused = true)]
    async fn full_cycle_rings_and_stops() {
        let mut engine = engine();
        dance(&mut engine, 30).await;
        engine.handle_command(EngineCommand::SetAlarm);
        let target = engine.machine.target();

        // Clock reaches the target: ring
        engine.handle_minute(target.as_minutes());
        assert_eq!(engine.machine.mode(), AlarmMode::Ringing);
        assert!(engine
            .sink
            .events
            .iter()
            .any(|e| matches!(e, AlarmEvent::AlarmTriggered { .. })));

        // Ten danced seconds silence it
        dance(&mut engine, 10).await;
        assert!(engine.sink.events.contains(&AlarmEvent::AlarmStopped));
        assert_eq!(engine.machine.mode(), AlarmMode::Setup);
        assert_eq!(engine.machine.target(), AlarmTime::MIDNIGHT);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_command_disarms() {
        let mut engine = engine();
        dance(&mut engine, 30).await;
        engine.handle_command(EngineCommand::SetAlarm);

        engine.handle_command(EngineCommand::CancelAlarm);
        assert_eq!(engine.machine.mode(), AlarmMode::Setup);
        assert_eq!(engine.machine.target(), AlarmTime::MIDNIGHT);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_stops_on_shutdown() {
        let mut engine = engine();
        let source = crate::source::SyntheticPoseSource::new(SessionId::new(), 30);
        let (tx, rx) = mpsc::channel(4);

        tx.send(EngineCommand::Shutdown).await.unwrap();
        let clock = ClockConfig { tick_secs: 1 };
        engine.run(source, rx, &clock).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn reset_restores_everything() {
        let mut engine = engine();
        dance(&mut engine, 30).await;
        engine.handle_command(EngineCommand::SetAlarm);

        engine.reset();
        assert_eq!(engine.machine.mode(), AlarmMode::Setup);
        assert_eq!(engine.machine.target(), AlarmTime::MIDNIGHT);
        assert!(!engine.classifier.is_dancing());
    }
}
