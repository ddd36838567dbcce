//! Pose source interfaces.
//!
//! The pose-estimation model itself is an external collaborator; the engine
//! only needs a stream of per-frame observations. A synthetic in-process
//! source stands in for the camera + model pair in demos and tests.

use std::time::Duration;

use async_trait::async_trait;
use nalgebra::Point2;

use groove_core::{
    Error, KeypointDetection, Landmark, PoseFrame, Result, SessionId, Timestamp,
};

/// Trait for pose observation backends
#[async_trait]
pub trait PoseSource: Send {
    /// Start producing frames
    async fn start(&mut self) -> Result<()>;

    /// Stop producing frames
    async fn stop(&mut self) -> Result<()>;

    /// Check if the source is active
    fn is_running(&self) -> bool;

    /// Next pose observation. `Ok(None)` means no person was detected this
    /// frame - a normal input condition, not an error.
    async fn next_frame(&mut self) -> Result<Option<PoseFrame>>;
}

/// Deterministic in-process pose generator.
///
/// Produces a fixed skeleton whose wrists, elbows, and ankles trace small
/// circles, which keeps the per-frame displacement constant and the
/// movement score comfortably above the dance threshold. Frame pacing
/// follows the configured rate.
pub struct SyntheticPoseSource {
    session_id: SessionId,
    frame_period: Duration,
    swing_px: f64,
    frame_index: u64,
    running: bool,
}

impl SyntheticPoseSource {
    /// Phase step per frame (radians)
    const PHASE_STEP: f64 = 0.5;

    pub fn new(session_id: SessionId, fps: u32) -> Self {
        Self {
            session_id,
            frame_period: Duration::from_millis(1000 / fps.max(1) as u64),
            swing_px: 80.0,
            frame_index: 0,
            running: false,
        }
    }

    /// Override the limb swing radius (pixels)
    pub fn with_swing(mut self, swing_px: f64) -> Self {
        self.swing_px = swing_px;
        self
    }

    fn synthesize(&self) -> PoseFrame {
        let phase = self.frame_index as f64 * Self::PHASE_STEP;
        let orbit = |radius: f64| (radius * phase.sin(), radius * phase.cos());

        let (wrist_dx, wrist_dy) = orbit(self.swing_px);
        let (elbow_dx, elbow_dy) = orbit(self.swing_px * 0.5);
        let (ankle_dx, ankle_dy) = orbit(self.swing_px * 0.6);

        // Frontal skeleton roughly centered in a 1280x720 frame
        let layout: [(Landmark, f64, f64, f64, f64); 13] = [
            (Landmark::Nose, 640.0, 200.0, 0.0, 0.0),
            (Landmark::LeftShoulder, 580.0, 280.0, 0.0, 0.0),
            (Landmark::RightShoulder, 700.0, 280.0, 0.0, 0.0),
            (Landmark::LeftElbow, 540.0, 360.0, -elbow_dx, elbow_dy),
            (Landmark::RightElbow, 740.0, 360.0, elbow_dx, elbow_dy),
            (Landmark::LeftWrist, 520.0, 430.0, -wrist_dx, wrist_dy),
            (Landmark::RightWrist, 760.0, 430.0, wrist_dx, wrist_dy),
            (Landmark::LeftHip, 600.0, 450.0, 0.0, 0.0),
            (Landmark::RightHip, 680.0, 450.0, 0.0, 0.0),
            (Landmark::LeftKnee, 590.0, 560.0, 0.0, 0.0),
            (Landmark::RightKnee, 690.0, 560.0, 0.0, 0.0),
            (Landmark::LeftAnkle, 585.0, 670.0, -ankle_dx, ankle_dy),
            (Landmark::RightAnkle, 695.0, 670.0, ankle_dx, ankle_dy),
        ];

        let mut frame = PoseFrame::empty(Timestamp::now(), self.session_id);
        for (landmark, x, y, dx, dy) in layout {
            frame.set(KeypointDetection::new(
                landmark,
                Point2::new(x + dx, y + dy),
                0.9,
            ));
        }
        frame
    }
}

#[async_trait]
impl PoseSource for SyntheticPoseSource {
    async fn start(&mut self) -> Result<()> {
        self.running = true;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    async fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        if !self.running {
            return Err(Error::FrameCapture("source not started".into()));
        }

        tokio::time::sleep(self.frame_period).await;
        let frame = self.synthesize();
        self.frame_index += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn frames_are_complete_and_confident() {
        let mut source = SyntheticPoseSource::new(SessionId::new(), 30);
        source.start().await.unwrap();

        let frame = source.next_frame().await.unwrap().unwrap();
        for landmark in Landmark::ALL {
            assert!(frame.confident(landmark, 0.15).is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wrists_actually_move_between_frames() {
        let mut source = SyntheticPoseSource::new(SessionId::new(), 30);
        source.start().await.unwrap();

        let first = source.next_frame().await.unwrap().unwrap();
        let second = source.next_frame().await.unwrap().unwrap();

        let a = first.get(Landmark::LeftWrist).unwrap().position;
        let b = second.get(Landmark::LeftWrist).unwrap().position;
        assert!(nalgebra::distance(&a, &b) > 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn frame_before_start_is_a_capture_error() {
        let mut source = SyntheticPoseSource::new(SessionId::new(), 30);
        assert!(matches!(
            source.next_frame().await,
            Err(Error::FrameCapture(_))
        ));
    }
}
