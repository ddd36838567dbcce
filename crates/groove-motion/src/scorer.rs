//! Per-frame movement intensity from weighted keypoint velocities.

use groove_core::{Landmark, PoseFrame};
use serde::{Deserialize, Serialize};

/// Minimum confidence for a landmark to contribute to the velocity sums
pub const KEYPOINT_MIN_CONFIDENCE: f32 = 0.15;

/// Minimum nose confidence for the body to count as visible
pub const BODY_MIN_CONFIDENCE: f32 = 0.3;

/// Blend factors: the average keeps the signal stable against noise in any
/// one limb, the max captures sudden localized moves.
const AVERAGE_BLEND: f64 = 0.6;
const MAX_BLEND: f64 = 0.4;

/// Which parts of the subject the pose model can currently see.
///
/// Computed every frame independent of movement; absence of all three gates
/// dance detection off entirely and drives the "can't see you" warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    /// Either wrist above the keypoint confidence floor
    pub hands: bool,
    /// Either ankle or either knee above the keypoint confidence floor
    pub legs: bool,
    /// Nose above the body confidence floor
    pub body: bool,
}

impl Visibility {
    pub fn from_frame(frame: &PoseFrame) -> Self {
        let hands = frame
            .confident(Landmark::LeftWrist, KEYPOINT_MIN_CONFIDENCE)
            .is_some()
            || frame
                .confident(Landmark::RightWrist, KEYPOINT_MIN_CONFIDENCE)
                .is_some();

        let legs = [
            Landmark::LeftAnkle,
            Landmark::RightAnkle,
            Landmark::LeftKnee,
            Landmark::RightKnee,
        ]
        .iter()
        .any(|&lm| frame.confident(lm, KEYPOINT_MIN_CONFIDENCE).is_some());

        let body = frame
            .confident(Landmark::Nose, BODY_MIN_CONFIDENCE)
            .is_some();

        Self { hands, legs, body }
    }

    pub fn any(&self) -> bool {
        self.hands || self.legs || self.body
    }
}

/// Movement intensity for one frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovementSample {
    /// Combined score: blend of weighted average and max velocity
    pub score: f64,
    /// Weighted average displacement over qualifying landmarks
    pub weighted_average: f64,
    /// Largest single-landmark displacement this frame
    pub max_velocity: f64,
    pub visibility: Visibility,
}

/// Computes per-frame movement intensity from consecutive pose observations.
///
/// Retains only the previous observation; landmarks below the confidence
/// floor in either frame contribute nothing to the sums.
#[derive(Debug, Default)]
pub struct MovementScorer {
    previous: Option<PoseFrame>,
}

impl MovementScorer {
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Score the current frame against the retained previous one.
    ///
    /// The first frame yields score 0 with real visibility flags.
    pub fn score(&mut self, frame: &PoseFrame) -> MovementSample {
        let visibility = Visibility::from_frame(frame);

        let mut weighted_movement = 0.0;
        let mut total_weight = 0.0;
        let mut max_velocity = 0.0f64;

        if let Some(previous) = &self.previous {
            for landmark in Landmark::ALL {
                let current = frame.confident(landmark, KEYPOINT_MIN_CONFIDENCE);
                let prior = previous.confident(landmark, KEYPOINT_MIN_CONFIDENCE);

                if let (Some(current), Some(prior)) = (current, prior) {
                    let velocity = nalgebra::distance(&current.position, &prior.position);

                    weighted_movement += velocity * landmark.movement_weight();
                    total_weight += landmark.movement_weight();
                    max_velocity = max_velocity.max(velocity);
                }
            }
        }

        self.previous = Some(frame.clone());

        let weighted_average = if total_weight > 0.0 {
            weighted_movement / total_weight
        } else {
            0.0
        };

        MovementSample {
            score: weighted_average * AVERAGE_BLEND + max_velocity * MAX_BLEND,
            weighted_average,
            max_velocity,
            visibility,
        }
    }

    /// Drop the retained frame. Used on engine reset; no-person frames keep
    /// the last observation so a brief detection gap does not zero the
    /// velocity baseline.
    pub fn clear(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::{KeypointDetection, SessionId, Timestamp};
    use nalgebra::Point2;

    fn frame_with(parts: &[(Landmark, f64, f64, f32)]) -> PoseFrame {
        let mut frame = PoseFrame::empty(Timestamp::from_nanos(0), SessionId::new());
        for &(landmark, x, y, confidence) in parts {
            frame.set(KeypointDetection::new(
                landmark,
                Point2::new(x, y),
                confidence,
            ));
        }
        frame
    }

    #[test]
    fn first_frame_scores_zero() {
        let mut scorer = MovementScorer::new();
        let sample = scorer.score(&frame_with(&[(Landmark::Nose, 100.0, 100.0, 0.9)]));

        assert_eq!(sample.score, 0.0);
        assert!(sample.visibility.body);
    }

    #[test]
    fn single_moving_wrist_blends_average_and_max() {
        let mut scorer = MovementScorer::new();
        scorer.score(&frame_with(&[(Landmark::LeftWrist, 0.0, 0.0, 0.9)]));
        let sample = scorer.score(&frame_with(&[(Landmark::LeftWrist, 3.0, 4.0, 0.9)]));

        // One qualifying landmark: weighted average equals its displacement,
        // max equals the same 5px, so the blend is 5.
        assert!((sample.weighted_average - 5.0).abs() < 1e-9);
        assert!((sample.max_velocity - 5.0).abs() < 1e-9);
        assert!((sample.score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn low_confidence_landmark_is_excluded() {
        let mut scorer = MovementScorer::new();
        scorer.score(&frame_with(&[
            (Landmark::LeftWrist, 0.0, 0.0, 0.9),
            (Landmark::RightAnkle, 0.0, 0.0, 0.1),
        ]));
        let sample = scorer.score(&frame_with(&[
            (Landmark::LeftWrist, 0.0, 10.0, 0.9),
            (Landmark::RightAnkle, 0.0, 500.0, 0.1),
        ]));

        // The 500px ankle jump is below the confidence floor in both frames
        // and must not reach the max-velocity track.
        assert!((sample.max_velocity - 10.0).abs() < 1e-9);
    }

    #[test]
    fn landmark_must_qualify_in_both_frames() {
        let mut scorer = MovementScorer::new();
        scorer.score(&frame_with(&[(Landmark::LeftWrist, 0.0, 0.0, 0.1)]));
        let sample = scorer.score(&frame_with(&[(Landmark::LeftWrist, 50.0, 0.0, 0.9)]));

        assert_eq!(sample.score, 0.0);
    }

    #[test]
    fn heavier_landmarks_dominate_the_average() {
        let mut scorer = MovementScorer::new();
        scorer.score(&frame_with(&[
            (Landmark::LeftWrist, 0.0, 0.0, 0.9),
            (Landmark::Nose, 0.0, 0.0, 0.9),
        ]));
        // Wrist moves 10, nose stays put: weighted avg = 10 * 2.5 / 3.3
        let sample = scorer.score(&frame_with(&[
            (Landmark::LeftWrist, 10.0, 0.0, 0.9),
            (Landmark::Nose, 0.0, 0.0, 0.9),
        ]));

        assert!((sample.weighted_average - 25.0 / 3.3).abs() < 1e-9);
    }

    #[test]
    fn visibility_flags() {
        let legs_only = Visibility::from_frame(&frame_with(&[(
            Landmark::LeftKnee,
            0.0,
            0.0,
            0.5,
        )]));
        assert!(!legs_only.hands);
        assert!(legs_only.legs);
        assert!(legs_only.any());

        // Nose at 0.2 clears the keypoint floor but not the body floor
        let dim_nose = Visibility::from_frame(&frame_with(&[(Landmark::Nose, 0.0, 0.0, 0.2)]));
        assert!(!dim_nose.body);
        assert!(!dim_nose.any());
    }
}
