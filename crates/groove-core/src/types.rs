//! Fundamental types for the GrooveWake engine.

use chrono::Utc;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one engine run (one camera session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }
}

/// The 13 anatomical landmarks the dance detector tracks.
///
/// The pose model may report more; anything outside this set carries no
/// movement weight and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Landmark {
    Nose = 0,
    LeftShoulder = 1,
    RightShoulder = 2,
    LeftElbow = 3,
    RightElbow = 4,
    LeftWrist = 5,
    RightWrist = 6,
    LeftHip = 7,
    RightHip = 8,
    LeftKnee = 9,
    RightKnee = 10,
    LeftAnkle = 11,
    RightAnkle = 12,
}

impl Landmark {
    pub const COUNT: usize = 13;

    pub const ALL: [Landmark; Landmark::COUNT] = [
        Landmark::Nose,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
    ];

    pub fn from_index(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftShoulder),
            2 => Some(Self::RightShoulder),
            3 => Some(Self::LeftElbow),
            4 => Some(Self::RightElbow),
            5 => Some(Self::LeftWrist),
            6 => Some(Self::RightWrist),
            7 => Some(Self::LeftHip),
            8 => Some(Self::RightHip),
            9 => Some(Self::LeftKnee),
            10 => Some(Self::RightKnee),
            11 => Some(Self::LeftAnkle),
            12 => Some(Self::RightAnkle),
            _ => None,
        }
    }

    /// Movement weight used by the scorer. Extremities move most when
    /// dancing, so wrists and ankles dominate the weighted velocity.
    pub fn movement_weight(&self) -> f64 {
        match self {
            Landmark::LeftWrist | Landmark::RightWrist => 2.5,
            Landmark::LeftAnkle | Landmark::RightAnkle => 2.0,
            Landmark::LeftElbow | Landmark::RightElbow => 1.5,
            Landmark::LeftKnee | Landmark::RightKnee => 1.5,
            Landmark::LeftHip | Landmark::RightHip => 1.2,
            Landmark::LeftShoulder | Landmark::RightShoulder => 1.0,
            Landmark::Nose => 0.8,
        }
    }

    /// Returns skeleton connectivity pairs for overlay rendering
    pub fn skeleton_pairs() -> &'static [(Landmark, Landmark)] {
        &[
            (Landmark::LeftShoulder, Landmark::RightShoulder),
            (Landmark::LeftShoulder, Landmark::LeftElbow),
            (Landmark::LeftElbow, Landmark::LeftWrist),
            (Landmark::RightShoulder, Landmark::RightElbow),
            (Landmark::RightElbow, Landmark::RightWrist),
            (Landmark::LeftShoulder, Landmark::LeftHip),
            (Landmark::RightShoulder, Landmark::RightHip),
            (Landmark::LeftHip, Landmark::RightHip),
            (Landmark::LeftHip, Landmark::LeftKnee),
            (Landmark::LeftKnee, Landmark::LeftAnkle),
            (Landmark::RightHip, Landmark::RightKnee),
            (Landmark::RightKnee, Landmark::RightAnkle),
        ]
    }
}

/// Landmark detection with confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeypointDetection {
    pub landmark: Landmark,
    /// Position in frame pixel coordinates
    pub position: Point2<f64>,
    pub confidence: f32,
}

impl KeypointDetection {
    pub fn new(landmark: Landmark, position: Point2<f64>, confidence: f32) -> Self {
        Self {
            landmark,
            position,
            confidence,
        }
    }
}

/// One pose observation: the landmark set detected in a single frame.
///
/// Immutable once produced. The engine keeps at most the previous and the
/// current observation; no longer history of raw poses exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseFrame {
    pub timestamp: Timestamp,
    pub session_id: SessionId,
    pub keypoints: [Option<KeypointDetection>; Landmark::COUNT],
}

impl PoseFrame {
    pub fn empty(timestamp: Timestamp, session_id: SessionId) -> Self {
        Self {
            timestamp,
            session_id,
            keypoints: [None; Landmark::COUNT],
        }
    }

    pub fn get(&self, landmark: Landmark) -> Option<&KeypointDetection> {
        self.keypoints[landmark as usize].as_ref()
    }

    pub fn set(&mut self, detection: KeypointDetection) {
        self.keypoints[detection.landmark as usize] = Some(detection);
    }

    /// The detection for `landmark`, but only if its confidence clears `min`
    pub fn confident(&self, landmark: Landmark, min: f32) -> Option<&KeypointDetection> {
        self.get(landmark).filter(|kp| kp.confidence > min)
    }

    /// Skeleton segments where both endpoints clear the confidence floor,
    /// ready for overlay rendering.
    pub fn skeleton_segments(&self, min_confidence: f32) -> Vec<(Point2<f64>, Point2<f64>)> {
        Landmark::skeleton_pairs()
            .iter()
            .filter_map(|&(a, b)| {
                let start = self.confident(a, min_confidence)?;
                let end = self.confident(b, min_confidence)?;
                Some((start.position, end.position))
            })
            .collect()
    }
}
