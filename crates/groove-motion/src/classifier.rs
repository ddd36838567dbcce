//! Dancing/not-dancing classification with smoothing and hysteresis.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Dance classifier configuration
#[derive(Debug, Clone)]
pub struct DanceClassifierConfig {
    /// Baseline threshold the smoothed score must exceed to start dancing.
    /// Tuned above normal-jitter noise while remaining reachable by
    /// deliberate movement.
    pub movement_threshold: f64,
    /// Fraction of the baseline threshold that keeps an ongoing dance
    /// classified as dancing
    pub hysteresis_ratio: f64,
    /// Rolling history capacity for smoothing
    pub history_size: usize,
}

impl Default for DanceClassifierConfig {
    fn default() -> Self {
        Self {
            movement_threshold: 20.0,
            hysteresis_ratio: 0.7,
            history_size: 8,
        }
    }
}

/// Result of [`DanceClassifier::update`], describing the current state and
/// any transition that just occurred.
///
/// | Previous state | classified | Result |
/// |----------------|------------|--------|
/// | idle | idle | `Idle` |
/// | idle | dancing | `Started` |
/// | dancing | dancing | `Dancing` |
/// | dancing | idle | `Stopped` |
///
/// `Started` and `Stopped` are returned exactly once per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DanceStatus {
    Idle,
    Started,
    Dancing,
    Stopped,
}

impl DanceStatus {
    /// True while classified as dancing (including the entering edge)
    pub fn is_dancing(&self) -> bool {
        matches!(self, DanceStatus::Started | DanceStatus::Dancing)
    }
}

/// One classification step's output
#[derive(Debug, Clone, Copy)]
pub struct DanceSample {
    pub status: DanceStatus,
    /// Recency-weighted average of the score history
    pub smoothed_score: f64,
    /// Smoothed score as a percentage of the baseline threshold, capped at
    /// 100 - the "Moving... N%" readout
    pub level_percent: u8,
    /// How long the dance burst lasted; set only on `Stopped`
    pub ended_after: Option<Duration>,
}

/// Smooths movement scores and applies hysteresis thresholding.
///
/// Keeps a fixed-capacity FIFO of recent scores (oldest dropped beyond
/// capacity). Entering dancing requires the smoothed score to exceed the
/// baseline threshold; leaving requires it to fall to the lower hysteresis
/// threshold, and losing limb visibility forces idle regardless of score.
#[derive(Debug)]
pub struct DanceClassifier {
    config: DanceClassifierConfig,
    history: VecDeque<f64>,
    dancing: bool,
    since: Option<Instant>,
}

impl DanceClassifier {
    pub fn new(config: DanceClassifierConfig) -> Self {
        let capacity = config.history_size;
        Self {
            config,
            history: VecDeque::with_capacity(capacity),
            dancing: false,
            since: None,
        }
    }

    /// Push a movement score and re-classify.
    pub fn update(&mut self, score: f64, limbs_visible: bool) -> DanceSample {
        self.history.push_back(score);
        if self.history.len() > self.config.history_size {
            self.history.pop_front();
        }

        let smoothed = self.smoothed_score();

        let threshold = if self.dancing {
            self.config.movement_threshold * self.config.hysteresis_ratio
        } else {
            self.config.movement_threshold
        };

        let now_dancing = limbs_visible && smoothed > threshold;
        self.transition(now_dancing, smoothed)
    }

    /// No subject in frame: force the idle classification (firing the exit
    /// edge if needed) without touching the score history.
    pub fn no_person(&mut self) -> DanceSample {
        let smoothed = self.smoothed_score();
        self.transition(false, smoothed)
    }

    /// Silently drop the dancing state with no `Stopped` edge. Used when the
    /// alarm is set and the exit side effects must not run.
    pub fn force_idle(&mut self) {
        self.dancing = false;
        self.since = None;
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.dancing = false;
        self.since = None;
    }

    pub fn is_dancing(&self) -> bool {
        self.dancing
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Recency-weighted average: the i-th oldest of K entries gets weight
    /// (i+1)/K, upweighting the newest frames without discarding context.
    fn smoothed_score(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }

        let k = self.history.len() as f64;
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;

        for (i, score) in self.history.iter().enumerate() {
            let recency = (i as f64 + 1.0) / k;
            weighted_sum += score * recency;
            weight_sum += recency;
        }

        weighted_sum / weight_sum
    }

    fn transition(&mut self, now_dancing: bool, smoothed: f64) -> DanceSample {
        let status = match (self.dancing, now_dancing) {
            (false, false) => DanceStatus::Idle,
            (false, true) => {
                self.dancing = true;
                self.since = Some(Instant::now());
                DanceStatus::Started
            }
            (true, true) => DanceStatus::Dancing,
            (true, false) => {
                self.dancing = false;
                DanceStatus::Stopped
            }
        };

        let ended_after = match status {
            DanceStatus::Stopped => self.since.take().map(|since| since.elapsed()),
            _ => None,
        };

        let level = (smoothed / self.config.movement_threshold * 100.0).floor();
        let level_percent = level.clamp(0.0, 100.0) as u8;

        DanceSample {
            status,
            smoothed_score: smoothed,
            level_percent,
            ended_after,
        }
    }
}

impl Default for DanceClassifier {
    fn default() -> Self {
        Self::new(DanceClassifierConfig::default())
    }
}
