use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::shared::detection::Detection;

/// Map region in which alert markers are placed, in map-canvas pixels.
pub const MARKER_X_RANGE: RangeInclusive<i32> = 100..=200;
pub const MARKER_Y_RANGE: RangeInclusive<i32> = 50..=250;

/// A fired proximity alert: who was recognized and where to draw the marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub identity: String,
    pub marker_x: i32,
    pub marker_y: i32,
}

/// Cooldown-gated alert decision.
///
/// Two states: READY (no alert within the cooldown window) and COOLING.
/// The first `Known` detection of a frame fires an alert when READY.
/// While COOLING nothing fires, not even a different identity; the state
/// re-enters READY purely by elapsed wall-clock time.
pub struct AlertController {
    cooldown: Duration,
    last_alert: Option<Instant>,
}

impl AlertController {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_alert: None,
        }
    }

    pub fn is_cooling(&self, now: Instant) -> bool {
        self.last_alert
            .is_some_and(|last| now.duration_since(last) < self.cooldown)
    }

    /// Consume one frame's detection list and decide whether an alert fires.
    ///
    /// The caller supplies `now` and the marker RNG so the decision is
    /// deterministic under test.
    pub fn observe<R: Rng>(
        &mut self,
        detections: &[Detection],
        now: Instant,
        rng: &mut R,
    ) -> Option<Alert> {
        let identity = detections
            .iter()
            .find_map(|d| d.label.name())?
            .to_string();

        if self.is_cooling(now) {
            return None;
        }

        self.last_alert = Some(now);
        Some(Alert {
            identity,
            marker_x: rng.gen_range(MARKER_X_RANGE),
            marker_y: rng.gen_range(MARKER_Y_RANGE),
        })
    }
}
