use rand::Rng;

/// Reference point the simulated GPS jitters around.
pub const BASE_LATITUDE: f64 = 37.6019;
pub const BASE_LONGITUDE: f64 = -0.9807;

/// Maximum jitter in degrees, applied independently per axis.
pub const JITTER_DEGREES: f64 = 0.005;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
}

impl std::fmt::Display for GpsFix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Synthesize a coordinate near the reference point.
///
/// Purely cosmetic demo telemetry; it has no interaction with the
/// recognition or alert path.
pub fn simulate_fix<R: Rng>(rng: &mut R) -> GpsFix {
    GpsFix {
        latitude: BASE_LATITUDE + rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES),
        longitude: BASE_LONGITUDE + rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES),
    }
}
