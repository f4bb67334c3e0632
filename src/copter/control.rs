use nalgebra::Vector3;
use num_traits::Float;

use super::Position;
use crate::esc::clamp_throttle;

/// Proportional controller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct P {
    pub kp: f32,
}

impl P {
    pub fn new(kp: f32) -> Self {
        Self { kp }
    }

    pub fn control(self, target: f32, actual: f32) -> f32 {
        let error = target - actual;
        error * self.kp
    }
}

/// Mix a hover throttle and a (forward, right, clockwise) demand into
/// per-motor throttles, indexed by [`Position`].
///
/// The demand only redistributes thrust. When a motor would leave [0, 100]
/// the whole differential is scaled down so the most loaded motor sits on the
/// limit.
/// ```
/// use nalgebra::Vector3;
/// use quad_flight::copter::mix;
///
/// // Pitch forward by 10 points around a 50% hover
/// let throttle = mix(50., &Vector3::new(10., 0., 0.));
/// assert_eq!(throttle, [40., 40., 60., 60.]);
/// ```
pub fn mix(hover: f32, demand: &Vector3<f32>) -> [f32; 4] {
    let hover = clamp_throttle(hover);
    let deltas = Position::ALL.map(|position| position.factor().dot(demand));

    let headroom = hover.min(100. - hover);
    let peak = deltas
        .iter()
        .fold(0f32, |peak, delta| peak.max(Float::abs(*delta)));
    let scale = if peak > headroom { headroom / peak } else { 1. };

    deltas.map(|delta| hover + delta * scale)
}
