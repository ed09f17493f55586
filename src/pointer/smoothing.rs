//! Single-pole exponential smoothing of cursor targets

/// `value ← value·(1−α) + target·α`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSmoother {
    alpha: f64,
    value: (f64, f64),
}

impl ExponentialSmoother {
    /// `alpha` is clamped to `[0.01, 1.0]`; 1.0 disables smoothing.
    pub fn new(alpha: f64, start: (f64, f64)) -> Self {
        Self {
            alpha: alpha.clamp(0.01, 1.0),
            value: start,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn value(&self) -> (f64, f64) {
        self.value
    }

    /// Jump to `value` without blending.
    pub fn recenter(&mut self, value: (f64, f64)) {
        self.value = value;
    }

    pub fn update(&mut self, target: (f64, f64)) -> (f64, f64) {
        let a = self.alpha;
        self.value = (
            self.value.0 * (1.0 - a) + target.0 * a,
            self.value.1 * (1.0 - a) + target.1 * a,
        );
        self.value
    }
}
