//! Per-level minimum-utility thresholds.

/// `threshold(level) = ceil((1 + alpha_step * level) * min_util)`.
///
/// Generalized nodes aggregate all their descendants, so higher levels need a higher bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelThresholds {
    min_util: u64,
    alpha_step: f64,
}

impl LevelThresholds {
    pub const DEFAULT_ALPHA_STEP: f64 = 0.5;

    /// Negative or NaN `alpha_step` is clamped to 0.
    pub fn new(min_util: u64, alpha_step: f64) -> Self {
        Self {
            min_util,
            alpha_step: clamp_alpha(alpha_step),
        }
    }

    /// Thresholds that do not scale with level.
    pub fn flat(min_util: u64) -> Self {
        Self::new(min_util, 0.0)
    }

    pub fn min_util(&self) -> u64 {
        self.min_util
    }

    pub fn alpha_step(&self) -> f64 {
        self.alpha_step
    }

    /// Exact for every `u64` minimum: `min_util + ceil(alpha_step * level * min_util)`,
    /// saturating at `u64::MAX`.
    pub fn for_level(&self, level: usize) -> u64 {
        if level == 0 || self.min_util == 0 {
            return self.min_util;
        }
        let factor = self.alpha_step * level as f64;
        if factor == 0.0 {
            return self.min_util;
        }
        self.min_util.saturating_add(mul_ceil(self.min_util, factor))
    }
}

/// `ceil(value * factor)` for a non-negative `factor`, computed on the exact
/// binary expansion of the float.
fn mul_ceil(value: u64, factor: f64) -> u64 {
    if !factor.is_finite() {
        return u64::MAX;
    }
    let bits = factor.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    // factor == mantissa * 2^exponent
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    let product = u128::from(value) * u128::from(mantissa);

    let scaled = if exponent >= 0 {
        let shift = exponent as u32;
        if shift >= 128 || product.leading_zeros() < shift {
            return u64::MAX;
        }
        product << shift
    } else {
        let shift = exponent.unsigned_abs();
        if shift >= 128 {
            u128::from(product != 0)
        } else {
            let rounded_up = product & ((1u128 << shift) - 1) != 0;
            (product >> shift) + u128::from(rounded_up)
        }
    };
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

pub(crate) fn clamp_alpha(alpha_step: f64) -> f64 {
    if alpha_step > 0.0 {
        alpha_step
    } else {
        0.0
    }
}
