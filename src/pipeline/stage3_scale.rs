/// Multiplier applied to the raw model output before display.
pub const YIELD_MULTIPLIER: f64 = 5.0;

pub fn scale_result(raw: f64) -> f64 {
    raw * YIELD_MULTIPLIER
}
