//! Progress projection for rendering

use storyreel_core::Seconds;

/// Projects elapsed time onto a fraction in `[0, 1]`
///
/// Returns `0.0` when the duration is absent, zero, or not a usable number.
/// Pure and allocation free, so the presentation layer may call it every frame.
pub fn progress(elapsed: Seconds, duration: Option<Seconds>) -> f64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 && elapsed.is_finite() => (elapsed / d).clamp(0.0, 1.0),
        _ => 0.0,
    }
}
