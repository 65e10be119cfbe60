//! Waveform functions
//!
//! `t` is Unix-epoch nanoseconds; one radian every 0.5s.

use contracts::Waveform;

const NANOS_PER_RADIAN: f64 = 500_000_000.0;
const TANGENT_LIMIT: f64 = 2.0;

/// Evaluate a waveform at time `t_nanos`
pub fn evaluate(waveform: Waveform, t_nanos: u64) -> f64 {
    let phase = t_nanos as f64 / NANOS_PER_RADIAN;
    match waveform {
        Waveform::Sine => phase.sin() / 2.0,
        Waveform::Cosine => phase.cos() / 2.0,
        Waveform::ClampedTangent => (phase.tan() / 2.0).clamp(-TANGENT_LIMIT, TANGENT_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_and_cosine_amplitude() {
        assert!(evaluate(Waveform::Sine, 0).abs() < 1e-12);
        assert!((evaluate(Waveform::Cosine, 0) - 0.5).abs() < 1e-12);

        let quarter = (std::f64::consts::FRAC_PI_2 * NANOS_PER_RADIAN) as u64;
        assert!((evaluate(Waveform::Sine, quarter) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tangent_is_clamped() {
        // just below pi/2: tan is huge
        let near_pole = (1.5707 * NANOS_PER_RADIAN) as u64;
        assert_eq!(evaluate(Waveform::ClampedTangent, near_pole), TANGENT_LIMIT);

        // just above pi/2: tan is hugely negative
        let past_pole = (1.5709 * NANOS_PER_RADIAN) as u64;
        assert_eq!(evaluate(Waveform::ClampedTangent, past_pole), -TANGENT_LIMIT);

        let small = (0.1 * NANOS_PER_RADIAN) as u64;
        let value = evaluate(Waveform::ClampedTangent, small);
        assert!(value > 0.0 && value < TANGENT_LIMIT);
    }
}
