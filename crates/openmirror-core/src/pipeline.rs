//! Command-vector validation and clamping.
//!
//! Values beyond the physical actuator range are silently saturated rather
//! than rejected: the range matches the hardware, and small numeric
//! overshoot from upstream computation must not turn into spurious failures.
//! NaN, by contrast, has no meaningful clamp and is always rejected before
//! any buffer mutation.

use crate::error::{MirrorError, MirrorResult};

/// Lower bound of the normalized actuator command range.
pub const COMMAND_MIN: f64 = -1.0;
/// Upper bound of the normalized actuator command range.
pub const COMMAND_MAX: f64 = 1.0;

/// Checks a command vector against the session's actuator count.
///
/// Both checks run before any buffer mutation: a rejected vector leaves the
/// command buffer untouched.
pub fn validate(commands: &[f64], expected: usize) -> MirrorResult<()> {
    if commands.len() != expected {
        return Err(MirrorError::DimensionMismatch {
            expected,
            actual: commands.len(),
        });
    }
    if let Some(index) = commands.iter().position(|v| v.is_nan()) {
        return Err(MirrorError::InvalidValue(format!(
            "NaN at actuator index {index}"
        )));
    }
    Ok(())
}

/// Writes `src` into `dst`, clamping every element to the actuator range.
///
/// Caller guarantees equal lengths (enforced upstream by [`validate`]).
pub fn write_clamped(dst: &mut [f64], src: &[f64]) {
    debug_assert_eq!(dst.len(), src.len());
    for (slot, value) in dst.iter_mut().zip(src) {
        *slot = value.clamp(COMMAND_MIN, COMMAND_MAX);
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_matching_vector() -> MirrorResult<()> {
        validate(&[0.0, 0.5, -0.5], 3)
    }

    #[test]
    fn test_validate_rejects_wrong_length() {
        let err = validate(&[0.1; 11], 12);
        assert!(matches!(
            err,
            Err(MirrorError::DimensionMismatch {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let err = validate(&[0.0, f64::NAN, 0.0], 3);
        match err {
            Err(MirrorError::InvalidValue(msg)) => assert!(msg.contains("index 1")),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_infinities() -> MirrorResult<()> {
        // Infinities clamp cleanly; only NaN is unrepresentable.
        validate(&[f64::INFINITY, f64::NEG_INFINITY], 2)
    }

    #[test]
    fn test_write_clamped_in_range_passthrough() {
        let mut dst = [0.0; 3];
        write_clamped(&mut dst, &[0.25, -0.75, 1.0]);
        assert_eq!(dst, [0.25, -0.75, 1.0]);
    }

    #[test]
    fn test_write_clamped_saturates() {
        let mut dst = [0.0; 4];
        write_clamped(&mut dst, &[2.0, -2.0, f64::INFINITY, f64::NEG_INFINITY]);
        assert_eq!(dst, [1.0, -1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_write_clamped_overwrites_previous_contents() {
        let mut dst = [0.9, 0.9];
        write_clamped(&mut dst, &[-0.1, 0.1]);
        assert_eq!(dst, [-0.1, 0.1]);
    }
}
