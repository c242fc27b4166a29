// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Quaternion normalization and Euler-angle conversion.
//!
//! One shared conversion path for every sample producer: sources hand
//! their raw orientation quaternion to [`to_euler`] instead of carrying
//! a conversion of their own.

use thiserror::Error;

/// Orientation quaternion in (w, x, y, z) component order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Euclidean magnitude.
    pub fn magnitude(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Yaw, pitch and roll in degrees, each rounded to 3 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Quaternion math errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MathError {
    /// A zero-magnitude quaternion carries no orientation; it is never
    /// coerced to a default one.
    #[error("cannot normalize a zero quaternion")]
    ZeroQuaternion,
}

/// Scale a quaternion to unit magnitude.
///
/// Fails when the magnitude is exactly zero; no epsilon tolerance is
/// applied.
pub fn normalize(q: Quaternion) -> Result<Quaternion, MathError> {
    let magnitude = q.magnitude();
    if magnitude == 0.0 {
        return Err(MathError::ZeroQuaternion);
    }

    Ok(Quaternion::new(
        q.w / magnitude,
        q.x / magnitude,
        q.y / magnitude,
        q.z / magnitude,
    ))
}

/// Convert an orientation quaternion to yaw/pitch/roll in degrees.
///
/// Normalizes internally, so any non-zero scaling of the same rotation
/// maps to the same angles. The output is unwrapped: no quadrant
/// correction is applied to yaw or roll.
pub fn to_euler(q: Quaternion) -> Result<EulerAngles, MathError> {
    let Quaternion { w, x, y, z } = normalize(q)?;

    let yaw = (2.0 * (y * z + w * x)).atan2(1.0 - 2.0 * (x * x + y * y));
    let pitch = (2.0 * (w * y - x * z)).asin();
    let roll = (2.0 * (x * y + w * z)).atan2(1.0 - 2.0 * (y * y + z * z));

    Ok(EulerAngles {
        yaw: round3(yaw.to_degrees()),
        pitch: round3(pitch.to_degrees()),
        roll: round3(roll.to_degrees()),
    })
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_quaternions() {
        let cases = [
            ((1.0, 0.0, 1.0, 0.0), (0.0, 90.0, 0.0)),
            ((1.0, 0.0, 0.0, 1.0), (0.0, 0.0, 90.0)),
            ((1.0, 1.0, 1.0, 1.0), (90.0, 0.0, 90.0)),
            ((-1.0, -1.0, -1.0, -1.0), (90.0, 0.0, 90.0)),
            ((-1.0, 0.0, -1.0, 0.0), (0.0, 90.0, 0.0)),
            ((-1.0, 0.0, 0.0, -1.0), (0.0, 0.0, 90.0)),
        ];

        for ((w, x, y, z), (yaw, pitch, roll)) in cases {
            let angles = to_euler(Quaternion::new(w, x, y, z)).expect("convert");
            assert_eq!(angles, EulerAngles { yaw, pitch, roll }, "({w},{x},{y},{z})");
        }
    }

    #[test]
    fn test_zero_quaternion_is_rejected() {
        let zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);

        assert_eq!(normalize(zero), Err(MathError::ZeroQuaternion));
        assert_eq!(to_euler(zero), Err(MathError::ZeroQuaternion));
    }

    #[test]
    fn test_scale_invariance() {
        let quats = [
            Quaternion::new(0.2, -0.4, 0.1, 0.88),
            Quaternion::new(1.0, 2.0, 3.0, 4.0),
            Quaternion::new(-0.5, 0.5, -0.5, 0.5),
        ];

        for q in quats {
            let unit = normalize(q).expect("normalize");
            assert_eq!(to_euler(unit).expect("unit"), to_euler(q).expect("raw"));
        }
    }

    #[test]
    fn test_normalize_preserves_direction() {
        let q = normalize(Quaternion::new(2.0, 0.0, 0.0, 0.0)).expect("normalize");

        assert_eq!(q, Quaternion::new(1.0, 0.0, 0.0, 0.0));
        assert!((q.magnitude() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rounding_to_three_decimals() {
        // 30 degrees about x: w = cos(15deg), x = sin(15deg)
        let angle = 30.0_f64.to_radians();
        let q = Quaternion::new((angle / 2.0).cos(), (angle / 2.0).sin(), 0.0, 0.0);

        let angles = to_euler(q).expect("convert");
        assert_eq!(angles.yaw, 30.0);
        assert_eq!(angles.pitch, 0.0);
        assert_eq!(angles.roll, 0.0);
    }
}
