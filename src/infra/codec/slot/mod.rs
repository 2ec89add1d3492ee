//! Fixed-point scaling ("SLOT": scaling, limit, offset, transfer function) of
//! the Kepler payload fields.
//!
//! | Field              | Width  | Resolution    | Offset   |
//! |--------------------|--------|---------------|----------|
//! | Eccentricity       | 16 bit | 0.0015625 / bit | 0      |
//! | Mean / eccentric anomaly | 32 bit | 1e-6 deg / bit | −210 deg |
//!
//! The conversions are lossy: a round trip is exact only up to one
//! resolution step.
use core::f64::consts::PI;

/// Eccentricity scale (unitless per bit).
pub const ECCENTRICITY_RESOLUTION: f64 = 0.0015625;
/// Largest eccentricity handed to the solver; `e = 1` makes `f'(π)` vanish.
pub const MAX_ECCENTRICITY: f64 = 0.9999999;
/// Angle scale in degrees per bit.
pub const ANGLE_RESOLUTION: f64 = 0.000_001;
/// Angle offset in degrees (raw 0 encodes −210°).
pub const ANGLE_OFFSET_DEG: f64 = -210.0;

//==================================================================================ECCENTRICITY
/// Raw 16-bit field → eccentricity, clamped below 1.
pub fn eccentricity_from_raw(raw: u16) -> f64 {
    let eccentricity = raw as f64 * ECCENTRICITY_RESOLUTION;
    if eccentricity >= 1.0 {
        MAX_ECCENTRICITY
    } else {
        eccentricity
    }
}

/// Eccentricity → raw 16-bit field.
///
/// Input is clamped to `[0, MAX_ECCENTRICITY]` and truncated, so the encoded
/// value never represents an eccentricity ≥ 1.
pub fn eccentricity_to_raw(eccentricity: f64) -> u16 {
    if !eccentricity.is_finite() || eccentricity <= 0.0 {
        return 0;
    }
    let clamped = eccentricity.min(MAX_ECCENTRICITY);
    libm::trunc(clamped / ECCENTRICITY_RESOLUTION) as u16
}

//==================================================================================ANGLES
/// Raw 32-bit field → degrees (not normalized).
pub fn angle_deg_from_raw(raw: u32) -> f64 {
    raw as f64 * ANGLE_RESOLUTION + ANGLE_OFFSET_DEG
}

/// Degrees → raw 32-bit field, rounded to the nearest step.
///
/// Values outside the representable range saturate; non-finite input maps to 0.
pub fn angle_deg_to_raw(degrees: f64) -> u32 {
    if !degrees.is_finite() {
        return 0;
    }
    let steps = libm::round((degrees - ANGLE_OFFSET_DEG) / ANGLE_RESOLUTION);
    // `as` saturates at the u32 bounds.
    steps as u32
}

/// Fold an angle into `[0, 360)`.
///
/// Equivalent to repeated ±360° adjustment, but bounded for any finite input.
pub fn normalize_deg_positive(degrees: f64) -> f64 {
    let mut folded = libm::fmod(degrees, 360.0);
    if folded < 0.0 {
        folded += 360.0;
    }
    // -1e-20 + 360 rounds up to 360.
    if folded >= 360.0 {
        folded -= 360.0;
    }
    folded
}

/// Fold an angle into `(−180, 180]`.
pub fn normalize_deg_signed(degrees: f64) -> f64 {
    let folded = libm::fmod(degrees, 360.0);
    if folded > 180.0 {
        folded - 360.0
    } else if folded <= -180.0 {
        folded + 360.0
    } else {
        folded
    }
}

#[inline]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[inline]
pub fn rad_to_deg(radians: f64) -> f64 {
    radians * 180.0 / PI
}

//==================================================================================KEPLER_FIELDS
/// Raw mean-anomaly field → degrees in `[0, 360)`.
pub fn mean_anomaly_deg_from_raw(raw: u32) -> f64 {
    normalize_deg_positive(angle_deg_from_raw(raw))
}

/// Eccentric anomaly in radians → raw field, folded into `(−180, 180]` first.
pub fn eccentric_anomaly_to_raw(radians: f64) -> u32 {
    angle_deg_to_raw(normalize_deg_signed(rad_to_deg(radians)))
}
