//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in radians into the range [0, 2pi).
///
/// Values within `eps` of 2pi are snapped to zero, so that a sweep which
/// should be zero but has picked up round-off doesn't become a full turn.
pub fn wrap_2pi<T>(value: T, eps: T) -> T
where
    T: Float,
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap_or_else(T::zero);

    let wrapped = rem_euclid(value, tau_t);

    if wrapped >= tau_t - eps {
        T::zero()
    }
    else {
        wrapped
    }
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_360<T>(value: T) -> T
where
    T: Float,
{
    let full_t: T = T::from(360.0).unwrap_or_else(T::zero);

    let wrapped = rem_euclid(value, full_t);

    // Round-off can produce exactly 360
    if wrapped >= full_t { T::zero() } else { wrapped }
}

/// Clamp a value into the range `[min, max]`, with either bound optional.
pub fn clamp_opt<T>(value: T, min: Option<T>, max: Option<T>) -> T
where
    T: Float,
{
    let mut ret = value;

    if let Some(max) = max {
        if ret > max {
            ret = max
        }
    }
    if let Some(min) = min {
        if ret < min {
            ret = min
        }
    }

    ret
}

/// Return the sign of the value as -1, 0 or 1, with zero for exactly zero.
pub fn sign<T>(value: T) -> T
where
    T: Float,
{
    if value > T::zero() {
        T::one()
    }
    else if value < T::zero() {
        -T::one()
    }
    else {
        T::zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap() {
        const TAU: f64 = std::f64::consts::TAU;

        assert_eq!(wrap_2pi(1f64, 1e-9), 1f64);
        assert_eq!(wrap_2pi(-1f64, 1e-9), TAU - 1f64);
        assert_eq!(wrap_2pi(TAU, 1e-9), 0f64);
        assert_eq!(wrap_2pi(-1e-15, 1e-9), 0f64);

        assert_eq!(wrap_360(370f64), 10f64);
        assert_eq!(wrap_360(-90f64), 270f64);
        assert_eq!(wrap_360(360f64), 0f64);
    }

    #[test]
    fn test_clamp_opt() {
        assert_eq!(clamp_opt(5f64, Some(10f64), None), 10f64);
        assert_eq!(clamp_opt(50f64, Some(10f64), None), 50f64);
        assert_eq!(clamp_opt(50f64, Some(10f64), Some(20f64)), 20f64);
        assert_eq!(clamp_opt(-1f64, None, None), -1f64);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(3f64), 1f64);
        assert_eq!(sign(-0.1f64), -1f64);
        assert_eq!(sign(0f64), 0f64);
    }
}
