
//! Simple math utilities.

use std::convert::TryFrom;
use crate::error::{Error, Result};

/// Simple two-dimensional vector of any numerical type.
/// Supports only few mathematical operations
/// as this is used mainly as data struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Vec2<T> (pub T, pub T);

impl<T> Vec2<T> {

    /// The first component of this size.
    pub fn width(self) -> T { self.0 }

    /// The second component of this size.
    pub fn height(self) -> T { self.1 }
}

impl Vec2<u32> {

    /// Convert to `Vec2<usize>`, returning an error where the platform cannot hold the values.
    pub fn to_usize(self, error_message: &'static str) -> Result<Vec2<usize>> {
        let x = usize::try_from(self.0).map_err(|_| Error::out_of_range(error_message, self.0))?;
        let y = usize::try_from(self.1).map_err(|_| Error::out_of_range(error_message, self.1))?;
        Ok(Vec2(x, y))
    }
}

impl<T> From<(T, T)> for Vec2<T> {
    fn from((x, y): (T, T)) -> Self { Vec2(x, y) }
}

impl<T> From<Vec2<T>> for (T, T) {
    fn from(vec2: Vec2<T>) -> Self { (vec2.0, vec2.1) }
}


/// Integer division that rounds up, for example to count the bytes of packed bits.
#[inline]
pub(crate) fn divide_rounding_up(dividend: usize, divisor: usize) -> usize {
    dividend / divisor + usize::from(dividend % divisor != 0)
}


/// Linearly map `value` from the range `0 ..= from_max` to the range `0 ..= to_max`,
/// rounding to the nearest integer. Does not overflow for any 16-bit input.
/// A `from_max` of zero maps everything to zero.
#[inline]
pub(crate) fn rescale(value: u32, from_max: u32, to_max: u32) -> u32 {
    if from_max == to_max { return value; }
    if from_max == 0 { return 0; }

    let numerator = u64::from(value) * u64::from(to_max) + u64::from(from_max / 2);
    let scaled = numerator / u64::from(from_max);

    // only exceeds u32 if value was larger than from_max by a huge factor
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
