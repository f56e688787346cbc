//! Extension trait for U256 arithmetic operations.

use alloy::primitives::U256;

/// Extension trait for U256 to add utility methods.
///
/// All operations are checked and return `None` on overflow or division by
/// zero, leaving it to the caller to turn that into a domain error.
pub trait U256Ext: Sized {
    /// Ceiling division: (self + other - 1) / other
    fn checked_ceil_div(&self, other: &Self) -> Option<Self>;

    /// `floor(self * mul / div)`.
    fn checked_mul_div(&self, mul: &Self, div: &Self) -> Option<Self>;

    /// `ceil(self * mul / div)`.
    fn checked_mul_div_ceil(&self, mul: &Self, div: &Self) -> Option<Self>;

    /// Integer square root, rounded down.
    fn isqrt(&self) -> Self;
}

impl U256Ext for U256 {
    fn checked_ceil_div(&self, other: &Self) -> Option<Self> {
        self.checked_add(other.checked_sub(U256::ONE)?)?
            .checked_div(*other)
    }

    fn checked_mul_div(&self, mul: &Self, div: &Self) -> Option<Self> {
        self.checked_mul(*mul)?.checked_div(*div)
    }

    fn checked_mul_div_ceil(&self, mul: &Self, div: &Self) -> Option<Self> {
        self.checked_mul(*mul)?.checked_ceil_div(div)
    }

    fn isqrt(&self) -> Self {
        if self.is_zero() {
            return U256::ZERO;
        }
        // Newton's method starting from ceil(n / 2), which cannot overflow.
        let mut x = *self;
        let mut y = (*self >> 1) + (*self & U256::ONE);
        while y < x {
            x = y;
            y = (x + *self / x) >> 1;
        }
        x
    }
}
