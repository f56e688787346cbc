use {alloy::primitives::U256, number::U256Ext};

/// Denominator of every [`FeeFraction`].
pub const FEE_DENOMINATOR: u32 = 0xFFFF_FFFF;

/// Swap fee expressed as `numerator / 0xFFFFFFFF`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FeeFraction(u32);

impl FeeFraction {
    pub const ZERO: Self = Self(0);
    /// The whole input is kept as fee.
    pub const MAX: Self = Self(FEE_DENOMINATOR);

    pub const fn new(numerator: u32) -> Self {
        Self(numerator)
    }

    /// `floor(0xFFFFFFFF * fraction)`, or `None` if `fraction` is not in
    /// `[0, 1]`.
    pub fn from_fraction(fraction: f64) -> Option<Self> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let numerator = (f64::from(FEE_DENOMINATOR) * fraction).floor() as u32;
        Some(Self(numerator))
    }

    pub fn numerator(self) -> u32 {
        self.0
    }

    /// Fee owed on `amount`, rounded down.
    pub fn fee_on(self, amount: U256) -> Option<U256> {
        amount.checked_mul_div(&U256::from(self.0), &U256::from(FEE_DENOMINATOR))
    }

    /// `amount` with the fee deducted, rounded down.
    pub fn after_fee(self, amount: U256) -> Option<U256> {
        amount.checked_mul_div(
            &U256::from(FEE_DENOMINATOR - self.0),
            &U256::from(FEE_DENOMINATOR),
        )
    }
}
