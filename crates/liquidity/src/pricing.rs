//! Swap pricing.

use {
    crate::{Error, FeeFraction, Result},
    alloy::primitives::U256,
    number::U256Ext,
};

/// Which reserve a swap pays into.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Direction {
    /// Asset A in, asset B out.
    AToB,
    /// Asset B in, asset A out.
    BToA,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Self::AToB => Self::BToA,
            Self::BToA => Self::AToB,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::AToB),
            1 => Ok(Self::BToA),
            other => Err(Error::InvalidDirection(other)),
        }
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::AToB => 0,
            Direction::BToA => 1,
        }
    }
}

/// Pricing function of a pool.
///
/// No curve ever pays out more than the fee-less constant product curve
/// would, so `reserve_in * reserve_out` cannot decrease across a swap.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Curve {
    /// Uniswap-v2 like pricing:
    /// `out = reserve_out * in' / (reserve_in + in')` with
    /// `in' = floor(in * (D - fee) / D)`.
    #[default]
    ConstantProduct,
    /// Prices at the pre-swap spot price after deducting the (rounded down)
    /// fee from the input, capped by the fee-less constant product curve.
    SpotPrice,
    /// Prices at the pre-swap spot price the input discounted by the fee,
    /// `floor(in * (D - fee) / D)`, capped by the fee-less constant product
    /// curve. Pays `in * (1 - fee)` against balanced reserves.
    DiscountedSpot,
}

impl From<configs::Curve> for Curve {
    fn from(curve: configs::Curve) -> Self {
        match curve {
            configs::Curve::ConstantProduct => Self::ConstantProduct,
            configs::Curve::SpotPrice => Self::SpotPrice,
            configs::Curve::DiscountedSpot => Self::DiscountedSpot,
        }
    }
}

impl Curve {
    /// Output paid for `amount_in`, rounded down.
    pub fn amount_out(
        self,
        fee: FeeFraction,
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256> {
        if amount_in.is_zero() {
            return Err(Error::ZeroAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(Error::InsufficientLiquidity);
        }

        let amount_out = match self {
            Self::ConstantProduct => {
                let amount_in = fee.after_fee(amount_in).ok_or(Error::Overflow)?;
                constant_product(amount_in, reserve_in, reserve_out)?
            }
            Self::SpotPrice => {
                let fee = fee.fee_on(amount_in).ok_or(Error::Overflow)?;
                spot(amount_in - fee, reserve_in, reserve_out)?
                    .min(constant_product(amount_in, reserve_in, reserve_out)?)
            }
            Self::DiscountedSpot => {
                let discounted = fee.after_fee(amount_in).ok_or(Error::Overflow)?;
                spot(discounted, reserve_in, reserve_out)?
                    .min(constant_product(amount_in, reserve_in, reserve_out)?)
            }
        };

        if amount_out.is_zero() {
            return Err(Error::ZeroOutput);
        }
        Ok(amount_out)
    }
}

fn spot(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    amount_in
        .checked_mul_div(&reserve_out, &reserve_in)
        .ok_or(Error::Overflow)
}

fn constant_product(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    let denominator = reserve_in.checked_add(amount_in).ok_or(Error::Overflow)?;
    reserve_out
        .checked_mul_div(&amount_in, &denominator)
        .ok_or(Error::Overflow)
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn fee(fraction: f64) -> FeeFraction {
        FeeFraction::from_fraction(fraction).unwrap()
    }

    fn out(curve: Curve, fee: FeeFraction, amount_in: u64, reserves: (u64, u64)) -> Result<U256> {
        curve.amount_out(
            fee,
            U256::from(amount_in),
            U256::from(reserves.0),
            U256::from(reserves.1),
        )
    }

    #[test]
    fn direction_from_u8() {
        assert_eq!(Direction::try_from(0), Ok(Direction::AToB));
        assert_eq!(Direction::try_from(1), Ok(Direction::BToA));
        assert_eq!(Direction::try_from(2), Err(Error::InvalidDirection(2)));
        assert_eq!(u8::from(Direction::BToA.reverse()), 0);
        assert_eq!(Direction::AToB.to_string(), "a-to-b");
    }

    #[test]
    fn spot_price_scenario() {
        // 1000 in against 100000/100000 at 2% pays the fee adjusted spot
        // price.
        assert_eq!(
            out(Curve::SpotPrice, fee(0.02), 1000, (100_000, 100_000)),
            Ok(U256::from(981))
        );
    }

    #[test]
    fn constant_product_formula() {
        // in' = floor(1000 * (D - floor(D * 0.02)) / D) = 980
        // out = floor(100000 * 980 / 100980) = 970
        assert_eq!(
            out(Curve::ConstantProduct, fee(0.02), 1000, (100_000, 100_000)),
            Ok(U256::from(970))
        );
        assert_eq!(
            out(Curve::ConstantProduct, fee(0.01), 1000, (1_000_000, 1_000_000)),
            Ok(U256::from(989))
        );
    }

    #[test]
    fn discounted_spot_pays_input_less_fee() {
        // floor(1000 * (D - floor(D * 0.01)) / D) = 990 at a 1:1 spot price.
        assert_eq!(
            out(Curve::DiscountedSpot, fee(0.01), 1000, (1_000_000, 1_000_000)),
            Ok(U256::from(990))
        );
        // The spot price curve rounds the fee rather than the discounted
        // input down.
        assert_eq!(
            out(Curve::SpotPrice, fee(0.01), 1000, (1_000_000, 1_000_000)),
            Ok(U256::from(991))
        );
        assert_eq!(
            out(Curve::DiscountedSpot, fee(0.02), 1000, (100_000, 100_000)),
            Ok(U256::from(980))
        );
        assert_eq!(
            out(Curve::DiscountedSpot, fee(0.02), 1000, (1000, 1000)),
            Ok(U256::from(500))
        );
    }

    #[test]
    fn spot_price_is_capped_by_the_curve() {
        // Spot would pay 981 of the 1000 in reserve, the curve only 500.
        assert_eq!(
            out(Curve::SpotPrice, fee(0.02), 1000, (1000, 1000)),
            Ok(U256::from(500))
        );
    }

    #[rstest]
    fn rejects_degenerate_swaps(
        #[values(Curve::ConstantProduct, Curve::SpotPrice, Curve::DiscountedSpot)] curve: Curve,
    ) {
        assert_eq!(out(curve, fee(0.01), 0, (10, 10)), Err(Error::ZeroAmount));
        assert_eq!(
            out(curve, fee(0.01), 10, (0, 10)),
            Err(Error::InsufficientLiquidity)
        );
        assert_eq!(out(curve, fee(0.01), 1, (1000, 10)), Err(Error::ZeroOutput));
        assert_eq!(out(curve, FeeFraction::MAX, 1000, (10, 10)), Err(Error::ZeroOutput));
        assert_eq!(
            curve.amount_out(FeeFraction::ZERO, U256::MAX, U256::MAX, U256::from(10)),
            Err(Error::Overflow)
        );
    }

    #[rstest]
    fn product_never_decreases(
        #[values(Curve::ConstantProduct, Curve::SpotPrice, Curve::DiscountedSpot)] curve: Curve,
        #[values(0, 1, 85_899_345, 0x7FFF_FFFF, 0xFFFF_FFFE)] numerator: u32,
        #[values(1, 999, 100_000, 5_000_000)] amount_in: u64,
        #[values((100_000, 100_000), (7, 1_000_000_007), (123_456_789, 42))] reserves: (u64, u64),
    ) {
        let (reserve_in, reserve_out) = (U256::from(reserves.0), U256::from(reserves.1));
        let amount_in = U256::from(amount_in);
        match curve.amount_out(FeeFraction::new(numerator), amount_in, reserve_in, reserve_out) {
            Ok(amount_out) => {
                assert!(amount_out < reserve_out);
                assert!(
                    (reserve_in + amount_in) * (reserve_out - amount_out)
                        >= reserve_in * reserve_out
                );
            }
            Err(err) => assert_eq!(err, Error::ZeroOutput),
        }
    }
}
