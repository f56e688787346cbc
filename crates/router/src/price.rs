//! Oracle derived price bounds.

use {
    crate::{Error, Result},
    alloy::primitives::U256,
    model::PriceFeed,
    number::U256Ext,
};

/// One side of a swap as seen by the oracle: the feed pricing the asset and
/// the decimals of the asset itself.
#[derive(Clone, Copy)]
pub struct Priced<'a> {
    pub feed: &'a dyn PriceFeed,
    pub token_decimals: u8,
}

impl Priced<'_> {
    fn price(&self) -> Result<U256> {
        let answer = self.feed.latest_answer().map_err(|err| {
            tracing::warn!(?err, "price feed unavailable");
            Error::InvalidPrice
        })?;
        if !answer.is_positive() {
            tracing::warn!(%answer, "price feed returned a non-positive answer");
            return Err(Error::InvalidPrice);
        }
        Ok(answer.into_raw())
    }

    fn exponent(&self) -> u32 {
        u32::from(self.feed.decimals()) + u32::from(self.token_decimals)
    }
}

/// Output the oracles imply for `amount_in`:
///
/// ```text
/// amount_in * price_in * 10^(feed_out + token_out)
/// ------------------------------------------------
/// price_out * 10^(feed_in + token_in)
/// ```
pub fn expected_out(input: Priced, output: Priced, amount_in: U256) -> Result<U256> {
    let (price_in, price_out) = (input.price()?, output.price()?);
    let (exp_in, exp_out) = (input.exponent(), output.exponent());
    let ten = U256::from(10);
    let numerator = price_in
        .checked_mul(
            ten.checked_pow(U256::from(exp_out.saturating_sub(exp_in)))
                .ok_or(Error::Overflow)?,
        )
        .ok_or(Error::Overflow)?;
    let denominator = price_out
        .checked_mul(
            ten.checked_pow(U256::from(exp_in.saturating_sub(exp_out)))
                .ok_or(Error::Overflow)?,
        )
        .ok_or(Error::Overflow)?;
    amount_in
        .checked_mul_div(&numerator, &denominator)
        .ok_or(Error::Overflow)
}

/// Range a realized output has to fall into, both ends inclusive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Bounds {
    pub min_amount_out: U256,
    pub max_amount_out: U256,
}

impl Bounds {
    /// `[expected * min_percent / 100, expected * max_percent / 100]`,
    /// rounded down.
    pub fn from_percent(expected: U256, min_percent: u32, max_percent: u32) -> Result<Self> {
        let percent = |value: u32| {
            expected
                .checked_mul_div(&U256::from(value), &U256::from(100))
                .ok_or(Error::Overflow)
        };
        Ok(Self {
            min_amount_out: percent(min_percent)?,
            max_amount_out: percent(max_percent)?,
        })
    }

    pub fn check(&self, amount_out: U256) -> Result<()> {
        if amount_out < self.min_amount_out || amount_out > self.max_amount_out {
            return Err(Error::PriceOutOfBounds {
                amount_out,
                min_amount_out: self.min_amount_out,
                max_amount_out: self.max_amount_out,
            });
        }
        Ok(())
    }
}
