use {alloy::primitives::U256, model::TransferError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("pool assets must be distinct")]
    IdenticalTokens,
    #[error("fee {0} is not a fraction in [0, 1]")]
    InvalidFee(f64),
    #[error("swap direction {0} is neither 0 nor 1")]
    InvalidDirection(u8),
    #[error("amount must not be zero")]
    ZeroAmount,
    #[error("deposit too small to mint any shares")]
    ZeroShares,
    #[error("pool has no liquidity on one side")]
    InsufficientLiquidity,
    #[error("swap would pay out nothing")]
    ZeroOutput,
    #[error("insufficient shares: {available} < {required}")]
    InsufficientShares { available: U256, required: U256 },
    #[error("slippage exceeded: {amount_out} < {min_amount_out}")]
    SlippageExceeded {
        amount_out: U256,
        min_amount_out: U256,
    },
    #[error("nothing to claim")]
    NothingToClaim,
    #[error("underlying transfer failed")]
    UnderlyingTransferFailed(#[source] TransferError),
    #[error("arithmetic overflow")]
    Overflow,
}
