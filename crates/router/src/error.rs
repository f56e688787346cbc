use {alloy::primitives::U256, model::TransferError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("pool does not trade the underlying assets of the wrappers")]
    PoolMismatch,
    #[error("authority does not guard the input asset")]
    AuthorityMismatch,
    #[error("caller may not swap on behalf of the account")]
    NotAuthorized,
    #[error("price feed has no usable price")]
    InvalidPrice,
    #[error("output {amount_out} outside of [{min_amount_out}, {max_amount_out}]")]
    PriceOutOfBounds {
        amount_out: U256,
        min_amount_out: U256,
        max_amount_out: U256,
    },
    #[error(transparent)]
    Arbitration(#[from] arbitration::Error),
    #[error(transparent)]
    Liquidity(#[from] liquidity::Error),
    #[error("underlying transfer failed")]
    UnderlyingTransferFailed(#[source] TransferError),
    #[error("arithmetic overflow")]
    Overflow,
}
