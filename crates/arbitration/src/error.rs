use {
    alloy::primitives::U256,
    model::{TokenId, TransferError},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("cannot wrap an asset that is itself arbitrable")]
    CannotNestArbitrable,
    #[error("the arbitrator resigned")]
    ArbitratorResigned,
    #[error("caller is not authorized")]
    NotAuthorized,
    #[error("insufficient balance: {available} < {required}")]
    InsufficientBalance { available: U256, required: U256 },
    #[error("insufficient allowance: {available} < {required}")]
    InsufficientAllowance { available: U256, required: U256 },
    #[error("token {0} is not wrapped")]
    UnknownToken(TokenId),
    #[error("underlying transfer failed")]
    UnderlyingTransferFailed(#[source] TransferError),
    #[error("arithmetic overflow")]
    Overflow,
}

impl From<Error> for TransferError {
    fn from(err: Error) -> Self {
        match err {
            Error::InsufficientBalance {
                available,
                required,
            } => Self::InsufficientBalance {
                available,
                required,
            },
            Error::InsufficientAllowance {
                available,
                required,
            } => Self::InsufficientAllowance {
                available,
                required,
            },
            Error::UnknownToken(id) => Self::UnknownToken(id),
            Error::UnderlyingTransferFailed(inner) => inner,
            err => Self::Rejected(err.to_string()),
        }
    }
}
