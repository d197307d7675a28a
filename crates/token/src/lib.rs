//! Knowledge Token
//!
//! The reward issuer consumed by the registry: a mintable balance service
//! with an owner-managed set of authorized minters. Transfers, allowances
//! and burning are intentionally absent.

pub mod issuer;
pub mod token;

pub use issuer::{MockRewardIssuer, RewardIssuer};
pub use token::{KnowledgeToken, TokenSnapshot};

use ikf_types::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("{minter} is not an authorized minter")]
    NotMinter { minter: Address },

    #[error("{caller} is not the token owner")]
    NotOwner { caller: Address },

    #[error("cannot mint to the null identity")]
    ZeroRecipient,

    #[error("null identity cannot be a minter")]
    ZeroMinter,

    #[error("mint of {amount} would overflow total supply")]
    SupplyOverflow { amount: u128 },

    #[error("invalid token snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("issuer unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, TokenError>;
