//! Shared types for the industry knowledge folder.
//!
//! Identities, content fingerprints, lifecycle status codes and token
//! amounts used by the registry, the reward token and the CLI.

pub mod address;
pub mod content;
pub mod status;

pub use address::*;
pub use content::*;
pub use status::*;

use std::time::{SystemTime, UNIX_EPOCH};

/// Token amounts are fixed-point integers in atomic units.
pub type TokenAmount = u128;

/// Number of decimal places carried by the reward token.
pub const TOKEN_DECIMALS: u32 = 18;

/// Atomic units per whole token.
pub const ATOMIC_PER_TOKEN: TokenAmount = 10u128.pow(TOKEN_DECIMALS);

/// Convert a whole-token count into atomic units, saturating on overflow.
pub fn whole_tokens(tokens: u64) -> TokenAmount {
    (tokens as TokenAmount).saturating_mul(ATOMIC_PER_TOKEN)
}

/// Current UNIX time in seconds. A clock set before the epoch reads as 0.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_tokens_scales_by_decimals() {
        assert_eq!(whole_tokens(0), 0);
        assert_eq!(whole_tokens(10), 10_000_000_000_000_000_000);
    }

    #[test]
    fn now_secs_is_after_2020() {
        assert!(now_secs() > 1_577_836_800);
    }
}
