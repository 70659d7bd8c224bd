//! Error types for configuration, wallet and swap collaborators.

use thiserror::Error;

use crate::entities::Token;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown token `{0}` (expected USDC, MON or WETH)")]
pub struct UnknownToken(pub String);

/// Errors raised while loading or validating a `GameConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A numeric constant is out of its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors from the wallet connection itself.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("wallet is already connected")]
    AlreadyConnected,
}

/// Errors returned by `Wallet::submit_swap`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("no {0} balance to swap")]
    InsufficientBalance(Token),

    #[error("cannot swap {0} into itself")]
    SameToken(Token),

    #[error("swap rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_error_display() {
        let err = SwapError::InsufficientBalance(Token::Weth);
        assert_eq!(err.to_string(), "no WETH balance to swap");
        assert!(SwapError::Rejected("slippage".into())
            .to_string()
            .contains("slippage"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid {
            field: "drag",
            reason: "must be in (0, 1]".into(),
        };
        assert!(err.to_string().contains("`drag`"));
    }
}
