use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which upstream collaborator produced an [`UpstreamError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorOrigin {
    TradeQuote,
    Allowance,
}

/// Opaque error passed through from an upstream source without reinterpretation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamError {
    pub origin: ErrorOrigin,
    /// Stable machine-readable code supplied by the upstream source.
    pub code: String,
    pub message: String,
}

impl UpstreamError {
    pub fn new(origin: ErrorOrigin, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            origin,
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match self.origin {
            ErrorOrigin::TradeQuote => "trade quote",
            ErrorOrigin::Allowance => "allowance",
        };
        write!(f, "{}: {} ({origin})", self.code, self.message)
    }
}

/// Swap error taxonomy.
///
/// These are data, not control flow: they are collected into the published
/// error list and never returned through `Err`.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwapError {
    /// Input amount exceeds the known available balance.
    #[error("insufficient balance of the input token")]
    InsufficientBalanceIn,

    /// Available balance of the input token could not be determined.
    #[error("balance of the input token is unknown")]
    NoBalanceIn,

    /// Spender's approved amount is below the input amount.
    #[error("insufficient allowance")]
    InsufficientAllowance,

    /// Token rejects raising a non-zero allowance; it must be reset to zero first.
    #[error("allowance of {allowance_micros} micros must be revoked before approving")]
    NeedRevokeAllowance { allowance_micros: i64 },

    #[error("{0}")]
    Upstream(UpstreamError),
}

impl SwapError {
    pub fn upstream(origin: ErrorOrigin, code: impl Into<String>, message: impl Into<String>) -> Self {
        SwapError::Upstream(UpstreamError::new(origin, code, message))
    }

    /// Stable code for logs and replay output.
    pub fn code(&self) -> &str {
        match self {
            SwapError::InsufficientBalanceIn => "INSUFFICIENT_BALANCE_IN",
            SwapError::NoBalanceIn => "NO_BALANCE_IN",
            SwapError::InsufficientAllowance => "INSUFFICIENT_ALLOWANCE",
            SwapError::NeedRevokeAllowance { .. } => "NEED_REVOKE_ALLOWANCE",
            SwapError::Upstream(e) => &e.code,
        }
    }
}
