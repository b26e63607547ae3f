//! sra-domain
//!
//! Shared vocabulary for the swap readiness workspace.
//!
//! - Tokens and token queries
//! - Upstream source states (trade quote, allowance, pending approval)
//! - Aggregated swap state and the swap error taxonomy
//! - Reset-to-zero allowance policy
//!
//! Plain data. No IO, no clock, no async.

mod error;
mod policy;
mod token;
mod types;

pub use error::{ErrorOrigin, SwapError, UpstreamError};
pub use policy::RevokePolicy;
pub use token::{BlockchainType, Token, TokenQuery, TokenType};
pub use types::*;

/// 1e-6 fixed-point scale used for every amount in the workspace.
pub const MICROS_SCALE: i64 = 1_000_000;
