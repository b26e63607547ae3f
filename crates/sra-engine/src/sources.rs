//! Upstream collaborator seams.
//!
//! Implementations may be backed by network clients, caches or fakes. Every
//! method here is called from the runtime's worker task and must return
//! quickly.

use sra_domain::{ApproveData, Dex, Token, TradeState};

/// Trade quote source. Its state changes reach the aggregator as events; the
/// trait is only read once, to seed the session.
pub trait TradeQuoteSource: Send + Sync {
    fn state(&self) -> TradeState;
    fn token_in(&self) -> Option<Token>;
    fn token_out(&self) -> Option<Token>;
    fn amount_in_micros(&self) -> i64;
}

/// Allowance of the current input token for the dex spender contract.
pub trait AllowanceSource: Send + Sync {
    /// Point the source at a new input token. The source refetches and emits
    /// its new state on its own stream.
    fn set_token(&self, token: Option<&Token>);

    fn approve_data(&self, dex: &Dex, amount_micros: i64) -> Option<ApproveData>;
}

/// In-flight approval transactions for the current input token.
pub trait PendingApprovalSource: Send + Sync {
    fn set_token(&self, token: Option<&Token>);
}

/// Fast in-memory query for the spendable balance of a token.
pub trait BalanceLookup: Send + Sync {
    /// Available balance in micros, or `None` when it cannot be determined.
    fn available_balance(&self, token: &Token) -> Option<i64>;
}
