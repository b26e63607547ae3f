use std::sync::Arc;

use sra_domain::{
    AllowanceState, ApproveData, Dex, PendingApprovalState, RevokePolicy, Token, TradeState,
};
use tracing::{debug, info};

use crate::engine::{evaluate, ReadinessInput};
use crate::publish::{SwapPublisher, SwapSubscription};
use crate::sources::{AllowanceSource, BalanceLookup, PendingApprovalSource, TradeQuoteSource};

/// Upstream collaborators the aggregator commands or queries.
#[derive(Clone)]
pub struct SwapSources {
    pub allowance: Arc<dyn AllowanceSource>,
    pub pending_approval: Arc<dyn PendingApprovalSource>,
    pub balances: Arc<dyn BalanceLookup>,
}

/// The swap readiness aggregator for one swap screen session.
///
/// Not thread-safe by itself: every handler must run on one serialized
/// queue (see [`crate::SwapRuntime`]). Each handler records the new upstream
/// snapshot and, where it affects readiness, recomputes from scratch.
pub struct SwapService {
    dex: Dex,
    policy: RevokePolicy,
    sources: SwapSources,

    trade: TradeState,
    allowance: Option<AllowanceState>,
    pending_approval: PendingApprovalState,
    token_in: Option<Token>,
    token_out: Option<Token>,
    amount_in_micros: i64,
    balance_in: Option<i64>,
    balance_out: Option<i64>,

    publisher: Arc<SwapPublisher>,
}

impl SwapService {
    /// Bind a new session to its collaborators.
    ///
    /// The trade source is read once to seed the trade state, tokens and input
    /// amount. Seeding the input token forwards it to the allowance and
    /// pending-approval sources.
    pub fn new(
        dex: Dex,
        policy: RevokePolicy,
        trade_source: &dyn TradeQuoteSource,
        sources: SwapSources,
    ) -> Self {
        let mut svc = Self {
            dex,
            policy,
            sources,
            trade: trade_source.state(),
            allowance: None,
            pending_approval: PendingApprovalState::Idle,
            token_in: None,
            token_out: None,
            amount_in_micros: trade_source.amount_in_micros(),
            balance_in: None,
            balance_out: None,
            publisher: Arc::new(SwapPublisher::new()),
        };

        svc.on_token_in_changed(trade_source.token_in());
        svc.on_token_out_changed(trade_source.token_out());
        svc
    }

    pub fn dex(&self) -> Dex {
        self.dex
    }

    pub fn publisher(&self) -> Arc<SwapPublisher> {
        Arc::clone(&self.publisher)
    }

    pub fn subscribe(&self) -> SwapSubscription {
        self.publisher.subscribe()
    }

    pub fn balance_in(&self) -> Option<i64> {
        self.balance_in
    }

    pub fn balance_out(&self) -> Option<i64> {
        self.balance_out
    }

    pub fn amount_in_micros(&self) -> i64 {
        self.amount_in_micros
    }

    pub fn token_in(&self) -> Option<&Token> {
        self.token_in.as_ref()
    }

    // -----------------------------------------------------------------------
    // Upstream handlers
    // -----------------------------------------------------------------------

    pub fn on_trade_state_changed(&mut self, state: TradeState) {
        self.trade = state;
        self.recompute();
    }

    /// Refetch the input balance and forward the token to the allowance and
    /// pending-approval sources. Recomputes only if the balance changed; the
    /// sources report their refetched states on their own streams.
    pub fn on_token_in_changed(&mut self, token: Option<Token>) {
        let balance = token
            .as_ref()
            .and_then(|t| self.sources.balances.available_balance(t));
        let balance_changed = balance != self.balance_in;

        self.balance_in = balance;
        self.publisher.publish_balance_in(balance);

        if token.is_none() {
            self.allowance = None;
        }
        self.sources.allowance.set_token(token.as_ref());
        self.sources.pending_approval.set_token(token.as_ref());
        self.token_in = token;

        if balance_changed {
            self.recompute();
        }
    }

    /// Output balance is informational; it never affects readiness.
    pub fn on_token_out_changed(&mut self, token: Option<Token>) {
        let balance = token
            .as_ref()
            .and_then(|t| self.sources.balances.available_balance(t));
        self.balance_out = balance;
        self.token_out = token;
        self.publisher.publish_balance_out(balance);
    }

    pub fn on_amount_in_changed(&mut self, amount_in_micros: i64) {
        self.amount_in_micros = amount_in_micros;
        self.recompute();
    }

    pub fn on_allowance_state_changed(&mut self, state: AllowanceState) {
        self.allowance = Some(state);
        self.recompute();
    }

    pub fn on_pending_approval_changed(&mut self, state: PendingApprovalState) {
        self.pending_approval = state;
        self.recompute();
    }

    // -----------------------------------------------------------------------
    // Recompute + publish
    // -----------------------------------------------------------------------

    fn recompute(&mut self) {
        let input = ReadinessInput {
            trade: &self.trade,
            allowance: self.allowance.as_ref(),
            pending_approval: self.pending_approval,
            amount_in_micros: self.amount_in_micros,
            balance_in_micros: self.balance_in,
            must_revoke: self.policy.must_be_revoked(self.token_in.as_ref()),
        };
        let evaluation = evaluate(&input);
        let verdict = evaluation.verdict();

        debug!(
            loading = evaluation.loading,
            errors = evaluation.errors.len(),
            verdict = verdict.label(),
            "swap readiness recomputed"
        );

        // Errors stay frozen at their last published value while loading.
        if !evaluation.loading {
            self.publisher.publish_errors(evaluation.errors);
        }

        if self.publisher.publish_state(verdict.clone()) {
            info!(state = verdict.label(), "swap state changed");
        }
    }

    // -----------------------------------------------------------------------
    // Approval
    // -----------------------------------------------------------------------

    /// Approval instructions for `amount_micros`, or for the whole known input
    /// balance when no amount is given.
    pub fn approve_data(&self, amount_micros: Option<i64>) -> Option<ApproveData> {
        let amount = amount_micros.or(self.balance_in)?;
        self.sources.allowance.approve_data(&self.dex, amount)
    }
}
