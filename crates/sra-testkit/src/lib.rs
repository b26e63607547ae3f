//! sra-testkit
//!
//! In-memory fakes for every upstream collaborator of the aggregator, plus
//! token and quote fixtures. Test-only: never depend on this from a
//! production crate.

mod fakes;
mod fixtures;

pub use fakes::{FakeTradeSource, RecordingAllowanceSource, RecordingPendingSource, StaticBalances};
pub use fixtures::*;

use std::sync::Arc;

use sra_domain::RevokePolicy;
use sra_engine::{SwapService, SwapSources};

/// Aggregator wired to fakes, with the fakes kept reachable for assertions.
pub struct Harness {
    pub service: SwapService,
    pub allowance: Arc<RecordingAllowanceSource>,
    pub pending: Arc<RecordingPendingSource>,
    pub balances: Arc<StaticBalances>,
}

impl Harness {
    /// Build with the default revoke policy (USDT).
    pub fn new(trade: FakeTradeSource, balances: StaticBalances) -> Self {
        Self::with_policy(trade, balances, RevokePolicy::default())
    }

    pub fn with_policy(
        trade: FakeTradeSource,
        balances: StaticBalances,
        policy: RevokePolicy,
    ) -> Self {
        let allowance = Arc::new(RecordingAllowanceSource::new(SPENDER));
        let pending = Arc::new(RecordingPendingSource::default());
        let balances = Arc::new(balances);

        let sources = SwapSources {
            allowance: allowance.clone(),
            pending_approval: pending.clone(),
            balances: balances.clone(),
        };
        let service = SwapService::new(dex(), policy, &trade, sources);

        Self {
            service,
            allowance,
            pending,
            balances,
        }
    }
}
