//! sra-engine
//!
//! Swap Readiness Aggregator.
//!
//! Consolidates four independently updating upstream signals (trade quote,
//! allowance, pending approval, balance lookup) into one swap readiness
//! verdict plus the list of outstanding errors.
//!
//! - `engine`: pure evaluation of one snapshot. No IO, no async.
//! - `service`: the stateful aggregator. Records upstream snapshots, runs the
//!   evaluation on every trigger and publishes through last-value-cached
//!   channels.
//! - `runtime`: the serialized queue. One worker task owns the service; every
//!   producer hands off through it.

mod engine;
mod publish;
mod runtime;
mod service;
mod sources;

pub use engine::{check_allowance, evaluate, Evaluation, ReadinessInput};
pub use publish::{SwapPublisher, SwapSubscription};
pub use runtime::{RuntimeError, SwapEvent, SwapHandle, SwapRuntime};
pub use service::{SwapService, SwapSources};
pub use sources::{AllowanceSource, BalanceLookup, PendingApprovalSource, TradeQuoteSource};
