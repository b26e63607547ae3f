//! Scenario: error list is frozen, not cleared, while loading
//!
//! # Invariants under test
//!
//! 1. Entering a loading condition does not touch the published error list.
//! 2. Upstream changes during loading do not leak into the error list.
//! 3. Leaving loading replaces the error list with the full recomputed one.

use sra_domain::{AllowanceState, PendingApprovalState, SwapError, SwapState, TradeState};
use sra_testkit::*;

fn not_ready_session() -> Harness {
    let balances = StaticBalances::default().with(&usdc(), 100);
    let trade = FakeTradeSource::new(TradeState::Ready(quote(usdc(), eth(), 50)))
        .with_tokens(Some(usdc()), Some(eth()))
        .with_amount_in(50);
    let mut h = Harness::new(trade, balances);
    h.service
        .on_allowance_state_changed(AllowanceState::Ready { allowance_micros: 30 });
    h
}

#[test]
fn pending_approval_keeps_last_errors() {
    let mut h = not_ready_session();
    let mut sub = h.service.subscribe();
    assert_eq!(*sub.errors.borrow(), vec![SwapError::InsufficientAllowance]);

    h.service
        .on_pending_approval_changed(PendingApprovalState::Pending);

    assert_eq!(*sub.state.borrow_and_update(), SwapState::Loading);
    assert!(
        !sub.errors.has_changed().unwrap(),
        "errors must not be republished while loading"
    );
    assert_eq!(*sub.errors.borrow(), vec![SwapError::InsufficientAllowance]);
}

#[test]
fn upstream_changes_during_loading_do_not_reach_errors() {
    let mut h = not_ready_session();
    let mut sub = h.service.subscribe();

    h.service
        .on_pending_approval_changed(PendingApprovalState::Pending);
    // Approval landed: allowance now sufficient, but the approval is still pending.
    h.service
        .on_allowance_state_changed(AllowanceState::Ready { allowance_micros: 1_000 });
    h.service.on_trade_state_changed(TradeState::Loading);

    assert_eq!(*sub.state.borrow(), SwapState::Loading);
    assert!(!sub.errors.has_changed().unwrap());
    assert_eq!(*sub.errors.borrow(), vec![SwapError::InsufficientAllowance]);

    h.service
        .on_trade_state_changed(TradeState::Ready(quote(usdc(), eth(), 50)));
    assert_eq!(*sub.state.borrow(), SwapState::Loading, "still pending");
    assert!(!sub.errors.has_changed().unwrap());

    h.service
        .on_pending_approval_changed(PendingApprovalState::Idle);
    assert!(sub.errors.has_changed().unwrap());
    assert!(sub.errors.borrow_and_update().is_empty());
    assert_eq!(
        *sub.state.borrow(),
        SwapState::Ready(quote(usdc(), eth(), 50))
    );
}

#[test]
fn allowance_loading_freezes_errors_too() {
    let mut h = not_ready_session();
    let sub = h.service.subscribe();

    h.service.on_allowance_state_changed(AllowanceState::Loading);
    h.service.on_amount_in_changed(500);

    assert_eq!(*sub.state.borrow(), SwapState::Loading);
    assert_eq!(*sub.errors.borrow(), vec![SwapError::InsufficientAllowance]);

    h.service
        .on_allowance_state_changed(AllowanceState::Ready { allowance_micros: 30 });
    assert_eq!(*sub.errors.borrow(), vec![SwapError::InsufficientBalanceIn]);
    assert_eq!(*sub.state.borrow(), SwapState::NotReady);
}
