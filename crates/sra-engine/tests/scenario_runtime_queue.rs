//! Scenario: serialized runtime queue
//!
//! # Invariants under test
//!
//! 1. Events submitted from several producers are applied in order and the
//!    result is visible after `flush`.
//! 2. Forwarded upstream streams reach the aggregator through the queue.
//! 3. `approve_data` runs on the queue against the latest applied balance.
//! 4. Shutdown drops queued events and ends every forwarder; later submits
//!    fail with `Stopped` and later upstream values never arrive.

use std::time::Duration;

use sra_domain::{
    AllowanceState, ErrorOrigin, PendingApprovalState, SwapError, SwapState, TradeState,
};
use sra_engine::{RuntimeError, SwapEvent, SwapHandle, SwapRuntime};
use sra_testkit::*;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

fn runtime() -> SwapRuntime {
    let balances = StaticBalances::default().with(&usdc(), 100).with(&dai(), 5);
    let trade = FakeTradeSource::new(TradeState::Loading)
        .with_tokens(Some(usdc()), Some(eth()))
        .with_amount_in(50);
    let h = Harness::new(trade, balances);
    SwapRuntime::start(h.service)
}

async fn wait_for_state(handle: &SwapHandle, want: SwapState) {
    let mut rx = handle.subscribe().state;
    let reached = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == want))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false);
    assert!(reached, "timed out waiting for {want:?}");
}

#[tokio::test]
async fn events_apply_in_submission_order() {
    let rt = runtime();
    let handle = rt.handle();

    let producer = handle.clone();
    let t = tokio::spawn(async move {
        producer
            .submit(SwapEvent::AllowanceState(AllowanceState::Ready {
                allowance_micros: 1_000,
            }))
            .unwrap();
        producer
            .submit(SwapEvent::TradeState(TradeState::Ready(quote(usdc(), eth(), 50))))
            .unwrap();
    });
    t.await.unwrap();

    handle.flush().await.unwrap();
    assert_eq!(handle.state(), SwapState::Ready(quote(usdc(), eth(), 50)));

    // Last writer wins: amount then token change.
    handle.submit(SwapEvent::AmountIn(80)).unwrap();
    handle.submit(SwapEvent::TokenIn(Some(dai()))).unwrap();
    handle.flush().await.unwrap();

    assert_eq!(handle.balance_in(), Some(5));
    assert_eq!(handle.errors(), vec![SwapError::InsufficientBalanceIn]);
    assert_eq!(handle.state(), SwapState::NotReady);

    rt.shutdown().await;
}

#[tokio::test]
async fn forwarded_upstream_stream_reaches_aggregator() {
    let mut rt = runtime();
    let handle = rt.handle();

    let (pending_tx, pending_rx) = watch::channel(PendingApprovalState::Idle);
    rt.forward(
        WatchStream::from_changes(pending_rx),
        SwapEvent::PendingApproval,
    );

    handle
        .submit(SwapEvent::TradeState(TradeState::Ready(quote(usdc(), eth(), 50))))
        .unwrap();
    wait_for_state(&handle, SwapState::Ready(quote(usdc(), eth(), 50))).await;

    pending_tx.send_replace(PendingApprovalState::Pending);
    wait_for_state(&handle, SwapState::Loading).await;

    pending_tx.send_replace(PendingApprovalState::Idle);
    wait_for_state(&handle, SwapState::Ready(quote(usdc(), eth(), 50))).await;

    rt.shutdown().await;
}

#[tokio::test]
async fn approve_data_uses_latest_applied_balance() {
    let rt = runtime();
    let handle = rt.handle();

    let data = handle.approve_data(None).await.unwrap().unwrap();
    assert_eq!(data.amount_micros, 100);

    handle.submit(SwapEvent::TokenIn(Some(dai()))).unwrap();
    let data = handle.approve_data(None).await.unwrap().unwrap();
    assert_eq!(data.amount_micros, 5);
    assert_eq!(data.token, dai());

    let data = handle.approve_data(Some(42)).await.unwrap().unwrap();
    assert_eq!(data.amount_micros, 42);

    rt.shutdown().await;
}

#[tokio::test(flavor = "current_thread")]
async fn shutdown_drops_queued_events_and_rejects_new_ones() {
    let mut rt = runtime();
    let handle = rt.handle();
    assert_eq!(handle.state(), SwapState::Loading);

    let (trade_tx, trade_rx) = watch::channel(TradeState::Loading);
    rt.forward(WatchStream::from_changes(trade_rx), SwapEvent::TradeState);

    // The worker has not been polled yet on this single-threaded runtime.
    handle
        .submit(SwapEvent::AllowanceState(AllowanceState::Ready {
            allowance_micros: 1_000,
        }))
        .unwrap();
    handle
        .submit(SwapEvent::TradeState(TradeState::Ready(quote(usdc(), eth(), 50))))
        .unwrap();

    rt.shutdown().await;

    assert_eq!(handle.state(), SwapState::Loading, "queued events were dropped");
    assert_eq!(
        handle.submit(SwapEvent::AmountIn(1)),
        Err(RuntimeError::Stopped)
    );
    assert_eq!(handle.flush().await, Err(RuntimeError::Stopped));

    // The aborted forwarder drops its upstream receiver.
    let closed = tokio::time::timeout(Duration::from_secs(2), trade_tx.closed()).await;
    assert!(closed.is_ok(), "forwarder still holds the upstream stream");
    let late = TradeState::NotReady(vec![SwapError::upstream(
        ErrorOrigin::TradeQuote,
        "NO_ROUTE",
        "no liquidity",
    )]);
    assert!(trade_tx.send(late).is_err(), "nobody listens upstream");
    tokio::task::yield_now().await;
    assert_eq!(handle.state(), SwapState::Loading);
    assert!(handle.errors().is_empty());
}
