//! Last-value-cached output channels of the aggregator.
//!
//! Every channel is a `tokio::sync::watch`: late subscribers read the cached
//! value, and receivers see one change notification per distinct publication.

use sra_domain::{SwapError, SwapState};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Write side. Only the aggregator publishes.
#[derive(Debug)]
pub struct SwapPublisher {
    state: watch::Sender<SwapState>,
    errors: watch::Sender<Vec<SwapError>>,
    balance_in: watch::Sender<Option<i64>>,
    balance_out: watch::Sender<Option<i64>>,
}

impl Default for SwapPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapPublisher {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SwapState::NotReady);
        let (errors, _) = watch::channel(Vec::new());
        let (balance_in, _) = watch::channel(None);
        let (balance_out, _) = watch::channel(None);
        Self {
            state,
            errors,
            balance_in,
            balance_out,
        }
    }

    /// Publish a state. Returns `false` (and notifies nobody) when it equals
    /// the current one.
    pub fn publish_state(&self, next: SwapState) -> bool {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        })
    }

    /// Replace the error list. Always notifies, except empty -> empty.
    pub fn publish_errors(&self, next: Vec<SwapError>) -> bool {
        self.errors.send_if_modified(|current| {
            if current.is_empty() && next.is_empty() {
                return false;
            }
            *current = next;
            true
        })
    }

    pub fn publish_balance_in(&self, balance: Option<i64>) {
        self.balance_in.send_replace(balance);
    }

    pub fn publish_balance_out(&self, balance: Option<i64>) {
        self.balance_out.send_replace(balance);
    }

    pub fn state(&self) -> SwapState {
        self.state.borrow().clone()
    }

    pub fn errors(&self) -> Vec<SwapError> {
        self.errors.borrow().clone()
    }

    pub fn balance_in(&self) -> Option<i64> {
        *self.balance_in.borrow()
    }

    pub fn balance_out(&self) -> Option<i64> {
        *self.balance_out.borrow()
    }

    pub fn subscribe(&self) -> SwapSubscription {
        SwapSubscription {
            state: self.state.subscribe(),
            errors: self.errors.subscribe(),
            balance_in: self.balance_in.subscribe(),
            balance_out: self.balance_out.subscribe(),
        }
    }
}

/// Read side. Each receiver starts with the current value marked as seen.
#[derive(Clone, Debug)]
pub struct SwapSubscription {
    pub state: watch::Receiver<SwapState>,
    pub errors: watch::Receiver<Vec<SwapError>>,
    pub balance_in: watch::Receiver<Option<i64>>,
    pub balance_out: watch::Receiver<Option<i64>>,
}

impl SwapSubscription {
    /// Stream of state changes after subscription.
    pub fn state_stream(&self) -> WatchStream<SwapState> {
        WatchStream::from_changes(self.state.clone())
    }

    /// Stream of error list replacements after subscription.
    pub fn errors_stream(&self) -> WatchStream<Vec<SwapError>> {
        WatchStream::from_changes(self.errors.clone())
    }
}
