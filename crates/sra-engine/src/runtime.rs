//! Serialized execution queue for one aggregator session.
//!
//! A single worker task owns the [`SwapService`]. Producers on any thread
//! submit [`SwapEvent`]s through a cloneable [`SwapHandle`]; the worker
//! applies them strictly in submission order, one at a time, so handlers never
//! overlap and the service needs no locks.
//!
//! Shutdown aborts upstream forwarders and stops the worker without draining:
//! events still queued at that point are dropped.

use std::sync::Arc;

use sra_domain::{
    AllowanceState, ApproveData, PendingApprovalState, SwapError, SwapState, Token, TradeState,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::publish::{SwapPublisher, SwapSubscription};
use crate::service::SwapService;

/// One upstream notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapEvent {
    TradeState(TradeState),
    TokenIn(Option<Token>),
    TokenOut(Option<Token>),
    AmountIn(i64),
    AllowanceState(AllowanceState),
    PendingApproval(PendingApprovalState),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("swap runtime stopped")]
    Stopped,
}

enum Command {
    Event(SwapEvent),
    Flush(oneshot::Sender<()>),
    ApproveData {
        amount_micros: Option<i64>,
        reply: oneshot::Sender<Option<ApproveData>>,
    },
}

/// Cloneable producer/consumer handle onto a running session.
#[derive(Clone)]
pub struct SwapHandle {
    session_id: Uuid,
    command_tx: mpsc::UnboundedSender<Command>,
    publisher: Arc<SwapPublisher>,
}

impl SwapHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Enqueue an upstream event. Fails once the runtime has stopped.
    pub fn submit(&self, event: SwapEvent) -> Result<(), RuntimeError> {
        self.command_tx.send(Command::Event(event)).map_err(|e| {
            warn!(session_id = %self.session_id, event = ?e.0.kind(), "event dropped: runtime stopped");
            RuntimeError::Stopped
        })
    }

    /// Resolves once every event submitted before this call has been applied.
    pub async fn flush(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(Command::Flush(tx))
            .map_err(|_| RuntimeError::Stopped)?;
        rx.await.map_err(|_| RuntimeError::Stopped)
    }

    /// Approval instructions, computed on the queue against the latest
    /// applied input balance.
    pub async fn approve_data(
        &self,
        amount_micros: Option<i64>,
    ) -> Result<Option<ApproveData>, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(Command::ApproveData {
                amount_micros,
                reply,
            })
            .map_err(|_| RuntimeError::Stopped)?;
        rx.await.map_err(|_| RuntimeError::Stopped)
    }

    pub fn subscribe(&self) -> SwapSubscription {
        self.publisher.subscribe()
    }

    pub fn state(&self) -> SwapState {
        self.publisher.state()
    }

    pub fn errors(&self) -> Vec<SwapError> {
        self.publisher.errors()
    }

    pub fn balance_in(&self) -> Option<i64> {
        self.publisher.balance_in()
    }

    pub fn balance_out(&self) -> Option<i64> {
        self.publisher.balance_out()
    }
}

impl Command {
    fn kind(&self) -> &'static str {
        match self {
            Command::Event(e) => e.kind(),
            Command::Flush(_) => "flush",
            Command::ApproveData { .. } => "approve_data",
        }
    }
}

impl SwapEvent {
    fn kind(&self) -> &'static str {
        match self {
            SwapEvent::TradeState(_) => "trade_state",
            SwapEvent::TokenIn(_) => "token_in",
            SwapEvent::TokenOut(_) => "token_out",
            SwapEvent::AmountIn(_) => "amount_in",
            SwapEvent::AllowanceState(_) => "allowance_state",
            SwapEvent::PendingApproval(_) => "pending_approval",
        }
    }
}

/// Owner of the worker task and of the upstream forwarders.
pub struct SwapRuntime {
    handle: SwapHandle,
    shutdown_tx: watch::Sender<bool>,
    worker: Option<JoinHandle<()>>,
    forwarders: Vec<JoinHandle<()>>,
}

impl SwapRuntime {
    /// Move the service onto its worker task. Must be called inside a tokio
    /// runtime.
    pub fn start(service: SwapService) -> Self {
        let session_id = Uuid::new_v4();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let publisher = service.publisher();
        let dex = service.dex();

        let span = info_span!(
            "swap_session",
            %session_id,
            dex = dex.provider.as_str(),
            blockchain = dex.blockchain.uid()
        );
        let worker = tokio::spawn(run_loop(service, command_rx, shutdown_rx).instrument(span));

        info!(%session_id, "swap runtime started");

        Self {
            handle: SwapHandle {
                session_id,
                command_tx,
                publisher,
            },
            shutdown_tx,
            worker: Some(worker),
            forwarders: Vec::new(),
        }
    }

    pub fn handle(&self) -> SwapHandle {
        self.handle.clone()
    }

    /// Subscribe to an upstream stream: every item is mapped to an event and
    /// handed to the queue. The forwarder ends with the stream or at shutdown.
    pub fn forward<S, F>(&mut self, stream: S, map: F)
    where
        S: Stream + Send + Unpin + 'static,
        S::Item: Send,
        F: Fn(S::Item) -> SwapEvent + Send + 'static,
    {
        let handle = self.handle.clone();
        let mut stream = stream;
        let task = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                if handle.submit(map(item)).is_err() {
                    break;
                }
            }
        });
        self.forwarders.push(task);
    }

    /// Stop forwarding, drop queued work and wait for the worker to exit.
    pub async fn shutdown(mut self) {
        for f in self.forwarders.drain(..) {
            f.abort();
        }
        self.shutdown_tx.send_replace(true);
        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.await {
                warn!(error = %err, "swap runtime worker ended abnormally");
            }
        }
        info!(session_id = %self.handle.session_id, "swap runtime stopped");
    }
}

impl Drop for SwapRuntime {
    fn drop(&mut self) {
        for f in &self.forwarders {
            f.abort();
        }
        self.shutdown_tx.send_replace(true);
    }
}

async fn run_loop(
    mut service: SwapService,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            cmd = command_rx.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                debug!(command = cmd.kind(), "applying");
                apply(&mut service, cmd);
            }
        }
    }

    // Dropping the receiver discards whatever is still queued.
    command_rx.close();
}

fn apply(service: &mut SwapService, cmd: Command) {
    match cmd {
        Command::Event(event) => match event {
            SwapEvent::TradeState(s) => service.on_trade_state_changed(s),
            SwapEvent::TokenIn(t) => service.on_token_in_changed(t),
            SwapEvent::TokenOut(t) => service.on_token_out_changed(t),
            SwapEvent::AmountIn(a) => service.on_amount_in_changed(a),
            SwapEvent::AllowanceState(s) => service.on_allowance_state_changed(s),
            SwapEvent::PendingApproval(s) => service.on_pending_approval_changed(s),
        },
        Command::Flush(done) => {
            let _ = done.send(());
        }
        Command::ApproveData {
            amount_micros,
            reply,
        } => {
            let _ = reply.send(service.approve_data(amount_micros));
        }
    }
}
