//! `sra replay`: drive one swap session from a recorded event script.
//!
//! Collaborators are in-memory and described by the script: cached wallet
//! balances, the allowance spender, optional coin prices. Every scripted event
//! goes through the runtime queue and is flushed before the next one. A JSON
//! line is printed for the seeded state and after every event that notified
//! the state or errors channel. An error list replaced with identical content
//! still notifies, so it prints.

use std::fs;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sra_config::SwapConfig;
use sra_domain::{
    AllowanceState, ApproveData, Dex, PendingApprovalState, SwapError, SwapState, Token,
    TradeState,
};
use sra_engine::{
    AllowanceSource, PendingApprovalSource, SwapEvent, SwapHandle, SwapRuntime, SwapService,
    SwapSources, SwapSubscription, TradeQuoteSource,
};
use sra_wallet::{
    AmountInfo, BalanceData, CachedBalanceLookup, CoinPrice, FiatService, MemoryCacheStore,
    PriceSource, Wallet, WalletBalanceCache,
};
use tracing::debug;

// ---------------------------------------------------------------------------
// Script format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_account")]
    pub account_id: String,
    pub spender: String,
    #[serde(default)]
    pub balances: Vec<ScriptBalance>,
    #[serde(default)]
    pub prices: Vec<ScriptPrice>,
    pub initial: ScriptInitial,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
    /// When set, print approval data for this amount (or the known input
    /// balance when `null`) after the last event.
    #[serde(default)]
    pub approve: Option<ScriptApprove>,
}

fn default_account() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptBalance {
    pub token: Token,
    pub available_micros: i64,
    #[serde(default)]
    pub locked_micros: i64,
}

/// Price of one coin in the configured base currency, taken as current.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptPrice {
    pub coin_code: String,
    pub value_micros: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptInitial {
    pub trade: TradeState,
    #[serde(default)]
    pub token_in: Option<Token>,
    #[serde(default)]
    pub token_out: Option<Token>,
    #[serde(default)]
    pub amount_in_micros: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptApprove {
    #[serde(default)]
    pub amount_micros: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    TradeState { state: TradeState },
    TokenIn { token: Option<Token> },
    TokenOut { token: Option<Token> },
    AmountIn { amount_micros: i64 },
    Allowance { state: AllowanceState },
    PendingApproval { state: PendingApprovalState },
}

impl ScriptEvent {
    fn kind(&self) -> &'static str {
        match self {
            ScriptEvent::TradeState { .. } => "trade_state",
            ScriptEvent::TokenIn { .. } => "token_in",
            ScriptEvent::TokenOut { .. } => "token_out",
            ScriptEvent::AmountIn { .. } => "amount_in",
            ScriptEvent::Allowance { .. } => "allowance",
            ScriptEvent::PendingApproval { .. } => "pending_approval",
        }
    }

    fn into_swap_event(self) -> SwapEvent {
        match self {
            ScriptEvent::TradeState { state } => SwapEvent::TradeState(state),
            ScriptEvent::TokenIn { token } => SwapEvent::TokenIn(token),
            ScriptEvent::TokenOut { token } => SwapEvent::TokenOut(token),
            ScriptEvent::AmountIn { amount_micros } => SwapEvent::AmountIn(amount_micros),
            ScriptEvent::Allowance { state } => SwapEvent::AllowanceState(state),
            ScriptEvent::PendingApproval { state } => SwapEvent::PendingApproval(state),
        }
    }
}

impl ReplayScript {
    pub fn from_path(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read replay script failed: {path}"))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid replay script: {path}"))
    }
}

// ---------------------------------------------------------------------------
// In-memory collaborators
// ---------------------------------------------------------------------------

impl TradeQuoteSource for ScriptInitial {
    fn state(&self) -> TradeState {
        self.trade.clone()
    }

    fn token_in(&self) -> Option<Token> {
        self.token_in.clone()
    }

    fn token_out(&self) -> Option<Token> {
        self.token_out.clone()
    }

    fn amount_in_micros(&self) -> i64 {
        self.amount_in_micros
    }
}

/// Allowance states come from the script; this side only tracks the token
/// approvals would target.
struct ScriptAllowance {
    spender: String,
    token: Mutex<Option<Token>>,
}

impl AllowanceSource for ScriptAllowance {
    fn set_token(&self, token: Option<&Token>) {
        let mut current = self.token.lock().unwrap_or_else(|p| p.into_inner());
        *current = token.cloned();
    }

    fn approve_data(&self, dex: &Dex, amount_micros: i64) -> Option<ApproveData> {
        let token = self
            .token
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()?;
        Some(ApproveData {
            dex: *dex,
            token,
            spender_address: self.spender.clone(),
            amount_micros,
        })
    }
}

struct ScriptPendingApproval;

impl PendingApprovalSource for ScriptPendingApproval {
    fn set_token(&self, token: Option<&Token>) {
        debug!(token = token.map(|t| t.code.as_str()), "pending approval token");
    }
}

struct ScriptPrices {
    currency: String,
    prices: Vec<ScriptPrice>,
}

impl PriceSource for ScriptPrices {
    fn coin_price(&self, coin_code: &str, currency: &str) -> Option<CoinPrice> {
        if currency != self.currency {
            return None;
        }
        self.prices
            .iter()
            .find(|p| p.coin_code == coin_code)
            .map(|p| CoinPrice {
                coin_code: p.coin_code.clone(),
                currency: self.currency.clone(),
                value_micros: p.value_micros,
                timestamp: Utc::now(),
            })
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// One printed observation.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayLine {
    pub step: usize,
    pub event: String,
    pub state: SwapState,
    pub errors: Vec<String>,
    pub balance_in: Option<i64>,
    pub amount_in_fiat: Option<AmountInfo>,
}

pub async fn run(cfg: &SwapConfig, script_path: &str) -> Result<()> {
    let script = ReplayScript::from_path(script_path)?;
    let (lines, approve) = replay(cfg, script).await?;
    for line in lines {
        println!("{}", serde_json::to_string(&line)?);
    }
    if let Some(approve) = approve {
        println!("{}", json!({ "approve_data": approve }));
    }
    Ok(())
}

/// Run the script; returns the observed lines and, when requested, the
/// approval data computed after the last event.
pub async fn replay(
    cfg: &SwapConfig,
    script: ReplayScript,
) -> Result<(Vec<ReplayLine>, Option<Option<ApproveData>>)> {
    let cache = WalletBalanceCache::new(Arc::new(MemoryCacheStore::new()));
    for b in &script.balances {
        cache.set_balance_data(
            &Wallet::new(script.account_id.clone(), b.token.clone()),
            BalanceData::new(b.available_micros, b.locked_micros),
        );
    }

    let sources = SwapSources {
        allowance: Arc::new(ScriptAllowance {
            spender: script.spender.clone(),
            token: Mutex::new(None),
        }),
        pending_approval: Arc::new(ScriptPendingApproval),
        balances: Arc::new(CachedBalanceLookup::new(
            cache.cache_container(&script.account_id),
        )),
    };

    let mut fiat = FiatService::new(
        Arc::new(ScriptPrices {
            currency: cfg.base_currency.clone(),
            prices: script.prices.clone(),
        }),
        cfg.base_currency.clone(),
        cfg.price_expiry_secs,
    );
    fiat.set_token(script.initial.token_in.clone());
    let mut amount_in = script.initial.amount_in_micros;

    let service = SwapService::new(
        cfg.dex,
        cfg.revoke_policy.clone(),
        &script.initial,
        sources,
    );
    let runtime = SwapRuntime::start(service);
    let handle = runtime.handle();

    let mut sub = handle.subscribe();
    let mut lines = Vec::new();
    lines.push(line(0, "init", &observe(&mut sub), &handle, &fiat, amount_in));

    for (i, event) in script.events.into_iter().enumerate() {
        let kind = event.kind();
        match &event {
            ScriptEvent::TokenIn { token } => fiat.set_token(token.clone()),
            ScriptEvent::AmountIn { amount_micros } => amount_in = *amount_micros,
            _ => {}
        }

        handle.submit(event.into_swap_event())?;
        handle.flush().await?;

        if notified(&sub) {
            lines.push(line(i + 1, kind, &observe(&mut sub), &handle, &fiat, amount_in));
        }
    }

    let approve = match script.approve {
        Some(a) => Some(handle.approve_data(a.amount_micros).await?),
        None => None,
    };

    runtime.shutdown().await;
    Ok((lines, approve))
}

fn notified(sub: &SwapSubscription) -> bool {
    let state = sub.state.has_changed().unwrap_or(false);
    let errors = sub.errors.has_changed().unwrap_or(false);
    state || errors
}

/// Read both channels and mark them seen.
fn observe(sub: &mut SwapSubscription) -> (SwapState, Vec<SwapError>) {
    (
        sub.state.borrow_and_update().clone(),
        sub.errors.borrow_and_update().clone(),
    )
}

fn line(
    step: usize,
    event: &str,
    observed: &(SwapState, Vec<SwapError>),
    handle: &SwapHandle,
    fiat: &FiatService,
    amount_in: i64,
) -> ReplayLine {
    let (state, errors) = observed;
    ReplayLine {
        step,
        event: event.to_string(),
        state: state.clone(),
        errors: errors.iter().map(|e| e.code().to_string()).collect(),
        balance_in: handle.balance_in(),
        amount_in_fiat: fiat.secondary_amount_info(amount_in),
    }
}
