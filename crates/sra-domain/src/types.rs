use crate::{BlockchainType, SwapError, Token};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session identity
// ---------------------------------------------------------------------------

/// Swap providers an aggregator session can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DexProvider {
    OneInch,
    Uniswap,
    UniswapV3,
    PancakeSwap,
    QuickSwap,
}

impl DexProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            DexProvider::OneInch => "one_inch",
            DexProvider::Uniswap => "uniswap",
            DexProvider::UniswapV3 => "uniswap_v3",
            DexProvider::PancakeSwap => "pancake_swap",
            DexProvider::QuickSwap => "quick_swap",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one_inch" | "1inch" | "oneinch" => Some(DexProvider::OneInch),
            "uniswap" => Some(DexProvider::Uniswap),
            "uniswap_v3" => Some(DexProvider::UniswapV3),
            "pancake_swap" | "pancakeswap" => Some(DexProvider::PancakeSwap),
            "quick_swap" | "quickswap" => Some(DexProvider::QuickSwap),
            _ => None,
        }
    }
}

/// Provider + chain. Fixed for the lifetime of one swap screen session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dex {
    pub provider: DexProvider,
    pub blockchain: BlockchainType,
}

impl Dex {
    pub fn new(provider: DexProvider, blockchain: BlockchainType) -> Self {
        Self {
            provider,
            blockchain,
        }
    }
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// Fully-resolved quote, ready for execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParameters {
    pub token_in: Token,
    pub token_out: Token,
    pub amount_in_micros: i64,
    pub amount_out_micros: i64,
    pub slippage_bps: u32,
    pub recipient: Option<String>,
    /// Ordered protocol hops of the route.
    pub route: Vec<String>,
}

// ---------------------------------------------------------------------------
// Upstream states
// ---------------------------------------------------------------------------

/// Trade quote source state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum TradeState {
    Loading,
    Ready(SwapParameters),
    NotReady(Vec<SwapError>),
}

/// Allowance source state for the current input token and spender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum AllowanceState {
    Loading,
    Ready { allowance_micros: i64 },
    NotReady(SwapError),
}

/// Whether an approval transaction is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingApprovalState {
    #[default]
    Idle,
    Pending,
}

// ---------------------------------------------------------------------------
// Aggregated state
// ---------------------------------------------------------------------------

/// Published swap readiness verdict.
///
/// Equality compares the tag and, for `Ready`, the parameters by value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "parameters", rename_all = "snake_case")]
pub enum SwapState {
    Loading,
    Ready(SwapParameters),
    #[default]
    NotReady,
}

impl SwapState {
    pub fn parameters(&self) -> Option<&SwapParameters> {
        match self {
            SwapState::Ready(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SwapState::Ready(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SwapState::Loading)
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            SwapState::Loading => "loading",
            SwapState::Ready(_) => "ready",
            SwapState::NotReady => "not_ready",
        }
    }
}

// ---------------------------------------------------------------------------
// Approval
// ---------------------------------------------------------------------------

/// Everything needed to build an approve transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveData {
    pub dex: Dex,
    pub token: Token,
    pub spender_address: String,
    pub amount_micros: i64,
}
