//! sra-wallet
//!
//! Wallet-side collaborators around a swap session:
//! - enabled-wallet balance cache (backs the engine's `BalanceLookup`)
//! - fee-token provider (which token pays gas for a given token)
//! - fiat conversion of entered amounts

mod balance_cache;
mod fee;
mod fiat;

pub use balance_cache::{
    BalanceData, CacheContainer, CacheStore, CachedBalanceLookup, EnabledWalletCache,
    MemoryCacheStore, Wallet, WalletBalanceCache,
};
pub use fee::{FeeTokenProvider, MemoryTokenRegistry, TokenRegistry};
pub use fiat::{AmountInfo, AmountType, CoinPrice, FiatService, PriceSource};
