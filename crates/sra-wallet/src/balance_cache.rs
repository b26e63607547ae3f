//! Last known balances of enabled wallets, persisted per account.
//!
//! Adapters refresh balances in the background; the cache lets a new swap
//! session read a balance immediately instead of waiting for the network.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use sra_domain::Token;
use sra_engine::BalanceLookup;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceData {
    pub available_micros: i64,
    pub locked_micros: i64,
}

impl BalanceData {
    pub fn new(available_micros: i64, locked_micros: i64) -> Self {
        Self {
            available_micros,
            locked_micros,
        }
    }

    pub fn total_micros(&self) -> i64 {
        self.available_micros.saturating_add(self.locked_micros)
    }
}

/// A token enabled in an account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wallet {
    pub account_id: String,
    pub token: Token,
}

impl Wallet {
    pub fn new(account_id: impl Into<String>, token: Token) -> Self {
        Self {
            account_id: account_id.into(),
            token,
        }
    }
}

/// One persisted row: account + token query id -> balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledWalletCache {
    pub account_id: String,
    pub token_query_id: String,
    pub balance: BalanceData,
}

impl EnabledWalletCache {
    pub fn new(wallet: &Wallet, balance: BalanceData) -> Self {
        Self {
            account_id: wallet.account_id.clone(),
            token_query_id: wallet.token.query().id(),
            balance,
        }
    }
}

/// Opaque key-value storage for cache rows.
///
/// `save` upserts by (account id, token query id).
pub trait CacheStore: Send + Sync {
    fn save(&self, caches: Vec<EnabledWalletCache>);
    fn load(&self, account_id: &str) -> Vec<EnabledWalletCache>;
    /// Returns the number of rows removed.
    fn delete(&self, account_id: &str) -> usize;
}

#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    rows: Mutex<BTreeMap<(String, String), BalanceData>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.rows).is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn save(&self, caches: Vec<EnabledWalletCache>) {
        let mut rows = lock(&self.rows);
        for c in caches {
            rows.insert((c.account_id, c.token_query_id), c.balance);
        }
    }

    fn load(&self, account_id: &str) -> Vec<EnabledWalletCache> {
        lock(&self.rows)
            .iter()
            .filter(|((acc, _), _)| acc == account_id)
            .map(|((acc, query_id), balance)| EnabledWalletCache {
                account_id: acc.clone(),
                token_query_id: query_id.clone(),
                balance: *balance,
            })
            .collect()
    }

    fn delete(&self, account_id: &str) -> usize {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|(acc, _), _| acc != account_id);
        before - rows.len()
    }
}

/// Balance cache over a [`CacheStore`].
#[derive(Clone)]
pub struct WalletBalanceCache {
    store: Arc<dyn CacheStore>,
}

impl WalletBalanceCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn set_balance_data(&self, wallet: &Wallet, data: BalanceData) {
        self.store.save(vec![EnabledWalletCache::new(wallet, data)]);
    }

    pub fn set_balance_map(&self, map: &HashMap<Wallet, BalanceData>) {
        let caches = map
            .iter()
            .map(|(wallet, data)| EnabledWalletCache::new(wallet, *data))
            .collect();
        self.store.save(caches);
    }

    /// Snapshot of every cached balance for one account.
    pub fn cache_container(&self, account_id: &str) -> CacheContainer {
        CacheContainer::new(self.store.load(account_id))
    }

    pub fn handle_account_deleted(&self, account_id: &str) {
        let removed = self.store.delete(account_id);
        debug!(account_id, removed, "wallet caches deleted");
    }

    /// Drop caches for every account id received on `deleted`. The task ends
    /// when all senders are gone.
    pub fn listen_for_deleted_accounts(
        &self,
        mut deleted: mpsc::UnboundedReceiver<String>,
    ) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            while let Some(account_id) = deleted.recv().await {
                cache.handle_account_deleted(&account_id);
            }
        })
    }
}

/// Cached balances of one account, matched by token query id.
#[derive(Clone, Debug, Default)]
pub struct CacheContainer {
    caches: Vec<EnabledWalletCache>,
}

impl CacheContainer {
    pub fn new(caches: Vec<EnabledWalletCache>) -> Self {
        Self { caches }
    }

    pub fn balance_data(&self, wallet: &Wallet) -> Option<BalanceData> {
        self.balance_for_token(&wallet.token)
    }

    fn balance_for_token(&self, token: &Token) -> Option<BalanceData> {
        let query_id = token.query().id();
        self.caches
            .iter()
            .find(|c| c.token_query_id == query_id)
            .map(|c| c.balance)
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

/// `BalanceLookup` over a cache snapshot: the available part of the cached
/// balance.
#[derive(Clone, Debug)]
pub struct CachedBalanceLookup {
    container: CacheContainer,
}

impl CachedBalanceLookup {
    pub fn new(container: CacheContainer) -> Self {
        Self { container }
    }
}

impl BalanceLookup for CachedBalanceLookup {
    fn available_balance(&self, token: &Token) -> Option<i64> {
        self.container
            .balance_for_token(token)
            .map(|b| b.available_micros)
    }
}
