use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use sra_domain::{ApproveData, Dex, Token, TradeState};
use sra_engine::{AllowanceSource, BalanceLookup, PendingApprovalSource, TradeQuoteSource};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Trade source snapshot used to seed a session.
#[derive(Clone, Debug)]
pub struct FakeTradeSource {
    pub state: TradeState,
    pub token_in: Option<Token>,
    pub token_out: Option<Token>,
    pub amount_in_micros: i64,
}

impl FakeTradeSource {
    pub fn new(state: TradeState) -> Self {
        Self {
            state,
            token_in: None,
            token_out: None,
            amount_in_micros: 0,
        }
    }

    pub fn with_tokens(mut self, token_in: Option<Token>, token_out: Option<Token>) -> Self {
        self.token_in = token_in;
        self.token_out = token_out;
        self
    }

    pub fn with_amount_in(mut self, amount_in_micros: i64) -> Self {
        self.amount_in_micros = amount_in_micros;
        self
    }
}

impl TradeQuoteSource for FakeTradeSource {
    fn state(&self) -> TradeState {
        self.state.clone()
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

/// Records every `set_token` call; approve data targets the last token set.
#[derive(Debug)]
pub struct RecordingAllowanceSource {
    spender: String,
    tokens: Mutex<Vec<Option<Token>>>,
}

impl RecordingAllowanceSource {
    pub fn new(spender: impl Into<String>) -> Self {
        Self {
            spender: spender.into(),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn set_token_calls(&self) -> Vec<Option<Token>> {
        lock(&self.tokens).clone()
    }

    pub fn last_token(&self) -> Option<Token> {
        lock(&self.tokens).last().cloned().flatten()
    }
}

impl AllowanceSource for RecordingAllowanceSource {
    fn set_token(&self, token: Option<&Token>) {
        lock(&self.tokens).push(token.cloned());
    }

    fn approve_data(&self, dex: &Dex, amount_micros: i64) -> Option<ApproveData> {
        let token = self.last_token()?;
        Some(ApproveData {
            dex: *dex,
            token,
            spender_address: self.spender.clone(),
            amount_micros,
        })
    }
}

#[derive(Debug, Default)]
pub struct RecordingPendingSource {
    tokens: Mutex<Vec<Option<Token>>>,
}

impl RecordingPendingSource {
    pub fn set_token_calls(&self) -> Vec<Option<Token>> {
        lock(&self.tokens).clone()
    }
}

impl PendingApprovalSource for RecordingPendingSource {
    fn set_token(&self, token: Option<&Token>) {
        lock(&self.tokens).push(token.cloned());
    }
}

/// Balances keyed by token query id. Missing tokens have unknown balance.
#[derive(Debug, Default)]
pub struct StaticBalances {
    balances: Mutex<BTreeMap<String, i64>>,
}

impl StaticBalances {
    pub fn with(mut self, token: &Token, available_micros: i64) -> Self {
        self.balances
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(token.query().id(), available_micros);
        self
    }

    pub fn set(&self, token: &Token, available_micros: i64) {
        lock(&self.balances).insert(token.query().id(), available_micros);
    }

    pub fn remove(&self, token: &Token) {
        lock(&self.balances).remove(&token.query().id());
    }
}

impl BalanceLookup for StaticBalances {
    fn available_balance(&self, token: &Token) -> Option<i64> {
        lock(&self.balances).get(&token.query().id()).copied()
    }
}
