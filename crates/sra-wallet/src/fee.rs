use std::collections::BTreeMap;
use std::sync::Arc;

use sra_domain::{Token, TokenQuery, TokenType};

/// Token metadata lookup.
pub trait TokenRegistry: Send + Sync {
    fn token(&self, query: &TokenQuery) -> Option<Token>;
}

/// Registry backed by a fixed token list, keyed by query id.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenRegistry {
    tokens: BTreeMap<String, Token>,
}

impl MemoryTokenRegistry {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().map(|t| (t.query().id(), t)).collect(),
        }
    }
}

impl TokenRegistry for MemoryTokenRegistry {
    fn token(&self, query: &TokenQuery) -> Option<Token> {
        self.tokens.get(&query.id()).cloned()
    }
}

/// Resolves the token that pays network fees for a given token.
#[derive(Clone)]
pub struct FeeTokenProvider {
    registry: Arc<dyn TokenRegistry>,
}

impl FeeTokenProvider {
    pub fn new(registry: Arc<dyn TokenRegistry>) -> Self {
        Self { registry }
    }

    /// EIP-20 tokens pay fees in the native coin of their chain. Native and
    /// non-EVM tokens have no separate fee token.
    pub fn fee_token(&self, token: &Token) -> Option<Token> {
        match token.token_type {
            TokenType::Eip20 { .. } => {
                let query = TokenQuery::new(token.blockchain, TokenType::Native);
                self.registry.token(&query)
            }
            _ => None,
        }
    }
}
