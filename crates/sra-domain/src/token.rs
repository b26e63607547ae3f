use serde::{Deserialize, Serialize};
use std::fmt;

/// Chains a swap session can run on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockchainType {
    Ethereum,
    BinanceSmartChain,
    Polygon,
    Avalanche,
    Optimism,
    ArbitrumOne,
    Gnosis,
    Fantom,
    Base,
}

impl BlockchainType {
    pub fn uid(&self) -> &'static str {
        match self {
            BlockchainType::Ethereum => "ethereum",
            BlockchainType::BinanceSmartChain => "binance-smart-chain",
            BlockchainType::Polygon => "polygon-pos",
            BlockchainType::Avalanche => "avalanche",
            BlockchainType::Optimism => "optimistic-ethereum",
            BlockchainType::ArbitrumOne => "arbitrum-one",
            BlockchainType::Gnosis => "gnosis",
            BlockchainType::Fantom => "fantom",
            BlockchainType::Base => "base",
        }
    }

    /// Parse from the uid form (as written in config files).
    pub fn from_uid(uid: &str) -> Option<Self> {
        let all = [
            BlockchainType::Ethereum,
            BlockchainType::BinanceSmartChain,
            BlockchainType::Polygon,
            BlockchainType::Avalanche,
            BlockchainType::Optimism,
            BlockchainType::ArbitrumOne,
            BlockchainType::Gnosis,
            BlockchainType::Fantom,
            BlockchainType::Base,
        ];
        let needle = uid.trim().to_ascii_lowercase();
        all.into_iter().find(|b| b.uid() == needle)
    }
}

/// How a token lives on its chain.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenType {
    Native,
    Eip20 { address: String },
    Bep2 { symbol: String },
    Spl { address: String },
}

impl TokenType {
    /// Stable string id, e.g. `eip20:0xdac1...`.
    pub fn id(&self) -> String {
        match self {
            TokenType::Native => "native".to_string(),
            TokenType::Eip20 { address } => format!("eip20:{}", address.to_ascii_lowercase()),
            TokenType::Bep2 { symbol } => format!("bep2:{symbol}"),
            TokenType::Spl { address } => format!("spl:{address}"),
        }
    }

    pub fn is_eip20(&self) -> bool {
        matches!(self, TokenType::Eip20 { .. })
    }
}

/// Blockchain + token type. Identifies a token independent of coin metadata.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenQuery {
    pub blockchain: BlockchainType,
    pub token_type: TokenType,
}

impl TokenQuery {
    pub fn new(blockchain: BlockchainType, token_type: TokenType) -> Self {
        Self {
            blockchain,
            token_type,
        }
    }

    /// `<blockchain uid>|<token type id>`
    pub fn id(&self) -> String {
        format!("{}|{}", self.blockchain.uid(), self.token_type.id())
    }
}

impl fmt::Display for TokenQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// A token the user can swap.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Token {
    pub blockchain: BlockchainType,
    pub token_type: TokenType,
    /// Coin code, e.g. `USDT`.
    pub code: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(
        blockchain: BlockchainType,
        token_type: TokenType,
        code: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            blockchain,
            token_type,
            code: code.into(),
            decimals,
        }
    }

    pub fn query(&self) -> TokenQuery {
        TokenQuery::new(self.blockchain, self.token_type.clone())
    }
}
