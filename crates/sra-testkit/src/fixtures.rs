use sra_domain::{BlockchainType, Dex, DexProvider, SwapParameters, Token, TokenType};

pub const SPENDER: &str = "0x1111111254eeb25477b68fb85ed929f73a960582";

pub fn dex() -> Dex {
    Dex::new(DexProvider::OneInch, BlockchainType::Ethereum)
}

pub fn eth() -> Token {
    Token::new(BlockchainType::Ethereum, TokenType::Native, "ETH", 18)
}

/// Reset-required under the default policy.
pub fn usdt() -> Token {
    Token::new(
        BlockchainType::Ethereum,
        TokenType::Eip20 {
            address: "0xdac17f958d2ee523a2206206994597c13d831ec7".to_string(),
        },
        "USDT",
        6,
    )
}

pub fn usdc() -> Token {
    Token::new(
        BlockchainType::Ethereum,
        TokenType::Eip20 {
            address: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string(),
        },
        "USDC",
        6,
    )
}

pub fn dai() -> Token {
    Token::new(
        BlockchainType::Ethereum,
        TokenType::Eip20 {
            address: "0x6b175474e89094c44da98b954eedeac495271d0f".to_string(),
        },
        "DAI",
        18,
    )
}

pub fn quote(token_in: Token, token_out: Token, amount_in_micros: i64) -> SwapParameters {
    SwapParameters {
        token_in,
        token_out,
        amount_in_micros,
        amount_out_micros: amount_in_micros.saturating_mul(2),
        slippage_bps: 50,
        recipient: None,
        route: vec!["uniswap_v3".to_string(), "curve".to_string()],
    }
}
