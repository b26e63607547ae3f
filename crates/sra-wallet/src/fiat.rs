//! Fiat conversion of entered amounts.
//!
//! Holds the latest non-expired price of the selected coin in the base
//! currency and converts amounts between the coin and currency views.
//! Watchers are notified through a counter bumped on every visible change:
//! a different price, or a toggle of the amount type.

use std::ops::Not;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sra_domain::{Token, MICROS_SCALE};
use tokio::sync::watch;
use tracing::debug;

/// Which side the user types in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountType {
    #[default]
    Coin,
    Currency,
}

impl Not for AmountType {
    type Output = AmountType;

    fn not(self) -> AmountType {
        match self {
            AmountType::Coin => AmountType::Currency,
            AmountType::Currency => AmountType::Coin,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinPrice {
    pub coin_code: String,
    pub currency: String,
    /// Price of one coin in currency micros.
    pub value_micros: i64,
    pub timestamp: DateTime<Utc>,
}

impl CoinPrice {
    pub fn is_expired(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        now.signed_duration_since(self.timestamp) > expiry
    }
}

/// Latest known prices, plus whatever live feed the implementation has.
pub trait PriceSource: Send + Sync {
    fn coin_price(&self, coin_code: &str, currency: &str) -> Option<CoinPrice>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmountInfo {
    Coin { token: Token, amount_micros: i64 },
    Currency { currency: String, value_micros: i64 },
}

pub struct FiatService {
    prices: Arc<dyn PriceSource>,
    currency: String,
    expiry: Duration,
    amount_type: AmountType,
    token: Option<Token>,
    price_micros: Option<i64>,
    updated: watch::Sender<u64>,
}

impl FiatService {
    /// `expiry_secs` beyond what a `Duration` can hold saturates to the
    /// largest window; negative values mean every price is expired.
    pub fn new(prices: Arc<dyn PriceSource>, currency: impl Into<String>, expiry_secs: i64) -> Self {
        let (updated, _) = watch::channel(0);
        Self {
            prices,
            currency: currency.into(),
            expiry: expiry_window(expiry_secs),
            amount_type: AmountType::default(),
            token: None,
            price_micros: None,
            updated,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn amount_type(&self) -> AmountType {
        self.amount_type
    }

    pub fn price_micros(&self) -> Option<i64> {
        self.price_micros
    }

    /// Update counter. Every bump means converted amounts may have changed.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updated.subscribe()
    }

    pub fn set_amount_type(&mut self, amount_type: AmountType) {
        if self.amount_type != amount_type {
            self.amount_type = amount_type;
            self.bump();
        }
    }

    pub fn toggle_amount_type(&mut self) {
        self.set_amount_type(!self.amount_type);
    }

    /// Select a coin and load its last known price.
    pub fn set_token(&mut self, token: Option<Token>) {
        self.set_token_at(token, Utc::now());
    }

    pub fn set_token_at(&mut self, token: Option<Token>, now: DateTime<Utc>) {
        let price = token
            .as_ref()
            .and_then(|t| self.prices.coin_price(&t.code, &self.currency));
        self.token = token;
        self.sync_coin_price(price.as_ref(), now);
    }

    /// Live price update. Ignored unless it is for the selected coin and the
    /// base currency.
    pub fn on_coin_price(&mut self, price: &CoinPrice) {
        self.on_coin_price_at(price, Utc::now());
    }

    pub fn on_coin_price_at(&mut self, price: &CoinPrice, now: DateTime<Utc>) {
        let matches = self
            .token
            .as_ref()
            .is_some_and(|t| t.code == price.coin_code && self.currency == price.currency);
        if matches {
            self.sync_coin_price(Some(price), now);
        }
    }

    fn sync_coin_price(&mut self, price: Option<&CoinPrice>, now: DateTime<Utc>) {
        let value = price
            .filter(|p| !p.is_expired(now, self.expiry))
            .map(|p| p.value_micros);
        if self.price_micros != value {
            debug!(
                coin = self.token.as_ref().map(|t| t.code.as_str()),
                price_micros = value,
                "fiat price changed"
            );
            self.price_micros = value;
            self.bump();
        }
    }

    fn bump(&self) {
        self.updated.send_modify(|n| *n = n.wrapping_add(1));
    }

    /// Amount in the type the user is typing in.
    pub fn primary_amount_info(&self, amount_micros: i64) -> Option<AmountInfo> {
        self.amount_info(amount_micros, self.amount_type)
    }

    /// Amount in the other type.
    pub fn secondary_amount_info(&self, amount_micros: i64) -> Option<AmountInfo> {
        self.amount_info(amount_micros, !self.amount_type)
    }

    fn amount_info(&self, amount_micros: i64, amount_type: AmountType) -> Option<AmountInfo> {
        match amount_type {
            AmountType::Coin => self.token.as_ref().map(|token| AmountInfo::Coin {
                token: token.clone(),
                amount_micros,
            }),
            AmountType::Currency => {
                let price = self.price_micros?;
                let value_micros = mul_micros(amount_micros, price)?;
                Some(AmountInfo::Currency {
                    currency: self.currency.clone(),
                    value_micros,
                })
            }
        }
    }
}

fn expiry_window(expiry_secs: i64) -> Duration {
    Duration::try_seconds(expiry_secs).unwrap_or(if expiry_secs < 0 {
        Duration::zero()
    } else {
        Duration::MAX
    })
}

/// `a * b` for two micros values. `None` on overflow.
fn mul_micros(a: i64, b: i64) -> Option<i64> {
    let wide = i128::from(a) * i128::from(b) / i128::from(MICROS_SCALE);
    i64::try_from(wide).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_toggles_amount_type() {
        assert_eq!(!AmountType::Coin, AmountType::Currency);
        assert_eq!(!!AmountType::Coin, AmountType::Coin);
    }

    #[test]
    fn mul_micros_is_fixed_point() {
        // 2.5 coins at 1_800.00 -> 4_500.00
        assert_eq!(mul_micros(2_500_000, 1_800_000_000), Some(4_500_000_000));
        assert_eq!(mul_micros(i64::MAX, 2 * MICROS_SCALE), None);
    }

    #[test]
    fn out_of_range_expiry_saturates() {
        assert_eq!(expiry_window(600), Duration::seconds(600));
        assert_eq!(expiry_window(i64::MAX), Duration::MAX);
        assert_eq!(expiry_window(i64::MIN), Duration::zero());

        let now = Utc::now();
        let p = CoinPrice {
            coin_code: "ETH".to_string(),
            currency: "USD".to_string(),
            value_micros: 1,
            timestamp: now - Duration::days(3_650),
        };
        assert!(!p.is_expired(now, expiry_window(i64::MAX)));
    }

    #[test]
    fn expiry_is_strictly_after_window() {
        let now = Utc::now();
        let p = CoinPrice {
            coin_code: "ETH".to_string(),
            currency: "USD".to_string(),
            value_micros: 1,
            timestamp: now - Duration::seconds(600),
        };
        assert!(!p.is_expired(now, Duration::seconds(600)));
        assert!(p.is_expired(now, Duration::seconds(599)));
    }
}
