//! Trade type derived from an executed trade log entry.

use crate::domain::{Decimal, LogEntry, MarketId, Side};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// A single executed trade, reduced from a raw log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Original ISO-8601 timestamp string from the ledger.
    pub time: String,
    /// Seconds since Unix epoch, derived from `time`.
    pub epoch_secs: i64,
    pub market: MarketId,
    pub size: Decimal,
    pub price: Decimal,
    pub side: Side,
    /// Fee rates in hundredths of a basis point.
    pub maker_fee: i64,
    pub taker_fee: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_payment: Option<Decimal>,
    pub tx_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl Trade {
    /// Reduce a log entry's trade payload to a `Trade`.
    ///
    /// Returns `None` when the payload is absent, the timestamp does not
    /// parse, or the size/price invariants (size > 0, price >= 0) fail.
    pub fn from_entry(entry: &LogEntry) -> Option<Trade> {
        let payload = entry.trade_pubdata()?;
        if !payload.size.is_positive() || payload.price.is_negative() {
            return None;
        }
        let epoch_secs = parse_epoch_secs(&entry.time)?;

        Some(Trade {
            time: entry.time.clone(),
            epoch_secs,
            market: MarketId::new(payload.market_index),
            size: payload.size,
            price: payload.price,
            side: Side::from_taker_is_ask(payload.is_taker_ask),
            maker_fee: payload.maker_fee,
            taker_fee: payload.taker_fee,
            funding_payment: payload.funding_payment,
            tx_type: entry.tx_type.clone(),
            tx_hash: entry.hash.clone(),
        })
    }

    /// Notional value in quote currency: size * price.
    pub fn notional(&self) -> Decimal {
        self.size * self.price
    }

    /// Trading fee in quote currency. Rates are hundredths of a basis
    /// point, so the combined rate divides the notional by 10_000.
    pub fn fee(&self) -> Decimal {
        self.notional() * Decimal::from_i64(self.maker_fee + self.taker_fee)
            / Decimal::from_i64(10_000)
    }
}

fn parse_epoch_secs(time: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(time)
        .ok()
        .map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Pubdata, TradePubdata};

    fn trade_entry(time: &str, size: &str, price: &str, is_taker_ask: i64) -> LogEntry {
        LogEntry {
            time: time.to_string(),
            tx_type: "L2InternalClaimOrder".to_string(),
            status: "executed".to_string(),
            hash: Some("0xdeadbeef".to_string()),
            pubdata: Some(Pubdata {
                trade_pubdata: Some(TradePubdata {
                    market_index: 1,
                    size: Decimal::from_str_exact(size).unwrap(),
                    price: Decimal::from_str_exact(price).unwrap(),
                    is_taker_ask,
                    maker_fee: 2,
                    taker_fee: 45,
                    funding_payment: None,
                }),
                l2_transfer_pubdata_v2: None,
            }),
        }
    }

    #[test]
    fn from_entry_reduces_payload() {
        let entry = trade_entry("2025-03-14T09:26:53Z", "0.5", "64000", 1);
        let trade = Trade::from_entry(&entry).unwrap();
        assert_eq!(trade.market, MarketId::new(1));
        assert_eq!(trade.side, Side::Sell);
        assert_eq!(trade.epoch_secs, 1741944413);
        assert_eq!(trade.tx_hash.as_deref(), Some("0xdeadbeef"));
    }

    #[test]
    fn from_entry_rejects_zero_size() {
        let entry = trade_entry("2025-03-14T09:26:53Z", "0", "64000", 0);
        assert!(Trade::from_entry(&entry).is_none());
    }

    #[test]
    fn from_entry_rejects_negative_price() {
        let entry = trade_entry("2025-03-14T09:26:53Z", "1", "-5", 0);
        assert!(Trade::from_entry(&entry).is_none());
    }

    #[test]
    fn from_entry_rejects_malformed_timestamp() {
        let entry = trade_entry("not-a-timestamp", "1", "10", 0);
        assert!(Trade::from_entry(&entry).is_none());
    }

    #[test]
    fn notional_and_fee() {
        let entry = trade_entry("2025-03-14T09:26:53Z", "0.5", "64000", 1);
        let trade = Trade::from_entry(&entry).unwrap();
        assert_eq!(trade.notional(), Decimal::from_i64(32_000));
        // 32_000 * (2 + 45) / 10_000 = 150.4
        assert_eq!(trade.fee(), Decimal::from_str_exact("150.4").unwrap());
    }
}
