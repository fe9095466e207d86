//! Raw wire types for the explorer's transaction log.
//!
//! A `LogEntry` is one record as returned by
//! `GET /accounts/{id}/logs`, kept immutable once fetched. The ledger is
//! inconsistent about numeric encodings (sizes and prices arrive as either
//! JSON numbers or strings depending on the transaction type), so the trade
//! payload uses a tolerant decimal deserializer.

use crate::domain::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One raw ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO-8601 timestamp string, e.g. "2025-03-14T09:26:53Z".
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub tx_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubdata: Option<Pubdata>,
}

/// Variant payload attached to an entry. Both members absent for plain
/// administrative transactions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pubdata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_pubdata: Option<TradePubdata>,
    /// Transfer payload kept structural: its schema varies across transfer
    /// transaction types and only a few fields are ever read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2_transfer_pubdata_v2: Option<Value>,
}

/// Trade execution payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePubdata {
    #[serde(default)]
    pub market_index: u32,
    #[serde(default = "Decimal::zero", deserialize_with = "decimal_flexible")]
    pub size: Decimal,
    #[serde(default = "Decimal::zero", deserialize_with = "decimal_flexible")]
    pub price: Decimal,
    /// 1 when the taker was on the ask side (the account sold).
    #[serde(default, deserialize_with = "int_flexible")]
    pub is_taker_ask: i64,
    /// Fee rates in hundredths of a basis point (divide notional by 10_000).
    #[serde(default)]
    pub maker_fee: i64,
    #[serde(default)]
    pub taker_fee: i64,
    #[serde(
        default,
        deserialize_with = "optional_decimal_flexible",
        skip_serializing_if = "Option::is_none"
    )]
    pub funding_payment: Option<Decimal>,
}

impl LogEntry {
    pub fn trade_pubdata(&self) -> Option<&TradePubdata> {
        self.pubdata.as_ref()?.trade_pubdata.as_ref()
    }

    pub fn transfer_pubdata(&self) -> Option<&Value> {
        self.pubdata.as_ref()?.l2_transfer_pubdata_v2.as_ref()
    }
}

fn decimal_from_value<E: de::Error>(v: Value) -> Result<Decimal, E> {
    match v {
        Value::String(s) => Decimal::from_str_exact(s.trim()).map_err(E::custom),
        Value::Number(n) => Decimal::from_str_exact(&n.to_string()).map_err(E::custom),
        Value::Null => Ok(Decimal::zero()),
        other => Err(E::custom(format!("expected decimal, got {}", other))),
    }
}

fn decimal_flexible<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    decimal_from_value(v)
}

fn optional_decimal_flexible<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    match v {
        Value::Null => Ok(None),
        other => decimal_from_value(other).map(Some),
    }
}

fn int_flexible<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    match v {
        Value::Bool(b) => Ok(i64::from(b)),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| de::Error::custom("expected integer flag")),
        Value::Null => Ok(0),
        other => Err(de::Error::custom(format!(
            "expected integer flag, got {}",
            other
        ))),
    }
}
