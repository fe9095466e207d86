//! Realized PnL per market via strict FIFO lot matching.
//!
//! Each sell lot consumes the oldest remaining buy inventory. A sell that
//! exceeds available inventory keeps its excess unmatched and contributes
//! no PnL for that portion; the report surfaces the unmatched quantity so
//! the limitation is visible instead of silently modeling a short.

use super::markets::MarketStats;
use crate::domain::{Decimal, MarketId};
use rust_decimal::Decimal as RustDecimal;

/// Residual threshold below which a lot counts as fully consumed (1e-4).
fn dust() -> Decimal {
    Decimal::new(RustDecimal::new(1, 4))
}

/// FIFO matching result for one market.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MarketPnl {
    pub market: MarketId,
    pub symbol: String,
    pub realized_pnl: Decimal,
    pub matched_quantity: Decimal,
    /// Sell quantity that found no buy inventory (see module docs).
    pub unmatched_sell_quantity: Decimal,
    pub total_fees: Decimal,
    pub total_volume: Decimal,
    pub trade_count: u64,
}

/// Match every market and return results sorted by descending volume.
pub fn compute_market_pnl(markets: Vec<MarketStats>) -> Vec<MarketPnl> {
    let mut results: Vec<MarketPnl> = markets.into_iter().map(match_market).collect();
    results.sort_by(|a, b| b.total_volume.cmp(&a.total_volume));
    results
}

fn match_market(mut stats: MarketStats) -> MarketPnl {
    let threshold = dust();
    let mut realized_pnl = Decimal::zero();
    let mut matched_quantity = Decimal::zero();
    let mut unmatched_sell_quantity = Decimal::zero();

    for sell in &stats.sells {
        let mut remaining = sell.size;

        while remaining > threshold {
            let Some(buy) = stats.buys.front_mut() else {
                break;
            };

            let matched = remaining.min(buy.size);
            realized_pnl += (sell.price - buy.price) * matched;
            matched_quantity += matched;
            remaining -= matched;
            buy.size -= matched;

            if buy.size <= threshold {
                stats.buys.pop_front();
            }
        }

        if remaining > threshold {
            unmatched_sell_quantity += remaining;
        }
    }

    MarketPnl {
        market: stats.market,
        symbol: stats.symbol,
        realized_pnl,
        matched_quantity,
        unmatched_sell_quantity,
        total_fees: stats.total_fees,
        total_volume: stats.total_volume,
        trade_count: stats.trade_count,
    }
}
