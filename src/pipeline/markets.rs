//! Per-market aggregation of accepted trades into buy/sell lots.

use crate::domain::{Decimal, MarketId, Trade};
use std::collections::{HashMap, VecDeque};

/// A trade reduced to the fields FIFO matching needs. `size` shrinks as the
/// lot is consumed; everything else is fixed at aggregation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Lot {
    pub size: Decimal,
    pub price: Decimal,
    pub fee: Decimal,
    pub epoch_secs: i64,
}

impl Lot {
    fn from_trade(trade: &Trade) -> Lot {
        Lot {
            size: trade.size,
            price: trade.price,
            fee: trade.fee(),
            epoch_secs: trade.epoch_secs,
        }
    }
}

/// Accumulated state for one market: lots in arrival order plus totals.
#[derive(Debug, Clone)]
pub struct MarketStats {
    pub market: MarketId,
    pub symbol: String,
    /// Buy lots, head = oldest unconsumed inventory.
    pub buys: VecDeque<Lot>,
    /// Sell lots in chronological arrival order.
    pub sells: Vec<Lot>,
    pub total_fees: Decimal,
    pub total_volume: Decimal,
    pub trade_count: u64,
}

impl MarketStats {
    fn new(market: MarketId) -> Self {
        MarketStats {
            market,
            symbol: market_symbol(market),
            buys: VecDeque::new(),
            sells: Vec::new(),
            total_fees: Decimal::zero(),
            total_volume: Decimal::zero(),
            trade_count: 0,
        }
    }
}

/// Group trades by market, splitting buy and sell lots and accumulating
/// fee and notional totals.
pub fn aggregate(trades: &[Trade]) -> Vec<MarketStats> {
    let mut by_market: HashMap<MarketId, MarketStats> = HashMap::new();
    let mut order: Vec<MarketId> = Vec::new();

    for trade in trades {
        let stats = by_market.entry(trade.market).or_insert_with(|| {
            order.push(trade.market);
            MarketStats::new(trade.market)
        });

        let lot = Lot::from_trade(trade);
        stats.total_volume += trade.notional();
        stats.total_fees += lot.fee;
        stats.trade_count += 1;

        if trade.side.is_sell() {
            stats.sells.push(lot);
        } else {
            stats.buys.push_back(lot);
        }
    }

    // First-appearance order keeps the aggregation deterministic; the
    // report sorts by volume later.
    order
        .into_iter()
        .filter_map(|market| by_market.remove(&market))
        .collect()
}

/// Fixed market-index to symbol table for the exchange's perp markets.
/// Configuration data, not logic; unmapped ids get a synthetic label.
pub fn market_symbol(market: MarketId) -> String {
    let known = match market.as_u32() {
        0 => "ETH",
        1 => "BTC",
        2 => "SOL",
        3 => "DOGE",
        4 => "1000PEPE",
        5 => "WIF",
        6 => "WLD",
        7 => "XRP",
        8 => "LINK",
        9 => "AVAX",
        10 => "NEAR",
        11 => "DOT",
        12 => "TON",
        13 => "TAO",
        14 => "POL",
        15 => "TRUMP",
        _ => return format!("MARKET_{}", market.as_u32()),
    };
    known.to_string()
}
