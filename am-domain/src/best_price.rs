use crate::{CityId, GoodState, PriceTable};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CityPrice {
    pub city: CityId,
    pub price: u64,
}

/// Cheapest city to acquire a good and most lucrative city to dispose of it.
/// Both may point to the same city.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BestPrices {
    pub good_state: GoodState,
    pub best_to_buy_at: Option<CityPrice>,
    pub best_to_sell_at: Option<CityPrice>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BestPriceSummary {
    pub raw: BestPrices,
    pub refined: BestPrices,
}

pub fn find_best(table: &PriceTable, good_state: GoodState) -> BestPrices {
    let sell_prices = table.entries().iter().map(|entry| CityPrice {
        city: entry.city.clone(),
        price: entry.quote.sell_price(good_state),
    });
    let buy_prices = table.entries().iter().map(|entry| CityPrice {
        city: entry.city.clone(),
        price: entry.quote.buy_price(good_state),
    });

    BestPrices {
        good_state,
        best_to_buy_at: first_strictly_best(sell_prices, |candidate, best| candidate < best),
        best_to_sell_at: first_strictly_best(buy_prices, |candidate, best| candidate > best),
    }
}

pub fn find_best_all(table: &PriceTable) -> BestPriceSummary {
    BestPriceSummary {
        raw: find_best(table, GoodState::Raw),
        refined: find_best(table, GoodState::Refined),
    }
}

// zero means "no data" and never wins; ties keep the earlier city
fn first_strictly_best(prices: impl Iterator<Item = CityPrice>, is_better: impl Fn(u64, u64) -> bool) -> Option<CityPrice> {
    prices
        .filter(|city_price| city_price.price > 0)
        .fold(None, |best, candidate| match best {
            Some(best) if !is_better(candidate.price, best.price) => Some(best),
            _ => Some(candidate),
        })
}
