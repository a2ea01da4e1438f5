use crate::{validate_quantity, CityId, EngineError, GoodState, MultiTierPriceTable, PriceTable, ResourceId, TierId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use strum::IntoEnumIterator;

/// Buy a good in one city and dispose of it in another.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TradeRoute {
    pub resource: ResourceId,
    pub tier: TierId,
    pub buy_city: CityId,
    pub sell_city: CityId,
    pub good_state: GoodState,
    /// lowest ask in `buy_city`
    pub acquisition_price: u64,
    /// highest bid in `sell_city`
    pub disposal_price: u64,
    pub profit_per_unit: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RouteEvaluation {
    pub buy_city: CityId,
    pub sell_city: CityId,
    pub good_state: GoodState,
    pub quantity: u32,
    pub unit_buy_price: u64,
    pub unit_sell_price: u64,
    pub total_cost: u64,
    pub total_revenue: u64,
    pub profit: i64,
    /// 0.0 when `total_cost` is 0
    pub profit_percent: f64,
}

/// All routes between distinct cities with data on both ends, in iteration order:
/// buy city, then sell city (both in catalog order), then raw before refined.
pub fn route_candidates(table: &PriceTable) -> Vec<TradeRoute> {
    let entries = table.entries();

    entries
        .iter()
        .cartesian_product(entries.iter())
        .filter(|(buy, sell)| buy.city != sell.city)
        .flat_map(|(buy, sell)| {
            GoodState::iter().filter_map(move |good_state| {
                let acquisition_price = buy.quote.sell_price(good_state);
                let disposal_price = sell.quote.buy_price(good_state);
                if acquisition_price == 0 || disposal_price == 0 {
                    return None;
                }
                let profit_per_unit = i64::try_from(disposal_price as i128 - acquisition_price as i128).ok()?;
                Some(TradeRoute {
                    resource: table.resource.clone(),
                    tier: table.tier.clone(),
                    buy_city: buy.city.clone(),
                    sell_city: sell.city.clone(),
                    good_state,
                    acquisition_price,
                    disposal_price,
                    profit_per_unit,
                })
            })
        })
        .collect_vec()
}

/// Profitable routes, most profitable first. Equal profits keep their iteration order.
pub fn find_trading_opportunities(table: &PriceTable) -> Vec<TradeRoute> {
    rank_profitable(route_candidates(table))
}

pub fn find_trading_opportunities_across_tiers(prices: &MultiTierPriceTable) -> Vec<TradeRoute> {
    rank_profitable(prices.tables().iter().flat_map(route_candidates).collect_vec())
}

/// The single most profitable route, `None` if no route makes a strictly positive profit.
pub fn best_route(table: &PriceTable) -> Option<TradeRoute> {
    find_trading_opportunities(table).into_iter().next()
}

pub fn best_route_across_tiers(prices: &MultiTierPriceTable) -> Option<TradeRoute> {
    find_trading_opportunities_across_tiers(prices).into_iter().next()
}

fn rank_profitable(candidates: Vec<TradeRoute>) -> Vec<TradeRoute> {
    candidates
        .into_iter()
        .filter(|route| route.profit_per_unit > 0)
        .sorted_by_key(|route| Reverse(route.profit_per_unit))
        .collect_vec()
}

pub fn evaluate_route(
    table: &PriceTable,
    buy_city: &CityId,
    sell_city: &CityId,
    good_state: GoodState,
    quantity: u32,
) -> Result<Option<RouteEvaluation>, EngineError> {
    let quantity = validate_quantity(quantity)?;
    let buy_quote = table.get(buy_city).ok_or_else(|| EngineError::UnknownCity(buy_city.clone()))?;
    let sell_quote = table.get(sell_city).ok_or_else(|| EngineError::UnknownCity(sell_city.clone()))?;

    let unit_buy_price = buy_quote.sell_price(good_state);
    let unit_sell_price = sell_quote.buy_price(good_state);
    if unit_buy_price == 0 || unit_sell_price == 0 {
        return Ok(None);
    }

    let total_cost = unit_buy_price.checked_mul(quantity as u64).ok_or(EngineError::AmountOverflow)?;
    let total_revenue = unit_sell_price.checked_mul(quantity as u64).ok_or(EngineError::AmountOverflow)?;
    let profit = i64::try_from(total_revenue as i128 - total_cost as i128).map_err(|_| EngineError::AmountOverflow)?;
    let profit_percent = if total_cost == 0 {
        0.0
    } else {
        profit as f64 / total_cost as f64 * 100.0
    };

    Ok(Some(RouteEvaluation {
        buy_city: buy_city.clone(),
        sell_city: sell_city.clone(),
        good_state,
        quantity,
        unit_buy_price,
        unit_sell_price,
        total_cost,
        total_revenue,
        profit,
        profit_percent,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_objects::TestObjects;
    use crate::PriceQuote;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn city(name: &str) -> CityId {
        CityId(name.to_string())
    }

    fn random_table(rng: &mut StdRng, tier: &str) -> PriceTable {
        let quotes = TestObjects::catalog()
            .cities
            .iter()
            .map(|c| {
                let mut price = || if rng.gen_bool(0.25) { 0 } else { rng.gen_range(1..500) };
                let quote = PriceQuote {
                    raw_sell: price(),
                    raw_buy: price(),
                    refined_sell: price(),
                    refined_buy: price(),
                    ..Default::default()
                };
                (c.id.0.as_str(), quote)
            })
            .collect();
        TestObjects::price_table("ORE", tier, quotes)
    }

    #[test]
    fn best_route_buys_at_lowest_ask_and_sells_at_highest_bid() {
        let table = TestObjects::price_table(
            "ORE",
            "T4",
            vec![
                ("Caerleon", TestObjects::quote(100, 90, 400, 380)),
                ("Bridgewatch", TestObjects::quote(60, 55, 420, 500)),
                ("Martlock", TestObjects::quote(110, 140, 450, 430)),
            ],
        );

        let route = best_route(&table).unwrap();

        assert_eq!(
            route,
            TradeRoute {
                resource: ResourceId("ORE".to_string()),
                tier: TierId("T4".to_string()),
                buy_city: city("Caerleon"),
                sell_city: city("Bridgewatch"),
                good_state: GoodState::Refined,
                acquisition_price: 400,
                disposal_price: 500,
                profit_per_unit: 100,
            }
        );
    }

    #[test]
    fn no_route_when_nothing_is_strictly_profitable() {
        let table = TestObjects::price_table(
            "ORE",
            "T4",
            vec![
                ("Caerleon", TestObjects::quote(100, 100, 0, 0)),
                ("Bridgewatch", TestObjects::quote(100, 100, 0, 0)),
            ],
        );

        assert_eq!(best_route(&table), None);
        assert!(find_trading_opportunities(&table).is_empty());
    }

    #[test]
    fn same_city_is_never_a_route() {
        let table = TestObjects::price_table("ORE", "T4", vec![("Lymhurst", TestObjects::quote(10, 1_000, 0, 0))]);

        assert_eq!(best_route(&table), None);
    }

    #[test]
    fn ties_go_to_the_first_pair_in_catalog_order() {
        let table = TestObjects::price_table(
            "ORE",
            "T4",
            vec![
                ("Thetford", TestObjects::quote(10, 60, 10, 60)),
                ("Martlock", TestObjects::quote(10, 60, 10, 60)),
            ],
        );

        let route = best_route(&table).unwrap();

        assert_eq!(route.buy_city, city("Martlock"));
        assert_eq!(route.sell_city, city("Thetford"));
        assert_eq!(route.good_state, GoodState::Raw);
        assert_eq!(route.profit_per_unit, 50);
    }

    #[test]
    fn best_route_across_tiers_looks_at_every_tier() {
        let t4 = TestObjects::price_table(
            "ORE",
            "T4",
            vec![("Caerleon", TestObjects::quote(10, 20, 0, 0)), ("Lymhurst", TestObjects::quote(15, 30, 0, 0))],
        );
        let t5 = TestObjects::price_table(
            "ORE",
            "T5",
            vec![("Caerleon", TestObjects::quote(100, 90, 0, 0)), ("Lymhurst", TestObjects::quote(150, 300, 0, 0))],
        );
        let prices = MultiTierPriceTable::from_tables(vec![t4, t5]);

        let route = best_route_across_tiers(&prices).unwrap();

        assert_eq!(route.tier, TierId("T5".to_string()));
        assert_eq!(route.buy_city, city("Caerleon"));
        assert_eq!(route.sell_city, city("Lymhurst"));
        assert_eq!(route.profit_per_unit, 200);
    }

    #[test]
    fn evaluate_route_scales_by_quantity() {
        let table = TestObjects::price_table(
            "ORE",
            "T4",
            vec![("Caerleon", TestObjects::quote(100, 90, 0, 0)), ("Martlock", TestObjects::quote(130, 125, 0, 0))],
        );

        let evaluation = evaluate_route(&table, &city("Caerleon"), &city("Martlock"), GoodState::Raw, 100).unwrap().unwrap();

        assert_eq!(evaluation.unit_buy_price, 100);
        assert_eq!(evaluation.unit_sell_price, 125);
        assert_eq!(evaluation.total_cost, 10_000);
        assert_eq!(evaluation.total_revenue, 12_500);
        assert_eq!(evaluation.profit, 2_500);
        assert!((evaluation.profit_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn evaluate_route_reports_losses() {
        let table = TestObjects::price_table(
            "ORE",
            "T4",
            vec![("Caerleon", TestObjects::quote(200, 90, 0, 0)), ("Martlock", TestObjects::quote(130, 150, 0, 0))],
        );

        let evaluation = evaluate_route(&table, &city("Caerleon"), &city("Martlock"), GoodState::Raw, 2).unwrap().unwrap();

        assert_eq!(evaluation.profit, -100);
        assert!((evaluation.profit_percent + 25.0).abs() < 1e-9);
    }

    #[test]
    fn evaluate_route_without_prices_is_no_result() {
        let table = TestObjects::price_table("ORE", "T4", vec![("Caerleon", TestObjects::quote(200, 90, 0, 0))]);

        assert_eq!(evaluate_route(&table, &city("Caerleon"), &city("Martlock"), GoodState::Raw, 1), Ok(None));
        assert_eq!(evaluate_route(&table, &city("Caerleon"), &city("Caerleon"), GoodState::Refined, 1), Ok(None));
    }

    #[test]
    fn evaluate_route_rejects_invalid_input() {
        let table = TestObjects::price_table("ORE", "T4", vec![]);

        assert_eq!(
            evaluate_route(&table, &city("Atlantis"), &city("Martlock"), GoodState::Raw, 1),
            Err(EngineError::UnknownCity(city("Atlantis")))
        );
        assert_eq!(
            evaluate_route(&table, &city("Caerleon"), &city("Martlock"), GoodState::Raw, 0),
            Err(EngineError::InvalidQuantity)
        );
    }

    #[test]
    fn evaluate_route_handles_huge_amounts_without_panicking() {
        let table = TestObjects::price_table(
            "ORE",
            "T4",
            vec![
                ("Caerleon", TestObjects::quote(2_000_000_000, 0, 5_000_000_000, 0)),
                ("Martlock", TestObjects::quote(0, 3_000_000_000, 0, 6_000_000_000)),
            ],
        );

        let evaluation = evaluate_route(&table, &city("Caerleon"), &city("Martlock"), GoodState::Raw, u32::MAX).unwrap().unwrap();
        assert_eq!(evaluation.total_cost, 2_000_000_000 * u32::MAX as u64);
        assert_eq!(evaluation.total_revenue, 3_000_000_000 * u32::MAX as u64);
        assert_eq!(evaluation.profit, 1_000_000_000 * u32::MAX as i64);

        assert_eq!(
            evaluate_route(&table, &city("Caerleon"), &city("Martlock"), GoodState::Refined, u32::MAX),
            Err(EngineError::AmountOverflow)
        );
    }

    #[test]
    fn routes_with_prices_beyond_i64_are_skipped() {
        let table = TestObjects::price_table(
            "ORE",
            "T4",
            vec![
                ("Caerleon", TestObjects::quote(1, 0, 0, 0)),
                ("Martlock", TestObjects::quote(0, u64::MAX, 0, 0)),
                ("Thetford", TestObjects::quote(0, 50, 0, 0)),
            ],
        );

        let routes = find_trading_opportunities(&table);

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].sell_city, city("Thetford"));
        assert_eq!(routes[0].profit_per_unit, 49);
    }

    #[test]
    fn best_route_is_sound_on_random_tables() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let table = random_table(&mut rng, "T4");
            let best = best_route(&table);

            let mut max_profit: Option<i64> = None;
            for buy in table.entries() {
                for sell in table.entries().iter().filter(|sell| sell.city != buy.city) {
                    for good_state in GoodState::iter() {
                        if let Some(evaluation) = evaluate_route(&table, &buy.city, &sell.city, good_state, 1).unwrap() {
                            max_profit = max_profit.max(Some(evaluation.profit));
                        }
                    }
                }
            }

            match best {
                Some(route) => {
                    let evaluation = evaluate_route(&table, &route.buy_city, &route.sell_city, route.good_state, 1).unwrap().unwrap();
                    assert_eq!(route.profit_per_unit, evaluation.profit);
                    assert_eq!(Some(route.profit_per_unit), max_profit);
                    assert!(route.profit_per_unit > 0);
                }
                None => assert!(max_profit.map_or(true, |profit| profit <= 0)),
            }
        }
    }

    #[test]
    fn opportunities_are_sorted_by_profit() {
        let mut rng = StdRng::seed_from_u64(7);
        let prices = MultiTierPriceTable::from_tables(vec![random_table(&mut rng, "T4"), random_table(&mut rng, "T5")]);

        let opportunities = find_trading_opportunities_across_tiers(&prices);

        assert!(opportunities.iter().all(|route| route.profit_per_unit > 0));
        assert!(opportunities.windows(2).all(|pair| pair[0].profit_per_unit >= pair[1].profit_per_unit));
        assert_eq!(opportunities.first(), best_route_across_tiers(&prices).as_ref());
    }
}
