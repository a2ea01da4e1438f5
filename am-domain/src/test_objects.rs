use crate::{Catalog, CityId, FeedRecord, MultiTierPriceTable, PriceQuote, PriceTable, ResourceId, TierId, REFERENCE_CATALOG};
use std::collections::HashMap;

pub struct TestObjects;

impl TestObjects {
    pub fn catalog() -> &'static Catalog {
        &REFERENCE_CATALOG
    }

    /// A record with both order books filled, all dates at 2024-05-01T10:00:00.
    pub fn feed_record(item_id: &str, city: &str, sell_price_min: u64, buy_price_max: u64) -> FeedRecord {
        let date = Some("2024-05-01T10:00:00".to_string());
        FeedRecord {
            item_id: item_id.to_string(),
            city: city.to_string(),
            quality: Some(1),
            sell_price_min,
            sell_price_min_date: date.clone(),
            sell_price_max: sell_price_min,
            sell_price_max_date: date.clone(),
            buy_price_min: buy_price_max,
            buy_price_min_date: date.clone(),
            buy_price_max,
            buy_price_max_date: date,
        }
    }

    /// Feed snapshot for T4 ore, shaped like a real response (including a city outside the catalog).
    pub fn ore_t4_feed() -> Vec<FeedRecord> {
        vec![
            Self::feed_record("T4_ORE", "Caerleon", 140, 110),
            Self::feed_record("T4_METALBAR", "Caerleon", 420, 390),
            Self::feed_record("T4_ORE", "Bridgewatch", 95, 80),
            Self::feed_record("T4_METALBAR", "Bridgewatch", 380, 350),
            Self::feed_record("T4_ORE", "Fort Sterling", 0, 0),
            Self::feed_record("T4_METALBAR", "Fort Sterling", 460, 455),
            Self::feed_record("T4_ORE", "Lymhurst", 120, 100),
            Self::feed_record("T4_ORE", "Martlock", 130, 150),
            Self::feed_record("T4_METALBAR", "Martlock", 400, 370),
            Self::feed_record("T4_ORE", "Thetford", 90, 70),
            Self::feed_record("T4_METALBAR", "Thetford", 350, 330),
            Self::feed_record("T4_ORE", "Black Market", 500, 450),
        ]
    }

    pub fn quote(raw_sell: u64, raw_buy: u64, refined_sell: u64, refined_buy: u64) -> PriceQuote {
        PriceQuote {
            raw_sell,
            raw_buy,
            refined_sell,
            refined_buy,
            ..Default::default()
        }
    }

    pub fn price_table(resource: &str, tier: &str, quotes: Vec<(&str, PriceQuote)>) -> PriceTable {
        let quotes: HashMap<CityId, PriceQuote> = quotes.into_iter().map(|(city, quote)| (CityId(city.to_string()), quote)).collect();
        PriceTable::with_quotes(Self::catalog(), &ResourceId(resource.to_string()), &TierId(tier.to_string()), quotes)
    }

    /// ORE prices where T4 refined sells for 300 and T5 raw/refined for 100/900 in every city.
    pub fn ore_refining_prices() -> MultiTierPriceTable {
        let cities = Self::catalog().cities.iter().map(|c| c.id.0.as_str()).collect::<Vec<_>>();

        let t4 = Self::price_table("ORE", "T4", cities.iter().map(|city| (*city, Self::quote(60, 50, 300, 280))).collect());
        let t5 = Self::price_table("ORE", "T5", cities.iter().map(|city| (*city, Self::quote(100, 90, 900, 850))).collect());

        MultiTierPriceTable::from_tables(vec![t4, t5])
    }
}
