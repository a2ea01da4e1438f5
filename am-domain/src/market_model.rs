use crate::Catalog;
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use strum::{Display, EnumIter, EnumString};
use tracing::trace;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct CityId(pub String);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ResourceId(pub String);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct TierId(pub String);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ServerId(pub String);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a quote refers to the harvested good (e.g. ore) or its refined product (e.g. metal bars).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GoodState {
    Raw,
    Refined,
}

/// One entry of the `/api/v2/stats/prices` response of the Albion Online Data Project.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FeedRecord {
    pub item_id: String,
    pub city: String,
    #[serde(default)]
    pub quality: Option<u8>,
    #[serde(default)]
    pub sell_price_min: u64,
    #[serde(default)]
    pub sell_price_min_date: Option<String>,
    #[serde(default)]
    pub sell_price_max: u64,
    #[serde(default)]
    pub sell_price_max_date: Option<String>,
    #[serde(default)]
    pub buy_price_min: u64,
    #[serde(default)]
    pub buy_price_min_date: Option<String>,
    #[serde(default)]
    pub buy_price_max: u64,
    #[serde(default)]
    pub buy_price_max_date: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PricePoint {
    pub price: u64,
    pub date: Option<DateTime<Utc>>,
}

impl FeedRecord {
    /// Lowest ask. Falls back to the highest bid when the sell order book is empty.
    pub fn sell_side(&self) -> PricePoint {
        if self.sell_price_min > 0 {
            PricePoint {
                price: self.sell_price_min,
                date: parse_feed_timestamp(self.sell_price_min_date.as_deref()),
            }
        } else if self.buy_price_max > 0 {
            PricePoint {
                price: self.buy_price_max,
                date: parse_feed_timestamp(self.buy_price_max_date.as_deref()),
            }
        } else {
            PricePoint::default()
        }
    }

    /// Highest bid, falling back to the lowest bid.
    pub fn buy_side(&self) -> PricePoint {
        if self.buy_price_max > 0 {
            PricePoint {
                price: self.buy_price_max,
                date: parse_feed_timestamp(self.buy_price_max_date.as_deref()),
            }
        } else if self.buy_price_min > 0 {
            PricePoint {
                price: self.buy_price_min,
                date: parse_feed_timestamp(self.buy_price_min_date.as_deref()),
            }
        } else {
            PricePoint::default()
        }
    }
}

/// Parses the timestamps of the feed. The API sends naive UTC timestamps and uses
/// `0001-01-01T00:00:00` for "never seen". Unparsable timestamps are dropped, the price
/// itself is kept.
pub fn parse_feed_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let Some(parsed) = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|naive| naive.and_utc()))
    else {
        trace!("Ignoring unparsable feed timestamp '{}'", raw);
        return None;
    };

    (parsed.year() > 1).then_some(parsed)
}

/// Normalized prices of one resource/tier in one city. A price of 0 means "no data".
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PriceQuote {
    pub raw_sell: u64,
    pub raw_buy: u64,
    pub refined_sell: u64,
    pub refined_buy: u64,
    pub raw_sell_date: Option<DateTime<Utc>>,
    pub raw_buy_date: Option<DateTime<Utc>>,
    pub refined_sell_date: Option<DateTime<Utc>>,
    pub refined_buy_date: Option<DateTime<Utc>>,
}

impl PriceQuote {
    /// Price of the cheapest sell order, i.e. what it costs to acquire one unit.
    pub fn sell_price(&self, good_state: GoodState) -> u64 {
        match good_state {
            GoodState::Raw => self.raw_sell,
            GoodState::Refined => self.refined_sell,
        }
    }

    /// Price of the best buy order, i.e. what one unit can be disposed of for.
    pub fn buy_price(&self, good_state: GoodState) -> u64 {
        match good_state {
            GoodState::Raw => self.raw_buy,
            GoodState::Refined => self.refined_buy,
        }
    }

    pub fn has_data(&self) -> bool {
        self.raw_sell > 0 || self.raw_buy > 0 || self.refined_sell > 0 || self.refined_buy > 0
    }

    pub(crate) fn set_side(&mut self, good_state: GoodState, sell: PricePoint, buy: PricePoint) {
        match good_state {
            GoodState::Raw => {
                self.raw_sell = sell.price;
                self.raw_sell_date = sell.date;
                self.raw_buy = buy.price;
                self.raw_buy_date = buy.date;
            }
            GoodState::Refined => {
                self.refined_sell = sell.price;
                self.refined_sell_date = sell.date;
                self.refined_buy = buy.price;
                self.refined_buy_date = buy.date;
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CityQuote {
    pub city: CityId,
    pub quote: PriceQuote,
}

/// Prices of one resource/tier for every city of the catalog, in catalog order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PriceTable {
    pub resource: ResourceId,
    pub tier: TierId,
    entries: Vec<CityQuote>,
}

impl PriceTable {
    /// All-zero table, used when nothing is known about a resource/tier.
    pub fn empty(catalog: &Catalog, resource: &ResourceId, tier: &TierId) -> Self {
        Self::with_quotes(catalog, resource, tier, HashMap::new())
    }

    /// Builds a complete table. Cities missing from `quotes` get an all-zero quote,
    /// cities unknown to the catalog are ignored.
    pub fn with_quotes(catalog: &Catalog, resource: &ResourceId, tier: &TierId, mut quotes: HashMap<CityId, PriceQuote>) -> Self {
        let entries = catalog
            .cities
            .iter()
            .map(|city| CityQuote {
                city: city.id.clone(),
                quote: quotes.remove(&city.id).unwrap_or_default(),
            })
            .collect();

        Self {
            resource: resource.clone(),
            tier: tier.clone(),
            entries,
        }
    }

    pub(crate) fn from_entries(resource: ResourceId, tier: TierId, entries: Vec<CityQuote>) -> Self {
        Self { resource, tier, entries }
    }

    pub fn key(&self) -> PriceTableKey {
        PriceTableKey {
            resource: self.resource.clone(),
            tier: self.tier.clone(),
        }
    }

    pub fn get(&self, city: &CityId) -> Option<&PriceQuote> {
        self.entries
            .iter()
            .find(|entry| &entry.city == city)
            .map(|entry| &entry.quote)
    }

    pub fn entries(&self) -> &[CityQuote] {
        &self.entries
    }

    pub fn has_any_data(&self) -> bool {
        self.entries.iter().any(|entry| entry.quote.has_data())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct PriceTableKey {
    pub resource: ResourceId,
    pub tier: TierId,
}

impl PriceTableKey {
    pub fn new(resource: &ResourceId, tier: &TierId) -> Self {
        Self {
            resource: resource.clone(),
            tier: tier.clone(),
        }
    }
}

impl fmt::Display for PriceTableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.resource, self.tier)
    }
}

/// Price tables of several tiers, kept in the order they were inserted (catalog tier order).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MultiTierPriceTable {
    tables: Vec<PriceTable>,
}

impl MultiTierPriceTable {
    /// A later table with the same key replaces the earlier one in place.
    pub fn from_tables(tables: impl IntoIterator<Item = PriceTable>) -> Self {
        let mut result = Self::default();
        for table in tables {
            match result.tables.iter_mut().find(|existing| existing.key() == table.key()) {
                Some(existing) => *existing = table,
                None => result.tables.push(table),
            }
        }
        result
    }

    pub fn get(&self, key: &PriceTableKey) -> Option<&PriceTable> {
        self.get_table(&key.resource, &key.tier)
    }

    pub fn get_table(&self, resource: &ResourceId, tier: &TierId) -> Option<&PriceTable> {
        self.tables
            .iter()
            .find(|table| &table.resource == resource && &table.tier == tier)
    }

    pub fn tables(&self) -> &[PriceTable] {
        &self.tables
    }

    pub fn keys(&self) -> Vec<PriceTableKey> {
        self.tables.iter().map(|table| table.key()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_objects::TestObjects;
    use crate::REFERENCE_CATALOG;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn parse_feed_timestamp_accepts_naive_and_offset_timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        assert_eq!(parse_feed_timestamp(Some("2024-05-01T10:00:00")), Some(expected));
        assert_eq!(parse_feed_timestamp(Some("2024-05-01T10:00:00Z")), Some(expected));
        assert_eq!(parse_feed_timestamp(Some("2024-05-01T12:00:00+02:00")), Some(expected));
        assert_eq!(parse_feed_timestamp(Some("2024-05-01T10:00:00.000")), Some(expected));
    }

    #[test]
    fn parse_feed_timestamp_drops_empty_garbage_and_never_sentinel() {
        assert_eq!(parse_feed_timestamp(None), None);
        assert_eq!(parse_feed_timestamp(Some("")), None);
        assert_eq!(parse_feed_timestamp(Some("   ")), None);
        assert_eq!(parse_feed_timestamp(Some("yesterday")), None);
        assert_eq!(parse_feed_timestamp(Some("0001-01-01T00:00:00")), None);
    }

    #[test]
    fn unparsable_timestamp_keeps_the_price() {
        let record = FeedRecord {
            sell_price_min_date: Some("last tuesday".to_string()),
            ..TestObjects::feed_record("T4_ORE", "Lymhurst", 120, 100)
        };

        assert_eq!(record.sell_side(), PricePoint { price: 120, date: None });
    }

    #[test]
    fn sell_side_falls_back_to_highest_bid() {
        let record = FeedRecord {
            item_id: "T4_ORE".to_string(),
            city: "Martlock".to_string(),
            quality: Some(1),
            sell_price_min: 0,
            sell_price_min_date: Some("0001-01-01T00:00:00".to_string()),
            sell_price_max: 0,
            sell_price_max_date: None,
            buy_price_min: 20,
            buy_price_min_date: Some("2024-05-01T09:00:00".to_string()),
            buy_price_max: 35,
            buy_price_max_date: Some("2024-05-01T10:00:00".to_string()),
        };

        let sell = record.sell_side();
        assert_eq!(sell.price, 35);
        assert_eq!(sell.date, Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()));

        let buy = record.buy_side();
        assert_eq!(buy.price, 35);

        let without_any_orders = FeedRecord {
            buy_price_min: 0,
            buy_price_max: 0,
            ..record
        };
        assert_eq!(without_any_orders.sell_side(), PricePoint::default());
        assert_eq!(without_any_orders.buy_side(), PricePoint::default());
    }

    #[test]
    fn feed_record_tolerates_missing_fields() {
        let records: Vec<FeedRecord> = serde_json::from_str(r#"[{"item_id":"T4_ORE","city":"Lymhurst","sell_price_min":42}]"#).unwrap();

        assert_eq!(records[0].sell_price_min, 42);
        assert_eq!(records[0].buy_price_max, 0);
        assert_eq!(records[0].sell_price_min_date, None);
    }

    #[test]
    fn good_state_parses_case_insensitive() {
        assert_eq!(GoodState::from_str("raw").unwrap(), GoodState::Raw);
        assert_eq!(GoodState::from_str("Refined").unwrap(), GoodState::Refined);
        assert!(GoodState::from_str("bars").is_err());
        assert_eq!(GoodState::Refined.to_string(), "refined");
    }

    #[test]
    fn with_quotes_is_complete_over_catalog_and_ignores_unknown_cities() {
        let catalog = &*REFERENCE_CATALOG;
        let quotes = HashMap::from([
            (
                CityId("Lymhurst".to_string()),
                PriceQuote {
                    raw_sell: 10,
                    ..Default::default()
                },
            ),
            (
                CityId("Brecilien".to_string()),
                PriceQuote {
                    raw_sell: 99,
                    ..Default::default()
                },
            ),
        ]);

        let table = PriceTable::with_quotes(catalog, &ResourceId("ORE".to_string()), &TierId("T4".to_string()), quotes);

        let cities: Vec<_> = table.entries().iter().map(|e| e.city.clone()).collect();
        let catalog_cities: Vec<_> = catalog.cities.iter().map(|c| c.id.clone()).collect();
        assert_eq!(cities, catalog_cities);
        assert_eq!(table.get(&CityId("Lymhurst".to_string())).unwrap().raw_sell, 10);
        assert_eq!(table.get(&CityId("Caerleon".to_string())), Some(&PriceQuote::default()));
        assert_eq!(table.get(&CityId("Brecilien".to_string())), None);
    }

    #[test]
    fn multi_tier_table_replaces_tables_with_the_same_key() {
        let catalog = &*REFERENCE_CATALOG;
        let ore = ResourceId("ORE".to_string());
        let t4 = TierId("T4".to_string());
        let t5 = TierId("T5".to_string());

        let updated_t4 = PriceTable::with_quotes(
            catalog,
            &ore,
            &t4,
            HashMap::from([(
                CityId("Thetford".to_string()),
                PriceQuote {
                    raw_sell: 7,
                    ..Default::default()
                },
            )]),
        );

        let multi = MultiTierPriceTable::from_tables(vec![
            PriceTable::empty(catalog, &ore, &t4),
            PriceTable::empty(catalog, &ore, &t5),
            updated_t4.clone(),
        ]);

        assert_eq!(multi.keys(), vec![PriceTableKey::new(&ore, &t4), PriceTableKey::new(&ore, &t5)]);
        assert_eq!(multi.get(&PriceTableKey::new(&ore, &t4)), Some(&updated_t4));
        assert_eq!(PriceTableKey::new(&ore, &t4).to_string(), "ORE-T4");
    }
}
