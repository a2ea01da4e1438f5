use crate::market_client::MarketDataClient;
use am_domain::{normalize, Catalog, MultiTierPriceTable, PriceTable, PriceTableKey, ResourceId, TierId};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{event, trace_span, Instrument, Level};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FailedTierFetch {
    pub tier: TierId,
    pub reason: String,
}

/// Prices of every catalog tier of a resource. Tiers that couldn't be fetched are all-zero
/// tables and listed in `failed_tiers`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MultiTierFetch {
    pub prices: MultiTierPriceTable,
    pub failed_tiers: Vec<FailedTierFetch>,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches the raw and refined item of `resource` at `tier` for all catalog cities.
pub async fn fetch_price_table(client: &dyn MarketDataClient, catalog: &Catalog, resource: &ResourceId, tier: &TierId) -> Result<PriceTable> {
    let item_ids = catalog.item_ids(resource, tier)?;
    let key = PriceTableKey::new(resource, tier);

    let records = client
        .get_price_records(&[item_ids.raw, item_ids.refined], &catalog.city_ids())
        .await
        .with_context(|| format!("Failed to fetch prices for {key}"))?;

    event!(Level::DEBUG, "Received {} price records for {}", records.len(), key);

    Ok(normalize(catalog, &records, resource, tier)?)
}

/// One concurrent request per catalog tier. All requests settle before the result is assembled,
/// a failed tier doesn't affect the others.
pub async fn fetch_all_prices(client: &dyn MarketDataClient, catalog: &Catalog, resource: &ResourceId) -> Result<MultiTierFetch> {
    catalog.require_resource(resource)?;

    let span = trace_span!("fetch_all_prices", resource = %resource);

    async move {
        event!(Level::TRACE, "Start fetching {} tiers", catalog.tiers.len());

        let results = join_all(catalog.tiers.iter().map(|tier| async move {
            let result = fetch_price_table(client, catalog, resource, &tier.id).await;
            (tier, result)
        }))
        .await;

        let mut tables = Vec::with_capacity(results.len());
        let mut failed_tiers = Vec::new();

        for (tier, result) in results {
            match result {
                Ok(table) => tables.push(table),
                Err(err) => {
                    event!(Level::ERROR, "Fetching {} failed, using empty prices: {:#}", PriceTableKey::new(resource, &tier.id), err);
                    failed_tiers.push(FailedTierFetch {
                        tier: tier.id.clone(),
                        reason: format!("{err:#}"),
                    });
                    tables.push(PriceTable::empty(catalog, resource, &tier.id));
                }
            }
        }

        event!(Level::TRACE, "Done fetching. {} of {} tiers failed", failed_tiers.len(), catalog.tiers.len());

        Ok(MultiTierFetch {
            prices: MultiTierPriceTable::from_tables(tables),
            failed_tiers,
            fetched_at: Utc::now(),
        })
    }
    .instrument(span)
    .await
}
