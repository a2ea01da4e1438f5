use crate::{Catalog, CityQuote, EngineError, FeedRecord, GoodState, PriceQuote, PriceTable, ResourceId, TierId};
use tracing::trace;

/// Turns raw feed records into a `PriceTable` covering exactly the catalog's cities.
///
/// Records for unknown cities or for items other than the raw/refined good of `resource` at
/// `tier` are dropped. If several records hit the same city and item the last one wins.
/// Only an unknown `resource` or `tier` is an error.
pub fn normalize(catalog: &Catalog, records: &[FeedRecord], resource: &ResourceId, tier: &TierId) -> Result<PriceTable, EngineError> {
    let item_ids = catalog.item_ids(resource, tier)?;

    let mut entries: Vec<CityQuote> = catalog
        .cities
        .iter()
        .map(|city| CityQuote {
            city: city.id.clone(),
            quote: PriceQuote::default(),
        })
        .collect();

    for record in records {
        let Some(entry) = entries.iter_mut().find(|entry| entry.city.0 == record.city) else {
            trace!("Dropping record for unknown city '{}' ({})", record.city, record.item_id);
            continue;
        };

        let good_state = if record.item_id == item_ids.raw {
            GoodState::Raw
        } else if record.item_id == item_ids.refined {
            GoodState::Refined
        } else {
            trace!("Dropping record for unrelated item '{}' in {}", record.item_id, record.city);
            continue;
        };

        entry.quote.set_side(good_state, record.sell_side(), record.buy_side());
    }

    Ok(PriceTable::from_entries(resource.clone(), tier.clone(), entries))
}
