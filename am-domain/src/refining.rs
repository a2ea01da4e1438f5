use crate::{validate_quantity, validate_return_rate, validate_station_fee, Catalog, CityId, EngineError, MultiTierPriceTable, ResourceId, TierId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inputs per unit of refined output, before the return rate is applied.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefiningRecipe {
    pub raw_needed: u32,
    pub prev_refined_needed: u32,
}

impl RefiningRecipe {
    /// Tier 2 is made from raw material only, every other tier also consumes one refined unit
    /// of the tier below.
    pub fn for_tier_level(level: u32) -> Self {
        if level == 2 {
            RefiningRecipe {
                raw_needed: 1,
                prev_refined_needed: 0,
            }
        } else {
            RefiningRecipe {
                raw_needed: 2,
                prev_refined_needed: 1,
            }
        }
    }

    pub fn needs_previous_tier(&self) -> bool {
        self.prev_refined_needed > 0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RefiningRequest {
    pub resource: ResourceId,
    pub tier: TierId,
    pub city: CityId,
    pub quantity: u32,
    pub use_focus: bool,
    pub station_fee_percent: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RefiningResult {
    pub recipe: RefiningRecipe,
    pub previous_tier: Option<TierId>,
    pub has_city_bonus: bool,
    pub return_rate: f64,
    pub return_multiplier: f64,

    pub raw_price: u64,
    pub previous_refined_price: u64,
    pub refined_sell_price: u64,

    /// rounded up, partial units can't be bought
    pub raw_materials_needed: u64,
    pub prev_refined_needed: u64,

    pub material_cost_per_unit: f64,
    pub station_fee_per_unit: f64,
    pub total_cost_per_unit: f64,
    pub profit_per_unit: f64,
    pub profit_percent: f64,

    pub quantity: u32,
    pub total_material_cost: f64,
    pub total_station_fee: f64,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
}

/// A return rate of `r` percent stretches every input unit by `1 / (1 - r/100)`.
pub fn return_multiplier(return_rate_percent: f64) -> f64 {
    1.0 / (1.0 - return_rate_percent / 100.0)
}

/// Cost, revenue and profit of refining `request.quantity` units in `request.city`.
///
/// Returns `Ok(None)` if one of the needed prices is missing (0), including the refined price of
/// the previous tier when the recipe consumes it. Unknown identifiers and out of range
/// quantity/fee are errors.
pub fn compute_refining(catalog: &Catalog, request: &RefiningRequest, prices: &MultiTierPriceTable) -> Result<Option<RefiningResult>, EngineError> {
    let resource = catalog.require_resource(&request.resource)?;
    let tier = catalog.require_tier(&request.tier)?;
    catalog.require_city(&request.city)?;
    let quantity = validate_quantity(request.quantity)?;
    let station_fee_percent = validate_station_fee(request.station_fee_percent)?;

    let recipe = RefiningRecipe::for_tier_level(tier.level);
    let previous_tier = if recipe.needs_previous_tier() {
        catalog.previous_tier_id(tier)
    } else {
        None
    };

    let has_city_bonus = catalog.bonus_resource(&request.city) == Some(&resource.id);
    let return_rate = validate_return_rate(catalog.return_rates.rate(request.use_focus, has_city_bonus))?;
    let return_multiplier = return_multiplier(return_rate);

    let current_quote = prices.get_table(&resource.id, &tier.id).and_then(|table| table.get(&request.city));
    let raw_price = current_quote.map_or(0, |quote| quote.raw_sell);
    let refined_sell_price = current_quote.map_or(0, |quote| quote.refined_sell);
    let previous_refined_price = previous_tier
        .as_ref()
        .and_then(|previous| prices.get_table(&resource.id, previous))
        .and_then(|table| table.get(&request.city))
        .map_or(0, |quote| quote.refined_sell);

    if raw_price == 0 || refined_sell_price == 0 || (recipe.needs_previous_tier() && previous_refined_price == 0) {
        debug!(
            "Insufficient price data to refine {}-{} in {}: raw {}, refined {}, previous refined {}",
            resource.id, tier.id, request.city, raw_price, refined_sell_price, previous_refined_price
        );
        return Ok(None);
    }

    let effective_raw_per_unit = recipe.raw_needed as f64 / return_multiplier;
    let effective_prev_refined_per_unit = recipe.prev_refined_needed as f64 / return_multiplier;

    let material_cost_per_unit = effective_raw_per_unit * raw_price as f64 + effective_prev_refined_per_unit * previous_refined_price as f64;
    let station_fee_per_unit = material_cost_per_unit * station_fee_percent / 100.0;
    let total_cost_per_unit = material_cost_per_unit + station_fee_per_unit;
    let profit_per_unit = refined_sell_price as f64 - total_cost_per_unit;
    let profit_percent = if total_cost_per_unit > 0.0 {
        profit_per_unit / total_cost_per_unit * 100.0
    } else {
        0.0
    };

    let quantity_f = quantity as f64;
    let raw_materials_needed = (recipe.raw_needed as f64 * quantity_f / return_multiplier).ceil() as u64;
    let prev_refined_needed = (recipe.prev_refined_needed as f64 * quantity_f / return_multiplier).ceil() as u64;

    Ok(Some(RefiningResult {
        recipe,
        previous_tier,
        has_city_bonus,
        return_rate,
        return_multiplier,
        raw_price,
        previous_refined_price,
        refined_sell_price,
        raw_materials_needed,
        prev_refined_needed,
        material_cost_per_unit,
        station_fee_per_unit,
        total_cost_per_unit,
        profit_per_unit,
        profit_percent,
        quantity,
        total_material_cost: material_cost_per_unit * quantity_f,
        total_station_fee: station_fee_per_unit * quantity_f,
        total_cost: total_cost_per_unit * quantity_f,
        total_revenue: refined_sell_price as f64 * quantity_f,
        total_profit: profit_per_unit * quantity_f,
    }))
}
