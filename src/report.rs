use am_core::price_fetcher::FailedTierFetch;
use am_domain::{BestPriceSummary, BestPrices, Catalog, CityPrice, PriceTable, RefiningRequest, RefiningResult, RouteEvaluation, TradeRoute};
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use itertools::Itertools;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .force_no_tty()
        .enforce_styling()
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// 0 means "no data"
fn format_price(price: u64) -> String {
    if price == 0 {
        "-".to_string()
    } else {
        price.to_string()
    }
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d %H:%M").to_string()).unwrap_or("-".to_string())
}

fn format_city_price(city_price: &Option<CityPrice>) -> String {
    city_price
        .as_ref()
        .map(|cp| format!("{} ({})", cp.city, cp.price))
        .unwrap_or("-".to_string())
}

pub fn render_price_table(table: &PriceTable) -> String {
    let mut out = new_table(vec![
        "City",
        "Raw Sell",
        "Raw Buy",
        "Refined Sell",
        "Refined Buy",
        "Last Update",
    ]);

    for entry in table.entries() {
        let quote = &entry.quote;
        let last_update = [quote.raw_sell_date, quote.raw_buy_date, quote.refined_sell_date, quote.refined_buy_date]
            .into_iter()
            .flatten()
            .max();

        out.add_row(vec![
            entry.city.0.as_str(),
            format_price(quote.raw_sell).as_str(),
            format_price(quote.raw_buy).as_str(),
            format_price(quote.refined_sell).as_str(),
            format_price(quote.refined_buy).as_str(),
            format_date(last_update).as_str(),
        ]);
    }

    format!("Prices {}\n{}", table.key(), out)
}

pub fn render_best_prices(summary: &BestPriceSummary) -> String {
    let mut out = new_table(vec!["Good", "Best to buy at", "Best to sell at"]);

    for BestPrices {
        good_state,
        best_to_buy_at,
        best_to_sell_at,
    } in [&summary.raw, &summary.refined]
    {
        out.add_row(vec![
            good_state.to_string().as_str(),
            format_city_price(best_to_buy_at).as_str(),
            format_city_price(best_to_sell_at).as_str(),
        ]);
    }

    out.to_string()
}

pub fn render_routes(routes: &[TradeRoute]) -> String {
    if routes.is_empty() {
        return "No profitable trade route found".to_string();
    }

    let mut out = new_table(vec!["Item", "Good", "Buy in", "Ask", "Sell in", "Bid", "Profit/Unit"]);

    for route in routes {
        out.add_row(vec![
            format!("{}-{}", route.resource, route.tier).as_str(),
            route.good_state.to_string().as_str(),
            route.buy_city.0.as_str(),
            route.acquisition_price.to_string().as_str(),
            route.sell_city.0.as_str(),
            route.disposal_price.to_string().as_str(),
            route.profit_per_unit.to_string().as_str(),
        ]);
    }

    out.to_string()
}

pub fn render_route_evaluation(evaluation: &RouteEvaluation) -> String {
    let mut out = new_table(vec!["", ""]);

    out.add_row(vec!["Route", format!("{} -> {}", evaluation.buy_city, evaluation.sell_city).as_str()]);
    out.add_row(vec!["Good", evaluation.good_state.to_string().as_str()]);
    out.add_row(vec!["Quantity", evaluation.quantity.to_string().as_str()]);
    out.add_row(vec!["Unit buy price", evaluation.unit_buy_price.to_string().as_str()]);
    out.add_row(vec!["Unit sell price", evaluation.unit_sell_price.to_string().as_str()]);
    out.add_row(vec!["Total cost", evaluation.total_cost.to_string().as_str()]);
    out.add_row(vec!["Total revenue", evaluation.total_revenue.to_string().as_str()]);
    out.add_row(vec!["Profit", evaluation.profit.to_string().as_str()]);
    out.add_row(vec!["Profit %", format!("{:.2}", evaluation.profit_percent).as_str()]);

    out.to_string()
}

pub fn render_refining(request: &RefiningRequest, result: &RefiningResult) -> String {
    let mut out = new_table(vec!["", "Per unit", "Total"]);

    let bonus = if result.has_city_bonus { "city bonus" } else { "no city bonus" };
    let focus = if request.use_focus { "focus" } else { "no focus" };

    out.add_row(vec![
        "Return rate".to_string(),
        format!("{:.0}% ({focus}, {bonus})", result.return_rate),
        "".to_string(),
    ]);
    out.add_row(vec![
        "Raw materials".to_string(),
        format!("{} x {}", result.recipe.raw_needed, format_price(result.raw_price)),
        result.raw_materials_needed.to_string(),
    ]);
    if let Some(previous_tier) = &result.previous_tier {
        out.add_row(vec![
            format!("Refined {previous_tier}"),
            format!("{} x {}", result.recipe.prev_refined_needed, format_price(result.previous_refined_price)),
            result.prev_refined_needed.to_string(),
        ]);
    }
    out.add_row(vec![
        "Material cost".to_string(),
        format!("{:.2}", result.material_cost_per_unit),
        format!("{:.2}", result.total_material_cost),
    ]);
    out.add_row(vec![
        format!("Station fee ({}%)", request.station_fee_percent),
        format!("{:.2}", result.station_fee_per_unit),
        format!("{:.2}", result.total_station_fee),
    ]);
    out.add_row(vec![
        "Total cost".to_string(),
        format!("{:.2}", result.total_cost_per_unit),
        format!("{:.2}", result.total_cost),
    ]);
    out.add_row(vec![
        "Revenue".to_string(),
        result.refined_sell_price.to_string(),
        format!("{:.2}", result.total_revenue),
    ]);
    out.add_row(vec![
        "Profit".to_string(),
        format!("{:.2} ({:.2}%)", result.profit_per_unit, result.profit_percent),
        format!("{:.2}", result.total_profit),
    ]);

    format!(
        "Refining {} x {}-{} in {}\n{}",
        result.quantity, request.resource, request.tier, request.city, out
    )
}

pub fn render_failed_tiers(failed_tiers: &[FailedTierFetch]) -> Option<String> {
    if failed_tiers.is_empty() {
        None
    } else {
        Some(format!(
            "No prices for tiers {}",
            failed_tiers.iter().map(|failed| format!("{} ({})", failed.tier, failed.reason)).join(", ")
        ))
    }
}

pub fn render_catalog(catalog: &Catalog) -> String {
    let mut cities = new_table(vec!["City", "Color", "Refining Bonus"]);
    for city in catalog.cities.iter() {
        cities.add_row(vec![
            city.name.as_str(),
            city.color.as_str(),
            catalog.bonus_resource(&city.id).map(|r| r.0.as_str()).unwrap_or("-"),
        ]);
    }

    let mut resources = new_table(vec!["Resource", "Name", "Refined", "Ratio"]);
    for resource in catalog.resources.iter() {
        resources.add_row(vec![
            resource.id.0.as_str(),
            resource.name.as_str(),
            format!("{} ({})", resource.refined_id, resource.refined_name).as_str(),
            resource.ratio.to_string().as_str(),
        ]);
    }

    let tiers = catalog.tiers.iter().map(|t| format!("{} ({})", t.id, t.name)).join(", ");
    let servers = catalog.servers.iter().map(|s| format!("{}: {}", s.id, s.url)).join(", ");
    let [base, city_bonus, focus, focus_city_bonus] = catalog.return_rates.all_rates();

    format!(
        "Cities\n{cities}\n\nResources\n{resources}\n\nTiers: {tiers}\nServers: {servers}\nReturn rates: base {base}%, city bonus {city_bonus}%, focus {focus}%, focus + city bonus {focus_city_bonus}%"
    )
}
