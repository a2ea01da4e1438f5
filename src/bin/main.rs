use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use tracing::{event, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use albion_market::cli_args::{Cli, Commands};
use albion_market::report;
use am_core::configuration::AppConfiguration;
use am_core::market_client::AlbionDataClient;
use am_core::price_fetcher::{fetch_all_prices, fetch_price_table};
use am_core::reqwest_helpers::create_client;
use am_domain::{
    best_route_across_tiers, clamp_quantity, clamp_station_fee, evaluate_route, find_best_all, find_trading_opportunities,
    find_trading_opportunities_across_tiers, CityId, RefiningRequest, ResourceId, ServerId, TierId,
};

const MAX_LISTED_ROUTES: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        server,
        base_url,
        catalog,
        requests_per_second,
        request_timeout_secs,
        command,
    } = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_span_events(fmt::format::FmtSpan::CLOSE))
        .with(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfiguration::new(
        &ServerId(server.to_lowercase()),
        base_url,
        catalog.as_deref(),
        requests_per_second,
        Duration::from_secs(request_timeout_secs),
    )?;

    event!(Level::DEBUG, "Using market data server {} at {}", cfg.server.name, cfg.server.url);

    let client = AlbionDataClient::new(create_client(cfg.requests_per_second, cfg.request_timeout)?, cfg.server.url.clone());

    match command {
        Commands::Prices { resource, tier } => {
            let table = fetch_price_table(&client, &cfg.catalog, &resource_id(&resource), &tier_id(&tier)).await?;

            println!("{}", report::render_price_table(&table));
            println!("{}", report::render_best_prices(&find_best_all(&table)));
        }
        Commands::BestRoute { resource, tier: Some(tier) } => {
            let table = fetch_price_table(&client, &cfg.catalog, &resource_id(&resource), &tier_id(&tier)).await?;
            let routes = find_trading_opportunities(&table).into_iter().take(MAX_LISTED_ROUTES).collect_vec();

            println!("{}", report::render_routes(&routes));
        }
        Commands::BestRoute { resource, tier: None } => {
            let fetch = fetch_all_prices(&client, &cfg.catalog, &resource_id(&resource)).await?;
            if let Some(warning) = report::render_failed_tiers(&fetch.failed_tiers) {
                println!("{warning}");
            }

            let routes = find_trading_opportunities_across_tiers(&fetch.prices)
                .into_iter()
                .take(MAX_LISTED_ROUTES)
                .collect_vec();
            println!("{}", report::render_routes(&routes));

            if let Some(best) = best_route_across_tiers(&fetch.prices) {
                println!(
                    "Best route: {}-{} {} from {} to {} for {} per unit",
                    best.resource, best.tier, best.good_state, best.buy_city, best.sell_city, best.profit_per_unit
                );
            }
        }
        Commands::EvaluateRoute {
            resource,
            tier,
            buy_city,
            sell_city,
            good,
            quantity,
        } => {
            let table = fetch_price_table(&client, &cfg.catalog, &resource_id(&resource), &tier_id(&tier)).await?;

            match evaluate_route(&table, &CityId(buy_city), &CityId(sell_city), good, clamp_quantity(quantity))? {
                Some(evaluation) => println!("{}", report::render_route_evaluation(&evaluation)),
                None => println!("No {good} prices for this route"),
            }
        }
        Commands::Refine {
            resource,
            tier,
            city,
            quantity,
            focus,
            station_fee,
        } => {
            let request = RefiningRequest {
                resource: resource_id(&resource),
                tier: tier_id(&tier),
                city: CityId(city),
                quantity: clamp_quantity(quantity),
                use_focus: focus,
                station_fee_percent: clamp_station_fee(station_fee),
            };

            let fetch = fetch_all_prices(&client, &cfg.catalog, &request.resource).await?;
            if let Some(warning) = report::render_failed_tiers(&fetch.failed_tiers) {
                println!("{warning}");
            }

            let result = am_domain::compute_refining(&cfg.catalog, &request, &fetch.prices).context("Invalid refining request")?;
            match result {
                Some(result) => println!("{}", report::render_refining(&request, &result)),
                None => println!("Missing prices to refine {}-{} in {}", request.resource, request.tier, request.city),
            }
        }
        Commands::Catalog => {
            println!("{}", report::render_catalog(&cfg.catalog));
        }
    }

    Ok(())
}

fn resource_id(input: &str) -> ResourceId {
    ResourceId(input.trim().to_uppercase())
}

fn tier_id(input: &str) -> TierId {
    TierId(input.trim().to_uppercase())
}
