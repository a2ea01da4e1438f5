use am_domain::GoodState;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// market data server (west, europe or east)
    #[arg(long, env("ALBION_MARKET_SERVER"), default_value = "west", global = true)]
    pub server: String,
    /// overrides the url of the selected server
    #[arg(long, env("ALBION_MARKET_BASE_URL"), global = true)]
    pub base_url: Option<String>,
    /// json file replacing the built-in catalog
    #[arg(long, env("ALBION_MARKET_CATALOG"), global = true)]
    pub catalog: Option<PathBuf>,
    #[arg(long, env("ALBION_MARKET_REQUESTS_PER_SECOND"), default_value_t = 3, global = true)]
    pub requests_per_second: u32,
    #[arg(long, env("ALBION_MARKET_REQUEST_TIMEOUT_SECS"), default_value_t = 30, global = true)]
    pub request_timeout_secs: u64,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// prints the prices of a resource at one tier in all cities
    Prices {
        #[arg(long)]
        resource: String,
        #[arg(long)]
        tier: String,
    },
    /// finds the most profitable trade route, across all tiers unless a tier is given
    BestRoute {
        #[arg(long)]
        resource: String,
        #[arg(long)]
        tier: Option<String>,
    },
    /// evaluates buying in one city and selling in another
    EvaluateRoute {
        #[arg(long)]
        resource: String,
        #[arg(long)]
        tier: String,
        #[arg(long)]
        buy_city: String,
        #[arg(long)]
        sell_city: String,
        #[arg(long, default_value = "raw")]
        good: GoodState,
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        quantity: i64,
    },
    /// calculates the profit of refining a resource in a city
    Refine {
        #[arg(long)]
        resource: String,
        #[arg(long)]
        tier: String,
        #[arg(long)]
        city: String,
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        quantity: i64,
        #[arg(long)]
        focus: bool,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        station_fee: f64,
    },
    /// prints the active catalog
    Catalog,
}
