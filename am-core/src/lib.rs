pub mod catalog_loader;
pub mod configuration;
pub mod market_client;
pub mod price_fetcher;
pub mod reqwest_helpers;
