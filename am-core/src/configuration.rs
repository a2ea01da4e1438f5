use crate::catalog_loader::load_catalog;
use am_domain::{Catalog, MarketServer, ServerId};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfiguration {
    /// the market data server; `url` already carries a base url override
    pub server: MarketServer,
    pub requests_per_second: u32,
    pub request_timeout: Duration,
    pub catalog: Catalog,
}

impl AppConfiguration {
    pub fn new(
        server_id: &ServerId,
        base_url_override: Option<String>,
        catalog_path: Option<&Path>,
        requests_per_second: u32,
        request_timeout: Duration,
    ) -> Result<Self> {
        let catalog = load_catalog(catalog_path).context("Failed to load catalog")?;

        let mut server = catalog.require_server(server_id)?.clone();
        if let Some(base_url) = base_url_override.filter(|url| !url.trim().is_empty()) {
            server.url = base_url;
        }

        anyhow::ensure!(requests_per_second > 0, "requests per second must be greater than 0");

        Ok(Self {
            server,
            requests_per_second,
            request_timeout,
            catalog,
        })
    }
}
