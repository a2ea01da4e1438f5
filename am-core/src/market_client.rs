use am_domain::{CityId, FeedRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use itertools::Itertools;
use mockall::automock;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;

/// Source of raw market quotes.
#[automock]
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    async fn get_price_records(&self, item_ids: &[String], locations: &[CityId]) -> Result<Vec<FeedRecord>>;
}

/// Client for the Albion Online Data Project API.
#[derive(Debug, Clone)]
pub struct AlbionDataClient {
    pub client: ClientWithMiddleware,
    pub base_url: String,
}

impl AlbionDataClient {
    pub fn new(client: ClientWithMiddleware, base_url: String) -> Self {
        AlbionDataClient { client, base_url }
    }

    pub fn prices_url(&self, item_ids: &[String]) -> String {
        prices_url(&self.base_url, item_ids)
    }

    async fn make_api_call<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let resp = request.send().await.context("Failed to send request")?;

        let status = resp.status();
        let body = resp.text().await.context("Failed to get response body")?;

        if !status.is_success() {
            anyhow::bail!("API request failed. Status: {}, Body: {}", status, body);
        }

        let deserializer = &mut serde_json::Deserializer::from_str(&body);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            anyhow::anyhow!(
                "Error decoding response at '{}': '{}'. Response body was: '{}'",
                e.path(),
                e.inner(),
                body
            )
        })
    }
}

pub fn prices_url(base_url: &str, item_ids: &[String]) -> String {
    format!("{}/api/v2/stats/prices/{}.json", base_url.trim_end_matches('/'), item_ids.iter().join(","))
}

#[async_trait]
impl MarketDataClient for AlbionDataClient {
    async fn get_price_records(&self, item_ids: &[String], locations: &[CityId]) -> Result<Vec<FeedRecord>> {
        let locations = locations.iter().map(|city| city.0.as_str()).join(",");

        Self::make_api_call(
            self.client
                .get(self.prices_url(item_ids))
                .query(&[("locations", locations)]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_url_joins_item_ids() {
        let item_ids = vec!["T4_ORE".to_string(), "T4_METALBAR".to_string()];

        assert_eq!(
            prices_url("https://west.albion-online-data.com", &item_ids),
            "https://west.albion-online-data.com/api/v2/stats/prices/T4_ORE,T4_METALBAR.json"
        );
        assert_eq!(
            prices_url("http://localhost:8080/", &item_ids),
            "http://localhost:8080/api/v2/stats/prices/T4_ORE,T4_METALBAR.json"
        );
    }
}
