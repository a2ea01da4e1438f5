use anyhow::{Context, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use http::Extensions;
use log::{debug, error};
use reqwest::{Client, Request, Response, StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Every request is attempted exactly once. Failures are handled by the caller.
pub fn create_client(requests_per_second: u32, timeout: Duration) -> Result<ClientWithMiddleware> {
    let reqwest_client = Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build http client")?;

    let quota = NonZeroU32::new(requests_per_second).context("requests_per_second must be greater than 0")?;
    let limiter = RateLimiter::direct(Quota::per_second(quota));
    let rate_limiting_middleware = RateLimitingMiddleware { limiter: Arc::new(limiter) };

    Ok(ClientBuilder::new(reqwest_client)
        .with(FeedLoggingMiddleware)
        .with(rate_limiting_middleware)
        .build())
}

struct RateLimitingMiddleware {
    limiter: Arc<DefaultDirectRateLimiter>,
}

#[async_trait::async_trait]
impl Middleware for RateLimitingMiddleware {
    async fn handle(&self, req: Request, extensions: &mut Extensions, next: Next<'_>) -> reqwest_middleware::Result<Response> {
        self.limiter.until_ready().await;
        next.run(req, extensions).await
    }
}

/// Logs every feed request with the items and the number of cities it asked for.
pub struct FeedLoggingMiddleware;

/// `T4_ORE,T4_METALBAR in 6 cities` for a prices url, the plain url for anything else.
pub fn describe_feed_request(url: &Url) -> String {
    let items = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| last.strip_suffix(".json"))
        .filter(|_| url.path().contains("/stats/prices/"));

    match items {
        Some(items) => {
            let city_count = url
                .query_pairs()
                .find(|(key, _)| key == "locations")
                .map_or(0, |(_, locations)| locations.split(',').filter(|city| !city.is_empty()).count());
            format!("{items} in {city_count} cities")
        }
        None => url.to_string(),
    }
}

#[async_trait::async_trait]
impl Middleware for FeedLoggingMiddleware {
    async fn handle(&self, req: Request, extensions: &mut Extensions, next: Next<'_>) -> reqwest_middleware::Result<Response> {
        let start = Instant::now();
        let feed_request = describe_feed_request(req.url());

        let result = next.run(req, extensions).await;

        let duration = start.elapsed();

        match &result {
            Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                debug!("Market feed throttled prices of {} after {:?}", feed_request, duration)
            }
            Ok(resp) if !resp.status().is_success() => {
                error!("Market feed answered {} for prices of {} after {:?}", resp.status(), feed_request, duration)
            }
            Err(e) => {
                error!("Market feed unreachable for prices of {}: {} after {:?}", feed_request, e, duration);
            }
            _ => {
                debug!("Market feed delivered prices of {} in {:?}", feed_request, duration);
            }
        }

        result
    }
}
