use crate::core::errors::GlobeError;
use crate::core::kernel::RestClient;
use crate::core::types::Resolution;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::instrument;

pub const API_PREFIX: &str = "/api/v1";

/// Thin wrapper around the kernel `RestClient` with Globe-specific endpoints
///
/// Public history endpoints and the positions/account endpoints decode JSON.
/// Open orders and trade history are returned as the raw response body.
#[derive(Debug, Clone)]
pub struct GlobeRestClient<R: RestClient> {
    client: R,
}

impl<R: RestClient> GlobeRestClient<R> {
    pub fn new(client: R) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &R {
        &self.client
    }

    #[instrument(skip(self), fields(exchange = "globe"))]
    pub async fn get_historic_market_rates(
        &self,
        instrument: &str,
        resolution: Resolution,
    ) -> Result<Value, GlobeError> {
        let endpoint = format!(
            "{}/history/{}/candles/{}",
            API_PREFIX,
            instrument,
            resolution.as_str()
        );
        self.client.get(&endpoint, &[], false).await
    }

    #[instrument(skip(self), fields(exchange = "globe"))]
    pub async fn get_historic_index_price_rates(
        &self,
        instrument: &str,
        resolution: Resolution,
    ) -> Result<Value, GlobeError> {
        let endpoint = format!(
            "{}/history/index-price/{}/candles/{}",
            API_PREFIX,
            instrument,
            resolution.as_str()
        );
        self.client.get(&endpoint, &[], false).await
    }

    /// Open orders up to `upto` (millisecond timestamp), raw body
    #[instrument(skip(self), fields(exchange = "globe"))]
    pub async fn get_open_orders(
        &self,
        instrument: &str,
        upto: DateTime<Utc>,
        page_size: u32,
    ) -> Result<String, GlobeError> {
        let upto_timestamp = upto.timestamp_millis().to_string();
        let page_size = page_size.to_string();
        let params = [
            ("instrument", instrument),
            ("upto_timestamp", upto_timestamp.as_str()),
            ("page_size", page_size.as_str()),
        ];
        self.client
            .get_text(&format!("{}/orders/open-orders", API_PREFIX), &params, true)
            .await
    }

    #[instrument(skip(self), fields(exchange = "globe"))]
    pub async fn get_positions(&self) -> Result<Value, GlobeError> {
        self.client
            .get(&format!("{}/positions", API_PREFIX), &[], true)
            .await
    }

    #[instrument(skip(self), fields(exchange = "globe"))]
    pub async fn get_account_overview(&self) -> Result<Value, GlobeError> {
        self.client
            .get(&format!("{}/account-overview", API_PREFIX), &[], true)
            .await
    }

    /// One page of the caller's trade history, raw body
    #[instrument(skip(self), fields(exchange = "globe"))]
    pub async fn get_my_trades(&self, instrument: &str, page: u32) -> Result<String, GlobeError> {
        let page = page.to_string();
        let params = [("instrument", instrument), ("page", page.as_str())];
        self.client
            .get_text(&format!("{}/history/my-trades", API_PREFIX), &params, true)
            .await
    }
}
