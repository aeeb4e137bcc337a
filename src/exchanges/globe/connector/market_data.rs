use crate::core::errors::GlobeError;
use crate::core::kernel::RestClient;
use crate::core::traits::SharedHandler;
use crate::core::types::Resolution;
use crate::exchanges::globe::connector::GlobeClient;
use crate::exchanges::globe::types::{Channel, Subscription};
use serde_json::Value;

/// Public market data: one subscribe method per public channel, plus the
/// candle history endpoints
impl<R: RestClient> GlobeClient<R> {
    /// Order book snapshots for `instrument`
    pub async fn subscribe_depth(
        &self,
        instrument: &str,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(Subscription::instrument(Channel::Depth, instrument), handler)
            .await
    }

    pub async fn subscribe_index_price(
        &self,
        instrument: &str,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(
            Subscription::instrument(Channel::IndexPrice, instrument),
            handler,
        )
        .await
    }

    pub async fn subscribe_product_detail(
        &self,
        instrument: &str,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(
            Subscription::instrument(Channel::ProductDetail, instrument),
            handler,
        )
        .await
    }

    /// Public trades on the `trades` channel
    pub async fn subscribe_recent_trades(
        &self,
        instrument: &str,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(Subscription::instrument(Channel::Trades, instrument), handler)
            .await
    }

    pub async fn subscribe_market_overview(
        &self,
        instrument: &str,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(
            Subscription::instrument(Channel::MarketOverview, instrument),
            handler,
        )
        .await
    }

    pub async fn subscribe_open_interest(
        &self,
        instrument: &str,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(
            Subscription::instrument(Channel::OpenInterest, instrument),
            handler,
        )
        .await
    }

    /// Live candles at `resolution`
    pub async fn subscribe_price_history(
        &self,
        instrument: &str,
        resolution: Resolution,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(
            Subscription::instrument(Channel::PriceHistory, instrument).with_resolution(resolution),
            handler,
        )
        .await
    }

    pub async fn subscribe_product_list(
        &self,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(Subscription::channel_only(Channel::ProductList), handler)
            .await
    }

    pub async fn subscribe_insurance_fund(
        &self,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(Subscription::channel_only(Channel::InsuranceFund), handler)
            .await
    }

    pub async fn get_historic_market_rates(
        &self,
        instrument: &str,
        resolution: Resolution,
    ) -> Result<Value, GlobeError> {
        self.rest
            .get_historic_market_rates(instrument, resolution)
            .await
    }

    pub async fn get_historic_index_price_rates(
        &self,
        instrument: &str,
        resolution: Resolution,
    ) -> Result<Value, GlobeError> {
        self.rest
            .get_historic_index_price_rates(instrument, resolution)
            .await
    }
}
