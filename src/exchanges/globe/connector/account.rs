use crate::core::errors::GlobeError;
use crate::core::kernel::RestClient;
use crate::core::traits::SharedHandler;
use crate::exchanges::globe::connector::GlobeClient;
use crate::exchanges::globe::types::{Channel, Subscription};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Private channels and endpoints; all of these need credentials
impl<R: RestClient> GlobeClient<R> {
    /// Fills and order state changes for `instrument`
    pub async fn subscribe_my_market_events(
        &self,
        instrument: &str,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(
            Subscription::instrument(Channel::MyMarketEvents, instrument),
            handler,
        )
        .await
    }

    /// Open orders for `instrument`
    pub async fn subscribe_my_orders(
        &self,
        instrument: &str,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(Subscription::instrument(Channel::MyOrders, instrument), handler)
            .await
    }

    pub async fn subscribe_my_account_overview(
        &self,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(
            Subscription::channel_only(Channel::MyAccountOverview),
            handler,
        )
        .await
    }

    pub async fn subscribe_my_positions(
        &self,
        handler: Option<SharedHandler>,
    ) -> Result<(), GlobeError> {
        self.subscribe(Subscription::channel_only(Channel::MyPositions), handler)
            .await
    }

    pub async fn get_positions(&self) -> Result<Value, GlobeError> {
        self.ensure_authenticated()?;
        self.rest.get_positions().await
    }

    pub async fn get_account_overview(&self) -> Result<Value, GlobeError> {
        self.ensure_authenticated()?;
        self.rest.get_account_overview().await
    }

    /// Open orders placed before `upto`, as the raw response body
    pub async fn get_open_orders(
        &self,
        instrument: &str,
        upto: DateTime<Utc>,
        page_size: u32,
    ) -> Result<String, GlobeError> {
        self.ensure_authenticated()?;
        if page_size == 0 {
            return Err(GlobeError::InvalidParameters(
                "page size must be at least 1".to_string(),
            ));
        }
        self.rest.get_open_orders(instrument, upto, page_size).await
    }

    /// One page of trade history, as the raw response body
    pub async fn get_my_trades(&self, instrument: &str, page: u32) -> Result<String, GlobeError> {
        self.ensure_authenticated()?;
        self.rest.get_my_trades(instrument, page).await
    }
}
