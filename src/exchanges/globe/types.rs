use crate::core::errors::GlobeError;
use crate::core::types::{OrderType, Resolution, Side, TypesError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// WebSocket channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Depth,
    IndexPrice,
    ProductDetail,
    Trades,
    MarketOverview,
    OpenInterest,
    PriceHistory,
    MyMarketEvents,
    MyOrders,
    ProductList,
    InsuranceFund,
    MyAccountOverview,
    MyPositions,
}

impl Channel {
    pub const ALL: [Self; 13] = [
        Self::Depth,
        Self::IndexPrice,
        Self::ProductDetail,
        Self::Trades,
        Self::MarketOverview,
        Self::OpenInterest,
        Self::PriceHistory,
        Self::MyMarketEvents,
        Self::MyOrders,
        Self::ProductList,
        Self::InsuranceFund,
        Self::MyAccountOverview,
        Self::MyPositions,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Depth => "depth",
            Self::IndexPrice => "index-price",
            Self::ProductDetail => "product-detail",
            Self::Trades => "trades",
            Self::MarketOverview => "market-overview",
            Self::OpenInterest => "open-interest",
            Self::PriceHistory => "price-history",
            Self::MyMarketEvents => "my-market-events",
            Self::MyOrders => "my-orders",
            Self::ProductList => "product-list",
            Self::InsuranceFund => "insurance-fund",
            Self::MyAccountOverview => "my-account-overview",
            Self::MyPositions => "my-positions",
        }
    }

    /// Whether pushes on this channel are keyed by instrument
    pub const fn is_per_instrument(self) -> bool {
        !matches!(
            self,
            Self::ProductList | Self::InsuranceFund | Self::MyAccountOverview | Self::MyPositions
        )
    }

    /// Personal channels, available on authenticated connections only
    pub const fn is_private(self) -> bool {
        matches!(
            self,
            Self::MyMarketEvents | Self::MyOrders | Self::MyAccountOverview | Self::MyPositions
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| TypesError::UnknownChannel(s.to_string()))
    }
}

/// Lookup key for the handler of an inbound push
///
/// Channel and instrument are kept as separate fields, so no pairing of
/// channel name and instrument can alias another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutingKey {
    Channel(Channel),
    ChannelInstrument(Channel, String),
}

impl RoutingKey {
    /// Key for a channel and optional instrument
    ///
    /// Channel-only channels ignore the instrument. Per-instrument channels
    /// fall back to the bare channel when no instrument is given. The same
    /// rule is used at registration and at dispatch.
    pub fn new(channel: Channel, instrument: Option<&str>) -> Self {
        match instrument {
            Some(instrument) if channel.is_per_instrument() => {
                Self::ChannelInstrument(channel, instrument.to_string())
            }
            _ => Self::Channel(channel),
        }
    }

    pub const fn channel(&self) -> Channel {
        match self {
            Self::Channel(channel) | Self::ChannelInstrument(channel, _) => *channel,
        }
    }

    pub fn instrument(&self) -> Option<&str> {
        match self {
            Self::Channel(_) => None,
            Self::ChannelInstrument(_, instrument) => Some(instrument),
        }
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(channel) => write!(f, "{}", channel),
            Self::ChannelInstrument(channel, instrument) => write!(f, "{}[{}]", channel, instrument),
        }
    }
}

/// Channel selection sent with `subscribe` / `unsubscribe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl Subscription {
    pub fn new(channel: Channel, instrument: Option<String>) -> Self {
        Self {
            channel,
            instrument,
            resolution: None,
        }
    }

    pub fn channel_only(channel: Channel) -> Self {
        Self::new(channel, None)
    }

    pub fn instrument(channel: Channel, instrument: impl Into<String>) -> Self {
        Self::new(channel, Some(instrument.into()))
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn routing_key(&self) -> RoutingKey {
        RoutingKey::new(self.channel, self.instrument.as_deref())
    }

    pub fn validate(&self) -> Result<(), GlobeError> {
        if self.channel.is_per_instrument() && self.instrument.is_none() {
            return Err(GlobeError::InvalidParameters(format!(
                "channel {} requires an instrument",
                self.channel
            )));
        }
        if self.channel == Channel::PriceHistory && self.resolution.is_none() {
            return Err(GlobeError::InvalidParameters(
                "channel price-history requires a resolution".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fresh idempotency token for order and cancel commands
pub fn new_client_id() -> String {
    Uuid::new_v4().to_string()
}

/// Order body; decimals go over the wire as JSON numbers with their exact digits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub instrument: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub quantity: Decimal,
    pub order_type: OrderType,
    pub side: Side,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub price: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub trigger_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl Order {
    pub fn new(
        instrument: impl Into<String>,
        order_type: OrderType,
        side: Side,
        quantity: Decimal,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            quantity,
            order_type,
            side,
            price: None,
            trigger_price: None,
            order_id: None,
        }
    }

    pub fn market(instrument: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        Self::new(instrument, OrderType::Market, side, quantity)
    }

    pub fn limit(instrument: impl Into<String>, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self::new(instrument, OrderType::Limit, side, quantity).with_price(price)
    }

    pub fn post_only(
        instrument: impl Into<String>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self::new(instrument, OrderType::PostOnly, side, quantity).with_price(price)
    }

    pub fn stop_market(
        instrument: impl Into<String>,
        side: Side,
        quantity: Decimal,
        trigger_price: Decimal,
    ) -> Self {
        Self::new(instrument, OrderType::StopMarket, side, quantity).with_trigger_price(trigger_price)
    }

    pub fn stop_limit(
        instrument: impl Into<String>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        trigger_price: Decimal,
    ) -> Self {
        Self::new(instrument, OrderType::StopLimit, side, quantity)
            .with_price(price)
            .with_trigger_price(trigger_price)
    }

    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_trigger_price(mut self, trigger_price: Decimal) -> Self {
        self.trigger_price = Some(trigger_price);
        self
    }

    #[must_use]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), GlobeError> {
        if self.instrument.is_empty() {
            return Err(GlobeError::InvalidParameters(
                "order instrument must not be empty".to_string(),
            ));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(GlobeError::InvalidParameters(format!(
                "order quantity must be positive, got {}",
                self.quantity
            )));
        }
        if self.order_type.requires_price() && self.price.is_none() {
            return Err(GlobeError::InvalidParameters(format!(
                "{:?} order requires a price",
                self.order_type
            )));
        }
        if self.order_type.requires_trigger() && self.trigger_price.is_none() {
            return Err(GlobeError::InvalidParameters(format!(
                "{:?} order requires a trigger price",
                self.order_type
            )));
        }
        Ok(())
    }

    /// Return the order id, generating one first if the caller left it empty
    pub(crate) fn stamp_order_id(&mut self) -> String {
        self.order_id.get_or_insert_with(new_client_id).clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub instrument: String,
    pub order_id: String,
    pub cancel_id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub new_quantity: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopOrder {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub trigger: Decimal,
    pub order: Order,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelStopOrder {
    pub instrument: String,
    pub order_id: String,
    pub cancel_id: String,
}

/// Outbound WebSocket command; serializes with its `command` tag inline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum OutboundCommand {
    Subscribe(Subscription),
    Unsubscribe(Subscription),
    PlaceOrder(Order),
    CancelOrder(CancelOrder),
    StopOrder(StopOrder),
    CancelStopOrder(CancelStopOrder),
}

impl OutboundCommand {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Subscribe(_) => "subscribe",
            Self::Unsubscribe(_) => "unsubscribe",
            Self::PlaceOrder(_) => "place-order",
            Self::CancelOrder(_) => "cancel-order",
            Self::StopOrder(_) => "stop-order",
            Self::CancelStopOrder(_) => "cancel-stop-order",
        }
    }
}

/// The `subscription` tag carried by every push
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscriptionTag {
    pub channel: String,
    #[serde(default)]
    pub instrument: Option<String>,
}

impl SubscriptionTag {
    /// Routing key for this push, or `None` for an unknown channel
    pub fn routing_key(&self) -> Option<RoutingKey> {
        let channel = self.channel.parse::<Channel>().ok()?;
        Some(RoutingKey::new(channel, self.instrument.as_deref()))
    }
}

/// Decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Subscription push; `message` is the full decoded object
    Push {
        tag: SubscriptionTag,
        message: Value,
    },
    /// Anything without a `subscription` field: errors and acknowledgements
    Error(Value),
}
