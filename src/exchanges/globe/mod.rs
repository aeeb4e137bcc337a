pub mod builder;
pub mod codec;
pub mod connector;
pub mod dispatcher;
pub mod registry;
pub mod rest;
pub mod signer;
pub mod types;

// Re-export main types for easier importing
pub use builder::build_client;
pub use codec::GlobeCodec;
pub use connector::GlobeClient;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use registry::HandlerRegistry;
pub use rest::GlobeRestClient;
pub use signer::{AuthHeaders, GlobeSigner};
pub use types::{
    new_client_id, CancelOrder, CancelStopOrder, Channel, InboundMessage, Order, OutboundCommand,
    RoutingKey, StopOrder, Subscription, SubscriptionTag,
};
