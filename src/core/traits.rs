use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Callback invoked with a decoded inbound message
///
/// Handlers run one at a time on the dispatcher task, in arrival order. A
/// handler that suspends holds back every message queued behind it.
///
/// Any `Fn(Value) -> impl Future<Output = ()>` closure is a handler:
///
/// ```rust,no_run
/// use globe_client::core::traits::handler;
///
/// let on_depth = handler(|message: serde_json::Value| async move {
///     println!("depth: {}", message);
/// });
/// ```
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: Value);
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send,
{
    async fn handle(&self, message: Value) {
        (self)(message).await;
    }
}

pub type SharedHandler = Arc<dyn MessageHandler>;

/// Wrap a handler for registration
pub fn handler<H>(handler: H) -> SharedHandler
where
    H: MessageHandler + 'static,
{
    Arc::new(handler)
}
