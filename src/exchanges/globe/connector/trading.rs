use crate::core::errors::GlobeError;
use crate::core::kernel::RestClient;
use crate::exchanges::globe::connector::GlobeClient;
use crate::exchanges::globe::types::{
    new_client_id, CancelOrder, CancelStopOrder, Order, OutboundCommand, StopOrder,
};
use rust_decimal::Decimal;
use tracing::{info, instrument};

/// Order entry over the WebSocket
///
/// Every method returns the idempotency token it sent, generated when the
/// caller did not supply one. Outcomes arrive asynchronously on the
/// `my-orders` and `my-market-events` channels.
impl<R: RestClient> GlobeClient<R> {
    #[instrument(skip(self, order), fields(exchange = "globe", instrument = %order.instrument, side = ?order.side, order_type = ?order.order_type))]
    pub async fn place_order(&self, mut order: Order) -> Result<String, GlobeError> {
        order.validate()?;
        let order_id = order.stamp_order_id();

        self.send(&OutboundCommand::PlaceOrder(order)).await?;
        info!(order_id = %order_id, "Order sent");
        Ok(order_id)
    }

    /// Cancel an order, or reduce it to `new_quantity`
    #[instrument(skip(self), fields(exchange = "globe"))]
    pub async fn cancel_order(
        &self,
        instrument: &str,
        order_id: &str,
        cancel_id: Option<String>,
        new_quantity: Option<Decimal>,
    ) -> Result<String, GlobeError> {
        if let Some(quantity) = new_quantity {
            if quantity <= Decimal::ZERO {
                return Err(GlobeError::InvalidParameters(format!(
                    "new quantity must be positive, got {}",
                    quantity
                )));
            }
        }

        let cancel_id = cancel_id.unwrap_or_else(new_client_id);
        self.send(&OutboundCommand::CancelOrder(CancelOrder {
            instrument: instrument.to_string(),
            order_id: order_id.to_string(),
            cancel_id: cancel_id.clone(),
            new_quantity,
        }))
        .await?;
        Ok(cancel_id)
    }

    /// Rest `order` until the market reaches `trigger`; returns the order id
    #[instrument(skip(self, order), fields(exchange = "globe", instrument = %order.instrument, trigger = %trigger))]
    pub async fn stop_order(&self, trigger: Decimal, mut order: Order) -> Result<String, GlobeError> {
        if trigger <= Decimal::ZERO {
            return Err(GlobeError::InvalidParameters(format!(
                "stop trigger must be positive, got {}",
                trigger
            )));
        }
        order.validate()?;
        let order_id = order.stamp_order_id();

        self.send(&OutboundCommand::StopOrder(StopOrder { trigger, order }))
            .await?;
        Ok(order_id)
    }

    #[instrument(skip(self), fields(exchange = "globe"))]
    pub async fn cancel_stop_order(
        &self,
        instrument: &str,
        order_id: &str,
        cancel_id: Option<String>,
    ) -> Result<String, GlobeError> {
        let cancel_id = cancel_id.unwrap_or_else(new_client_id);
        self.send(&OutboundCommand::CancelStopOrder(CancelStopOrder {
            instrument: instrument.to_string(),
            order_id: order_id.to_string(),
            cancel_id: cancel_id.clone(),
        }))
        .await?;
        Ok(cancel_id)
    }
}
