mod common;

use chrono::{TimeZone, Utc};
use common::{connected_client, RecordedCall, TestConfig};
use globe_client::{Channel, GlobeConfig, GlobeError, Order, OrderType, Resolution, Side, Subscription};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashSet;
use uuid::Uuid;

fn assert_uuid_v4(id: &str) {
    let uuid = Uuid::parse_str(id).unwrap_or_else(|e| panic!("{} is not a UUID: {}", id, e));
    assert_eq!(uuid.get_version_num(), 4);
}

fn authenticated_config() -> GlobeConfig {
    GlobeConfig::new(TestConfig::credentials())
}

#[cfg(test)]
mod subscription_tests {
    use super::*;

    #[tokio::test]
    async fn test_public_subscribe_frames() {
        let (client, _rest, mut server) = connected_client(GlobeConfig::read_only()).await;

        client.subscribe_depth("XBTUSD", None).await.unwrap();
        client.subscribe_index_price("XBTUSD", None).await.unwrap();
        client.subscribe_product_detail("XBTUSD", None).await.unwrap();
        client.subscribe_recent_trades("XBTUSD", None).await.unwrap();
        client.subscribe_market_overview("XBTUSD", None).await.unwrap();
        client.subscribe_open_interest("XBTUSD", None).await.unwrap();
        client.subscribe_product_list(None).await.unwrap();
        client.subscribe_insurance_fund(None).await.unwrap();
        client
            .subscribe_price_history("XBTUSD", Resolution::Hours4, None)
            .await
            .unwrap();

        let frames = server.drain_sent();
        assert_eq!(
            frames,
            vec![
                json!({"command": "subscribe", "channel": "depth", "instrument": "XBTUSD"}),
                json!({"command": "subscribe", "channel": "index-price", "instrument": "XBTUSD"}),
                json!({"command": "subscribe", "channel": "product-detail", "instrument": "XBTUSD"}),
                json!({"command": "subscribe", "channel": "trades", "instrument": "XBTUSD"}),
                json!({"command": "subscribe", "channel": "market-overview", "instrument": "XBTUSD"}),
                json!({"command": "subscribe", "channel": "open-interest", "instrument": "XBTUSD"}),
                json!({"command": "subscribe", "channel": "product-list"}),
                json!({"command": "subscribe", "channel": "insurance-fund"}),
                json!({"command": "subscribe", "channel": "price-history", "instrument": "XBTUSD", "resolution": "4h"}),
            ]
        );
        // Nothing was registered because no handlers were passed
        assert!(client.registry().is_empty());
    }

    #[tokio::test]
    async fn test_private_subscribe_frames() {
        let (client, _rest, mut server) = connected_client(authenticated_config()).await;

        client.subscribe_my_market_events("XBTUSD", None).await.unwrap();
        client.subscribe_my_orders("XBTUSD", None).await.unwrap();
        client.subscribe_my_account_overview(None).await.unwrap();
        client.subscribe_my_positions(None).await.unwrap();

        assert_eq!(
            server.drain_sent(),
            vec![
                json!({"command": "subscribe", "channel": "my-market-events", "instrument": "XBTUSD"}),
                json!({"command": "subscribe", "channel": "my-orders", "instrument": "XBTUSD"}),
                json!({"command": "subscribe", "channel": "my-account-overview"}),
                json!({"command": "subscribe", "channel": "my-positions"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_keeps_handler() {
        let (client, _rest, mut server) = connected_client(GlobeConfig::read_only()).await;
        let noop = globe_client::handler(|_message: serde_json::Value| async {});

        let subscription = Subscription::instrument(Channel::Trades, "XBTUSD");
        client
            .subscribe(subscription.clone(), Some(noop))
            .await
            .unwrap();
        client.unsubscribe(subscription.clone()).await.unwrap();

        assert_eq!(
            server.drain_sent()[1],
            json!({"command": "unsubscribe", "channel": "trades", "instrument": "XBTUSD"})
        );
        assert!(client.registry().contains(&subscription.routing_key()));
    }
}

#[cfg(test)]
mod order_tests {
    use super::*;

    #[tokio::test]
    async fn test_place_order_stamps_uuid() {
        let (client, _rest, mut server) = connected_client(authenticated_config()).await;

        let order = Order::market("XBTUSD", Side::Sell, Decimal::ONE);
        let order_id = client.place_order(order).await.unwrap();
        assert_uuid_v4(&order_id);

        let frame = server.next_sent().await;
        assert_eq!(frame["command"], "place-order");
        assert_eq!(frame["order_id"], order_id.as_str());
        assert_eq!(frame["instrument"], "XBTUSD");
        assert_eq!(frame["quantity"], json!(1));
        assert_eq!(frame["order_type"], "market");
        assert_eq!(frame["side"], "sell");
        assert!(frame.get("price").is_none());
    }

    #[tokio::test]
    async fn test_place_order_ids_are_fresh_unless_given() {
        let (client, _rest, mut server) = connected_client(authenticated_config()).await;

        let first = client
            .place_order(Order::limit("XBTUSD", Side::Buy, Decimal::ONE, Decimal::from(10)))
            .await
            .unwrap();
        let second = client
            .place_order(Order::limit("XBTUSD", Side::Buy, Decimal::ONE, Decimal::from(10)))
            .await
            .unwrap();
        assert_ne!(first, second);

        let given = client
            .place_order(Order::market("XBTUSD", Side::Buy, Decimal::ONE).with_order_id("mine"))
            .await
            .unwrap();
        assert_eq!(given, "mine");

        let frames = server.drain_sent();
        assert_eq!(frames[0]["price"], json!(10));
        assert_eq!(frames[2]["order_id"], "mine");
    }

    #[tokio::test]
    async fn test_order_decimals_keep_every_digit() {
        let (client, _rest, mut server) = connected_client(authenticated_config()).await;

        let quantity: Decimal = "0.123456789012345678".parse().unwrap();
        let price: Decimal = "27123.50".parse().unwrap();
        client
            .place_order(Order::limit("XBTUSD", Side::Buy, quantity, price))
            .await
            .unwrap();

        let frame = server.next_sent().await;
        assert_eq!(frame["quantity"].to_string(), "0.123456789012345678");
        assert_eq!(frame["price"].to_string(), "27123.50");
        assert!(frame["quantity"].is_number());
    }

    #[tokio::test]
    async fn test_invalid_orders_are_not_sent() {
        let (client, _rest, mut server) = connected_client(authenticated_config()).await;

        let missing_price = Order::new("XBTUSD", OrderType::Limit, Side::Buy, Decimal::ONE);
        assert!(matches!(
            client.place_order(missing_price).await,
            Err(GlobeError::InvalidParameters(_))
        ));
        let zero = Order::market("XBTUSD", Side::Buy, Decimal::ZERO);
        assert!(matches!(
            client.place_order(zero).await,
            Err(GlobeError::InvalidParameters(_))
        ));
        assert!(server.drain_sent().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_order_generates_cancel_ids() {
        let (client, _rest, mut server) = connected_client(authenticated_config()).await;

        let first = client.cancel_order("XBTUSD", "order-1", None, None).await.unwrap();
        let second = client.cancel_order("XBTUSD", "order-1", None, None).await.unwrap();
        assert_uuid_v4(&first);
        assert_uuid_v4(&second);
        assert_ne!(first, second);

        let reduced = client
            .cancel_order("XBTUSD", "order-2", Some("cancel-2".to_string()), Some(Decimal::from(3)))
            .await
            .unwrap();
        assert_eq!(reduced, "cancel-2");

        let frames = server.drain_sent();
        assert_eq!(
            frames[0],
            json!({"command": "cancel-order", "instrument": "XBTUSD", "order_id": "order-1", "cancel_id": first})
        );
        assert_eq!(frames[2]["cancel_id"], "cancel-2");
        assert_eq!(frames[2]["new_quantity"], json!(3));
    }

    #[tokio::test]
    async fn test_stop_orders() {
        let (client, _rest, mut server) = connected_client(authenticated_config()).await;

        let order = Order::limit("XBTUSD", Side::Sell, Decimal::from(2), Decimal::from(9000));
        let order_id = client.stop_order(Decimal::from(9500), order).await.unwrap();
        assert_uuid_v4(&order_id);

        let frame = server.next_sent().await;
        assert_eq!(frame["command"], "stop-order");
        assert_eq!(frame["trigger"], json!(9500));
        assert_eq!(frame["order"]["order_id"], order_id.as_str());
        assert_eq!(frame["order"]["order_type"], "limit");

        let cancel_id = client
            .cancel_stop_order("XBTUSD", &order_id, None)
            .await
            .unwrap();
        assert_eq!(
            server.next_sent().await,
            json!({"command": "cancel-stop-order", "instrument": "XBTUSD", "order_id": order_id, "cancel_id": cancel_id})
        );

        let bad = client
            .stop_order(Decimal::ZERO, Order::market("XBTUSD", Side::Buy, Decimal::ONE))
            .await;
        assert!(matches!(bad, Err(GlobeError::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_concurrent_sends_stay_well_formed() {
        let (client, _rest, mut server) = connected_client(authenticated_config()).await;

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .place_order(Order::market("XBTUSD", Side::Buy, Decimal::from(i + 1)))
                        .await
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for task in futures::future::join_all(tasks).await {
            ids.insert(task.unwrap().unwrap());
        }

        let frames = server.drain_sent();
        assert_eq!(frames.len(), 20);
        let sent: HashSet<String> = frames
            .iter()
            .map(|frame| frame["order_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(sent, ids);
    }
}

#[cfg(test)]
mod rest_tests {
    use super::*;

    #[tokio::test]
    async fn test_public_history_endpoints() {
        let (client, rest, _server) = connected_client(GlobeConfig::read_only()).await;
        rest.respond("/api/v1/history/XBTUSD/candles/1m", r#"[{"open": 1.0}]"#);
        rest.respond("/api/v1/history/index-price/XBTUSD/candles/1d", r#"[]"#);

        let candles = client
            .get_historic_market_rates("XBTUSD", Resolution::Minutes1)
            .await
            .unwrap();
        assert_eq!(candles, json!([{"open": 1.0}]));
        let index = client
            .get_historic_index_price_rates("XBTUSD", Resolution::Days1)
            .await
            .unwrap();
        assert_eq!(index, json!([]));

        assert!(rest.calls().iter().all(|call| !call.authenticated));
    }

    #[tokio::test]
    async fn test_private_endpoints_require_credentials() {
        let (client, rest, _server) = connected_client(GlobeConfig::read_only()).await;

        assert!(matches!(client.get_positions().await, Err(GlobeError::MissingCredentials)));
        assert!(matches!(
            client.get_account_overview().await,
            Err(GlobeError::MissingCredentials)
        ));
        assert!(matches!(
            client.get_open_orders("XBTUSD", Utc::now(), 10).await,
            Err(GlobeError::MissingCredentials)
        ));
        assert!(matches!(
            client.get_my_trades("XBTUSD", 1).await,
            Err(GlobeError::MissingCredentials)
        ));
        assert!(rest.calls().is_empty());
    }

    #[tokio::test]
    async fn test_private_endpoints() {
        let (client, rest, _server) = connected_client(authenticated_config()).await;
        rest.respond("/api/v1/positions", r#"{"XBTUSD": {"quantity": 1}}"#);
        rest.respond("/api/v1/account-overview", r#"{"available_balance": 10}"#);
        rest.respond("/api/v1/orders/open-orders", "opaque open orders");
        rest.respond("/api/v1/history/my-trades", "opaque trades");

        assert_eq!(
            client.get_positions().await.unwrap(),
            json!({"XBTUSD": {"quantity": 1}})
        );
        assert_eq!(
            client.get_account_overview().await.unwrap(),
            json!({"available_balance": 10})
        );

        let upto = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            client.get_open_orders("XBTUSD", upto, 50).await.unwrap(),
            "opaque open orders"
        );
        assert_eq!(client.get_my_trades("XBTUSD", 2).await.unwrap(), "opaque trades");

        let calls = rest.calls();
        assert!(calls.iter().all(|call| call.authenticated));
        assert_eq!(
            calls[2],
            RecordedCall {
                endpoint: "/api/v1/orders/open-orders".to_string(),
                params: vec![
                    ("instrument".to_string(), "XBTUSD".to_string()),
                    ("upto_timestamp".to_string(), "1609459200000".to_string()),
                    ("page_size".to_string(), "50".to_string()),
                ],
                authenticated: true,
            }
        );
        assert_eq!(
            calls[3].params,
            vec![
                ("instrument".to_string(), "XBTUSD".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_http_errors_surface() {
        let (client, _rest, _server) = connected_client(authenticated_config()).await;
        assert!(matches!(
            client.get_positions().await,
            Err(GlobeError::HttpError { status: 404, .. })
        ));
        assert!(matches!(
            client.get_open_orders("XBTUSD", Utc::now(), 0).await,
            Err(GlobeError::InvalidParameters(_))
        ));
    }
}
