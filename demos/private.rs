use globe_client::{handler, GlobeClient, GlobeConfig, Order, Side};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;

const INSTRUMENT: &str = "XBTUSD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // You need to set GLOBE_API_KEY, GLOBE_PASSPHRASE and GLOBE_SECRET
    let config = GlobeConfig::from_env_file("GLOBE")?;
    if !config.has_credentials() {
        eprintln!("Please set GLOBE_API_KEY, GLOBE_PASSPHRASE and GLOBE_SECRET environment variables");
        return Ok(());
    }

    let print = handler(|message: Value| async move {
        println!("{}", message);
    });
    let errors = handler(|message: Value| async move {
        eprintln!("Globe error: {}", message);
    });

    let client = Arc::new(GlobeClient::new(config)?.with_error_handler(errors));
    client.connect().await?;
    println!("Connected to websocket");

    let receiver = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.run_loop().await })
    };

    // Private channels
    client
        .subscribe_my_market_events(INSTRUMENT, Some(print.clone()))
        .await?;
    client.subscribe_my_orders(INSTRUMENT, Some(print.clone())).await?;
    client.subscribe_my_account_overview(Some(print.clone())).await?;
    client.subscribe_my_positions(Some(print)).await?;

    // Private REST endpoints
    println!("Positions: {}", client.get_positions().await?);
    println!("Account overview: {}", client.get_account_overview().await?);
    println!(
        "Open orders: {}",
        client
            .get_open_orders(INSTRUMENT, chrono::Utc::now(), 25)
            .await?
    );
    println!("My trades: {}", client.get_my_trades(INSTRUMENT, 1).await?);

    // Orders
    let market = Order::market(INSTRUMENT, Side::Sell, Decimal::from(250));
    let limit = Order::limit(INSTRUMENT, Side::Buy, Decimal::ONE, Decimal::from(10));
    println!("Market order id: {}", client.place_order(market).await?);
    let limit_id = client.place_order(limit).await?;
    println!("Limit order id: {}", limit_id);
    let cancel_id = client
        .cancel_order(INSTRUMENT, &limit_id, None, None)
        .await?;
    println!("Cancel id: {}", cancel_id);

    tokio::select! {
        result = receiver => result??,
        _ = tokio::signal::ctrl_c() => {
            println!("Shutting down");
            client.close().await?;
        }
    }

    Ok(())
}
