use globe_client::{handler, GlobeClient, GlobeConfig, Resolution};
use serde_json::Value;
use std::sync::Arc;

const INSTRUMENT: &str = "XBTUSD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let print = handler(|message: Value| async move {
        println!("{}", message);
    });
    let errors = handler(|message: Value| async move {
        eprintln!("Globe error: {}", message);
    });

    let client = Arc::new(GlobeClient::new(GlobeConfig::read_only())?.with_error_handler(errors));
    client.connect().await?;
    println!("Connected to websocket");

    // REST endpoints for price history data
    println!(
        "{}",
        client
            .get_historic_market_rates(INSTRUMENT, Resolution::Minutes1)
            .await?
    );
    println!(
        "{}",
        client
            .get_historic_index_price_rates(INSTRUMENT, Resolution::Minutes1)
            .await?
    );

    // Subscribe to public channels
    client.subscribe_index_price(INSTRUMENT, Some(print.clone())).await?;
    client.subscribe_depth(INSTRUMENT, Some(print.clone())).await?;
    client.subscribe_product_list(Some(print.clone())).await?;
    client.subscribe_product_detail(INSTRUMENT, Some(print.clone())).await?;
    client.subscribe_recent_trades(INSTRUMENT, Some(print.clone())).await?;
    client.subscribe_market_overview(INSTRUMENT, Some(print.clone())).await?;
    client.subscribe_open_interest(INSTRUMENT, Some(print.clone())).await?;
    client.subscribe_insurance_fund(Some(print.clone())).await?;
    client
        .subscribe_price_history(INSTRUMENT, Resolution::Minutes1, Some(print))
        .await?;

    tokio::select! {
        result = client.run_loop() => result?,
        _ = tokio::signal::ctrl_c() => {
            println!("Shutting down");
            client.close().await?;
        }
    }

    Ok(())
}
