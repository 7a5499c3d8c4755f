mod config;
mod error;
mod handlers;
mod models;
mod router;
mod state;

use config::Config;
use exchange::Exchange;
use market_data::EventBus;
use persistence::MemoryStore;
use router::create_router;
use rust_decimal::Decimal;
use simulation::{MarketMaker, MarketMakerConfig, PriceFeed, PriceFeedConfig};
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use types::book::Ticker;
use types::ids::{Symbol, UserId};
use types::numeric::Price;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    tracing::info!(
        environment = %config.environment,
        symbols = config.symbols.len(),
        "starting exchange gateway"
    );

    // in-memory persistence with demo users and tickers
    let store = Arc::new(MemoryStore::new());
    seed_demo_data(&store, &config.symbols);

    let bus = Arc::new(EventBus::default());
    let exchange = Arc::new(Exchange::new(
        store.clone(),
        store.clone(),
        store.clone(),
        bus.clone(),
    ));
    for symbol in &config.symbols {
        exchange.register_symbol(symbol.clone());
    }
    let pump = exchange.start();

    // demo price feed and market maker
    let feed = Arc::new(PriceFeed::new(
        store.clone(),
        config.symbols.clone(),
        PriceFeedConfig::default(),
    ));
    let feed_task = feed.clone().start(exchange.clone(), bus.clone());

    let maker_symbols: Vec<Symbol> = config
        .symbols
        .iter()
        .filter(|s| s.base() != "USDC")
        .cloned()
        .collect();
    let maker = MarketMaker::new(
        UserId::from("user-3"),
        maker_symbols,
        MarketMakerConfig::default(),
    );
    let maker_task = maker.start(exchange.clone(), feed.clone());

    let app_state = AppState {
        exchange: exchange.clone(),
        orders: store.clone(),
        trades: store.clone(),
        balances: store.clone(),
        tickers: store.clone(),
        bus: bus.clone(),
    };
    let app = create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    maker_task.abort();
    feed_task.abort();
    exchange.shutdown();
    pump.await.ok();
    tracing::info!("goodbye");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}

/// Demo accounts, balances and starting tickers
fn seed_demo_data(store: &MemoryStore, symbols: &[Symbol]) {
    let assets = [
        ("USD", Decimal::from(100_000)),
        ("BTC", Decimal::from(1)),
        ("ETH", Decimal::from(10)),
        ("SOL", Decimal::from(100)),
        ("USDC", Decimal::from(50_000)),
    ];
    for user in ["user-1", "user-2", "user-3"] {
        for (asset, amount) in assets {
            store.seed_balance(UserId::from(user), asset, amount);
        }
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as i64;
    for symbol in symbols {
        let price = match symbol.as_str() {
            "BTC-USD" => Price::from_u64(45_000),
            "ETH-USD" => Price::from_u64(2_500),
            "SOL-USD" => Price::from_u64(100),
            "USDC-USD" => Price::from_u64(1),
            _ => Price::from_u64(100),
        };
        store.seed_ticker(Ticker::seeded(symbol.clone(), price, now));
    }
    tracing::info!("seeded demo users, balances and tickers");
}
