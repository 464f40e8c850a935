use anyhow::Result;
use trading_simulator::SimulatorConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    let config = SimulatorConfig::from_env()?;
    tracing::info!(
        instrument = %config.instrument,
        interval = %config.interval,
        length = config.series_length,
        future = config.future_candles,
        "Starting trading simulator"
    );

    let snapshot = trading_simulator::run(config).await?;
    tracing::info!(
        symbol = %snapshot.symbol,
        version = %snapshot.version,
        candles = snapshot.candles,
        "Simulation finished"
    );
    let json = serde_json::to_string_pretty(&snapshot)?;
    tracing::debug!(snapshot = %json, "Final chart state");
    println!("{json}");

    Ok(())
}
