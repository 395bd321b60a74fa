use color_eyre::{eyre::eyre, Result};
use tempnode::config::{ConfigStore, WifiAuth};
use tempnode::{mqtt, persistence};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let provisioning = persistence::resolve().await?;
    for source in &provisioning.sources {
        info!("Provisioning layer: {}", source);
    }

    // validation errors are already logged one by one by the store
    let store = ConfigStore::load(&provisioning.raw, &provisioning.policy)
        .map_err(|errors| eyre!("{}", errors.summary()))?;
    let config = store.shared();

    let wifi = config.wifi();
    info!(
        "Wi-Fi: ssid {} ({})",
        wifi.ssid,
        match wifi.auth {
            WifiAuth::Open => "open network",
            WifiAuth::Wpa2 { .. } => "WPA2",
        }
    );

    let options = mqtt::client_options(&config);
    info!(
        "MQTT: client {} at {}, keep-alive {:?}",
        options.client_id(),
        mqtt::broker_label(&config),
        options.keep_alive()
    );

    let publish = config.publish();
    info!(
        "Publishing temperature to {} and state to {} every {:?}",
        publish.topic_temperature, publish.topic_state, publish.delay
    );

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
