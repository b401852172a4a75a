use portfolio_relay::configuration::get_configuration;
use portfolio_relay::startup::Application;
use portfolio_relay::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("portfolio-relay".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = get_configuration()?;
    let app = Application::build(config).await.inspect_err(|e| {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Failed to start the Portfolio API"
        );
    })?;

    app.run_until_stopped().await?;
    tracing::info!("Portfolio API has exited");
    Ok(())
}
