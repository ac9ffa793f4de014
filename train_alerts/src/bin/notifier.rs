use notifications::config::DeliveryMode;
use notifications::delivery::email::EmailDeliveryStrategy;
use notifications::delivery::log::LogDeliveryStrategy;
use notifications::delivery::DeliveryStrategy;
use notifications::dispatcher::NotificationDispatcher;
use std::sync::Arc;
use subscriptions::store::json_file::JsonFileSubscriptionStore;
use tokio::io::BufReader;
use train_alerts::config::Settings;
use train_alerts::engine::MatchingEngine;
use train_alerts::feed::run_feed;
use train_alerts::messages::MessageComposer;
use train_metadata::loader::MetadataLoader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse()?;
    shared_kernel::tracing::config_telemetry("train_alerts")?;
    let result = start(settings).await;
    shared_kernel::tracing::shutdown_global_tracer_provider();
    result
}

async fn start(settings: Settings) -> anyhow::Result<()> {
    let server_name = settings.application.server_name.as_str();
    let metadata = MetadataLoader::new(settings.metadata.host.clone())
        .load()
        .await;

    let strategy: Arc<dyn DeliveryStrategy> = match settings.delivery {
        DeliveryMode::Email => Arc::new(EmailDeliveryStrategy::new(
            settings.email.clone(),
            server_name,
        )),
        DeliveryMode::Log => Arc::new(LogDeliveryStrategy),
    };
    let (dispatcher, worker) = NotificationDispatcher::start(strategy);

    let engine = MatchingEngine::new(
        Arc::new(JsonFileSubscriptionStore::new(&settings.subscriptions.path)),
        Arc::new(metadata),
        Arc::new(dispatcher),
        MessageComposer::new(server_name),
    );

    let stats = run_feed(&engine, BufReader::new(tokio::io::stdin())).await;
    drop(engine);
    worker.drain().await?;

    let stats = stats?;
    tracing::info!(
        batches = stats.batches,
        rejected_batches = stats.rejected_batches,
        notifications = stats.notifications,
        "Feed closed"
    );
    Ok(())
}
