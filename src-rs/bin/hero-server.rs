use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hackathon_hero_rs::api::server::{AppServer, AppState};
use hackathon_hero_rs::digest::{spawn_scheduler, HttpMailer, Mailer, NotificationTrigger};
use hackathon_hero_rs::store::EntityStore;
use hackathon_hero_rs::AppConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(AppConfig::load());
    let store = Arc::new(EntityStore::new(Some(config.data_file.clone())));
    info!("entity store backed by {}", config.data_file.display());

    let mailer = HttpMailer::from_config(&config.mail).map(|m| Arc::new(m) as Arc<dyn Mailer>);
    if mailer.is_none() {
        info!("mail credentials not fully configured, digests will not be delivered");
    }
    let trigger = Arc::new(NotificationTrigger::new(store.clone(), mailer));
    let _scheduler = spawn_scheduler(trigger.clone(), config.digest_hour);
    info!(
        "notification scheduler initialized: running daily at {:02}:00",
        config.digest_hour
    );

    let port = config.port;
    let server = AppServer::new(
        port,
        AppState {
            store,
            trigger,
            config,
        },
    );
    info!("hero-server listening on :{}", port);
    if let Err(err) = server.start().await {
        error!("server error: {}", err);
    }
}
