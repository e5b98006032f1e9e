use crate::components::redis_service::{RedisActor, RedisActorHandle};
use crate::components::session::{Navigator, Session};
use crate::components::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::components::ui::{Surface, UiHelper};
use crate::components::{ApiClient, EventCache};
use crate::config::{Config, StorageBackend};
use crate::error::{ClientResult, Error};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the client configuration
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Everything a front end needs, wired from one configuration
pub struct ClientContext {
    pub config: Config,
    pub session: Arc<Session>,
    pub api: ApiClient,
    pub events: EventCache,
    pub ui: UiHelper,
    redis: Option<(RedisActorHandle, JoinHandle<()>)>,
}

impl ClientContext {
    /// Open storage, load the session and build the client pieces
    pub async fn build(
        config: Config,
        navigator: Arc<dyn Navigator>,
        surface: Arc<dyn Surface>,
    ) -> ClientResult<Self> {
        let (durable, redis) = open_durable_store(&config)?;
        let transient: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let session = Arc::new(
            Session::load(durable, transient, navigator, config.login_page.clone()).await?,
        );
        let api = ApiClient::from_config(&config, Arc::clone(&session))?;
        let events = EventCache::new(Arc::clone(&session));
        let ui = UiHelper::new(surface);

        info!(
            "Client ready for {} ({:?} storage)",
            config.api_base_url, config.storage_backend
        );

        Ok(Self {
            config,
            session,
            api,
            events,
            ui,
            redis,
        })
    }

    /// Stop the Redis actor, if one was started
    pub async fn shutdown(self) -> ClientResult<()> {
        if let Some((handle, task)) = self.redis {
            handle.shutdown().await?;
            if let Err(e) = task.await {
                error!("Redis actor task error: {:?}", e);
            } else {
                info!("Redis actor shut down successfully");
            }
        }
        Ok(())
    }
}

type DurableStore = (
    Arc<dyn KeyValueStore>,
    Option<(RedisActorHandle, JoinHandle<()>)>,
);

fn open_durable_store(config: &Config) -> ClientResult<DurableStore> {
    match config.storage_backend {
        StorageBackend::Memory => {
            let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
            Ok((store, None))
        }
        StorageBackend::File => {
            info!("Using storage file {}", config.storage_path.display());
            let store: Arc<dyn KeyValueStore> =
                Arc::new(FileStore::new(config.storage_path.clone()));
            Ok((store, None))
        }
        StorageBackend::Redis => {
            info!("Connecting to Redis at {}", config.redis_url);
            let (mut actor, handle) = RedisActor::new(&config.redis_url)?;

            // Spawn Redis actor task
            let task = tokio::spawn(async move {
                actor.run().await;
            });

            let store: Arc<dyn KeyValueStore> = Arc::new(handle.clone());
            Ok((store, Some((handle, task))))
        }
    }
}
