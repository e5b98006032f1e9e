use crate::components::storage::KeyValueStore;
use crate::error::{storage_error, ClientResult};
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client as RedisClient};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Prefix applied to every key so the client shares a Redis safely
pub const KEY_PREFIX: &str = "skasc:";

/// The Redis actor that processes storage commands
pub struct RedisActor {
    client: RedisClient,
    connection: Option<MultiplexedConnection>,
    command_rx: mpsc::Receiver<RedisCommand>,
}

/// Commands that can be sent to the Redis actor
pub enum RedisCommand {
    Get(String, mpsc::Sender<ClientResult<Option<String>>>),
    Set(String, String, mpsc::Sender<ClientResult<()>>),
    Remove(String, mpsc::Sender<ClientResult<()>>),
    Shutdown,
}

/// Handle for communicating with the Redis actor
#[derive(Clone)]
pub struct RedisActorHandle {
    command_tx: mpsc::Sender<RedisCommand>,
}

impl RedisActorHandle {
    /// Create a handle whose actor is never started; every call fails
    pub fn empty() -> Self {
        let (command_tx, _) = mpsc::channel(32);
        Self { command_tx }
    }

    async fn send<T>(
        &self,
        make: impl FnOnce(mpsc::Sender<ClientResult<T>>) -> RedisCommand,
    ) -> ClientResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(make(response_tx))
            .await
            .map_err(|e| storage_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| storage_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> ClientResult<()> {
        let _ = self.command_tx.send(RedisCommand::Shutdown).await;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for RedisActorHandle {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let key = key.to_string();
        self.send(|tx| RedisCommand::Get(key, tx)).await
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.send(|tx| RedisCommand::Set(key, value, tx)).await
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        let key = key.to_string();
        self.send(|tx| RedisCommand::Remove(key, tx)).await
    }
}

impl RedisActor {
    /// Create a new actor and return its handle
    pub fn new(redis_url: &str) -> ClientResult<(Self, RedisActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(32);

        let client = RedisClient::open(redis_url)
            .map_err(|e| storage_error(&format!("Failed to create Redis client: {}", e)))?;

        let actor = Self {
            client,
            connection: None,
            command_rx,
        };

        let handle = RedisActorHandle { command_tx };

        Ok((actor, handle))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Redis actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RedisCommand::Get(key, response_tx) => {
                    let result = self.get_value(&key).await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::Set(key, value, response_tx) => {
                    let result = self.set_value(&key, &value).await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::Remove(key, response_tx) => {
                    let result = self.remove_value(&key).await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::Shutdown => {
                    info!("Redis actor shutting down");
                    break;
                }
            }
        }

        info!("Redis actor shut down");
    }

    /// Get a redis connection, reusing the multiplexed one once established
    async fn connection(&mut self) -> ClientResult<&mut MultiplexedConnection> {
        if self.connection.is_none() {
            let conn = self
                .client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| {
                    error!("Failed to connect to Redis: {}", e);
                    storage_error(&format!("Failed to connect to Redis: {}", e))
                })?;
            self.connection = Some(conn);
        }

        self.connection
            .as_mut()
            .ok_or_else(|| storage_error("Redis connection unavailable"))
    }

    async fn get_value(&mut self, key: &str) -> ClientResult<Option<String>> {
        let full_key = format!("{}{}", KEY_PREFIX, key);
        let conn = self.connection().await?;

        conn.get(&full_key)
            .await
            .map_err(|e| storage_error(&format!("Failed to read {} from Redis: {}", key, e)))
    }

    async fn set_value(&mut self, key: &str, value: &str) -> ClientResult<()> {
        let full_key = format!("{}{}", KEY_PREFIX, key);
        let conn = self.connection().await?;

        conn.set(&full_key, value)
            .await
            .map_err(|e| storage_error(&format!("Failed to save {} to Redis: {}", key, e)))
    }

    async fn remove_value(&mut self, key: &str) -> ClientResult<()> {
        let full_key = format!("{}{}", KEY_PREFIX, key);
        let conn = self.connection().await?;

        conn.del(&full_key)
            .await
            .map_err(|e| storage_error(&format!("Failed to remove {} from Redis: {}", key, e)))
    }
}
