use std::{
    collections::HashSet,
    sync::{Arc, PoisonError, RwLock},
};

use anyhow::{Error, Result, anyhow};
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::info;

use crate::{config::Config, models::recipient::RecipientId};

/// Set of every recipient seen so far.
///
/// The handle is cheap to clone and every clone sees the same set. The set only
/// grows: `merge` applies a whole discovery batch as one mutation, so concurrent
/// broadcasts never observe a half-merged batch.
#[derive(Clone)]
pub enum RecipientRegistry {
    InMemory(Arc<RwLock<HashSet<RecipientId>>>),
    Redis(RedisRecipientStore),
}

impl RecipientRegistry {
    pub fn in_memory() -> Self {
        RecipientRegistry::InMemory(Arc::new(RwLock::new(HashSet::new())))
    }

    /// Redis-backed when `recipient_store_url` is set, in-memory otherwise.
    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        match &config.recipient_store_url {
            Some(url) => {
                let store = RedisRecipientStore::connect(url, &config.recipient_store_key).await?;
                Ok(RecipientRegistry::Redis(store))
            }
            None => {
                info!("Using in-memory recipient registry");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            RecipientRegistry::InMemory(_) => "memory",
            RecipientRegistry::Redis(_) => "redis",
        }
    }

    /// Unions `discovered` into the registry and returns the resulting snapshot.
    pub async fn merge(&self, discovered: &HashSet<RecipientId>) -> Result<Vec<RecipientId>, Error> {
        match self {
            RecipientRegistry::InMemory(set) => {
                let mut set = set.write().unwrap_or_else(PoisonError::into_inner);
                set.extend(discovered.iter().copied());
                Ok(sorted(set.iter().copied()))
            }
            RecipientRegistry::Redis(store) => store.merge(discovered).await,
        }
    }

    /// Sorted by id.
    pub async fn snapshot(&self) -> Result<Vec<RecipientId>, Error> {
        match self {
            RecipientRegistry::InMemory(set) => {
                let set = set.read().unwrap_or_else(PoisonError::into_inner);
                Ok(sorted(set.iter().copied()))
            }
            RecipientRegistry::Redis(store) => store.snapshot().await,
        }
    }

    pub async fn len(&self) -> Result<usize, Error> {
        match self {
            RecipientRegistry::InMemory(set) => {
                Ok(set.read().unwrap_or_else(PoisonError::into_inner).len())
            }
            RecipientRegistry::Redis(store) => store.len().await,
        }
    }
}

#[derive(Clone)]
pub struct RedisRecipientStore {
    connection: MultiplexedConnection,
    key: String,
}

impl RedisRecipientStore {
    pub async fn connect(url: &str, key: &str) -> Result<Self, Error> {
        let client = Client::open(url).map_err(|_| anyhow!("Failed to create redis client"))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|_| anyhow!("Failed to connect to redis client"))?;

        info!(key, "Redis recipient registry connected");

        Ok(Self {
            connection,
            key: key.to_string(),
        })
    }

    async fn merge(&self, discovered: &HashSet<RecipientId>) -> Result<Vec<RecipientId>, Error> {
        let mut conn = self.connection.clone();
        let ids: Vec<i64> = discovered.iter().map(|id| id.as_i64()).collect();

        let mut pipe = redis::pipe();
        pipe.atomic();
        if !ids.is_empty() {
            pipe.sadd(&self.key, ids).ignore();
        }
        pipe.smembers(&self.key);

        let (members,): (Vec<i64>,) = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow!("Failed to merge recipients: {}", e))?;

        Ok(sorted(members.into_iter().map(RecipientId)))
    }

    async fn snapshot(&self) -> Result<Vec<RecipientId>, Error> {
        let mut conn = self.connection.clone();

        let members: Vec<i64> = conn
            .smembers(&self.key)
            .await
            .map_err(|e| anyhow!("Failed to read recipients: {}", e))?;

        Ok(sorted(members.into_iter().map(RecipientId)))
    }

    async fn len(&self) -> Result<usize, Error> {
        let mut conn = self.connection.clone();

        let count: usize = conn
            .scard(&self.key)
            .await
            .map_err(|e| anyhow!("Failed to count recipients: {}", e))?;

        Ok(count)
    }
}

fn sorted(ids: impl Iterator<Item = RecipientId>) -> Vec<RecipientId> {
    let mut ids: Vec<RecipientId> = ids.collect();
    ids.sort_unstable();
    ids
}
