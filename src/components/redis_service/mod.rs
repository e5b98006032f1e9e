//! Redis-backed durable storage, driven through an actor mailbox.

mod actor;

pub use actor::{RedisActor, RedisActorHandle, RedisCommand, KEY_PREFIX};
