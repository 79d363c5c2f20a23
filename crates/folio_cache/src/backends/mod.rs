pub mod memory;

#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use self::redis::RedisCache;
