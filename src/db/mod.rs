pub mod cache;
pub mod memory;
pub mod pg_store;
pub mod postgres;
pub mod store;

pub use cache::{create_redis_client, Cache, CacheKey};
pub use memory::MemoryStore;
pub use pg_store::PgStore;
pub use postgres::create_pool;
pub use store::Store;
