//! Row store adapters.

pub mod redis_row_store;
mod scripts;

pub use redis_row_store::RedisRowStore;

#[cfg(test)]
mod tests;
