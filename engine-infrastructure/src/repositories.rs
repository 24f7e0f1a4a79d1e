pub mod clickhouse_store;

pub use clickhouse_store::*;
