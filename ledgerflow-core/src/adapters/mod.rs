pub mod duckdb;

pub use duckdb::DuckDbStore;
