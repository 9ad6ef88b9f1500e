pub mod migrate;
pub mod pool;
