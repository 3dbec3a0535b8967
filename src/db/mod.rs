pub mod migrations;
mod pool;

pub use pool::create_pool;
