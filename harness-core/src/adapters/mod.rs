//! Adapter implementations
//!
//! Adapters implement the [`QueryStrategy`](crate::ports::QueryStrategy) port:
//! - `docker exec ... psql` for a database in a sibling container
//! - plain `psql` for a directly reachable database

pub mod container;
pub mod direct;
mod psql;

pub use container::ContainerStrategy;
pub use direct::DirectStrategy;
