//! Infrastructure Layer
//!
//! Repository implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRankingRepository;
pub use postgres::PgRankingRepository;
