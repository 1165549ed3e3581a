//! Storage adapters for the [`IdentityRepository`](crate::identity::IdentityRepository) port.

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::InMemoryIdentityRepository;
#[cfg(feature = "database")]
pub use postgres::PostgresIdentityRepository;
