//! Storage seams. Each trait has a Postgres implementation and an
//! in-memory one.

pub mod event;
pub mod memory;
pub mod user;

pub use event::{EventRepository, PgEventRepository};
pub use memory::{InMemoryEventRepository, InMemoryUserRepository};
pub use user::{PgUserRepository, UserRepository};
