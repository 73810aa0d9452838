pub mod connection;
pub mod error;
pub mod repositories;
pub mod store;

pub use connection::{open, open_in_memory, run_migrations};
pub use error::{DbError, Result};
pub use repositories::alert_repository::AlertRepository;
pub use repositories::namespace_repository::NamespaceRepository;
pub use store::{AlertStore, NamespaceStore};
