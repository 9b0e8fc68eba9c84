//! Storage backends for the catalog contract.
//!
//! Three interchangeable adapters, selected at construction time:
//!
//! - `memory`: an in-memory object graph with bidirectional relationship
//!   sets
//! - `sqlite`: normalized relational tables behind internal integer keys
//! - `file`: one versioned JSON document per entity
//!
//! All three implement [`crate::catalog::Catalog`] with identical
//! observable behavior; the differences (transactionality, migration,
//! internal keys) stay inside each adapter.

mod file;
mod memory;
mod migrate;
mod sqlite;

pub use file::FileCatalog;
pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;
