//! A catalog of localizable strings with interchangeable storage
//! backends.
//!
//! Projects group expressions (translatable keys), and each expression
//! owns locale-specific translations. The same insert/update/delete/query
//! contract, [`catalog::Catalog`], is implemented by three backends: an
//! in-memory object graph, a SQLite database, and a directory of JSON
//! documents. Callers address entities only by public UUID; everything
//! backend-internal stays behind the contract.

pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod locale;
pub mod model;
pub mod store;

pub use catalog::{Catalog, CatalogStats, Rows};
pub use error::{CatalogError, Result};
