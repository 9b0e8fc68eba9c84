use anyhow::{bail, Context, Result};

use crate::catalog::Catalog;
use crate::store::{FileCatalog, MemoryCatalog, SqliteCatalog};

/// Which storage backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Sqlite,
    File,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend selection
    pub backend: BackendKind,

    /// SQLite database path (sqlite backend)
    pub sqlite_path: String,

    /// Catalog root directory (file backend)
    pub catalog_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let backend = match std::env::var("CATALOG_BACKEND")
            .unwrap_or_else(|_| "sqlite".to_string())
            .as_str()
        {
            "memory" => BackendKind::Memory,
            "sqlite" => BackendKind::Sqlite,
            "file" => BackendKind::File,
            other => bail!("Unknown CATALOG_BACKEND '{}'", other),
        };

        Ok(Self {
            backend,
            sqlite_path: std::env::var("CATALOG_SQLITE_PATH")
                .unwrap_or_else(|_| "catalog.db".to_string()),
            catalog_dir: std::env::var("CATALOG_DIR").unwrap_or_else(|_| "Catalog".to_string()),
        })
    }

    /// Open the configured backend behind the catalog contract.
    pub fn open_catalog(&self) -> Result<Box<dyn Catalog>> {
        Ok(match self.backend {
            BackendKind::Memory => Box::new(MemoryCatalog::new()),
            BackendKind::Sqlite => Box::new(
                SqliteCatalog::open(&self.sqlite_path)
                    .with_context(|| format!("Failed to open database at {}", self.sqlite_path))?,
            ),
            BackendKind::File => Box::new(
                FileCatalog::open(&self.catalog_dir)
                    .with_context(|| format!("Failed to open catalog at {}", self.catalog_dir))?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_opens_without_paths() {
        let config = Config {
            backend: BackendKind::Memory,
            sqlite_path: String::new(),
            catalog_dir: String::new(),
        };
        assert!(config.open_catalog().is_ok());
    }
}
