//! Forward schema migration for document-store files.
//!
//! Every document carries a `version` tag. On read, a document at an
//! older version is walked through the transform chain below, one
//! version step at a time, before it is handed to the rest of the
//! system. Each transform is a pure in-memory edit; the on-disk copy is
//! rewritten at the current version on the next write, never on read.

use serde_json::{Map, Value};

use crate::error::{CatalogError, Result};
use crate::model::EntityKind;

/// Current document schema version.
pub(crate) const SCHEMA_VERSION: u32 = 3;

type Transform = fn(EntityKind, &mut Map<String, Value>);

/// The chain, in order. Entry `(n, f)` migrates a version `n - 1`
/// document to version `n`.
const TRANSFORMS: &[(u32, Transform)] = &[(2, add_value_field), (3, add_state_field)];

/// v1 -> v2: translations gain an explicit rendered-value field.
fn add_value_field(kind: EntityKind, doc: &mut Map<String, Value>) {
    if kind == EntityKind::Translation && !doc.contains_key("value") {
        doc.insert("value".to_string(), Value::String(String::new()));
    }
}

/// v2 -> v3: translations gain a workflow-state field.
fn add_state_field(kind: EntityKind, doc: &mut Map<String, Value>) {
    if kind == EntityKind::Translation && !doc.contains_key("state") {
        doc.insert("state".to_string(), Value::String("new".to_string()));
    }
}

/// Migrate a parsed document in memory up to [`SCHEMA_VERSION`].
///
/// A document without a `version` tag is treated as version 1. A version
/// beyond the current one is from a newer build of this tool and cannot
/// be interpreted, so it fails with `UnhandledConversion`.
pub(crate) fn migrate(kind: EntityKind, doc: &mut Value) -> Result<()> {
    let object = doc.as_object_mut().ok_or_else(|| {
        CatalogError::UnhandledConversion(format!("{} document is not an object", kind))
    })?;
    let mut version = object
        .get("version")
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .unwrap_or(1);
    if version > SCHEMA_VERSION {
        return Err(CatalogError::UnhandledConversion(format!(
            "{} document has unknown version {} (current is {})",
            kind, version, SCHEMA_VERSION
        )));
    }
    for (target, transform) in TRANSFORMS {
        if version < *target {
            transform(kind, object);
            version = *target;
        }
    }
    object.insert("version".to_string(), Value::from(SCHEMA_VERSION));
    Ok(())
}
