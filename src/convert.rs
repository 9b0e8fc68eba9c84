//! The seam between interchange-format converters and the catalog.
//!
//! File-format parsing lives outside this crate; converters hand over
//! plain key/value pairs plus the source locale, and get back entities
//! with nil placeholder UUIDs. Identity is assigned when the entities
//! are inserted into a catalog, never here.

use uuid::Uuid;

use crate::error::Result;
use crate::locale::Locale;
use crate::model::{Expression, Translation};

/// Build one expression per key/value pair.
///
/// Each expression carries exactly one translation in `locale`, its key
/// doubles as its display name, and all UUIDs are the nil placeholder.
pub fn expressions_from_pairs(pairs: &[(String, String)], locale: Locale) -> Result<Vec<Expression>> {
    let mut expressions = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        let mut expression = Expression::with_id(Uuid::nil(), key, key, locale.language)?;
        expression
            .translations
            .push(Translation::with_id(Uuid::nil(), Uuid::nil(), locale, value));
        expressions.push(expression);
    }
    Ok(expressions)
}

/// Flatten expressions back to key/value pairs for `locale`.
///
/// Expressions without a translation in `locale` (language-only match)
/// are skipped; they belong to a different output file.
pub fn pairs_from_expressions(expressions: &[Expression], locale: Locale) -> Vec<(String, String)> {
    expressions
        .iter()
        .filter_map(|expression| {
            expression
                .translations
                .iter()
                .find(|t| locale.matches(&t.locale, false))
                .map(|t| (expression.key.clone(), t.value.clone()))
        })
        .collect()
}
