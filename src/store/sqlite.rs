//! Relational adapter: normalized SQLite tables plus a join table for
//! project membership.
//!
//! Rows carry two identities: the public UUID (an indexed unique text
//! column) and an auto-incrementing integer key used only for foreign-key
//! linkage inside this backend. The integer key never crosses the module
//! boundary; it is wrapped in the private [`RowId`] newtype so it cannot
//! be confused with anything public.
//!
//! Multi-step writes (expression insert with embedded translations,
//! cascade deletes) run inside a transaction, so a partial cascade is
//! never observable. A stored value that cannot be reconstructed (a
//! malformed UUID or an unparseable non-empty locale code) is a
//! corrupted row and surfaces as `UnhandledConversion`; only *absent*
//! optional fields get the locale-default fallback.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{self, Catalog, CatalogStats, Rows};
use crate::error::{CatalogError, Result};
use crate::locale::{LanguageCode, Locale, RegionCode, ScriptCode};
use crate::model::{EntityKind, Expression, Project, Translation, TranslationState};

/// Backend-internal auto-increment key. Never exposed through the
/// catalog contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowId(i64);

/// SQLite-backed catalog.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open (or create) a catalog database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    /// Open a throwaway in-memory catalog.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS project (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uuid TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS expression (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uuid TEXT NOT NULL UNIQUE,
                key TEXT NOT NULL,
                name TEXT NOT NULL,
                default_language TEXT NOT NULL,
                context TEXT,
                feature TEXT
            );
            CREATE TABLE IF NOT EXISTS translation (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uuid TEXT NOT NULL UNIQUE,
                expression_id INTEGER NOT NULL REFERENCES expression(id),
                language_code TEXT NOT NULL,
                script_code TEXT,
                region_code TEXT,
                value TEXT NOT NULL,
                state TEXT NOT NULL DEFAULT 'new'
            );
            CREATE TABLE IF NOT EXISTS project_expression (
                project_id INTEGER NOT NULL REFERENCES project(id),
                expression_id INTEGER NOT NULL REFERENCES expression(id),
                PRIMARY KEY (project_id, expression_id)
            );
            CREATE INDEX IF NOT EXISTS idx_translation_expression
                ON translation(expression_id);",
        )?;
        Ok(())
    }

    fn row_id(&self, table: &str, uuid: Uuid) -> Result<Option<RowId>> {
        let sql = format!("SELECT id FROM {} WHERE uuid = ?1", table);
        let id: Option<i64> = self
            .conn
            .query_row(&sql, params![uuid.to_string()], |row| row.get(0))
            .optional()?;
        Ok(id.map(RowId))
    }

    fn require_row_id(&self, kind: EntityKind, uuid: Uuid) -> Result<RowId> {
        self.row_id(kind.as_str(), uuid)?
            .ok_or_else(|| CatalogError::dangling(kind, uuid))
    }

    fn load_translations(&self, owner: RowId, expression_uuid: Uuid) -> Result<Vec<Translation>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, language_code, script_code, region_code, value, state
             FROM translation WHERE expression_id = ?1",
        )?;
        let raw = stmt
            .query_map(params![owner.0], |row| {
                Ok(RawTranslation {
                    uuid: row.get(0)?,
                    language: row.get(1)?,
                    script: row.get(2)?,
                    region: row.get(3)?,
                    value: row.get(4)?,
                    state: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut translations = Vec::with_capacity(raw.len());
        for row in raw {
            translations.push(row.into_translation(expression_uuid)?);
        }
        catalog::sort_translations(&mut translations);
        Ok(translations)
    }

    fn assemble_expression(&self, row: RawExpression) -> Result<Expression> {
        let id = parse_stored_uuid(&row.uuid)?;
        let expression = Expression {
            id,
            key: row.key,
            name: row.name,
            default_language: language_from_column(Some(row.default_language.as_str()))?,
            context: row.context,
            feature: row.feature,
            translations: self.load_translations(RowId(row.id), id)?,
        };
        Ok(expression)
    }

    fn load_expressions(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Expression>> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_map(args, |row| {
                Ok(RawExpression {
                    id: row.get(0)?,
                    uuid: row.get(1)?,
                    key: row.get(2)?,
                    name: row.get(3)?,
                    default_language: row.get(4)?,
                    context: row.get(5)?,
                    feature: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut expressions = Vec::with_capacity(raw.len());
        for row in raw {
            expressions.push(self.assemble_expression(row)?);
        }
        catalog::sort_expressions(&mut expressions);
        Ok(expressions)
    }

    fn expressions_where<F>(&self, keep: F) -> Result<Rows<Expression>>
    where
        F: Fn(&Expression) -> bool,
    {
        let mut expressions = self.load_expressions(EXPRESSION_SELECT, &[])?;
        expressions.retain(|e| keep(e));
        Ok(Rows::from_vec(expressions))
    }

    fn load_projects(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_map(args, |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<(String, String)>, _>>()?;

        let mut projects = Vec::with_capacity(raw.len());
        for (uuid, name) in raw {
            projects.push(Project {
                id: parse_stored_uuid(&uuid)?,
                name,
            });
        }
        catalog::sort_projects(&mut projects);
        Ok(projects)
    }

    fn load_translation_rows(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Translation>> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_map(args, |row| {
                Ok((
                    RawTranslation {
                        uuid: row.get(0)?,
                        language: row.get(1)?,
                        script: row.get(2)?,
                        region: row.get(3)?,
                        value: row.get(4)?,
                        state: row.get(5)?,
                    },
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut translations = Vec::with_capacity(raw.len());
        for (row, expression_uuid) in raw {
            let owner = parse_stored_uuid(&expression_uuid)?;
            translations.push(row.into_translation(owner)?);
        }
        catalog::sort_translations(&mut translations);
        Ok(translations)
    }

    fn insert_translation_row(
        tx: &rusqlite::Transaction<'_>,
        owner: RowId,
        translation: &Translation,
    ) -> Result<()> {
        tx.execute(
            "INSERT INTO translation
                (uuid, expression_id, language_code, script_code, region_code, value, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                translation.id.to_string(),
                owner.0,
                translation.locale.language.code(),
                translation.locale.script.map(|s| s.code()),
                translation.locale.region.map(|r| r.code()),
                translation.value,
                translation.state.as_str(),
            ],
        )?;
        Ok(())
    }

    fn exists(&self, table: &str, uuid: Uuid) -> Result<bool> {
        Ok(self.row_id(table, uuid)?.is_some())
    }
}

const EXPRESSION_SELECT: &str =
    "SELECT id, uuid, key, name, default_language, context, feature FROM expression";

const TRANSLATION_SELECT: &str = "SELECT t.uuid, t.language_code, t.script_code, t.region_code,
            t.value, t.state, e.uuid
     FROM translation t JOIN expression e ON e.id = t.expression_id";

struct RawExpression {
    id: i64,
    uuid: String,
    key: String,
    name: String,
    default_language: String,
    context: Option<String>,
    feature: Option<String>,
}

struct RawTranslation {
    uuid: String,
    language: Option<String>,
    script: Option<String>,
    region: Option<String>,
    value: String,
    state: Option<String>,
}

impl RawTranslation {
    fn into_translation(self, expression_id: Uuid) -> Result<Translation> {
        Ok(Translation {
            id: parse_stored_uuid(&self.uuid)?,
            expression_id,
            locale: Locale {
                language: language_from_column(self.language.as_deref())?,
                script: script_from_column(self.script.as_deref())?,
                region: region_from_column(self.region.as_deref())?,
            },
            value: self.value,
            state: TranslationState::from_stored(self.state.as_deref()),
        })
    }
}

fn parse_stored_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| CatalogError::UnhandledConversion(format!("malformed uuid '{}'", value)))
}

/// Absent (NULL or blank) language falls back to the default; a present
/// but unrecognized code is a corrupted row.
fn language_from_column(value: Option<&str>) -> Result<LanguageCode> {
    match value.map(str::trim) {
        None | Some("") => Ok(LanguageCode::default_language()),
        Some(code) => LanguageCode::from_code(code).map_err(|e| {
            CatalogError::UnhandledConversion(format!("corrupted language column: {}", e))
        }),
    }
}

fn script_from_column(value: Option<&str>) -> Result<Option<ScriptCode>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(code) => ScriptCode::from_code(code).map(Some).map_err(|e| {
            CatalogError::UnhandledConversion(format!("corrupted script column: {}", e))
        }),
    }
}

fn region_from_column(value: Option<&str>) -> Result<Option<RegionCode>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(code) => RegionCode::from_code(code).map(Some).map_err(|e| {
            CatalogError::UnhandledConversion(format!("corrupted region column: {}", e))
        }),
    }
}

impl Catalog for SqliteCatalog {
    fn insert_project(&mut self, mut project: Project) -> Result<Project> {
        project.id = catalog::ensure_id(project.id);
        if self.exists("project", project.id)? {
            return Err(CatalogError::duplicate(EntityKind::Project, project.id));
        }
        self.conn.execute(
            "INSERT INTO project (uuid, name) VALUES (?1, ?2)",
            params![project.id.to_string(), project.name],
        )?;
        Ok(project)
    }

    fn insert_expression(&mut self, mut expression: Expression) -> Result<Expression> {
        expression.id = catalog::ensure_id(expression.id);
        if self.exists("expression", expression.id)? {
            return Err(CatalogError::duplicate(
                EntityKind::Expression,
                expression.id,
            ));
        }
        // Ids repeated within the embedded list are caught here, before
        // the UNIQUE constraint would turn them into a raw SQLite error.
        let mut assigned = HashSet::new();
        for translation in expression.translations.iter_mut() {
            translation.id = catalog::ensure_id(translation.id);
            translation.expression_id = expression.id;
            if self.exists("translation", translation.id)? || !assigned.insert(translation.id) {
                return Err(CatalogError::duplicate(
                    EntityKind::Translation,
                    translation.id,
                ));
            }
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO expression (uuid, key, name, default_language, context, feature)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                expression.id.to_string(),
                expression.key,
                expression.name,
                expression.default_language.code(),
                expression.context,
                expression.feature,
            ],
        )?;
        let owner = RowId(tx.last_insert_rowid());
        for translation in &expression.translations {
            Self::insert_translation_row(&tx, owner, translation)?;
        }
        tx.commit()?;

        catalog::sort_translations(&mut expression.translations);
        Ok(expression)
    }

    fn insert_translation(&mut self, mut translation: Translation) -> Result<Translation> {
        let owner = self.require_row_id(EntityKind::Expression, translation.expression_id)?;
        translation.id = catalog::ensure_id(translation.id);
        if self.exists("translation", translation.id)? {
            return Err(CatalogError::duplicate(
                EntityKind::Translation,
                translation.id,
            ));
        }
        let tx = self.conn.transaction()?;
        Self::insert_translation_row(&tx, owner, &translation)?;
        tx.commit()?;
        Ok(translation)
    }

    fn update_project(&mut self, project: &Project) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE project SET name = ?1 WHERE uuid = ?2",
            params![project.name, project.id.to_string()],
        )?;
        if changed == 0 {
            return Err(CatalogError::not_found(EntityKind::Project, project.id));
        }
        Ok(())
    }

    fn update_expression(&mut self, expression: &Expression) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE expression
             SET key = ?1, name = ?2, default_language = ?3, context = ?4, feature = ?5
             WHERE uuid = ?6",
            params![
                expression.key,
                expression.name,
                expression.default_language.code(),
                expression.context,
                expression.feature,
                expression.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(CatalogError::not_found(
                EntityKind::Expression,
                expression.id,
            ));
        }
        Ok(())
    }

    fn update_translation(&mut self, translation: &Translation) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE translation
             SET language_code = ?1, script_code = ?2, region_code = ?3, value = ?4, state = ?5
             WHERE uuid = ?6",
            params![
                translation.locale.language.code(),
                translation.locale.script.map(|s| s.code()),
                translation.locale.region.map(|r| r.code()),
                translation.value,
                translation.state.as_str(),
                translation.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(CatalogError::not_found(
                EntityKind::Translation,
                translation.id,
            ));
        }
        Ok(())
    }

    fn delete(&mut self, kind: EntityKind, id: Uuid) -> Result<()> {
        let row = self
            .row_id(kind.as_str(), id)?
            .ok_or_else(|| CatalogError::not_found(kind, id))?;

        let tx = self.conn.transaction()?;
        match kind {
            EntityKind::Project => {
                tx.execute(
                    "DELETE FROM project_expression WHERE project_id = ?1",
                    params![row.0],
                )?;
                tx.execute("DELETE FROM project WHERE id = ?1", params![row.0])?;
            }
            EntityKind::Expression => {
                debug!(expression = %id, "cascading expression delete");
                tx.execute(
                    "DELETE FROM translation WHERE expression_id = ?1",
                    params![row.0],
                )?;
                tx.execute(
                    "DELETE FROM project_expression WHERE expression_id = ?1",
                    params![row.0],
                )?;
                tx.execute("DELETE FROM expression WHERE id = ?1", params![row.0])?;
            }
            EntityKind::Translation => {
                tx.execute("DELETE FROM translation WHERE id = ?1", params![row.0])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn link_expression(&mut self, expression_id: Uuid, project_id: Uuid) -> Result<()> {
        let expression = self.require_row_id(EntityKind::Expression, expression_id)?;
        let project = self.require_row_id(EntityKind::Project, project_id)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO project_expression (project_id, expression_id)
             VALUES (?1, ?2)",
            params![project.0, expression.0],
        )?;
        Ok(())
    }

    fn unlink_expression(&mut self, expression_id: Uuid, project_id: Uuid) -> Result<()> {
        let expression = self.require_row_id(EntityKind::Expression, expression_id)?;
        let project = self.require_row_id(EntityKind::Project, project_id)?;
        self.conn.execute(
            "DELETE FROM project_expression WHERE project_id = ?1 AND expression_id = ?2",
            params![project.0, expression.0],
        )?;
        Ok(())
    }

    fn projects(&self) -> Result<Rows<Project>> {
        Ok(Rows::from_vec(
            self.load_projects("SELECT uuid, name FROM project", &[])?,
        ))
    }

    fn project(&self, id: Uuid) -> Result<Option<Project>> {
        let projects = self.load_projects(
            "SELECT uuid, name FROM project WHERE uuid = ?1",
            &[&id.to_string()],
        )?;
        Ok(projects.into_iter().next())
    }

    fn projects_named(&self, name: &str, exact: bool) -> Result<Rows<Project>> {
        let mut projects = self.load_projects("SELECT uuid, name FROM project", &[])?;
        projects.retain(|p| catalog::project_name_matches(p, name, exact));
        Ok(Rows::from_vec(projects))
    }

    fn projects_containing(&self, expression_id: Uuid) -> Result<Rows<Project>> {
        Ok(Rows::from_vec(self.load_projects(
            "SELECT p.uuid, p.name FROM project p
             JOIN project_expression pe ON pe.project_id = p.id
             JOIN expression e ON e.id = pe.expression_id
             WHERE e.uuid = ?1",
            &[&expression_id.to_string()],
        )?))
    }

    fn expressions(&self) -> Result<Rows<Expression>> {
        Ok(Rows::from_vec(self.load_expressions(EXPRESSION_SELECT, &[])?))
    }

    fn expression(&self, id: Uuid) -> Result<Option<Expression>> {
        let expressions = self.load_expressions(
            "SELECT id, uuid, key, name, default_language, context, feature
             FROM expression WHERE uuid = ?1",
            &[&id.to_string()],
        )?;
        Ok(expressions.into_iter().next())
    }

    fn expressions_with_key(&self, key: &str) -> Result<Rows<Expression>> {
        Ok(Rows::from_vec(self.load_expressions(
            "SELECT id, uuid, key, name, default_language, context, feature
             FROM expression WHERE key = ?1",
            &[&key],
        )?))
    }

    fn expressions_in_project(&self, project_id: Uuid) -> Result<Rows<Expression>> {
        Ok(Rows::from_vec(self.load_expressions(
            "SELECT e.id, e.uuid, e.key, e.name, e.default_language, e.context, e.feature
             FROM expression e
             JOIN project_expression pe ON pe.expression_id = e.id
             JOIN project p ON p.id = pe.project_id
             WHERE p.uuid = ?1",
            &[&project_id.to_string()],
        )?))
    }

    fn expressions_matching_value(&self, needle: &str) -> Result<Rows<Expression>> {
        self.expressions_where(|e| catalog::expression_value_matches(e, needle))
    }

    fn expressions_with_locale(&self, locale: &Locale, exact: bool) -> Result<Rows<Expression>> {
        self.expressions_where(|e| catalog::expression_has_locale(e, locale, exact))
    }

    fn expressions_with_only_locale(&self, locale: &Locale) -> Result<Rows<Expression>> {
        self.expressions_where(|e| catalog::expression_has_only_locale(e, locale))
    }

    fn expressions_in_state(&self, state: TranslationState) -> Result<Rows<Expression>> {
        self.expressions_where(|e| catalog::expression_in_state(e, state))
    }

    fn translations(&self) -> Result<Rows<Translation>> {
        Ok(Rows::from_vec(
            self.load_translation_rows(TRANSLATION_SELECT, &[])?,
        ))
    }

    fn translation(&self, id: Uuid) -> Result<Option<Translation>> {
        let sql = format!("{} WHERE t.uuid = ?1", TRANSLATION_SELECT);
        let translations = self.load_translation_rows(&sql, &[&id.to_string()])?;
        Ok(translations.into_iter().next())
    }

    fn translations_for(&self, expression_id: Uuid) -> Result<Rows<Translation>> {
        let sql = format!("{} WHERE e.uuid = ?1", TRANSLATION_SELECT);
        Ok(Rows::from_vec(
            self.load_translation_rows(&sql, &[&expression_id.to_string()])?,
        ))
    }

    fn translations_with_locale(&self, locale: &Locale, exact: bool) -> Result<Rows<Translation>> {
        let mut translations = self.load_translation_rows(TRANSLATION_SELECT, &[])?;
        translations.retain(|t| locale.matches(&t.locale, exact));
        Ok(Rows::from_vec(translations))
    }

    fn locale_identifiers(&self) -> Result<Vec<String>> {
        let translations = self.load_translation_rows(TRANSLATION_SELECT, &[])?;
        Ok(catalog::distinct_locale_identifiers(translations.iter()))
    }

    fn stats(&self) -> Result<CatalogStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(CatalogStats {
            projects: count("SELECT COUNT(*) FROM project")?,
            expressions: count("SELECT COUNT(*) FROM expression")?,
            translations: count("SELECT COUNT(*) FROM translation")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LanguageCode;

    fn store() -> SqliteCatalog {
        SqliteCatalog::open_in_memory().unwrap()
    }

    fn en() -> Locale {
        Locale::new(LanguageCode::ENGLISH)
    }

    // ==================== Identity Tests ====================

    #[test]
    fn test_internal_key_distinct_from_uuid() {
        let mut store = store();
        let project = store.insert_project(Project::new("App").unwrap()).unwrap();
        let row: i64 = store
            .conn
            .query_row(
                "SELECT id FROM project WHERE uuid = ?1",
                params![project.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        // The rowid exists, but nothing public carries it.
        assert_eq!(row, 1);
        assert!(!project.id.is_nil());
    }

    #[test]
    fn test_foreign_keys_use_internal_ids() {
        let mut store = store();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();
        let fk: i64 = store
            .conn
            .query_row("SELECT expression_id FROM translation", [], |row| row.get(0))
            .unwrap();
        let owner: i64 = store
            .conn
            .query_row("SELECT id FROM expression", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, owner);
    }

    // ==================== Cascade Tests ====================

    #[test]
    fn test_expression_delete_cascades_in_one_transaction() {
        let mut store = store();
        let project = store.insert_project(Project::new("App").unwrap()).unwrap();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store.link_expression(expression.id, project.id).unwrap();
        store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();

        store.delete(EntityKind::Expression, expression.id).unwrap();

        let translations: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM translation", [], |row| row.get(0))
            .unwrap();
        let links: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM project_expression", [], |row| row.get(0))
            .unwrap();
        assert_eq!(translations, 0);
        assert_eq!(links, 0);
        assert!(store.project(project.id).unwrap().is_some());
    }

    // ==================== Conversion Tests ====================

    #[test]
    fn test_corrupted_uuid_surfaces_unhandled_conversion() {
        let store = {
            let mut s = store();
            s.conn
                .execute(
                    "INSERT INTO project (uuid, name) VALUES ('not-a-uuid', 'Broken')",
                    [],
                )
                .unwrap();
            s
        };
        let result = store.projects();
        assert!(matches!(
            result,
            Err(CatalogError::UnhandledConversion(_))
        ));
    }

    #[test]
    fn test_corrupted_language_surfaces_unhandled_conversion() {
        let mut store = store();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store
            .conn
            .execute(
                "UPDATE expression SET default_language = 'qq' WHERE uuid = ?1",
                params![expression.id.to_string()],
            )
            .unwrap();
        assert!(matches!(
            store.expression(expression.id),
            Err(CatalogError::UnhandledConversion(_))
        ));
    }

    #[test]
    fn test_blank_language_falls_back_to_default() {
        let mut store = store();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();
        store
            .conn
            .execute("UPDATE translation SET language_code = ''", [])
            .unwrap();
        let fetched = store.expression(expression.id).unwrap().unwrap();
        assert_eq!(
            fetched.translations[0].locale.language,
            LanguageCode::default_language()
        );
    }

    #[test]
    fn test_unknown_state_defaults_to_new() {
        let mut store = store();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();
        store
            .conn
            .execute("UPDATE translation SET state = 'bogus'", [])
            .unwrap();
        let fetched = store.expression(expression.id).unwrap().unwrap();
        assert_eq!(fetched.translations[0].state, TranslationState::New);
    }
}
