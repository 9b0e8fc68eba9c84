//! Document-store adapter: one pretty-printed JSON document per entity.
//!
//! Layout under the catalog root:
//!
//! ```text
//! <root>/project/<uuid>.json       name + ordered expression uuid list
//! <root>/expression/<uuid>.json    fields + ordered translation uuid list
//! <root>/translation/<uuid>.json   fields + owning expression uuid
//! ```
//!
//! Documents are written with sorted keys so diffs stay readable. There
//! is no transactional multi-document write: cascade operations run as
//! an explicit ordered sequence of single-file writes, and a crash
//! mid-sequence can leave a dangling reference. Readers that *follow* a
//! reference (a project's expression list, an expression's translation
//! list) surface a dangling target as `InvalidForeignReference`, and
//! reading an orphan translation document whose owning expression is
//! gone reports the same error. `delete` still accepts the orphan, so
//! the broken state can be repaired.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::{self, Catalog, CatalogStats, Rows};
use crate::error::{CatalogError, Result};
use crate::locale::{LanguageCode, Locale, RegionCode, ScriptCode};
use crate::model::{EntityKind, Expression, Project, Translation, TranslationState};
use crate::store::migrate::{self, SCHEMA_VERSION};

#[derive(Debug, Serialize, Deserialize)]
struct ProjectDoc {
    version: u32,
    uuid: String,
    name: String,
    #[serde(default)]
    expressions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExpressionDoc {
    version: u32,
    uuid: String,
    key: String,
    name: String,
    #[serde(default)]
    default_language: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    feature: Option<String>,
    #[serde(default)]
    translations: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TranslationDoc {
    version: u32,
    uuid: String,
    expression: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    value: String,
    #[serde(default)]
    state: Option<String>,
}

/// Flat-file catalog backend.
pub struct FileCatalog {
    root: PathBuf,
}

impl FileCatalog {
    /// Open (or create) a catalog rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for kind in [
            EntityKind::Project,
            EntityKind::Expression,
            EntityKind::Translation,
        ] {
            fs::create_dir_all(root.join(kind.as_str()))?;
        }
        Ok(Self { root })
    }

    fn path(&self, kind: EntityKind, id: Uuid) -> PathBuf {
        self.root.join(kind.as_str()).join(format!("{}.json", id))
    }

    fn document_exists(&self, kind: EntityKind, id: Uuid) -> bool {
        self.path(kind, id).is_file()
    }

    /// Read and migrate a document. `Ok(None)` means the file is absent.
    fn read_document(&self, kind: EntityKind, id: Uuid) -> Result<Option<Value>> {
        let path = self.path(kind, id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut doc: Value = serde_json::from_str(&text).map_err(|e| {
            CatalogError::UnhandledConversion(format!(
                "unparseable {} document {}: {}",
                kind, id, e
            ))
        })?;
        migrate::migrate(kind, &mut doc)?;
        Ok(Some(doc))
    }

    fn write_document<T: Serialize>(&self, kind: EntityKind, id: Uuid, doc: &T) -> Result<()> {
        // serde_json's map is a BTreeMap, so round-tripping through Value
        // sorts the keys deterministically.
        let value = serde_json::to_value(doc)
            .map_err(|e| CatalogError::UnhandledConversion(e.to_string()))?;
        let pretty = serde_json::to_string_pretty(&value)
            .map_err(|e| CatalogError::UnhandledConversion(e.to_string()))?;
        fs::write(self.path(kind, id), pretty)?;
        Ok(())
    }

    fn remove_document(&self, kind: EntityKind, id: Uuid) -> Result<()> {
        fs::remove_file(self.path(kind, id))?;
        Ok(())
    }

    /// All document ids of a kind, from the directory listing.
    fn list_ids(&self, kind: EntityKind) -> Result<Vec<Uuid>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.root.join(kind.as_str()))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            ids.push(parse_doc_uuid(stem)?);
        }
        Ok(ids)
    }

    fn load_project_doc(&self, id: Uuid) -> Result<Option<ProjectDoc>> {
        match self.read_document(EntityKind::Project, id)? {
            Some(value) => Ok(Some(decode(EntityKind::Project, value)?)),
            None => Ok(None),
        }
    }

    fn load_expression_doc(&self, id: Uuid) -> Result<Option<ExpressionDoc>> {
        match self.read_document(EntityKind::Expression, id)? {
            Some(value) => Ok(Some(decode(EntityKind::Expression, value)?)),
            None => Ok(None),
        }
    }

    fn load_translation_doc(&self, id: Uuid) -> Result<Option<TranslationDoc>> {
        match self.read_document(EntityKind::Translation, id)? {
            Some(value) => Ok(Some(decode(EntityKind::Translation, value)?)),
            None => Ok(None),
        }
    }

    /// Load a translation, refusing an orphan whose owning expression
    /// document is gone. `delete` bypasses this so orphans stay
    /// removable.
    fn load_translation(&self, id: Uuid) -> Result<Option<Translation>> {
        let Some(doc) = self.load_translation_doc(id)? else {
            return Ok(None);
        };
        let translation = translation_from_doc(doc)?;
        if !self.document_exists(EntityKind::Expression, translation.expression_id) {
            return Err(CatalogError::dangling(
                EntityKind::Expression,
                translation.expression_id,
            ));
        }
        Ok(Some(translation))
    }

    /// Load an expression with its full translation set. A translation
    /// listed in the document but missing on disk is a dangling
    /// reference.
    fn load_expression(&self, id: Uuid) -> Result<Option<Expression>> {
        let Some(doc) = self.load_expression_doc(id)? else {
            return Ok(None);
        };
        let expression_id = parse_doc_uuid(&doc.uuid)?;
        let mut translations = Vec::with_capacity(doc.translations.len());
        for raw in &doc.translations {
            let translation_id = parse_doc_uuid(raw)?;
            let translation = self
                .load_translation(translation_id)?
                .ok_or_else(|| CatalogError::dangling(EntityKind::Translation, translation_id))?;
            translations.push(translation);
        }
        catalog::sort_translations(&mut translations);
        Ok(Some(Expression {
            id: expression_id,
            key: doc.key,
            name: doc.name,
            default_language: LanguageCode::from_stored(doc.default_language.as_deref()),
            context: doc.context,
            feature: doc.feature,
            translations,
        }))
    }

    fn all_projects(&self) -> Result<Vec<Project>> {
        let mut projects = Vec::new();
        for id in self.list_ids(EntityKind::Project)? {
            if let Some(doc) = self.load_project_doc(id)? {
                projects.push(project_from_doc(doc)?);
            }
        }
        catalog::sort_projects(&mut projects);
        Ok(projects)
    }

    fn all_expressions(&self) -> Result<Vec<Expression>> {
        let mut expressions = Vec::new();
        for id in self.list_ids(EntityKind::Expression)? {
            if let Some(expression) = self.load_expression(id)? {
                expressions.push(expression);
            }
        }
        catalog::sort_expressions(&mut expressions);
        Ok(expressions)
    }

    fn all_translations(&self) -> Result<Vec<Translation>> {
        let mut translations = Vec::new();
        for id in self.list_ids(EntityKind::Translation)? {
            if let Some(translation) = self.load_translation(id)? {
                translations.push(translation);
            }
        }
        catalog::sort_translations(&mut translations);
        Ok(translations)
    }

    fn expressions_where<F>(&self, keep: F) -> Result<Rows<Expression>>
    where
        F: Fn(&Expression) -> bool,
    {
        let mut expressions = self.all_expressions()?;
        expressions.retain(|e| keep(e));
        Ok(Rows::from_vec(expressions))
    }

    fn write_translation(&self, translation: &Translation) -> Result<()> {
        let doc = TranslationDoc {
            version: SCHEMA_VERSION,
            uuid: translation.id.to_string(),
            expression: translation.expression_id.to_string(),
            language: Some(translation.locale.language.code().to_string()),
            script: translation.locale.script.map(|s| s.code().to_string()),
            region: translation.locale.region.map(|r| r.code().to_string()),
            value: translation.value.clone(),
            state: Some(translation.state.as_str().to_string()),
        };
        self.write_document(EntityKind::Translation, translation.id, &doc)
    }

    fn write_expression(&self, expression: &Expression, translations: &[Uuid]) -> Result<()> {
        let doc = ExpressionDoc {
            version: SCHEMA_VERSION,
            uuid: expression.id.to_string(),
            key: expression.key.clone(),
            name: expression.name.clone(),
            default_language: Some(expression.default_language.code().to_string()),
            context: expression.context.clone(),
            feature: expression.feature.clone(),
            translations: translations.iter().map(Uuid::to_string).collect(),
        };
        self.write_document(EntityKind::Expression, expression.id, &doc)
    }

    fn write_project(&self, project: &Project, expressions: &[String]) -> Result<()> {
        let doc = ProjectDoc {
            version: SCHEMA_VERSION,
            uuid: project.id.to_string(),
            name: project.name.clone(),
            expressions: expressions.to_vec(),
        };
        self.write_document(EntityKind::Project, project.id, &doc)
    }
}

fn decode<T: for<'de> Deserialize<'de>>(kind: EntityKind, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        CatalogError::InvalidValue(format!("malformed {} document: {}", kind, e))
    })
}

fn parse_doc_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| CatalogError::UnhandledConversion(format!("malformed uuid '{}'", value)))
}

fn project_from_doc(doc: ProjectDoc) -> Result<Project> {
    Ok(Project {
        id: parse_doc_uuid(&doc.uuid)?,
        name: doc.name,
    })
}

fn translation_from_doc(doc: TranslationDoc) -> Result<Translation> {
    Ok(Translation {
        id: parse_doc_uuid(&doc.uuid)?,
        expression_id: parse_doc_uuid(&doc.expression)?,
        locale: Locale {
            language: LanguageCode::from_stored(doc.language.as_deref()),
            script: ScriptCode::from_stored(doc.script.as_deref()),
            region: RegionCode::from_stored(doc.region.as_deref()),
        },
        value: doc.value,
        state: TranslationState::from_stored(doc.state.as_deref()),
    })
}

impl Catalog for FileCatalog {
    fn insert_project(&mut self, mut project: Project) -> Result<Project> {
        project.id = catalog::ensure_id(project.id);
        if self.document_exists(EntityKind::Project, project.id) {
            return Err(CatalogError::duplicate(EntityKind::Project, project.id));
        }
        self.write_project(&project, &[])?;
        Ok(project)
    }

    fn insert_expression(&mut self, mut expression: Expression) -> Result<Expression> {
        expression.id = catalog::ensure_id(expression.id);
        if self.document_exists(EntityKind::Expression, expression.id) {
            return Err(CatalogError::duplicate(
                EntityKind::Expression,
                expression.id,
            ));
        }
        let mut owned = Vec::with_capacity(expression.translations.len());
        for translation in expression.translations.iter_mut() {
            translation.id = catalog::ensure_id(translation.id);
            translation.expression_id = expression.id;
            // An id repeated within the embedded list would otherwise be
            // written twice into the expression document.
            if self.document_exists(EntityKind::Translation, translation.id)
                || owned.contains(&translation.id)
            {
                return Err(CatalogError::duplicate(
                    EntityKind::Translation,
                    translation.id,
                ));
            }
            owned.push(translation.id);
        }
        // Ordered sequence: translation documents first, the expression
        // that references them last.
        for translation in &expression.translations {
            self.write_translation(translation)?;
        }
        self.write_expression(&expression, &owned)?;
        catalog::sort_translations(&mut expression.translations);
        Ok(expression)
    }

    fn insert_translation(&mut self, mut translation: Translation) -> Result<Translation> {
        let Some(mut owner) = self.load_expression_doc(translation.expression_id)? else {
            return Err(CatalogError::dangling(
                EntityKind::Expression,
                translation.expression_id,
            ));
        };
        translation.id = catalog::ensure_id(translation.id);
        if self.document_exists(EntityKind::Translation, translation.id) {
            return Err(CatalogError::duplicate(
                EntityKind::Translation,
                translation.id,
            ));
        }
        self.write_translation(&translation)?;
        owner.translations.push(translation.id.to_string());
        owner.version = SCHEMA_VERSION;
        self.write_document(EntityKind::Expression, translation.expression_id, &owner)?;
        Ok(translation)
    }

    fn update_project(&mut self, project: &Project) -> Result<()> {
        let Some(existing) = self.load_project_doc(project.id)? else {
            return Err(CatalogError::not_found(EntityKind::Project, project.id));
        };
        // Membership is preserved; update only replaces mutable fields.
        self.write_project(project, &existing.expressions)
    }

    fn update_expression(&mut self, expression: &Expression) -> Result<()> {
        let Some(existing) = self.load_expression_doc(expression.id)? else {
            return Err(CatalogError::not_found(
                EntityKind::Expression,
                expression.id,
            ));
        };
        let owned: Vec<Uuid> = existing
            .translations
            .iter()
            .map(|raw| parse_doc_uuid(raw))
            .collect::<Result<_>>()?;
        self.write_expression(expression, &owned)
    }

    fn update_translation(&mut self, translation: &Translation) -> Result<()> {
        let Some(existing) = self.load_translation_doc(translation.id)? else {
            return Err(CatalogError::not_found(
                EntityKind::Translation,
                translation.id,
            ));
        };
        // Ownership never changes through update; keep the stored owner.
        let mut kept = translation.clone();
        kept.expression_id = parse_doc_uuid(&existing.expression)?;
        self.write_translation(&kept)
    }

    fn delete(&mut self, kind: EntityKind, id: Uuid) -> Result<()> {
        match kind {
            EntityKind::Project => {
                if !self.document_exists(kind, id) {
                    return Err(CatalogError::not_found(kind, id));
                }
                // Membership lives inside the project document, so
                // removing the file is the whole unlink.
                self.remove_document(kind, id)?;
            }
            EntityKind::Expression => {
                let Some(doc) = self.load_expression_doc(id)? else {
                    return Err(CatalogError::not_found(kind, id));
                };
                debug!(expression = %id, "cascading expression delete across documents");
                // Step 1: delete owned translation documents.
                for raw in &doc.translations {
                    let translation_id = parse_doc_uuid(raw)?;
                    if self.document_exists(EntityKind::Translation, translation_id) {
                        self.remove_document(EntityKind::Translation, translation_id)?;
                    }
                }
                // Step 2: rewrite every project document that references
                // this expression.
                let target = id.to_string();
                for project_id in self.list_ids(EntityKind::Project)? {
                    if let Some(mut project) = self.load_project_doc(project_id)? {
                        if project.expressions.iter().any(|e| *e == target) {
                            project.expressions.retain(|e| *e != target);
                            project.version = SCHEMA_VERSION;
                            self.write_document(EntityKind::Project, project_id, &project)?;
                        }
                    }
                }
                // Step 3: delete the expression document itself. A crash
                // before this point leaves dangling references; see the
                // module docs.
                self.remove_document(kind, id)?;
            }
            EntityKind::Translation => {
                let Some(doc) = self.load_translation_doc(id)? else {
                    return Err(CatalogError::not_found(kind, id));
                };
                self.remove_document(kind, id)?;
                let owner_id = parse_doc_uuid(&doc.expression)?;
                if let Some(mut owner) = self.load_expression_doc(owner_id)? {
                    let target = id.to_string();
                    owner.translations.retain(|t| *t != target);
                    owner.version = SCHEMA_VERSION;
                    self.write_document(EntityKind::Expression, owner_id, &owner)?;
                }
            }
        }
        Ok(())
    }

    fn link_expression(&mut self, expression_id: Uuid, project_id: Uuid) -> Result<()> {
        if !self.document_exists(EntityKind::Expression, expression_id) {
            return Err(CatalogError::dangling(EntityKind::Expression, expression_id));
        }
        let Some(mut project) = self.load_project_doc(project_id)? else {
            return Err(CatalogError::dangling(EntityKind::Project, project_id));
        };
        let target = expression_id.to_string();
        if !project.expressions.iter().any(|e| *e == target) {
            project.expressions.push(target);
            project.version = SCHEMA_VERSION;
            self.write_document(EntityKind::Project, project_id, &project)?;
        }
        Ok(())
    }

    fn unlink_expression(&mut self, expression_id: Uuid, project_id: Uuid) -> Result<()> {
        if !self.document_exists(EntityKind::Expression, expression_id) {
            return Err(CatalogError::dangling(EntityKind::Expression, expression_id));
        }
        let Some(mut project) = self.load_project_doc(project_id)? else {
            return Err(CatalogError::dangling(EntityKind::Project, project_id));
        };
        let target = expression_id.to_string();
        if project.expressions.iter().any(|e| *e == target) {
            project.expressions.retain(|e| *e != target);
            project.version = SCHEMA_VERSION;
            self.write_document(EntityKind::Project, project_id, &project)?;
        }
        Ok(())
    }

    fn projects(&self) -> Result<Rows<Project>> {
        Ok(Rows::from_vec(self.all_projects()?))
    }

    fn project(&self, id: Uuid) -> Result<Option<Project>> {
        match self.load_project_doc(id)? {
            Some(doc) => Ok(Some(project_from_doc(doc)?)),
            None => Ok(None),
        }
    }

    fn projects_named(&self, name: &str, exact: bool) -> Result<Rows<Project>> {
        let mut projects = self.all_projects()?;
        projects.retain(|p| catalog::project_name_matches(p, name, exact));
        Ok(Rows::from_vec(projects))
    }

    fn projects_containing(&self, expression_id: Uuid) -> Result<Rows<Project>> {
        let target = expression_id.to_string();
        let mut projects = Vec::new();
        for id in self.list_ids(EntityKind::Project)? {
            if let Some(doc) = self.load_project_doc(id)? {
                if doc.expressions.iter().any(|e| *e == target) {
                    projects.push(project_from_doc(doc)?);
                }
            }
        }
        catalog::sort_projects(&mut projects);
        Ok(Rows::from_vec(projects))
    }

    fn expressions(&self) -> Result<Rows<Expression>> {
        Ok(Rows::from_vec(self.all_expressions()?))
    }

    fn expression(&self, id: Uuid) -> Result<Option<Expression>> {
        self.load_expression(id)
    }

    fn expressions_with_key(&self, key: &str) -> Result<Rows<Expression>> {
        self.expressions_where(|e| e.key == key)
    }

    fn expressions_in_project(&self, project_id: Uuid) -> Result<Rows<Expression>> {
        let Some(doc) = self.load_project_doc(project_id)? else {
            return Ok(Rows::from_vec(Vec::new()));
        };
        let mut expressions = Vec::with_capacity(doc.expressions.len());
        for raw in &doc.expressions {
            let expression_id = parse_doc_uuid(raw)?;
            let expression = self
                .load_expression(expression_id)?
                .ok_or_else(|| CatalogError::dangling(EntityKind::Expression, expression_id))?;
            expressions.push(expression);
        }
        catalog::sort_expressions(&mut expressions);
        Ok(Rows::from_vec(expressions))
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
        Ok(Rows::from_vec(self.all_translations()?))
    }

    fn translation(&self, id: Uuid) -> Result<Option<Translation>> {
        self.load_translation(id)
    }

    fn translations_for(&self, expression_id: Uuid) -> Result<Rows<Translation>> {
        let Some(doc) = self.load_expression_doc(expression_id)? else {
            return Ok(Rows::from_vec(Vec::new()));
        };
        let mut translations = Vec::with_capacity(doc.translations.len());
        for raw in &doc.translations {
            let translation_id = parse_doc_uuid(raw)?;
            let translation = self
                .load_translation(translation_id)?
                .ok_or_else(|| CatalogError::dangling(EntityKind::Translation, translation_id))?;
            translations.push(translation);
        }
        catalog::sort_translations(&mut translations);
        Ok(Rows::from_vec(translations))
    }

    fn translations_with_locale(&self, locale: &Locale, exact: bool) -> Result<Rows<Translation>> {
        let mut translations = self.all_translations()?;
        translations.retain(|t| locale.matches(&t.locale, exact));
        Ok(Rows::from_vec(translations))
    }

    fn locale_identifiers(&self) -> Result<Vec<String>> {
        let translations = self.all_translations()?;
        Ok(catalog::distinct_locale_identifiers(translations.iter()))
    }

    fn stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats {
            projects: self.list_ids(EntityKind::Project)?.len(),
            expressions: self.list_ids(EntityKind::Expression)?.len(),
            translations: self.list_ids(EntityKind::Translation)?.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileCatalog) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileCatalog::open(dir.path()).unwrap();
        (dir, store)
    }

    fn en() -> Locale {
        Locale::new(LanguageCode::ENGLISH)
    }

    // ==================== Layout Tests ====================

    #[test]
    fn test_documents_land_under_kind_directories() {
        let (dir, mut store) = store();
        let project = store.insert_project(Project::new("App").unwrap()).unwrap();
        let path = dir
            .path()
            .join("project")
            .join(format!("{}.json", project.id));
        assert!(path.is_file());
    }

    #[test]
    fn test_documents_are_pretty_printed_with_sorted_keys() {
        let (dir, mut store) = store();
        let project = store.insert_project(Project::new("App").unwrap()).unwrap();
        let text = fs::read_to_string(
            dir.path()
                .join("project")
                .join(format!("{}.json", project.id)),
        )
        .unwrap();
        assert!(text.contains('\n'));
        let expressions = text.find("\"expressions\"").unwrap();
        let name = text.find("\"name\"").unwrap();
        let uuid = text.find("\"uuid\"").unwrap();
        let version = text.find("\"version\"").unwrap();
        assert!(expressions < name && name < uuid && uuid < version);
    }

    // ==================== Migration Tests ====================

    #[test]
    fn test_old_document_migrated_on_read_not_on_disk() {
        let (dir, mut store) = store();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        let translation = store
            .insert_translation(Translation::new(expression.id, en(), "ignored"))
            .unwrap();

        // Rewrite the translation document as a v1 fixture.
        let path = dir
            .path()
            .join("translation")
            .join(format!("{}.json", translation.id));
        let v1 = serde_json::json!({
            "version": 1,
            "uuid": translation.id.to_string(),
            "expression": expression.id.to_string(),
            "language": "fr"
        });
        fs::write(&path, serde_json::to_string_pretty(&v1).unwrap()).unwrap();

        let read = store.translation(translation.id).unwrap().unwrap();
        assert_eq!(read.value, "");
        assert_eq!(read.state, TranslationState::New);
        assert_eq!(read.locale.identifier(), "fr");

        // Read does not rewrite the file.
        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["version"], 1);

        // The next write brings it to the current version.
        let mut updated = read.clone();
        updated.value = "Bonjour".to_string();
        store.update_translation(&updated).unwrap();
        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["version"], i64::from(SCHEMA_VERSION));
        assert_eq!(on_disk["value"], "Bonjour");
    }

    // ==================== Dangling Reference Tests ====================

    #[test]
    fn test_dangling_translation_reference_surfaces() {
        let (dir, mut store) = store();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        let translation = store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();
        // Simulate a crash between cascade steps.
        fs::remove_file(
            dir.path()
                .join("translation")
                .join(format!("{}.json", translation.id)),
        )
        .unwrap();

        let result = store.expression(expression.id);
        assert!(matches!(
            result,
            Err(CatalogError::InvalidForeignReference { .. })
        ));
    }

    #[test]
    fn test_orphan_translation_read_surfaces_and_stays_deletable() {
        let (dir, mut store) = store();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        let translation = store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();
        // Simulate a crash that removed the owner but not the
        // translation.
        fs::remove_file(
            dir.path()
                .join("expression")
                .join(format!("{}.json", expression.id)),
        )
        .unwrap();

        assert!(matches!(
            store.translation(translation.id),
            Err(CatalogError::InvalidForeignReference { .. })
        ));
        assert!(matches!(
            store.translations(),
            Err(CatalogError::InvalidForeignReference { .. })
        ));

        // The orphan document can still be removed.
        store
            .delete(EntityKind::Translation, translation.id)
            .unwrap();
        assert!(store.translation(translation.id).unwrap().is_none());
    }

    #[test]
    fn test_dangling_expression_in_project_surfaces() {
        let (dir, mut store) = store();
        let project = store.insert_project(Project::new("App").unwrap()).unwrap();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store.link_expression(expression.id, project.id).unwrap();
        fs::remove_file(
            dir.path()
                .join("expression")
                .join(format!("{}.json", expression.id)),
        )
        .unwrap();

        let result = store.expressions_in_project(project.id);
        assert!(matches!(
            result,
            Err(CatalogError::InvalidForeignReference { .. })
        ));
    }

    // ==================== Cascade Tests ====================

    #[test]
    fn test_expression_delete_rewrites_referencing_projects() {
        let (_dir, mut store) = store();
        let project = store.insert_project(Project::new("App").unwrap()).unwrap();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store.link_expression(expression.id, project.id).unwrap();
        let translation = store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();

        store.delete(EntityKind::Expression, expression.id).unwrap();

        assert!(store.translation(translation.id).unwrap().is_none());
        assert_eq!(store.expressions_in_project(project.id).unwrap().count(), 0);
        assert!(store.project(project.id).unwrap().is_some());
    }

    #[test]
    fn test_project_delete_leaves_expressions() {
        let (_dir, mut store) = store();
        let project = store.insert_project(Project::new("App").unwrap()).unwrap();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store.link_expression(expression.id, project.id).unwrap();

        store.delete(EntityKind::Project, project.id).unwrap();
        assert!(store.expression(expression.id).unwrap().is_some());
    }

    // ==================== Fallback Tests ====================

    #[test]
    fn test_blank_language_defaults_on_read() {
        let (dir, mut store) = store();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        let translation = store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();
        let path = dir
            .path()
            .join("translation")
            .join(format!("{}.json", translation.id));
        let doc = serde_json::json!({
            "version": SCHEMA_VERSION,
            "uuid": translation.id.to_string(),
            "expression": expression.id.to_string(),
            "language": "",
            "value": "Hello",
            "state": "new"
        });
        fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

        let read = store.translation(translation.id).unwrap().unwrap();
        assert_eq!(read.locale.language, LanguageCode::default_language());
    }
}
