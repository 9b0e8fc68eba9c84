//! Graph-store adapter: an in-memory object graph with bidirectional
//! relationship sets.
//!
//! Each node keeps its own side of every relationship (a project holds
//! its member expression ids, an expression holds both its project ids
//! and its owned translation ids), and every mutation maintains both
//! sides. Nothing here auto-cascades, so `delete` replicates the contract
//! policy by hand in a fixed step order.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;
use uuid::Uuid;

use crate::catalog::{self, Catalog, CatalogStats, Rows};
use crate::error::{CatalogError, Result};
use crate::locale::{LanguageCode, Locale};
use crate::model::{EntityKind, Expression, Project, Translation, TranslationState};

struct ProjectNode {
    name: String,
    /// Member expressions (one side of the many-to-many).
    expressions: BTreeSet<Uuid>,
}

struct ExpressionNode {
    key: String,
    name: String,
    default_language: LanguageCode,
    context: Option<String>,
    feature: Option<String>,
    /// Owned translations (cascade on delete).
    translations: BTreeSet<Uuid>,
    /// Back-references to member projects (unlink on delete).
    projects: BTreeSet<Uuid>,
}

/// In-memory catalog backend.
#[derive(Default)]
pub struct MemoryCatalog {
    projects: HashMap<Uuid, ProjectNode>,
    expressions: HashMap<Uuid, ExpressionNode>,
    translations: HashMap<Uuid, Translation>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn assemble_project(&self, id: Uuid, node: &ProjectNode) -> Project {
        Project {
            id,
            name: node.name.clone(),
        }
    }

    fn assemble_expression(&self, id: Uuid, node: &ExpressionNode) -> Expression {
        let mut translations: Vec<Translation> = node
            .translations
            .iter()
            .filter_map(|tid| self.translations.get(tid).cloned())
            .collect();
        catalog::sort_translations(&mut translations);
        Expression {
            id,
            key: node.key.clone(),
            name: node.name.clone(),
            default_language: node.default_language,
            context: node.context.clone(),
            feature: node.feature.clone(),
            translations,
        }
    }

    fn all_expressions(&self) -> Vec<Expression> {
        let mut expressions: Vec<Expression> = self
            .expressions
            .iter()
            .map(|(id, node)| self.assemble_expression(*id, node))
            .collect();
        catalog::sort_expressions(&mut expressions);
        expressions
    }

    fn expressions_where<F>(&self, keep: F) -> Rows<Expression>
    where
        F: Fn(&Expression) -> bool,
    {
        let mut expressions = self.all_expressions();
        expressions.retain(|e| keep(e));
        Rows::from_vec(expressions)
    }

    fn projects_where<F>(&self, keep: F) -> Rows<Project>
    where
        F: Fn(Uuid, &ProjectNode) -> bool,
    {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|(id, node)| keep(**id, node))
            .map(|(id, node)| self.assemble_project(*id, node))
            .collect();
        catalog::sort_projects(&mut projects);
        Rows::from_vec(projects)
    }

    fn require_expression(&self, id: Uuid) -> Result<()> {
        if self.expressions.contains_key(&id) {
            Ok(())
        } else {
            Err(CatalogError::dangling(EntityKind::Expression, id))
        }
    }
}

impl Catalog for MemoryCatalog {
    fn insert_project(&mut self, mut project: Project) -> Result<Project> {
        project.id = catalog::ensure_id(project.id);
        if self.projects.contains_key(&project.id) {
            return Err(CatalogError::duplicate(EntityKind::Project, project.id));
        }
        self.projects.insert(
            project.id,
            ProjectNode {
                name: project.name.clone(),
                expressions: BTreeSet::new(),
            },
        );
        Ok(project)
    }

    fn insert_expression(&mut self, mut expression: Expression) -> Result<Expression> {
        expression.id = catalog::ensure_id(expression.id);
        if self.expressions.contains_key(&expression.id) {
            return Err(CatalogError::duplicate(
                EntityKind::Expression,
                expression.id,
            ));
        }
        // Embedded translations are rebound to the (possibly freshly
        // assigned) expression id.
        let mut owned = BTreeSet::new();
        for translation in expression.translations.iter_mut() {
            translation.id = catalog::ensure_id(translation.id);
            translation.expression_id = expression.id;
            // `owned` doubles as the intra-batch duplicate check: a
            // repeated id in the embedded list is rejected the same way
            // a collision with a stored translation is.
            if self.translations.contains_key(&translation.id) || !owned.insert(translation.id) {
                return Err(CatalogError::duplicate(
                    EntityKind::Translation,
                    translation.id,
                ));
            }
        }
        for translation in &expression.translations {
            self.translations.insert(translation.id, translation.clone());
        }
        self.expressions.insert(
            expression.id,
            ExpressionNode {
                key: expression.key.clone(),
                name: expression.name.clone(),
                default_language: expression.default_language,
                context: expression.context.clone(),
                feature: expression.feature.clone(),
                translations: owned,
                projects: BTreeSet::new(),
            },
        );
        catalog::sort_translations(&mut expression.translations);
        Ok(expression)
    }

    fn insert_translation(&mut self, mut translation: Translation) -> Result<Translation> {
        self.require_expression(translation.expression_id)?;
        translation.id = catalog::ensure_id(translation.id);
        if self.translations.contains_key(&translation.id) {
            return Err(CatalogError::duplicate(
                EntityKind::Translation,
                translation.id,
            ));
        }
        self.expressions
            .get_mut(&translation.expression_id)
            .expect("owner checked above")
            .translations
            .insert(translation.id);
        self.translations.insert(translation.id, translation.clone());
        Ok(translation)
    }

    fn update_project(&mut self, project: &Project) -> Result<()> {
        let node = self
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Project, project.id))?;
        node.name = project.name.clone();
        Ok(())
    }

    fn update_expression(&mut self, expression: &Expression) -> Result<()> {
        let node = self
            .expressions
            .get_mut(&expression.id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Expression, expression.id))?;
        node.key = expression.key.clone();
        node.name = expression.name.clone();
        node.default_language = expression.default_language;
        node.context = expression.context.clone();
        node.feature = expression.feature.clone();
        Ok(())
    }

    fn update_translation(&mut self, translation: &Translation) -> Result<()> {
        let stored = self
            .translations
            .get_mut(&translation.id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Translation, translation.id))?;
        stored.locale = translation.locale;
        stored.value = translation.value.clone();
        stored.state = translation.state;
        Ok(())
    }

    fn delete(&mut self, kind: EntityKind, id: Uuid) -> Result<()> {
        match kind {
            EntityKind::Project => {
                let node = self
                    .projects
                    .remove(&id)
                    .ok_or_else(|| CatalogError::not_found(kind, id))?;
                // Unlink only; member expressions survive.
                for expression_id in &node.expressions {
                    if let Some(expression) = self.expressions.get_mut(expression_id) {
                        expression.projects.remove(&id);
                    }
                }
            }
            EntityKind::Expression => {
                let node = self
                    .expressions
                    .remove(&id)
                    .ok_or_else(|| CatalogError::not_found(kind, id))?;
                debug!(
                    expression = %id,
                    translations = node.translations.len(),
                    memberships = node.projects.len(),
                    "cascading expression delete"
                );
                // Step 1: delete owned translations.
                for translation_id in &node.translations {
                    self.translations.remove(translation_id);
                }
                // Step 2: remove membership from every project.
                for project_id in &node.projects {
                    if let Some(project) = self.projects.get_mut(project_id) {
                        project.expressions.remove(&id);
                    }
                }
            }
            EntityKind::Translation => {
                let translation = self
                    .translations
                    .remove(&id)
                    .ok_or_else(|| CatalogError::not_found(kind, id))?;
                if let Some(owner) = self.expressions.get_mut(&translation.expression_id) {
                    owner.translations.remove(&id);
                }
            }
        }
        Ok(())
    }

    fn link_expression(&mut self, expression_id: Uuid, project_id: Uuid) -> Result<()> {
        self.require_expression(expression_id)?;
        if !self.projects.contains_key(&project_id) {
            return Err(CatalogError::dangling(EntityKind::Project, project_id));
        }
        self.projects
            .get_mut(&project_id)
            .expect("checked above")
            .expressions
            .insert(expression_id);
        self.expressions
            .get_mut(&expression_id)
            .expect("checked above")
            .projects
            .insert(project_id);
        Ok(())
    }

    fn unlink_expression(&mut self, expression_id: Uuid, project_id: Uuid) -> Result<()> {
        self.require_expression(expression_id)?;
        if !self.projects.contains_key(&project_id) {
            return Err(CatalogError::dangling(EntityKind::Project, project_id));
        }
        self.projects
            .get_mut(&project_id)
            .expect("checked above")
            .expressions
            .remove(&expression_id);
        self.expressions
            .get_mut(&expression_id)
            .expect("checked above")
            .projects
            .remove(&project_id);
        Ok(())
    }

    fn projects(&self) -> Result<Rows<Project>> {
        Ok(self.projects_where(|_, _| true))
    }

    fn project(&self, id: Uuid) -> Result<Option<Project>> {
        Ok(self
            .projects
            .get(&id)
            .map(|node| self.assemble_project(id, node)))
    }

    fn projects_named(&self, name: &str, exact: bool) -> Result<Rows<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .map(|(id, node)| self.assemble_project(*id, node))
            .filter(|p| catalog::project_name_matches(p, name, exact))
            .collect();
        catalog::sort_projects(&mut projects);
        Ok(Rows::from_vec(projects))
    }

    fn projects_containing(&self, expression_id: Uuid) -> Result<Rows<Project>> {
        Ok(self.projects_where(|_, node| node.expressions.contains(&expression_id)))
    }

    fn expressions(&self) -> Result<Rows<Expression>> {
        Ok(Rows::from_vec(self.all_expressions()))
    }

    fn expression(&self, id: Uuid) -> Result<Option<Expression>> {
        Ok(self
            .expressions
            .get(&id)
            .map(|node| self.assemble_expression(id, node)))
    }

    fn expressions_with_key(&self, key: &str) -> Result<Rows<Expression>> {
        Ok(self.expressions_where(|e| e.key == key))
    }

    fn expressions_in_project(&self, project_id: Uuid) -> Result<Rows<Expression>> {
        let members = match self.projects.get(&project_id) {
            Some(node) => node.expressions.clone(),
            None => return Ok(Rows::from_vec(Vec::new())),
        };
        Ok(self.expressions_where(|e| members.contains(&e.id)))
    }

    fn expressions_matching_value(&self, needle: &str) -> Result<Rows<Expression>> {
        Ok(self.expressions_where(|e| catalog::expression_value_matches(e, needle)))
    }

    fn expressions_with_locale(&self, locale: &Locale, exact: bool) -> Result<Rows<Expression>> {
        Ok(self.expressions_where(|e| catalog::expression_has_locale(e, locale, exact)))
    }

    fn expressions_with_only_locale(&self, locale: &Locale) -> Result<Rows<Expression>> {
        Ok(self.expressions_where(|e| catalog::expression_has_only_locale(e, locale)))
    }

    fn expressions_in_state(&self, state: TranslationState) -> Result<Rows<Expression>> {
        Ok(self.expressions_where(|e| catalog::expression_in_state(e, state)))
    }

    fn translations(&self) -> Result<Rows<Translation>> {
        let mut translations: Vec<Translation> = self.translations.values().cloned().collect();
        catalog::sort_translations(&mut translations);
        Ok(Rows::from_vec(translations))
    }

    fn translation(&self, id: Uuid) -> Result<Option<Translation>> {
        Ok(self.translations.get(&id).cloned())
    }

    fn translations_for(&self, expression_id: Uuid) -> Result<Rows<Translation>> {
        let mut translations: Vec<Translation> = self
            .translations
            .values()
            .filter(|t| t.expression_id == expression_id)
            .cloned()
            .collect();
        catalog::sort_translations(&mut translations);
        Ok(Rows::from_vec(translations))
    }

    fn translations_with_locale(&self, locale: &Locale, exact: bool) -> Result<Rows<Translation>> {
        let mut translations: Vec<Translation> = self
            .translations
            .values()
            .filter(|t| locale.matches(&t.locale, exact))
            .cloned()
            .collect();
        catalog::sort_translations(&mut translations);
        Ok(Rows::from_vec(translations))
    }

    fn locale_identifiers(&self) -> Result<Vec<String>> {
        Ok(catalog::distinct_locale_identifiers(
            self.translations.values(),
        ))
    }

    fn stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats {
            projects: self.projects.len(),
            expressions: self.expressions.len(),
            translations: self.translations.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LanguageCode;

    fn en() -> Locale {
        Locale::new(LanguageCode::ENGLISH)
    }

    #[test]
    fn test_bidirectional_link_maintained() {
        let mut store = MemoryCatalog::new();
        let project = store.insert_project(Project::new("App").unwrap()).unwrap();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store.link_expression(expression.id, project.id).unwrap();

        assert!(store.projects[&project.id].expressions.contains(&expression.id));
        assert!(store.expressions[&expression.id].projects.contains(&project.id));

        store.unlink_expression(expression.id, project.id).unwrap();
        assert!(store.projects[&project.id].expressions.is_empty());
        assert!(store.expressions[&expression.id].projects.is_empty());
    }

    #[test]
    fn test_expression_delete_severs_both_relationships() {
        let mut store = MemoryCatalog::new();
        let project = store.insert_project(Project::new("App").unwrap()).unwrap();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        store.link_expression(expression.id, project.id).unwrap();
        let translation = store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();

        store.delete(EntityKind::Expression, expression.id).unwrap();

        assert!(store.translations.get(&translation.id).is_none());
        assert!(store.projects[&project.id].expressions.is_empty());
        assert!(store.projects.contains_key(&project.id));
    }

    #[test]
    fn test_translation_delete_updates_owner_set() {
        let mut store = MemoryCatalog::new();
        let expression = store
            .insert_expression(Expression::new("greeting", "Greeting", LanguageCode::ENGLISH).unwrap())
            .unwrap();
        let translation = store
            .insert_translation(Translation::new(expression.id, en(), "Hello"))
            .unwrap();
        store.delete(EntityKind::Translation, translation.id).unwrap();
        assert!(store.expressions[&expression.id].translations.is_empty());
    }

    #[test]
    fn test_insert_translation_requires_owner() {
        let mut store = MemoryCatalog::new();
        let result = store.insert_translation(Translation::new(Uuid::new_v4(), en(), "Hello"));
        assert!(matches!(
            result,
            Err(CatalogError::InvalidForeignReference { .. })
        ));
    }

    #[test]
    fn test_embedded_translations_rebound_on_insert() {
        let mut store = MemoryCatalog::new();
        let mut expression =
            Expression::with_id(Uuid::nil(), "greeting", "Greeting", LanguageCode::ENGLISH)
                .unwrap();
        expression
            .translations
            .push(Translation::with_id(Uuid::nil(), Uuid::nil(), en(), "Hello"));

        let inserted = store.insert_expression(expression).unwrap();
        assert!(!inserted.id.is_nil());
        assert_eq!(inserted.translations.len(), 1);
        assert_eq!(inserted.translations[0].expression_id, inserted.id);
        assert!(!inserted.translations[0].id.is_nil());
    }
}
