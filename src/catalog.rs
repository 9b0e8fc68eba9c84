//! The catalog contract: one operation set, three interchangeable
//! backends.
//!
//! [`Catalog`] is the seam between callers and storage. All relational
//! behavior (identity, uniqueness, cascade and unlink policy, query
//! ordering) is specified here once, and every backend must produce
//! observably identical results. The match and ordering semantics live in
//! this module as plain functions so the backends share one definition
//! instead of three approximations.
//!
//! Cascade policy:
//! - deleting a project unlinks its expressions (never deletes them);
//! - deleting an expression deletes its translations and removes it from
//!   every project's membership;
//! - deleting a translation cascades to nothing.

use uuid::Uuid;

use crate::error::Result;
use crate::locale::Locale;
use crate::model::{EntityKind, Expression, Project, Translation, TranslationState};

/// A finite, consumed-once sequence of query results.
///
/// Results are materialized by the backend at query time; the sequence is
/// ordered as the producing query specifies and cannot be restarted.
pub struct Rows<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> Rows<T> {
    pub(crate) fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: items.into_iter(),
        }
    }
}

impl<T> Iterator for Rows<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Rows<T> {}

/// Entity counts, used for log output and coverage reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub projects: usize,
    pub expressions: usize,
    pub translations: usize,
}

/// The storage-agnostic catalog operation set.
///
/// Insert operations assign a fresh v4 UUID when the entity arrives with
/// the nil UUID (the placeholder format converters use); a caller-supplied
/// UUID is kept. Only UUIDs are ever exposed; backend-internal keys stay
/// inside the adapter.
///
/// Update operations replace mutable fields of the entity located by
/// UUID. They never change identity or relationships; membership changes
/// go through [`Catalog::link_expression`] /
/// [`Catalog::unlink_expression`], and an expression's translation list
/// is ignored by `update_expression`.
///
/// Queries that return expressions always return them with their full
/// translation set, ordered by canonical locale identifier. Queries
/// scoped to a project or expression id return an empty sequence when the
/// scoping entity does not exist; only operations *targeting* an entity
/// report `NotFound`.
pub trait Catalog {
    /// Insert a project. Fails with `DuplicateIdentity` if the UUID is
    /// already present.
    fn insert_project(&mut self, project: Project) -> Result<Project>;

    /// Insert an expression together with its embedded translations.
    ///
    /// Fails with `DuplicateIdentity` if the UUID is already present.
    /// Nothing enforces locale uniqueness among the translations; callers
    /// are expected to keep one translation per locale per expression.
    fn insert_expression(&mut self, expression: Expression) -> Result<Expression>;

    /// Insert a translation bound to an existing expression.
    ///
    /// Fails with `InvalidForeignReference` if `expression_id` does not
    /// resolve, and `DuplicateIdentity` if the translation UUID is
    /// already present.
    fn insert_translation(&mut self, translation: Translation) -> Result<Translation>;

    /// Replace the mutable fields of an existing project.
    fn update_project(&mut self, project: &Project) -> Result<()>;

    /// Replace the scalar fields of an existing expression. The embedded
    /// translation list is not touched.
    fn update_expression(&mut self, expression: &Expression) -> Result<()>;

    /// Replace the mutable fields of an existing translation, including
    /// its locale, value, and state.
    fn update_translation(&mut self, translation: &Translation) -> Result<()>;

    /// Delete an entity, enforcing the module-level cascade policy.
    /// Fails with `NotFound` when the id is absent, including on repeat
    /// deletion.
    fn delete(&mut self, kind: EntityKind, id: Uuid) -> Result<()>;

    /// Add an expression to a project's membership. Fails with
    /// `InvalidForeignReference` if either side is missing; linking an
    /// already-linked pair is a no-op.
    fn link_expression(&mut self, expression_id: Uuid, project_id: Uuid) -> Result<()>;

    /// Remove an expression from a project's membership. Fails with
    /// `InvalidForeignReference` if either side is missing; unlinking an
    /// unlinked pair is a no-op.
    fn unlink_expression(&mut self, expression_id: Uuid, project_id: Uuid) -> Result<()>;

    // ---- project queries ----

    /// All projects, ordered by name.
    fn projects(&self) -> Result<Rows<Project>>;

    fn project(&self, id: Uuid) -> Result<Option<Project>>;

    /// Projects matching `name`: exact match, or case-insensitive
    /// substring when `exact` is false. Ordered by name.
    fn projects_named(&self, name: &str, exact: bool) -> Result<Rows<Project>>;

    /// Projects whose membership contains the expression. Ordered by name.
    fn projects_containing(&self, expression_id: Uuid) -> Result<Rows<Project>>;

    // ---- expression queries ----

    /// All expressions, ordered by key.
    fn expressions(&self) -> Result<Rows<Expression>>;

    fn expression(&self, id: Uuid) -> Result<Option<Expression>>;

    /// Expressions with exactly this key, ordered by key then UUID.
    fn expressions_with_key(&self, key: &str) -> Result<Rows<Expression>>;

    /// Expressions belonging to the project, ordered by key.
    fn expressions_in_project(&self, project_id: Uuid) -> Result<Rows<Expression>>;

    /// Expressions whose default value or any translation value contains
    /// `needle` (case-insensitive). Ordered by key.
    fn expressions_matching_value(&self, needle: &str) -> Result<Rows<Expression>>;

    /// Expressions having at least one translation in `locale` (exact
    /// locale, or language-only when `exact` is false). Ordered by key.
    fn expressions_with_locale(&self, locale: &Locale, exact: bool) -> Result<Rows<Expression>>;

    /// Expressions all of whose translations are exactly in `locale`
    /// (and that have at least one). Ordered by key.
    fn expressions_with_only_locale(&self, locale: &Locale) -> Result<Rows<Expression>>;

    /// Expressions having at least one translation in `state`. Ordered
    /// by key.
    fn expressions_in_state(&self, state: TranslationState) -> Result<Rows<Expression>>;

    // ---- translation queries ----

    /// All translations, ordered by canonical locale identifier.
    fn translations(&self) -> Result<Rows<Translation>>;

    fn translation(&self, id: Uuid) -> Result<Option<Translation>>;

    /// Translations owned by the expression, ordered by canonical locale
    /// identifier.
    fn translations_for(&self, expression_id: Uuid) -> Result<Rows<Translation>>;

    /// Translations in `locale` (exact, or language-only when `exact` is
    /// false), ordered by canonical locale identifier.
    fn translations_with_locale(&self, locale: &Locale, exact: bool) -> Result<Rows<Translation>>;

    /// Distinct canonical locale identifiers present across the catalog,
    /// sorted. Used for coverage reporting.
    fn locale_identifiers(&self) -> Result<Vec<String>>;

    /// Entity counts. Backends may override with a cheaper count.
    fn stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats {
            projects: self.projects()?.count(),
            expressions: self.expressions()?.count(),
            translations: self.translations()?.count(),
        })
    }
}

/// Keep a caller-supplied UUID, assign a fresh one for the nil
/// placeholder.
pub(crate) fn ensure_id(id: Uuid) -> Uuid {
    if id.is_nil() {
        Uuid::new_v4()
    } else {
        id
    }
}

// ---- shared ordering ----
//
// Ties are broken by UUID string so all backends produce the same order
// even for degenerate data (duplicate keys, duplicate locales).

pub(crate) fn sort_projects(projects: &mut Vec<Project>) {
    projects.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
    });
}

pub(crate) fn sort_expressions(expressions: &mut Vec<Expression>) {
    for expression in expressions.iter_mut() {
        sort_translations(&mut expression.translations);
    }
    expressions.sort_by(|a, b| {
        a.key
            .cmp(&b.key)
            .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
    });
}

pub(crate) fn sort_translations(translations: &mut Vec<Translation>) {
    translations.sort_by(|a, b| {
        a.locale
            .cmp(&b.locale)
            .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
    });
}

// ---- shared match semantics ----

pub(crate) fn project_name_matches(project: &Project, needle: &str, exact: bool) -> bool {
    if exact {
        project.name == needle
    } else {
        project
            .name
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }
}

pub(crate) fn expression_value_matches(expression: &Expression, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    expression
        .translations
        .iter()
        .any(|t| t.value.to_lowercase().contains(&needle))
}

pub(crate) fn expression_has_locale(expression: &Expression, locale: &Locale, exact: bool) -> bool {
    expression
        .translations
        .iter()
        .any(|t| locale.matches(&t.locale, exact))
}

pub(crate) fn expression_has_only_locale(expression: &Expression, locale: &Locale) -> bool {
    !expression.translations.is_empty()
        && expression
            .translations
            .iter()
            .all(|t| locale.matches(&t.locale, true))
}

pub(crate) fn expression_in_state(expression: &Expression, state: TranslationState) -> bool {
    expression.translations.iter().any(|t| t.state == state)
}

/// Distinct sorted identifiers over an arbitrary translation set.
pub(crate) fn distinct_locale_identifiers<'a, I>(translations: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Translation>,
{
    let mut identifiers: Vec<String> = translations
        .into_iter()
        .map(|t| t.locale.identifier())
        .collect();
    identifiers.sort();
    identifiers.dedup();
    identifiers
}
