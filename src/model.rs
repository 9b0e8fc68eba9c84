//! Catalog entity model: Project, Expression, Translation.
//!
//! Pure data types plus construction-time validation. Relationship
//! bookkeeping (membership sets, foreign keys) belongs to the backends;
//! the only relationship visible here is the translation list embedded in
//! an [`Expression`], which every translation-resolving query returns
//! fully populated and ordered by canonical locale identifier.

use std::fmt;

use uuid::Uuid;

use crate::error::{CatalogError, Result};
use crate::locale::{LanguageCode, Locale};

/// The three entity kinds managed by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Expression,
    Translation,
}

impl EntityKind {
    /// Lowercase singular name, also used as the document-store
    /// directory name for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Expression => "expression",
            EntityKind::Translation => "translation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow state of a translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TranslationState {
    #[default]
    New,
    NeedsReview,
    Translated,
    Final,
}

impl TranslationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationState::New => "new",
            TranslationState::NeedsReview => "needs_review",
            TranslationState::Translated => "translated",
            TranslationState::Final => "final",
        }
    }

    /// Strict tag lookup.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "new" => Some(TranslationState::New),
            "needs_review" => Some(TranslationState::NeedsReview),
            "translated" => Some(TranslationState::Translated),
            "final" => Some(TranslationState::Final),
            _ => None,
        }
    }

    /// Read-side constructor: absent or unparseable stored tags default
    /// to `New`.
    pub fn from_stored(tag: Option<&str>) -> Self {
        tag.and_then(Self::from_tag).unwrap_or_default()
    }
}

impl fmt::Display for TranslationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named grouping of expressions.
///
/// Membership is many-to-many and owned by neither side: deleting a
/// project unlinks its expressions without deleting them.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
}

impl Project {
    /// Create a project with a generated UUID.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Create a project with a caller-supplied UUID.
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidValue(
                "project name must not be empty".to_string(),
            ));
        }
        Ok(Self { id, name })
    }
}

/// A translatable key plus metadata, owning zero or more translations.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub id: Uuid,
    /// Lookup token in interchange formats. Non-empty.
    pub key: String,
    /// Human-readable label. Non-empty.
    pub name: String,
    pub default_language: LanguageCode,
    pub context: Option<String>,
    pub feature: Option<String>,
    /// Owned translations, ordered by canonical locale identifier once
    /// the expression has passed through a backend.
    pub translations: Vec<Translation>,
}

impl Expression {
    /// Create an expression with a generated UUID and no translations.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        default_language: LanguageCode,
    ) -> Result<Self> {
        Self::with_id(Uuid::new_v4(), key, name, default_language)
    }

    /// Create an expression with a caller-supplied UUID.
    pub fn with_id(
        id: Uuid,
        key: impl Into<String>,
        name: impl Into<String>,
        default_language: LanguageCode,
    ) -> Result<Self> {
        let key = key.into();
        let name = name.into();
        if key.trim().is_empty() {
            return Err(CatalogError::InvalidValue(
                "expression key must not be empty".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidValue(
                "expression name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            key,
            name,
            default_language,
            context: None,
            feature: None,
            translations: Vec::new(),
        })
    }

    /// Sort the owned translations by canonical locale identifier.
    pub fn sort_translations(&mut self) {
        self.translations.sort_by(|a, b| a.locale.cmp(&b.locale));
    }

    /// Resolve the translation to show by default: the first whose
    /// language matches `default_language`. The model does not require
    /// one to exist.
    pub fn default_translation(&self) -> Option<&Translation> {
        let target = Locale::new(self.default_language);
        self.translations
            .iter()
            .find(|t| target.matches(&t.locale, false))
    }
}

/// A locale-specific rendered value bound to exactly one expression.
///
/// In well-formed data the (expression, locale) pair is unique per
/// expression; no backend enforces that at write time, but queries assume
/// it when ordering results.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub id: Uuid,
    /// Owning expression. Required; a translation never outlives it.
    pub expression_id: Uuid,
    pub locale: Locale,
    /// Rendered value. May be empty.
    pub value: String,
    pub state: TranslationState,
}

impl Translation {
    /// Create a translation with a generated UUID in state `New`.
    pub fn new(expression_id: Uuid, locale: Locale, value: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), expression_id, locale, value)
    }

    /// Create a translation with a caller-supplied UUID.
    pub fn with_id(
        id: Uuid,
        expression_id: Uuid,
        locale: Locale,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id,
            expression_id,
            locale,
            value: value.into(),
            state: TranslationState::New,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::RegionCode;

    fn en() -> LanguageCode {
        LanguageCode::ENGLISH
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_project_requires_name() {
        assert!(Project::new("App").is_ok());
        assert!(Project::new("").is_err());
        assert!(Project::new("   ").is_err());
    }

    #[test]
    fn test_expression_requires_key_and_name() {
        assert!(Expression::new("greeting", "Greeting", en()).is_ok());
        assert!(Expression::new("", "Greeting", en()).is_err());
        assert!(Expression::new("greeting", "", en()).is_err());
    }

    #[test]
    fn test_with_id_preserves_caller_uuid() {
        let id = Uuid::new_v4();
        let project = Project::with_id(id, "App").unwrap();
        assert_eq!(project.id, id);
    }

    // ==================== State Tests ====================

    #[test]
    fn test_state_round_trips_through_tag() {
        for state in [
            TranslationState::New,
            TranslationState::NeedsReview,
            TranslationState::Translated,
            TranslationState::Final,
        ] {
            assert_eq!(TranslationState::from_tag(state.as_str()), Some(state));
        }
    }

    #[test]
    fn test_state_from_stored_defaults_to_new() {
        assert_eq!(TranslationState::from_stored(None), TranslationState::New);
        assert_eq!(
            TranslationState::from_stored(Some("garbage")),
            TranslationState::New
        );
    }

    // ==================== Ordering Tests ====================

    #[test]
    fn test_sort_translations_by_locale_identifier() {
        let mut expr = Expression::new("greeting", "Greeting", en()).unwrap();
        let fr = Locale::parse("fr").unwrap();
        let en_us = Locale::new(en()).with_region(RegionCode::from_code("US").unwrap());
        let en_bare = Locale::new(en());
        expr.translations = vec![
            Translation::new(expr.id, fr, "Bonjour"),
            Translation::new(expr.id, en_us, "Howdy"),
            Translation::new(expr.id, en_bare, "Hello"),
        ];
        expr.sort_translations();
        let identifiers: Vec<String> = expr
            .translations
            .iter()
            .map(|t| t.locale.identifier())
            .collect();
        assert_eq!(identifiers, vec!["en", "en-US", "fr"]);
    }

    #[test]
    fn test_default_translation_matches_language_only() {
        let mut expr = Expression::new("greeting", "Greeting", en()).unwrap();
        let en_gb = Locale::parse("en-GB").unwrap();
        expr.translations = vec![Translation::new(expr.id, en_gb, "Hullo")];
        assert_eq!(expr.default_translation().unwrap().value, "Hullo");
    }

    #[test]
    fn test_default_translation_absent() {
        let expr = Expression::new("greeting", "Greeting", en()).unwrap();
        assert!(expr.default_translation().is_none());
    }
}
