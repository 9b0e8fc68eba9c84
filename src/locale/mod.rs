//! Locale identity: validated language, script, and region codes.
//!
//! Every locale-typed value in the catalog flows through this module, so
//! the backends never grow divergent validation or fallback logic. The
//! rules are:
//!
//! - Constructing a code from an unrecognized string fails with
//!   [`UnknownCode`] (the strict path, used when callers hand us input).
//! - Reading a *stored* value goes through the lenient `from_stored`
//!   constructors, which map absent or blank fields to the fixed defaults
//!   so reads never fail solely because a legacy record is missing a
//!   locale field.
//! - The canonical identifier is `language[-Script][-REGION]`, and it
//!   defines the ordering of translations in query results.

mod registry;

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// A locale-code string was not found in the recognized code tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} code: '{code}'")]
pub struct UnknownCode {
    kind: &'static str,
    code: String,
}

impl UnknownCode {
    fn new(kind: &'static str, code: &str) -> Self {
        Self {
            kind,
            code: code.to_string(),
        }
    }
}

/// A validated ISO 639-1 language code.
///
/// Holds a `&'static str` borrowed from the known-code table, so a
/// constructed value is always a member of the recognized set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LanguageCode {
    code: &'static str,
}

impl LanguageCode {
    /// The fixed fallback language used when a stored value is absent.
    pub const ENGLISH: LanguageCode = LanguageCode { code: "en" };

    /// Create a `LanguageCode` from a code string.
    ///
    /// The input is lowercased before lookup; `"EN"` and `"en"` both
    /// resolve to the same code.
    ///
    /// # Returns
    /// * `Ok(LanguageCode)` if the code is recognized
    /// * `Err(UnknownCode)` otherwise
    pub fn from_code(code: &str) -> Result<Self, UnknownCode> {
        let normalized = code.to_ascii_lowercase();
        registry::find(registry::LANGUAGES, &normalized)
            .map(|code| Self { code })
            .ok_or_else(|| UnknownCode::new("language", code))
    }

    /// Lenient read-side constructor: absent, blank, or unrecognized
    /// stored values resolve to the default language.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(code) if !code.trim().is_empty() => {
                Self::from_code(code.trim()).unwrap_or(Self::default_language())
            }
            _ => Self::default_language(),
        }
    }

    /// The default language (English).
    pub fn default_language() -> Self {
        Self::ENGLISH
    }

    /// The ISO 639-1 code string.
    pub fn code(&self) -> &'static str {
        self.code
    }
}

/// A validated ISO 15924 script code (e.g. `Latn`, `Hans`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScriptCode {
    code: &'static str,
}

impl ScriptCode {
    /// Create a `ScriptCode` from a code string.
    ///
    /// The input is normalized to title case (`latn` -> `Latn`) before
    /// lookup.
    pub fn from_code(code: &str) -> Result<Self, UnknownCode> {
        let normalized = title_case(code);
        registry::find(registry::SCRIPTS, &normalized)
            .map(|code| Self { code })
            .ok_or_else(|| UnknownCode::new("script", code))
    }

    /// Lenient read-side constructor: absent, blank, or unrecognized
    /// stored values resolve to "no script".
    pub fn from_stored(value: Option<&str>) -> Option<Self> {
        let code = value?.trim();
        if code.is_empty() {
            return None;
        }
        Self::from_code(code).ok()
    }

    /// The ISO 15924 code string.
    pub fn code(&self) -> &'static str {
        self.code
    }
}

/// A validated ISO 3166-1 alpha-2 region code (e.g. `US`, `DE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionCode {
    code: &'static str,
}

impl RegionCode {
    /// The fixed fallback region.
    pub const UNITED_STATES: RegionCode = RegionCode { code: "US" };

    /// Create a `RegionCode` from a code string.
    ///
    /// The input is uppercased before lookup.
    pub fn from_code(code: &str) -> Result<Self, UnknownCode> {
        let normalized = code.to_ascii_uppercase();
        registry::find(registry::REGIONS, &normalized)
            .map(|code| Self { code })
            .ok_or_else(|| UnknownCode::new("region", code))
    }

    /// Lenient read-side constructor: absent, blank, or unrecognized
    /// stored values resolve to "no region".
    pub fn from_stored(value: Option<&str>) -> Option<Self> {
        let code = value?.trim();
        if code.is_empty() {
            return None;
        }
        Self::from_code(code).ok()
    }

    /// The default region (US).
    pub fn default_region() -> Self {
        Self::UNITED_STATES
    }

    /// The ISO 3166-1 alpha-2 code string.
    pub fn code(&self) -> &'static str {
        self.code
    }
}

fn title_case(code: &str) -> String {
    let mut out = code.to_ascii_lowercase();
    if let Some(first) = out.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    out
}

/// A complete locale: mandatory language, optional script and region.
///
/// Ordering and equality of query results are defined over the canonical
/// identifier string produced by [`Locale::identifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    pub language: LanguageCode,
    pub script: Option<ScriptCode>,
    pub region: Option<RegionCode>,
}

impl Locale {
    /// A locale with just a language.
    pub fn new(language: LanguageCode) -> Self {
        Self {
            language,
            script: None,
            region: None,
        }
    }

    pub fn with_script(mut self, script: ScriptCode) -> Self {
        self.script = Some(script);
        self
    }

    pub fn with_region(mut self, region: RegionCode) -> Self {
        self.region = Some(region);
        self
    }

    /// Parse a canonical identifier like `en`, `zh-Hans`, or `pt-BR`.
    ///
    /// The leading segment must be a recognized language; each remaining
    /// segment is classified by length (four letters is a script, two is
    /// a region) and validated. Anything else fails with `UnknownCode`.
    pub fn parse(identifier: &str) -> Result<Self, UnknownCode> {
        let mut segments = identifier.split('-');
        let language = match segments.next() {
            Some(first) if !first.is_empty() => LanguageCode::from_code(first)?,
            _ => return Err(UnknownCode::new("language", identifier)),
        };

        let mut locale = Locale::new(language);
        for segment in segments {
            match segment.len() {
                4 if locale.script.is_none() => {
                    locale.script = Some(ScriptCode::from_code(segment)?);
                }
                2 if locale.region.is_none() => {
                    locale.region = Some(RegionCode::from_code(segment)?);
                }
                _ => return Err(UnknownCode::new("locale segment", segment)),
            }
        }
        Ok(locale)
    }

    /// The canonical `language[-Script][-REGION]` identifier.
    pub fn identifier(&self) -> String {
        let mut out = String::from(self.language.code());
        if let Some(script) = self.script {
            out.push('-');
            out.push_str(script.code());
        }
        if let Some(region) = self.region {
            out.push('-');
            out.push_str(region.code());
        }
        out
    }

    /// Match against another locale.
    ///
    /// An exact match compares all three fields; a partial match compares
    /// the language only, so `en` partially matches `en-GB`.
    pub fn matches(&self, other: &Locale, exact: bool) -> bool {
        if exact {
            self == other
        } else {
            self.language == other.language
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

impl PartialOrd for Locale {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Locale {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier().cmp(&other.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Code Construction Tests ====================

    #[test]
    fn test_language_from_code_known() {
        let lang = LanguageCode::from_code("fr").expect("Should succeed");
        assert_eq!(lang.code(), "fr");
    }

    #[test]
    fn test_language_from_code_normalizes_case() {
        let lang = LanguageCode::from_code("FR").expect("Should succeed");
        assert_eq!(lang.code(), "fr");
    }

    #[test]
    fn test_language_from_code_unknown() {
        let result = LanguageCode::from_code("qq");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown language"));
    }

    #[test]
    fn test_language_from_code_empty() {
        assert!(LanguageCode::from_code("").is_err());
    }

    #[test]
    fn test_script_from_code_normalizes_case() {
        let script = ScriptCode::from_code("hans").expect("Should succeed");
        assert_eq!(script.code(), "Hans");
    }

    #[test]
    fn test_region_from_code_normalizes_case() {
        let region = RegionCode::from_code("de").expect("Should succeed");
        assert_eq!(region.code(), "DE");
    }

    // ==================== Default / Fallback Tests ====================

    #[test]
    fn test_default_language_is_english() {
        assert_eq!(LanguageCode::default_language().code(), "en");
    }

    #[test]
    fn test_default_region_is_us() {
        assert_eq!(RegionCode::default_region().code(), "US");
    }

    #[test]
    fn test_language_from_stored_absent_falls_back() {
        assert_eq!(LanguageCode::from_stored(None), LanguageCode::ENGLISH);
        assert_eq!(LanguageCode::from_stored(Some("")), LanguageCode::ENGLISH);
        assert_eq!(LanguageCode::from_stored(Some("  ")), LanguageCode::ENGLISH);
    }

    #[test]
    fn test_language_from_stored_unknown_falls_back() {
        assert_eq!(LanguageCode::from_stored(Some("zz")), LanguageCode::ENGLISH);
    }

    #[test]
    fn test_language_from_stored_known() {
        assert_eq!(LanguageCode::from_stored(Some("de")).code(), "de");
    }

    #[test]
    fn test_script_from_stored_absent_is_none() {
        assert_eq!(ScriptCode::from_stored(None), None);
        assert_eq!(ScriptCode::from_stored(Some("")), None);
        assert_eq!(ScriptCode::from_stored(Some("Zzzz")), None);
    }

    #[test]
    fn test_region_from_stored_known() {
        assert_eq!(RegionCode::from_stored(Some("GB")).unwrap().code(), "GB");
    }

    // ==================== Identifier Tests ====================

    #[test]
    fn test_identifier_language_only() {
        let locale = Locale::new(LanguageCode::ENGLISH);
        assert_eq!(locale.identifier(), "en");
    }

    #[test]
    fn test_identifier_language_region() {
        let locale = Locale::new(LanguageCode::ENGLISH)
            .with_region(RegionCode::from_code("GB").unwrap());
        assert_eq!(locale.identifier(), "en-GB");
    }

    #[test]
    fn test_identifier_full() {
        let locale = Locale::new(LanguageCode::from_code("zh").unwrap())
            .with_script(ScriptCode::from_code("Hans").unwrap())
            .with_region(RegionCode::from_code("CN").unwrap());
        assert_eq!(locale.identifier(), "zh-Hans-CN");
    }

    #[test]
    fn test_display_matches_identifier() {
        let locale = Locale::parse("pt-BR").unwrap();
        assert_eq!(format!("{}", locale), "pt-BR");
    }

    // ==================== Parse Tests ====================

    #[test]
    fn test_parse_language_only() {
        let locale = Locale::parse("de").unwrap();
        assert_eq!(locale.language.code(), "de");
        assert_eq!(locale.script, None);
        assert_eq!(locale.region, None);
    }

    #[test]
    fn test_parse_full_identifier() {
        let locale = Locale::parse("zh-Hant-TW").unwrap();
        assert_eq!(locale.language.code(), "zh");
        assert_eq!(locale.script.unwrap().code(), "Hant");
        assert_eq!(locale.region.unwrap().code(), "TW");
    }

    #[test]
    fn test_parse_unknown_language_fails() {
        assert!(Locale::parse("zz-US").is_err());
    }

    #[test]
    fn test_parse_garbage_segment_fails() {
        assert!(Locale::parse("en-US-extra").is_err());
        assert!(Locale::parse("").is_err());
    }

    // ==================== Matching / Ordering Tests ====================

    #[test]
    fn test_exact_match() {
        let a = Locale::parse("en-US").unwrap();
        let b = Locale::parse("en-US").unwrap();
        let c = Locale::parse("en-GB").unwrap();
        assert!(a.matches(&b, true));
        assert!(!a.matches(&c, true));
    }

    #[test]
    fn test_partial_match_compares_language_only() {
        let bare = Locale::parse("en").unwrap();
        let regional = Locale::parse("en-GB").unwrap();
        let french = Locale::parse("fr").unwrap();
        assert!(bare.matches(&regional, false));
        assert!(!bare.matches(&french, false));
    }

    #[test]
    fn test_ordering_follows_identifier_string() {
        let mut locales = vec![
            Locale::parse("fr").unwrap(),
            Locale::parse("en-US").unwrap(),
            Locale::parse("en").unwrap(),
            Locale::parse("de").unwrap(),
        ];
        locales.sort();
        let identifiers: Vec<String> = locales.iter().map(Locale::identifier).collect();
        assert_eq!(identifiers, vec!["de", "en", "en-US", "fr"]);
    }
}
