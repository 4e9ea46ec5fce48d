use std::sync::OnceLock;

use regex::Regex;

/// Utility for parsing PostgreSQL constraint violation messages.
///
/// PostgreSQL reports the violated constraint by name and, in the DETAIL
/// line, the offending key. Both are used to recover the entity and field.
pub struct ConstraintParser;

struct RegexPatterns {
    /// `Key (field)=(value)` from the DETAIL line
    key_value: Regex,
    column_name: Regex,
    /// `relation "users"` or `table "users"`
    table_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("static regex"),
            column_name: Regex::new(r#"column "([^"]+)""#).expect("static regex"),
            table_name: Regex::new(r#"(?:relation|table) "([^"]+)""#).expect("static regex"),
        }
    }
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

/// Suffixes PostgreSQL appends to generated constraint names
const CONSTRAINT_SUFFIXES: &[&str] = &["_key", "_pkey", "_check", "_idx", "_not_null"];

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Extract `(entity, field, value)` from a unique violation.
    ///
    /// `text` is the primary message joined with the DETAIL line, which is
    /// where PostgreSQL puts the duplicate key.
    ///
    /// ```
    /// use edgebrook_accounts::error::ConstraintParser;
    ///
    /// let text = "duplicate key value violates unique constraint \"users_username_key\"\nKey (username)=(ada) already exists.";
    /// let parsed = ConstraintParser::parse_unique_violation(text, Some("users_username_key"));
    /// assert_eq!(parsed, Some(("users".into(), "username".into(), "ada".into())));
    /// ```
    pub fn parse_unique_violation(
        text: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let key_value = Self::extract_key_value(text);

        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = key_value
                .map(|(_, value)| value)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = key_value?;
        let entity = Self::extract_table(text).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Extract `(entity, field)` from a not-null violation such as
    /// `null value in column "name" of relation "users" violates not-null constraint`.
    pub fn parse_not_null_violation(
        text: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = Self::extract_column(text)?;
        let entity = Self::extract_table(text)
            .or_else(|| {
                constraint_name.and_then(|c| Self::parse_constraint_name(c).map(|(e, _)| e))
            })
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Extract `(entity, field)` from a check violation.
    pub fn parse_check_violation(
        text: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        if let Some(parsed) = constraint_name.and_then(Self::parse_constraint_name) {
            return Some(parsed);
        }

        let field = Self::extract_column(text)?;
        let entity = Self::extract_table(text).unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Split a generated constraint name into `(table, column)`.
    ///
    /// - `users_username_key` -> `("users", "username")`
    /// - `users_is_admin_check` -> `("users", "is_admin")`
    ///
    /// The table is assumed to be a single word; everything between it and the
    /// suffix is the column.
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint_name.strip_suffix(suffix))?;
        let (entity, field) = stem.split_once('_')?;

        if entity.is_empty() || field.is_empty() {
            return None;
        }

        Some((entity.to_string(), field.to_string()))
    }

    pub fn extract_column(text: &str) -> Option<String> {
        Self::patterns()
            .column_name
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_table(text: &str) -> Option<String> {
        Self::patterns()
            .table_name
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_key_value(text: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(text).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }
}
