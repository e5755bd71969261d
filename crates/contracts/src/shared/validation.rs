//! Field validation primitives used by every form

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address.";

/// Validation rules for a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationRules {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl ValidationRules {
    /// Optional field, no constraints
    pub const fn none() -> Self {
        Self {
            required: false,
            min_length: None,
            max_length: None,
        }
    }

    /// Required field
    pub const fn required() -> Self {
        Self {
            required: true,
            min_length: None,
            max_length: None,
        }
    }

    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Validate an already trimmed value. Lengths are counted in characters.
    pub fn validate_string(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            return if self.required {
                Err(REQUIRED_MESSAGE.to_string())
            } else {
                Ok(())
            };
        }

        let length = value.chars().count();

        if let Some(min) = self.min_length {
            if length < min {
                return Err(format!(
                    "Ensure this value has at least {} characters (it has {}).",
                    min, length
                ));
            }
        }

        if let Some(max) = self.max_length {
            if length > max {
                return Err(format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, length
                ));
            }
        }

        Ok(())
    }
}

/// Errors collected while cleaning a form.
///
/// Field errors are keyed by field name; `non_field_errors` hold messages
/// that concern the record as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub non_field_errors: Vec<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error for a single field
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field_errors.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
        self.non_field_errors.extend(other.non_field_errors);
    }

    /// Trim `value`, check it against `rules` and record a failure under
    /// `field`. Returns the trimmed value either way.
    pub fn text(&mut self, field: &str, value: &str, rules: ValidationRules) -> String {
        let value = value.trim();
        if let Err(message) = rules.validate_string(value) {
            self.add(field, message);
        }
        value.to_string()
    }

    /// Required email address field
    pub fn email(&mut self, field: &str, value: &str, max_length: usize) -> String {
        let value = self.text(
            field,
            value,
            ValidationRules::required().max_length(max_length),
        );
        if !self.has(field) && !is_valid_email(&value) {
            self.add(field, INVALID_EMAIL_MESSAGE);
        }
        value
    }

    /// Optional image path; blank input means "no image"
    pub fn image(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        if let Err(message) = ValidationRules::none().max_length(255).validate_string(value) {
            self.add(field, message);
        }
        Some(value.to_string())
    }

    /// `Ok(value)` when no error was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        parts.extend(self.non_field_errors.iter().cloned());
        write!(f, "{}", parts.join("; "))
    }
}

/// Number of ASCII digits in `value`
pub fn count_digits(value: &str) -> usize {
    value.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Structural email check: one `@`, a non-empty local part without spaces,
/// and a dotted domain whose labels are alphanumeric (hyphens allowed inside)
/// ending in an alphabetic TLD of two or more letters.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty()
        || domain.contains('@')
        || local.chars().any(|c| c.is_whitespace() || c.is_control())
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });
    let tld = labels[labels.len() - 1];
    labels_ok && tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic)
}
