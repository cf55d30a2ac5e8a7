//! Submitted form data and field errors.
//!
//! HTML forms repeat keys for multi-selects (`tags=1&tags=3`), which a flat
//! struct cannot express through `serde_urlencoded`. Handlers therefore
//! extract `web::Form<Vec<(String, String)>>`, wrap it in [`FormData`] and
//! build a typed form from it. Typed forms declare their field rules with
//! `validator` and report failures as [`FormErrors`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};

/// Key under which errors not tied to a single field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Raw key/value pairs of a submitted form, in submission order.
#[derive(Clone, Debug, Default)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    /// First value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `key`, trimmed. Missing keys read as empty.
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().trim().to_owned()
    }

    /// Every value submitted under `key`.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn csrf_token(&self) -> &str {
        self.get("csrf_token").unwrap_or_default()
    }
}

impl From<Vec<(String, String)>> for FormData {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

/// Field name to error messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Folds another set of errors into this one.
    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Messages for one field, empty when the field is valid.
    pub fn get(&self, field: &str) -> Vec<String> {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    /// Every message, field order then insertion order.
    pub fn messages(&self) -> Vec<String> {
        self.fields.values().flatten().cloned().collect()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join(" "))
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = match &err.message {
                    Some(message) => message.to_string(),
                    None => default_message(&err.code),
                };
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}

fn default_message(code: &str) -> String {
    match code {
        "length" => "Ensure this value is not too long.".to_owned(),
        "range" => "Ensure this value is within range.".to_owned(),
        "url" => "Enter a valid URL.".to_owned(),
        _ => "Enter a valid value.".to_owned(),
    }
}

/// Runs the `validator` rules of a typed form.
pub fn validate_form<T: Validate>(form: &T) -> Result<(), FormErrors> {
    form.validate().map_err(FormErrors::from)
}

/// Rejects empty or whitespace-only values.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::from("This field is required."));
        return Err(err);
    }
    Ok(())
}

/// Accepts an empty value or an absolute http(s) URL.
pub fn optional_http_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }

    match url::Url::parse(value) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        _ => {
            let mut err = ValidationError::new("url");
            err.message = Some(Cow::from("Enter a valid URL."));
            Err(err)
        }
    }
}

/// Parses a select value into a primary key.
///
/// `Ok(None)` for an empty selection, `Err` for anything that is not an id.
pub fn parse_optional_id(raw: &str) -> Result<Option<i32>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i32>().map(Some).map_err(|_| ())
}

/// Parses a multi-select into ids, dropping duplicates and junk values.
pub fn parse_id_list(raw: &[&str]) -> Vec<i32> {
    let mut ids: Vec<i32> = raw
        .iter()
        .filter_map(|value| value.trim().parse::<i32>().ok())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::from(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_form_data_reads_repeated_keys() {
        let form = data(&[("tags", "3"), ("title", " Hello "), ("tags", "1")]);
        assert_eq!(form.get_all("tags"), vec!["3", "1"]);
        assert_eq!(form.text("title"), "Hello");
        assert_eq!(form.get("missing"), None);
        assert_eq!(form.text("missing"), "");
    }

    #[test]
    fn test_parse_optional_id() {
        assert_eq!(parse_optional_id(""), Ok(None));
        assert_eq!(parse_optional_id(" 12 "), Ok(Some(12)));
        assert!(parse_optional_id("twelve").is_err());
    }

    #[test]
    fn test_parse_id_list_dedups_and_skips_junk() {
        assert_eq!(parse_id_list(&["4", "x", "2", "4", ""]), vec![2, 4]);
        assert!(parse_id_list(&[]).is_empty());
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("a").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_optional_http_url() {
        assert!(optional_http_url("").is_ok());
        assert!(optional_http_url("https://example.com/me").is_ok());
        assert!(optional_http_url("ftp://example.com").is_err());
        assert!(optional_http_url("example.com").is_err());
    }

    #[test]
    fn test_form_errors_collects_per_field() {
        let mut errors = FormErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.add("name", "This field is required.");
        errors.merge(FormErrors::single("name", "Too long."));
        errors.add(NON_FIELD_ERRORS, "Something else.");

        assert!(errors.has("name"));
        assert_eq!(errors.get("name").len(), 2);
        assert!(errors.get("description").is_empty());
        assert_eq!(errors.messages().len(), 3);
        assert!(errors.into_result().is_err());
    }
}
