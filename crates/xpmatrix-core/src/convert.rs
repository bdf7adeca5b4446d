//! Legend value autoconversion.
//!
//! Legend descriptions are free-form strings. When autoconversion is enabled
//! each description is turned into the best fitting scalar: integers first,
//! then floats, and finally a word mapping for boolean-like labels such as
//! `Present`/`None`. Anything else stays a string.

use std::collections::HashMap;

use crate::value::Value;

/// Conversion hook applied to every raw palette value.
pub trait Autoconvert {
    fn convert(&self, raw: &str) -> Value;
}

impl<F> Autoconvert for F
where
    F: Fn(&str) -> Value,
{
    fn convert(&self, raw: &str) -> Value {
        self(raw)
    }
}

const TRUE_WORDS: &[&str] = &["True", "x", "X", "yes", "Present", "present"];
const FALSE_WORDS: &[&str] = &["False", "-", "no", "None", "none", "Absent", "absent"];

/// Single-value converter with a configurable boolean word mapping.
///
/// # Examples
/// ```
/// use xpmatrix_core::{Autoconvert, Autoconverter, Value};
///
/// let converter = Autoconverter::default();
/// assert_eq!(converter.convert(" 42 "), Value::Int(42));
/// assert_eq!(converter.convert("0.5"), Value::Float(0.5));
/// assert_eq!(converter.convert("Present"), Value::Bool(true));
/// assert_eq!(converter.convert("Coil"), Value::Str("Coil".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct Autoconverter {
    mapping: HashMap<String, bool>,
}

impl Default for Autoconverter {
    fn default() -> Self {
        let mapping = TRUE_WORDS
            .iter()
            .map(|word| (word.to_string(), true))
            .chain(FALSE_WORDS.iter().map(|word| (word.to_string(), false)))
            .collect();
        Self { mapping }
    }
}

impl Autoconverter {
    /// Converter using only the given word mapping.
    pub fn with_mapping<I, S>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self {
            mapping: mapping
                .into_iter()
                .map(|(word, value)| (word.into(), value))
                .collect(),
        }
    }

    /// Add or replace a word in the mapping.
    pub fn map_word(mut self, word: impl Into<String>, value: bool) -> Self {
        self.mapping.insert(word.into(), value);
        self
    }

    /// Best numeric type for `raw` without consulting the word mapping.
    pub fn best_type(raw: &str) -> Value {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Value::Int(value);
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return Value::Float(value);
        }
        Value::Str(trimmed.to_string())
    }
}

impl Autoconvert for Autoconverter {
    fn convert(&self, raw: &str) -> Value {
        match Self::best_type(raw) {
            Value::Str(text) => match self.mapping.get(&text) {
                Some(flag) => Value::Bool(*flag),
                None => Value::Str(text),
            },
            other => other,
        }
    }
}
