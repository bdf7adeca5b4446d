//! Scalar values carried by a palette and the element types of a decoded
//! matrix.
//!
//! Element types are ordered by promotion (`Bool < Int < Float < Str`): the
//! dtype of a matrix is the largest dtype among its palette values, and every
//! palette value is projected into that dtype before the grid is filled.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// A single palette value, either the raw legend text or its converted form.
///
/// JSON has no NaN or infinity, so non-finite floats serialise as their
/// text form (`"NaN"`, `"inf"`, `"-inf"`) and read back as `Value::Str`.
///
/// # Examples
/// ```
/// use xpmatrix_core::{Dtype, Value};
///
/// let value = Value::Int(3);
/// assert_eq!(value.dtype(), Dtype::Int);
/// assert_eq!(value.as_f64(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn dtype(&self) -> Dtype {
        match self {
            Value::Bool(_) => Dtype::Bool,
            Value::Int(_) => Dtype::Int,
            Value::Float(_) => Dtype::Float,
            Value::Str(_) => Dtype::Str,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bool(value) => Some(i64::from(*value)),
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            Value::Str(_) => None,
        }
    }

    /// Projection into `dtype`, as stored in a matrix of that dtype.
    ///
    /// `None` when the value would have to narrow, e.g. a float into an
    /// integer matrix.
    pub fn to_dtype(&self, dtype: Dtype) -> Option<Value> {
        match dtype {
            Dtype::Bool => self.as_bool().map(Value::Bool),
            Dtype::Int => self.as_i64().map(Value::Int),
            Dtype::Float => self.as_f64().map(Value::Float),
            Dtype::Str => Some(Value::Str(self.to_text())),
        }
    }

    /// Textual form used when a value is promoted into a string matrix.
    ///
    /// Booleans render as `True`/`False` and floats always keep a decimal
    /// point, matching how the legend would usually spell them.
    pub fn to_text(&self) -> String {
        match self {
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => format!("{value:?}"),
            Value::Str(value) => value.clone(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) if value.is_finite() => serializer.serialize_f64(*value),
            Value::Float(_) => serializer.serialize_str(&self.to_text()),
            Value::Str(value) => serializer.serialize_str(value),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Element type of a decoded matrix.
///
/// # Examples
/// ```
/// use xpmatrix_core::Dtype;
///
/// let dtype = Dtype::common([Dtype::Bool, Dtype::Int]);
/// assert_eq!(dtype, Dtype::Int);
/// assert_eq!(Dtype::common([]), Dtype::Float);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dtype {
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "int64")]
    Int,
    #[serde(rename = "float64")]
    Float,
    #[serde(rename = "str")]
    Str,
}

impl Dtype {
    /// Common dtype of a set of values; an empty set is `Float`.
    pub fn common<I>(dtypes: I) -> Dtype
    where
        I: IntoIterator<Item = Dtype>,
    {
        dtypes.into_iter().max().unwrap_or(Dtype::Float)
    }

    pub fn name(self) -> &'static str {
        match self {
            Dtype::Bool => "bool",
            Dtype::Int => "int64",
            Dtype::Float => "float64",
            Dtype::Str => "str",
        }
    }

    /// Bytes needed for a matrix of `shape`, or `None` if that overflows.
    pub fn storage_size(self, (columns, rows): (usize, usize)) -> Option<usize> {
        let element = match self {
            Dtype::Bool => size_of::<bool>(),
            Dtype::Int => size_of::<i64>(),
            Dtype::Float => size_of::<f64>(),
            Dtype::Str => size_of::<String>(),
        };
        columns.checked_mul(rows)?.checked_mul(element)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{Dtype, Value};

    #[test]
    fn common_dtype_follows_promotion_order() {
        assert_eq!(Dtype::common([Dtype::Bool]), Dtype::Bool);
        assert_eq!(Dtype::common([Dtype::Int, Dtype::Bool]), Dtype::Int);
        assert_eq!(Dtype::common([Dtype::Int, Dtype::Float]), Dtype::Float);
        assert_eq!(Dtype::common([Dtype::Float, Dtype::Str, Dtype::Bool]), Dtype::Str);
    }

    #[test]
    fn empty_palette_defaults_to_float() {
        assert_eq!(Dtype::common(Vec::new()), Dtype::Float);
    }

    #[test]
    fn storage_size_counts_element_bytes() {
        assert_eq!(Dtype::Bool.storage_size((3, 2)), Some(6));
        assert_eq!(Dtype::Float.storage_size((3, 2)), Some(48));
        assert_eq!(Dtype::Float.storage_size((1 << 61, 1)), None);
        assert_eq!(Dtype::Int.storage_size((usize::MAX, 2)), None);
    }

    #[test]
    fn projections_widen_but_never_narrow() {
        assert_eq!(Value::Bool(true).as_i64(), Some(1));
        assert_eq!(Value::Bool(false).as_f64(), Some(0.0));
        assert_eq!(Value::Int(7).as_f64(), Some(7.0));
        assert_eq!(Value::Int(7).as_bool(), None);
        assert_eq!(Value::Float(1.5).as_i64(), None);
        assert_eq!(Value::Str("1".to_string()).as_f64(), None);
    }

    #[test]
    fn text_form_keeps_type_hints() {
        assert_eq!(Value::Bool(true).to_text(), "True");
        assert_eq!(Value::Int(-4).to_text(), "-4");
        assert_eq!(Value::Float(1.0).to_text(), "1.0");
        assert_eq!(Value::Float(0.25).to_text(), "0.25");
        assert_eq!(Value::Str("Present".to_string()).to_text(), "Present");
    }

    #[test]
    fn projection_follows_matrix_dtype() {
        assert_eq!(Value::Bool(false).to_dtype(Dtype::Int), Some(Value::Int(0)));
        assert_eq!(Value::Int(2).to_dtype(Dtype::Float), Some(Value::Float(2.0)));
        assert_eq!(
            Value::Bool(true).to_dtype(Dtype::Str),
            Some(Value::Str("True".to_string()))
        );
        assert_eq!(Value::Float(0.5).to_dtype(Dtype::Int), None);
    }

    #[test]
    fn non_finite_floats_serialize_as_text() {
        let values = vec![
            Value::Float(f64::NAN),
            Value::Float(f64::INFINITY),
            Value::Float(f64::NEG_INFINITY),
        ];
        let json = serde_json::to_string(&values).expect("values json");
        assert_eq!(json, r#"["NaN","inf","-inf"]"#);

        let back: Vec<Value> = serde_json::from_str(&json).expect("values back");
        assert_eq!(back[0], Value::Str("NaN".to_string()));
    }

    #[test]
    fn serializes_untagged() {
        let values = vec![
            Value::Bool(true),
            Value::Int(2),
            Value::Float(0.5),
            Value::Str("coil".to_string()),
        ];
        let json = serde_json::to_string(&values).expect("values json");
        assert_eq!(json, r#"[true,2,0.5,"coil"]"#);
        assert_eq!(serde_json::to_string(&Dtype::Str).expect("dtype json"), r#""str""#);
        assert_eq!(
            serde_json::to_string(&Dtype::Float).expect("dtype json"),
            format!("\"{}\"", Dtype::Float.name())
        );
    }
}
