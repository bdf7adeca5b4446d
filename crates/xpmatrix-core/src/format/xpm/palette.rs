use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::legend::PaletteEntry;
use crate::convert::Autoconvert;
use crate::value::{Dtype, Value};

/// Symbol to value mapping declared by the colour legend.
///
/// Entries are kept in file order; the value map is keyed by symbol and a
/// repeated symbol replaces the earlier value.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    values: BTreeMap<String, Value>,
}

impl Palette {
    /// Build the mapping, converting every raw value when a converter is
    /// given and keeping it as `Value::Str` otherwise.
    pub fn build(entries: Vec<PaletteEntry>, converter: Option<&dyn Autoconvert>) -> Self {
        let mut values = BTreeMap::new();
        for entry in &entries {
            let value = match converter {
                Some(converter) => converter.convert(&entry.value),
                None => Value::Str(entry.value.clone()),
            };
            values.insert(entry.symbol.clone(), value);
        }
        if converter.is_some() {
            debug!("autoconverted colours: {values:?}");
        }
        Self { entries, values }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn get(&self, symbol: &str) -> Option<&Value> {
        self.values.get(symbol)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Common dtype of all palette values.
    pub fn dtype(&self) -> Dtype {
        Dtype::common(self.values.values().map(Value::dtype))
    }

    /// Lookup table holding every value projected by `project`.
    ///
    /// Values the projection rejects are left out, so a symbol mapped to such
    /// a value decodes as unknown.
    pub(crate) fn lookup_table<T>(&self, project: impl Fn(&Value) -> Option<T>) -> HashMap<&str, T> {
        self.values
            .iter()
            .filter_map(|(symbol, value)| project(value).map(|v| (symbol.as_str(), v)))
            .collect()
    }
}
