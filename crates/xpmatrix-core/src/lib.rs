//! xpmatrix core library for decoding GROMACS XPM matrices.
//!
//! GROMACS writes 2-D analysis results (hydrogen-bond existence maps,
//! secondary structure over time, distance and RMSD matrices) as text
//! pixmaps. The colour legend of such a file doubles as a value legend, so
//! the pixel grid can be turned back into numbers.
//!
//! Decoding is line-oriented and side-effect free apart from `log` records:
//! `format::xpm` holds the layered decoder (layout/reader/legend/parser),
//! `convert` infers value types from legend text, and `Matrix` stores the
//! result with a single inferred dtype. File access is limited to
//! `decode_xpm_file` and the `Xpm` container.
//!
//! Invariants:
//! - Matrix shape is `(nx / nb, ny)`; axis 0 are pixel columns, axis 1 data
//!   rows in file order.
//! - Every pixel symbol must be declared in the legend.
//! - Rows missing from the file stay zero; trailing characters beyond
//!   `(nx / nb) * nb` are ignored.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use xpmatrix_core::{DecodeOptions, decode_xpm_file};
//!
//! let image = decode_xpm_file(Path::new("ss.xpm"), &DecodeOptions::default())?;
//! println!("dtype {} shape {:?}", image.matrix.dtype(), image.matrix.shape());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod container;
mod convert;
mod decode;
pub mod format;
mod matrix;
mod value;

pub use container::{Xpm, with_default_extension};
pub use convert::{Autoconvert, Autoconverter};
pub use decode::{DecodeError, DecodeOptions, decode_reader, decode_with, decode_xpm_file};
pub use format::xpm::error::XpmError;
pub use format::xpm::{
    Header, Metadata, Palette, PaletteEntry, XpmImage, parse_legend_entry,
    parse_legend_entry_with_width,
};
pub use matrix::Matrix;
pub use ndarray;
pub use value::{Dtype, Value};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Serialisable view of a decoded file.
///
/// `data` holds one array per data row in file order, each with one value
/// per pixel column.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use xpmatrix_core::{DecodeOptions, decode_reader, make_report};
///
/// let xpm = "static char *gromacs_xpm[] = {\n\"2 1 2 1\",\n\
///            \"A  c #FFFFFF \" /* \"0\" */,\n\"B  c #000000 \" /* \"1\" */,\n\"BA\"\n";
/// let image = decode_reader(Cursor::new(xpm), &DecodeOptions::default())?;
/// let report = make_report("map.xpm", xpm.len() as u64, &image, false);
/// assert_eq!(report.shape, [2, 1]);
/// assert_eq!(report.data[0].len(), 2);
/// # Ok::<(), xpmatrix_core::DecodeError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    pub input: InputInfo,
    pub header: Header,
    pub dtype: Dtype,
    /// `[columns, rows]`.
    pub shape: [usize; 2],
    #[serde(default)]
    pub metadata: Metadata,
    /// Legend entries in file order.
    pub palette: Vec<PaletteSummary>,
    /// Mean over the columns of each row, when requested and numeric.
    ///
    /// A matrix without columns has NaN means, written as `"NaN"`.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "float_text")]
    pub row_means: Option<Vec<f64>>,
    pub data: Vec<Vec<Value>>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input file metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// One legend entry with its decoded value.
///
/// # Examples
/// ```
/// use xpmatrix_core::{PaletteSummary, Value};
///
/// let entry = PaletteSummary {
///     symbol: "o".to_string(),
///     color: "#FF0000".to_string(),
///     raw: "Present".to_string(),
///     value: Value::Bool(true),
/// };
/// assert_eq!(entry.value, Value::Bool(true));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteSummary {
    pub symbol: String,
    pub color: String,
    /// Legend text as written in the file.
    pub raw: String,
    /// Value used in the matrix for this symbol, in the matrix dtype.
    pub value: Value,
}

/// Build a report for a decoded file.
pub fn make_report(
    input_path: &str,
    input_bytes: u64,
    image: &XpmImage,
    include_row_means: bool,
) -> Report {
    let (columns, rows) = image.matrix.shape();
    let dtype = image.matrix.dtype();
    let palette = image
        .palette
        .entries()
        .iter()
        .map(|entry| PaletteSummary {
            symbol: entry.symbol.clone(),
            color: entry.color.clone(),
            raw: entry.value.clone(),
            value: image
                .palette
                .get(&entry.symbol)
                .and_then(|value| value.to_dtype(dtype))
                .unwrap_or_else(|| Value::Str(entry.value.clone())),
        })
        .collect();

    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "xpmatrix".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        header: image.header,
        dtype,
        shape: [columns, rows],
        metadata: image.metadata.clone(),
        palette,
        row_means: if include_row_means {
            image.matrix.row_means()
        } else {
            None
        },
        data: image.matrix.to_rows(),
    }
}

/// Float lists that keep non-finite entries as text, like `Value::Float`.
mod float_text {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::value::Value;

    pub fn serialize<S: Serializer>(
        values: &Option<Vec<f64>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match values {
            Some(values) => {
                serializer.collect_seq(values.iter().map(|value| Value::Float(*value)))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<f64>>, D::Error> {
        let Some(values) = Option::<Vec<Value>>::deserialize(deserializer)? else {
            return Ok(None);
        };
        values
            .into_iter()
            .map(|value| match value {
                Value::Str(text) => text
                    .parse()
                    .map_err(|_| D::Error::custom(format!("invalid float {text:?}"))),
                other => other
                    .as_f64()
                    .ok_or_else(|| D::Error::custom(format!("invalid float {other}"))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}
