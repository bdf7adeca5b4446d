use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::convert::{Autoconvert, Autoconverter};
use crate::format::xpm::error::XpmError;
use crate::format::xpm::{XpmImage, parse_xpm};

/// Decoding switches.
///
/// # Examples
/// ```
/// use xpmatrix_core::DecodeOptions;
///
/// assert!(DecodeOptions::default().autoconvert);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Infer value types from the legend descriptions.
    pub autoconvert: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { autoconvert: true }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XPM decode error: {0}")]
    Xpm(XpmError),
    #[error("no input file to parse")]
    NoSource,
}

impl From<XpmError> for DecodeError {
    fn from(value: XpmError) -> Self {
        match value {
            XpmError::Io(err) => DecodeError::Io(err),
            other => DecodeError::Xpm(other),
        }
    }
}

/// Open `path` and decode it. The file is closed before returning.
pub fn decode_xpm_file(path: &Path, options: &DecodeOptions) -> Result<XpmImage, DecodeError> {
    debug!("decoding {}", path.display());
    let file = File::open(path)?;
    decode_reader(BufReader::new(file), options)
}

pub fn decode_reader<R: BufRead>(
    reader: R,
    options: &DecodeOptions,
) -> Result<XpmImage, DecodeError> {
    let converter = Autoconverter::default();
    let converter = options
        .autoconvert
        .then_some(&converter as &dyn Autoconvert);
    decode_with(reader, converter)
}

/// Decode with a caller-supplied converter, or none to keep raw strings.
pub fn decode_with<R: BufRead>(
    reader: R,
    converter: Option<&dyn Autoconvert>,
) -> Result<XpmImage, DecodeError> {
    Ok(parse_xpm(reader, converter)?)
}
