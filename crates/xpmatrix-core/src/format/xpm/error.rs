use thiserror::Error;

/// Errors returned by XPM decoding.
///
/// # Examples
/// ```
/// use xpmatrix_core::XpmError;
///
/// let err = XpmError::UnknownSymbol {
///     symbol: "z".to_string(),
///     row: 0,
///     column: 3,
/// };
/// assert!(err.to_string().contains("unknown pixel symbol"));
/// ```
#[derive(Debug, Error)]
pub enum XpmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing array declaration `{marker}`")]
    MissingDeclaration { marker: &'static str },
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },
    #[error("invalid dimension line {line} ({reason}): {text:?}")]
    InvalidDimensions {
        line: usize,
        reason: &'static str,
        text: String,
    },
    #[error("cannot parse colour specification {text:?}")]
    InvalidLegendEntry { text: String },
    #[error("unknown pixel symbol {symbol:?} at column {column} of row {row}")]
    UnknownSymbol {
        symbol: String,
        row: usize,
        column: usize,
    },
    #[error("data row {row} exceeds the declared row count {declared}")]
    TooManyRows { row: usize, declared: usize },
}
