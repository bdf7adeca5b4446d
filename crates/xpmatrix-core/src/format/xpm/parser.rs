use std::collections::HashMap;
use std::io::BufRead;

use log::{debug, error, trace};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::error::XpmError;
use super::layout;
use super::legend::parse_legend_entry_with_width;
use super::palette::Palette;
use super::reader::{Line, LineReader, is_array_close, is_comment, uncomment, unquote};
use crate::convert::Autoconvert;
use crate::matrix::Matrix;
use crate::value::Value;

/// The four integers of the dimension line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Characters per data row (`nx`).
    pub width: usize,
    /// Declared number of data rows (`ny`).
    pub rows: usize,
    /// Number of legend lines (`nc`).
    pub palette_size: usize,
    /// Characters per pixel symbol (`nb`), never zero.
    pub stride: usize,
}

impl Header {
    /// Matrix shape `(width / stride, rows)`.
    ///
    /// Integer division drops trailing characters of a row when the stride
    /// does not divide the width.
    pub fn shape(&self) -> (usize, usize) {
        (self.width / self.stride, self.rows)
    }
}

/// Descriptive comments found before the array declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    /// Map type, usually `Discrete` or `Continuous`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Metadata {
    fn absorb(&mut self, comment: &str) {
        let Some((key, value)) = comment.split_once(':') else {
            return;
        };
        let slot = match key.trim() {
            layout::META_TITLE => &mut self.title,
            layout::META_LEGEND => &mut self.legend,
            layout::META_X_LABEL => &mut self.x_label,
            layout::META_Y_LABEL => &mut self.y_label,
            layout::META_TYPE => &mut self.kind,
            _ => return,
        };
        *slot = Some(unquote(value.trim()).to_string());
    }
}

/// A fully decoded XPM file.
#[derive(Debug, Clone, PartialEq)]
pub struct XpmImage {
    pub header: Header,
    pub metadata: Metadata,
    pub palette: Palette,
    pub matrix: Matrix,
}

/// Decode an XPM matrix from `reader`.
///
/// Lines up to the array declaration are scanned for metadata, then the
/// dimension line, `nc` legend lines and the data rows follow. Comment lines
/// between data rows are skipped and the array ends at `};` or end of input.
/// Rows never reached keep the zero value of the dtype.
///
/// # Errors
/// Returns `XpmError` on I/O failure, malformed header or legend lines, an
/// unknown pixel symbol, or more data rows than declared.
pub fn parse_xpm<R: BufRead>(
    reader: R,
    converter: Option<&dyn Autoconvert>,
) -> Result<XpmImage, XpmError> {
    let mut lines = LineReader::new(reader);
    let metadata = read_metadata(&mut lines)?;
    let (header, dimension_line) = read_header(&mut lines)?;
    let palette = read_palette(&mut lines, &header, converter)?;

    let dtype = palette.dtype();
    if palette.is_empty() {
        debug!("empty colour legend; array type defaults to {dtype}");
    } else {
        debug!("guessed array type: {dtype} from {} symbols", palette.len());
    }
    let shape = header.shape();
    debug!(
        "dimensions: NX={} NY={} strideX={} (NC={}) --> {shape:?}",
        header.width, header.rows, header.stride, header.palette_size
    );
    if dtype
        .storage_size(shape)
        .is_none_or(|bytes| bytes > isize::MAX as usize)
    {
        return Err(invalid_dimensions(
            dimension_line.number,
            &dimension_line.text,
            "matrix too large",
        ));
    }

    let mut matrix = Matrix::zeros(dtype, shape);
    match &mut matrix {
        Matrix::Bool(data) => {
            fill_grid(&mut lines, &header, &palette.lookup_table(Value::as_bool), data)?
        }
        Matrix::Int(data) => {
            fill_grid(&mut lines, &header, &palette.lookup_table(Value::as_i64), data)?
        }
        Matrix::Float(data) => {
            fill_grid(&mut lines, &header, &palette.lookup_table(Value::as_f64), data)?
        }
        Matrix::Str(data) => fill_grid(
            &mut lines,
            &header,
            &palette.lookup_table(|value| Some(value.to_text())),
            data,
        )?,
    }

    Ok(XpmImage {
        header,
        metadata,
        palette,
        matrix,
    })
}

fn read_metadata<R: BufRead>(lines: &mut LineReader<R>) -> Result<Metadata, XpmError> {
    let mut metadata = Metadata::default();
    while let Some(line) = lines.next_line()? {
        if line.text.starts_with(layout::ARRAY_DECLARATION_MARKER) {
            return Ok(metadata);
        }
        if let Some(comment) = uncomment(line.text) {
            metadata.absorb(comment);
        }
    }
    error!(
        "no `{}` declaration found",
        layout::ARRAY_DECLARATION_MARKER
    );
    Err(XpmError::MissingDeclaration {
        marker: layout::ARRAY_DECLARATION_MARKER,
    })
}

fn read_header<R: BufRead>(
    lines: &mut LineReader<R>,
) -> Result<(Header, DimensionLine), XpmError> {
    let line = next_required(lines, "dimension line")?;
    let invalid = |reason: &'static str| invalid_dimensions(line.number, line.text, reason);
    let fields: Vec<&str> = unquote(line.text).split_whitespace().collect();
    if fields.len() != layout::DIMENSION_FIELDS {
        return Err(invalid("expected four integers"));
    }

    let mut values = [0usize; layout::DIMENSION_FIELDS];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field.parse().map_err(|_| invalid("non-integer field"))?;
    }
    let [width, rows, palette_size, stride] = values;
    if stride == 0 {
        return Err(invalid("zero stride"));
    }

    let header = Header {
        width,
        rows,
        palette_size,
        stride,
    };
    let dimension_line = DimensionLine {
        number: line.number,
        text: line.text.to_string(),
    };
    Ok((header, dimension_line))
}

fn read_palette<R: BufRead>(
    lines: &mut LineReader<R>,
    header: &Header,
    converter: Option<&dyn Autoconvert>,
) -> Result<Palette, XpmError> {
    let mut entries = Vec::new();
    for _ in 0..header.palette_size {
        let line = next_required(lines, "colour legend")?;
        entries.push(parse_legend_entry_with_width(line.text, header.stride)?);
    }
    Ok(Palette::build(entries, converter))
}

fn fill_grid<R, T>(
    lines: &mut LineReader<R>,
    header: &Header,
    table: &HashMap<&str, T>,
    data: &mut Array2<T>,
) -> Result<(), XpmError>
where
    R: BufRead,
    T: Clone,
{
    let (columns, rows) = data.dim();
    let stride = header.stride;

    let mut row = 0;
    while let Some(line) = lines.next_line()? {
        if is_comment(line.text) || line.text.trim().is_empty() {
            // axis tick lines and spacing
            continue;
        }
        if is_array_close(line.text) {
            break;
        }
        if row >= rows {
            error!("data row {row} on line {} exceeds declared {rows} rows", line.number);
            return Err(XpmError::TooManyRows {
                row,
                declared: rows,
            });
        }

        let pixels = unquote(line.text);
        let bounds = char_bounds(pixels);
        let symbol_at = |index: usize| bounds[index.min(bounds.len() - 1)];
        for column in 0..columns {
            let start = column * stride;
            let symbol = &pixels[symbol_at(start)..symbol_at(start + stride)];
            let Some(value) = table.get(symbol) else {
                error!(
                    "unknown pixel symbol {symbol:?} at column {column} on line {}",
                    line.number
                );
                return Err(XpmError::UnknownSymbol {
                    symbol: symbol.to_string(),
                    row,
                    column,
                });
            };
            data[(column, row)] = value.clone();
        }

        let count = bounds.len() - 1;
        trace!(
            "read row {row} with {columns} columns: '{}....{}'",
            &pixels[..symbol_at(4)],
            &pixels[symbol_at(count.saturating_sub(4))..]
        );
        row += 1;
    }

    if row < rows {
        debug!("only {row} of {rows} declared rows present; remaining rows stay zero");
    }
    Ok(())
}

fn next_required<'a, R: BufRead>(
    lines: &'a mut LineReader<R>,
    context: &'static str,
) -> Result<Line<'a>, XpmError> {
    match lines.next_line()? {
        Some(line) => Ok(line),
        None => {
            error!("unexpected end of input while reading {context}");
            Err(XpmError::UnexpectedEof { context })
        }
    }
}

/// Dimension line kept for errors raised once the dtype is known.
struct DimensionLine {
    number: usize,
    text: String,
}

fn invalid_dimensions(number: usize, text: &str, reason: &'static str) -> XpmError {
    error!("invalid dimension line {number}: {reason}: {text:?}");
    XpmError::InvalidDimensions {
        line: number,
        reason,
        text: text.to_string(),
    }
}

/// Byte offset of every character in `text`, followed by `text.len()`.
fn char_bounds(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ndarray::array;

    use super::{Header, parse_xpm};
    use crate::convert::{Autoconvert, Autoconverter};
    use crate::format::xpm::error::XpmError;
    use crate::matrix::Matrix;
    use crate::value::Dtype;

    const TWO_BY_TWO: &str = concat!(
        "/* XPM */\n",
        "static char *gromacs_xpm[] = {\n",
        "\"2 2 2 1\",\n",
        "\"   c #FFFFFF \" /* \"0\" */,\n",
        "\"o  c #FF0000 \" /* \"1\" */,\n",
        "\" o\",\n",
        "\"o \"\n",
    );

    fn decode(input: &str) -> Result<super::XpmImage, XpmError> {
        let converter = Autoconverter::default();
        parse_xpm(Cursor::new(input), Some(&converter as &dyn Autoconvert))
    }

    #[test]
    fn header_shape_uses_floor_division() {
        let header = Header {
            width: 7,
            rows: 3,
            palette_size: 2,
            stride: 2,
        };
        assert_eq!(header.shape(), (3, 3));
    }

    #[test]
    fn decode_small_integer_map() {
        let image = decode(TWO_BY_TWO).unwrap();
        assert_eq!(image.header.palette_size, 2);
        assert_eq!(image.matrix, Matrix::Int(array![[0, 1], [1, 0]]));
    }

    #[test]
    fn raw_values_without_conversion_are_strings() {
        let image = parse_xpm(Cursor::new(TWO_BY_TWO), None).unwrap();
        assert_eq!(image.matrix.dtype(), Dtype::Str);
        assert_eq!(
            image.matrix.get(1, 0),
            Some(crate::value::Value::Str("1".to_string()))
        );
    }

    #[test]
    fn missing_rows_stay_zero() {
        let input = TWO_BY_TWO.replace("\"o \"\n", "");
        let image = decode(&input).unwrap();
        assert_eq!(image.matrix, Matrix::Int(array![[0, 0], [1, 0]]));
    }

    #[test]
    fn comments_and_close_are_skipped() {
        let input = TWO_BY_TWO.replace("\" o\",\n", "/* x-axis:  0 1 */\n\n\" o\",\n")
            + "};\n\"oo\"\n";
        let image = decode(&input).unwrap();
        assert_eq!(image.matrix, Matrix::Int(array![[0, 1], [1, 0]]));
    }

    #[test]
    fn missing_marker_is_an_error() {
        let err = decode("/* XPM */\n\"1 1 1 1\",\n").unwrap_err();
        assert!(matches!(err, XpmError::MissingDeclaration { .. }));
    }

    #[test]
    fn dimension_line_needs_four_integers() {
        let input = "static char *gromacs_xpm[] = {\n\"4 2 2\",\n";
        let err = decode(input).unwrap_err();
        assert!(matches!(err, XpmError::InvalidDimensions { line: 2, .. }));

        let input = "static char *gromacs_xpm[] = {\n\"4 2 two 1\",\n";
        let err = decode(input).unwrap_err();
        assert!(err.to_string().contains("non-integer field"));
    }

    #[test]
    fn zero_stride_is_rejected() {
        let input = "static char *gromacs_xpm[] = {\n\"4 2 2 0\",\n";
        let err = decode(input).unwrap_err();
        assert!(err.to_string().contains("zero stride"));
    }

    #[test]
    fn oversized_matrix_is_rejected_before_allocation() {
        let input = concat!(
            "/* type: \"Continuous\" */\n",
            "static char *gromacs_xpm[] = {\n",
            "\"2305843009213693952 1 1 1\",\n",
            "\"A  c #FFFFFF \" /* \"0.5\" */,\n",
        );
        let err = decode(input).unwrap_err();
        match err {
            XpmError::InvalidDimensions { line, reason, .. } => {
                assert_eq!(line, 3);
                assert_eq!(reason, "matrix too large");
            }
            other => panic!("unexpected error: {other}"),
        }

        let input = "static char *gromacs_xpm[] = {\n\"18446744073709551615 2 0 1\",\n";
        let err = decode(input).unwrap_err();
        assert!(err.to_string().contains("matrix too large"));
    }

    #[test]
    fn truncated_palette_is_an_error() {
        let input = concat!(
            "static char *gromacs_xpm[] = {\n",
            "\"2 1 2 1\",\n",
            "\"A  c #FFFFFF \" /* \"0\" */,\n",
        );
        let err = decode(input).unwrap_err();
        assert!(matches!(
            err,
            XpmError::UnexpectedEof {
                context: "colour legend"
            }
        ));
    }

    #[test]
    fn wide_symbols_follow_stride() {
        let input = concat!(
            "static char *gromacs_xpm[] = {\n",
            "\"4 1 2 2\",\n",
            "\"Aa c #FFFFFF \" /* \"1.5\" */,\n",
            "\"Bb c #000000 \" /* \"3\" */,\n",
            "\"BbAa\"\n",
        );
        let image = decode(input).unwrap();
        assert_eq!(image.matrix, Matrix::Float(array![[3.0], [1.5]]));
    }

    #[test]
    fn odd_width_truncates_trailing_symbols() {
        let input = concat!(
            "static char *gromacs_xpm[] = {\n",
            "\"5 1 2 2\",\n",
            "\"Aa c #FFFFFF \" /* \"1\" */,\n",
            "\"Bb c #000000 \" /* \"2\" */,\n",
            "\"AaBbX\"\n",
        );
        let image = decode(input).unwrap();
        assert_eq!(image.matrix, Matrix::Int(array![[1], [2]]));
    }

    #[test]
    fn metadata_is_collected_before_marker() {
        let input = concat!(
            "/* XPM */\n",
            "/* title:   \"Hydrogen Bond Existence Map\" */\n",
            "/* x-label: \"Time (ps)\" */\n",
            "/* type:    \"Discrete\" */\n",
            "/* unrelated comment */\n",
            "static char *gromacs_xpm[] = {\n",
            "\"1 1 1 1\",\n",
            "\"o  c #FF0000 \" /* \"Present\" */,\n",
            "\"o\"\n",
        );
        let image = decode(input).unwrap();
        assert_eq!(
            image.metadata.title.as_deref(),
            Some("Hydrogen Bond Existence Map")
        );
        assert_eq!(image.metadata.x_label.as_deref(), Some("Time (ps)"));
        assert_eq!(image.metadata.kind.as_deref(), Some("Discrete"));
        assert_eq!(image.metadata.legend, None);
        assert_eq!(image.matrix, Matrix::Bool(array![[true]]));
    }

    #[test]
    fn too_many_rows_is_an_error() {
        let input = concat!(
            "static char *gromacs_xpm[] = {\n",
            "\"1 1 1 1\",\n",
            "\"o  c #FF0000 \" /* \"1\" */,\n",
            "\"o\",\n",
            "\"o\"\n",
        );
        let err = decode(input).unwrap_err();
        assert!(matches!(
            err,
            XpmError::TooManyRows {
                row: 1,
                declared: 1
            }
        ));
    }

    #[test]
    fn short_row_yields_unknown_symbol() {
        let input = concat!(
            "static char *gromacs_xpm[] = {\n",
            "\"3 1 1 1\",\n",
            "\"o  c #FF0000 \" /* \"1\" */,\n",
            "\"oo\"\n",
        );
        let err = decode(input).unwrap_err();
        assert!(matches!(
            err,
            XpmError::UnknownSymbol { ref symbol, row: 0, column: 2 } if symbol.is_empty()
        ));
    }
}
