use std::path::{Path, PathBuf};

use crate::decode::{DecodeError, DecodeOptions, decode_xpm_file};
use crate::format::xpm::XpmImage;
use crate::format::xpm::layout::DEFAULT_EXTENSION;
use crate::matrix::Matrix;

/// Holder for the most recently decoded XPM file.
///
/// A container starts empty unless it is opened with a path. Every
/// successful `read`/`parse` replaces the stored result wholesale; a failed
/// one leaves the previous result in place.
///
/// # Examples
/// ```no_run
/// use xpmatrix_core::{DecodeOptions, Xpm};
///
/// let hbonds = Xpm::open("hbmap.xpm", DecodeOptions::default())?;
/// if let Some(fractions) = hbonds.array().and_then(|m| m.row_means()) {
///     println!("first bond present {:.1}% of the time", 100.0 * fractions[0]);
/// }
/// # Ok::<(), xpmatrix_core::DecodeError>(())
/// ```
#[derive(Debug, Default)]
pub struct Xpm {
    path: Option<PathBuf>,
    options: DecodeOptions,
    image: Option<XpmImage>,
}

impl Xpm {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            path: None,
            options,
            image: None,
        }
    }

    /// Create a container and decode `path` right away.
    pub fn open(path: impl AsRef<Path>, options: DecodeOptions) -> Result<Self, DecodeError> {
        let mut xpm = Self::new(options);
        xpm.read(path)?;
        Ok(xpm)
    }

    /// Make `path` the current input and decode it.
    ///
    /// A path without extension gets `.xpm` appended first.
    pub fn read(&mut self, path: impl AsRef<Path>) -> Result<&Matrix, DecodeError> {
        self.path = Some(with_default_extension(path));
        self.parse()
    }

    /// Decode the current input again.
    ///
    /// # Errors
    /// `DecodeError::NoSource` when no path was ever given, otherwise any
    /// I/O or format error from decoding.
    pub fn parse(&mut self) -> Result<&Matrix, DecodeError> {
        let path = self.path.as_deref().ok_or(DecodeError::NoSource)?;
        let image = decode_xpm_file(path, &self.options)?;
        Ok(&self.image.insert(image).matrix)
    }

    /// Decoded matrix, or `None` before the first successful read.
    pub fn array(&self) -> Option<&Matrix> {
        self.image.as_ref().map(|image| &image.matrix)
    }

    pub fn image(&self) -> Option<&XpmImage> {
        self.image.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }
}

/// `path` with the `.xpm` extension appended when it has none.
///
/// # Examples
/// ```
/// use std::path::Path;
///
/// use xpmatrix_core::with_default_extension;
///
/// assert_eq!(with_default_extension("runs/hbmap"), Path::new("runs/hbmap.xpm"));
/// assert_eq!(with_default_extension("ss.dat"), Path::new("ss.dat"));
/// ```
pub fn with_default_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(DEFAULT_EXTENSION)
    }
}
