//! GROMACS XPM matrix decoding.
//!
//! GROMACS tools write 2-D data (existence maps, secondary structure,
//! distance matrices) as a colour-indexed pixmap whose colour legend carries
//! the value each colour stands for. Decoding scans to the array
//! declaration, reads the dimension line (`nx ny nc nb`) and `nc` legend
//! lines, then maps every `nb`-character symbol of each data row back to its
//! legend value.
//!
//! Two permissive behaviours are kept on purpose: a width not divisible by
//! the stride silently drops trailing characters of each row, and rows
//! missing from the file stay zero in the matrix.

pub mod error;
pub mod layout;
pub mod legend;
pub mod palette;
pub mod parser;
pub mod reader;

pub use legend::{PaletteEntry, parse_legend_entry, parse_legend_entry_with_width};
pub use palette::Palette;
pub use parser::{Header, Metadata, XpmImage, parse_xpm};
