/// Extension assumed for file names given without one.
pub const DEFAULT_EXTENSION: &str = "xpm";

/// Line prefix opening the pixel array declaration.
pub const ARRAY_DECLARATION_MARKER: &str = "static char *gromacs_xpm[]";

pub const COMMENT_OPEN: &str = "/*";
pub const COMMENT_CLOSE: &str = "*/";
pub const QUOTE: char = '"';
pub const COLOR_KEY: char = 'c';
pub const COLOR_PREFIX: char = '#';
/// First character of the line closing the array (`};`).
pub const ARRAY_CLOSE: char = '}';

/// Number of integers on the dimension line: width, rows, colours, stride.
pub const DIMENSION_FIELDS: usize = 4;

pub const META_TITLE: &str = "title";
pub const META_LEGEND: &str = "legend";
pub const META_X_LABEL: &str = "x-label";
pub const META_Y_LABEL: &str = "y-label";
pub const META_TYPE: &str = "type";
