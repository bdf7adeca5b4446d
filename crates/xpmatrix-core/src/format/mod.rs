//! File format decoding modules.
//!
//! Each format follows a layered structure:
//! - `layout`: fixed tokens and markers (source of truth)
//! - `reader`: line access and quoting conventions
//! - `legend` / `parser`: domain-level decoding (no direct token scanning)
//! - `error`: explicit, actionable errors
//!
//! Parsers take any `BufRead`; opening files is left to the container and the
//! crate-level entry points.

pub mod xpm;
