use std::result;

use read_fonts::ReadError;
use thiserror::Error;
use write_fonts::{BuilderError, error};

use crate::types::{Codepoint, FontIndex};

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("failed to read font: {0}")]
    ReadError(#[from] ReadError),

    #[error("failed to write font: {0}")]
    WriteError(#[from] error::Error),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] BuilderError),

    #[error("no fonts provided for merging")]
    NoFonts,

    #[error("fonts have incompatible unitsPerEm: expected {expected}, got {actual}")]
    IncompatibleUnitsPerEm { expected: u16, actual: u16 },

    #[error("table values must be equal for '{table}' field '{field}'")]
    NotEqual { table: &'static str, field: &'static str },

    #[error("required table '{0}' not found")]
    MissingTable(&'static str),

    #[error("merged font would have {0} glyphs, more than 65535")]
    TooManyGlyphs(usize),

    #[error("merged {0} table would have {1} lookups, more than 65535")]
    TooManyLookups(&'static str, usize),

    #[error("{codepoint} is mapped by both {first} and {second}")]
    CmapConflict { codepoint: Codepoint, first: FontIndex, second: FontIndex },

    #[error("{0} has {1} outlines; only glyf fonts can be merged")]
    UnsupportedOutlines(FontIndex, &'static str),

    #[error("failed to build cmap table")]
    CmapBuildError,
}

pub type Result<T> = result::Result<T, MergeError>;
