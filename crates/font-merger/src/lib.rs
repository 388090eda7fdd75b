//! Merging of TrueType fonts with disjoint character maps
//!
//! Glyph order is the concatenation of the inputs. Every glyph id, lookup
//! index and mark class of a later font is moved past those of the fonts
//! before it, so each font's outlines, metrics and layout rules keep working
//! side by side in the merged font.

mod context;
mod error;
mod glyph_order;
mod merger;
mod options;
mod strategies;
mod tables;
mod types;

pub use context::{GidRemap, GlyphOrder, MergeContext};
pub use error::{MergeError, Result};
pub use glyph_order::GlyphName;
pub use merger::Merger;
pub use options::{Options, UNMERGEABLE_TABLES};
pub use types::{Codepoint, FontIndex, GlyphId, MegaGlyphId, TableTag};
