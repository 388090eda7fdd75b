//! maxp table merging

use std::result;

use read_fonts::{FontRef, TableProvider, tables::maxp::Maxp as ReadMaxp};
use write_fonts::tables::maxp::Maxp;

use super::values;
use crate::{
    Result,
    strategies::{first, max},
};

/// Merged maxp (version 1.0, since only glyf fonts are merged).
///
/// Limits on the hinting programs follow the first font, whose `fpgm`/`prep`
/// are the ones kept.
pub fn merge_maxp(fonts: &[FontRef], total_glyphs: u16) -> Result<Maxp> {
    let tables = fonts.iter().map(|f| f.maxp()).collect::<result::Result<Vec<ReadMaxp>, _>>()?;
    let largest = |f: fn(&ReadMaxp) -> Option<u16>, default: u16| -> Result<Option<u16>> {
        max(&values(&tables, |t| f(t).unwrap_or(default))).map(Some)
    };
    let from_first = |f: fn(&ReadMaxp) -> Option<u16>| -> Result<Option<u16>> {
        first(&values(&tables, |t| f(t).unwrap_or(0))).map(Some)
    };

    Ok(Maxp {
        num_glyphs: total_glyphs,
        max_points: largest(|t| t.max_points(), 0)?,
        max_contours: largest(|t| t.max_contours(), 0)?,
        max_composite_points: largest(|t| t.max_composite_points(), 0)?,
        max_composite_contours: largest(|t| t.max_composite_contours(), 0)?,
        max_zones: largest(|t| t.max_zones(), 1)?,
        max_twilight_points: largest(|t| t.max_twilight_points(), 0)?,
        max_storage: from_first(|t| t.max_storage())?,
        max_function_defs: from_first(|t| t.max_function_defs())?,
        max_instruction_defs: from_first(|t| t.max_instruction_defs())?,
        max_stack_elements: largest(|t| t.max_stack_elements(), 0)?,
        max_size_of_instructions: largest(|t| t.max_size_of_instructions(), 0)?,
        max_component_elements: largest(|t| t.max_component_elements(), 0)?,
        max_component_depth: largest(|t| t.max_component_depth(), 0)?,
    })
}
