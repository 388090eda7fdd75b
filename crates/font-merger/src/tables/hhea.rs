//! hhea table merging

use std::result;

use font_types::{FWord, UfWord};
use read_fonts::{FontRef, TableProvider, tables::hhea::Hhea as ReadHhea};
use write_fonts::tables::hhea::Hhea;

use super::values;
use crate::{
    MergeError, Result,
    strategies::{max, min},
};

/// Merged hhea; every glyph gets a long metric, so `numberOfHMetrics` is the glyph count.
pub fn merge_hhea(fonts: &[FontRef], total_glyphs: u16) -> Result<Hhea> {
    let tables = fonts.iter().map(|f| f.hhea()).collect::<result::Result<Vec<ReadHhea>, _>>()?;
    let first = tables.first().ok_or(MergeError::NoFonts)?;

    Ok(Hhea {
        ascender: FWord::new(max(&values(&tables, |t| t.ascender().to_i16()))?),
        descender: FWord::new(min(&values(&tables, |t| t.descender().to_i16()))?),
        line_gap: FWord::new(max(&values(&tables, |t| t.line_gap().to_i16()))?),
        advance_width_max: UfWord::new(max(&values(&tables, |t| t.advance_width_max().to_u16()))?),
        min_left_side_bearing: FWord::new(min(&values(&tables, |t| {
            t.min_left_side_bearing().to_i16()
        }))?),
        min_right_side_bearing: FWord::new(min(&values(&tables, |t| {
            t.min_right_side_bearing().to_i16()
        }))?),
        x_max_extent: FWord::new(max(&values(&tables, |t| t.x_max_extent().to_i16()))?),
        caret_slope_rise: first.caret_slope_rise(),
        caret_slope_run: first.caret_slope_run(),
        caret_offset: first.caret_offset(),
        number_of_h_metrics: total_glyphs,
    })
}
