//! hmtx table merging

use read_fonts::{TableProvider, types::GlyphId};
use write_fonts::tables::hmtx::{Hmtx, LongMetric};

use crate::{Result, context::MergeContext};

/// Concatenates horizontal metrics in merged glyph order, one long metric per glyph.
pub fn merge_hmtx(ctx: &MergeContext) -> Result<Hmtx> {
    let mut h_metrics = Vec::with_capacity(usize::from(ctx.total_glyphs()));

    for (_, font, remap) in ctx.fonts_with_remap() {
        let hmtx = font.hmtx()?;
        h_metrics.extend((0..remap.count()).map(|gid| {
            let gid = GlyphId::from(gid);
            LongMetric {
                advance: hmtx.advance(gid).unwrap_or(0),
                side_bearing: hmtx.side_bearing(gid).unwrap_or(0),
            }
        }));
    }

    Ok(Hmtx { h_metrics, left_side_bearings: Vec::new() })
}
