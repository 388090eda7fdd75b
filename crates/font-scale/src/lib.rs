//! Uniform units-per-em rescaling.
//!
//! Every outline coordinate and every metric measured in font units is
//! multiplied by `target / unitsPerEm`. Device-specific tables (`hdmx`,
//! `VDMX`, `LTSH`) and tables this crate does not scale (`kern`, `vhea`,
//! `vmtx`) are dropped from the output.

mod glyf;
mod gpos;

use anyhow::{Context, Result};
use log::debug;
use read_fonts::{FontRef, TableProvider, types::GlyphId};
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{
        gpos::Gpos,
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        os2::Os2,
        post::Post,
    },
    types::Tag,
};

/// Tables rebuilt by this crate.
const SCALED_TABLES: &[&[u8; 4]] =
    &[b"glyf", b"loca", b"head", b"hhea", b"hmtx", b"OS/2", b"post", b"cvt ", b"GPOS"];

/// Tables that hold unscaled device or vertical data and are removed.
const DROPPED_TABLES: &[&[u8; 4]] = &[b"hdmx", b"VDMX", b"LTSH", b"kern", b"vhea", b"vmtx"];

/// A uniform scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Scale {
    pub fn new(from_upm: u16, to_upm: u16) -> Self {
        Self(to_upm as f64 / from_upm as f64)
    }

    pub fn factor(self) -> f64 {
        self.0
    }

    pub fn i16(self, value: i16) -> i16 {
        (value as f64 * self.0).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }

    pub fn u16(self, value: u16) -> u16 {
        (value as f64 * self.0).round().clamp(0.0, u16::MAX as f64) as u16
    }
}

/// Rescale a TrueType font to `target_upm` units per em.
///
/// Returns the input unchanged when it already has the target UPM.
pub fn scale_to_upm(data: &[u8], target_upm: u16) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let head = font.head().context("Font has no head table")?;
    let source_upm = head.units_per_em();
    if source_upm == target_upm {
        return Ok(data.to_vec());
    }
    if font.glyf().is_err() {
        anyhow::bail!("Only TrueType (glyf) outlines can be rescaled");
    }

    let scale = Scale::new(source_upm, target_upm);
    debug!("Scaling font from {source_upm} to {target_upm} UPM (x{:.4})", scale.factor());

    let mut builder = FontBuilder::new();
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        let skip = SCALED_TABLES.iter().chain(DROPPED_TABLES).any(|t| tag == Tag::new(t));
        if skip {
            continue;
        }
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    let (new_glyf, new_loca, loca_format) = glyf::scale_glyf(&font, scale)?;
    builder.add_table(&new_glyf)?;
    builder.add_table(&new_loca)?;

    let mut new_head: Head = head.to_owned_table();
    new_head.units_per_em = target_upm;
    new_head.x_min = scale.i16(new_head.x_min);
    new_head.y_min = scale.i16(new_head.y_min);
    new_head.x_max = scale.i16(new_head.x_max);
    new_head.y_max = scale.i16(new_head.y_max);
    new_head.index_to_loc_format = loca_format as i16;
    builder.add_table(&new_head)?;

    if let Ok(hmtx) = font.hmtx() {
        builder.add_table(&scale_hmtx(&font, &hmtx, scale))?;
    }

    if let Ok(hhea) = font.hhea() {
        let mut new_hhea: Hhea = hhea.to_owned_table();
        new_hhea.ascender = scale.i16(new_hhea.ascender.to_i16()).into();
        new_hhea.descender = scale.i16(new_hhea.descender.to_i16()).into();
        new_hhea.line_gap = scale.i16(new_hhea.line_gap.to_i16()).into();
        new_hhea.advance_width_max = scale.u16(new_hhea.advance_width_max.to_u16()).into();
        new_hhea.min_left_side_bearing = scale.i16(new_hhea.min_left_side_bearing.to_i16()).into();
        new_hhea.min_right_side_bearing =
            scale.i16(new_hhea.min_right_side_bearing.to_i16()).into();
        new_hhea.x_max_extent = scale.i16(new_hhea.x_max_extent.to_i16()).into();
        new_hhea.caret_offset = scale.i16(new_hhea.caret_offset);
        builder.add_table(&new_hhea)?;
    }

    if let Ok(os2) = font.os2() {
        builder.add_table(&scale_os2(os2.to_owned_table(), scale))?;
    }

    if let Ok(post) = font.post() {
        let mut new_post: Post = post.to_owned_table();
        new_post.underline_position = scale.i16(new_post.underline_position.to_i16()).into();
        new_post.underline_thickness = scale.i16(new_post.underline_thickness.to_i16()).into();
        builder.add_table(&new_post)?;
    }

    let cvt_tag = Tag::new(b"cvt ");
    if let Some(cvt) = font.table_data(cvt_tag) {
        builder.add_raw(cvt_tag, scale_cvt(cvt.as_bytes(), scale));
    }

    if let Ok(gpos) = font.gpos() {
        let mut new_gpos: Gpos = gpos.to_owned_table();
        gpos::scale_gpos(&mut new_gpos, scale);
        builder.add_table(&new_gpos)?;
    }

    Ok(builder.build())
}

fn scale_hmtx(font: &FontRef, hmtx: &read_fonts::tables::hmtx::Hmtx, scale: Scale) -> Hmtx {
    let num_glyphs = font.maxp().map(|m| m.num_glyphs()).unwrap_or(0) as usize;
    let num_long_metrics = font.hhea().map(|h| h.number_of_h_metrics()).unwrap_or(0) as usize;

    let mut h_metrics = Vec::with_capacity(num_long_metrics);
    let mut left_side_bearings = Vec::new();

    for gid in 0..num_glyphs {
        let glyph_id = GlyphId::new(gid as u32);
        let advance = hmtx.advance(glyph_id).unwrap_or(0);
        let lsb = hmtx.side_bearing(glyph_id).unwrap_or(0);

        if gid < num_long_metrics {
            h_metrics
                .push(LongMetric { advance: scale.u16(advance), side_bearing: scale.i16(lsb) });
        } else {
            left_side_bearings.push(scale.i16(lsb));
        }
    }

    Hmtx::new(h_metrics, left_side_bearings)
}

fn scale_os2(mut os2: Os2, scale: Scale) -> Os2 {
    os2.x_avg_char_width = scale.i16(os2.x_avg_char_width);
    os2.y_subscript_x_size = scale.i16(os2.y_subscript_x_size);
    os2.y_subscript_y_size = scale.i16(os2.y_subscript_y_size);
    os2.y_subscript_x_offset = scale.i16(os2.y_subscript_x_offset);
    os2.y_subscript_y_offset = scale.i16(os2.y_subscript_y_offset);
    os2.y_superscript_x_size = scale.i16(os2.y_superscript_x_size);
    os2.y_superscript_y_size = scale.i16(os2.y_superscript_y_size);
    os2.y_superscript_x_offset = scale.i16(os2.y_superscript_x_offset);
    os2.y_superscript_y_offset = scale.i16(os2.y_superscript_y_offset);
    os2.y_strikeout_size = scale.i16(os2.y_strikeout_size);
    os2.y_strikeout_position = scale.i16(os2.y_strikeout_position);
    os2.s_typo_ascender = scale.i16(os2.s_typo_ascender);
    os2.s_typo_descender = scale.i16(os2.s_typo_descender);
    os2.s_typo_line_gap = scale.i16(os2.s_typo_line_gap);
    os2.us_win_ascent = scale.u16(os2.us_win_ascent);
    os2.us_win_descent = scale.u16(os2.us_win_descent);
    os2.sx_height = os2.sx_height.map(|v| scale.i16(v));
    os2.s_cap_height = os2.s_cap_height.map(|v| scale.i16(v));
    os2
}

/// `cvt ` is a bare array of big-endian FWORDs.
fn scale_cvt(data: &[u8], scale: Scale) -> Vec<u8> {
    data.chunks_exact(2)
        .flat_map(|pair| scale.i16(i16::from_be_bytes([pair[0], pair[1]])).to_be_bytes())
        .collect()
}
