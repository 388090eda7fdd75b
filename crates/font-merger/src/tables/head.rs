//! head table merging

use std::result;

use font_types::Fixed;
use read_fonts::{FontRef, TableProvider, tables::head::Head as ReadHead};
use write_fonts::tables::{
    head::{Flags, Head, MacStyle},
    loca::LocaFormat,
};

use super::values;
use crate::{
    MergeError, Result,
    strategies::{equal, max, merge_bits, min},
};

/// How each head.flags bit merges: `Some(true)` OR, `Some(false)` AND, `None` first
const HEAD_FLAGS_BIT_MAP: [Option<bool>; 16] = [
    Some(true), // 0: baseline at y=0
    Some(true), // 1: left sidebearing at x=0
    None,       // 2: instructions depend on point size
    Some(true), // 3: force ppem to integer
    Some(true), // 4: instructions alter advance width
    None,
    None,
    None,
    None,
    None,
    None,
    Some(true), // 11: lossless font data
    Some(true), // 12: font converted
    Some(true), // 13: optimized for ClearType
    Some(true), // 14: last resort font
    None,
];

/// macStyle: style bits only survive when every font agrees
const MAC_STYLE_BIT_MAP: [Option<bool>; 16] = [
    Some(false), // 0: bold
    Some(false), // 1: italic
    Some(true),  // 2: underline
    Some(true),  // 3: outline
    Some(true),  // 4: shadow
    Some(false), // 5: condensed
    Some(false), // 6: extended
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

pub fn merge_head(fonts: &[FontRef], loca_format: LocaFormat) -> Result<Head> {
    let tables = fonts.iter().map(|f| f.head()).collect::<result::Result<Vec<ReadHead>, _>>()?;

    let units_per_em = equal(&values(&tables, |t| t.units_per_em()), "head", "unitsPerEm")?;
    let font_revision = max(&values(&tables, |t| t.font_revision().to_bits()))?;
    let flags = merge_bits(&values(&tables, |t| t.flags().bits()), &HEAD_FLAGS_BIT_MAP)?;
    let mac_style = merge_bits(&values(&tables, |t| t.mac_style().bits()), &MAC_STYLE_BIT_MAP)?;

    let first = tables.first().ok_or(MergeError::NoFonts)?;

    Ok(Head {
        font_revision: Fixed::from_bits(font_revision),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: Flags::from_bits_truncate(flags),
        units_per_em,
        created: first.created(),
        modified: first.modified(),
        x_min: min(&values(&tables, |t| t.x_min()))?,
        y_min: min(&values(&tables, |t| t.y_min()))?,
        x_max: max(&values(&tables, |t| t.x_max()))?,
        y_max: max(&values(&tables, |t| t.y_max()))?,
        mac_style: MacStyle::from_bits_truncate(mac_style),
        lowest_rec_ppem: max(&values(&tables, |t| t.lowest_rec_ppem()))?,
        font_direction_hint: first.font_direction_hint(),
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    })
}
