//! OS/2 table merging

use log::debug;
use read_fonts::{FontRef, TableProvider, tables::os2::Os2 as ReadOs2};
use write_fonts::tables::os2::{Os2, SelectionFlags};

use super::values;
use crate::{
    Result,
    strategies::{first, max, min, union_bits},
};

/// fsSelection bits that must hold in every font: italic, bold, regular,
/// USE_TYPO_METRICS, WWS, oblique
const FS_SELECTION_AND_BITS: [u16; 6] = [0, 5, 6, 7, 8, 9];
/// fsSelection bits set if any font sets them: underscore, negative, outlined, strikeout
const FS_SELECTION_OR_BITS: [u16; 4] = [1, 2, 3, 4];

/// Merges the OS/2 tables of the fonts that have one.
///
/// The result takes the highest version present; version-dependent fields
/// come from the first font and default when it lacks them.
pub fn merge_os2(fonts: &[FontRef]) -> Result<Option<Os2>> {
    let tables: Vec<ReadOs2> = fonts.iter().filter_map(|f| f.os2().ok()).collect();
    let Some(first_table) = tables.first() else {
        return Ok(None);
    };
    if tables.len() != fonts.len() {
        debug!("{} of {} fonts have no OS/2 table", fonts.len() - tables.len(), fonts.len());
    }

    let version = tables.iter().map(|t| t.version()).max().unwrap_or(0);
    let since =
        |v: u16, value: Option<u16>, default: u16| (version >= v).then(|| value.unwrap_or(default));

    let sx_heights: Vec<i16> = tables.iter().filter_map(|t| t.sx_height()).collect();
    let cap_heights: Vec<i16> = tables.iter().filter_map(|t| t.s_cap_height()).collect();
    let code_pages_1: Vec<u32> = tables.iter().filter_map(|t| t.ul_code_page_range_1()).collect();
    let code_pages_2: Vec<u32> = tables.iter().filter_map(|t| t.ul_code_page_range_2()).collect();

    Ok(Some(Os2 {
        x_avg_char_width: first(&values(&tables, |t| t.x_avg_char_width()))?,
        us_weight_class: first_table.us_weight_class(),
        us_width_class: first_table.us_width_class(),
        fs_type: first_table.fs_type(),
        y_subscript_x_size: first_table.y_subscript_x_size(),
        y_subscript_y_size: first_table.y_subscript_y_size(),
        y_subscript_x_offset: first_table.y_subscript_x_offset(),
        y_subscript_y_offset: first_table.y_subscript_y_offset(),
        y_superscript_x_size: first_table.y_superscript_x_size(),
        y_superscript_y_size: first_table.y_superscript_y_size(),
        y_superscript_x_offset: first_table.y_superscript_x_offset(),
        y_superscript_y_offset: first_table.y_superscript_y_offset(),
        y_strikeout_size: first_table.y_strikeout_size(),
        y_strikeout_position: first_table.y_strikeout_position(),
        s_family_class: first_table.s_family_class(),
        panose_10: first_table.panose_10().try_into().unwrap_or([0; 10]),
        ul_unicode_range_1: union_bits(values(&tables, |t| t.ul_unicode_range_1())),
        ul_unicode_range_2: union_bits(values(&tables, |t| t.ul_unicode_range_2())),
        ul_unicode_range_3: union_bits(values(&tables, |t| t.ul_unicode_range_3())),
        ul_unicode_range_4: union_bits(values(&tables, |t| t.ul_unicode_range_4())),
        ach_vend_id: first_table.ach_vend_id(),
        fs_selection: merge_fs_selection(&tables),
        us_first_char_index: min(&values(&tables, |t| t.us_first_char_index()))?,
        us_last_char_index: max(&values(&tables, |t| t.us_last_char_index()))?,
        s_typo_ascender: max(&values(&tables, |t| t.s_typo_ascender()))?,
        s_typo_descender: min(&values(&tables, |t| t.s_typo_descender()))?,
        s_typo_line_gap: max(&values(&tables, |t| t.s_typo_line_gap()))?,
        us_win_ascent: max(&values(&tables, |t| t.us_win_ascent()))?,
        us_win_descent: max(&values(&tables, |t| t.us_win_descent()))?,
        ul_code_page_range_1: (version >= 1).then(|| union_bits(code_pages_1)),
        ul_code_page_range_2: (version >= 1).then(|| union_bits(code_pages_2)),
        sx_height: (version >= 2).then(|| sx_heights.iter().copied().max().unwrap_or(0)),
        s_cap_height: (version >= 2).then(|| cap_heights.iter().copied().max().unwrap_or(0)),
        us_default_char: since(2, first_table.us_default_char(), 0),
        us_break_char: since(2, first_table.us_break_char(), 0x20),
        us_max_context: (version >= 2)
            .then(|| tables.iter().filter_map(|t| t.us_max_context()).max().unwrap_or(0)),
        us_lower_optical_point_size: since(5, first_table.us_lower_optical_point_size(), 0),
        us_upper_optical_point_size: since(5, first_table.us_upper_optical_point_size(), 0xFFFF),
    }))
}

fn merge_fs_selection(tables: &[ReadOs2]) -> SelectionFlags {
    let bits = values(tables, |t| t.fs_selection().bits());

    let all = FS_SELECTION_AND_BITS
        .iter()
        .map(|bit| 1u16 << bit)
        .filter(|mask| bits.iter().all(|v| v & mask != 0));
    let any = FS_SELECTION_OR_BITS
        .iter()
        .map(|bit| 1u16 << bit)
        .filter(|mask| bits.iter().any(|v| v & mask != 0));

    SelectionFlags::from_bits_truncate(all.chain(any).fold(0, |acc, mask| acc | mask))
}
