//! cmap table merging
//!
//! The merged cmap is the union of every font's Unicode mappings, moved into
//! merged glyph ids. Two fonts mapping the same codepoint is a conflict: the
//! caller is expected to have subset them apart beforehand.

use std::collections::{BTreeMap, btree_map::Entry};

use log::{debug, warn};
use read_fonts::{
    TableProvider,
    tables::cmap::{Cmap as ReadCmap, CmapSubtable, PlatformId},
};
use write_fonts::tables::cmap::{
    Cmap, Cmap12, CmapSubtable as WriteCmapSubtable, EncodingRecord, PlatformId as WritePlatformId,
    SequentialMapGroup,
};

use crate::{
    MergeError, Result,
    context::MergeContext,
    types::{Codepoint, FontIndex, GlyphId, MegaGlyphId},
};

pub fn merge_cmap(ctx: &MergeContext) -> Result<Cmap> {
    let mut merged: BTreeMap<Codepoint, (MegaGlyphId, FontIndex)> = BTreeMap::new();

    for (font_idx, font, remap) in ctx.fonts_with_remap() {
        let cmap = font.cmap()?;
        let Some(subtable) = find_best_subtable(&cmap) else {
            warn!("{font_idx} has no Unicode cmap subtable");
            continue;
        };

        let mut mapped = 0usize;
        for (cp, gid) in subtable.iter() {
            let Ok(gid) = u16::try_from(gid.to_u32()) else {
                continue;
            };
            let Some(mega) = remap.get(GlyphId::new(gid)).filter(|_| gid != 0) else {
                continue;
            };

            match merged.entry(Codepoint::new(cp)) {
                Entry::Vacant(slot) => {
                    slot.insert((mega, font_idx));
                    mapped += 1;
                }
                // Within one font the first subtable entry wins.
                Entry::Occupied(slot) if slot.get().1 == font_idx => {}
                Entry::Occupied(slot) => {
                    let (_, first) = *slot.get();
                    if !ctx.options().allow_cmap_conflicts {
                        return Err(MergeError::CmapConflict {
                            codepoint: *slot.key(),
                            first,
                            second: font_idx,
                        });
                    }
                    warn!("{} is mapped by {first} and {font_idx}; keeping {first}", slot.key());
                }
            }
        }
        debug!("{font_idx}: {mapped} codepoints");
    }

    let mappings: Vec<(u32, u32)> =
        merged.iter().map(|(cp, (gid, _))| (cp.to_u32(), gid.to_u32())).collect();

    Ok(build_cmap_format12(&mappings))
}

/// Format 12 only: format 4 overflows on large merged repertoires.
fn build_cmap_format12(mappings: &[(u32, u32)]) -> Cmap {
    let cmap12 = Cmap12 { language: 0, groups: build_sequential_groups(mappings) };

    let unicode = WriteCmapSubtable::Format12(cmap12.clone());
    let windows = WriteCmapSubtable::Format12(cmap12);
    Cmap::new(vec![
        EncodingRecord::new(WritePlatformId::Unicode, 4, unicode),
        EncodingRecord::new(WritePlatformId::Windows, 10, windows),
    ])
}

/// Groups runs of consecutive codepoints mapped to consecutive glyph ids.
/// `mappings` must be sorted by codepoint.
fn build_sequential_groups(mappings: &[(u32, u32)]) -> Vec<SequentialMapGroup> {
    let mut groups = Vec::new();
    let mut iter = mappings.iter().copied();
    let Some((mut start_cp, mut start_gid)) = iter.next() else {
        return groups;
    };
    let (mut prev_cp, mut prev_gid) = (start_cp, start_gid);

    for (cp, gid) in iter {
        if cp != prev_cp + 1 || gid != prev_gid + 1 {
            groups.push(SequentialMapGroup::new(start_cp, prev_cp, start_gid));
            (start_cp, start_gid) = (cp, gid);
        }
        (prev_cp, prev_gid) = (cp, gid);
    }
    groups.push(SequentialMapGroup::new(start_cp, prev_cp, start_gid));

    groups
}

/// Prefers a full-repertoire subtable, then a BMP one. Windows records are
/// tried before Unicode-platform ones.
fn find_best_subtable<'a>(cmap: &ReadCmap<'a>) -> Option<CmapSubtable<'a>> {
    const PREFERENCE: [(PlatformId, u16); 4] = [
        (PlatformId::Windows, 10),
        (PlatformId::Unicode, 4),
        (PlatformId::Windows, 1),
        (PlatformId::Unicode, 3),
    ];

    let records = cmap.encoding_records();
    PREFERENCE
        .iter()
        .find_map(|&(platform, encoding)| {
            records
                .iter()
                .find(|r| r.platform_id() == platform && r.encoding_id() == encoding)
                .and_then(|r| r.subtable(cmap.offset_data()).ok())
        })
        .or_else(|| {
            records
                .iter()
                .filter(|r| r.platform_id() == PlatformId::Unicode)
                .find_map(|r| r.subtable(cmap.offset_data()).ok())
        })
}
