//! GDEF table merging
//!
//! Glyph classes, attachment points and ligature carets are concatenated in
//! merged glyph order. Mark attachment classes and mark glyph sets of each
//! font are renumbered after those of the fonts before it; the resulting
//! [`MarkBases`] are what GSUB/GPOS lookup flags are shifted by.

use log::{debug, warn};
use read_fonts::{TableProvider, types::{GlyphId16, Tag}};
use write_fonts::{
    OffsetMarker,
    from_obj::ToOwnedTable,
    tables::{
        gdef::{AttachList, AttachPoint, Gdef, LigCaretList, LigGlyph, MarkGlyphSets},
        layout::{ClassDef, CoverageTable},
    },
};

use crate::{
    Result,
    context::MergeContext,
    tables::remap::{MarkBases, Remap, Shift},
};

/// Mark attachment classes are stored in the high byte of a lookup flag.
const MAX_MARK_CLASS: u16 = 0xFF;

#[derive(Default)]
struct GdefParts {
    glyph_classes: Vec<(GlyphId16, u16)>,
    mark_classes: Vec<(GlyphId16, u16)>,
    attach: Vec<(GlyphId16, AttachPoint)>,
    carets: Vec<(GlyphId16, LigGlyph)>,
    mark_sets: Vec<CoverageTable>,
}

/// Merges GDEF and returns the mark numbering base of every font.
pub fn merge_gdef(ctx: &MergeContext) -> Result<(Option<Gdef>, Vec<MarkBases>)> {
    let mut parts = GdefParts::default();
    let mut bases = Vec::with_capacity(ctx.fonts().len());
    let mut next = MarkBases::default();
    let mut any = false;

    for (font_idx, font, remap) in ctx.fonts_with_remap() {
        bases.push(next);
        if font.table_data(Tag::new(b"GDEF")).is_none() {
            continue;
        }
        any = true;

        let gdef: Gdef = font.gdef()?.to_owned_table();
        let shift = Shift::new(remap, 0, next);

        if let Some(mut class_def) = gdef.glyph_class_def.into_inner() {
            class_def.remap(&shift);
            parts.glyph_classes.extend(class_def.iter());
        }

        if let Some(mut class_def) = gdef.mark_attach_class_def.into_inner() {
            class_def.remap(&shift);
            let mut max_class = 0;
            for (gid, class) in class_def.iter() {
                max_class = max_class.max(class);
                parts.mark_classes.push((gid, shift.mark_class(class)));
            }
            next.classes = next.classes.saturating_add(max_class);
        }

        if let Some(mut list) = gdef.attach_list.into_inner() {
            list.coverage.remap(&shift);
            let points = list.attach_points.into_iter().map(OffsetMarker::into_inner);
            parts.attach.extend(list.coverage.iter().zip(points));
        }

        if let Some(mut list) = gdef.lig_caret_list.into_inner() {
            list.coverage.remap(&shift);
            let glyphs = list.lig_glyphs.into_iter().map(OffsetMarker::into_inner);
            parts.carets.extend(list.coverage.iter().zip(glyphs));
        }

        if let Some(sets) = gdef.mark_glyph_sets_def.into_inner() {
            let count = sets.coverages.len();
            parts.mark_sets.extend(sets.coverages.into_iter().map(|coverage| {
                let mut coverage = coverage.into_inner();
                coverage.remap(&shift);
                coverage
            }));
            next.sets = next.sets.saturating_add(count as u16);
        }

        if gdef.item_var_store.as_ref().is_some() {
            warn!("{font_idx}: GDEF variation store dropped");
        }
    }

    if next.classes > MAX_MARK_CLASS {
        warn!(
            "Merged fonts use {} mark attachment classes; lookups above class {MAX_MARK_CLASS} \
             will filter the wrong marks",
            next.classes
        );
    }
    debug!("GDEF: {} mark classes, {} mark glyph sets", next.classes, next.sets);

    Ok((any.then(|| parts.build()), bases))
}

impl GdefParts {
    fn build(self) -> Gdef {
        let class_def = |entries: Vec<(GlyphId16, u16)>| {
            (!entries.is_empty()).then(|| entries.into_iter().collect::<ClassDef>())
        };

        let attach_list = (!self.attach.is_empty()).then(|| {
            let (glyphs, points): (Vec<_>, Vec<_>) = self.attach.into_iter().unzip();
            AttachList::new(glyphs.into_iter().collect(), points)
        });
        let lig_caret_list = (!self.carets.is_empty()).then(|| {
            let (glyphs, carets): (Vec<_>, Vec<_>) = self.carets.into_iter().unzip();
            LigCaretList::new(glyphs.into_iter().collect(), carets)
        });

        let mut gdef = Gdef::new(
            class_def(self.glyph_classes),
            attach_list,
            lig_caret_list,
            class_def(self.mark_classes),
        );
        if !self.mark_sets.is_empty() {
            gdef.mark_glyph_sets_def = MarkGlyphSets::new(self.mark_sets).into();
        }
        gdef
    }
}
