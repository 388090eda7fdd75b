//! GSUB/GPOS layout table merging
//!
//! Every font's lookups are appended to one lookup list and renumbered in
//! place (see [`super::remap`]). Features are concatenated then sorted by
//! tag, and script/language systems are unioned, so each font's rules stay
//! active for the scripts it declares.

use log::{debug, warn};
use read_fonts::{TableProvider, types::Tag};
use write_fonts::{
    OffsetMarker,
    from_obj::ToOwnedTable,
    tables::{
        gpos::{Gpos, PositionLookup, PositionLookupList},
        gsub::{Gsub, SubstitutionLookup, SubstitutionLookupList},
        layout::{FeatureList, ScriptList},
    },
};

use crate::{
    MergeError, Result,
    context::{GidRemap, MergeContext},
    tables::{
        layout_types::{MergedFeatureList, ScriptLangFeatureMap},
        remap::{MarkBases, Remap, Shift},
    },
    types::FontIndex,
};

/// One font's layout table, split into its three lists
struct LayoutParts<L> {
    scripts: ScriptList,
    features: FeatureList,
    lookups: Vec<L>,
}

impl<L> LayoutParts<L> {
    fn new(scripts: ScriptList, features: FeatureList, lookups: Vec<OffsetMarker<L>>) -> Self {
        let lookups = lookups.into_iter().map(OffsetMarker::into_inner).collect();
        Self { scripts, features, lookups }
    }
}

struct LayoutMerger<L> {
    table: &'static str,
    scripts: ScriptLangFeatureMap,
    features: MergedFeatureList,
    lookups: Vec<L>,
    fonts: usize,
}

impl<L: Remap> LayoutMerger<L> {
    fn new(table: &'static str) -> Self {
        Self {
            table,
            scripts: ScriptLangFeatureMap::new(),
            features: MergedFeatureList::new(),
            lookups: Vec::new(),
            fonts: 0,
        }
    }

    fn add(
        &mut self,
        font_idx: FontIndex,
        remap: GidRemap,
        marks: MarkBases,
        parts: LayoutParts<L>,
    ) -> Result<()> {
        let LayoutParts { scripts, features, mut lookups } = parts;

        let total = self.lookups.len() + lookups.len();
        if total > usize::from(u16::MAX) {
            return Err(MergeError::TooManyLookups(self.table, total));
        }
        let lookup_base = self.lookups.len() as u16;
        let feature_base = self.features.len() as u16;

        let shift = Shift::new(remap, lookup_base, marks);
        if !shift.is_noop() {
            lookups.remap(&shift);
        }

        for mut record in features.feature_records {
            let feature = &mut *record.feature;
            for idx in &mut feature.lookup_list_indices {
                *idx = idx.saturating_add(lookup_base);
            }
            // Parameter name ids point into a name table that is not kept.
            if !font_idx.is_first() && feature.feature_params.as_ref().is_some() {
                debug!("{font_idx}: dropping parameters of feature '{}'", record.feature_tag);
                feature.feature_params.clear();
            }
            self.features.push(record);
        }

        for record in &scripts.script_records {
            self.scripts.add_script(record.script_tag, &record.script, feature_base);
        }

        debug!(
            "{font_idx}: {} {} lookups at {lookup_base}, features at {feature_base}",
            lookups.len(),
            self.table,
        );
        self.lookups.extend(lookups);
        self.fonts += 1;
        Ok(())
    }

    fn finish(mut self) -> Option<(ScriptList, FeatureList, Vec<L>)> {
        if self.fonts == 0 {
            return None;
        }
        let new_index = self.features.sort_by_tag();
        let scripts = self.scripts.build(&new_index);
        Some((scripts, self.features.into_feature_list(), self.lookups))
    }
}

pub fn merge_gsub(ctx: &MergeContext, marks: &[MarkBases]) -> Result<Option<Gsub>> {
    let mut merger = LayoutMerger::<SubstitutionLookup>::new("GSUB");

    for (font_idx, font, remap) in ctx.fonts_with_remap() {
        if font.table_data(Tag::new(b"GSUB")).is_none() {
            continue;
        }
        let gsub: Gsub = font.gsub()?.to_owned_table();
        if gsub.feature_variations.as_ref().is_some() {
            warn!("{font_idx}: GSUB FeatureVariations dropped");
        }
        let parts = LayoutParts::new(
            gsub.script_list.into_inner(),
            gsub.feature_list.into_inner(),
            gsub.lookup_list.into_inner().lookups,
        );
        merger.add(font_idx, remap, mark_bases(marks, font_idx), parts)?;
    }

    Ok(merger.finish().map(|(scripts, features, lookups)| {
        Gsub::new(scripts, features, SubstitutionLookupList::new(lookups))
    }))
}

pub fn merge_gpos(ctx: &MergeContext, marks: &[MarkBases]) -> Result<Option<Gpos>> {
    let mut merger = LayoutMerger::<PositionLookup>::new("GPOS");

    for (font_idx, font, remap) in ctx.fonts_with_remap() {
        if font.table_data(Tag::new(b"GPOS")).is_none() {
            continue;
        }
        let gpos: Gpos = font.gpos()?.to_owned_table();
        if gpos.feature_variations.as_ref().is_some() {
            warn!("{font_idx}: GPOS FeatureVariations dropped");
        }
        let parts = LayoutParts::new(
            gpos.script_list.into_inner(),
            gpos.feature_list.into_inner(),
            gpos.lookup_list.into_inner().lookups,
        );
        merger.add(font_idx, remap, mark_bases(marks, font_idx), parts)?;
    }

    Ok(merger.finish().map(|(scripts, features, lookups)| {
        Gpos::new(scripts, features, PositionLookupList::new(lookups))
    }))
}

fn mark_bases(marks: &[MarkBases], font_idx: FontIndex) -> MarkBases {
    marks.get(font_idx.as_usize()).copied().unwrap_or_default()
}
