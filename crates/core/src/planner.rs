//! Planning which glyphs each font keeps so merged fonts never map one
//! codepoint twice.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use anyhow::{Context, Result};
use log::{debug, info};
use notobuilder_font_ops::{glyph_names, unicode_mappings};
use notobuilder_font_subsetter::Subsetter;
use read_fonts::FontRef;

use crate::{
    catalog::{Catalog, Preset, PresetChoice},
    io::{FontFile, Intermediates},
    naming::FamilyName,
    request::BuildRequest,
    styles::FontAsset,
};

/// Codepoints each family must drop because an earlier font claims them.
///
/// Marks are never taken back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalRegistry {
    removals: BTreeMap<FamilyName, BTreeSet<u32>>,
}

impl RemovalRegistry {
    /// Returns false if the codepoint was already marked for `family`.
    pub fn mark(&mut self, family: &FamilyName, codepoint: u32) -> bool {
        self.removals.entry(family.clone()).or_default().insert(codepoint)
    }

    pub fn removed_for(&self, family: &FamilyName) -> Option<&BTreeSet<u32>> {
        self.removals.get(family)
    }

    pub fn is_removed(&self, family: &FamilyName, codepoint: u32) -> bool {
        self.removed_for(family).is_some_and(|set| set.contains(&codepoint))
    }

}

/// Conflicting codepoints already reported during one build.
///
/// Lives as long as the request so a conflict repeated in every style pass
/// is reported once.
#[derive(Debug, Clone, Default)]
pub struct ReportedCodepoints(BTreeSet<u32>);

impl ReportedCodepoints {
    /// True the first time `codepoint` is seen.
    pub fn report(&mut self, codepoint: u32) -> bool {
        self.0.insert(codepoint)
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.0.contains(&codepoint)
    }
}

/// A codepoint two fonts both map, reported on first sight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub codepoint: u32,
    pub kept_by: FamilyName,
    pub removed_from: FamilyName,
}

/// Walks the fonts in merge order; the first font to map a codepoint claims
/// it and every later font mapping it gets it marked for removal.
pub fn claim_codepoints(
    fonts: &[(FamilyName, BTreeSet<u32>)],
    reported: &mut ReportedCodepoints,
) -> (RemovalRegistry, Vec<Conflict>) {
    let mut claimed: BTreeMap<u32, &FamilyName> = BTreeMap::new();
    let mut registry = RemovalRegistry::default();
    let mut conflicts = Vec::new();

    for (family, codepoints) in fonts {
        for &codepoint in codepoints {
            match claimed.get(&codepoint) {
                None => {
                    claimed.insert(codepoint, family);
                }
                Some(&owner) => {
                    registry.mark(family, codepoint);
                    if reported.report(codepoint) {
                        conflicts.push(Conflict {
                            codepoint,
                            kept_by: owner.clone(),
                            removed_from: family.clone(),
                        });
                    }
                }
            }
        }
    }
    (registry, conflicts)
}

/// The codepoints one font keeps after planning.
///
/// Subsets by codepoint only. HarfBuzz keeps every cmap entry of a requested
/// glyph, which would bring back removed codepoints sharing a kept glyph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepSet {
    pub codepoints: BTreeSet<u32>,
}

impl KeepSet {
    pub fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        subset_font(data, &[], &self.codepoints, &BTreeSet::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub asset: FontAsset,
    /// `None` when the font keeps everything.
    pub keep: Option<KeepSet>,
}

/// The fonts of one style pass in merge order, with what each keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphPlan {
    pub entries: Vec<PlanEntry>,
    pub registry: RemovalRegistry,
}

impl GlyphPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fonts that need subsetting.
    pub fn subset_count(&self) -> usize {
        self.entries.iter().filter(|e| e.keep.is_some()).count()
    }
}

/// Union of the glyph names and codepoint ranges of some presets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PresetSelection {
    names: Vec<String>,
    glyphs: BTreeSet<String>,
    ranges: Vec<(u32, u32)>,
}

impl PresetSelection {
    fn add(&mut self, preset: &Preset) {
        self.names.push(preset.name.clone());
        self.glyphs.extend(preset.glyph_names().map(str::to_string));
        self.ranges.extend(preset.codepoint_ranges());
    }

    fn is_empty(&self) -> bool {
        self.glyphs.is_empty() && self.ranges.is_empty()
    }

    fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        subset_font(data, &self.ranges, &BTreeSet::new(), &self.glyphs)
    }
}

fn subset_font(
    data: &[u8],
    ranges: &[(u32, u32)],
    codepoints: &BTreeSet<u32>,
    glyphs: &BTreeSet<String>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let glyph_ids = glyph_names(&font)
        .iter()
        .enumerate()
        .filter(|(_, name)| glyphs.contains(name.as_str()))
        .map(|(gid, _)| gid as u32)
        .collect::<Vec<_>>();

    Subsetter::new()
        .with_unicode_ranges(ranges.iter().copied())
        .with_codepoints(codepoints.iter().copied())
        .with_glyph_ids(glyph_ids)
        .retain_glyph_names(true)
        .keep_name_table(true)
        .subset(data)
}

pub struct SubsetPlanner<'a> {
    catalog: &'a Catalog,
}

impl<'a> SubsetPlanner<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Cuts fonts down to their script presets before conflicts are planned.
    ///
    /// With one or two of Latin, Greek and Cyrillic requested (and no `Full`
    /// preset), every LGC family is cut to the union of those scripts'
    /// presets, so letters they share are not seen as conflicts. Other
    /// scripts are cut only to a preset named in the request. Cut copies are
    /// written to `work_dir` and tracked in `intermediates`.
    pub fn pre_subset(
        &self,
        assets: Vec<FontAsset>,
        request: &BuildRequest,
        work_dir: &Path,
        intermediates: &mut Intermediates,
    ) -> Result<Vec<FontAsset>> {
        let lgc = self.lgc_selection(request);

        let mut result = Vec::with_capacity(assets.len());
        for asset in assets {
            let named;
            let selection = if asset.is_lgc() {
                lgc.as_ref()
            } else {
                named = match self.catalog.preset_for(&asset.script, &request.presets) {
                    PresetChoice::Named(preset) => {
                        let mut selection = PresetSelection::default();
                        selection.add(preset);
                        Some(selection)
                    }
                    PresetChoice::Full | PresetChoice::Default(_) => None,
                };
                named.as_ref()
            };
            let Some(selection) = selection else {
                result.push(asset);
                continue;
            };

            let data = FontFile::new(&asset.path).read()?;
            let subset = selection
                .subset(&data)
                .with_context(|| format!("Failed to apply presets to {}", asset.family))?;
            let stem = asset.path.file_stem().unwrap_or_default().to_string_lossy();
            let output = FontFile::new(work_dir.join(format!("{stem}.preset.ttf")));
            output.write(&subset)?;
            intermediates.push(output.path().to_path_buf());
            info!("{}: cut to {}", asset.family, selection.names.join(" + "));

            result.push(FontAsset { path: output.path().to_path_buf(), ..asset });
        }
        Ok(result)
    }

    fn lgc_selection(&self, request: &BuildRequest) -> Option<PresetSelection> {
        let scripts = request.scripts.lgc_scripts();
        if scripts.is_empty() || scripts.len() >= 3 {
            return None;
        }
        let mut selection = PresetSelection::default();
        for script in scripts {
            match self.catalog.preset_for(script, &request.presets) {
                PresetChoice::Full => return None,
                PresetChoice::Named(preset) | PresetChoice::Default(Some(preset)) => {
                    selection.add(preset)
                }
                PresetChoice::Default(None) => debug!("No preset bundled for {script}"),
            }
        }
        (!selection.is_empty()).then_some(selection)
    }

    /// Decides what each font keeps; earlier fonts win every conflict.
    pub fn plan(
        &self,
        assets: &[FontAsset],
        reported: &mut ReportedCodepoints,
    ) -> Result<GlyphPlan> {
        let mut fonts = Vec::with_capacity(assets.len());
        for asset in assets {
            let data = FontFile::new(&asset.path).read()?;
            let font = FontRef::new(&data)
                .with_context(|| format!("Failed to parse font: {}", asset.path.display()))?;
            let mapped: BTreeSet<u32> = unicode_mappings(&font)?.into_keys().collect();
            fonts.push((asset.family.clone(), mapped));
        }

        let (registry, conflicts) = claim_codepoints(&fonts, reported);
        for conflict in &conflicts {
            let shown = char::from_u32(conflict.codepoint).unwrap_or(char::REPLACEMENT_CHARACTER);
            info!(
                "U+{:04X} {shown} in both {} and {}, keeping the first",
                conflict.codepoint, conflict.kept_by, conflict.removed_from
            );
        }

        let entries = assets
            .iter()
            .zip(fonts)
            .map(|(asset, (_, mapped))| {
                let keep = registry.removed_for(&asset.family).map(|removed| {
                    debug!("{}: dropping {} codepoints", asset.family, removed.len());
                    KeepSet { codepoints: mapped.difference(removed).copied().collect() }
                });
                PlanEntry { asset: asset.clone(), keep }
            })
            .collect();
        Ok(GlyphPlan { entries, registry })
    }
}
