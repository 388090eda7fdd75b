//! Accumulators for the merged script and feature lists

use std::collections::{BTreeMap, btree_map::Entry};

use log::debug;
use read_fonts::types::Tag;
use write_fonts::tables::layout::{
    FeatureList, FeatureRecord, LangSys, LangSysRecord, Script, ScriptList, ScriptRecord,
};

const NO_REQUIRED_FEATURE: u16 = 0xFFFF;

/// Feature indices one language system enables, in merged numbering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LangFeatures {
    required: Option<u16>,
    features: Vec<u16>,
}

impl LangFeatures {
    pub fn from_lang_sys(lang_sys: &LangSys, feature_base: u16) -> Self {
        let required = (lang_sys.required_feature_index != NO_REQUIRED_FEATURE)
            .then(|| lang_sys.required_feature_index + feature_base);
        let features = lang_sys.feature_indices.iter().map(|idx| idx + feature_base).collect();
        Self { required, features }
    }

    /// Only one required feature fits; any later one is enabled as a regular feature.
    pub fn extend(&mut self, other: &LangFeatures) {
        match (self.required, other.required) {
            (None, required) => self.required = required,
            (Some(_), Some(required)) => {
                debug!("Second required feature {required} kept as a regular feature");
                self.features.push(required);
            }
            (Some(_), None) => {}
        }
        self.features.extend_from_slice(&other.features);
    }

    fn to_lang_sys(&self, new_index: &[u16]) -> LangSys {
        let renumber = |idx: u16| new_index.get(usize::from(idx)).copied();
        let mut features: Vec<u16> = self.features.iter().filter_map(|&i| renumber(i)).collect();
        features.sort_unstable();
        features.dedup();

        let mut lang_sys = LangSys::new(features);
        lang_sys.required_feature_index =
            self.required.and_then(renumber).unwrap_or(NO_REQUIRED_FEATURE);
        lang_sys
    }
}

#[derive(Debug, Default)]
struct ScriptEntry {
    default: Option<LangFeatures>,
    langs: BTreeMap<Tag, LangFeatures>,
}

/// Map of script → language → features, unioned across fonts.
///
/// When a script appears in several fonts, every language known to any of
/// them enables each font's features for that language, falling back to the
/// font's default language system where the font does not name it.
#[derive(Debug, Default)]
pub struct ScriptLangFeatureMap {
    scripts: BTreeMap<Tag, ScriptEntry>,
}

impl ScriptLangFeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_script(&mut self, tag: Tag, script: &Script, feature_base: u16) {
        let default = script
            .default_lang_sys
            .as_ref()
            .map(|ls| LangFeatures::from_lang_sys(ls, feature_base));
        let langs: BTreeMap<Tag, LangFeatures> = script
            .lang_sys_records
            .iter()
            .map(|r| (r.lang_sys_tag, LangFeatures::from_lang_sys(&r.lang_sys, feature_base)))
            .collect();

        let entry = self.scripts.entry(tag).or_default();

        for (lang_tag, existing) in entry.langs.iter_mut() {
            if let Some(added) = langs.get(lang_tag).or(default.as_ref()) {
                existing.extend(added);
            }
        }
        for (lang_tag, added) in langs {
            if let Entry::Vacant(slot) = entry.langs.entry(lang_tag) {
                let mut features = entry.default.clone().unwrap_or_default();
                features.extend(&added);
                slot.insert(features);
            }
        }

        if let Some(added) = default {
            entry.default.get_or_insert_with(LangFeatures::default).extend(&added);
        }
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Builds the script list, renumbering features through `new_index`.
    pub fn build(self, new_index: &[u16]) -> ScriptList {
        let records = self
            .scripts
            .into_iter()
            .map(|(tag, entry)| {
                let default = entry.default.map(|f| f.to_lang_sys(new_index));
                let langs = entry
                    .langs
                    .into_iter()
                    .map(|(lang, f)| LangSysRecord::new(lang, f.to_lang_sys(new_index)))
                    .collect();
                ScriptRecord::new(tag, Script::new(default, langs))
            })
            .collect();
        ScriptList::new(records)
    }
}

/// Features of every font, in merge order until sorted
#[derive(Debug, Default)]
pub struct MergedFeatureList {
    records: Vec<FeatureRecord>,
}

impl MergedFeatureList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FeatureRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stable-sorts the features by tag, returning each old index's new index.
    pub fn sort_by_tag(&mut self) -> Vec<u16> {
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.sort_by_key(|&i| self.records[i].feature_tag);

        let mut new_index = vec![0u16; order.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new as u16;
        }

        let mut slots: Vec<Option<FeatureRecord>> = self.records.drain(..).map(Some).collect();
        self.records = order.iter().filter_map(|&i| slots[i].take()).collect();
        new_index
    }

    pub fn into_feature_list(self) -> FeatureList {
        FeatureList::new(self.records)
    }
}

#[cfg(test)]
mod tests {
    use write_fonts::tables::layout::Feature;

    use super::*;

    fn script(default: &[u16], langs: &[(&[u8; 4], &[u16])]) -> Script {
        Script::new(
            Some(LangSys::new(default.to_vec())),
            langs
                .iter()
                .map(|(tag, f)| LangSysRecord::new(Tag::new(tag), LangSys::new(f.to_vec())))
                .collect(),
        )
    }

    fn features_of<'a>(list: &'a ScriptList, script: &[u8; 4], lang: &[u8; 4]) -> &'a [u16] {
        let record = list
            .script_records
            .iter()
            .find(|r| r.script_tag == Tag::new(script))
            .expect("script present");
        if lang == b"dflt" {
            return &record.script.default_lang_sys.as_ref().expect("default").feature_indices;
        }
        &record
            .script
            .lang_sys_records
            .iter()
            .find(|r| r.lang_sys_tag == Tag::new(lang))
            .expect("language present")
            .lang_sys
            .feature_indices
    }

    #[test]
    fn test_languages_union_across_fonts() {
        let mut map = ScriptLangFeatureMap::new();
        // Font 0: features 0..2, TRK uses feature 1 only.
        map.add_script(Tag::new(b"latn"), &script(&[0], &[(b"TRK ", &[1])]), 0);
        // Font 1: features start at 2, has ROM but no TRK.
        map.add_script(Tag::new(b"latn"), &script(&[0], &[(b"ROM ", &[1])]), 2);

        let identity: Vec<u16> = (0..4).collect();
        let list = map.build(&identity);

        assert_eq!(features_of(&list, b"latn", b"dflt"), &[0, 2]);
        assert_eq!(features_of(&list, b"latn", b"TRK "), &[1, 2]);
        assert_eq!(features_of(&list, b"latn", b"ROM "), &[0, 3]);
    }

    #[test]
    fn test_scripts_are_sorted_by_tag() {
        let mut map = ScriptLangFeatureMap::new();
        map.add_script(Tag::new(b"latn"), &script(&[0], &[]), 0);
        map.add_script(Tag::new(b"arab"), &script(&[0], &[]), 1);
        map.add_script(Tag::new(b"DFLT"), &script(&[0], &[]), 2);

        let list = map.build(&[0, 1, 2]);
        let tags: Vec<Tag> = list.script_records.iter().map(|r| r.script_tag).collect();
        assert_eq!(tags, vec![Tag::new(b"DFLT"), Tag::new(b"arab"), Tag::new(b"latn")]);
    }

    #[test]
    fn test_required_feature_is_renumbered() {
        let mut lang_sys = LangSys::new(vec![1]);
        lang_sys.required_feature_index = 0;
        let mut map = ScriptLangFeatureMap::new();
        map.add_script(Tag::new(b"arab"), &Script::new(Some(lang_sys), Vec::new()), 3);

        let list = map.build(&[0, 1, 2, 5, 4]);
        let record = &list.script_records[0];
        let default = record.script.default_lang_sys.as_ref().expect("default");
        assert_eq!(default.required_feature_index, 5);
        assert_eq!(default.feature_indices, vec![4]);
    }

    #[test]
    fn test_features_sort_by_tag() {
        let mut list = MergedFeatureList::new();
        for tag in [b"liga", b"kern", b"calt", b"kern"] {
            list.push(FeatureRecord::new(Tag::new(tag), Feature::new(None, Vec::new())));
        }

        let new_index = list.sort_by_tag();
        assert_eq!(new_index, vec![3, 1, 0, 2]);

        let tags: Vec<Tag> =
            list.into_feature_list().feature_records.iter().map(|r| r.feature_tag).collect();
        assert_eq!(
            tags,
            vec![Tag::new(b"calt"), Tag::new(b"kern"), Tag::new(b"kern"), Tag::new(b"liga")]
        );
    }
}
