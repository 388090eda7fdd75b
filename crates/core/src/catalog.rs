//! Static lookup tables and glyph presets.
//!
//! Everything here is immutable once built: the resolver and the planner
//! receive a `&Catalog` instead of consulting global state.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::config::FULL_PRESET;

/// Scripts that share most of their repertoire and live in the same families.
pub const LGC_SCRIPTS: &[&str] = &["Latin", "Greek", "Cyrillic"];

/// Candidate family names that differ from the real family.
const NAMING_EXCEPTIONS: &[(&str, &str)] = &[
    ("NotoSansKufi", "NotoKufiArabic"),
    ("NotoSerifKufi", "NotoKufiArabic"),
    ("NotoSansMusic", "NotoMusic"),
    ("NotoSerifMusic", "NotoMusic"),
    ("NotoSansNaskh", "NotoSansArabic"),
    ("NotoSerifNaskh", "NotoNaskhArabic"),
    ("NotoSerifNaskhUI", "NotoNaskhArabicUI"),
    ("NotoSansNastaliq", "NotoNastaliqUrdu"),
    ("NotoSerifNastaliq", "NotoNastaliqUrdu"),
    ("NotoSerifUrdu", "NotoNastaliqUrdu"),
    ("NotoSerifHebrew", "NotoRashiHebrew"),
    ("NotoSerifNushu", "NotoTraditionalNushu"),
    ("NotoSerifTamil-Italic", "NotoSerifTamilSlanted"),
    ("NotoSansTamil-Italic", "NotoSansTamil"),
];

/// Families published with a "UI" vertical-metrics variant.
const UI_VARIANTS: &[&str] = &[
    "NotoSansKannada",
    "NotoSansArabic",
    "NotoSansDevanagari",
    "NotoSansLao",
    "NotoNaskhArabic",
];

/// Scripts without a Serif family.
const SANS_ONLY_SCRIPTS: &[&str] = &[
    "Adlam", "Avestan", "Bamum", "Bassa Vah", "Batak", "Bhaiksuki", "Brahmi", "Buginese",
    "Buhid", "Canadian Aboriginal", "Carian", "Chakma", "Cham", "Coptic", "Cuneiform", "Cypriot",
    "Deseret", "Duployan", "Egyptian Hieroglyphs", "Elbasan", "Glagolitic", "Hanunoo",
    "Imperial Aramaic", "Inscriptional Pahlavi", "Javanese", "Kaithi", "Kayah Li", "Kharoshthi",
    "Linear A", "Linear B", "Lisu", "Lycian", "Lydian", "Mandaic", "Meetei Mayek", "Mongolian",
    "Mro", "NKo", "Ogham", "Ol Chiki", "Old Italic", "Old Persian", "Old Turkic", "Osage",
    "Osmanya", "Phoenician", "Runic", "Samaritan", "Saurashtra", "Shavian", "Sundanese",
    "Syriac", "Tagalog", "Tagbanwa", "Tai Le", "Tai Tham", "Tai Viet", "Thaana", "Tifinagh",
    "Ugaritic", "Vai", "Yi",
];

/// Bundled preset tables, one file per script.
const PRESET_FILES: &[(&str, &str)] = &[
    ("Latin", include_str!("../data/latin_subset.json")),
    ("Greek", include_str!("../data/greek_subset.json")),
    ("Cyrillic", include_str!("../data/cyrillic_subset.json")),
    ("Arabic", include_str!("../data/arabic_subset.json")),
    ("Tamil", include_str!("../data/tamil_subset.json")),
];

/// One line of a preset: a glyph name, or an inclusive codepoint range.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PresetEntry {
    Glyph(String),
    Codepoints(u32, u32),
}

impl TryFrom<String> for PresetEntry {
    type Error = String;

    /// `U+0041`, `U+0041-005A`, or anything else as a glyph name.
    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let Some(hex) = value.strip_prefix("U+") else {
            return if value.is_empty() {
                Err("empty preset entry".to_string())
            } else {
                Ok(Self::Glyph(value))
            };
        };
        let parse = |s: &str| {
            u32::from_str_radix(s, 16).map_err(|e| format!("bad codepoint in {value:?}: {e}"))
        };
        let (start, end) = match hex.split_once('-') {
            Some((start, end)) => (parse(start)?, parse(end)?),
            None => {
                let cp = parse(hex)?;
                (cp, cp)
            }
        };
        if start > end {
            return Err(format!("reversed range {value:?}"));
        }
        Ok(Self::Codepoints(start, end))
    }
}

/// A named glyph list for one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub script: String,
    pub entries: Vec<PresetEntry>,
}

impl Preset {
    pub fn glyph_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            PresetEntry::Glyph(name) => Some(name.as_str()),
            PresetEntry::Codepoints(..) => None,
        })
    }

    pub fn codepoint_ranges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.entries.iter().filter_map(|e| match e {
            PresetEntry::Codepoints(start, end) => Some((*start, *end)),
            PresetEntry::Glyph(_) => None,
        })
    }
}

/// What a request asks of one script's pre-subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetChoice<'a> {
    /// `Full` was requested: keep everything.
    Full,
    /// An explicitly named preset.
    Named(&'a Preset),
    /// Nothing named; the script's default applies where defaults are used.
    Default(Option<&'a Preset>),
}

/// Immutable naming tables and glyph presets.
#[derive(Debug, Clone)]
pub struct Catalog {
    naming_exceptions: BTreeMap<String, String>,
    ui_variants: BTreeSet<String>,
    sans_only: BTreeSet<String>,
    presets: BTreeMap<String, Preset>,
}

impl Default for Catalog {
    /// The naming tables, without any presets.
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            naming_exceptions: NAMING_EXCEPTIONS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            ui_variants: owned(UI_VARIANTS),
            sans_only: owned(SANS_ONLY_SCRIPTS),
            presets: BTreeMap::new(),
        }
    }
}

impl Catalog {
    /// The naming tables plus the bundled preset files.
    pub fn bundled() -> Result<Self> {
        let mut catalog = Self::default();
        for (script, json) in PRESET_FILES {
            catalog
                .load_presets(script, json)
                .with_context(|| format!("Failed to load {script} presets"))?;
        }
        Ok(catalog)
    }

    /// Adds the presets of a `{ "PresetName": [entries...] }` document.
    pub fn load_presets(&mut self, script: &str, json: &str) -> Result<()> {
        let table: BTreeMap<String, Vec<PresetEntry>> = serde_json::from_str(json)?;
        for (name, entries) in table {
            if name == FULL_PRESET {
                bail!("{FULL_PRESET} is reserved and cannot be defined");
            }
            let preset = Preset { name: name.clone(), script: script.to_string(), entries };
            self.presets.insert(name, preset);
        }
        Ok(())
    }

    pub fn naming_exception(&self, candidate: &str) -> Option<&str> {
        self.naming_exceptions.get(candidate).map(String::as_str)
    }

    pub fn has_ui_variant(&self, family: &str) -> bool {
        self.ui_variants.contains(family)
    }

    pub fn is_sans_only(&self, script: &str) -> bool {
        self.sans_only.contains(script)
    }

    pub fn is_lgc(script: &str) -> bool {
        LGC_SCRIPTS.contains(&script)
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn presets(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }

    /// `Basic<Script>`, when bundled.
    pub fn default_preset(&self, script: &str) -> Option<&Preset> {
        self.presets.get(&format!("Basic{script}"))
    }

    /// Fails on a preset name that is neither bundled nor `Full`.
    pub fn validate_presets(&self, requested: &[String]) -> Result<()> {
        for name in requested {
            if name != FULL_PRESET && !self.presets.contains_key(name) {
                let known: Vec<_> = self.presets.keys().map(String::as_str).collect();
                bail!(
                    "Unknown preset {name:?}, expected one of {FULL_PRESET}, {}",
                    known.join(", ")
                );
            }
        }
        Ok(())
    }

    /// The preset `requested` selects for `script`.
    pub fn preset_for<'a>(&'a self, script: &str, requested: &[String]) -> PresetChoice<'a> {
        if requested.iter().any(|name| name == FULL_PRESET) {
            return PresetChoice::Full;
        }
        requested
            .iter()
            .filter_map(|name| self.preset(name))
            .find(|preset| preset.script == script)
            .map_or_else(|| PresetChoice::Default(self.default_preset(script)), PresetChoice::Named)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} entries)", self.name, self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_entry_parse() {
        let parse = |s: &str| PresetEntry::try_from(s.to_string());
        assert_eq!(parse("U+0041"), Ok(PresetEntry::Codepoints(0x41, 0x41)));
        assert_eq!(parse("U+0020-007E"), Ok(PresetEntry::Codepoints(0x20, 0x7E)));
        assert_eq!(parse("zero.osf"), Ok(PresetEntry::Glyph("zero.osf".to_string())));
        assert!(parse("U+007E-0020").is_err());
        assert!(parse("U+XYZ").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_bundled_presets() {
        let catalog = Catalog::bundled().unwrap();
        for script in ["Latin", "Greek", "Cyrillic", "Arabic", "Tamil"] {
            let preset = catalog.default_preset(script).expect("default preset");
            assert_eq!(preset.script, script);
            assert!(preset.codepoint_ranges().next().is_some(), "{preset}");
        }
        assert!(catalog.preset("UnicodeLatin").is_some());
        assert!(catalog.preset("ExtendedTamil").is_some());
    }

    #[test]
    fn test_preset_for() {
        let catalog = Catalog::bundled().unwrap();
        let requested = vec!["ExtendedGreek".to_string()];

        assert!(matches!(
            catalog.preset_for("Greek", &requested),
            PresetChoice::Named(p) if p.name == "ExtendedGreek"
        ));
        assert!(matches!(
            catalog.preset_for("Latin", &requested),
            PresetChoice::Default(Some(p)) if p.name == "BasicLatin"
        ));
        assert!(matches!(catalog.preset_for("Thai", &requested), PresetChoice::Default(None)));

        let full = vec!["ExtendedGreek".to_string(), FULL_PRESET.to_string()];
        assert_eq!(catalog.preset_for("Greek", &full), PresetChoice::Full);
    }

    #[test]
    fn test_validate_presets() {
        let catalog = Catalog::bundled().unwrap();
        assert!(catalog.validate_presets(&["BasicArabic".into(), "Full".into()]).is_ok());
        assert!(catalog.validate_presets(&["BasicKlingon".into()]).is_err());
    }

    #[test]
    fn test_full_cannot_be_redefined() {
        let mut catalog = Catalog::default();
        assert!(catalog.load_presets("Latin", r#"{"Full": ["U+0041"]}"#).is_err());
    }

    #[test]
    fn test_static_tables() {
        let catalog = Catalog::default();
        assert_eq!(catalog.naming_exception("NotoSansKufi"), Some("NotoKufiArabic"));
        assert_eq!(catalog.naming_exception("NotoSans"), None);
        assert!(catalog.has_ui_variant("NotoSansArabic"));
        assert!(catalog.is_sans_only("Adlam"));
        assert!(!catalog.is_sans_only("Thai"));
        assert!(Catalog::is_lgc("Cyrillic"));
        assert!(!Catalog::is_lgc("Arabic"));
    }
}
