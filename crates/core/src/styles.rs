//! Style keys and selection of the font file each family contributes.

use std::{collections::BTreeSet, fmt, path::PathBuf, str::FromStr};

use anyhow::{Error, Result, bail};
use log::{debug, warn};

use crate::{
    cache::CacheLayout,
    io::glob_fonts,
    naming::{FamilyName, ResolvedFamily},
};

const ITALIC: &str = "Italic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    Normal,
    SemiCondensed,
    Condensed,
    ExtraCondensed,
}

impl Width {
    pub const ALL: [Self; 4] =
        [Self::Normal, Self::SemiCondensed, Self::Condensed, Self::ExtraCondensed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::SemiCondensed => "SemiCondensed",
            Self::Condensed => "Condensed",
            Self::ExtraCondensed => "ExtraCondensed",
        }
    }
}

impl FromStr for Width {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match Self::ALL.into_iter().find(|w| w.as_str() == s) {
            Some(width) => Ok(width),
            None => bail!("Unknown width {s:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weight {
    Thin,
    ExtraLight,
    Light,
    Regular,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl Weight {
    pub const ALL: [Self; 9] = [
        Self::Thin,
        Self::ExtraLight,
        Self::Light,
        Self::Regular,
        Self::Medium,
        Self::SemiBold,
        Self::Bold,
        Self::ExtraBold,
        Self::Black,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thin => "Thin",
            Self::ExtraLight => "ExtraLight",
            Self::Light => "Light",
            Self::Regular => "Regular",
            Self::Medium => "Medium",
            Self::SemiBold => "SemiBold",
            Self::Bold => "Bold",
            Self::ExtraBold => "ExtraBold",
            Self::Black => "Black",
        }
    }
}

impl FromStr for Weight {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match Self::ALL.into_iter().find(|w| w.as_str() == s) {
            Some(weight) => Ok(weight),
            None => bail!("Unknown weight {s:?}"),
        }
    }
}

/// Width and weight of one output style, e.g. `Bold` or `CondensedBold`.
///
/// `Normal` width and `Regular` weight are elided from the name; both
/// elided gives `Regular`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleKey {
    width: Width,
    weight: Weight,
    name: String,
}

impl StyleKey {
    pub fn new(width: Width, weight: Weight) -> Self {
        let name = match (width, weight) {
            (Width::Normal, weight) => weight.as_str().to_string(),
            (width, Weight::Regular) => width.as_str().to_string(),
            (width, weight) => format!("{}{}", width.as_str(), weight.as_str()),
        };
        Self { width, weight, name }
    }

    /// Parses a style name as found in upright file names.
    pub fn parse(s: &str) -> Option<Self> {
        let (width, rest) = [Width::ExtraCondensed, Width::SemiCondensed, Width::Condensed]
            .into_iter()
            .find_map(|w| s.strip_prefix(w.as_str()).map(|rest| (w, rest)))
            .unwrap_or((Width::Normal, s));
        let weight = match rest {
            "" if width != Width::Normal => Weight::Regular,
            rest => rest.parse().ok()?,
        };
        Some(Self::new(width, weight))
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// Words separated by spaces, e.g. `Condensed Bold`.
    pub fn display_name(&self) -> String {
        match (self.width, self.weight) {
            (Width::Normal, weight) => weight.as_str().to_string(),
            (width, Weight::Regular) => width.as_str().to_string(),
            (width, weight) => format!("{} {}", width.as_str(), weight.as_str()),
        }
    }

    fn canonical_order(&self) -> (Width, Weight) {
        (self.width, self.weight)
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Width-outer, weight-inner cross product.
pub fn style_keys(widths: &[Width], weights: &[Weight]) -> Vec<StyleKey> {
    let mut keys = Vec::with_capacity(widths.len() * weights.len());
    for &width in widths {
        for &weight in weights {
            let key = StyleKey::new(width, weight);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

/// The instance file name of `style` in `family`.
///
/// Italic families put `Italic` after the width and weight, and a lone
/// `Regular` is dropped: `NotoSans-CondensedBoldItalic.ttf`,
/// `NotoSans-Italic.ttf`.
pub fn file_name(family: &FamilyName, style: &StyleKey) -> String {
    let style_part = match (family.is_italic(), style.as_str()) {
        (false, name) => name.to_string(),
        (true, "Regular") => ITALIC.to_string(),
        (true, name) => format!("{name}{ITALIC}"),
    };
    format!("{}-{style_part}.ttf", family.base())
}

/// One family's file for one style pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontAsset {
    pub family: FamilyName,
    pub script: String,
    pub path: PathBuf,
    /// Set when the file is a stand-in for the requested style.
    pub fallback: bool,
}

impl FontAsset {
    pub fn is_lgc(&self) -> bool {
        crate::catalog::Catalog::is_lgc(&self.script)
    }

    pub fn file_name(&self) -> String {
        self.path.file_name().unwrap_or_default().to_string_lossy().into_owned()
    }
}

pub struct StyleSelector<'a> {
    layout: &'a CacheLayout,
}

impl<'a> StyleSelector<'a> {
    pub fn new(layout: &'a CacheLayout) -> Self {
        Self { layout }
    }

    /// The file of every family for `style`, in family order.
    ///
    /// Families with neither the exact file nor a fallback are left out.
    pub fn select(&self, families: &[ResolvedFamily], style: &StyleKey) -> Vec<FontAsset> {
        families
            .iter()
            .filter_map(|ResolvedFamily { script, name: family }| {
                let found = fallback_ladder(style).into_iter().enumerate().find_map(|(i, key)| {
                    let path = self.layout.font_path(family, &key);
                    path.is_file().then_some((path, i > 0))
                });
                match found {
                    Some((path, fallback)) => {
                        if fallback {
                            warn!("{family}: no {style} file, using {}", path.display());
                        }
                        Some(FontAsset {
                            family: family.clone(),
                            script: script.clone(),
                            path,
                            fallback,
                        })
                    }
                    None => {
                        warn!("{family}: no file for {style}, left out of this style");
                        None
                    }
                }
            })
            .collect()
    }

    /// Styles present in every family's cache folder, in canonical order.
    pub fn common_styles(&self, families: &[FamilyName]) -> Result<Vec<StyleKey>> {
        let mut common: Option<BTreeSet<(Width, Weight)>> = None;
        for family in families {
            let styles = self.available_styles(family)?;
            debug!("{family}: {} styles available", styles.len());
            common = Some(match common {
                None => styles,
                Some(prev) => prev.intersection(&styles).copied().collect(),
            });
        }
        Ok(common
            .unwrap_or_default()
            .into_iter()
            .map(|(width, weight)| StyleKey::new(width, weight))
            .collect())
    }

    fn available_styles(&self, family: &FamilyName) -> Result<BTreeSet<(Width, Weight)>> {
        let dir = self.layout.family_dir(family);
        let prefix = format!("{}-", family.base());
        let paths = glob_fonts(&dir, &format!("{prefix}*.ttf"))?;

        Ok(paths
            .iter()
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?.strip_prefix(&prefix)?;
                let upright = match (family.is_italic(), stem) {
                    (true, ITALIC) => "Regular",
                    (true, stem) => stem.strip_suffix(ITALIC)?,
                    (false, stem) if stem.ends_with(ITALIC) => return None,
                    (false, stem) => stem,
                };
                StyleKey::parse(upright).map(|key| key.canonical_order())
            })
            .collect())
    }
}

/// Styles tried for `style`, best first: the style itself, then without
/// its width, then at Regular weight, then plain Regular.
///
/// A heavier or lighter weight never stands in for another non-Regular one.
pub fn fallback_ladder(style: &StyleKey) -> Vec<StyleKey> {
    let mut ladder = vec![style.clone()];
    let mut push = |key: StyleKey| {
        if !ladder.contains(&key) {
            ladder.push(key);
        }
    };
    push(StyleKey::new(Width::Normal, style.weight()));
    push(StyleKey::new(style.width(), Weight::Regular));
    push(StyleKey::new(Width::Normal, Weight::Regular));
    ladder
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_style_key_names() {
        assert_eq!(StyleKey::new(Width::Normal, Weight::Regular).as_str(), "Regular");
        assert_eq!(StyleKey::new(Width::Normal, Weight::Bold).as_str(), "Bold");
        assert_eq!(StyleKey::new(Width::Condensed, Weight::Regular).as_str(), "Condensed");
        assert_eq!(StyleKey::new(Width::Condensed, Weight::Bold).as_str(), "CondensedBold");
        assert_eq!(
            StyleKey::new(Width::SemiCondensed, Weight::ExtraBold).display_name(),
            "SemiCondensed ExtraBold"
        );
    }

    #[test]
    fn test_style_key_parse() {
        for width in Width::ALL {
            for weight in Weight::ALL {
                let key = StyleKey::new(width, weight);
                assert_eq!(StyleKey::parse(key.as_str()), Some(key));
            }
        }
        assert_eq!(StyleKey::parse("Italic"), None);
        assert_eq!(StyleKey::parse("Normal"), None);
    }

    #[test]
    fn test_file_name() {
        let upright = FamilyName::new("NotoSans");
        let italic = FamilyName::new("NotoSans-Italic");
        let regular = StyleKey::new(Width::Normal, Weight::Regular);
        let condensed = StyleKey::new(Width::Condensed, Weight::Regular);
        let condensed_bold = StyleKey::new(Width::Condensed, Weight::Bold);

        assert_eq!(file_name(&upright, &regular), "NotoSans-Regular.ttf");
        assert_eq!(file_name(&upright, &condensed_bold), "NotoSans-CondensedBold.ttf");
        assert_eq!(file_name(&italic, &regular), "NotoSans-Italic.ttf");
        assert_eq!(file_name(&italic, &condensed), "NotoSans-CondensedItalic.ttf");
        assert_eq!(file_name(&italic, &condensed_bold), "NotoSans-CondensedBoldItalic.ttf");
    }

    #[test]
    fn test_fallback_ladder() {
        let names = |key: StyleKey| -> Vec<String> {
            fallback_ladder(&key).iter().map(|k| k.as_str().to_string()).collect()
        };
        assert_eq!(
            names(StyleKey::new(Width::Condensed, Weight::Bold)),
            ["CondensedBold", "Bold", "Condensed", "Regular"]
        );
        assert_eq!(names(StyleKey::new(Width::Normal, Weight::Bold)), ["Bold", "Regular"]);
        assert_eq!(names(StyleKey::new(Width::Normal, Weight::Regular)), ["Regular"]);
    }

    fn resolved(script: &str, name: &str) -> ResolvedFamily {
        ResolvedFamily { script: script.to_string(), name: FamilyName::new(name) }
    }

    fn cache_with(files: &[(&str, &str)]) -> (tempfile::TempDir, CacheLayout) {
        let dir = tempdir().unwrap();
        let layout = CacheLayout::new(dir.path());
        for (family, file) in files {
            let family_dir = layout.family_dir(&FamilyName::new(*family));
            create_dir_all(&family_dir).unwrap();
            write(family_dir.join(file), b"").unwrap();
        }
        (dir, layout)
    }

    #[test]
    fn test_select_exact_and_fallback() {
        let (_dir, layout) = cache_with(&[
            ("NotoSans", "NotoSans-Bold.ttf"),
            ("NotoSansThai", "NotoSansThai-Regular.ttf"),
        ]);
        let families = vec![
            resolved("Latin", "NotoSans"),
            resolved("Thai", "NotoSansThai"),
            resolved("Lao", "NotoSansLao"),
        ];

        let bold = StyleKey::new(Width::Normal, Weight::Bold);
        let assets = StyleSelector::new(&layout).select(&families, &bold);

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].file_name(), "NotoSans-Bold.ttf");
        assert!(!assets[0].fallback);
        assert!(assets[0].is_lgc());
        assert_eq!(assets[1].file_name(), "NotoSansThai-Regular.ttf");
        assert!(assets[1].fallback);
    }

    #[test]
    fn test_select_never_substitutes_another_weight() {
        let (_dir, layout) = cache_with(&[("NotoSansThai", "NotoSansThai-Bold.ttf")]);
        let families = vec![resolved("Thai", "NotoSansThai")];
        let regular = StyleKey::new(Width::Normal, Weight::Regular);
        assert!(StyleSelector::new(&layout).select(&families, &regular).is_empty());
    }

    #[test]
    fn test_common_styles() {
        let (_dir, layout) = cache_with(&[
            ("NotoSans", "NotoSans-Regular.ttf"),
            ("NotoSans", "NotoSans-Bold.ttf"),
            ("NotoSans", "NotoSans-CondensedBold.ttf"),
            ("NotoSans", "NotoSans-BoldItalic.ttf"),
            ("NotoSansThai", "NotoSansThai-Bold.ttf"),
            ("NotoSansThai", "NotoSansThai-CondensedBold.ttf"),
            ("NotoSansThai", "NotoSansThai-Regular.ttf"),
            ("NotoSansThai", "NotoSansThai-Light.ttf"),
        ]);
        let selector = StyleSelector::new(&layout);

        let families = [FamilyName::new("NotoSans"), FamilyName::new("NotoSansThai")];
        let common: Vec<_> = selector
            .common_styles(&families)
            .unwrap()
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();
        assert_eq!(common, ["Regular", "Bold", "CondensedBold"]);

        let italic: Vec<_> = selector
            .common_styles(&[FamilyName::new("NotoSans-Italic")])
            .unwrap()
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();
        assert_eq!(italic, ["Bold"]);
    }
}
