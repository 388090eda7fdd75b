//! Alternate-glyph swaps for Latin/Greek/Cyrillic families.
//!
//! A swap remaps characters in the cmap to their stylistic alternates, e.g.
//! the digits to `zero.osf`..`nine.osf` or `I` to `I.alt`.

use std::{collections::BTreeMap, fmt, path::PathBuf, str::FromStr};

use anyhow::{Context, Error, Result, bail};
use log::{debug, info};
use notobuilder_font_ops::{glyph_names, rewrite_cmap, unicode_mappings};
use read_fonts::{FontRef, types::GlyphId};

use crate::{
    config::{ALT_IJ_SUFFIX, SWAP_FILE_SUFFIX},
    io::FontFile,
    styles::FontAsset,
};

const DIGITS: [(u32, &str); 10] = [
    (0x30, "zero"),
    (0x31, "one"),
    (0x32, "two"),
    (0x33, "three"),
    (0x34, "four"),
    (0x35, "five"),
    (0x36, "six"),
    (0x37, "seven"),
    (0x38, "eight"),
    (0x39, "nine"),
];

/// I and J with their accented forms.
const IJ_CODEPOINTS: [u32; 20] = [
    0x0049, 0x004A, 0x00CC, 0x00CD, 0x00CE, 0x00CF, 0x0128, 0x012A, 0x012C, 0x012E, 0x0130,
    0x0132, 0x0134, 0x01CF, 0x0208, 0x020A, 0x1E2C, 0x1E2E, 0x1EC8, 0x1ECA,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureStyle {
    OldStyle,
    OldStyleTabular,
    Lining,
}

impl FigureStyle {
    /// Glyph name suffix of the alternate digits.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::OldStyle => "osf",
            Self::OldStyleTabular => "tosf",
            Self::Lining => "lf",
        }
    }
}

impl FromStr for FigureStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "osf" => Ok(Self::OldStyle),
            "tosf" => Ok(Self::OldStyleTabular),
            "lf" => Ok(Self::Lining),
            _ => bail!("Unknown figure style {s:?}, expected osf, tosf or lf"),
        }
    }
}

impl fmt::Display for FigureStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Which swaps to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapRequest {
    pub figures: Option<FigureStyle>,
    pub alt_ij: bool,
}

impl SwapRequest {
    /// Parses swap names such as `osf` or `altIJ`; the last figure style wins.
    pub fn parse<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut request = Self::default();
        for item in items {
            match item.as_ref() {
                "altIJ" => request.alt_ij = true,
                other => request.figures = Some(other.parse()?),
            }
        }
        Ok(request)
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_none() && !self.alt_ij
    }

    /// Codepoint to alternate glyph name, for every requested swap.
    fn targets(&self, names: &[String], mappings: &BTreeMap<u32, GlyphId>) -> Vec<(u32, String)> {
        let mut targets = Vec::new();
        if let Some(figures) = self.figures {
            for (cp, name) in DIGITS {
                targets.push((cp, format!("{name}.{}", figures.suffix())));
            }
        }
        if self.alt_ij {
            for cp in IJ_CODEPOINTS {
                let name = mappings.get(&cp).and_then(|gid| names.get(gid.to_u32() as usize));
                if let Some(name) = name {
                    targets.push((cp, format!("{name}.{ALT_IJ_SUFFIX}")));
                }
            }
        }
        targets
    }
}

pub struct GlyphSwapper<'a> {
    request: &'a SwapRequest,
}

impl<'a> GlyphSwapper<'a> {
    pub fn new(request: &'a SwapRequest) -> Self {
        Self { request }
    }

    /// Writes `<stem>.swap.ttf` next to the asset's file with the swaps applied.
    ///
    /// Returns `None` when the font has none of the alternate glyphs.
    pub fn apply(&self, asset: &FontAsset) -> Result<Option<PathBuf>> {
        if self.request.is_empty() {
            return Ok(None);
        }
        let data = FontFile::new(&asset.path).read()?;
        let font = FontRef::new(&data).context("Failed to parse font")?;
        let mappings = unicode_mappings(&font)?;
        let names = glyph_names(&font);
        let gid_of: BTreeMap<&str, GlyphId> = names
            .iter()
            .enumerate()
            .map(|(gid, name)| (name.as_str(), GlyphId::new(gid as u32)))
            .collect();

        let swaps: BTreeMap<u32, GlyphId> = self
            .request
            .targets(&names, &mappings)
            .into_iter()
            .filter_map(|(cp, target)| gid_of.get(target.as_str()).map(|gid| (cp, *gid)))
            .collect();
        if swaps.is_empty() {
            debug!("{}: no alternate glyphs to swap in", asset.family);
            return Ok(None);
        }

        let swapped = rewrite_cmap(&data, |cmap| cmap.extend(swaps.iter().map(|(k, v)| (*k, *v))))?;
        let output = FontFile::new(asset.path.with_extension(format!("{SWAP_FILE_SUFFIX}.ttf")));
        output.write(&swapped)?;
        info!("{}: swapped {} glyphs", asset.family, swaps.len());
        Ok(Some(output.path().to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::{naming::FamilyName, test_fonts::TestFont};

    fn mapped_name(data: &[u8], cp: u32) -> String {
        let font = FontRef::new(data).unwrap();
        let gid = unicode_mappings(&font).unwrap()[&cp];
        glyph_names(&font)[gid.to_u32() as usize].clone()
    }

    fn asset_with(font: &TestFont) -> (tempfile::TempDir, FontAsset) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("NotoSans-Regular.ttf");
        write(&path, font.build()).unwrap();
        let asset = FontAsset {
            family: FamilyName::new("NotoSans"),
            script: "Latin".to_string(),
            path,
            fallback: false,
        };
        (dir, asset)
    }

    #[test]
    fn test_parse_swaps() {
        let request = SwapRequest::parse(["osf", "altIJ", "lf"]).unwrap();
        assert_eq!(request.figures, Some(FigureStyle::Lining));
        assert!(request.alt_ij);
        assert!(SwapRequest::parse(Vec::<String>::new()).unwrap().is_empty());
        assert!(SwapRequest::parse(["smcp"]).is_err());
    }

    #[test]
    fn test_swap_digits_and_ij() {
        let font = TestFont::new("Noto Sans", "Regular")
            .glyph("zero", &[0x30])
            .glyph("zero.osf", &[])
            .glyph("one", &[0x31])
            .glyph("I", &[0x49])
            .glyph("I.alt", &[]);
        let (_dir, asset) = asset_with(&font);
        let request = SwapRequest { figures: Some(FigureStyle::OldStyle), alt_ij: true };

        let path = GlyphSwapper::new(&request).apply(&asset).unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), "NotoSans-Regular.swap.ttf");

        let data = std::fs::read(&path).unwrap();
        assert_eq!(mapped_name(&data, 0x30), "zero.osf");
        assert_eq!(mapped_name(&data, 0x31), "one");
        assert_eq!(mapped_name(&data, 0x49), "I.alt");
    }

    #[test]
    fn test_no_alternates_writes_nothing() {
        let font = TestFont::new("Noto Sans", "Regular").glyph("zero", &[0x30]);
        let (dir, asset) = asset_with(&font);
        let request = SwapRequest { figures: Some(FigureStyle::OldStyleTabular), alt_ij: false };

        assert_eq!(GlyphSwapper::new(&request).apply(&asset).unwrap(), None);
        assert!(!dir.path().join("NotoSans-Regular.swap.ttf").exists());
    }
}
