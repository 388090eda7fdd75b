//! Merge context and related types
//!
//! - `GlyphOrder`: glyph names of the merged font, one block per source font
//! - `GidRemap`: offset of one source font's block in the merged order
//! - `MergeContext`: what every table merger needs

use std::collections::HashMap;

use indexmap::IndexSet;
use read_fonts::{FontRef, TableProvider, types::GlyphId16};

use crate::{
    MergeError, Result,
    glyph_order::GlyphName,
    options::Options,
    types::{FontIndex, GlyphId, MegaGlyphId},
};

/// Glyph order of the merged font.
///
/// Source fonts are concatenated in merge order, so glyph `g` of font `i`
/// lands at `base(i) + g`. Names repeated across fonts get a `.n` suffix.
#[derive(Debug, Clone)]
pub struct GlyphOrder {
    names: IndexSet<GlyphName>,
    remaps: Vec<GidRemap>,
}

impl GlyphOrder {
    pub fn compute(fonts: &[FontRef]) -> Result<Self> {
        let mut names: IndexSet<GlyphName> = IndexSet::new();
        let mut suffixes: HashMap<GlyphName, usize> = HashMap::new();
        let mut remaps = Vec::with_capacity(fonts.len());

        for font in fonts {
            let base = names.len();
            let font_names = source_glyph_names(font)?;
            let count = font_names.len();

            for name in font_names {
                let mut candidate = name.clone();
                while names.contains(&candidate) {
                    let n = suffixes.entry(name.clone()).or_insert(0);
                    *n += 1;
                    candidate = name.with_suffix(*n);
                }
                names.insert(candidate);
            }

            if names.len() > usize::from(u16::MAX) {
                return Err(MergeError::TooManyGlyphs(names.len()));
            }
            remaps.push(GidRemap::new(base as u16, count as u16));
        }

        Ok(Self { names, remaps })
    }

    /// Glyph names in merged order
    pub fn names(&self) -> impl ExactSizeIterator<Item = &GlyphName> {
        self.names.iter()
    }

    pub fn total_glyphs(&self) -> u16 {
        self.names.len() as u16
    }

    pub fn mega_id(&self, name: &str) -> Option<MegaGlyphId> {
        self.names.get_index_of(name).map(|i| MegaGlyphId::new(i as u16))
    }

    pub fn remap(&self, font: FontIndex) -> GidRemap {
        self.remaps[font.as_usize()]
    }
}

/// Glyph names from `post`, or `glyphNNNNN` where the font has none
fn source_glyph_names(font: &FontRef) -> Result<Vec<GlyphName>> {
    let num_glyphs = font.maxp()?.num_glyphs();
    let post = font.post().ok();

    Ok((0..num_glyphs)
        .map(|gid| {
            post.as_ref()
                .and_then(|p| p.glyph_name(GlyphId16::new(gid)))
                .map(GlyphName::from)
                .unwrap_or_else(|| GlyphName::new(format!("glyph{gid:05}")))
        })
        .collect())
}

/// Where one source font's glyphs sit in the merged order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GidRemap {
    base: u16,
    count: u16,
}

impl GidRemap {
    pub fn new(base: u16, count: u16) -> Self {
        Self { base, count }
    }

    pub fn base(&self) -> u16 {
        self.base
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn is_identity(&self) -> bool {
        self.base == 0
    }

    /// Merged id of `gid`, or `None` if the source font has no such glyph
    pub fn get(&self, gid: GlyphId) -> Option<MegaGlyphId> {
        (gid.to_u16() < self.count).then(|| MegaGlyphId::new(self.base + gid.to_u16()))
    }

    pub fn get_u16(&self, gid: u16) -> Option<u16> {
        self.get(GlyphId::new(gid)).map(MegaGlyphId::to_u16)
    }

    /// Shifts a glyph id found inside a layout table
    pub fn shift(&self, gid: GlyphId16) -> GlyphId16 {
        GlyphId16::new(gid.to_u16().saturating_add(self.base))
    }
}

/// Central context for the merge operation
pub struct MergeContext<'a> {
    fonts: &'a [FontRef<'a>],
    glyph_order: GlyphOrder,
    options: &'a Options,
}

impl<'a> MergeContext<'a> {
    pub fn new(fonts: &'a [FontRef<'a>], glyph_order: GlyphOrder, options: &'a Options) -> Self {
        Self { fonts, glyph_order, options }
    }

    pub fn fonts(&self) -> &[FontRef<'a>] {
        self.fonts
    }

    pub fn glyph_order(&self) -> &GlyphOrder {
        &self.glyph_order
    }

    pub fn total_glyphs(&self) -> u16 {
        self.glyph_order.total_glyphs()
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    /// Iterate over fonts with their index and remap
    pub fn fonts_with_remap(&self) -> impl Iterator<Item = (FontIndex, &FontRef<'a>, GidRemap)> {
        self.fonts.iter().enumerate().map(|(i, font)| {
            let idx = FontIndex::new(i);
            (idx, font, self.glyph_order.remap(idx))
        })
    }

    /// The first font, which supplies naming, hinting and other unmerged tables
    pub fn first_font(&self) -> &FontRef<'a> {
        &self.fonts[0]
    }
}
