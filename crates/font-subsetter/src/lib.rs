//! Font subsetting wrapper around hb-subset with builder pattern.
//!
//! The subsetter keeps every OpenType layout feature it knows about, so
//! alternates reachable only through features (old-style figures, stylistic
//! sets, localized forms) survive a subset. The original `name` table can be
//! carried over verbatim, since HarfBuzz otherwise prunes it.
//!
//! # Example
//!
//! ```no_run
//! use notobuilder_font_subsetter::Subsetter;
//!
//! let font_data: &[u8] = &[];
//! let subset = Subsetter::new()
//!     .with_unicode_ranges([(0x0020, 0x007E)])
//!     .retain_glyph_names(true)
//!     .subset(font_data);
//! ```

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use hb_subset::{Blob, FontFace, SubsetInput, Tag};
use notobuilder_font_ops::copy_table;

/// Registered OpenType layout features, excluding the numbered
/// `ssXX`/`cvXX` families which [`layout_features`] generates.
pub const REGISTERED_FEATURES: &[&[u8; 4]] = &[
    b"aalt", b"abvf", b"abvm", b"abvs", b"afrc", b"akhn", b"blwf", b"blwm", b"blws", b"c2pc",
    b"c2sc", b"calt", b"case", b"ccmp", b"cfar", b"chws", b"cjct", b"clig", b"cpct", b"cpsp",
    b"cswh", b"curs", b"dist", b"dlig", b"dnom", b"dtls", b"expt", b"falt", b"fin2", b"fin3",
    b"fina", b"flac", b"frac", b"fwid", b"half", b"haln", b"halt", b"hist", b"hkna", b"hlig",
    b"hngl", b"hojo", b"hwid", b"init", b"isol", b"ital", b"jalt", b"jp04", b"jp78", b"jp83",
    b"jp90", b"kern", b"lfbd", b"liga", b"ljmo", b"lnum", b"locl", b"ltra", b"ltrm", b"mark",
    b"med2", b"medi", b"mgrk", b"mkmk", b"mset", b"nalt", b"nlck", b"nukt", b"numr", b"onum",
    b"opbd", b"ordn", b"ornm", b"palt", b"pcap", b"pkna", b"pnum", b"pref", b"pres", b"pstf",
    b"psts", b"pwid", b"qwid", b"rand", b"rclt", b"rkrf", b"rlig", b"rphf", b"rtbd", b"rtla",
    b"rtlm", b"ruby", b"rvrn", b"salt", b"sinf", b"size", b"smcp", b"smpl", b"ssty", b"stch",
    b"subs", b"sups", b"swsh", b"titl", b"tjmo", b"tnam", b"tnum", b"trad", b"twid", b"unic",
    b"valt", b"vatu", b"vchw", b"vert", b"vhal", b"vjmo", b"vkna", b"vkrn", b"vpal", b"vrt2",
    b"vrtr", b"zero",
];

/// Every feature tag the subsetter retains: [`REGISTERED_FEATURES`] plus
/// `ss01`-`ss20` and `cv01`-`cv99`.
pub fn layout_features() -> Vec<[u8; 4]> {
    let numbered = |prefix: &[u8; 2], n: u8| [prefix[0], prefix[1], b'0' + n / 10, b'0' + n % 10];

    REGISTERED_FEATURES
        .iter()
        .map(|tag| **tag)
        .chain((1..=20).map(|n| numbered(b"ss", n)))
        .chain((1..=99).map(|n| numbered(b"cv", n)))
        .collect()
}

/// Font subsetter with builder pattern.
#[derive(Debug, Clone)]
pub struct Subsetter {
    codepoints: BTreeSet<u32>,
    glyph_ids: BTreeSet<u32>,
    retain_glyph_names: bool,
    keep_name_table: bool,
    layout_features: Vec<[u8; 4]>,
}

impl Default for Subsetter {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsetter {
    /// Creates a subsetter that keeps all [`layout_features`] and no codepoints.
    pub fn new() -> Self {
        Self {
            codepoints: BTreeSet::new(),
            glyph_ids: BTreeSet::new(),
            retain_glyph_names: false,
            keep_name_table: false,
            layout_features: layout_features(),
        }
    }

    /// Adds inclusive Unicode ranges to the subset.
    pub fn with_unicode_ranges(mut self, ranges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        for (start, end) in ranges {
            self.codepoints.extend(start..=end);
        }
        self
    }

    /// Adds individual codepoints to the subset.
    pub fn with_codepoints(mut self, codepoints: impl IntoIterator<Item = u32>) -> Self {
        self.codepoints.extend(codepoints);
        self
    }

    /// Adds glyphs by id, whether or not a codepoint maps to them.
    pub fn with_glyph_ids(mut self, glyph_ids: impl IntoIterator<Item = u32>) -> Self {
        self.glyph_ids.extend(glyph_ids);
        self
    }

    /// Adds every character of `text` to the subset.
    pub fn with_text(mut self, text: &str) -> Self {
        self.codepoints.extend(text.chars().map(u32::from));
        self
    }

    /// Sets whether to retain glyph names in the subset.
    pub fn retain_glyph_names(mut self, retain: bool) -> Self {
        self.retain_glyph_names = retain;
        self
    }

    /// Sets whether the source `name` table is copied into the result unchanged.
    pub fn keep_name_table(mut self, keep: bool) -> Self {
        self.keep_name_table = keep;
        self
    }

    /// Subsets the font data and returns the result.
    pub fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = SubsetInput::new()?;

        if self.retain_glyph_names {
            input.flags().retain_glyph_names();
        }

        {
            let mut feature_set = input.layout_feature_tag_set();
            for tag in &self.layout_features {
                feature_set.insert(Tag::new(tag));
            }
        }

        {
            let mut unicode_set = input.unicode_set();
            for c in self.codepoints.iter().filter_map(|cp| char::from_u32(*cp)) {
                unicode_set.insert(c);
            }
        }

        if !self.glyph_ids.is_empty() {
            let mut glyph_set = input.glyph_set();
            for gid in &self.glyph_ids {
                glyph_set.insert(*gid);
            }
        }

        let font = FontFace::new(Blob::from_bytes(data)?)?;
        let subset_font = input.subset_font(&font)?;
        let subset = subset_font.underlying_blob().to_vec();

        if self.keep_name_table {
            copy_table(data, &subset, read_fonts::types::Tag::new(b"name"))
                .context("Failed to restore name table after subsetting")
        } else {
            Ok(subset)
        }
    }
}

/// Subsets `data` down to the glyphs needed for `text`, plus space and newline.
pub fn subset_text(data: &[u8], text: &str) -> Result<Vec<u8>> {
    Subsetter::new()
        .with_text(text)
        .with_codepoints([0x20, 0x0A])
        .retain_glyph_names(true)
        .keep_name_table(true)
        .subset(data)
}
