//! Options for font merging

use read_fonts::types::Tag;

use crate::types::TableTag;

/// Tables that cannot survive glyph concatenation: per-glyph device metrics
/// sized by the first font's glyph count, and signatures.
pub const UNMERGEABLE_TABLES: &[&[u8; 4]] =
    &[b"hdmx", b"LTSH", b"VDMX", b"vhea", b"vmtx", b"VORG", b"DSIG"];

/// Options for font merging
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Tables to drop from the merged font, in addition to [`UNMERGEABLE_TABLES`]
    pub drop_tables: Vec<TableTag>,

    /// Keep the first mapping when two fonts map the same codepoint, instead of failing
    pub allow_cmap_conflicts: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tables to drop (accepts any iterable of string-like values)
    pub fn drop_tables(mut self, tables: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.drop_tables = tables
            .into_iter()
            .filter_map(|s| TableTag::parse(s.as_ref()))
            .collect();
        self
    }

    pub fn allow_cmap_conflicts(mut self, allow: bool) -> Self {
        self.allow_cmap_conflicts = allow;
        self
    }

    /// Check if a table should be dropped
    pub fn should_drop(&self, tag: &TableTag) -> bool {
        self.drop_tables.contains(tag)
            || UNMERGEABLE_TABLES.iter().any(|t| tag.tag() == Tag::new(t))
    }

    /// Check if a table should be dropped (by Tag)
    pub fn should_drop_tag(&self, tag: Tag) -> bool {
        self.should_drop(&tag.into())
    }
}
