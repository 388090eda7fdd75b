//! Generic font table manipulation utilities.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use read_fonts::{
    FontRef, TableProvider,
    tables::cmap::PlatformId,
    types::{GlyphId, GlyphId16, NameId, Tag},
};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        name::{Name, NameRecord},
    },
};

/// Rewrite font data by applying a transformation function.
///
/// Copies all tables from the source font, then calls `f` to modify or add tables.
/// The function receives a reference to the source font and a mutable builder
/// that already contains all original tables.
pub fn rewrite_font(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// One decoded `name` table record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NameEntry {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub value: String,
}

impl NameEntry {
    /// Same platform/encoding/language as `self`, with a different id and value.
    pub fn sibling(&self, name_id: u16, value: impl Into<String>) -> Self {
        Self {
            platform_id: self.platform_id,
            encoding_id: self.encoding_id,
            language_id: self.language_id,
            name_id,
            value: value.into(),
        }
    }

    fn key(&self) -> (u16, u16, u16, u16) {
        (self.platform_id, self.encoding_id, self.language_id, self.name_id)
    }
}

/// Decode every record of the font's `name` table.
///
/// Records whose string cannot be decoded are skipped.
pub fn read_name_records(font: &FontRef) -> Result<Vec<NameEntry>> {
    let name = font.name().context("Font has no name table")?;
    let entries = name
        .name_record()
        .iter()
        .filter_map(|record| {
            let value = record.string(name.string_data()).ok()?.chars().collect::<String>();
            Some(NameEntry {
                platform_id: record.platform_id(),
                encoding_id: record.encoding_id(),
                language_id: record.language_id(),
                name_id: record.name_id().to_u16(),
                value,
            })
        })
        .collect();
    Ok(entries)
}

/// Build a `name` table from decoded records.
///
/// Records are sorted by (platform, encoding, language, name id); for duplicate
/// keys the last entry wins.
pub fn build_name_table(entries: impl IntoIterator<Item = NameEntry>) -> Name {
    let deduped: BTreeMap<_, NameEntry> = entries.into_iter().map(|e| (e.key(), e)).collect();
    let records = deduped
        .into_values()
        .map(|e| {
            NameRecord::new(
                e.platform_id,
                e.encoding_id,
                e.language_id,
                NameId::new(e.name_id),
                e.value.into(),
            )
        })
        .collect();
    Name::new(records)
}

/// Map name table records using a transformation function.
///
/// The mapper receives `(name_id, current_string)` and returns:
/// - `Some(new_string)` to replace the record's string
/// - `None` to keep the current string unchanged
pub fn map_name_records(
    font: &FontRef,
    mut mapper: impl FnMut(u16, &str) -> Option<String>,
) -> Result<Name> {
    let entries = read_name_records(font)?.into_iter().map(|mut entry| {
        if let Some(value) = mapper(entry.name_id, &entry.value) {
            entry.value = value;
        }
        entry
    });
    Ok(build_name_table(entries))
}

/// Copy a table from source font to target font.
///
/// Returns the new font data with the specified table replaced (or added)
/// from the source font.
pub fn copy_table(source_data: &[u8], target_data: &[u8], tag: Tag) -> Result<Vec<u8>> {
    let source_font = FontRef::new(source_data).context("Failed to parse source font")?;

    let table_data = source_font
        .table_data(tag)
        .with_context(|| format!("Source font has no {} table", tag))?;

    let target_font = FontRef::new(target_data).context("Failed to parse target font")?;

    let mut builder = FontBuilder::new();

    for record in target_font.table_directory.table_records() {
        let record_tag = record.tag();
        if record_tag == tag {
            continue;
        }
        if let Some(data) = target_font.table_data(record_tag) {
            builder.add_raw(record_tag, data);
        }
    }

    builder.add_raw(tag, table_data);

    Ok(builder.build())
}

/// Unicode codepoint to glyph mapping, read from the Windows-platform cmap subtables.
///
/// Subtables are visited in directory order; the first mapping seen for a
/// codepoint wins.
pub fn unicode_mappings(font: &FontRef) -> Result<BTreeMap<u32, GlyphId>> {
    let cmap = font.cmap().context("Font has no cmap table")?;
    let mut mappings = BTreeMap::new();

    for record in cmap.encoding_records() {
        if record.platform_id() != PlatformId::Windows {
            continue;
        }
        let Ok(subtable) = record.subtable(cmap.offset_data()) else {
            continue;
        };
        for (codepoint, gid) in subtable.iter() {
            if gid.to_u32() != 0 {
                mappings.entry(codepoint).or_insert(gid);
            }
        }
    }

    Ok(mappings)
}

/// Glyph names in glyph order.
///
/// Uses the `post` table when it carries names and falls back to
/// `glyphNNNNN` otherwise.
pub fn glyph_names(font: &FontRef) -> Vec<String> {
    let num_glyphs = font.maxp().map(|m| m.num_glyphs()).unwrap_or_default();
    let post = font.post().ok();

    (0..num_glyphs)
        .map(|gid| {
            post.as_ref()
                .and_then(|p| p.glyph_name(GlyphId16::new(gid)))
                .map(str::to_string)
                .unwrap_or_else(|| format!("glyph{gid:05}"))
        })
        .collect()
}

/// The font's `head.unitsPerEm`.
pub fn units_per_em(data: &[u8]) -> Result<u16> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    Ok(font.head().context("Font has no head table")?.units_per_em())
}

/// Replace the font's character map.
///
/// `f` receives the current Windows-platform mappings and may edit them in
/// place; the result is written as a fresh cmap (format 4 and, when needed,
/// format 12 subtables).
pub fn rewrite_cmap(
    data: &[u8],
    f: impl FnOnce(&mut BTreeMap<u32, GlyphId>),
) -> Result<Vec<u8>> {
    rewrite_font(data, |font, builder| {
        let mut mappings = unicode_mappings(font)?;
        f(&mut mappings);
        let cmap = Cmap::from_mappings(
            mappings
                .into_iter()
                .filter_map(|(cp, gid)| char::from_u32(cp).map(|c| (c, gid))),
        )
        .map_err(|e| anyhow::anyhow!("Failed to build cmap: {e:?}"))?;
        builder.add_table(&cmap)?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use write_fonts::tables::{maxp::Maxp, post::Post};

    use super::*;

    fn make_font(names: &[&str], mappings: &[(char, u32)]) -> Vec<u8> {
        let cmap =
            Cmap::from_mappings(mappings.iter().map(|(c, gid)| (*c, GlyphId::new(*gid)))).unwrap();
        let maxp = Maxp { num_glyphs: names.len() as u16, ..Default::default() };
        let post = Post::new_v2(names.iter().copied());
        let name = build_name_table([
            NameEntry {
                platform_id: 3,
                encoding_id: 1,
                language_id: 0x409,
                name_id: 1,
                value: "Test Sans".to_string(),
            },
            NameEntry {
                platform_id: 3,
                encoding_id: 1,
                language_id: 0x409,
                name_id: 2,
                value: "Regular".to_string(),
            },
        ]);

        let mut builder = FontBuilder::new();
        builder.add_table(&cmap).unwrap();
        builder.add_table(&maxp).unwrap();
        builder.add_table(&post).unwrap();
        builder.add_table(&name).unwrap();
        builder.build()
    }

    #[test]
    fn test_rewrite_font_keeps_tables() {
        let data = font_test_data::CMAP12_FONT1;
        let original = FontRef::new(data).unwrap();
        let rewritten = rewrite_font(data, |_, _| Ok(())).unwrap();
        let font = FontRef::new(&rewritten).unwrap();
        assert_eq!(
            font.table_directory.table_records().len(),
            original.table_directory.table_records().len()
        );
    }

    #[test]
    fn test_unicode_mappings_windows_only() {
        let data = make_font(&[".notdef", "A", "B"], &[('A', 1), ('B', 2)]);
        let font = FontRef::new(&data).unwrap();
        let mappings = unicode_mappings(&font).unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[&0x41], GlyphId::new(1));
        assert_eq!(mappings[&0x42], GlyphId::new(2));
    }

    #[test]
    fn test_glyph_names_from_post() {
        let data = make_font(&[".notdef", "A", "zero.osf"], &[('A', 1)]);
        let font = FontRef::new(&data).unwrap();
        assert_eq!(glyph_names(&font), vec![".notdef", "A", "zero.osf"]);
    }

    #[test]
    fn test_map_name_records() {
        let data = make_font(&[".notdef"], &[]);
        let font = FontRef::new(&data).unwrap();
        let name = map_name_records(&font, |id, current| {
            (id == 1).then(|| format!("{current} Custom"))
        })
        .unwrap();
        assert_eq!(name.name_record.len(), 2);
        let rebuilt = rewrite_font(&data, |_, builder| {
            builder.add_table(&name)?;
            Ok(())
        })
        .unwrap();
        let records = read_name_records(&FontRef::new(&rebuilt).unwrap()).unwrap();
        assert_eq!(records[0].value, "Test Sans Custom");
        assert_eq!(records[1].value, "Regular");
    }

    #[test]
    fn test_build_name_table_sorts_and_dedups() {
        let base = NameEntry {
            platform_id: 3,
            encoding_id: 1,
            language_id: 0x409,
            name_id: 4,
            value: "first".to_string(),
        };
        let name = build_name_table([
            base.clone(),
            base.sibling(1, "family"),
            base.sibling(4, "second"),
        ]);
        assert_eq!(name.name_record.len(), 2);
        assert_eq!(name.name_record[0].name_id, NameId::new(1));
        assert_eq!(name.name_record[1].name_id, NameId::new(4));
    }

    #[test]
    fn test_rewrite_cmap() {
        let data = make_font(&[".notdef", "zero", "zero.osf"], &[('0', 1)]);
        let swapped = rewrite_cmap(&data, |m| {
            m.insert('0' as u32, GlyphId::new(2));
        })
        .unwrap();
        let font = FontRef::new(&swapped).unwrap();
        assert_eq!(unicode_mappings(&font).unwrap()[&0x30], GlyphId::new(2));
    }

    #[test]
    fn test_copy_table() {
        let source = make_font(&[".notdef"], &[]);
        let target = font_test_data::CMAP12_FONT1;
        let result = copy_table(&source, target, Tag::new(b"name")).unwrap();
        let font = FontRef::new(&result).unwrap();
        let records = read_name_records(&font).unwrap();
        assert_eq!(records.len(), 2);
    }
}
