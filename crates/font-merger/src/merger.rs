//! Main Merger implementation

use std::{collections::HashSet, result};

use log::info;
use read_fonts::{FontRef, TableProvider, types::Tag};
use write_fonts::FontBuilder;

use crate::{
    MergeError, Result,
    context::{GlyphOrder, MergeContext},
    options::Options,
    tables::{
        cmap::merge_cmap,
        gdef::merge_gdef,
        glyf::merge_glyf,
        head::merge_head,
        hhea::merge_hhea,
        hint::{check_hint_compatibility, log_hint_info},
        hmtx::merge_hmtx,
        layout::{merge_gpos, merge_gsub},
        maxp::merge_maxp,
        name::merge_name,
        os2::merge_os2,
        post::merge_post,
    },
    types::FontIndex,
};

/// Tables built by the merger rather than copied from the first font
const HANDLED_TABLES: &[[u8; 4]] = &[
    *b"head", *b"maxp", *b"cmap", *b"hmtx", *b"hhea", *b"post", *b"OS/2", *b"name", *b"glyf",
    *b"loca", *b"GSUB", *b"GPOS", *b"GDEF",
];

/// Concatenates fonts with disjoint cmaps into one
#[derive(Debug, Default)]
pub struct Merger {
    options: Options,
}

impl Merger {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Merge font files, in order
    pub fn merge(&self, font_data: &[&[u8]]) -> Result<Vec<u8>> {
        if font_data.is_empty() {
            return Err(MergeError::NoFonts);
        }

        let fonts: Vec<_> = font_data
            .iter()
            .map(|data| FontRef::new(data))
            .collect::<result::Result<_, _>>()?;

        self.merge_fonts(&fonts)
    }

    pub fn merge_fonts(&self, fonts: &[FontRef]) -> Result<Vec<u8>> {
        if fonts.is_empty() {
            return Err(MergeError::NoFonts);
        }

        self.validate_units_per_em(fonts)?;
        validate_outlines(fonts)?;

        check_hint_compatibility(fonts);
        log_hint_info(fonts);

        let glyph_order = GlyphOrder::compute(fonts)?;
        let total_glyphs = glyph_order.total_glyphs();
        info!("Merging {} fonts with {total_glyphs} total glyphs", fonts.len());

        let ctx = MergeContext::new(fonts, glyph_order, &self.options);

        let cmap = merge_cmap(&ctx)?;
        let (glyf, loca, loca_format) = merge_glyf(&ctx)?;
        let head = merge_head(fonts, loca_format)?;
        let maxp = merge_maxp(fonts, total_glyphs)?;
        let hhea = merge_hhea(fonts, total_glyphs)?;
        let hmtx = merge_hmtx(&ctx)?;
        let post = merge_post(&ctx)?;
        let os2 = merge_os2(fonts)?;

        let (gdef, mark_bases) = merge_gdef(&ctx)?;
        let gsub = merge_gsub(&ctx, &mark_bases)?;
        let gpos = merge_gpos(&ctx, &mark_bases)?;

        let mut builder = FontBuilder::new();
        builder.add_table(&head)?;
        builder.add_table(&maxp)?;
        builder.add_table(&cmap)?;
        builder.add_table(&hhea)?;
        builder.add_table(&hmtx)?;
        builder.add_table(&post)?;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;

        if let Some(os2) = os2.filter(|_| !self.options.should_drop_tag(Tag::new(b"OS/2"))) {
            builder.add_table(&os2)?;
        }
        if !self.options.should_drop_tag(Tag::new(b"name")) {
            merge_name(ctx.first_font(), &mut builder);
        }
        if let Some(gdef) = gdef.filter(|_| !self.options.should_drop_tag(Tag::new(b"GDEF"))) {
            builder.add_table(&gdef)?;
        }
        if let Some(gsub) = gsub.filter(|_| !self.options.should_drop_tag(Tag::new(b"GSUB"))) {
            builder.add_table(&gsub)?;
        }
        if let Some(gpos) = gpos.filter(|_| !self.options.should_drop_tag(Tag::new(b"GPOS"))) {
            builder.add_table(&gpos)?;
        }

        self.copy_other_tables(&mut builder, ctx.first_font());

        Ok(builder.build())
    }

    fn validate_units_per_em(&self, fonts: &[FontRef]) -> Result<()> {
        let (first, rest) = fonts.split_first().ok_or(MergeError::NoFonts)?;
        let first_upem = first.head()?.units_per_em();
        rest.iter().try_for_each(|font| {
            let upem = font.head()?.units_per_em();
            if upem == first_upem {
                Ok(())
            } else {
                Err(MergeError::IncompatibleUnitsPerEm { expected: first_upem, actual: upem })
            }
        })
    }

    /// Copies the first font's remaining tables; its glyph ids are unchanged by the merge.
    fn copy_other_tables(&self, builder: &mut FontBuilder, font: &FontRef) {
        let handled_tables: HashSet<Tag> = HANDLED_TABLES.iter().map(Tag::new).collect();

        for record in font.table_directory.table_records() {
            let tag = record.tag();
            if handled_tables.contains(&tag)
                || self.options.should_drop_tag(tag)
                || builder.contains(tag)
            {
                continue;
            }
            if let Some(data) = font.table_data(tag) {
                builder.add_raw(tag, data.as_bytes().to_vec());
            }
        }
    }
}

fn validate_outlines(fonts: &[FontRef]) -> Result<()> {
    for (i, font) in fonts.iter().enumerate() {
        let has = |tag: &[u8; 4]| font.table_data(Tag::new(tag)).is_some();
        let kind = if has(b"CFF ") {
            "CFF"
        } else if has(b"CFF2") {
            "CFF2"
        } else if !has(b"glyf") {
            "no"
        } else {
            continue;
        };
        return Err(MergeError::UnsupportedOutlines(FontIndex::new(i), kind));
    }
    Ok(())
}
